//! HTTP listener lifecycle management.
//!
//! [`GameStateServer`] owns one listener at a time. [`GameStateServer::start`]
//! spawns a dedicated OS thread running its own Tokio runtime, so the
//! API can be embedded in a host process that is not async (a game loop,
//! a plugin host). The listener thread reports its bind outcome through a
//! one-shot channel and `start` waits on it with a bounded timeout.
//!
//! [`GameStateServer::stop`] signals the accept loop, gives in-flight
//! requests a bounded grace period, shuts the runtime down with the same
//! bound and joins the thread. It is also run on drop.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::accessor::GameStateAccessor;
use crate::config::ServerConfig;
use crate::cors::{CorsPolicy, InvalidOrigin};
use crate::metrics::HostMetrics;
use crate::router::build_router;
use crate::state::AppState;

/// Worker threads for the listener runtime. The API serves low-frequency
/// dashboard polling.
const WORKER_THREADS: usize = 2;

/// Upper bound on concurrent accessor / metrics calls.
const MAX_BLOCKING_THREADS: usize = 16;

/// Errors that can occur when starting the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// `start` was called while a listener is running.
    #[error("game state API is already running")]
    AlreadyRunning,

    /// The configured CORS origin is unusable.
    #[error(transparent)]
    InvalidOrigin(#[from] InvalidOrigin),

    /// Failed to bind the listening socket.
    #[error("bind failed on {addr}: {source}")]
    Bind {
        /// The `host:port` that was requested.
        addr: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The listener did not report readiness in time.
    #[error("listener did not become ready within {0:?}")]
    ReadyTimeout(Duration),

    /// The listener thread or its runtime could not be created.
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// A running listener thread.
struct Listener {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    thread: JoinHandle<()>,
}

impl Listener {
    fn join(self) {
        if self.thread.join().is_err() {
            error!(addr = %self.local_addr, "listener thread panicked");
        }
    }
}

/// Everything the listener thread needs, moved into it at spawn time.
struct ListenerTask {
    bind_addr: String,
    router: Router,
    ready: SyncSender<Result<SocketAddr, ServerError>>,
    shutdown: watch::Receiver<bool>,
    running: Arc<AtomicBool>,
    grace: Duration,
}

/// The game state API server.
///
/// Configuration, CORS policy and the metrics registry are fixed at
/// construction and survive any number of start/stop cycles.
pub struct GameStateServer {
    config: ServerConfig,
    state: Arc<AppState>,
    cors: Arc<CorsPolicy>,
    running: Arc<AtomicBool>,
    listener: Mutex<Option<Listener>>,
}

impl core::fmt::Debug for GameStateServer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameStateServer")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl GameStateServer {
    /// Create a stopped server.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidOrigin`] if the configured CORS origin
    /// cannot be sent as a header value.
    pub fn new(
        config: ServerConfig,
        accessor: Arc<dyn GameStateAccessor>,
        metrics: Arc<HostMetrics>,
    ) -> Result<Self, ServerError> {
        let cors = Arc::new(CorsPolicy::new(&config.allowed_origin)?);
        Ok(Self {
            config,
            state: Arc::new(AppState::new(accessor, metrics)),
            cors,
            running: Arc::new(AtomicBool::new(false)),
            listener: Mutex::new(None),
        })
    }

    /// The configuration this server was built with.
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared state handed to handlers.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Whether a listener is currently accepting connections.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Address of the current listener, if running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        if !self.is_running() {
            return None;
        }
        self.lock_listener().as_ref().map(|l| l.local_addr)
    }

    /// Bind and start serving on a background thread.
    ///
    /// Blocks until the listener reports its bind result or the configured
    /// ready timeout elapses. Returns the bound address, which differs from
    /// the configured one when port `0` was requested.
    ///
    /// # Errors
    ///
    /// - [`ServerError::AlreadyRunning`] if a listener is active (no state
    ///   change).
    /// - [`ServerError::Bind`] if the address cannot be bound.
    /// - [`ServerError::ReadyTimeout`] if the listener did not report in time.
    /// - [`ServerError::Runtime`] if the thread or runtime could not start.
    pub fn start(&self) -> Result<SocketAddr, ServerError> {
        let mut slot = self.lock_listener();
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);

        if self.is_running() {
            warn!(addr = %bind_addr, "game state API is already running");
            return Err(ServerError::AlreadyRunning);
        }

        // A listener that died on its own leaves its thread behind.
        if let Some(stale) = slot.take() {
            stale.join();
        }

        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = ListenerTask {
            bind_addr: bind_addr.clone(),
            router: build_router(Arc::clone(&self.state), Arc::clone(&self.cors)),
            ready: ready_tx,
            shutdown: shutdown_rx,
            running: Arc::clone(&self.running),
            grace: self.config.shutdown_grace(),
        };

        info!(addr = %bind_addr, "starting game state API");
        let thread = std::thread::Builder::new()
            .name("gamestate-api".to_owned())
            .spawn(move || run_listener(task))
            .map_err(|e| ServerError::Runtime(format!("failed to spawn listener thread: {e}")))?;

        let timeout = self.config.ready_timeout();
        match ready_rx.recv_timeout(timeout) {
            Ok(Ok(local_addr)) => {
                info!(addr = %local_addr, "game state API started");
                *slot = Some(Listener {
                    local_addr,
                    shutdown: shutdown_tx,
                    thread,
                });
                Ok(local_addr)
            }
            Ok(Err(e)) => {
                error!(addr = %bind_addr, error = %e, "failed to start game state API");
                join_quietly(thread);
                Err(e)
            }
            Err(RecvTimeoutError::Timeout) => {
                error!(addr = %bind_addr, ?timeout, "game state API did not become ready");
                let _ = shutdown_tx.send(true);
                join_quietly(thread);
                self.running.store(false, Ordering::Release);
                Err(ServerError::ReadyTimeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => {
                join_quietly(thread);
                Err(ServerError::Runtime(
                    "listener thread exited before reporting readiness".to_owned(),
                ))
            }
        }
    }

    /// Stop the listener and join its thread. No-op when stopped.
    ///
    /// In-flight requests get the configured grace period; whatever is
    /// still running afterwards is dropped.
    pub fn stop(&self) {
        let Some(listener) = self.lock_listener().take() else {
            return;
        };

        info!(addr = %listener.local_addr, "stopping game state API");
        // Err only if the thread already exited and dropped its receiver.
        let _ = listener.shutdown.send(true);
        listener.join();
        self.running.store(false, Ordering::Release);
        info!("game state API stopped");
    }

    fn lock_listener(&self) -> MutexGuard<'_, Option<Listener>> {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for GameStateServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn join_quietly(thread: JoinHandle<()>) {
    if thread.join().is_err() {
        error!("listener thread panicked during startup");
    }
}

/// Body of the listener thread.
fn run_listener(task: ListenerTask) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(WORKER_THREADS)
        .max_blocking_threads(MAX_BLOCKING_THREADS)
        .thread_name("gamestate-api-worker")
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = task
                .ready
                .send(Err(ServerError::Runtime(format!("failed to build runtime: {e}"))));
            return;
        }
    };

    let grace = task.grace;
    let running = Arc::clone(&task.running);
    runtime.block_on(serve(task));
    // Blocking handlers stuck in the accessor must not hold the join forever.
    runtime.shutdown_timeout(grace);
    running.store(false, Ordering::Release);
}

async fn serve(task: ListenerTask) {
    let ListenerTask {
        bind_addr,
        router,
        ready,
        shutdown,
        running,
        grace,
    } = task;

    let listener = match TcpListener::bind(bind_addr.as_str()).await {
        Ok(listener) => listener,
        Err(source) => {
            let _ = ready.send(Err(ServerError::Bind {
                addr: bind_addr,
                source,
            }));
            return;
        }
    };
    let local_addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(source) => {
            let _ = ready.send(Err(ServerError::Bind {
                addr: bind_addr,
                source,
            }));
            return;
        }
    };

    running.store(true, Ordering::Release);
    if ready.send(Ok(local_addr)).is_err() {
        // `start` stopped waiting.
        running.store(false, Ordering::Release);
        return;
    }
    info!(addr = %local_addr, "game state API listening");

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_requested(shutdown.clone()))
        .into_future();
    let drain_deadline = async move {
        shutdown_requested(shutdown).await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!(addr = %local_addr, error = %e, "game state API listener failed");
            }
        }
        () = drain_deadline => {
            warn!(addr = %local_addr, ?grace, "in-flight requests did not drain in time, dropping them");
        }
    }
}

/// Resolves once shutdown is requested or the server handle is gone.
async fn shutdown_requested(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

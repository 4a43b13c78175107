//! Player model held by the registry.
//!
//! These types mirror what a realm server tracks per character. They are
//! deserializable so a roster can be preloaded from JSON; the registry
//! assigns identifiers itself.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Character gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male.
    #[default]
    Male,
    /// Female.
    Female,
}

/// Equipment slot, in paper-doll order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    /// Helmet.
    Head,
    /// Amulet.
    Neck,
    /// Shoulder pads.
    Shoulders,
    /// Shirt.
    Body,
    /// Chest armor.
    Chest,
    /// Belt.
    Waist,
    /// Leggings.
    Legs,
    /// Boots.
    Feet,
    /// Bracers.
    Wrists,
    /// Gloves.
    Hands,
    /// First ring.
    Finger1,
    /// Second ring.
    Finger2,
    /// First trinket.
    Trinket1,
    /// Second trinket.
    Trinket2,
    /// Cloak.
    Back,
    /// Main-hand weapon.
    MainHand,
    /// Off-hand weapon or shield.
    OffHand,
    /// Ranged weapon, relic or wand.
    Ranged,
    /// Guild tabard.
    Tabard,
}

/// Item rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemQuality {
    /// Grey.
    Poor,
    /// White.
    #[default]
    Common,
    /// Green.
    Uncommon,
    /// Blue.
    Rare,
    /// Purple.
    Epic,
    /// Orange.
    Legendary,
    /// Light gold.
    Artifact,
    /// Account-bound heirloom.
    Heirloom,
}

/// State of a quest in a player's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    /// Objectives outstanding.
    #[default]
    Incomplete,
    /// Ready to turn in.
    Complete,
    /// Failed (timer expired, escort died).
    Failed,
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// World position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Map identifier.
    pub map_id: u32,
    /// Zone identifier.
    pub zone_id: u32,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
    /// Facing, radians.
    pub orientation: f32,
}

/// Attribute and combat statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Current power (mana, rage, energy, runic power).
    pub power: u32,
    /// Maximum power.
    pub max_power: u32,
    /// Strength.
    pub strength: u32,
    /// Agility.
    pub agility: u32,
    /// Stamina.
    pub stamina: u32,
    /// Intellect.
    pub intellect: u32,
    /// Spirit.
    pub spirit: u32,
    /// Armor value.
    pub armor: u32,
    /// Melee attack power.
    pub attack_power: u32,
    /// Spell power.
    pub spell_power: u32,
    /// Melee critical strike chance, percent.
    pub crit_chance: f32,
    /// Dodge chance, percent.
    pub dodge_chance: f32,
}

/// An equipped item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedItem {
    /// Slot it occupies.
    pub slot: EquipmentSlot,
    /// Item template identifier.
    pub item_id: u32,
    /// Display name.
    pub name: String,
    /// Rarity.
    #[serde(default)]
    pub quality: ItemQuality,
    /// Item level.
    #[serde(default)]
    pub item_level: u16,
}

/// A trained skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Skill line identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Current rank.
    pub value: u16,
    /// Maximum rank at the player's current training.
    pub max_value: u16,
    /// Category (profession, weapon, language, class).
    #[serde(default)]
    pub category: String,
}

/// Progress on one quest objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestObjective {
    /// What has to be done.
    pub description: String,
    /// Count so far.
    pub current: u32,
    /// Count required.
    pub required: u32,
}

/// A quest in the player's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestEntry {
    /// Quest template identifier.
    pub id: u32,
    /// Quest title.
    pub title: String,
    /// Current status.
    #[serde(default)]
    pub status: QuestStatus,
    /// Objective progress.
    #[serde(default)]
    pub objectives: Vec<QuestObjective>,
}

/// A character known to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Character name, unique per realm (case-insensitive).
    pub name: String,
    /// Character level.
    pub level: u8,
    /// Race name.
    pub race: String,
    /// Class name.
    pub class: String,
    /// Gender.
    #[serde(default)]
    pub gender: Gender,
    /// Guild name, if any.
    #[serde(default)]
    pub guild: Option<String>,
    /// Copper held.
    #[serde(default)]
    pub money: u64,
    /// Whether the character is currently in the simulated world (not on
    /// a loading screen or logging out).
    #[serde(default = "default_in_world")]
    pub in_world: bool,
    /// World position.
    #[serde(default)]
    pub position: Position,
    /// Attributes and combat statistics.
    #[serde(default)]
    pub stats: PlayerStats,
    /// Equipped items.
    #[serde(default)]
    pub equipment: Vec<EquippedItem>,
    /// Trained skills.
    #[serde(default)]
    pub skills: Vec<Skill>,
    /// Quest log.
    #[serde(default)]
    pub quests: Vec<QuestEntry>,
}

const fn default_in_world() -> bool {
    true
}

impl Player {
    /// A level-1 character with empty stats, logged in and in the world.
    pub fn new(
        name: impl Into<String>,
        race: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            level: 1,
            race: race.into(),
            class: class.into(),
            gender: Gender::default(),
            guild: None,
            money: 0,
            in_world: true,
            position: Position::default(),
            stats: PlayerStats::default(),
            equipment: Vec::new(),
            skills: Vec::new(),
            quests: Vec::new(),
        }
    }
}

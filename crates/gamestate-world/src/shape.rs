//! JSON shaping of player data for the API payloads.
//!
//! Each function produces exactly one endpoint's payload. Shapes are
//! built explicitly with `json!` so the wire format does not silently
//! follow changes to the in-memory model.

use serde_json::{Value, json};

use crate::player::{EquippedItem, Player};

/// Player profile (`/api/player/{name}`).
pub fn profile(player: &Player, include_equipment: bool) -> Value {
    let mut body = summary(player);
    if let Value::Object(map) = &mut body {
        map.insert("stats".to_owned(), stats(player));
        map.insert(
            "position".to_owned(),
            json!({
                "map_id": player.position.map_id,
                "zone_id": player.position.zone_id,
                "x": player.position.x,
                "y": player.position.y,
                "z": player.position.z,
                "orientation": player.position.orientation,
            }),
        );
        if include_equipment {
            map.insert("equipment".to_owned(), equipment(player));
        }
    }
    body
}

/// Roster entry (`/api/players`).
pub fn roster_entry(player: &Player, include_equipment: bool) -> Value {
    let mut body = summary(player);
    if include_equipment && let Value::Object(map) = &mut body {
        map.insert("equipment".to_owned(), equipment(player));
    }
    body
}

/// Statistics (`/api/player/{name}/stats`).
pub fn stats(player: &Player) -> Value {
    let s = &player.stats;
    json!({
        "health": s.health,
        "max_health": s.max_health,
        "power": s.power,
        "max_power": s.max_power,
        "attributes": {
            "strength": s.strength,
            "agility": s.agility,
            "stamina": s.stamina,
            "intellect": s.intellect,
            "spirit": s.spirit,
        },
        "armor": s.armor,
        "attack_power": s.attack_power,
        "spell_power": s.spell_power,
        "crit_chance": s.crit_chance,
        "dodge_chance": s.dodge_chance,
    })
}

/// Equipment (`/api/player/{name}/equipment`), sorted by slot.
pub fn equipment(player: &Player) -> Value {
    let mut items: Vec<&EquippedItem> = player.equipment.iter().collect();
    items.sort_by_key(|item| item.slot);
    Value::Array(
        items
            .into_iter()
            .map(|item| {
                json!({
                    "slot": item.slot,
                    "item_id": item.item_id,
                    "name": item.name,
                    "quality": item.quality,
                    "item_level": item.item_level,
                })
            })
            .collect(),
    )
}

/// Brief skill list (`/api/player/{name}/skills`).
pub fn skills(player: &Player) -> Value {
    Value::Array(
        player
            .skills
            .iter()
            .map(|skill| {
                json!({
                    "id": skill.id,
                    "name": skill.name,
                    "value": skill.value,
                })
            })
            .collect(),
    )
}

/// Full skill list (`/api/player/{name}/skills-full`).
pub fn skills_full(player: &Player) -> Value {
    Value::Array(
        player
            .skills
            .iter()
            .map(|skill| {
                json!({
                    "id": skill.id,
                    "name": skill.name,
                    "value": skill.value,
                    "max_value": skill.max_value,
                    "category": skill.category,
                })
            })
            .collect(),
    )
}

/// Quest log (`/api/player/{name}/quests`).
pub fn quests(player: &Player) -> Value {
    let quests: Vec<Value> = player
        .quests
        .iter()
        .map(|quest| {
            json!({
                "id": quest.id,
                "title": quest.title,
                "status": quest.status,
                "objectives": quest.objectives,
            })
        })
        .collect();
    json!({
        "count": quests.len(),
        "quests": quests,
    })
}

fn summary(player: &Player) -> Value {
    json!({
        "name": player.name,
        "level": player.level,
        "race": player.race,
        "class": player.class,
        "gender": player.gender,
        "guild": player.guild,
        "money": player.money,
        "zone_id": player.position.zone_id,
        "online": player.in_world,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{EquipmentSlot, ItemQuality, Skill};

    fn make_player() -> Player {
        let mut player = Player::new("Thrall", "Orc", "Shaman");
        player.level = 80;
        player.equipment = vec![
            EquippedItem {
                slot: EquipmentSlot::MainHand,
                item_id: 17182,
                name: String::from("Doomhammer"),
                quality: ItemQuality::Legendary,
                item_level: 90,
            },
            EquippedItem {
                slot: EquipmentSlot::Head,
                item_id: 1000,
                name: String::from("Helm"),
                quality: ItemQuality::Rare,
                item_level: 80,
            },
        ];
        player.skills = vec![Skill {
            id: 373,
            name: String::from("Enhancement"),
            value: 400,
            max_value: 450,
            category: String::from("class"),
        }];
        player
    }

    #[test]
    fn profile_embeds_equipment_only_on_request() {
        let player = make_player();
        assert!(profile(&player, false).get("equipment").is_none());
        let full = profile(&player, true);
        assert_eq!(full["equipment"].as_array().map(Vec::len), Some(2));
        assert_eq!(full["name"], "Thrall");
        assert_eq!(full["stats"]["attributes"]["strength"], 0);
    }

    #[test]
    fn equipment_is_sorted_by_slot() {
        let items = equipment(&make_player());
        assert_eq!(items[0]["slot"], "head");
        assert_eq!(items[1]["slot"], "main_hand");
        assert_eq!(items[1]["quality"], "legendary");
    }

    #[test]
    fn brief_skills_omit_max_value() {
        let player = make_player();
        assert!(skills(&player)[0].get("max_value").is_none());
        assert_eq!(skills_full(&player)[0]["max_value"], 450);
    }

    #[test]
    fn roster_entry_omits_equipment_by_default() {
        let player = make_player();
        assert!(roster_entry(&player, false).get("equipment").is_none());
        assert!(roster_entry(&player, true)["equipment"].is_array());
    }
}

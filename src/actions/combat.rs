use tracing::warn;

use crate::actions::report;
use crate::bot::BotContext;
use crate::error::{ActionError, ActionResult};
use crate::types::{Goal, ItemStack};

pub const DEFAULT_ATTACK_DISTANCE: f64 = 16.0;

/// Sword materials, weakest first
const SWORD_MATERIALS: [&str; 6] = ["wooden", "stone", "golden", "iron", "diamond", "netherite"];

const ATTACK_RANGE: f64 = 2.0;

/// Rank of a sword by material; `None` for anything that isn't a known sword
pub fn sword_rank(name: &str) -> Option<usize> {
    let material = name.strip_suffix("_sword")?;
    SWORD_MATERIALS.iter().position(|m| *m == material)
}

/// Strongest sword among `items`. Swords of an unknown material rank below
/// every known one.
pub fn best_sword(items: &[ItemStack]) -> Option<&ItemStack> {
    items
        .iter()
        .filter(|i| i.name.contains("sword"))
        .max_by_key(|i| sword_rank(&i.name).map(|r| r as i64).unwrap_or(-1))
}

/// Attack the closest entity named `kind` within `max_distance`, switching
/// to the best sword first.
pub async fn attack_entity(ctx: &BotContext, kind: &str, max_distance: f64) -> ActionResult<()> {
    let conn = ctx.conn();
    let me = conn.position();
    let target = conn
        .entities()
        .into_iter()
        .filter(|e| e.name == kind)
        .map(|e| (e.position.distance_to(&me), e))
        .filter(|(d, _)| *d <= max_distance)
        .min_by(|(a, _), (b, _)| a.total_cmp(b));

    let Some((distance, entity)) = target else {
        return Err(report(
            ctx,
            ActionError::NotFound(format!("No {} found within {} blocks", kind, max_distance)),
        ));
    };

    ctx.say(format!(
        "Attacking {} that is {} blocks away",
        kind,
        distance.round()
    ));

    let inventory = conn.inventory();
    if let Some(sword) = best_sword(&inventory) {
        if let Err(e) = conn.equip(sword).await {
            warn!("Could not equip {}: {}", sword.name, e);
        }
    }

    let goal = Goal::Near {
        target: entity.position,
        range: ATTACK_RANGE,
    };
    conn.navigator()
        .goto(goal)
        .await
        .map_err(|e| report(ctx, ActionError::navigation(kind.to_string(), e)))?;

    let eyes = entity.position.offset(0.0, entity.height, 0.0);
    conn.look_at(eyes)
        .await
        .map_err(|e| report(ctx, ActionError::rejected(format!("attack {}", kind), e)))?;
    conn.attack(&entity)
        .await
        .map_err(|e| report(ctx, ActionError::rejected(format!("attack {}", kind), e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{context, sim};
    use crate::bot::Connection;
    use crate::sim::SimCall;
    use crate::types::Vec3;

    fn stack(name: &str, slot: usize) -> ItemStack {
        ItemStack {
            kind: slot as u32,
            name: name.to_string(),
            display_name: name.to_string(),
            count: 1,
            slot,
        }
    }

    #[test]
    fn test_sword_ranking() {
        assert!(sword_rank("netherite_sword") > sword_rank("diamond_sword"));
        assert!(sword_rank("diamond_sword") > sword_rank("iron_sword"));
        assert!(sword_rank("iron_sword") > sword_rank("golden_sword"));
        assert!(sword_rank("golden_sword") > sword_rank("stone_sword"));
        assert!(sword_rank("stone_sword") > sword_rank("wooden_sword"));
        assert_eq!(sword_rank("wooden_pickaxe"), None);
    }

    #[test]
    fn test_best_sword_picks_strongest() {
        let items = vec![
            stack("stone_sword", 0),
            stack("diamond_sword", 1),
            stack("cobblestone", 2),
            stack("golden_sword", 3),
        ];
        assert_eq!(best_sword(&items).map(|i| i.name.as_str()), Some("diamond_sword"));

        let items = vec![stack("mystery_sword", 0), stack("wooden_sword", 1)];
        assert_eq!(best_sword(&items).map(|i| i.name.as_str()), Some("wooden_sword"));
        assert!(best_sword(&[stack("stick", 0)]).is_none());
    }

    #[tokio::test]
    async fn test_attack_closest_with_best_sword() {
        let sim = sim();
        sim.with_item("wooden_sword", 1).with_item("iron_sword", 1);
        let far = sim.with_entity("zombie", Vec3::new(12.5, 64.0, 0.5));
        let near = sim.with_entity("zombie", Vec3::new(4.5, 64.0, 0.5));
        let ctx = context(&sim);

        attack_entity(&ctx, "zombie", 16.0).await.unwrap();
        let calls = sim.calls();
        assert!(calls.contains(&SimCall::Attack(near)));
        assert!(!calls.contains(&SimCall::Attack(far)));
        assert_eq!(sim.held_item().map(|i| i.name), Some("iron_sword".to_string()));
        assert_eq!(sim.chat_log(), vec!["Attacking zombie that is 4 blocks away".to_string()]);
    }

    #[tokio::test]
    async fn test_attack_nothing_in_range() {
        let sim = sim();
        sim.with_entity("skeleton", Vec3::new(40.5, 64.0, 0.5));
        let ctx = context(&sim);

        let err = attack_entity(&ctx, "skeleton", 16.0).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::Attack(_))), 0);
    }
}

use tracing::{error, info};

use crate::actions::report;
use crate::bot::BotContext;
use crate::error::{ActionError, ActionResult};
use crate::types::{Goal, Vec3};

/// Default distance kept while following a player
pub const DEFAULT_FOLLOW_DISTANCE: f64 = 3.0;

/// How close counts as "arrived" for `set_position`
const ARRIVAL_RANGE: f64 = 1.0;

/// Walk to a position. Without `y` only the horizontal distance counts.
pub async fn set_position(ctx: &BotContext, x: f64, y: Option<f64>, z: f64) -> ActionResult<()> {
    let target = match y {
        Some(y) => format!("{}, {}, {}", x, y, z),
        None => format!("{}, ~, {}", x, z),
    };
    info!("Moving to: {}", target);

    let navigator = ctx.conn().navigator();
    navigator.set_goal(None, false);
    let goal = match y {
        Some(y) => Goal::Near {
            target: Vec3::new(x, y, z),
            range: ARRIVAL_RANGE,
        },
        None => Goal::NearXZ {
            x,
            z,
            range: ARRIVAL_RANGE,
        },
    };

    match navigator.goto(goal).await {
        Ok(()) => {
            info!("Arrived at destination");
            Ok(())
        }
        Err(e) => {
            error!("Failed to reach destination: {}", e);
            Err(ActionError::navigation(target, e))
        }
    }
}

/// Follow a visible player for the configured duration, then return. The
/// follow goal stays active afterwards.
pub async fn follow_player(ctx: &BotContext, username: &str, distance: f64) -> ActionResult<()> {
    let entity = ctx
        .conn()
        .player(username)
        .and_then(|p| p.entity)
        .ok_or_else(|| report(ctx, ActionError::NotFound(format!("I can't see {}", username))))?;

    ctx.say(format!("Following {}", username));
    ctx.conn().navigator().set_goal(
        Some(Goal::Follow {
            entity: entity.id,
            range: distance,
        }),
        true,
    );
    tokio::time::sleep(ctx.settings().follow_duration).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{context, sim};
    use crate::bot::Connection;
    use crate::sim::SimCall;

    #[tokio::test]
    async fn test_set_position_reaches_target() {
        let sim = sim();
        let ctx = context(&sim);
        set_position(&ctx, 10.5, Some(64.0), -3.5).await.unwrap();
        let pos = sim.position();
        assert_eq!((pos.x, pos.y, pos.z), (10.5, 64.0, -3.5));
        assert_eq!(sim.count_calls(|c| matches!(c, SimCall::SetGoal(None))), 1);
    }

    #[tokio::test]
    async fn test_set_position_without_y_keeps_height() {
        let sim = sim();
        let ctx = context(&sim);
        set_position(&ctx, 4.0, None, 4.0).await.unwrap();
        let calls = sim.calls();
        assert!(calls
            .iter()
            .any(|c| matches!(c, SimCall::Goto(Goal::NearXZ { .. }))));
        assert_eq!(sim.position().y, 64.0);
    }

    #[tokio::test]
    async fn test_set_position_reports_unreachable() {
        let sim = sim();
        sim.set_navigation_fails(true);
        let ctx = context(&sim);
        let err = set_position(&ctx, 1.0, Some(64.0), 1.0).await.unwrap_err();
        assert!(matches!(err, ActionError::Navigation { .. }));
    }

    #[tokio::test]
    async fn test_follow_unknown_player() {
        let sim = sim();
        let ctx = context(&sim);
        let err = follow_player(&ctx, "Alex", DEFAULT_FOLLOW_DISTANCE)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(sim.chat_log(), vec!["I can't see Alex".to_string()]);
        assert!(sim.current_goal().is_none());
    }

    #[tokio::test]
    async fn test_follow_sets_dynamic_goal() {
        let sim = sim();
        let id = sim.with_player("Alex", Some(Vec3::new(8.5, 64.0, 8.5))).unwrap();
        let ctx = context(&sim);
        follow_player(&ctx, "Alex", 2.0).await.unwrap();
        assert_eq!(
            sim.current_goal(),
            Some(Goal::Follow {
                entity: id,
                range: 2.0
            })
        );
    }
}

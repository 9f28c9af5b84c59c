use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::actions::{self, FurnaceSnapshot};
use crate::bot::BotContext;
use crate::service::messages::{parse_request, FurnaceMsg, ItemMsg, RecipeMsg, Request, Response};
use crate::state::StateManager;
use crate::types::BlockPos;
use crate::workflows::{craft_wooden_pickaxe, PickaxeOutcome};

/// Run one request to completion and describe the outcome
pub async fn dispatch(ctx: &BotContext, request: Request) -> Response {
    match request {
        Request::SetPosition { x, y, z } => match actions::set_position(ctx, x, y, z).await {
            Ok(()) => Response::ok().with_message("Arrived"),
            Err(e) => e.into(),
        },
        Request::FollowPlayer { username, distance } => {
            match actions::follow_player(ctx, &username, distance).await {
                Ok(()) => Response::ok().with_message(format!("Following {}", username)),
                Err(e) => e.into(),
            }
        }
        Request::FindBlocks {
            block,
            max_distance,
            count,
        } => {
            let blocks = actions::find_blocks(ctx, &block, max_distance, count);
            Response {
                blocks: Some(blocks),
                ..Response::ok()
            }
        }
        Request::CollectBlocks {
            block,
            max_distance,
            count,
        } => match actions::collect_blocks(ctx, &block, max_distance, count).await {
            Ok(mined) => Response {
                count: Some(mined as u32),
                ..Response::ok()
            },
            Err(e) => e.into(),
        },
        Request::MineBlock { x, y, z } => {
            match actions::mine_block(ctx, BlockPos::new(x, y, z)).await {
                Ok(()) => Response::ok(),
                Err(e) => e.into(),
            }
        }
        Request::Inventory => Response {
            items: Some(actions::get_inventory(ctx).iter().map(ItemMsg::from).collect()),
            ..Response::ok()
        },
        Request::CountItem { item } => Response {
            count: Some(actions::count_item(ctx, &item)),
            ..Response::ok()
        },
        Request::Recipes { item } => match actions::recipes_for_item(ctx, &item) {
            Ok(recipes) => Response {
                recipes: Some(
                    recipes
                        .iter()
                        .map(|r| RecipeMsg::from_recipe(r, ctx.game_data()))
                        .collect(),
                ),
                ..Response::ok()
            },
            Err(e) => e.into(),
        },
        Request::CraftItem { item, count } => {
            match actions::craft_item_by_name(ctx, &item, count).await {
                Ok(()) => Response::ok(),
                Err(e) => e.into(),
            }
        }
        Request::CraftAt {
            item_id,
            table,
            count,
        } => match actions::craft_item_at(ctx, item_id, table, count).await {
            Ok(()) => Response::ok(),
            Err(e) => e.into(),
        },
        Request::PlaceBlock {
            x,
            y,
            z,
            face,
            item_id,
        } => match actions::place_block(ctx, BlockPos::new(x, y, z), face, item_id).await {
            Ok(()) => Response::ok(),
            Err(e) => e.into(),
        },
        Request::PlaceBlockNearPlayer { player, block } => {
            match actions::place_block_near_player(ctx, &player, &block).await {
                Ok(()) => Response::ok(),
                Err(e) => e.into(),
            }
        }
        Request::FurnaceInfo { x, y, z } => {
            match actions::furnace_info(ctx, BlockPos::new(x, y, z)).await {
                Ok(session) => {
                    let snapshot: FurnaceSnapshot = session.snapshot();
                    session.close();
                    Response {
                        furnace: Some(FurnaceMsg::from(&snapshot)),
                        ..Response::ok()
                    }
                }
                Err(e) => e.into(),
            }
        }
        Request::UseFurnace {
            x,
            y,
            z,
            input,
            fuel,
        } => match actions::use_furnace(ctx, BlockPos::new(x, y, z), &input, &fuel).await {
            Ok(output) => Response {
                items: Some(output.iter().map(ItemMsg::from).collect()),
                ..Response::ok()
            },
            Err(e) => e.into(),
        },
        Request::Attack {
            entity,
            max_distance,
        } => match actions::attack_entity(ctx, &entity, max_distance).await {
            Ok(()) => Response::ok(),
            Err(e) => e.into(),
        },
        Request::CraftWoodenPickaxe => match craft_wooden_pickaxe(ctx).await {
            Ok(PickaxeOutcome::AlreadyHad) => {
                Response::ok().with_message("Already had a wooden pickaxe")
            }
            Ok(PickaxeOutcome::Crafted) => Response::ok().with_message("Crafted a wooden pickaxe"),
            Err(e) => e.into(),
        },
    }
}

/// Serve JSON-line requests from `reader` until EOF or cancellation,
/// writing one JSON-line response per request. Requests run strictly one at
/// a time, in arrival order.
pub async fn serve_lines<R, W>(
    ctx: &BotContext,
    state: &StateManager,
    reader: R,
    mut writer: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    info!("Service ready, reading requests from input");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read request")?,
            _ = ctx.cancel_token().cancelled() => {
                info!("Service stopped");
                break;
            }
        };
        let Some(line) = line else {
            info!("Input closed, stopping service");
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match parse_request(line) {
            Ok(_) if !state.allows_actions() => {
                warn!("Request refused in state {:?}", state.get());
                Response::failed(format!("Bot is not ready ({:?})", state.get()))
            }
            Ok(request) => {
                debug!("Request: {:?}", request);
                dispatch(ctx, request).await
            }
            Err(e) => {
                warn!("Invalid request {:?}: {}", line, e);
                Response::failed(format!("Invalid request: {}", e))
            }
        };

        let mut json = serde_json::to_string(&response).context("Failed to encode response")?;
        json.push('\n');
        writer
            .write_all(json.as_bytes())
            .await
            .context("Failed to write response")?;
        writer.flush().await.context("Failed to flush response")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{context, sim};
    use crate::types::SessionState;

    fn spawned() -> StateManager {
        let state = StateManager::new();
        state.set(SessionState::Spawned);
        state
    }

    async fn serve(ctx: &BotContext, state: &StateManager, input: &str) -> Vec<Response> {
        let mut output = Vec::new();
        serve_lines(ctx, state, input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_requests_answered_in_order() {
        let sim = sim();
        sim.with_item("coal", 5);
        sim.with_block("oak_log", BlockPos::new(3, 64, 3));
        let ctx = context(&sim);

        let input = concat!(
            r#"{"type":"count_item","item":"coal"}"#,
            "\n\n",
            r#"{"type":"find_blocks","block":"oak_log","max_distance":16}"#,
            "\n",
            r#"{"type":"mine_block","x":3,"y":64,"z":3}"#,
            "\n",
            r#"{"type":"inventory"}"#,
            "\n",
        );
        let responses = serve(&ctx, &spawned(), input).await;
        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0].count, Some(5));
        assert_eq!(responses[1].blocks, Some(vec![BlockPos::new(3, 64, 3)]));
        assert!(responses[2].success);
        let items = responses[3].items.clone().unwrap();
        assert!(items.iter().any(|i| i.name == "oak_log" && i.count == 1));
    }

    #[tokio::test]
    async fn test_bad_lines_get_error_responses() {
        let sim = sim();
        let ctx = context(&sim);
        let responses = serve(&ctx, &spawned(), "{oops\n{\"type\":\"teleport\"}\n").await;
        assert_eq!(responses.len(), 2);
        assert!(responses.iter().all(|r| !r.success));
        assert!(responses[0]
            .message
            .as_deref()
            .unwrap()
            .starts_with("Invalid request"));
    }

    #[tokio::test]
    async fn test_refuses_before_spawn() {
        let sim = sim();
        let ctx = context(&sim);
        let responses = serve(&ctx, &StateManager::new(), "{\"type\":\"inventory\"}\n").await;
        assert!(!responses[0].success);
        assert!(sim.calls().is_empty());
    }

    #[tokio::test]
    async fn test_action_failure_maps_to_message() {
        let sim = sim();
        let ctx = context(&sim);
        let response = dispatch(
            &ctx,
            Request::CraftItem {
                item: "wooden_pickaxe".into(),
                count: 1,
            },
        )
        .await;
        assert!(!response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("I don't know how to craft wooden_pickaxe")
        );
    }

    #[tokio::test]
    async fn test_furnace_info_reports_slots() {
        let sim = sim();
        sim.with_lit_furnace(BlockPos::new(2, 64, 2), "charcoal", 2);
        let ctx = context(&sim);

        let response = dispatch(&ctx, Request::FurnaceInfo { x: 2, y: 64, z: 2 }).await;
        let furnace = response.furnace.unwrap();
        assert_eq!(furnace.fuel_item.map(|i| i.name), Some("charcoal".to_string()));
        assert!(furnace.fuel > 0.0);
        assert!(furnace.input_item.is_none());
    }

    #[tokio::test]
    async fn test_place_at_extreme_coordinate_keeps_serving() {
        let sim = sim();
        sim.with_item("cobblestone", 1);
        let ctx = context(&sim);

        let input = concat!(
            r#"{"type":"place_block","x":2147483647,"y":63,"z":0,"face":{"x":1,"y":0,"z":0},"item_id":103}"#,
            "\n",
            r#"{"type":"count_item","item":"cobblestone"}"#,
            "\n",
        );
        let responses = serve(&ctx, &spawned(), input).await;
        assert_eq!(responses.len(), 2);
        assert!(!responses[0].success);
        assert_eq!(responses[1].count, Some(1));
    }
}

use anyhow::Result;
use dialoguer::Input;
use mineros::{
    bot::{BotClient, BotContext},
    config::{ConfigLoader, Interface},
    console::run_menu,
    game_data::GameData,
    logging::init_logger,
    service::serve_lines,
    sim::SimConnection,
    state::StateManager,
    workflows::craft_wooden_pickaxe,
};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    init_logger()?;
    info!("Starting Mineros v{}", VERSION);

    let config_loader = ConfigLoader::new();
    let mut config = config_loader.load()?;

    // Prompt for username if not set
    if config.needs_username() {
        let name: String = Input::new()
            .with_prompt("Enter the bot's username")
            .interact_text()?;
        config.username = name;
        config_loader.save(&config)?;
    }

    info!(
        "Configuration loaded for {} -> {} (auth: {:?}, version: {})",
        config.username,
        config.address(),
        config.auth,
        config.version.as_deref().unwrap_or("auto")
    );

    let game_data = Arc::new(GameData::load(
        config.game_data_path.as_deref(),
        config.version.as_deref(),
    )?);

    // No protocol client is linked in; the bot lives in the sandbox world
    warn!(
        "Not connecting to {}: running {} in the offline sandbox",
        config.address(),
        config.username
    );
    let conn = Arc::new(SimConnection::demo(&config.username, game_data.clone()));

    let state = StateManager::new();
    let client = Arc::new(BotClient::new(
        conn.clone(),
        state.clone(),
        config.movement.clone(),
        config.hide_errors,
    ));
    client.wait_for_spawn().await?;
    let events = client.clone().spawn_event_loop();

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            ctrl_c.cancel();
        }
    });

    let ctx = BotContext::new(conn, game_data, config.timings.to_settings())
        .with_cancellation(cancel.clone());

    match config.interface {
        Interface::Menu => run_menu(&ctx, &state).await?,
        Interface::Service => {
            let stdin = BufReader::new(tokio::io::stdin());
            serve_lines(&ctx, &state, stdin, tokio::io::stdout()).await?;
        }
        Interface::CraftWoodenPickaxe => match craft_wooden_pickaxe(&ctx).await {
            Ok(outcome) => info!("Wooden pickaxe task finished: {:?}", outcome),
            Err(e) => warn!("Wooden pickaxe task failed: {}", e),
        },
        Interface::Idle => {
            info!("Idling until Ctrl-C");
            cancel.cancelled().await;
        }
    }

    events.abort();
    info!("Shutting down");
    Ok(())
}

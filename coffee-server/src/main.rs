use anyhow::Context;
use coffee_server::{Config, Server, ServerState, init_logger_with_file, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env
    setup_environment();

    // 2. Configuration and logging
    let config = Config::from_env().context("Invalid configuration")?;
    init_logger_with_file(
        config.log_level.as_deref(),
        config.log_json,
        config.log_dir.as_deref(),
    );

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        run_mode = %config.run_mode,
        "Coffee server starting"
    );

    // 3. State
    let state = ServerState::initialize(&config)
        .await
        .context("Failed to initialize server state")?;

    // 4. HTTP listener and/or job processor until Ctrl-C
    Server::with_state(config, state)
        .run()
        .await
        .context("Server error")?;

    Ok(())
}

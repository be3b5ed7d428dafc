use anyhow::{Context, Result};
use playbook_server::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment variables
    let config = ServerConfig::load().context("Failed to load configuration")?;

    playbook_server::init_logging(&config);

    // Run the server using the library's run function
    playbook_server::run(config).await.context("Server error")?;

    Ok(())
}

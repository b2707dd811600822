//! Bet submission client.
//!
//! Reads a JSON configuration from the path given as the first argument
//! (default `client.json`) and runs one full submission against the
//! configured server. SIGINT/SIGTERM stop the run at the next batch
//! boundary.
//!
//! ```sh
//! cargo run --example submit -- client.json
//! ```

use betwire::{shutdown, Client, ClientConfig, SessionOutcome};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "client.json".to_string());
    let config = ClientConfig::from_json_file(&path)?;
    let client = Client::new(config)?;

    let cancel = shutdown::shutdown_token();
    match client.run(&cancel).await? {
        SessionOutcome::Completed { winners } => {
            info!(action = "run", result = "success", winners);
        }
        SessionOutcome::Cancelled => {
            info!(action = "run", result = "cancelled");
        }
    }
    Ok(())
}

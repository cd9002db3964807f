//! Tripweave client entry point.

use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tripweave_client::app::{App, Flow};
use tripweave_client::config::ClientConfig;
use tripweave_client::error::ClientError;
use tripweave_client::session::SessionStore;
use tripweave_client::telemetry::init_tracing;
use tripweave_client::{RestClient, TripBackend};
use tripweave_core::QueryParameters;

/// How often finished searches are picked up between input lines.
const SEARCH_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let config = ClientConfig::load()?;
    init_tracing(&config.logging)?;

    let backend: Arc<dyn TripBackend> = Arc::new(RestClient::new(&config)?);
    let store = SessionStore::open(&config.session_path)?;
    let logged_in = store.context().user_id();
    tracing::info!(api = %config.api_base_url, user_id = ?logged_in, "client started");

    let mut app = App::new(
        backend,
        store,
        QueryParameters::default(),
        config.editor_settings(),
    );

    print_lines(app.drain_transcript());
    match logged_in {
        Some(user_id) => println!("Logged in as user {}. Type /help for commands.", user_id),
        None => println!("Not logged in. Use /login <email> <password>, or /help."),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(SEARCH_POLL_INTERVAL);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(search) = app.poll_search() {
                    println!("{}", search);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let mut out = Vec::new();
                let flow = app.handle_line(&line, &mut out).await;
                print_lines(app.drain_transcript());
                print_lines(out);
                if flow == Flow::Quit {
                    break;
                }
            }
        }
    }

    tracing::info!("client stopped");
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

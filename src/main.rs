//! Visitor Gate - entry point

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use visitor_gate::challenge::ChallengeStore;
use visitor_gate::config::Config;
use visitor_gate::events::EventLog;
use visitor_gate::server::{AppState, Server};
use visitor_gate::tracker::VisitTracker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    info!("Starting Visitor Gate");
    info!("Server: {}:{}", config.server.host, config.server.port);
    info!("Static UI: {}", config.static_files.dir);
    info!(
        "Detection: visit_deadline={}ms, session_ttl={}s, challenge_ttl={}s",
        config.detection.visit_deadline.as_millis(),
        config.detection.session_ttl.as_secs(),
        config.detection.challenge_ttl.as_secs()
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let events = EventLog::new();

    let state = AppState {
        challenges: Arc::new(ChallengeStore::new(config.detection.challenge_ttl)),
        tracker: Arc::new(VisitTracker::new(
            config.detection.visit_deadline,
            config.detection.session_ttl,
            events.clone(),
        )),
        events,
        static_dir: PathBuf::from(&config.static_files.dir),
        max_body_bytes: config.detection.max_body_bytes,
    };

    let server = Server::bind(addr, state).await?;

    info!("Server listening on {}", server.addr());

    server.run().await?;

    Ok(())
}

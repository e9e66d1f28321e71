//! Algorithm Trace Visualization Server
//!
//! Load a demo trace and serve it with playback controls.

use std::env;

use algoviz_playback::{PlaybackConfig, SchedulerKind, DEFAULT_SPEED_MS};
use algoviz_trace::{presets, Algorithm};
use algoviz_vis::{SessionConfig, SessionHandle, VisServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "algoviz=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line args
    let args: Vec<String> = env::args().collect();

    let algorithm: Algorithm = match args.get(1) {
        Some(name) => name.parse()?,
        None => Algorithm::Kruskal,
    };

    let port: u16 = args.get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3000);

    let speed_ms: u64 = args.get(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SPEED_MS);

    let scheduler: SchedulerKind = match args.get(4) {
        Some(kind) => kind.parse()?,
        None => SchedulerKind::Timer,
    };

    println!("Algorithm Visualizer");
    println!("====================");
    println!();
    println!("Algorithm: {} ({})", algorithm.title(), algorithm);
    println!("Playback:  {} ms per step, {} scheduler", speed_ms, scheduler);

    let config = SessionConfig::default().with_playback(
        PlaybackConfig::default()
            .with_speed_ms(speed_ms)
            .with_scheduler(scheduler),
    );
    let session = SessionHandle::spawn(config, presets::demo(algorithm))?;

    println!("Trace:     {} steps", session.state().status.len);
    println!();
    println!("Starting visualization server on http://localhost:{}", port);
    println!();

    // Start server
    let server = VisServer::new(session);
    server.serve(port).await?;

    Ok(())
}

//! Demonstrates declaring signals, prioritized subscribers and the three
//! delivery styles.
//!
//! Run with `RUST_LOG=signal_bus=debug` to see dispatch tracing.

use std::sync::Arc;
use std::time::Duration;

use signal_bus::logging::{log_startup, setup_logging, LoggingConfig};
use signal_bus::{BindingStyle, Receiver, SignalBus, SignalBusConfig};
use tracing::{info, Level};

#[derive(Debug)]
struct PlayerScored {
    player: &'static str,
    points: u32,
}

#[derive(Debug)]
struct MatchFinished {
    winner: &'static str,
}

#[derive(Debug)]
struct ReplaySaved {
    frames: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging(&LoggingConfig::for_level(Level::INFO))?;

    let config = SignalBusConfig::from_env()?;
    log_startup(&config);
    let bus = SignalBus::with_config(config);

    bus.declare::<PlayerScored>()?;
    bus.declare_with_style::<MatchFinished>(BindingStyle::AsyncTask)?;
    bus.declare_with_style::<ReplaySaved>(BindingStyle::AsyncLightweight)?;

    let scoreboard = Receiver::sync(|event: &PlayerScored| {
        info!("scoreboard: {} +{}", event.player, event.points);
    });
    let announcer = Receiver::sync(|event: &PlayerScored| {
        info!("announcer: what a shot by {}!", event.player);
    });
    bus.subscribe_with_priority(&scoreboard, 10)?;
    bus.subscribe(&announcer)?;

    bus.subscribe(&Receiver::task(|event: Arc<MatchFinished>| async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        info!("stats uploaded for winner {}", event.winner);
        Ok(())
    }))?;
    bus.subscribe(&Receiver::task(|event: Arc<MatchFinished>| async move {
        info!("lobby notified: {} won", event.winner);
        Ok(())
    }))?;

    bus.subscribe(&Receiver::lightweight(|event: Arc<ReplaySaved>| async move {
        anyhow::ensure!(event.frames > 0, "replay is empty");
        info!("replay indexed ({} frames)", event.frames);
        Ok(())
    }))?;

    bus.emit(PlayerScored { player: "ada", points: 3 }).await?;
    bus.unsubscribe(&announcer)?;
    bus.fire(&PlayerScored { player: "lin", points: 2 })?;

    bus.emit(MatchFinished { winner: "ada" }).await?;

    if let Err(err) = bus.emit(ReplaySaved { frames: 0 }).await {
        info!("replay rejected: {}", err);
    }
    bus.emit_detached(ReplaySaved { frames: 1200 })?.await??;

    Ok(())
}

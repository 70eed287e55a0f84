//! # Player Demo
//!
//! Loads the bundled catalog, opens the first video on the simulated desktop
//! player and drives the transport the way the player screen would.
//!
//! Run with: `cargo run --example player_demo --package core-service`

use anyhow::Context;
use bridge_traits::logging::LogLevel;
use core_playback::{ControlViewState, SessionCallbacks};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::path::Path;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Info),
    )?;

    let resources = Path::new(env!("CARGO_MANIFEST_DIR")).join("../core-catalog/resources");
    let service = core_service::bootstrap_desktop(resources)?;

    // ========================================================================
    // List screen
    // ========================================================================

    let videos = service.load_videos().await;
    println!("{} videos", videos.len());
    for row in videos.rows() {
        println!("  {}", row.title);
    }

    // ========================================================================
    // Player screen
    // ========================================================================

    let callbacks = SessionCallbacks::new()
        .on_state_change(|from, snapshot| {
            println!("state: {} -> {}", from, snapshot.state);
        })
        .on_periodic_time_update(|snapshot| {
            let controls = ControlViewState::from_snapshot(snapshot);
            println!(
                "{} / -{}  rate {:.1}",
                controls.elapsed_label, controls.remaining_label, snapshot.rate
            );
        });

    let session = service
        .open_video(0, callbacks)
        .await
        .context("failed to open the first video")?;

    tokio::time::sleep(Duration::from_secs(2)).await;
    session.skip_forward().await?;
    tokio::time::sleep(Duration::from_secs(1)).await;
    session.fast_forward().await?;
    tokio::time::sleep(Duration::from_secs(1)).await;
    session.play().await?;

    let controls = service.control_view().await;
    println!(
        "controls: icon {:?}, slider {}/{}",
        controls.play_pause_icon, controls.slider_value, controls.slider_max
    );

    service.close_video().await;
    Ok(())
}

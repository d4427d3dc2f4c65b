//! fx-showcase: runs the storm, seasons, cave and treasure effects headless
//! through a simulated scroll of the story and logs what they did.

mod config;
mod scene;

use anyhow::{ensure, Result};

use config::ShowcaseConfig;
use scene::{Showcase, FIELD_NAMES};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ShowcaseConfig::load();
    ensure!(
        config.frame_rate > 0.0 && config.frame_rate.is_finite(),
        "frame_rate must be positive, got {}",
        config.frame_rate
    );
    log::info!(
        "fx-showcase: seed {}, {} frames at {} Hz, simulated at {} Hz, story scroll {}s",
        config.seed,
        config.frames,
        config.frame_rate,
        config.sim_rate,
        config.scroll_seconds
    );

    let mut showcase = Showcase::build(&config)?;
    let mut flashes = 0u32;
    let mut lit = false;
    for frame in 0..config.frames {
        let now = (frame + 1) as f32 / config.frame_rate;
        let report = showcase.frame_at(now);
        if report.failures > 0 {
            log::warn!("frame {}: {} effect(s) failed", frame, report.failures);
        }
        if report.steps > 0 {
            if report.flash > 0.0 && !lit {
                flashes += 1;
            }
            lit = report.flash > 0.0;
        }
        if frame % config.frame_rate.max(1.0) as u32 == 0 {
            log::debug!(
                "frame {}: chapter {}, {} steps, {} fields, {} recycled, {} links",
                frame,
                report.chapter,
                report.steps,
                report.fields_ticked,
                report.recycled,
                report.links
            );
        }
    }
    log::info!(
        "Ended in chapter {}, camera at {:?}",
        showcase.chapter(),
        showcase.camera_position()
    );
    for name in FIELD_NAMES {
        if let Some(stats) = showcase.field_stats(name) {
            log::info!(
                "  {:<9} {:>5} particles, {:>6} ticks, {:>7} recycled",
                name,
                stats.capacity,
                stats.ticks,
                stats.recycled
            );
        }
    }

    let summary = showcase.dispose();
    log::info!(
        "Done: {} frames, {} steps ({:.1}s), {} particles, {} recycled, {} sea vertices, {} lightning flashes ({} seen)",
        summary.frames,
        summary.steps,
        summary.elapsed,
        summary.particles,
        summary.recycled,
        summary.surface_vertices,
        summary.flashes,
        flashes
    );
    if !summary.disabled.is_empty() {
        log::warn!("Disabled effects: {}", summary.disabled.join(", "));
    }
    Ok(())
}

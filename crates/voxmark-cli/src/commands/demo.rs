//! Demo command: event storm against a headless viewer.
//!
//! Several threads fire a mix of viewer events as fast as they can. Once
//! the storm is over the debounce thread should have run a handful of
//! refreshes and camera syncs, not one per event.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;
use voxmark_bridge::{Bridge, BridgeConfig, ViewerEvent};
use voxmark_core::Channel;
use voxmark_ops::RefreshOutcome;

use crate::DemoArgs;
use crate::headless::{HeadlessSink, HeadlessViewer};

#[derive(Default)]
struct Counters {
    published: AtomicU64,
    skipped: AtomicU64,
    spot_reports: AtomicU64,
}

/// Runs the demo and prints a report.
pub fn run(args: DemoArgs, config: BridgeConfig, verbose: bool) -> Result<()> {
    let source = Arc::new(super::sphere_source(args.dataset)?);
    let frames = args.dataset.frames;
    let viewer = Arc::new(HeadlessViewer::new(args.time.min(frames - 1)));
    let sink = Arc::new(HeadlessSink::default());
    let counters = Arc::new(Counters::default());

    let mut bridge = Bridge::builder(config)
        .on_content({
            let counters = Arc::clone(&counters);
            move |update| {
                let slot = match update.outcome {
                    RefreshOutcome::Published { .. } => &counters.published,
                    RefreshOutcome::Skipped { .. } => &counters.skipped,
                };
                slot.fetch_add(1, Ordering::Relaxed);
            }
        })
        .on_spot_moved({
            let counters = Arc::clone(&counters);
            move |_| {
                counters.spot_reports.fetch_add(1, Ordering::Relaxed);
            }
        })
        .attach(viewer.clone(), source, sink.clone())
        .context("Failed to attach bridge")?;

    let start = Instant::now();
    let producers: Vec<_> = (0..args.producers)
        .map(|p| {
            let viewer = Arc::clone(&viewer);
            let (events, base) = (args.events, args.time);
            thread::Builder::new()
                .name(format!("producer-{p}"))
                .spawn(move || storm(&viewer, p, events, base, frames))
        })
        .collect::<std::io::Result<_>>()
        .context("Failed to spawn producer threads")?;
    for handle in producers {
        if handle.join().is_err() {
            anyhow::bail!("producer thread panicked");
        }
    }
    let storm_time = start.elapsed();

    wait_until_idle(&config, &counters);
    let (published, skipped, spots) = (
        counters.published.load(Ordering::Relaxed),
        counters.skipped.load(Ordering::Relaxed),
        counters.spot_reports.load(Ordering::Relaxed),
    );
    info!(published, skipped, "storm settled");

    println!("Events fired:     {} in {:.1} ms", viewer.events_fired(), ms(storm_time));
    println!("Refreshes:        {published} published, {skipped} skipped");
    println!("Camera syncs:     {}", sink.camera_syncs());
    println!("Spot reports:     {spots}");
    println!("Channel uploads:  {}", sink.uploads(Channel::Red));
    println!("Generation:       {}", bridge.channels().generation());
    if verbose {
        let cam = sink.camera();
        println!("Camera rotation:  {:?}", cam.rotation);
        println!("Camera position:  {:?}", cam.position);
        if let Some(r) = sink.range() {
            println!("Display range:    [{}, {}]", r.min, r.max);
        }
    }

    for _ in 0..args.play {
        let t0 = Instant::now();
        let t = bridge.next_timepoint().context("Playback step failed")?;
        println!("  t={t:<4} {:.1} ms", ms(t0.elapsed()));
    }

    bridge.close().context("Failed to close bridge")?;
    Ok(())
}

/// One producer's share of the storm.
fn storm(viewer: &HeadlessViewer, producer: usize, events: usize, base: usize, frames: usize) {
    for i in 0..events {
        let event = match (producer + i) % 6 {
            0 => {
                let t = (base + i / 100) % frames;
                viewer.set_time(t);
                ViewerEvent::TimeIndexChanged(t)
            }
            1 => {
                viewer.set_yaw(i as f32 * 0.01, 1.5);
                ViewerEvent::ViewTransformChanged
            }
            2 => ViewerEvent::SpotsChanged,
            3 => ViewerEvent::FocusChanged,
            4 => ViewerEvent::ColoringChanged,
            _ => ViewerEvent::SpotMoved(producer as u64),
        };
        viewer.fire(event);
    }
}

/// Waits until every quiet period has passed and no refresh has completed
/// for a while.
fn wait_until_idle(config: &BridgeConfig, counters: &Counters) {
    let t = config.timing;
    let quiet = t.content_quiet_ms.max(t.view_quiet_ms).max(t.spot_quiet_ms);
    let idle = Duration::from_millis(quiet * 4 + t.settle_delay_ms * 3 + 100);
    let deadline = Instant::now() + Duration::from_secs(30);

    let mut last = u64::MAX;
    while Instant::now() < deadline {
        thread::sleep(idle);
        let now = counters.published.load(Ordering::Relaxed)
            + counters.skipped.load(Ordering::Relaxed);
        if now == last {
            return;
        }
        last = now;
    }
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1e3
}

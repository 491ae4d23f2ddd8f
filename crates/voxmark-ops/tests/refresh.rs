//! Refresh controller behaviour against a recording renderer.

use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use voxmark_core::{Channel, Dims, Error, Result, Spot, VoxelVolume};
use voxmark_ops::synthetic::SphereSource;
use voxmark_ops::{
    ChannelPublisher, RefreshController, RefreshOptions, RefreshOutcome, RefreshState,
    RenderSettings, VolumeSource,
};
use voxmark_transfer::DisplayRange;

#[derive(Default)]
struct Recorder {
    channels: Mutex<Vec<Channel>>,
    ranges: Mutex<Vec<DisplayRange>>,
}

impl ChannelPublisher for Recorder {
    fn publish_channel_update(&self, channel: Channel) {
        self.channels.lock().unwrap().push(channel);
    }

    fn set_display_range(&self, range: DisplayRange) {
        self.ranges.lock().unwrap().push(range);
    }
}

/// Sphere source with selectable failures, keyed by time index.
struct Flaky {
    inner: SphereSource,
    missing_volumes: HashSet<usize>,
    broken_volumes: HashSet<usize>,
    broken_spots: HashSet<usize>,
}

impl Flaky {
    fn new() -> Self {
        Self {
            inner: SphereSource::new([24, 20, 16], 30, 5.0).unwrap(),
            missing_volumes: HashSet::new(),
            broken_volumes: HashSet::new(),
            broken_spots: HashSet::new(),
        }
    }
}

impl VolumeSource for Flaky {
    fn num_levels(&self) -> usize {
        self.inner.num_levels()
    }

    fn level_dims(&self, level: usize) -> Result<Dims> {
        self.inner.level_dims(level)
    }

    fn voxel_size(&self) -> [f32; 3] {
        self.inner.voxel_size()
    }

    fn num_timepoints(&self) -> usize {
        self.inner.num_timepoints()
    }

    fn source_volume(&self, time: usize, level: usize) -> Result<Arc<VoxelVolume>> {
        if self.missing_volumes.contains(&time) {
            return Err(Error::source_unavailable(time, level, "not loaded"));
        }
        if self.broken_volumes.contains(&time) {
            let err = io::Error::new(io::ErrorKind::NotFound, "block file missing");
            return Err(Error::Io(err));
        }
        self.inner.source_volume(time, level)
    }

    fn visible_spots(&self, time: usize) -> Result<Vec<Spot>> {
        if self.broken_spots.contains(&time) {
            return Err(Error::other("spot index corrupt"));
        }
        self.inner.visible_spots(time)
    }
}

fn setup(missing: &[usize], settle: Duration) -> (RefreshController, Arc<Recorder>) {
    let mut source = Flaky::new();
    source.missing_volumes = missing.iter().copied().collect();
    controller(source, settle)
}

fn controller(source: Flaky, settle: Duration) -> (RefreshController, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let ctl = RefreshController::new(
        Arc::new(source),
        recorder.clone(),
        RenderSettings::default(),
        RefreshOptions {
            settle_delay: settle,
            ..Default::default()
        },
    )
    .unwrap();
    (ctl, recorder)
}

#[test]
fn publishes_channels_in_order_with_range() {
    let (ctl, rec) = setup(&[], Duration::ZERO);
    // The sphere reaches the volume centre at time 20.
    let out = ctl.refresh(20).unwrap();
    assert_eq!(
        out,
        RefreshOutcome::Published {
            generation: 1,
            spots_imprinted: 1
        }
    );
    assert_eq!(*rec.channels.lock().unwrap(), Channel::ALL.to_vec());
    assert_eq!(*rec.ranges.lock().unwrap(), vec![DisplayRange::default()]);
    assert_eq!(ctl.state(), RefreshState::Idle);
}

#[test]
fn unavailable_volume_keeps_previous_content() {
    let (ctl, rec) = setup(&[3], Duration::ZERO);
    ctl.refresh(20).unwrap();
    let channels = ctl.channels();
    let before: Vec<VoxelVolume> = Channel::ALL.iter().map(|&c| channels.snapshot(c)).collect();

    let out = ctl.refresh(3).unwrap();
    assert!(matches!(out, RefreshOutcome::Skipped { ref reason } if reason.contains("not loaded")));

    let after: Vec<VoxelVolume> = Channel::ALL.iter().map(|&c| channels.snapshot(c)).collect();
    assert_eq!(before, after);
    assert_eq!(channels.generation(), 1);
    assert_eq!(rec.channels.lock().unwrap().len(), 3);
    assert_eq!(ctl.state(), RefreshState::Idle);
}

#[test]
fn time_past_the_end_is_skipped() {
    let (ctl, _) = setup(&[], Duration::ZERO);
    assert!(!ctl.refresh(99).unwrap().is_published());
}

/// Publishes time 20, then asserts that refreshing `failing` is skipped
/// with every channel and the generation left as they were.
fn assert_failure_keeps_content(ctl: &RefreshController, rec: &Recorder, failing: usize) -> String {
    ctl.refresh(20).unwrap();
    let channels = ctl.channels();
    let before: Vec<VoxelVolume> = Channel::ALL.iter().map(|&c| channels.snapshot(c)).collect();

    let reason = match ctl.refresh(failing).unwrap() {
        RefreshOutcome::Skipped { reason } => reason,
        other => panic!("expected a skip, got {other:?}"),
    };

    let after: Vec<VoxelVolume> = Channel::ALL.iter().map(|&c| channels.snapshot(c)).collect();
    assert_eq!(before, after);
    assert_eq!(channels.generation(), 1);
    assert_eq!(rec.channels.lock().unwrap().len(), 3);
    assert_eq!(ctl.state(), RefreshState::Idle);
    reason
}

#[test]
fn io_failure_of_volume_is_skipped() {
    let mut source = Flaky::new();
    source.broken_volumes.insert(4);
    let (ctl, rec) = controller(source, Duration::ZERO);
    let reason = assert_failure_keeps_content(&ctl, &rec, 4);
    assert!(reason.contains("block file missing"));
}

#[test]
fn spot_failure_is_skipped() {
    let mut source = Flaky::new();
    source.broken_spots.insert(5);
    let (ctl, rec) = controller(source, Duration::ZERO);
    let reason = assert_failure_keeps_content(&ctl, &rec, 5);
    assert!(reason.contains("spot index corrupt"));

    // Imprinting off: spots are never requested.
    ctl.update_settings(|s| s.imprint.enabled = false).unwrap();
    assert_eq!(
        ctl.refresh(5).unwrap(),
        RefreshOutcome::Published {
            generation: 2,
            spots_imprinted: 0
        }
    );
}

#[test]
fn baseline_only_when_imprint_disabled() {
    let (ctl, _) = setup(&[], Duration::ZERO);
    ctl.update_settings(|s| s.imprint.enabled = false).unwrap();
    ctl.refresh(20).unwrap();
    let ch = ctl.channels();
    assert_eq!(ch.snapshot(Channel::Red), ch.snapshot(Channel::Green));
    assert_eq!(ch.snapshot(Channel::Red), ch.snapshot(Channel::Blue));
}

#[test]
fn imprint_colors_the_tracked_sphere() {
    let (ctl, _) = setup(&[], Duration::ZERO);
    ctl.refresh(21).unwrap();
    let ch = ctl.channels();
    let (r, g) = (ch.snapshot(Channel::Red), ch.snapshot(Channel::Green));
    assert_ne!(r, g);
}

#[test]
fn settle_delay_separates_channels() {
    let (ctl, _) = setup(&[], Duration::from_millis(20));
    let start = Instant::now();
    ctl.refresh(0).unwrap();
    assert!(start.elapsed() >= Duration::from_millis(40));
}

#[test]
fn resolution_level_reallocates_channels() {
    let (ctl, _) = setup(&[], Duration::ZERO);
    assert_eq!(ctl.channels().dims(), [24, 20, 16]);

    ctl.set_resolution_level(1).unwrap();
    assert_eq!(ctl.resolution_level(), 1);
    assert_eq!(ctl.channels().dims(), [12, 10, 8]);
    assert_eq!(ctl.mapper().scale().as_array(), [2.0, 2.0, 2.0]);
    assert!(ctl.refresh(20).unwrap().is_published());

    let err = ctl.set_resolution_level(7).unwrap_err();
    assert!(err.is_config_error());
    assert_eq!(ctl.resolution_level(), 1);
}

#[test]
fn invalid_settings_rejected() {
    let (ctl, _) = setup(&[], Duration::ZERO);
    let before = ctl.settings();
    assert!(ctl.update_settings(|s| s.transfer.clamp_top = 0.0).is_err());
    assert!(ctl.update_settings(|s| s.imprint.radius_scale = -1.0).is_err());
    assert_eq!(ctl.settings(), before);
}

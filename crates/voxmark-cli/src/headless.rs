//! Headless stand-ins for the tracking viewer and the scene viewer.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use voxmark_bridge::{SceneSink, SubscriptionId, Viewer, ViewerEvent, ViewerListener};
use voxmark_core::Channel;
use voxmark_math::glam::{Quat, Vec3};
use voxmark_math::{CameraPose, ViewTransform};
use voxmark_ops::ChannelPublisher;
use voxmark_transfer::DisplayRange;

type Listeners = Vec<(SubscriptionId, Arc<dyn ViewerListener>)>;

/// Viewer whose time and view are set programmatically.
pub struct HeadlessViewer {
    time: AtomicUsize,
    view: Mutex<ViewTransform>,
    listeners: Mutex<Listeners>,
    next_id: AtomicU64,
    fired: AtomicU64,
}

impl HeadlessViewer {
    /// Identity view at time index `time`, no subscribers.
    pub fn new(time: usize) -> Self {
        Self {
            time: AtomicUsize::new(time),
            view: Mutex::new([
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ]),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            fired: AtomicU64::new(0),
        }
    }

    /// Delivers `event` to every subscriber on the calling thread.
    pub fn fire(&self, event: ViewerEvent) {
        let listeners: Vec<_> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for l in listeners {
            l.on_event(event);
        }
        self.fired.fetch_add(1, Ordering::Relaxed);
    }

    /// Moves the current time index; fires nothing.
    pub fn set_time(&self, time: usize) {
        self.time.store(time, Ordering::Release);
    }

    /// Rotates the view about y by `angle` radians, with a zoom of `zoom`.
    pub fn set_yaw(&self, angle: f32, zoom: f32) {
        let m = glam_rows(Quat::from_rotation_y(angle), zoom);
        *self.view.lock().unwrap_or_else(PoisonError::into_inner) = m;
    }

    /// Events delivered through [`fire`](Self::fire) so far.
    pub fn events_fired(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }

    /// Live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

fn glam_rows(q: Quat, zoom: f32) -> ViewTransform {
    let m = voxmark_math::glam::Mat3::from_quat(q) * zoom;
    std::array::from_fn(|r| {
        let row = m.row(r);
        [row.x, row.y, row.z, 0.0]
    })
}

impl Viewer for HeadlessViewer {
    fn current_time_index(&self) -> usize {
        self.time.load(Ordering::Acquire)
    }

    fn view_transform(&self) -> ViewTransform {
        *self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribe(&self, listener: Arc<dyn ViewerListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(i, _)| *i != id);
    }
}

/// Scene viewer that only counts what it is asked to do.
pub struct HeadlessSink {
    uploads: [AtomicU64; 3],
    range: Mutex<Option<DisplayRange>>,
    camera: Mutex<CameraPose>,
    syncs: AtomicU64,
}

impl Default for HeadlessSink {
    fn default() -> Self {
        Self {
            uploads: Default::default(),
            range: Mutex::new(None),
            camera: Mutex::new(CameraPose {
                rotation: Quat::IDENTITY,
                position: Vec3::new(0.0, 0.0, 150.0),
            }),
            syncs: AtomicU64::new(0),
        }
    }
}

impl HeadlessSink {
    /// Uploads requested for `channel`.
    pub fn uploads(&self, channel: Channel) -> u64 {
        self.uploads[channel.index()].load(Ordering::Relaxed)
    }

    /// Last display range set, if any.
    pub fn range(&self) -> Option<DisplayRange> {
        *self.range.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last camera pose applied.
    pub fn camera(&self) -> CameraPose {
        *self.camera.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of camera poses applied.
    pub fn camera_syncs(&self) -> u64 {
        self.syncs.load(Ordering::Relaxed)
    }
}

impl ChannelPublisher for HeadlessSink {
    fn publish_channel_update(&self, channel: Channel) {
        self.uploads[channel.index()].fetch_add(1, Ordering::Relaxed);
    }

    fn set_display_range(&self, range: DisplayRange) {
        *self.range.lock().unwrap_or_else(PoisonError::into_inner) = Some(range);
    }
}

impl SceneSink for HeadlessSink {
    fn apply_camera(&self, pose: CameraPose) {
        *self.camera.lock().unwrap_or_else(PoisonError::into_inner) = pose;
        self.syncs.fetch_add(1, Ordering::Relaxed);
    }

    fn camera_position(&self) -> Vec3 {
        self.camera.lock().unwrap_or_else(PoisonError::into_inner).position
    }
}

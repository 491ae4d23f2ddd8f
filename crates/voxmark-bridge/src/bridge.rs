//! Viewer-to-renderer bridge.
//!
//! A [`Bridge`] subscribes to a [`Viewer`], coalesces its events in a
//! [`ChangeWatcher`] and runs one debounce thread with three handlers:
//!
//! - **content**: refresh the composite at the viewer's time index, unless
//!   auto update is off;
//! - **view**: copy the viewer rotation onto the scene camera;
//! - **spot moved**: like content, then report the moved spot.
//!
//! Attaching runs one refresh at the viewer's current time, so the scene
//! has content before the first event arrives.
//!
//! Closing (or dropping) the bridge unsubscribes from the viewer and joins
//! the thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};
use voxmark_core::SpotId;
use voxmark_math::glam::Vec3;
use voxmark_math::{CameraPose, CameraSync, SceneFrame};
use voxmark_ops::{
    ChannelPublisher, RefreshController, RefreshOutcome, RenderSettings, SharedChannels,
    VolumeSource,
};
use voxmark_transfer::IntensityControl;
use voxmark_watch::{ChangeKind, ChangeWatcher, DebounceScheduler, SchedulerHandle};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::time::TimeCursor;
use crate::viewer::{EventAdapter, SceneSink, SubscriptionId, Viewer};

/// Result of a refresh, as passed to content callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUpdate {
    /// Time index refreshed.
    pub time: usize,
    /// What the pass did.
    pub outcome: RefreshOutcome,
}

type ContentCallback = Box<dyn Fn(&ContentUpdate) + Send + Sync>;
type ViewCallback = Box<dyn Fn(&CameraPose) + Send + Sync>;
type SpotCallback = Box<dyn Fn(Option<SpotId>) + Send + Sync>;

#[derive(Default)]
struct Callbacks {
    content: Vec<ContentCallback>,
    view: Vec<ViewCallback>,
    spot: Vec<SpotCallback>,
}

/// Builder collecting callbacks before attaching to a viewer.
pub struct BridgeBuilder {
    config: BridgeConfig,
    callbacks: Callbacks,
}

impl BridgeBuilder {
    /// Starts a builder with `config`.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            callbacks: Callbacks::default(),
        }
    }

    /// Called after every refresh, debounced or immediate.
    pub fn on_content(mut self, f: impl Fn(&ContentUpdate) + Send + Sync + 'static) -> Self {
        self.callbacks.content.push(Box::new(f));
        self
    }

    /// Called after every camera sync.
    pub fn on_view(mut self, f: impl Fn(&CameraPose) + Send + Sync + 'static) -> Self {
        self.callbacks.view.push(Box::new(f));
        self
    }

    /// Called once a burst of spot moves has settled, with the last moved
    /// spot.
    pub fn on_spot_moved(mut self, f: impl Fn(Option<SpotId>) + Send + Sync + 'static) -> Self {
        self.callbacks.spot.push(Box::new(f));
        self
    }

    /// Validates the config, subscribes to `viewer`, starts the debounce
    /// thread and composites the viewer's current time once.
    pub fn attach<S: SceneSink + 'static>(
        self,
        viewer: Arc<dyn Viewer>,
        source: Arc<dyn VolumeSource>,
        sink: Arc<S>,
    ) -> BridgeResult<Bridge> {
        let cfg = self.config;
        cfg.validate()?;

        let publisher: Arc<dyn ChannelPublisher> = sink.clone();
        let controller = RefreshController::new(
            Arc::clone(&source),
            publisher,
            cfg.render_settings(),
            cfg.refresh_options(),
        )?;
        let intensity = IntensityControl::new(cfg.transfer, cfg.display)?;
        let mut cursor = TimeCursor::for_timepoints(source.num_timepoints());
        cursor.set(viewer.current_time_index());

        let shared = Arc::new(Shared {
            controller,
            source,
            viewer: Arc::clone(&viewer),
            sink,
            camera: CameraSync::new(cfg.camera.flips),
            scene_scale: cfg.camera.scene_scale,
            auto_update: AtomicBool::new(cfg.auto_update),
            cursor: Mutex::new(cursor),
            intensity: Mutex::new(intensity),
            callbacks: self.callbacks,
        });

        let watcher = Arc::new(ChangeWatcher::new());
        let timing = cfg.timing;
        let scheduler = DebounceScheduler::new(Arc::clone(&watcher))
            .register(ChangeKind::Content, timing.content_quiet(), {
                let shared = Arc::clone(&shared);
                move || shared.content_settled()
            })
            .register(ChangeKind::View, timing.view_quiet(), {
                let shared = Arc::clone(&shared);
                move || shared.view_settled()
            })
            .register(ChangeKind::SpotMoved, timing.spot_quiet(), {
                let shared = Arc::clone(&shared);
                let watcher = Arc::clone(&watcher);
                move || shared.spot_settled(watcher.last_moved_spot())
            })
            .spawn()?;

        let subscription = viewer.subscribe(Arc::new(EventAdapter::new(watcher.clone())));

        let time = shared.cursor().current();
        if let Err(e) = shared.refresh_at(time) {
            warn!(time, error = %e, "initial refresh failed");
        }
        info!(
            level = cfg.source.resolution_level,
            auto_update = cfg.auto_update,
            ?subscription,
            "bridge attached"
        );

        Ok(Bridge {
            shared,
            watcher,
            scheduler: Some(scheduler),
            subscription: Some(subscription),
        })
    }
}

/// State reachable from the debounce handlers.
struct Shared {
    controller: RefreshController,
    source: Arc<dyn VolumeSource>,
    viewer: Arc<dyn Viewer>,
    sink: Arc<dyn SceneSink>,
    camera: CameraSync,
    scene_scale: f32,
    auto_update: AtomicBool,
    cursor: Mutex<TimeCursor>,
    intensity: Mutex<IntensityControl>,
    callbacks: Callbacks,
}

impl Shared {
    fn cursor(&self) -> MutexGuard<'_, TimeCursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn refresh_at(&self, time: usize) -> BridgeResult<RefreshOutcome> {
        let outcome = self.controller.refresh(time)?;
        let update = ContentUpdate {
            time,
            outcome: outcome.clone(),
        };
        for cb in &self.callbacks.content {
            cb(&update);
        }
        Ok(outcome)
    }

    fn follow_viewer(&self) {
        let time = self.cursor().set(self.viewer.current_time_index());
        if let Err(e) = self.refresh_at(time) {
            error!(time, error = %e, "refresh failed");
        }
    }

    fn content_settled(&self) {
        if !self.auto_update.load(Ordering::Acquire) {
            debug!("auto update off, content change ignored");
            return;
        }
        self.follow_viewer();
    }

    fn view_settled(&self) {
        let view = self.viewer.view_transform();
        let pose = self.camera.sync(&view, self.sink.camera_position());
        self.sink.apply_camera(pose);
        debug!(rotation = ?pose.rotation, position = ?pose.position, "camera synced");
        for cb in &self.callbacks.view {
            cb(&pose);
        }
    }

    fn spot_settled(&self, spot: Option<SpotId>) {
        debug!(?spot, "spot move settled");
        if self.auto_update.load(Ordering::Acquire) {
            self.follow_viewer();
        }
        for cb in &self.callbacks.spot {
            cb(spot);
        }
    }

    fn scene_frame(&self) -> SceneFrame {
        let scale = self.controller.mapper().scale().as_array();
        SceneFrame::new(self.controller.channels().dims(), scale, self.scene_scale)
    }
}

/// Live coupling between a viewer, a volume source and a scene sink.
pub struct Bridge {
    shared: Arc<Shared>,
    watcher: Arc<ChangeWatcher>,
    scheduler: Option<SchedulerHandle>,
    subscription: Option<SubscriptionId>,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("controller", &self.shared.controller)
            .field("scheduler", &self.scheduler)
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

impl Bridge {
    /// Shorthand for [`BridgeBuilder::new`].
    pub fn builder(config: BridgeConfig) -> BridgeBuilder {
        BridgeBuilder::new(config)
    }

    fn ensure_open(&self) -> BridgeResult<()> {
        match self.scheduler {
            Some(_) => Ok(()),
            None => Err(BridgeError::Closed),
        }
    }

    /// Refresh controller, for direct inspection.
    pub fn controller(&self) -> &RefreshController {
        &self.shared.controller
    }

    /// Channel buffers shown by the sink.
    pub fn channels(&self) -> Arc<SharedChannels> {
        self.shared.controller.channels()
    }

    /// Watcher fed by the viewer subscription.
    pub fn watcher(&self) -> &Arc<ChangeWatcher> {
        &self.watcher
    }

    /// Refreshes `time` now, bypassing the debounce and the auto update
    /// setting.
    pub fn request_immediate_refresh(&self, time: usize) -> BridgeResult<RefreshOutcome> {
        self.ensure_open()?;
        self.shared.cursor().set(time);
        self.shared.refresh_at(time)
    }

    /// Shows a playback time index; see [`TimeCursor::show`].
    pub fn show_timepoint(&self, t: i64) -> BridgeResult<usize> {
        self.ensure_open()?;
        let time = self.shared.cursor().show(t);
        self.shared.refresh_at(time)?;
        Ok(time)
    }

    /// Steps playback one index back and shows it.
    pub fn prev_timepoint(&self) -> BridgeResult<usize> {
        self.ensure_open()?;
        let time = self.shared.cursor().prev();
        self.shared.refresh_at(time)?;
        Ok(time)
    }

    /// Steps playback one index forward and shows it.
    pub fn next_timepoint(&self) -> BridgeResult<usize> {
        self.ensure_open()?;
        let time = self.shared.cursor().next();
        self.shared.refresh_at(time)?;
        Ok(time)
    }

    /// Time index shown last.
    pub fn current_time(&self) -> usize {
        self.shared.cursor().current()
    }

    /// Turns refreshing on settled content changes on or off. Switching on
    /// schedules a catch-up refresh.
    pub fn set_auto_update(&self, enabled: bool) {
        let was = self.shared.auto_update.swap(enabled, Ordering::AcqRel);
        if enabled && !was {
            self.watcher.mark_changed(ChangeKind::Content);
        }
        info!(enabled, "auto update toggled");
    }

    /// Whether settled content changes refresh the volume.
    pub fn is_auto_update(&self) -> bool {
        self.shared.auto_update.load(Ordering::Acquire)
    }

    /// Current render settings.
    pub fn settings(&self) -> RenderSettings {
        self.shared.controller.settings()
    }

    /// Edits the render settings and schedules a refresh.
    pub fn update_settings(&self, f: impl FnOnce(&mut RenderSettings)) -> BridgeResult<()> {
        let mut intensity = self.shared.intensity.lock().unwrap_or_else(PoisonError::into_inner);
        self.shared.controller.update_settings(f)?;
        let settings = self.shared.controller.settings();
        intensity.set_params(settings.transfer)?;
        intensity.set_range(settings.range);
        drop(intensity);
        self.watcher.mark_changed(ChangeKind::Content);
        Ok(())
    }

    /// Switches intensity auto adjust, derived from the volume at the
    /// current time, and refreshes. Returns whether auto adjust is now on.
    pub fn toggle_auto_adjust(&self) -> BridgeResult<bool> {
        self.ensure_open()?;
        let time = self.current_time();
        let level = self.shared.controller.resolution_level();
        let on = {
            let mut intensity =
                self.shared.intensity.lock().unwrap_or_else(PoisonError::into_inner);
            let volume = self.shared.source.source_volume(time, level)?;
            let on = intensity.toggle_auto_adjust(&volume)?;
            let (transfer, range) = (intensity.params(), intensity.range());
            self.shared.controller.update_settings(|s| {
                s.transfer = transfer;
                s.range = range;
            })?;
            on
        };
        info!(on, time, "intensity auto adjust toggled");
        self.shared.refresh_at(time)?;
        Ok(on)
    }

    /// Switches the resolution level and schedules a refresh.
    pub fn set_resolution_level(&self, level: usize) -> BridgeResult<()> {
        self.shared.controller.set_resolution_level(level)?;
        self.watcher.mark_changed(ChangeKind::Content);
        Ok(())
    }

    /// Pauses handlers while the sink edits a spot; changes made meanwhile
    /// fire on resume.
    pub fn set_editing(&self, editing: bool) {
        if let Some(s) = &self.scheduler {
            s.set_paused(editing);
        }
    }

    /// Returns `true` while paused for editing.
    pub fn is_editing(&self) -> bool {
        self.scheduler.as_ref().is_some_and(SchedulerHandle::is_paused)
    }

    /// Placement of the composite in the sink scene at the current level.
    pub fn scene_frame(&self) -> SceneFrame {
        self.shared.scene_frame()
    }

    /// Physical position of a sink scene point.
    pub fn scene_to_world(&self, scene: Vec3) -> [f32; 3] {
        let mapper = self.shared.controller.mapper();
        self.shared.scene_frame().scene_to_world(scene, &mapper)
    }

    /// Sink scene position of a physical point.
    pub fn world_to_scene(&self, position: [f32; 3]) -> Vec3 {
        let mapper = self.shared.controller.mapper();
        self.shared.scene_frame().world_to_scene(position, &mapper)
    }

    /// Returns `true` once closed.
    pub fn is_closed(&self) -> bool {
        self.scheduler.is_none()
    }

    /// Unsubscribes from the viewer and stops the debounce thread. No
    /// handler runs after this returns. Idempotent.
    pub fn close(&mut self) -> BridgeResult<()> {
        if let Some(id) = self.subscription.take() {
            self.shared.viewer.unsubscribe(id);
        }
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.stop()?;
            info!(fired = scheduler.fired_count(), "bridge closed");
        }
        Ok(())
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!(error = %e, "bridge did not close cleanly");
        }
    }
}

//! Collaborator seams: the tracking viewer events come from and the scene
//! viewer frames and camera poses go to.
//!
//! Every viewer notification maps onto one [`ChangeKind`]:
//!
//! | Event | Kind |
//! |-------|------|
//! | view transform changed | `View` |
//! | time index, spot set, focus, coloring changed | `Content` |
//! | spot moved | `SpotMoved` |

use std::sync::Arc;

use tracing::trace;
use voxmark_core::SpotId;
use voxmark_math::glam::Vec3;
use voxmark_math::{CameraPose, ViewTransform};
use voxmark_ops::ChannelPublisher;
use voxmark_watch::{ChangeKind, ChangeSink};

/// Notification raised by the tracking viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    /// The user rotated, panned or zoomed.
    ViewTransformChanged,
    /// The displayed time index changed.
    TimeIndexChanged(usize),
    /// Spots were added, removed or edited.
    SpotsChanged,
    /// Another spot got the focus.
    FocusChanged,
    /// The spot coloring scheme changed.
    ColoringChanged,
    /// One spot was dragged.
    SpotMoved(SpotId),
}

impl ViewerEvent {
    /// Change kind this event is coalesced into.
    pub const fn kind(&self) -> ChangeKind {
        match self {
            Self::ViewTransformChanged => ChangeKind::View,
            Self::TimeIndexChanged(_)
            | Self::SpotsChanged
            | Self::FocusChanged
            | Self::ColoringChanged => ChangeKind::Content,
            Self::SpotMoved(_) => ChangeKind::SpotMoved,
        }
    }

    /// Reports the event to `sink`.
    pub fn dispatch(&self, sink: &dyn ChangeSink) {
        match *self {
            Self::SpotMoved(id) => sink.notify_spot_moved(id),
            _ => sink.notify_change(self.kind()),
        }
    }
}

/// Receiver of viewer events. Called on whatever thread the viewer fires
/// from; must return quickly and must not panic.
pub trait ViewerListener: Send + Sync {
    /// Handles one event.
    fn on_event(&self, event: ViewerEvent);
}

/// Listener forwarding every event to a [`ChangeSink`].
pub struct EventAdapter {
    sink: Arc<dyn ChangeSink>,
}

impl EventAdapter {
    /// Forwards to `sink`.
    pub fn new(sink: Arc<dyn ChangeSink>) -> Self {
        Self { sink }
    }
}

impl ViewerListener for EventAdapter {
    fn on_event(&self, event: ViewerEvent) {
        trace!(?event, "viewer event");
        event.dispatch(self.sink.as_ref());
    }
}

/// Handle returned by [`Viewer::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// The tracking viewer the bridge follows.
pub trait Viewer: Send + Sync {
    /// Time index on display.
    fn current_time_index(&self) -> usize;

    /// Current view transform, rows of the upper 3x4 block.
    fn view_transform(&self) -> ViewTransform;

    /// Starts delivering events to `listener`.
    fn subscribe(&self, listener: Arc<dyn ViewerListener>) -> SubscriptionId;

    /// Stops delivering events to the listener behind `id`. Unknown ids are
    /// ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// The scene viewer showing the composite volume.
pub trait SceneSink: ChannelPublisher {
    /// Moves the scene camera.
    fn apply_camera(&self, pose: CameraPose);

    /// Scene camera position; its distance from the origin is kept when
    /// the camera is synced.
    fn camera_position(&self) -> Vec3;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Log(Mutex<Vec<(ChangeKind, Option<SpotId>)>>);

    impl ChangeSink for Log {
        fn notify_change(&self, kind: ChangeKind) {
            self.0.lock().unwrap().push((kind, None));
        }

        fn notify_spot_moved(&self, id: SpotId) {
            self.0.lock().unwrap().push((ChangeKind::SpotMoved, Some(id)));
        }
    }

    #[test]
    fn test_event_kinds() {
        assert_eq!(ViewerEvent::ViewTransformChanged.kind(), ChangeKind::View);
        assert_eq!(ViewerEvent::TimeIndexChanged(3).kind(), ChangeKind::Content);
        assert_eq!(ViewerEvent::SpotsChanged.kind(), ChangeKind::Content);
        assert_eq!(ViewerEvent::FocusChanged.kind(), ChangeKind::Content);
        assert_eq!(ViewerEvent::ColoringChanged.kind(), ChangeKind::Content);
        assert_eq!(ViewerEvent::SpotMoved(1).kind(), ChangeKind::SpotMoved);
    }

    #[test]
    fn test_adapter_forwards_spot_ids() {
        let log = Arc::new(Log::default());
        let adapter = EventAdapter::new(log.clone());
        adapter.on_event(ViewerEvent::FocusChanged);
        adapter.on_event(ViewerEvent::SpotMoved(42));
        assert_eq!(
            *log.0.lock().unwrap(),
            vec![(ChangeKind::Content, None), (ChangeKind::SpotMoved, Some(42))]
        );
    }
}

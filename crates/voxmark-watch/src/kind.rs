//! Change kinds tracked by the watcher.

use std::fmt;

/// Category of change a producer reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Displayed data changed: time index, spot set, color mapping.
    Content,
    /// View transform changed.
    View,
    /// A spot was moved in the sink viewer.
    SpotMoved,
}

impl ChangeKind {
    /// All kinds, in the order the scheduler checks them by default.
    pub const ALL: [ChangeKind; 3] = [ChangeKind::Content, ChangeKind::View, ChangeKind::SpotMoved];

    /// Slot in per-kind arrays.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Content => 0,
            Self::View => 1,
            Self::SpotMoved => 2,
        }
    }

    /// Lowercase label for logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::View => "view",
            Self::SpotMoved => "spot-moved",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

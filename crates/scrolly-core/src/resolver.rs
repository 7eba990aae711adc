use crate::intersection::Crossing;
use crate::scene::TriggerMode;

/// A change of the active scene index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveSceneChange {
    pub previous: usize,
    pub current: usize,
}

/// Maintains exactly one active scene index for an ordered scene list.
///
/// Transition rule: the last continuous region to report "became in view"
/// wins, even while an earlier scene is still inside its margin. Leaving view
/// never changes the index, so a fast fling between sections keeps the last
/// scene instead of flashing back to the first.
///
/// Last-writer-wins falls out of processing crossings in arrival order. It is
/// stable for a fixed event order and nothing stronger.
#[derive(Clone, Debug)]
pub struct ActiveSceneResolver {
    current: usize,
    scene_count: usize,
}

impl ActiveSceneResolver {
    pub fn new(scene_count: usize) -> Self {
        Self {
            current: 0,
            scene_count,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn scene_count(&self) -> usize {
        self.scene_count
    }

    /// Grow or shrink the addressable range. The current index is clamped
    /// back into range so it always names a valid scene.
    pub fn set_scene_count(&mut self, scene_count: usize) {
        self.scene_count = scene_count;
        if self.current >= scene_count {
            self.current = scene_count.saturating_sub(1);
        }
    }

    /// Apply one crossing. Returns the change if the index moved.
    pub fn apply(&mut self, crossing: &Crossing) -> Option<ActiveSceneChange> {
        if crossing.mode != TriggerMode::Continuous || !crossing.in_view {
            return None;
        }
        self.activate(crossing.scene_index)
    }

    /// Apply a batch in order. Returns the net change across the batch, so a
    /// scene that wins and loses within one frame produces no notification.
    pub fn apply_all(&mut self, crossings: &[Crossing]) -> Option<ActiveSceneChange> {
        let previous = self.current;
        for crossing in crossings {
            self.apply(crossing);
        }
        (self.current != previous).then_some(ActiveSceneChange {
            previous,
            current: self.current,
        })
    }

    /// Move the active index without reporting a change, for when the
    /// active scene goes away. Out-of-range indexes are ignored.
    pub fn reseat(&mut self, index: usize) {
        if index < self.scene_count {
            self.current = index;
        }
    }

    /// Force the active index. Out-of-range indexes are ignored.
    pub fn activate(&mut self, index: usize) -> Option<ActiveSceneChange> {
        if index >= self.scene_count {
            tracing::debug!(
                index,
                scene_count = self.scene_count,
                "ignoring out-of-range scene"
            );
            return None;
        }
        if index == self.current {
            return None;
        }
        let previous = self.current;
        self.current = index;
        tracing::debug!(previous, current = index, "active scene changed");
        Some(ActiveSceneChange {
            previous,
            current: index,
        })
    }
}

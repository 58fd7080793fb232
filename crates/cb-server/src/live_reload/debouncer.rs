//! Change debouncing for source watching.
//!
//! Editors emit several filesystem events per save. Events for the same path
//! are merged into one [`SourceChange`] that is released once the path has
//! been quiet for the debounce duration.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Kind of change to a source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

/// A debounced change to one source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SourceChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

struct Pending {
    kind: ChangeKind,
    deadline: Instant,
    /// Order of the first event seen for this path.
    sequence: u64,
}

#[derive(Default)]
struct Queue {
    pending: HashMap<PathBuf, Pending>,
    next_sequence: u64,
}

/// Thread-safe change debouncer.
pub(crate) struct ChangeDebouncer {
    queue: Mutex<Queue>,
    quiet_period: Duration,
}

impl ChangeDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            queue: Mutex::new(Queue::default()),
            quiet_period,
        }
    }

    /// Record a change, merging it with any pending change for the same path.
    pub fn record(&self, path: PathBuf, kind: ChangeKind) {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let deadline = Instant::now() + self.quiet_period;
        let sequence = queue.next_sequence;
        queue.next_sequence += 1;

        match queue.pending.entry(path) {
            Entry::Vacant(entry) => {
                entry.insert(Pending {
                    kind,
                    deadline,
                    sequence,
                });
            }
            Entry::Occupied(mut entry) => match Self::merge(entry.get().kind, kind) {
                Some(merged) => {
                    let pending = entry.get_mut();
                    pending.kind = merged;
                    pending.deadline = deadline;
                }
                // Created then removed: nothing happened as far as we know.
                None => {
                    entry.remove();
                }
            },
        }
    }

    /// Merge two kinds observed for one path. `None` drops the path.
    #[allow(clippy::match_same_arms)]
    fn merge(earlier: ChangeKind, later: ChangeKind) -> Option<ChangeKind> {
        use ChangeKind::{Created, Modified, Removed};

        match (earlier, later) {
            (Created, Created | Modified) => Some(Created),
            (Created, Removed) => None,
            (Modified, Created) => Some(Created),
            (Modified, Modified) => Some(Modified),
            (Modified, Removed) => Some(Removed),
            // Replaced in place (write temp file, rename over)
            (Removed, Created) => Some(Modified),
            (Removed, Modified | Removed) => Some(Removed),
        }
    }

    /// Take every change whose quiet period has elapsed, in the order the
    /// paths were first reported.
    pub fn drain_ready(&self) -> Vec<SourceChange> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let mut ready = Vec::new();
        queue.pending.retain(|path, pending| {
            if pending.deadline > now {
                return true;
            }
            ready.push((pending.sequence, path.clone(), pending.kind));
            false
        });

        ready.sort_unstable_by_key(|(sequence, _, _)| *sequence);
        ready
            .into_iter()
            .map(|(_, path, kind)| SourceChange { path, kind })
            .collect()
    }
}

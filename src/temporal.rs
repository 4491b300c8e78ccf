//! Rolling window of recent per-frame signal sets.
//!
//! The window belongs to a single stream. It is not keyed by person, so in
//! multi-subject scenes a sustained signal only means "some subject kept
//! raising it", not "the same subject did".

use std::collections::{BTreeSet, VecDeque};

use crate::detect::Signal;

/// Default number of frames held.
pub const DEFAULT_HISTORY_FRAMES: usize = 5;

/// Default number of held frames required before signals count as sustained.
pub const DEFAULT_MIN_SUSTAINED_FRAMES: usize = 3;

/// Bounded FIFO of signal sets, oldest first.
#[derive(Clone, Debug)]
pub struct SignalHistory {
    frames: VecDeque<BTreeSet<Signal>>,
    capacity: usize,
    min_sustained: usize,
}

impl SignalHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_FRAMES, DEFAULT_MIN_SUSTAINED_FRAMES)
    }

    /// Both bounds are raised to at least 1.
    pub fn with_capacity(capacity: usize, min_sustained: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity + 1),
            capacity,
            min_sustained: min_sustained.max(1),
        }
    }

    /// Append the current frame's signals, evicting the oldest frame if over capacity.
    pub fn push(&mut self, signals: BTreeSet<Signal>) {
        self.frames.push_back(signals);
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    /// Signals present in every held frame, or empty while fewer than the
    /// minimum number of frames are held.
    pub fn sustained(&self) -> BTreeSet<Signal> {
        if self.frames.len() < self.min_sustained {
            return BTreeSet::new();
        }
        let mut frames = self.frames.iter();
        let Some(first) = frames.next() else {
            return BTreeSet::new();
        };
        frames.fold(first.clone(), |acc, frame| {
            acc.intersection(frame).copied().collect()
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for SignalHistory {
    fn default() -> Self {
        Self::new()
    }
}

//! Keyframe tracks indexed by build step
//!
//! A track holds at least one key, ordered by strictly increasing step.
//! Values between keys are interpolated linearly and clamped at both ends.

use brickstep_math::Interpolate;
use serde::{Serialize, Deserialize};

/// A build step. Valid steps are `1..=STEP_MAX`; step 0 is never keyed.
pub type Step = u32;

/// The last valid step
pub const STEP_MAX: Step = u32::MAX;

/// A value pinned to a step
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Key<T> {
    pub step: Step,
    pub value: T,
}

/// Error restoring a track from a list of keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// A track needs at least one key
    Empty,
    /// A key was placed at step 0
    InvalidStep,
    /// Steps were not strictly increasing
    Unordered { step: Step },
}

impl std::fmt::Display for TrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackError::Empty => write!(f, "Keyframe track has no keys"),
            TrackError::InvalidStep => write!(f, "Keyframe at step 0"),
            TrackError::Unordered { step } => write!(f, "Keyframe at step {} is out of order", step),
        }
    }
}

impl std::error::Error for TrackError {}

/// An ordered list of keys for one animatable attribute
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<Key<T>>",
    into = "Vec<Key<T>>",
    bound(serialize = "T: Serialize + Clone", deserialize = "T: Deserialize<'de>")
)]
pub struct KeyframeTrack<T> {
    keys: Vec<Key<T>>,
}

impl<T> TryFrom<Vec<Key<T>>> for KeyframeTrack<T> {
    type Error = TrackError;

    fn try_from(keys: Vec<Key<T>>) -> Result<Self, Self::Error> {
        let first = keys.first().ok_or(TrackError::Empty)?;
        if first.step == 0 {
            return Err(TrackError::InvalidStep);
        }
        if let Some(pair) = keys.windows(2).find(|pair| pair[1].step <= pair[0].step) {
            return Err(TrackError::Unordered { step: pair[1].step });
        }
        Ok(Self { keys })
    }
}

impl<T> From<KeyframeTrack<T>> for Vec<Key<T>> {
    fn from(track: KeyframeTrack<T>) -> Self {
        track.keys
    }
}

impl<T: Interpolate> KeyframeTrack<T> {
    /// Create a track holding `value` from step 1 onwards
    pub fn new(value: T) -> Self {
        Self {
            keys: vec![Key { step: 1, value }],
        }
    }

    /// All keys, ordered by step
    pub fn keys(&self) -> &[Key<T>] {
        &self.keys
    }

    /// Number of keys (always at least one)
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false for a constructed track
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Step of the earliest key
    pub fn first_step(&self) -> Step {
        self.keys.first().map_or(1, |k| k.step)
    }

    /// Step of the latest key
    pub fn last_step(&self) -> Step {
        self.keys.last().map_or(1, |k| k.step)
    }

    /// True if a key sits exactly at `step`
    pub fn has_key_at(&self, step: Step) -> bool {
        self.keys.binary_search_by_key(&step, |k| k.step).is_ok()
    }

    /// Set the value at `step`
    ///
    /// An existing key at `step` is overwritten. Otherwise a new key is
    /// inserted only when `add_key` is set. Step 0 is ignored.
    pub fn change_key(&mut self, value: T, step: Step, add_key: bool) {
        if step == 0 {
            return;
        }

        match self.keys.binary_search_by_key(&step, |k| k.step) {
            Ok(index) => self.keys[index].value = value,
            Err(index) if add_key => self.keys.insert(index, Key { step, value }),
            Err(_) => {}
        }
    }

    /// Value at `step`
    ///
    /// Before the first key the first value is held, at or after the last key
    /// the last value is held, and in between neighbouring keys are blended
    /// by `(step - a) / (b - a)`.
    pub fn calculate_key(&self, step: Step) -> T {
        // First key strictly after `step`
        let next = self.keys.partition_point(|k| k.step <= step);

        if next == 0 {
            return self.keys[0].value;
        }
        let prev = &self.keys[next - 1];
        if prev.step == step || next == self.keys.len() {
            return prev.value;
        }

        let next = &self.keys[next];
        let t = (step - prev.step) as f64 / (next.step - prev.step) as f64;
        prev.value.interpolate(&next.value, t as f32)
    }

    /// Open a gap of `count` steps at `start`
    ///
    /// Keys at or after `start` move forward. Keys pushed beyond [`STEP_MAX`]
    /// are dropped, except that the track always keeps one key.
    pub fn insert_time(&mut self, start: Step, count: Step) {
        if start == 0 || count == 0 {
            return;
        }

        let shift_from = self.keys.partition_point(|k| k.step < start);
        let overflow_from = self
            .keys
            .partition_point(|k| k.step <= STEP_MAX - count)
            .max(shift_from);

        if overflow_from == 0 {
            // Every key overflows: keep the first one at the last valid step
            self.keys.truncate(1);
            self.keys[0].step = STEP_MAX;
            return;
        }

        let dropped = self.keys.len() - overflow_from;
        if dropped > 0 {
            log::trace!("Dropping {} keys pushed past the last step", dropped);
            self.keys.truncate(overflow_from);
        }

        for key in &mut self.keys[shift_from..] {
            key.step += count;
        }
    }

    /// Close `count` steps starting at `start`
    ///
    /// Keys in `[start, start + count)` are removed and later keys move back
    /// by `count`. If that would leave no keys, the first removed key is kept
    /// and moved to `start`.
    pub fn remove_time(&mut self, start: Step, count: Step) {
        if start == 0 || count == 0 {
            return;
        }

        let end = start as u64 + count as u64;
        let first = self.keys.partition_point(|k| k.step < start);
        let last = self.keys.partition_point(|k| (k.step as u64) < end);

        if first == 0 && last == self.keys.len() {
            self.keys.truncate(1);
            self.keys[0].step = start;
            return;
        }

        self.keys.drain(first..last);
        for key in &mut self.keys[first..] {
            key.step -= count;
        }
    }

    /// Replace every key with a single step-1 key holding `value`
    pub fn reset(&mut self, value: T) {
        self.keys.clear();
        self.change_key(value, 1, true);
    }
}

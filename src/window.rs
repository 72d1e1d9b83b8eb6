//! Element envelope and the metadata slots it carries.
//!
//! Every element flowing between nodes is a [`WindowedValue`]: the value plus
//! optional window, pane and timestamp slots. The combine stages never assign
//! these; see [`WindowedValue::has_windows`] for how they treat inputs that do.

use serde::{Deserialize, Serialize};

/// Milliseconds since UNIX epoch (UTC).
pub type TimestampMs = i64;

/// A closed-open time range: [start, end).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Window {
    pub start: TimestampMs,
    pub end: TimestampMs,
}

impl Window {
    #[inline]
    pub fn new(start: TimestampMs, end: TimestampMs) -> Self {
        debug_assert!(end >= start);
        Self { start, end }
    }
}

/// Position of an output within the firings of its window.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaneInfo {
    pub is_first: bool,
    pub is_last: bool,
    pub index: u64,
}

/// A value plus its (optional) windowing metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowedValue<T> {
    pub value: T,
    pub windows: Option<Vec<Window>>,
    pub pane: Option<PaneInfo>,
    pub timestamp: Option<TimestampMs>,
}

impl<T> WindowedValue<T> {
    /// Wrap a bare value with every metadata slot unset.
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            value,
            windows: None,
            pane: None,
            timestamp: None,
        }
    }

    #[inline]
    pub fn with_timestamp(mut self, ts: TimestampMs) -> Self {
        self.timestamp = Some(ts);
        self
    }

    #[inline]
    pub fn with_windows(mut self, windows: Vec<Window>) -> Self {
        self.windows = Some(windows);
        self
    }

    #[inline]
    pub fn with_pane(mut self, pane: PaneInfo) -> Self {
        self.pane = Some(pane);
        self
    }

    /// Whether this element carries an explicit, non-empty window assignment.
    ///
    /// An unset or empty assignment means the single global window.
    #[inline]
    pub fn has_windows(&self) -> bool {
        self.windows.as_ref().is_some_and(|w| !w.is_empty())
    }

    /// Transform the value, keeping the metadata as-is.
    pub fn map<O>(self, f: impl FnOnce(T) -> O) -> WindowedValue<O> {
        WindowedValue {
            value: f(self.value),
            windows: self.windows,
            pane: self.pane,
            timestamp: self.timestamp,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T> From<T> for WindowedValue<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_metadata() {
        let wv = WindowedValue::new(3u32)
            .with_timestamp(42)
            .with_pane(PaneInfo { is_first: true, is_last: true, index: 0 });
        let mapped = wv.map(|v| v * 2);
        assert_eq!(mapped.value, 6);
        assert_eq!(mapped.timestamp, Some(42));
        assert!(mapped.pane.is_some());
    }

    #[test]
    fn empty_window_list_is_global() {
        assert!(!WindowedValue::new(1).has_windows());
        assert!(!WindowedValue::new(1).with_windows(vec![]).has_windows());
        assert!(WindowedValue::new(1).with_windows(vec![Window::new(0, 10)]).has_windows());
    }
}

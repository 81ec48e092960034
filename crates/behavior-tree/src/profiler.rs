//! Tick profiler.
//!
//! Records, per `(root id, node id)`, how many times a node was ticked and
//! how long its subtree took. A tick is profiled when it is bracketed by
//! [`Profiler::start`] and [`Profiler::end`] (see
//! [`TreeHandle::tick_profiled`]) while the profiler is enabled.
//!
//! # Current collection
//!
//! There is a single "current" slot. Bracketing is not reentrant, and two
//! roots ticked concurrently under the same profiler race on the slot: the
//! samples of one may land in the other's collection. Give concurrent trees
//! their own `Profiler` if that matters.
//!
//! # Dump layout
//!
//! [`ProfileReport::to_bytes`] writes fixed-width native-endian integers:
//!
//! ```text
//! [root count: u64]
//!   ([root id: i32] [collection size: u64]
//!     ([node id: i32] [calls: u64] [elapsed ticks: u64])*)*
//! ```
//!
//! Elapsed ticks are nanoseconds.
//!
//! [`TreeHandle::tick_profiled`]: crate::TreeHandle::tick_profiled

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::NodeId;
use crate::error::ProfilerError;

pub type RootId = NodeId;

/// Aggregate for one `(root id, node id)` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSample {
    pub calls: u64,
    pub elapsed_ticks: u64,
}

/// Samples of one root, keyed by node id.
pub type Collection = BTreeMap<NodeId, ProfileSample>;

/// Snapshot of every collection, keyed by root id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileReport {
    pub roots: BTreeMap<RootId, Collection>,
}

impl ProfileReport {
    pub fn sample(&self, root: RootId, node: NodeId) -> Option<ProfileSample> {
        self.roots.get(&root)?.get(&node).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Nested `root -> node -> {calls, elapsed_ticks}` mapping.
    pub fn to_json(&self) -> Result<serde_json::Value, ProfilerError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Encodes the binary dump described in the module docs.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProfilerError> {
        codec().serialize(self).map_err(ProfilerError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProfilerError> {
        codec().deserialize(bytes).map_err(ProfilerError::Decode)
    }
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_native_endian()
}

/// Output of [`Profiler::dump`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileDump {
    Structured(serde_json::Value),
    Binary(Vec<u8>),
}

#[derive(Debug, Default)]
struct ProfilerState {
    collections: BTreeMap<RootId, Collection>,
    current: Option<RootId>,
}

/// Call-count and timing recorder.
#[derive(Debug, Default)]
pub struct Profiler {
    enabled: AtomicBool,
    state: Mutex<ProfilerState>,
}

impl Profiler {
    /// Whether profiling support was compiled in (`profiler` feature).
    pub const SUPPORTED: bool = cfg!(feature = "profiler");

    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide profiler, created on first use.
    pub fn global() -> Arc<Profiler> {
        static GLOBAL: OnceLock<Arc<Profiler>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(Profiler::new())).clone()
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        Self::SUPPORTED && self.enabled.load(Ordering::Relaxed)
    }

    /// Turns sampling on or off. Returns whether sampling is now enabled.
    ///
    /// Without the `profiler` feature this only logs a warning.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        if enabled && !Self::SUPPORTED {
            tracing::warn!("profiling support is not compiled in; enable the `profiler` feature");
            return false;
        }
        self.enabled.store(enabled, Ordering::Relaxed);
        if !enabled {
            self.lock().current = None;
        }
        tracing::debug!(enabled, "profiler toggled");
        enabled
    }

    fn lock(&self) -> MutexGuard<'_, ProfilerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes `root`'s collection current, creating it if absent.
    ///
    /// Does nothing while disabled.
    pub fn start(&self, root: RootId) {
        if !self.is_enabled() {
            return;
        }
        let mut state = self.lock();
        state.collections.entry(root).or_default();
        state.current = Some(root);
    }

    /// Clears the current collection.
    pub fn end(&self) {
        self.lock().current = None;
    }

    /// The root whose collection is current, if any.
    pub fn current(&self) -> Option<RootId> {
        self.lock().current
    }

    /// Adds one call and `elapsed` ticks to `node` in the current collection.
    ///
    /// Does nothing if no collection is current.
    pub fn add_sample(&self, node: NodeId, elapsed: u64) {
        let mut state = self.lock();
        let Some(root) = state.current else {
            return;
        };
        let sample = state
            .collections
            .entry(root)
            .or_default()
            .entry(node)
            .or_default();
        sample.calls = sample.calls.saturating_add(1);
        sample.elapsed_ticks = sample.elapsed_ticks.saturating_add(elapsed);
    }

    /// Drops every collection and the current slot.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.collections.clear();
        state.current = None;
    }

    pub fn report(&self) -> ProfileReport {
        ProfileReport {
            roots: self.lock().collections.clone(),
        }
    }

    /// Structured mapping, or the binary layout when `binary` is set.
    pub fn dump(&self, binary: bool) -> Result<ProfileDump, ProfilerError> {
        let report = self.report();
        if binary {
            Ok(ProfileDump::Binary(report.to_bytes()?))
        } else {
            Ok(ProfileDump::Structured(report.to_json()?))
        }
    }
}

#[cfg(all(test, feature = "profiler"))]
mod tests {
    use super::*;

    fn read_u64(bytes: &[u8], at: &mut usize) -> u64 {
        let value = u64::from_ne_bytes(bytes[*at..*at + 8].try_into().unwrap());
        *at += 8;
        value
    }

    fn read_i32(bytes: &[u8], at: &mut usize) -> i32 {
        let value = i32::from_ne_bytes(bytes[*at..*at + 4].try_into().unwrap());
        *at += 4;
        value
    }

    #[test]
    fn disabled_profiler_records_nothing() {
        let profiler = Profiler::new();
        profiler.start(1);
        profiler.add_sample(1, 10);
        profiler.end();

        assert_eq!(profiler.current(), None);
        assert!(profiler.report().is_empty());
    }

    #[test]
    fn samples_outside_a_bracket_are_dropped() {
        let profiler = Profiler::new();
        profiler.set_enabled(true);
        profiler.add_sample(1, 10);
        assert!(profiler.report().is_empty());

        profiler.start(1);
        profiler.end();
        profiler.add_sample(1, 10);
        assert_eq!(profiler.report().roots[&1].len(), 0);
    }

    #[test]
    fn samples_accumulate_per_root() {
        let profiler = Profiler::new();
        profiler.set_enabled(true);

        profiler.start(1);
        profiler.add_sample(1, 30);
        profiler.add_sample(2, 10);
        profiler.end();

        profiler.start(1);
        profiler.add_sample(1, 20);
        profiler.end();

        profiler.start(5);
        profiler.add_sample(2, 7);
        profiler.end();

        let report = profiler.report();
        assert_eq!(
            report.sample(1, 1),
            Some(ProfileSample {
                calls: 2,
                elapsed_ticks: 50
            })
        );
        assert_eq!(report.sample(1, 2).map(|s| s.calls), Some(1));
        assert_eq!(report.sample(5, 2).map(|s| s.elapsed_ticks), Some(7));
        assert_eq!(report.sample(5, 1), None);
    }

    #[test]
    fn reset_clears_collections() {
        let profiler = Profiler::new();
        profiler.set_enabled(true);
        profiler.start(1);
        profiler.add_sample(1, 1);
        profiler.reset();

        assert!(profiler.report().is_empty());
        assert_eq!(profiler.current(), None);
    }

    #[test]
    fn structured_dump_nests_root_then_node() {
        let profiler = Profiler::new();
        profiler.set_enabled(true);
        profiler.start(1);
        profiler.add_sample(2, 40);
        profiler.end();

        let ProfileDump::Structured(json) = profiler.dump(false).unwrap() else {
            panic!("expected structured dump");
        };
        assert_eq!(json["1"]["2"]["calls"], 1);
        assert_eq!(json["1"]["2"]["elapsed_ticks"], 40);
    }

    #[test]
    fn binary_dump_matches_documented_layout() {
        let profiler = Profiler::new();
        profiler.set_enabled(true);
        profiler.start(1);
        profiler.add_sample(1, 100);
        profiler.add_sample(2, 60);
        profiler.end();

        let ProfileDump::Binary(bytes) = profiler.dump(true).unwrap() else {
            panic!("expected binary dump");
        };
        assert_eq!(bytes.len(), 8 + (4 + 8) + 2 * (4 + 8 + 8));

        let mut at = 0;
        assert_eq!(read_u64(&bytes, &mut at), 1);
        assert_eq!(read_i32(&bytes, &mut at), 1);
        assert_eq!(read_u64(&bytes, &mut at), 2);
        for (node, elapsed) in [(1, 100), (2, 60)] {
            assert_eq!(read_i32(&bytes, &mut at), node);
            assert_eq!(read_u64(&bytes, &mut at), 1);
            assert_eq!(read_u64(&bytes, &mut at), elapsed);
        }
        assert_eq!(at, bytes.len());

        assert_eq!(ProfileReport::from_bytes(&bytes).unwrap(), profiler.report());
    }

    #[test]
    fn truncated_binary_dump_is_rejected() {
        let profiler = Profiler::new();
        profiler.set_enabled(true);
        profiler.start(3);
        profiler.add_sample(3, 1);
        profiler.end();

        let bytes = profiler.report().to_bytes().unwrap();
        assert!(matches!(
            ProfileReport::from_bytes(&bytes[..bytes.len() - 1]),
            Err(ProfilerError::Decode(_))
        ));
    }
}

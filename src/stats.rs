//! Ingestion statistics with reader/writer concurrency.
//!
//! One [`StatsRegistry`] is shared between the gateway loop (writer) and the
//! control-node client threads (readers) behind an `RwLock`: writers are
//! exclusive, readers run concurrently. Counters are monotonic until
//! [`StatsRegistry::reset`]. Readers get a consistent snapshot of whatever
//! they ask for, but the global and per-source views are not snapshotted as
//! one atomic group.

use std::collections::HashMap;
use std::sync::RwLock;

/// Fabric-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalStats {
    pub rx_total: u64,
    pub malformed_total: u64,
    pub gap_total: u64,
    pub reorder_total: u64,
    pub duplicate_total: u64,
    pub crc_fail_total: u64,
}

/// Per-source counters plus last-seen markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub src_id: u16,
    pub rx_count: u64,
    pub malformed: u64,
    pub gaps: u64,
    pub reorders: u64,
    pub duplicates: u64,
    pub last_seq: u32,
    pub last_ts_ns: u64,
}

/// Three-level health rollup derived from the global counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Ok,
    Degraded,
    Error,
}

impl Health {
    pub fn as_str(self) -> &'static str {
        match self {
            Health::Ok => "OK",
            Health::Degraded => "DEGRADED",
            Health::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
struct StatsInner {
    global: GlobalStats,
    sources: HashMap<u16, SourceStats>,
}

impl StatsInner {
    fn source_mut(&mut self, src_id: u16) -> &mut SourceStats {
        self.sources.entry(src_id).or_insert_with(|| SourceStats { src_id, ..Default::default() })
    }
}

/// Global and per-source ingestion counters.
#[derive(Debug, Default)]
pub struct StatsRegistry {
    inner: RwLock<StatsInner>,
}

impl StatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame passed validation.
    pub fn record_rx(&self, src_id: u16, seq: u32, ts_ns: u64) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.global.rx_total += 1;
        let source = inner.source_mut(src_id);
        source.rx_count += 1;
        source.last_seq = seq;
        source.last_ts_ns = ts_ns;
    }

    /// A frame was rejected by the parser.
    pub fn record_malformed(&self, src_id: u16) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.global.malformed_total += 1;
        inner.source_mut(src_id).malformed += 1;
    }

    /// A sequence gap of `gap_size` missing frames. Counts the gap size, not 1.
    pub fn record_gap(&self, src_id: u16, gap_size: u32) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.global.gap_total += u64::from(gap_size);
        inner.source_mut(src_id).gaps += u64::from(gap_size);
    }

    pub fn record_reorder(&self, src_id: u16) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.global.reorder_total += 1;
        inner.source_mut(src_id).reorders += 1;
    }

    pub fn record_duplicate(&self, src_id: u16) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.global.duplicate_total += 1;
        inner.source_mut(src_id).duplicates += 1;
    }

    /// A CRC failure. Tallied under `crc_fail_total` and, being a stricter
    /// sub-kind of malformed, under the source's malformed counter too.
    pub fn record_crc_fail(&self, src_id: u16) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.global.crc_fail_total += 1;
        inner.source_mut(src_id).malformed += 1;
    }

    pub fn global(&self) -> GlobalStats {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).global
    }

    /// Stats for one source; zeros when the source has never been seen.
    pub fn source(&self, src_id: u16) -> SourceStats {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .sources
            .get(&src_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn all_sources(&self) -> Vec<SourceStats> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).sources.values().copied().collect()
    }

    /// ERROR when anything malformed or CRC-failed was seen, DEGRADED on
    /// gaps or reorders, OK otherwise.
    pub fn health(&self) -> Health {
        let global = self.global();
        if global.malformed_total > 0 || global.crc_fail_total > 0 {
            Health::Error
        } else if global.gap_total > 0 || global.reorder_total > 0 {
            Health::Degraded
        } else {
            Health::Ok
        }
    }

    /// Zero every counter and drop all source entries.
    pub fn reset(&self) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.global = GlobalStats::default();
        inner.sources.clear();
    }
}

//! The data model shared by every component: a single process observation,
//! one session-wide sample, and the incremental running average folded
//! across samples.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Multiset of ps-style one-character process state codes (e.g. `S`, `R`, `Z`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateCounter(BTreeMap<String, u64>);

impl StateCounter {
    pub fn single(state: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(state.into(), 1);
        Self(map)
    }

    /// Fold `other`'s counts into `self`.
    pub fn merge(&mut self, other: &StateCounter) {
        for (state, count) in &other.0 {
            *self.0.entry(state.clone()).or_insert(0) += count;
        }
    }
}

/// A single process observed in one sample.
///
/// All numeric fields are `>= 0`. `rss`/`vsz` are always bytes, regardless of
/// the unit the sampler's source reported them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessStat {
    pub pid: u32,
    pub pcpu: f64,
    pub pmem: f64,
    pub rss: u64,
    pub vsz: u64,
    pub timestamp: String,
    pub etime: String,
    pub stat: StateCounter,
    pub cmd: String,
}

impl ProcessStat {
    /// Peak-wise aggregation of two observations of (what is assumed to be)
    /// the same pid across two samples.
    ///
    /// `cmd` prefers the newer value when the old one looks like a
    /// kernel-substituted abbreviation (`[kworker/...]`); `etime` always
    /// takes the newer value since it is monotonic per-process.
    pub fn aggregate(&self, other: &ProcessStat) -> ProcessStat {
        let cmd = if self.cmd != other.cmd && is_bracketed(&self.cmd) {
            other.cmd.clone()
        } else {
            self.cmd.clone()
        };
        let mut stat = self.stat.clone();
        stat.merge(&other.stat);
        ProcessStat {
            pid: self.pid,
            pcpu: self.pcpu.max(other.pcpu),
            pmem: self.pmem.max(other.pmem),
            rss: self.rss.max(other.rss),
            vsz: self.vsz.max(other.vsz),
            timestamp: self.timestamp.clone().max(other.timestamp.clone()),
            etime: other.etime.clone(),
            stat,
            cmd,
        }
    }
}

fn is_bracketed(cmd: &str) -> bool {
    cmd.starts_with('[') && cmd.ends_with(']')
}

/// Incremental mean of per-sample totals. `num_samples == 0` means "no data".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningAverages {
    pub rss: Option<f64>,
    pub vsz: Option<f64>,
    pub pmem: Option<f64>,
    pub pcpu: Option<f64>,
    pub num_samples: u64,
}

impl RunningAverages {
    /// Build the running average for exactly one sample: fields equal the
    /// sample's totals, no division.
    pub fn from_single_sample(sample: &Sample) -> Self {
        Self {
            rss: Some(sample.total_rss as f64),
            vsz: Some(sample.total_vsz as f64),
            pmem: Some(sample.total_pmem),
            pcpu: Some(sample.total_pcpu),
            num_samples: 1,
        }
    }

    /// Fold a new sample's totals into the running mean.
    pub fn update(&mut self, sample: &Sample) {
        self.num_samples += 1;
        let n = self.num_samples as f64;
        update_field(&mut self.rss, sample.total_rss as f64, n);
        update_field(&mut self.vsz, sample.total_vsz as f64, n);
        update_field(&mut self.pmem, sample.total_pmem, n);
        update_field(&mut self.pcpu, sample.total_pcpu, n);
    }
}

fn update_field(field: &mut Option<f64>, new_total: f64, num_samples: f64) {
    match field {
        Some(x) => *x += (new_total - *x) / num_samples,
        None => *field = Some(new_total),
    }
}

/// One observation of an entire session: every live process's stats, plus
/// eagerly-maintained totals and a running average bound to this sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sample {
    pub stats: BTreeMap<u32, ProcessStat>,
    pub averages: RunningAverages,
    pub total_pcpu: f64,
    pub total_pmem: f64,
    pub total_rss: u64,
    pub total_vsz: u64,
    pub timestamp: String,
}

impl Sample {
    /// Construct a fresh sample whose averages reflect exactly one
    /// observation (`num_samples == 1`).
    pub fn from_pids(stats: BTreeMap<u32, ProcessStat>) -> Self {
        let mut sample = Sample::default();
        for (pid, stat) in stats {
            sample.add_pid(pid, stat);
        }
        sample.averages = RunningAverages::from_single_sample(&sample);
        sample
    }

    /// Insert a pid not already present, folding its values into the totals.
    pub fn add_pid(&mut self, pid: u32, stat: ProcessStat) {
        debug_assert!(!self.stats.contains_key(&pid));
        self.total_pcpu += stat.pcpu;
        self.total_pmem += stat.pmem;
        self.total_rss += stat.rss;
        self.total_vsz += stat.vsz;
        if stat.timestamp > self.timestamp {
            self.timestamp = stat.timestamp.clone();
        }
        self.stats.insert(pid, stat);
    }

    /// Peak-wise aggregation of two samples (see spec §3): per-pid peaks,
    /// and **independently** peak totals rather than a recomputation from
    /// the per-pid peaks. `self`'s averages carry forward, updated by
    /// `other`'s totals.
    pub fn aggregate(&self, other: &Sample) -> Sample {
        let mut stats = BTreeMap::new();
        for pid in self.stats.keys().chain(other.stats.keys()).copied() {
            if stats.contains_key(&pid) {
                continue;
            }
            let merged = match (self.stats.get(&pid), other.stats.get(&pid)) {
                (Some(mine), Some(theirs)) => mine.aggregate(theirs),
                (Some(mine), None) => mine.clone(),
                (None, Some(theirs)) => theirs.clone(),
                (None, None) => unreachable!("pid came from one of the two maps"),
            };
            stats.insert(pid, merged);
        }

        let mut averages = self.averages;
        averages.update(other);

        Sample {
            stats,
            averages,
            total_pcpu: self.total_pcpu.max(other.total_pcpu),
            total_pmem: self.total_pmem.max(other.total_pmem),
            total_rss: self.total_rss.max(other.total_rss),
            total_vsz: self.total_vsz.max(other.total_vsz),
            timestamp: self.timestamp.clone().max(other.timestamp.clone()),
        }
    }
}

/// The usage-log line shape (spec §4.E / §6 File 3): a projection of
/// [`Sample`], not its internal layout — `stats` becomes `processes`, the
/// flat `total_*` fields become a `totals` object, and `num_samples` is
/// hoisted to the top level.
#[derive(Debug, Serialize)]
pub struct UsageRecord<'a> {
    pub timestamp: &'a str,
    pub num_samples: u64,
    pub processes: &'a BTreeMap<u32, ProcessStat>,
    pub totals: UsageTotals,
    pub averages: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct UsageTotals {
    pub pcpu: f64,
    pub pmem: f64,
    pub rss: u64,
    pub vsz: u64,
}

impl Sample {
    /// Build the record written to the usage log, matching
    /// `_models.py::Sample.for_json` (averages serialize as `{}` rather than
    /// nulled-out fields when no sample has landed yet).
    pub fn for_json(&self) -> UsageRecord<'_> {
        let averages = if self.averages.num_samples >= 1 {
            serde_json::to_value(self.averages).unwrap_or(serde_json::Value::Null)
        } else {
            serde_json::Value::Object(serde_json::Map::new())
        };
        UsageRecord {
            timestamp: &self.timestamp,
            num_samples: self.averages.num_samples,
            processes: &self.stats,
            totals: UsageTotals {
                pcpu: self.total_pcpu,
                pmem: self.total_pmem,
                rss: self.total_rss,
                vsz: self.total_vsz,
            },
            averages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(pid: u32, rss: u64, ts: &str) -> ProcessStat {
        ProcessStat {
            pid,
            pcpu: 1.0,
            pmem: 2.0,
            rss,
            vsz: rss * 2,
            timestamp: ts.to_string(),
            etime: "00:01".into(),
            stat: StateCounter::single("S"),
            cmd: "sleep 1".into(),
        }
    }

    #[test]
    fn single_sample_averages_equal_totals() {
        let mut stats = BTreeMap::new();
        stats.insert(1, stat(1, 100, "t0"));
        let sample = Sample::from_pids(stats);
        assert_eq!(sample.averages.num_samples, 1);
        assert_eq!(sample.averages.rss, Some(sample.total_rss as f64));
        assert_eq!(sample.averages.pcpu, Some(sample.total_pcpu));
    }

    #[test]
    fn aggregate_takes_peak_totals_not_sum() {
        let mut a_stats = BTreeMap::new();
        a_stats.insert(1, stat(1, 100, "t0"));
        let a = Sample::from_pids(a_stats);

        let mut b_stats = BTreeMap::new();
        b_stats.insert(1, stat(1, 50, "t1"));
        let b = Sample::from_pids(b_stats);

        let agg = a.aggregate(&b);
        // peak, not 100 + 50
        assert_eq!(agg.total_rss, 100);
        assert_eq!(agg.stats[&1].rss, 100);
    }

    #[test]
    fn aggregate_keeps_pids_present_only_on_one_side() {
        let mut a_stats = BTreeMap::new();
        a_stats.insert(1, stat(1, 100, "t0"));
        let a = Sample::from_pids(a_stats);

        let mut b_stats = BTreeMap::new();
        b_stats.insert(2, stat(2, 200, "t1"));
        let b = Sample::from_pids(b_stats);

        let agg = a.aggregate(&b);
        assert!(agg.stats.contains_key(&1));
        assert!(agg.stats.contains_key(&2));
    }

    #[test]
    fn averages_update_mean_across_three_samples() {
        let mut averages = RunningAverages::default();
        for rss in [100u64, 200, 300] {
            let mut stats = BTreeMap::new();
            stats.insert(1, stat(1, rss, "t"));
            let sample = Sample::from_pids(stats);
            averages.update(&sample);
        }
        assert_eq!(averages.num_samples, 3);
        assert!((averages.rss.unwrap() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn timestamp_is_max_across_pids() {
        let mut stats = BTreeMap::new();
        stats.insert(1, stat(1, 1, "2024-01-01T00:00:00Z"));
        stats.insert(2, stat(2, 1, "2024-01-02T00:00:00Z"));
        let sample = Sample::from_pids(stats);
        assert_eq!(sample.timestamp, "2024-01-02T00:00:00Z");
    }

    #[test]
    fn for_json_projects_stats_to_processes_and_totals() {
        let mut stats = BTreeMap::new();
        stats.insert(7, stat(7, 100, "t0"));
        let sample = Sample::from_pids(stats);

        let json = serde_json::to_value(sample.for_json()).unwrap();
        assert!(json.get("stats").is_none());
        assert!(json.get("processes").unwrap().get("7").is_some());
        assert_eq!(json["totals"]["rss"], 100);
        assert_eq!(json["num_samples"], 1);
        assert!(json["averages"]["rss"].is_number());
    }

    #[test]
    fn for_json_reports_empty_averages_before_any_sample() {
        let json = serde_json::to_value(Sample::default().for_json()).unwrap();
        assert_eq!(json["averages"], serde_json::json!({}));
        assert_eq!(json["num_samples"], 0);
    }
}

//! Effective capacity from packet-pair dispersion.
//!
//! 基于包对离散度的有效容量估计。

use crate::{capture::CaptureBuffer, stats};
use tracing::{debug, info, warn};

/// The outcome of a packet-pair round.
///
/// 一次包对轮次的结果。
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityReport {
    /// Median effective capacity in Mbps, `0.0` without valid samples.
    /// 有效容量的中位数（Mbps），没有有效样本时为 `0.0`。
    pub effective_capacity: f64,
    /// Mean of the valid capacity samples.
    /// 有效容量样本的平均值。
    pub mean_capacity: Option<f64>,
    /// Capacity samples of the valid pairs, in the order they were measured.
    /// 有效包对的容量样本，按测量顺序排列。
    pub samples: Vec<f64>,
    /// Indices of the pairs that were skipped over.
    /// 被跳过（丢失）的包对序号。
    pub lost_pairs: Vec<u32>,
    pub requested_pairs: u32,
}

impl CapacityReport {
    pub fn valid_pairs(&self) -> usize {
        self.samples.len()
    }
}

/// Estimates the effective capacity from a packet-pair burst of
/// `requested_pairs` pairs.
///
/// Two adjacent records with the same non-negative sequence id form a pair.
/// Pairs are consumed in sequence order: a pair id below the running cursor is
/// a duplicate and skipped, a pair id above it marks every id in between as
/// lost. Each pair yields `size * 8 / dispersion` Mbps; only positive, finite
/// samples count. The result is the median of the valid samples.
///
/// 从包含 `requested_pairs` 个包对的突发中估计有效容量。
pub fn estimate_capacity(buffer: &CaptureBuffer, requested_pairs: u32) -> CapacityReport {
    let total = i64::from(requested_pairs);
    let mut processed: i64 = 0;
    let mut samples = Vec::new();
    let mut lost_pairs = Vec::new();

    for i in 0..buffer.len().saturating_sub(1) {
        if processed >= total {
            break;
        }
        let seq = buffer.sequence_at(i);
        if seq < 0 || seq != buffer.sequence_at(i + 1) {
            continue;
        }
        let seq = i64::from(seq);
        if seq < processed {
            debug!(pair = seq, "Duplicated packet pair ignored");
            continue;
        }
        if seq >= total {
            debug!(pair = seq, total, "Packet pair outside of the burst ignored");
            continue;
        }
        while processed < seq {
            warn!(pair = processed, "Packet pair lost");
            lost_pairs.push(processed as u32);
            processed += 1;
        }

        if let Some(sample) = buffer.dispersion(i) {
            let capacity = sample.receiver_rate();
            let send_rate = sample.sender_rate();
            if capacity > 0.0 && capacity.is_finite() {
                debug!(
                    pair = seq,
                    size = sample.size,
                    dispersion_us = sample.receiver_gap_micros,
                    ce_mbps = capacity,
                    send_rate_mbps = send_rate,
                    "Packet pair received"
                );
                samples.push(capacity);
            }
        }
        processed += 1;
    }

    let mean_capacity = stats::mean(&samples);
    let mut sorted = samples.clone();
    let effective_capacity = stats::median(&mut sorted)
        .filter(|median| *median >= 0.0)
        .unwrap_or(0.0);

    info!(
        valid = samples.len(),
        pairs = requested_pairs,
        lost = lost_pairs.len(),
        median_mbps = effective_capacity,
        mean_mbps = mean_capacity.unwrap_or(0.0),
        "Summary of Ce test"
    );

    CapacityReport {
        effective_capacity,
        mean_capacity,
        samples,
        lost_pairs,
        requested_pairs,
    }
}

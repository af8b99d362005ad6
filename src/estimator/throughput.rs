//! Achievable bandwidth from packet-train dispersion, corrected for the
//! effective capacity and for packet loss.
//!
//! 基于包列离散度的可达带宽估计，并按有效容量与丢包率进行修正。

use crate::{
    capture::CaptureBuffer,
    error::{Error, Result},
    stats,
};
use tracing::{debug, info, warn};

/// The outcome of a packet-train round.
///
/// 一次包列轮次的结果。
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputReport {
    /// Mean-based achievable bandwidth after the loss penalty, in Mbps. This
    /// is the value reported to the sender.
    /// 经丢包惩罚后的基于均值的可达带宽（Mbps），即回报给发送端的值。
    pub achievable_bandwidth: f64,
    /// Achievable throughput from the mean dispersion.
    /// 由平均离散度得到的可达吞吐量。
    pub mean_throughput: f64,
    /// Achievable throughput from the median dispersion.
    /// 由离散度中位数得到的可达吞吐量。
    pub median_throughput: f64,
    /// Capacity-corrected bandwidth from the mean, before the loss penalty.
    pub mean_bandwidth: f64,
    /// Capacity-corrected bandwidth from the median, before the loss penalty.
    pub median_bandwidth: f64,
    pub loss_events: u32,
    /// Loss events per requested packet.
    /// 每个请求包对应的丢包事件数。
    pub loss_rate: f64,
    pub valid_dispersions: usize,
    /// Share of the `N - 1` dispersions that could not be measured.
    /// `N - 1` 个离散度中无法测量的比例。
    pub invalid_rate: f64,
}

impl ThroughputReport {
    fn empty() -> Self {
        Self {
            achievable_bandwidth: 0.0,
            mean_throughput: 0.0,
            median_throughput: 0.0,
            mean_bandwidth: 0.0,
            median_bandwidth: 0.0,
            loss_events: 0,
            loss_rate: 0.0,
            valid_dispersions: 0,
            invalid_rate: 0.0,
        }
    }
}

/// Corrects an achievable throughput `at` that fell below the effective
/// capacity `ce`: `ce * (2 - ce / at)`.
///
/// 当可达吞吐量 `at` 低于有效容量 `ce` 时进行修正：`ce * (2 - ce / at)`。
pub fn correct_for_capacity(at: f64, ce: f64) -> f64 {
    if at >= ce {
        at
    } else {
        ce * (2.0 - ce / at)
    }
}

/// Estimates the achievable bandwidth from a packet train of `requested`
/// packets numbered `0..requested`.
///
/// Loss is detected from gaps in the sequence ids: a missing id is one loss
/// event, a jump counts one event per skipped id. Two adjacent records with
/// consecutive ids, the first of which is the expected one, give a clean
/// dispersion. A dispersion faster than the sender's own spacing is clamped to
/// the sender's spacing. The mean dispersion gives the achievable throughput,
/// which is corrected against `effective_capacity` and finally scaled by
/// `1 - loss_rate`.
///
/// Fails with [`Error::CapacityUnknown`] when no effective capacity has been
/// measured yet.
///
/// 从编号为 `0..requested` 的包列中估计可达带宽。尚未测得有效容量时返回
/// [`Error::CapacityUnknown`]。
pub fn estimate_throughput(
    buffer: &CaptureBuffer,
    requested: u32,
    effective_capacity: Option<f64>,
) -> Result<ThroughputReport> {
    let capacity = effective_capacity.ok_or(Error::CapacityUnknown)?;
    if requested == 0 {
        return Ok(ThroughputReport::empty());
    }

    let total = i64::from(requested);
    let mut expected: i64 = 0;
    let mut loss_events: u32 = 0;
    let mut dispersions = Vec::new();

    for i in 0..requested as usize {
        let seq = i64::from(buffer.sequence_at(i));
        if seq != expected {
            warn!(expected, "Dispersion invalid, packet lost");
            loss_events += 1;
            if seq > expected {
                // Bursty loss: every id up to the observed one is gone.
                expected += 1;
                while seq > expected && expected < total {
                    warn!(expected, "Dispersion invalid, packet lost in burst");
                    loss_events += 1;
                    expected += 1;
                }
            }
        }

        let next = i64::from(buffer.sequence_at(i + 1));
        let clean = next == seq + 1 && seq == expected;
        match buffer.dispersion(i).filter(|_| clean) {
            Some(sample) => {
                let throughput = sample.receiver_rate();
                let send_rate = sample.sender_rate();
                let mut dispersion = sample.receiver_gap_micros;
                if throughput > send_rate {
                    // The train cannot arrive faster than it was sent.
                    dispersion = sample.size as f64 * 8.0 / send_rate;
                }
                dispersions.push(dispersion);
                debug!(
                    pair = expected,
                    size = sample.size,
                    dispersion_us = dispersion,
                    at_mbps = throughput,
                    send_rate_mbps = send_rate,
                    "Packet train dispersion"
                );
            }
            None => {
                warn!(expected, lost = expected + 1, "Dispersion invalid, next packet lost");
                if expected == total - 2 {
                    // The last packet of the train is gone.
                    loss_events += 1;
                }
            }
        }

        expected += 1;
        if expected >= total - 1 {
            break;
        }
    }

    let valid = dispersions.len();
    let loss_rate = f64::from(loss_events) / total as f64;
    let invalid_rate = if total > 1 {
        (total - 1 - valid as i64) as f64 / (total - 1) as f64
    } else {
        0.0
    };

    let first_size = buffer.get(0).map_or(0, |record| record.size) as f64;
    let mean_dispersion = stats::mean(&dispersions);
    let median_dispersion = stats::median(&mut dispersions);
    let (mean_throughput, median_throughput) = match (mean_dispersion, median_dispersion) {
        (Some(mean), Some(median)) => (first_size * 8.0 / mean, first_size * 8.0 / median),
        _ => (0.0, 0.0),
    };

    let (mean_bandwidth, median_bandwidth) = if valid > 0 {
        (
            correct_for_capacity(mean_throughput, capacity),
            correct_for_capacity(median_throughput, capacity),
        )
    } else {
        (0.0, 0.0)
    };

    let penalized = mean_bandwidth * (1.0 - loss_rate);
    let achievable_bandwidth = if penalized > 0.0 { penalized } else { 0.0 };

    info!(
        valid,
        packets = requested,
        loss_events,
        loss_rate,
        invalid_rate,
        mean_at_mbps = mean_throughput,
        median_at_mbps = median_throughput,
        mean_ab_mbps = mean_bandwidth,
        median_ab_mbps = median_bandwidth,
        ab_with_loss_mbps = achievable_bandwidth,
        "Summary of At test"
    );

    Ok(ThroughputReport {
        achievable_bandwidth,
        mean_throughput,
        median_throughput,
        mean_bandwidth,
        median_bandwidth,
        loss_events,
        loss_rate,
        valid_dispersions: valid,
        invalid_rate,
    })
}

//! Burst capture: fills the capture buffer from the data channel for one
//! requested burst, under a bounded wait per packet.
//!
//! 突发捕获：在每包有界等待的前提下，为一次请求的突发从数据通道填充捕获缓冲区。

pub mod buffer;
pub mod source;

use crate::{
    config::CaptureConfig,
    error::{Error, Result},
    packet::{control::BurstRequest, probe::{ProbeHeader, PROBE_HEADER_SIZE}},
};
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

pub use buffer::{CaptureBuffer, DispersionSample, ProbeRecord, SENTINEL_SEQUENCE};
pub use source::ProbeSource;

/// Why a capture stopped.
///
/// 捕获结束的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstEnd {
    /// Every expected datagram was received.
    /// 收到了全部预期的数据报。
    Complete,
    /// The final sequence id of the burst arrived, possibly early.
    /// 收到了本次突发的最后一个序号，可能提前到达。
    LastPacket,
    /// No datagram arrived within the burst timeout.
    /// 在突发超时时间内没有数据报到达。
    Timeout,
    /// Waiting on the data channel failed.
    /// 等待数据通道时出错。
    WaitError,
}

/// The result of one capture.
///
/// 一次捕获的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub received: usize,
    pub expected: usize,
    pub end: BurstEnd,
}

/// Captures one burst into `buffer`.
///
/// The buffer is reset first. Each wait is bounded by
/// [`CaptureConfig::burst_timeout`] and reads exactly one datagram. The capture
/// ends when all expected datagrams arrived, when the burst's last sequence id
/// arrives, on timeout, or when the wait fails. Losses and timeouts are not
/// errors; they leave a shorter buffer for the estimators.
///
/// Fails with [`Error::CapacityExceeded`] if the burst cannot fit the buffer.
///
/// 将一次突发捕获到 `buffer` 中。丢包和超时不是错误，只会让缓冲区更短。
pub async fn capture_burst<S>(
    source: &S,
    buffer: &mut CaptureBuffer,
    request: BurstRequest,
    config: &CaptureConfig,
) -> Result<CaptureOutcome>
where
    S: ProbeSource + ?Sized,
{
    let expected = request.kind.expected_packets(request.requested);
    if !buffer.fits(expected) {
        return Err(Error::CapacityExceeded {
            capacity: buffer.capacity(),
        });
    }
    buffer.reset();

    let last_sequence = i64::try_from(expected).unwrap_or(i64::MAX) - 1;
    let mut datagram = vec![0u8; config.max_packet_size.max(PROBE_HEADER_SIZE)];
    let mut end = BurstEnd::Complete;

    while buffer.len() < expected {
        let len = match time::timeout(config.burst_timeout, source.recv_probe(&mut datagram)).await
        {
            Err(_elapsed) => {
                warn!(
                    kind = %request.kind,
                    received = buffer.len(),
                    expected,
                    timeout_ms = config.burst_timeout.as_millis() as u64,
                    "Receiving probes timed out"
                );
                end = BurstEnd::Timeout;
                break;
            }
            Ok(Err(e)) => {
                warn!(error = %e, received = buffer.len(), "Waiting for probes failed");
                end = BurstEnd::WaitError;
                break;
            }
            Ok(Ok(len)) => len,
        };
        let arrival = Instant::now();

        let mut cursor = &datagram[..len];
        let Some(header) = ProbeHeader::decode(&mut cursor) else {
            debug!(len, "Ignoring datagram shorter than a probe header");
            continue;
        };
        trace!(
            seq = header.sequence,
            tstamp = header.timestamp,
            len,
            "Probe received"
        );

        buffer.push(ProbeRecord {
            sequence: header.sequence,
            sent_at_micros: header.timestamp,
            arrival,
            size: len,
        })?;

        if i64::from(header.sequence) == last_sequence {
            end = if buffer.len() == expected {
                BurstEnd::Complete
            } else {
                BurstEnd::LastPacket
            };
            break;
        }
    }

    debug!(
        kind = %request.kind,
        received = buffer.len(),
        expected,
        end = ?end,
        "Burst capture finished"
    );
    Ok(CaptureOutcome {
        received: buffer.len(),
        expected,
        end,
    })
}

//! Builders for synthetic bursts.
use crate::capture::{CaptureBuffer, ProbeRecord};
use std::time::Duration;
use tokio::time::Instant;

/// One synthetic arrival: sequence id, receiver offset and sender timestamp
/// (both in microseconds), and size.
#[derive(Debug, Clone, Copy)]
pub struct Arrival {
    pub sequence: i32,
    pub arrival_micros: u64,
    pub sent_micros: i32,
    pub size: usize,
}

pub fn buffer_from(arrivals: &[Arrival]) -> CaptureBuffer {
    let base = Instant::now();
    let mut buffer = CaptureBuffer::new(200);
    for a in arrivals {
        buffer
            .push(ProbeRecord {
                sequence: a.sequence,
                sent_at_micros: a.sent_micros,
                arrival: base + Duration::from_micros(a.arrival_micros),
                size: a.size,
            })
            .unwrap();
    }
    buffer
}

/// A packet-pair burst. Each pair is sent `send_gap` apart and arrives
/// `dispersion` apart; pairs are spaced 10 ms from each other.
pub fn pairs(ids: &[i32], size: usize, dispersion: u64, send_gap: i32) -> Vec<Arrival> {
    let mut out = Vec::new();
    for &id in ids {
        let start = id as u64 * 10_000;
        out.push(Arrival {
            sequence: id,
            arrival_micros: start,
            sent_micros: start as i32,
            size,
        });
        out.push(Arrival {
            sequence: id,
            arrival_micros: start + dispersion,
            sent_micros: start as i32 + send_gap,
            size,
        });
    }
    out
}

/// A packet train in which packet `seq` is sent at `seq * send_gap` and
/// arrives at `seq * dispersion`.
pub fn train(ids: &[i32], size: usize, dispersion: u64, send_gap: i32) -> Vec<Arrival> {
    ids.iter()
        .map(|&seq| Arrival {
            sequence: seq,
            arrival_micros: seq as u64 * dispersion,
            sent_micros: seq * send_gap,
            size,
        })
        .collect()
}

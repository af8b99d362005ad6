//! The bounded store of probe arrivals for one burst.
//!
//! 单次突发的有界探测到达记录存储。

use crate::error::{Error, Result};
use tokio::time::Instant;

/// The sequence id reported for a slot that was not written in this burst.
/// 本次突发中未写入的槽位所报告的序号。
pub const SENTINEL_SEQUENCE: i32 = -1;

/// One received probe.
///
/// 一个已接收的探测包。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeRecord {
    /// The sequence id carried in the probe header.
    /// 探测头中携带的序号。
    pub sequence: i32,
    /// The sender clock at transmission, in microseconds.
    /// 发送时刻的发送端时钟，单位微秒。
    pub sent_at_micros: i32,
    /// Receiver clock when the datagram was read.
    /// 读取数据报时的接收端时钟。
    pub arrival: Instant,
    /// The number of bytes actually received.
    /// 实际接收到的字节数。
    pub size: usize,
}

/// The timing of two consecutive records.
///
/// 两个相邻记录的时间特征。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersionSample {
    /// Arrival gap at the receiver.
    /// 接收端的到达间隔。
    pub receiver_gap_micros: f64,
    /// Transmission gap according to the sender timestamps.
    /// 根据发送端时间戳计算的发送间隔。
    pub sender_gap_micros: f64,
    /// The size of the second packet, which is what the gap carried.
    /// 第二个包的大小，即该间隔所承载的数据量。
    pub size: usize,
}

impl DispersionSample {
    /// Computes the dispersion between `first` and the record that follows it.
    pub fn between(first: &ProbeRecord, second: &ProbeRecord) -> Self {
        let receiver_gap = second.arrival.saturating_duration_since(first.arrival);
        Self {
            receiver_gap_micros: receiver_gap.as_nanos() as f64 / 1_000.0,
            // The sender clock is a wrapping 32-bit microsecond counter.
            sender_gap_micros: second.sent_at_micros.wrapping_sub(first.sent_at_micros) as f64,
            size: second.size,
        }
    }

    /// The rate observed at the receiver, in Mbps (bits per microsecond).
    /// 接收端观测到的速率，单位Mbps（比特每微秒）。
    pub fn receiver_rate(&self) -> f64 {
        self.size as f64 * 8.0 / self.receiver_gap_micros
    }

    /// The rate the sender transmitted at, in Mbps.
    /// 发送端的发送速率，单位Mbps。
    pub fn sender_rate(&self) -> f64 {
        self.size as f64 * 8.0 / self.sender_gap_micros
    }
}

/// A reusable, bounded, arrival-ordered sequence of probe records.
///
/// The buffer must be [`reset`](CaptureBuffer::reset) at the start of every
/// burst. Reads only ever see records pushed since the last reset; any
/// position past them reports [`SENTINEL_SEQUENCE`].
///
/// 可复用的、有界的、按到达顺序排列的探测记录序列。每次突发开始时必须先调用
/// `reset`，读取操作只能看到自上次重置以来写入的记录。
#[derive(Debug)]
pub struct CaptureBuffer {
    records: Vec<ProbeRecord>,
    capacity: usize,
}

impl CaptureBuffer {
    /// Creates an empty buffer holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Clears every record written by the previous burst.
    ///
    /// 清除上一次突发写入的所有记录。
    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// Appends a record at the next free slot.
    ///
    /// 在下一个空闲槽位追加一条记录。
    pub fn push(&mut self, record: ProbeRecord) -> Result<()> {
        if self.records.len() >= self.capacity {
            return Err(Error::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.records.push(record);
        Ok(())
    }

    /// Returns whether a burst of `packets` datagrams fits.
    pub fn fits(&self, packets: usize) -> bool {
        packets <= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records of the current burst, in arrival order.
    pub fn records(&self) -> &[ProbeRecord] {
        &self.records
    }

    /// Returns the record at arrival position `index`, if written this burst.
    pub fn get(&self, index: usize) -> Option<&ProbeRecord> {
        self.records.get(index)
    }

    /// Returns the sequence id at `index`, or [`SENTINEL_SEQUENCE`] for a
    /// slot not written in this burst.
    ///
    /// 返回 `index` 处的序号；本次突发未写入的槽位返回哨兵值。
    pub fn sequence_at(&self, index: usize) -> i32 {
        self.get(index)
            .map_or(SENTINEL_SEQUENCE, |record| record.sequence)
    }

    /// The dispersion between the records at `index` and `index + 1`.
    pub fn dispersion(&self, index: usize) -> Option<DispersionSample> {
        let first = self.get(index)?;
        let second = self.get(index + 1)?;
        Some(DispersionSample::between(first, second))
    }
}

//! 定义探测数据报的头部。
//! Defines the header of a probe datagram.

use bytes::{Buf, BufMut};

/// The size of the probe header. Padding follows it up to the probe size.
/// 探测头的长度，其后为填充，直至探测包大小。
pub const PROBE_HEADER_SIZE: usize = 8;

/// The header at the start of every probe datagram.
/// 每个探测数据报起始处的头部。
///
/// Only the sequence id and the sender timestamp are read. The size of the
/// probe is the length of the datagram itself, there is no length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeHeader {
    /// The pair index of a packet pair, or the position within a train.
    /// 包对的序号，或包列中的位置。
    pub sequence: i32,
    /// Sender clock at transmission, in microseconds.
    /// 发送时刻的发送端时钟，单位微秒。
    pub timestamp: i32,
}

impl ProbeHeader {
    /// 将探测头编码到缓冲区。
    /// Encodes the probe header into a buffer.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i32_le(self.sequence);
        buf.put_i32_le(self.timestamp);
    }

    /// 从缓冲区解码探测头。
    /// Decodes a probe header from a buffer.
    pub fn decode<B: Buf>(buf: &mut B) -> Option<Self> {
        if buf.remaining() < PROBE_HEADER_SIZE {
            return None;
        }
        Some(Self {
            sequence: buf.get_i32_le(),
            timestamp: buf.get_i32_le(),
        })
    }

    /// Builds a whole probe datagram of `size` bytes, zero padded.
    /// 构造一个 `size` 字节、以零填充的完整探测数据报。
    pub fn to_datagram(&self, size: usize) -> Vec<u8> {
        let mut buf = Vec::with_capacity(size.max(PROBE_HEADER_SIZE));
        self.encode(&mut buf);
        buf.resize(size.max(PROBE_HEADER_SIZE), 0);
        buf
    }
}

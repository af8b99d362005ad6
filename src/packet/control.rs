//! 定义控制通道上的消息及其编解码。
//! Defines the messages exchanged on the control channel and their codec.
//!
//! Every control message is a fixed 8-byte record: a 4-byte option code
//! followed by a 4-byte unsigned value, both little-endian.
//!
//! 每条控制消息都是固定8字节的记录：4字节选项码后跟4字节无符号值，均为小端序。

use crate::error::{Error, Result};
use bytes::{Buf, BufMut};
use std::fmt;

/// The size of a control message on the wire.
/// 控制消息的线上长度。
pub const CONTROL_MESSAGE_SIZE: usize = 8;

/// The option codes used on the wire.
/// 线上使用的选项码。
pub mod option {
    pub const PACKET_PAIR: u32 = 0x0001;
    pub const PACKET_TRAIN: u32 = 0x0002;
    pub const READY: u32 = 0x0004;
    pub const FAILED: u32 = 0x0008;
}

/// The raw control record as it appears on the wire.
/// 线上出现的原始控制记录。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlMessage {
    pub option: u32,
    pub value: u32,
}

impl ControlMessage {
    /// 将控制消息编码到缓冲区。
    /// Encodes the control message into a buffer.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.option);
        buf.put_u32_le(self.value);
    }

    /// 从完整的线上记录解码控制消息。
    /// Decodes a control message from a complete wire record.
    ///
    /// Anything but exactly [`CONTROL_MESSAGE_SIZE`] bytes is rejected.
    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        if buf.len() != CONTROL_MESSAGE_SIZE {
            return Err(Error::InvalidControlMessage { size: buf.len() });
        }
        Ok(Self {
            option: buf.get_u32_le(),
            value: buf.get_u32_le(),
        })
    }

    /// Returns the encoded wire record.
    /// 返回编码后的线上记录。
    pub fn to_bytes(&self) -> [u8; CONTROL_MESSAGE_SIZE] {
        let mut out = [0u8; CONTROL_MESSAGE_SIZE];
        let mut cursor = &mut out[..];
        self.encode(&mut cursor);
        out
    }
}

/// The kind of probing round a sender asks for.
/// 发送端请求的探测轮次类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstKind {
    /// Back-to-back pairs sharing one sequence id, for effective capacity.
    /// 共享同一序号的背靠背包对，用于测量有效容量。
    PacketPair,
    /// A numbered train, for achievable bandwidth.
    /// 按序编号的包列，用于测量可达带宽。
    PacketTrain,
}

impl BurstKind {
    /// Returns the option code of this kind.
    /// 返回该类型的选项码。
    pub fn option(&self) -> u32 {
        match self {
            BurstKind::PacketPair => option::PACKET_PAIR,
            BurstKind::PacketTrain => option::PACKET_TRAIN,
        }
    }

    /// The number of datagrams a burst of `requested` units consists of.
    /// 包含 `requested` 个单元的突发所对应的数据报数量。
    pub fn expected_packets(&self, requested: u32) -> usize {
        match self {
            BurstKind::PacketPair => 2 * requested as usize,
            BurstKind::PacketTrain => requested as usize,
        }
    }
}

impl fmt::Display for BurstKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BurstKind::PacketPair => "PP",
            BurstKind::PacketTrain => "PT",
        };
        write!(f, "{}", s)
    }
}

/// A validated request from the sender.
/// 来自发送端的已校验请求。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstRequest {
    pub kind: BurstKind,
    /// Pairs for a packet-pair round, packets for a packet train.
    /// 包对轮次中为包对数，包列轮次中为包数。
    pub requested: u32,
}

impl TryFrom<ControlMessage> for BurstRequest {
    type Error = Error;

    fn try_from(msg: ControlMessage) -> Result<Self> {
        let kind = match msg.option {
            option::PACKET_PAIR => BurstKind::PacketPair,
            option::PACKET_TRAIN => BurstKind::PacketTrain,
            other => return Err(Error::UnexpectedOption(other)),
        };
        Ok(Self {
            kind,
            requested: msg.value,
        })
    }
}

impl From<BurstRequest> for ControlMessage {
    fn from(req: BurstRequest) -> Self {
        Self {
            option: req.kind.option(),
            value: req.requested,
        }
    }
}

/// A message the receiver sends back.
/// 接收端回送的消息。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    /// The receiver is about to capture the burst. Echoes the requested count.
    /// 接收端即将开始捕获突发，回显请求的数量。
    Ready { requested: u32 },
    /// The estimate for a completed round, in Mbps.
    /// 已完成轮次的估计值，单位Mbps。
    Result { kind: BurstKind, mbps: f64 },
    /// The round could not produce an estimate.
    /// 该轮次无法给出估计值。
    Failed,
}

impl Response {
    /// Parses a reply as the sender would see it.
    /// 以发送端视角解析一条回复。
    ///
    /// The fixed-point value of a result cannot be told apart from a count, so
    /// results are returned with their Mbps reconstructed from the value.
    pub fn from_message(msg: ControlMessage) -> Result<Self> {
        match msg.option {
            option::READY => Ok(Response::Ready {
                requested: msg.value,
            }),
            option::FAILED => Ok(Response::Failed),
            option::PACKET_PAIR => Ok(Response::Result {
                kind: BurstKind::PacketPair,
                mbps: msg.value as f64 / 1_000_000.0,
            }),
            option::PACKET_TRAIN => Ok(Response::Result {
                kind: BurstKind::PacketTrain,
                mbps: msg.value as f64 / 1_000_000.0,
            }),
            other => Err(Error::UnexpectedOption(other)),
        }
    }
}

/// Converts an estimate in Mbps to the wire's fixed-point value.
/// 将以Mbps为单位的估计值转换为线上的定点数。
///
/// The value is truncated. Negative and NaN inputs map to `0`, values beyond
/// the range of `u32` saturate.
pub fn encode_mbps(mbps: f64) -> u32 {
    (mbps * 1_000_000.0) as u32
}

impl From<Response> for ControlMessage {
    fn from(resp: Response) -> Self {
        match resp {
            Response::Ready { requested } => Self {
                option: option::READY,
                value: requested,
            },
            Response::Result { kind, mbps } => Self {
                option: kind.option(),
                value: encode_mbps(mbps),
            },
            Response::Failed => Self {
                option: option::FAILED,
                value: 0,
            },
        }
    }
}

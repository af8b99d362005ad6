//! 定义了接收端所有可能的错误类型。
//! Defines all possible error types of the receiver.

use thiserror::Error;

/// The primary error type for the bandwidth estimation receiver.
/// 带宽估计接收端的主要错误类型。
#[derive(Debug, Error)]
pub enum Error {
    /// An underlying I/O error occurred.
    /// 发生了底层的I/O错误。
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A control message did not arrive at the fixed wire size.
    /// 控制消息的长度与固定的线上长度不符。
    #[error("Malformed control message of {size} bytes")]
    InvalidControlMessage { size: usize },

    /// A control message carried an option that is not valid in the current
    /// protocol state.
    /// 控制消息携带了当前协议状态下无效的选项。
    #[error("Unexpected control option {0:#x}")]
    UnexpectedOption(u32),

    /// A burst would not fit into the capture buffer.
    /// 探测突发无法放入捕获缓冲区。
    #[error("Capture buffer capacity of {capacity} records exceeded")]
    CapacityExceeded { capacity: usize },

    /// A packet-train estimate was requested before any packet-pair estimate
    /// produced an effective capacity in this session.
    /// 在本会话中尚未通过包对测得有效容量时就请求了包列估计。
    #[error("Effective capacity is unknown, run a packet-pair round first")]
    CapacityUnknown,

    /// The control connection was closed by the peer.
    /// 控制连接被对端关闭。
    #[error("Control connection closed by peer")]
    ConnectionClosed,
}

/// A specialized `Result` type for this crate.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        use std::io::ErrorKind;
        match err {
            Error::Io(e) => e,
            Error::InvalidControlMessage { .. } => ErrorKind::InvalidData.into(),
            Error::UnexpectedOption(_) => ErrorKind::InvalidData.into(),
            Error::CapacityExceeded { .. } => ErrorKind::OutOfMemory.into(),
            Error::CapacityUnknown => ErrorKind::InvalidInput.into(),
            Error::ConnectionClosed => ErrorKind::ConnectionReset.into(),
        }
    }
}

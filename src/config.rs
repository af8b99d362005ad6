//! 定义了接收端的可配置参数。
//! Defines configurable parameters for the receiver.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// The UDP port probes are received on unless overridden.
/// 默认的探测包UDP端口。
pub const DEFAULT_DATA_PORT: u16 = 1234;

/// The TCP port of the control channel. The sender always connects here.
/// 控制通道的TCP端口，发送端总是连接此端口。
pub const CONTROL_PORT: u16 = 9878;

/// A structure containing all configurable parameters of the receiver.
///
/// 包含接收端所有可配置参数的结构体。
#[derive(Debug, Clone)]
pub struct Config {
    /// The local address both channels are bound to.
    /// 两个通道绑定的本地地址。
    pub bind_address: IpAddr,

    /// The UDP port of the data channel.
    /// 数据通道的UDP端口。
    pub data_port: u16,

    /// The TCP port of the control channel. `0` lets the OS pick one.
    /// 控制通道的TCP端口。`0` 表示由操作系统选择。
    pub control_port: u16,

    /// Burst capture parameters.
    /// 突发捕获参数。
    pub capture: CaptureConfig,
}

/// Parameters of a single burst capture.
///
/// 单次突发捕获的参数。
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// How long to wait for the next probe before the burst is abandoned.
    /// 放弃本次突发前等待下一个探测包的时长。
    pub burst_timeout: Duration,

    /// The number of probe records the capture buffer holds.
    /// 捕获缓冲区可容纳的探测记录数。
    pub buffer_capacity: usize,

    /// The largest probe datagram, header included. Longer datagrams are
    /// truncated and recorded with this size.
    /// 最大探测数据报（含探测头）。更长的数据报会被截断并按此大小记录。
    pub max_packet_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            data_port: DEFAULT_DATA_PORT,
            control_port: CONTROL_PORT,
            capture: CaptureConfig::default(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            burst_timeout: Duration::from_millis(300),
            buffer_capacity: 200,
            max_packet_size: 4096,
        }
    }
}

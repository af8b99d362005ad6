//! The packet module, containing the wire formats of the control channel and
//! of the probe datagrams.
//! packet 模块，包含控制通道消息与探测数据报的线上格式。

pub mod control;
pub mod probe;

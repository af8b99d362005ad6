//! Bandwidth estimators run over a captured burst.
//!
//! The capacity estimator turns a packet-pair burst into the effective
//! capacity of the path. The throughput estimator turns a packet-train burst
//! into the loss-corrected achievable bandwidth, and needs the effective
//! capacity of an earlier packet-pair round to do so.
//!
//! 在捕获的突发上运行的带宽估计器。容量估计器由包对突发得到路径的有效容量；
//! 吞吐量估计器由包列突发得到经丢包修正的可达带宽，且依赖先前包对轮次测得的有效容量。

pub mod capacity;
pub mod throughput;

#[cfg(test)]
pub(crate) mod test_utils;

pub use capacity::{estimate_capacity, CapacityReport};
pub use throughput::{estimate_throughput, ThroughputReport};

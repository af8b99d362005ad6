#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The receiver side of an active-probing bandwidth estimator for last-hop
//! wireless paths.
//! 面向无线末跳路径的主动探测带宽估计器的接收端。

pub mod config;
pub mod error;
pub mod packet;
pub mod stats;

pub mod capture;
pub mod estimator;
pub mod server;
pub mod session;

#[cfg(test)]
mod testing;

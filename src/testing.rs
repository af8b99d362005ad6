//! 测试辅助工具模块
//! Test utilities module

#![cfg(test)]

use crate::capture::ProbeSource;
use crate::error::{Error, Result};
use crate::packet::probe::ProbeHeader;
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time;

pub const TEST_DATA_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 1234);

/// A datagram the scripted source delivers after sleeping for `gap`.
#[derive(Debug, Clone)]
pub struct Scripted {
    pub gap: Duration,
    pub datagram: Vec<u8>,
}

/// A data channel replaying datagrams queued by the test.
///
/// Each datagram is delivered after its gap has elapsed, so with a paused
/// clock the arrival times are exact. An empty queue blocks like an idle
/// socket; a dropped sender makes every further wait fail.
pub struct ScriptedSource {
    rx: Mutex<mpsc::UnboundedReceiver<Scripted>>,
}

impl ScriptedSource {
    pub fn new() -> (ScriptedSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ScriptedSender { tx }, Self { rx: Mutex::new(rx) })
    }
}

#[async_trait]
impl ProbeSource for ScriptedSource {
    async fn recv_probe(&self, buf: &mut [u8]) -> Result<usize> {
        let next = self
            .rx
            .lock()
            .await
            .recv()
            .await
            .ok_or(Error::ConnectionClosed)?;
        if !next.gap.is_zero() {
            time::sleep(next.gap).await;
        }
        let len = next.datagram.len().min(buf.len());
        buf[..len].copy_from_slice(&next.datagram[..len]);
        Ok(len)
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(TEST_DATA_ADDR)
    }
}

/// The test's end of a [`ScriptedSource`].
#[derive(Debug, Clone)]
pub struct ScriptedSender {
    tx: mpsc::UnboundedSender<Scripted>,
}

impl ScriptedSender {
    pub fn send(&self, gap: Duration, datagram: Vec<u8>) {
        let _ = self.tx.send(Scripted { gap, datagram });
    }

    /// Queues one probe without any gap.
    pub fn probe(&self, sequence: i32, size: usize) {
        self.send(Duration::ZERO, probe(sequence, sequence * 100, size));
    }

    /// Queues packet pairs `ids`, each pair's packets `dispersion` apart and
    /// pairs 10 ms apart. Sender timestamps mirror the receiver spacing.
    pub fn pairs(&self, ids: &[i32], size: usize, dispersion: Duration) {
        let gap_us = dispersion.as_micros() as i32;
        for (n, &id) in ids.iter().enumerate() {
            let lead = if n == 0 {
                Duration::ZERO
            } else {
                Duration::from_millis(10)
            };
            let start = id * 10_000;
            self.send(lead, probe(id, start, size));
            self.send(dispersion, probe(id, start + gap_us, size));
        }
    }

    /// Queues a train of `ids`, consecutive packets `dispersion` apart.
    pub fn train(&self, ids: &[i32], size: usize, dispersion: Duration) {
        let gap_us = dispersion.as_micros() as i32;
        for (n, &seq) in ids.iter().enumerate() {
            let gap = if n == 0 { Duration::ZERO } else { dispersion };
            self.send(gap, probe(seq, seq * gap_us, size));
        }
    }
}

pub fn probe(sequence: i32, timestamp: i32, size: usize) -> Vec<u8> {
    ProbeHeader {
        sequence,
        timestamp,
    }
    .to_datagram(size)
}

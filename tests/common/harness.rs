//! tests/common/harness.rs
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Once;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wbest_receiver::{
    config::Config,
    error::Result,
    packet::{
        control::{ControlMessage, CONTROL_MESSAGE_SIZE},
        probe::ProbeHeader,
    },
    server::{Server, Shutdown},
};

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "wbest_receiver=debug".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// A receiver running on loopback with OS-assigned ports.
pub struct TestHarness {
    pub data_addr: SocketAddr,
    pub control_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server: JoinHandle<Result<Shutdown>>,
}

impl TestHarness {
    pub async fn new() -> Self {
        init_tracing();
        let config = Config {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            data_port: 0,
            control_port: 0,
            ..Default::default()
        };
        let server = Server::bind(config).await.unwrap();
        let data_addr = server.data_addr().unwrap();
        let control_addr = server.control_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(server.serve(async {
            let _ = shutdown_rx.await;
        }));

        Self {
            data_addr,
            control_addr,
            shutdown_tx: Some(shutdown_tx),
            server,
        }
    }

    /// Requests shutdown and waits for the receiver to stop.
    pub async fn interrupt(mut self) -> Result<Shutdown> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.finish().await
    }

    /// Waits for the receiver to stop on its own.
    pub async fn finish(self) -> Result<Shutdown> {
        tokio::time::timeout(Duration::from_secs(5), self.server)
            .await
            .expect("receiver did not stop")
            .expect("receiver task panicked")
    }
}

/// The sender side: a control connection plus a UDP socket for probes.
pub struct TestSender {
    pub control: TcpStream,
    probes: UdpSocket,
    target: SocketAddr,
}

impl TestSender {
    pub async fn connect(harness: &TestHarness) -> Self {
        let control = TcpStream::connect(harness.control_addr).await.unwrap();
        let probes = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        Self {
            control,
            probes,
            target: harness.data_addr,
        }
    }

    pub async fn request(&mut self, option: u32, value: u32) {
        let msg = ControlMessage { option, value };
        self.control.write_all(&msg.to_bytes()).await.unwrap();
    }

    pub async fn reply(&mut self) -> ControlMessage {
        let mut record = [0u8; CONTROL_MESSAGE_SIZE];
        tokio::time::timeout(Duration::from_secs(5), self.control.read_exact(&mut record))
            .await
            .expect("no reply from receiver")
            .unwrap();
        ControlMessage::decode(&record).unwrap()
    }

    pub async fn probe(&self, sequence: i32, timestamp: i32, size: usize) {
        let datagram = ProbeHeader {
            sequence,
            timestamp,
        }
        .to_datagram(size);
        self.probes.send_to(&datagram, self.target).await.unwrap();
    }

    /// Sends `count` back-to-back pairs.
    pub async fn pairs(&self, count: i32, size: usize) {
        for id in 0..count {
            self.probe(id, id * 1000, size).await;
            self.probe(id, id * 1000 + 100, size).await;
        }
    }

    /// Sends the train packets in `ids`, one millisecond apart.
    pub async fn train(&self, ids: &[i32], size: usize) {
        for &seq in ids {
            self.probe(seq, seq * 1000, size).await;
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

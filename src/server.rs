//! Endpoint setup: binds the data channel, accepts the single control
//! connection and drives its session until the peer leaves or shutdown is
//! requested.
//!
//! 端点建立：绑定数据通道，接受唯一的控制连接，并驱动其会话直到对端离开或收到关闭请求。

use crate::{
    capture::ProbeSource,
    config::Config,
    error::Result,
    session::Session,
};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tracing::{info, warn};

/// How a served session came to an end.
///
/// 会话结束的方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// The peer closed the control connection.
    /// 对端关闭了控制连接。
    PeerClosed,
    /// The shutdown signal fired first.
    /// 关闭信号先到达。
    Interrupted,
}

/// Both endpoints of the receiver, bound but not yet serving.
///
/// 接收端的两个端点，已绑定但尚未开始服务。
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    data: UdpSocket,
    config: Config,
}

impl Server {
    /// Binds the data channel, then starts listening on the control port.
    ///
    /// 先绑定数据通道，再在控制端口上监听。
    pub async fn bind(config: Config) -> Result<Self> {
        let data = UdpSocket::bind((config.bind_address, config.data_port)).await?;
        info!(addr = %data.local_addr()?, "Data channel waiting for probes");

        let listener = TcpListener::bind((config.bind_address, config.control_port)).await?;
        info!(addr = %listener.local_addr()?, "Control channel listening");

        Ok(Self {
            listener,
            data,
            config,
        })
    }

    pub fn data_addr(&self) -> Result<SocketAddr> {
        ProbeSource::local_addr(&self.data)
    }

    pub fn control_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(Into::into)
    }

    /// Waits for the sender to connect. The listener is closed afterwards, so
    /// no second session can be started.
    ///
    /// 等待发送端连接。之后监听器被关闭，不会再开始第二个会话。
    pub async fn accept(self) -> Result<Session<TcpStream, UdpSocket>> {
        let (stream, peer) = self.listener.accept().await?;
        info!(%peer, "Sender connected");
        if let Err(e) = stream.set_nodelay(true) {
            warn!(error = %e, "Failed to disable Nagle on the control connection");
        }
        Ok(Session::new(stream, self.data, self.config.capture))
    }

    /// Accepts one sender and serves it, racing against `shutdown`.
    ///
    /// Both endpoints are released before this returns, whichever way it ends.
    ///
    /// 接受一个发送端并为其服务，同时与 `shutdown` 竞争。无论以何种方式结束，
    /// 返回前都会释放两个端点。
    pub async fn serve<F>(self, shutdown: F) -> Result<Shutdown>
    where
        F: Future<Output = ()>,
    {
        let session = async move {
            let mut session = self.accept().await?;
            session.run().await
        };

        tokio::select! {
            result = session => {
                result?;
                Ok(Shutdown::PeerClosed)
            }
            _ = shutdown => {
                info!("Shutdown requested, releasing endpoints");
                Ok(Shutdown::Interrupted)
            }
        }
    }
}

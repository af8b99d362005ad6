//! Traits for abstracting over the data channel.
use crate::error::Result;
use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// An asynchronous source of probe datagrams.
///
/// This trait allows for abstracting over the underlying data channel,
/// enabling in-memory sources for testing.
///
/// 探测数据报的异步来源。
///
/// 此trait对底层数据通道进行抽象，从而可以在测试中使用内存中的数据源。
#[async_trait]
pub trait ProbeSource: Send + Sync + 'static {
    /// Waits for the next datagram and copies it into `buf`, returning its
    /// length.
    async fn recv_probe(&self, buf: &mut [u8]) -> Result<usize>;

    /// Returns the local address that this source is bound to.
    fn local_addr(&self) -> Result<SocketAddr>;
}

#[async_trait]
impl ProbeSource for UdpSocket {
    async fn recv_probe(&self, buf: &mut [u8]) -> Result<usize> {
        let (len, _peer) = UdpSocket::recv_from(self, buf).await?;
        Ok(len)
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        UdpSocket::local_addr(self).map_err(Into::into)
    }
}

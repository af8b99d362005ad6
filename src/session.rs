//! The control-channel state machine of one measurement session.
//!
//! A session serves exactly one control connection. It reads a request, acks
//! it with `Ready`, captures the burst, runs the matching estimator and replies
//! with the result, one request at a time, until the peer hangs up.
//!
//! 单个测量会话的控制通道状态机。会话只服务一条控制连接：读取请求、回复
//! `Ready`、捕获突发、运行相应的估计器并回复结果，逐个处理请求，直到对端断开。

use crate::{
    capture::{capture_burst, CaptureBuffer, ProbeSource},
    config::CaptureConfig,
    error::{Error, Result},
    estimator::{estimate_capacity, estimate_throughput},
    packet::control::{BurstKind, BurstRequest, ControlMessage, Response, CONTROL_MESSAGE_SIZE},
};
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// One measurement session over a control stream `C` and a data channel `S`.
///
/// 基于控制流 `C` 与数据通道 `S` 的一个测量会话。
#[derive(Debug)]
pub struct Session<C, S> {
    control: C,
    source: S,
    buffer: CaptureBuffer,
    /// The effective capacity measured by the last packet-pair round.
    /// 上一次包对轮次测得的有效容量。
    effective_capacity: Option<f64>,
    config: CaptureConfig,
}

impl<C, S> Session<C, S>
where
    C: AsyncRead + AsyncWrite + Unpin + Send,
    S: ProbeSource,
{
    pub fn new(control: C, source: S, config: CaptureConfig) -> Self {
        Self {
            control,
            source,
            buffer: CaptureBuffer::new(config.buffer_capacity),
            effective_capacity: None,
            config,
        }
    }

    /// The effective capacity of the last packet-pair round, if any.
    pub fn effective_capacity(&self) -> Option<f64> {
        self.effective_capacity
    }

    /// Serves requests until the peer closes the control connection.
    ///
    /// Returns `Ok(())` when the peer hangs up between requests. A malformed
    /// request or a failed send ends the session with an error and no further
    /// reply.
    ///
    /// 处理请求直到对端关闭控制连接。格式错误的请求或发送失败会以错误结束会话，
    /// 且不再回复。
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let request = match self.read_request().await {
                Ok(Some(request)) => request,
                Ok(None) | Err(Error::ConnectionClosed) => {
                    info!("Control connection closed by peer");
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "Protocol violation, terminating session");
                    return Err(e);
                }
            };
            self.handle_request(request).await?;
        }
    }

    /// Runs one probing round for `request` and sends the final reply.
    ///
    /// 为 `request` 执行一轮探测并发送最终回复。
    pub async fn handle_request(&mut self, request: BurstRequest) -> Result<Response> {
        info!(kind = %request.kind, count = request.requested, "Probing round requested");

        let expected = request.kind.expected_packets(request.requested);
        if !self.buffer.fits(expected) {
            warn!(
                expected,
                capacity = self.buffer.capacity(),
                "Burst does not fit the capture buffer, rejecting"
            );
            self.send(Response::Failed).await?;
            return Ok(Response::Failed);
        }

        self.send(Response::Ready {
            requested: request.requested,
        })
        .await?;

        let outcome = capture_burst(&self.source, &mut self.buffer, request, &self.config).await?;
        debug!(?outcome, "Burst captured");

        let response = match request.kind {
            BurstKind::PacketPair => {
                let report = estimate_capacity(&self.buffer, request.requested);
                self.effective_capacity = Some(report.effective_capacity);
                Response::Result {
                    kind: BurstKind::PacketPair,
                    mbps: report.effective_capacity,
                }
            }
            BurstKind::PacketTrain => {
                match estimate_throughput(&self.buffer, request.requested, self.effective_capacity)
                {
                    Ok(report) => Response::Result {
                        kind: BurstKind::PacketTrain,
                        mbps: report.achievable_bandwidth,
                    },
                    Err(Error::CapacityUnknown) => {
                        warn!("Packet train requested before any packet pair round");
                        Response::Failed
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        self.send(response).await?;
        Ok(response)
    }

    /// Reads the next request with a single read of one control record.
    /// `None` means the peer closed the connection cleanly before sending
    /// anything; a shorter record is a protocol violation.
    async fn read_request(&mut self) -> Result<Option<BurstRequest>> {
        let mut record = [0u8; CONTROL_MESSAGE_SIZE];
        let n = match self.control.read(&mut record).await {
            Ok(n) => n,
            Err(e) if is_peer_reset(&e) => return Err(Error::ConnectionClosed),
            Err(e) => return Err(e.into()),
        };
        if n == 0 {
            return Ok(None);
        }

        let message = ControlMessage::decode(&record[..n])?;
        BurstRequest::try_from(message).map(Some)
    }

    async fn send(&mut self, response: Response) -> Result<()> {
        let message = ControlMessage::from(response);
        self.control.write_all(&message.to_bytes()).await?;
        self.control.flush().await?;
        debug!(option = message.option, value = message.value, "Control reply sent");
        Ok(())
    }

    /// Releases both endpoints.
    pub fn into_parts(self) -> (C, S) {
        (self.control, self.source)
    }
}

fn is_peer_reset(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    )
}

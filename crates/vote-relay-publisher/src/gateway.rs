//! WebSocket gateway publisher.
//!
//! Opens one socket per publish, writes the frame as a single text message,
//! closes with status 1000, and tears the socket down before returning.

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Sink, SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use vote_relay_core::PublishFrame;

use crate::endpoint::GatewayEndpoint;
use crate::error::{PublishError, Result};
use crate::lifecycle::{CloseOutcome, ConnectionLifecycle, ConnectionState};
use crate::resolve::{self, Resolver};
use crate::Publisher;

type GatewaySocket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Bound on the best-effort close after a failure.
const ABORT_CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Publishes frames to the gateway over a fresh WebSocket per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsGatewayPublisher;

impl WsGatewayPublisher {
    /// Create a new gateway publisher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Run one connection to completion, reporting its outcome through
    /// `resolver`. Returns only once the socket is gone.
    async fn drive(
        endpoint: &GatewayEndpoint,
        frame: &PublishFrame,
        resolver: &Resolver<Result<()>>,
    ) {
        let mut lifecycle = ConnectionLifecycle::new();

        match Self::open(&mut lifecycle, endpoint).await {
            Ok(mut socket) => {
                if Self::deliver(&mut lifecycle, &mut socket, frame, resolver).await {
                    tracing::debug!(
                        endpoint = %endpoint.redacted(),
                        bytes = frame.len(),
                        "Frame written to gateway"
                    );
                    Self::finish(socket, endpoint.timeout(), resolver).await;
                }
            }
            Err(err) => {
                lifecycle.fail();
                resolver.resolve(Err(err));
            }
        }

        tracing::debug!(state = ?lifecycle.state(), "Gateway connection finished");
    }

    /// `Idle -> Connecting -> Open`, bounded by the endpoint timeout.
    async fn open(
        lifecycle: &mut ConnectionLifecycle,
        endpoint: &GatewayEndpoint,
    ) -> Result<GatewaySocket> {
        lifecycle.advance(ConnectionState::Connecting)?;

        // Dropping the handshake future on timeout aborts the connection.
        let connect = connect_async(endpoint.url().as_str());
        let socket = match tokio::time::timeout(endpoint.timeout(), connect).await {
            Ok(Ok((socket, _response))) => socket,
            Ok(Err(err)) => {
                tracing::warn!(
                    endpoint = %endpoint.redacted(),
                    error = %err,
                    "Failed to connect to gateway"
                );
                return Err(err.into());
            }
            Err(_) => {
                tracing::warn!(
                    endpoint = %endpoint.redacted(),
                    timeout_ms = endpoint.timeout().as_millis(),
                    "Timeout connecting to gateway"
                );
                return Err(PublishError::Timeout(endpoint.timeout()));
            }
        };

        lifecycle.advance(ConnectionState::Open)?;
        Ok(socket)
    }

    /// Write the frame and decide the outcome of the write.
    ///
    /// On a write error the lifecycle fails, the error is resolved and the
    /// socket gets a best-effort close. Returns `true` if the frame was
    /// written.
    async fn deliver<S>(
        lifecycle: &mut ConnectionLifecycle,
        socket: &mut S,
        frame: &PublishFrame,
        resolver: &Resolver<Result<()>>,
    ) -> bool
    where
        S: Sink<Message, Error = WsError> + Unpin,
    {
        match Self::send(lifecycle, socket, frame).await {
            Ok(()) => {
                resolver.resolve(Ok(()));
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to write frame to gateway");
                lifecycle.fail();
                resolver.resolve(Err(err));
                Self::abort(socket).await;
                false
            }
        }
    }

    /// `Open -> Sending -> Closed(Success)`: one write.
    async fn send<S>(
        lifecycle: &mut ConnectionLifecycle,
        socket: &mut S,
        frame: &PublishFrame,
    ) -> Result<()>
    where
        S: Sink<Message, Error = WsError> + Unpin,
    {
        lifecycle.advance(ConnectionState::Sending)?;

        socket
            .send(Message::Text(frame.as_str().to_owned()))
            .await
            .map_err(|e| PublishError::Transport(format!("write failed: {e}")))?;

        lifecycle.advance(ConnectionState::Closed(CloseOutcome::Success))?;
        Ok(())
    }

    /// Complete the close handshake after a successful write.
    ///
    /// Anything observed here arrives after the outcome was decided, so it
    /// is only logged.
    async fn finish(
        mut socket: GatewaySocket,
        timeout: Duration,
        resolver: &Resolver<Result<()>>,
    ) {
        let handshake = async {
            let normal = CloseFrame {
                code: CloseCode::Normal,
                reason: Cow::Borrowed(""),
            };
            if let Err(err) = socket.close(Some(normal)).await {
                if !is_closed_error(&err) {
                    return Err(PublishError::from(err));
                }
            }

            while let Some(message) = socket.next().await {
                match message {
                    Ok(Message::Close(frame)) => return check_close(frame.as_ref()),
                    Ok(_) => {}
                    Err(err) if is_closed_error(&err) => return Ok(()),
                    Err(err) => return Err(err.into()),
                }
            }
            Ok(())
        };

        match tokio::time::timeout(timeout, handshake).await {
            Ok(Ok(())) => tracing::debug!("Gateway connection closed normally"),
            Ok(Err(err)) => {
                if resolver.is_resolved() {
                    tracing::debug!(error = %err, "Ignoring close event after publish resolved");
                } else {
                    resolver.resolve(Err(err));
                }
            }
            Err(_) => {
                tracing::debug!("Gateway close handshake timed out, dropping socket");
            }
        }
    }

    /// Best-effort close after a failure; the socket is dropped either way.
    async fn abort<S>(socket: &mut S)
    where
        S: Sink<Message, Error = WsError> + Unpin,
    {
        match tokio::time::timeout(ABORT_CLOSE_TIMEOUT, SinkExt::close(socket)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::debug!(error = %err, "Gateway abort close failed"),
            Err(_) => tracing::debug!("Gateway abort close timed out"),
        }
    }
}

#[async_trait]
impl Publisher for WsGatewayPublisher {
    async fn publish(&self, endpoint: &GatewayEndpoint, frame: &PublishFrame) -> Result<()> {
        let (resolver, outcome) = resolve::channel();

        Self::drive(endpoint, frame, &resolver).await;

        outcome.await.unwrap_or_else(|| {
            Err(PublishError::Transport(
                "connection ended without an outcome".to_string(),
            ))
        })
    }
}

/// Classify a close frame received from the gateway.
///
/// Normal closure (1000), no status (1005) and a close without a frame are
/// expected; any other code is an error.
///
/// # Errors
///
/// Returns `PublishError::UnexpectedClose` for any other code.
pub fn check_close(frame: Option<&CloseFrame<'_>>) -> Result<()> {
    match frame {
        None => Ok(()),
        Some(frame) if matches!(frame.code, CloseCode::Normal | CloseCode::Status) => Ok(()),
        Some(frame) => Err(PublishError::UnexpectedClose {
            code: frame.code.into(),
            reason: frame.reason.to_string(),
        }),
    }
}

fn is_closed_error(err: &WsError) -> bool {
    matches!(err, WsError::ConnectionClosed | WsError::AlreadyClosed)
}

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};

    const FRAME_JSON: &str = r#"{"type":"vote_update","targetId":"post42","targetType":"post","voteCounts":{"upvotes":3,"downvotes":1,"score":2}}"#;

    fn frame() -> PublishFrame {
        PublishFrame::new("forum-votes", FRAME_JSON).unwrap()
    }

    fn endpoint(addr: std::net::SocketAddr, timeout: Duration) -> GatewayEndpoint {
        GatewayEndpoint::new(&format!("ws://{addr}/v0/events"), "k3y", timeout).unwrap()
    }

    /// Accept one socket, report the request URI and the first text message,
    /// then close with `close_code` (or answer the client's close if `None`).
    async fn spawn_gateway(
        close_code: Option<CloseCode>,
    ) -> (
        std::net::SocketAddr,
        oneshot::Receiver<(String, String)>,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let uri = Arc::new(Mutex::new(String::new()));
            let seen = Arc::clone(&uri);
            let mut ws = tokio_tungstenite::accept_hdr_async(
                stream,
                move |req: &Request, resp: Response| {
                    *seen.lock() = req.uri().to_string();
                    Ok(resp)
                },
            )
            .await
            .unwrap();

            let text = match ws.next().await {
                Some(Ok(Message::Text(text))) => text,
                other => panic!("expected text frame, got {other:?}"),
            };
            let uri = uri.lock().clone();
            let _ = tx.send((uri, text));

            if let Some(code) = close_code {
                let _ = ws
                    .close(Some(CloseFrame {
                        code,
                        reason: Cow::Borrowed("gateway failure"),
                    }))
                    .await;
            }
            while let Some(Ok(_)) = ws.next().await {}
        });

        (addr, rx)
    }

    #[tokio::test]
    async fn publishes_frame_with_access_key() {
        let (addr, received) = spawn_gateway(None).await;

        WsGatewayPublisher::new()
            .publish(&endpoint(addr, Duration::from_secs(5)), &frame())
            .await
            .unwrap();

        let (uri, text) = received.await.unwrap();
        assert_eq!(uri, "/v0/events?access_key=k3y");
        assert_eq!(text, format!("forum-votes\n{FRAME_JSON}"));
    }

    #[tokio::test]
    async fn abnormal_close_after_write_keeps_success() {
        let (addr, received) = spawn_gateway(Some(CloseCode::Error)).await;

        let result = WsGatewayPublisher::new()
            .publish(&endpoint(addr, Duration::from_secs(5)), &frame())
            .await;

        assert!(result.is_ok(), "expected success, got {result:?}");
        assert!(received.await.is_ok());
    }

    #[tokio::test]
    async fn times_out_when_handshake_never_completes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Accept TCP but never answer the upgrade request.
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(stream);
        });

        let err = WsGatewayPublisher::new()
            .publish(&endpoint(addr, Duration::from_millis(200)), &frame())
            .await
            .unwrap_err();

        assert!(err.is_timeout(), "expected timeout, got {err:?}");
        assert!(matches!(err, PublishError::Timeout(d) if d == Duration::from_millis(200)));
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = WsGatewayPublisher::new()
            .publish(&endpoint(addr, Duration::from_secs(5)), &frame())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn rejected_upgrade_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let _ = stream
                .write_all(b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\n\r\n")
                .await;
        });

        let err = WsGatewayPublisher::new()
            .publish(&endpoint(addr, Duration::from_secs(5)), &frame())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Transport(_)), "got {err:?}");
    }

    /// A socket whose writes always fail with a broken pipe.
    #[derive(Default)]
    struct BrokenSocket {
        closed: bool,
    }

    impl Sink<Message> for BrokenSocket {
        type Error = WsError;

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), WsError>> {
            Poll::Ready(Ok(()))
        }

        fn start_send(self: Pin<&mut Self>, _item: Message) -> std::result::Result<(), WsError> {
            Err(WsError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "broken pipe",
            )))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), WsError>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), WsError>> {
            self.closed = true;
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn write_error_after_open_fails_and_closes() {
        let mut lifecycle = ConnectionLifecycle::new();
        lifecycle.advance(ConnectionState::Connecting).unwrap();
        lifecycle.advance(ConnectionState::Open).unwrap();
        let mut socket = BrokenSocket::default();
        let (resolver, outcome) = resolve::channel();

        let written =
            WsGatewayPublisher::deliver(&mut lifecycle, &mut socket, &frame(), &resolver).await;

        assert!(!written);
        assert!(socket.closed, "expected a best-effort close");
        assert_eq!(
            lifecycle.state(),
            ConnectionState::Closed(CloseOutcome::Failure)
        );

        let err = outcome.await.unwrap().unwrap_err();
        match err {
            PublishError::Transport(message) => assert!(message.contains("broken pipe"), "{message}"),
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn write_error_does_not_override_earlier_outcome() {
        let mut lifecycle = ConnectionLifecycle::new();
        lifecycle.advance(ConnectionState::Connecting).unwrap();
        lifecycle.advance(ConnectionState::Open).unwrap();
        let (resolver, outcome) = resolve::channel();
        resolver.resolve(Err(PublishError::Timeout(Duration::from_secs(1))));

        WsGatewayPublisher::deliver(&mut lifecycle, &mut BrokenSocket::default(), &frame(), &resolver)
            .await;

        assert!(outcome.await.unwrap().unwrap_err().is_timeout());
    }

    #[test]
    fn close_classification() {
        assert!(check_close(None).is_ok());
        assert!(check_close(Some(&CloseFrame {
            code: CloseCode::Normal,
            reason: Cow::Borrowed(""),
        }))
        .is_ok());
        assert!(check_close(Some(&CloseFrame {
            code: CloseCode::Status,
            reason: Cow::Borrowed(""),
        }))
        .is_ok());

        let err = check_close(Some(&CloseFrame {
            code: CloseCode::Away,
            reason: Cow::Borrowed("restarting"),
        }))
        .unwrap_err();
        match err {
            PublishError::UnexpectedClose { code, reason } => {
                assert_eq!(code, 1001);
                assert_eq!(reason, "restarting");
            }
            other => panic!("expected UnexpectedClose, got {other:?}"),
        }
    }
}

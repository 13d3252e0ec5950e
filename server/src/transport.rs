//! TCP transport: newline-delimited JSON, or length-prefixed postcard frames
//! when the server runs the binary codec.

use crate::error::SessionError;
use crate::registry::{SessionHandle, SessionRegistry};
use crate::session::{ConnId, GameClient, Inbound};
use proto::{Codec, Command, ErrorCode, C2S, S2C};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const MAX_FRAME: usize = 64 * 1024;

static NEXT_CONN: AtomicU64 = AtomicU64::new(1);

enum Outbound {
    Frame(Vec<u8>),
    Close,
}

/// Sink feeding a connection's writer task
#[derive(Clone)]
pub struct ChannelClient {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ChannelClient {
    fn send_msg(&self, codec: Codec, msg: &S2C) {
        match codec.encode(msg) {
            Ok(bytes) => {
                let _ = self.send_bytes(&bytes);
            }
            Err(e) => warn!(error = %e, "Failed to encode message"),
        }
    }
}

impl GameClient for ChannelClient {
    fn send_bytes(&self, bytes: &[u8]) -> Result<(), SessionError> {
        self.tx
            .send(Outbound::Frame(bytes.to_vec()))
            .map_err(|_| SessionError::ClientGone)
    }

    fn close(&self) {
        let _ = self.tx.send(Outbound::Close);
    }
}

/// Accept connections until the listener fails
pub async fn serve(
    listener: TcpListener,
    registry: Arc<SessionRegistry>,
    codec: Codec,
) -> Result<(), SessionError> {
    info!(addr = %listener.local_addr()?, ?codec, "Listening");
    loop {
        let (stream, peer) = listener.accept().await?;
        let conn = ConnId(NEXT_CONN.fetch_add(1, Ordering::Relaxed));
        debug!(%conn, %peer, "Connection accepted");
        let registry = registry.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, conn, registry, codec).await {
                debug!(%conn, error = %e, "Connection ended with error");
            }
        });
    }
}

/// Read client frames, validate them and forward them to the session the
/// connection registered with
pub async fn handle_connection(
    stream: TcpStream,
    conn: ConnId,
    registry: Arc<SessionRegistry>,
    codec: Codec,
) -> Result<(), SessionError> {
    let (read_half, write_half) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut writer = tokio::spawn(write_frames(write_half, rx, codec));
    let client = ChannelClient { tx };
    let mut reader = BufReader::new(read_half);
    let mut session: Option<SessionHandle> = None;

    let result = loop {
        // The writer stops once the session hangs up on us
        let read = tokio::select! {
            read = read_frame(&mut reader, codec) => read,
            _ = &mut writer => {
                debug!(%conn, "Writer finished, dropping connection");
                break Ok(());
            }
        };
        let frame = match read {
            Ok(Some(frame)) => frame,
            Ok(None) => break Ok(()),
            Err(e) => break Err(SessionError::Io(e)),
        };

        let msg: C2S = match codec.decode(&frame) {
            Ok(msg) => msg,
            Err(e) => {
                debug!(%conn, error = %e, "Undecodable message");
                client.send_msg(codec, &S2C::error(ErrorCode::InvalidMessage, e.to_string()));
                continue;
            }
        };
        let command = match msg.validate() {
            Ok(command) => command,
            Err(e) => {
                // Invalid moves are dropped without a reply
                debug!(%conn, error = %e, "Message rejected");
                continue;
            }
        };

        match (&session, command) {
            (
                None,
                Command::Register {
                    role,
                    user,
                    match_id,
                },
            ) => match registry.resolve(&match_id) {
                Ok(handle) => {
                    let inbound = Inbound::Register {
                        conn,
                        role,
                        user,
                        client: Box::new(client.clone()),
                    };
                    if let Err(e) = handle.send(inbound).await {
                        client.send_msg(codec, &S2C::error(e.code(), e.to_string()));
                        break Err(e);
                    }
                    session = Some(handle);
                }
                Err(e) => {
                    warn!(%conn, match_id = %match_id, "Register for unknown match");
                    client.send_msg(codec, &S2C::error(e.code(), e.to_string()));
                    break Err(e);
                }
            },
            (None, Command::Ping { t_ms }) => client.send_msg(codec, &S2C::Pong { t_ms }),
            (None, Command::Close) => break Ok(()),
            (None, _) => client.send_msg(
                codec,
                &S2C::error(ErrorCode::NotRegistered, "register first"),
            ),
            (Some(handle), command) => {
                let closing = command == Command::Close;
                if handle.send(Inbound::Command { conn, command }).await.is_err() || closing {
                    break Ok(());
                }
            }
        }
    };

    if let Some(handle) = session {
        let _ = handle.send(Inbound::Disconnect { conn }).await;
    }
    client.close();
    debug!(%conn, "Connection closed");
    result
}

async fn write_frames<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    codec: Codec,
) {
    while let Some(outbound) = rx.recv().await {
        match outbound {
            Outbound::Frame(bytes) => {
                if write_frame(&mut writer, codec, &bytes).await.is_err() {
                    break;
                }
            }
            Outbound::Close => break,
        }
    }
    let _ = writer.shutdown().await;
}

pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    codec: Codec,
    bytes: &[u8],
) -> io::Result<()> {
    match codec {
        Codec::Json => {
            writer.write_all(bytes).await?;
            writer.write_all(b"\n").await?;
        }
        Codec::Postcard => {
            let len = u32::try_from(bytes.len())
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))?;
            writer.write_all(&len.to_be_bytes()).await?;
            writer.write_all(bytes).await?;
        }
    }
    writer.flush().await
}

/// Next frame, or `None` on a clean end of stream
pub async fn read_frame<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    codec: Codec,
) -> io::Result<Option<Vec<u8>>> {
    match codec {
        Codec::Json => {
            let mut line = String::new();
            loop {
                line.clear();
                let n = (&mut *reader).take(MAX_FRAME as u64).read_line(&mut line).await?;
                if n == 0 {
                    return Ok(None);
                }
                if !line.ends_with('\n') && n as u64 == MAX_FRAME as u64 {
                    return Err(io::Error::new(io::ErrorKind::InvalidData, "line too long"));
                }
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    return Ok(Some(trimmed.as_bytes().to_vec()));
                }
            }
        }
        Codec::Postcard => {
            let mut len = [0u8; 4];
            match reader.read_exact(&mut len).await {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(e),
            }
            let len = u32::from_be_bytes(len) as usize;
            if len > MAX_FRAME {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "frame too large"));
            }
            let mut payload = vec![0; len];
            reader.read_exact(&mut payload).await?;
            Ok(Some(payload))
        }
    }
}

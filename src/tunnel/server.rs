use core::time::Duration;
use std::net::SocketAddr;
use std::sync::mpsc::{self as std_mpsc, Receiver, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::time::Instant;
use std::vec::Vec;

use portable_atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{read_frame, write_frame, TunnelConfig};
use crate::tunnel_frame::{FrameLink, FrameType, TunnelError};

#[derive(Debug, Default)]
struct Shared {
    connected: AtomicBool,
    /// Bumped on every accepted client; frames read from an older client are stale.
    generation: AtomicU32,
}

impl Shared {
    fn current(&self) -> u32 {
        self.generation.load(Ordering::Acquire)
    }
}

struct Outbound {
    frame_type: FrameType,
    payload: Vec<u8>,
}

struct Inbound {
    generation: u32,
    frame_type: FrameType,
    payload: Vec<u8>,
}

/// The listening side of the frame tunnel.
///
/// Dropping the server stops accepting and disconnects the current client.
pub struct TunnelServer {
    local_addr: SocketAddr,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl TunnelServer {
    /// Binds the listener and spawns the accept loop on the current tokio runtime.
    pub async fn bind(config: TunnelConfig) -> Result<(TunnelServer, TunnelHandle), TunnelError> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        let local_addr = listener.local_addr()?;

        let shared = Arc::new(Shared::default());
        let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_depth.max(1));
        let (inbound_tx, inbound_rx) = std_mpsc::sync_channel(config.inbound_depth.max(1));

        ptp_info!("tunnel: listening on {}", local_addr);

        let task = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&shared),
            outbound_rx,
            inbound_tx,
        ));

        let handle = TunnelHandle {
            shared: Arc::clone(&shared),
            outbound: outbound_tx,
            inbound: inbound_rx,
        };

        Ok((
            TunnelServer {
                local_addr,
                shared,
                task,
            },
            handle,
        ))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }
}

impl Drop for TunnelServer {
    fn drop(&mut self) {
        self.task.abort();
        self.shared.connected.store(false, Ordering::Release);
    }
}

struct Client {
    writer: OwnedWriteHalf,
    reader: JoinHandle<()>,
}

impl Client {
    fn close(self) {
        self.reader.abort();
    }
}

async fn accept_loop(
    listener: TcpListener,
    shared: Arc<Shared>,
    mut outbound: mpsc::Receiver<Outbound>,
    inbound: SyncSender<Inbound>,
) {
    let (closed_tx, mut closed_rx) = mpsc::unbounded_channel::<u32>();
    let mut client: Option<Client> = None;

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(_e) => {
                        ptp_warn!("tunnel: accept failed: {}", _e);
                        continue;
                    }
                };

                if let Err(_e) = stream.set_nodelay(true) {
                    ptp_debug!("tunnel: set_nodelay failed: {}", _e);
                }

                let generation = shared.generation.fetch_add(1, Ordering::AcqRel).wrapping_add(1);

                if let Some(old) = client.take() {
                    ptp_info!("tunnel: client {} replaces the previous one", peer);
                    old.close();
                } else {
                    ptp_info!("tunnel: client {} connected", peer);
                }

                let (reader, writer) = stream.into_split();
                let reader = tokio::spawn(read_loop(
                    reader,
                    generation,
                    inbound.clone(),
                    closed_tx.clone(),
                ));

                client = Some(Client { writer, reader });
                shared.connected.store(true, Ordering::Release);
            }

            Some(generation) = closed_rx.recv() => {
                if generation == shared.current() {
                    if let Some(old) = client.take() {
                        old.close();
                    }
                    shared.connected.store(false, Ordering::Release);
                    ptp_info!("tunnel: client disconnected");
                }
            }

            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    ptp_debug!("tunnel: handle dropped, stopping");
                    break;
                };

                let Some(current) = client.as_mut() else {
                    ptp_debug!("tunnel: no client, dropping {:?} frame", frame.frame_type);
                    continue;
                };

                if let Err(_e) = write_frame(&mut current.writer, frame.frame_type, &frame.payload).await {
                    ptp_warn!("tunnel: write failed: {}", _e);
                    if let Some(old) = client.take() {
                        old.close();
                    }
                    shared.connected.store(false, Ordering::Release);
                }
            }
        }
    }

    if let Some(old) = client.take() {
        old.close();
    }
    shared.connected.store(false, Ordering::Release);
}

async fn read_loop(
    mut reader: OwnedReadHalf,
    generation: u32,
    inbound: SyncSender<Inbound>,
    closed: mpsc::UnboundedSender<u32>,
) {
    loop {
        let (raw_type, payload) = match read_frame(&mut reader).await {
            Ok(frame) => frame,
            Err(TunnelError::Closed) => break,
            Err(_e) => {
                ptp_warn!("tunnel: read failed: {}", _e);
                break;
            }
        };

        let Ok(frame_type) = FrameType::try_from(raw_type) else {
            ptp_warn!("tunnel: skipping frame of unknown type {:#04x}", raw_type);
            continue;
        };

        if frame_type == FrameType::EndOfReply && !payload.is_empty() {
            ptp_warn!("tunnel: skipping end of reply carrying {} bytes", payload.len());
            continue;
        }

        let frame = Inbound {
            generation,
            frame_type,
            payload,
        };

        match inbound.try_send(frame) {
            Ok(()) => {}
            Err(std_mpsc::TrySendError::Full(_)) => {
                ptp_warn!("tunnel: inbound queue full, dropping {:?} frame", frame_type);
            }
            Err(std_mpsc::TrySendError::Disconnected(_)) => break,
        }
    }

    let _ = closed.send(generation);
}

/// The device's end of a [`TunnelServer`].
///
/// `send` never blocks; when the outbound queue is full the frame is dropped with
/// [`TunnelError::Overflow`]. `recv` blocks the calling thread, so call it from the USB
/// completion context, never from inside an async task.
pub struct TunnelHandle {
    shared: Arc<Shared>,
    outbound: mpsc::Sender<Outbound>,
    inbound: Receiver<Inbound>,
}

impl FrameLink for TunnelHandle {
    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    fn send(&mut self, frame_type: FrameType, payload: &[u8]) -> Result<(), TunnelError> {
        if !self.is_connected() {
            return Err(TunnelError::NotConnected);
        }

        let frame = Outbound {
            frame_type,
            payload: payload.to_vec(),
        };

        self.outbound.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TunnelError::Overflow,
            mpsc::error::TrySendError::Closed(_) => TunnelError::Closed,
        })
    }

    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<(FrameType, usize), TunnelError> {
        if !self.is_connected() {
            return Err(TunnelError::NotConnected);
        }

        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());

            let frame = match self.inbound.recv_timeout(remaining) {
                Ok(frame) => frame,
                Err(RecvTimeoutError::Timeout) => return Err(TunnelError::Timeout),
                Err(RecvTimeoutError::Disconnected) => return Err(TunnelError::Closed),
            };

            if frame.generation != self.shared.current() {
                ptp_debug!("tunnel: dropping frame from a replaced client");
                continue;
            }

            let len = frame.payload.len();
            if len > buf.len() {
                return Err(TunnelError::FrameTooLarge {
                    len,
                    capacity: buf.len(),
                });
            }

            buf[..len].copy_from_slice(&frame.payload);
            return Ok((frame.frame_type, len));
        }
    }
}

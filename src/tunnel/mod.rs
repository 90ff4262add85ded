//! Frame tunnel over TCP.
//!
//! [`TunnelServer`] accepts one remote controller at a time; a new connection replaces the
//! previous one. The device side talks to it through [`TunnelHandle`], which implements
//! [`FrameLink`](crate::tunnel_frame::FrameLink) and is handed to the
//! [`PtpClass`](crate::class::PtpClass). Remote controllers use [`TunnelClient`].

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::vec::Vec;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::tunnel_frame::{decode_header, encode_header, FrameType, TunnelError, FRAME_HEADER_LEN};

mod client;
mod server;

pub use client::TunnelClient;
pub use server::{TunnelHandle, TunnelServer};

/// TCP port the tunnel listens on by default.
pub const DEFAULT_PORT: u16 = 15740;

/// Largest payload accepted off the wire. Frames above
/// [`MAX_FRAME_PAYLOAD`](crate::tunnel_frame::MAX_FRAME_PAYLOAD) are still read so the stream
/// stays in sync, and are rejected when handed to the device.
pub const MAX_WIRE_PAYLOAD: usize = 64 * 1024;

/// Settings of a [`TunnelServer`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TunnelConfig {
    pub bind_addr: SocketAddr,
    /// Frames from the remote controller buffered for the device.
    pub inbound_depth: usize,
    /// Frames from the device buffered for the remote controller.
    pub outbound_depth: usize,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        TunnelConfig {
            bind_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            inbound_depth: 16,
            outbound_depth: 16,
        }
    }
}

impl TunnelConfig {
    /// Listens on `bind_addr` with the default channel depths.
    pub fn with_addr(bind_addr: SocketAddr) -> Self {
        TunnelConfig {
            bind_addr,
            ..Self::default()
        }
    }
}

/// Writes one frame.
pub(crate) async fn write_frame<W>(
    writer: &mut W,
    frame_type: FrameType,
    payload: &[u8],
) -> Result<(), TunnelError>
where
    W: AsyncWrite + Unpin,
{
    let header = encode_header(frame_type, payload.len())?;

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    frame.extend_from_slice(&header);
    frame.extend_from_slice(payload);

    writer.write_all(&frame).await?;
    writer.flush().await?;

    Ok(())
}

/// Reads one frame and returns its raw type byte and payload.
///
/// A clean end of stream before or inside a frame is reported as [`TunnelError::Closed`].
pub(crate) async fn read_frame<R>(reader: &mut R) -> Result<(u8, Vec<u8>), TunnelError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; FRAME_HEADER_LEN];
    reader.read_exact(&mut header).await.map_err(closed_on_eof)?;

    let (raw_type, len) = decode_header(&header)?;
    if len > MAX_WIRE_PAYLOAD {
        return Err(TunnelError::FrameTooLarge {
            len,
            capacity: MAX_WIRE_PAYLOAD,
        });
    }

    let mut payload = std::vec![0u8; len];
    reader.read_exact(&mut payload).await.map_err(closed_on_eof)?;

    Ok((raw_type, payload))
}

fn closed_on_eof(e: std::io::Error) -> TunnelError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        TunnelError::Closed
    } else {
        TunnelError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::future::Future;

    fn block_on<F: Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn frame_over_duplex() {
        block_on(async {
            let (mut a, mut b) = tokio::io::duplex(64);

            write_frame(&mut a, FrameType::RawHostToDevice, &[0x11, 0x22])
                .await
                .unwrap();
            write_frame(&mut a, FrameType::EndOfReply, &[]).await.unwrap();

            let (t, payload) = read_frame(&mut b).await.unwrap();
            assert_eq!(t, 0x11);
            assert_eq!(payload, [0x11, 0x22]);

            let (t, payload) = read_frame(&mut b).await.unwrap();
            assert_eq!(t, 0x12);
            assert!(payload.is_empty());
        });
    }

    #[test]
    fn truncated_frame_is_closed() {
        block_on(async {
            let (mut a, mut b) = tokio::io::duplex(64);

            a.write_all(&[0, 0, 0, 4, 0x10, 0xaa]).await.unwrap();
            drop(a);

            assert!(matches!(read_frame(&mut b).await, Err(TunnelError::Closed)));
        });
    }

    #[test]
    fn zero_length_is_invalid() {
        block_on(async {
            let (mut a, mut b) = tokio::io::duplex(64);

            a.write_all(&[0, 0, 0, 0, 0x12]).await.unwrap();

            assert!(matches!(
                read_frame(&mut b).await,
                Err(TunnelError::InvalidLength)
            ));
        });
    }

    #[test]
    fn oversized_length_is_rejected_before_reading() {
        block_on(async {
            let (mut a, mut b) = tokio::io::duplex(64);

            a.write_all(&[0x01, 0, 0, 0, 0x11]).await.unwrap();

            assert!(matches!(
                read_frame(&mut b).await,
                Err(TunnelError::FrameTooLarge { .. })
            ));
        });
    }

    #[test]
    fn default_config() {
        let config = TunnelConfig::default();

        assert_eq!(config.bind_addr.port(), 15740);
        assert_eq!(config.inbound_depth, 16);
        assert_eq!(config.outbound_depth, 16);
    }
}

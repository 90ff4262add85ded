use std::vec::Vec;

use tokio::net::{TcpStream, ToSocketAddrs};

use super::{read_frame, write_frame};
use crate::tunnel_frame::{FrameType, TunnelError};

/// The remote controller's end of the frame tunnel.
pub struct TunnelClient {
    stream: TcpStream,
}

impl TunnelClient {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, TunnelError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;

        Ok(TunnelClient { stream })
    }

    pub async fn send(&mut self, frame_type: FrameType, payload: &[u8]) -> Result<(), TunnelError> {
        write_frame(&mut self.stream, frame_type, payload).await
    }

    /// Receives the next frame.
    ///
    /// # Errors
    ///
    /// * [`TunnelError::UnknownType`] - The frame's type byte is not a [`FrameType`]. The frame
    ///   is consumed and the next call reads the one after it.
    /// * [`TunnelError::Closed`] - The device closed the connection.
    pub async fn recv(&mut self) -> Result<(FrameType, Vec<u8>), TunnelError> {
        let (raw_type, payload) = read_frame(&mut self.stream).await?;
        let frame_type =
            FrameType::try_from(raw_type).map_err(|_| TunnelError::UnknownType(raw_type))?;

        Ok((frame_type, payload))
    }

    /// Answers one forwarded transfer: each of `transfers` becomes one bulk IN transfer on the
    /// device, followed by the end-of-reply marker.
    pub async fn reply(&mut self, transfers: &[&[u8]]) -> Result<(), TunnelError> {
        for transfer in transfers {
            self.send(FrameType::RawHostToDevice, transfer).await?;
        }

        self.send(FrameType::EndOfReply, &[]).await
    }
}

//! Frame tunnel wire format.
//!
//! ```text
//! frame := length:u32be type:u8 payload:[u8; length - 1]
//! ```
//!
//! The length counts the type byte, so it is never zero.

use core::time::Duration;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Bytes before the payload: the length and the type.
pub const FRAME_HEADER_LEN: usize = 5;

/// Largest payload the device side accepts in one frame.
pub const MAX_FRAME_PAYLOAD: usize = 512;

#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameType {
    /// Bytes the device received on its bulk OUT endpoint.
    RawDeviceToHost = 0x10,
    /// Bytes the device must send on its bulk IN endpoint.
    RawHostToDevice = 0x11,
    /// The remote controller has nothing more to send for the current transfer.
    EndOfReply = 0x12,
}

/// Frame tunnel errors.
#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    #[error("no tunnel client connected")]
    NotConnected,
    #[error("timed out waiting for a frame")]
    Timeout,
    #[error("frame payload of {len} bytes exceeds capacity {capacity}")]
    FrameTooLarge { len: usize, capacity: usize },
    #[error("frame length field is zero")]
    InvalidLength,
    #[error("unknown frame type {0:#04x}")]
    UnknownType(u8),
    #[error("tunnel queue is full")]
    Overflow,
    #[error("tunnel closed")]
    Closed,
    #[cfg(feature = "std")]
    #[error("tunnel i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Encodes the header of a frame carrying `payload_len` bytes.
pub fn encode_header(frame_type: FrameType, payload_len: usize) -> Result<[u8; FRAME_HEADER_LEN], TunnelError> {
    let length = u32::try_from(payload_len + 1).map_err(|_| TunnelError::FrameTooLarge {
        len: payload_len,
        capacity: u32::MAX as usize - 1,
    })?;

    let mut header = [0u8; FRAME_HEADER_LEN];
    header[..4].copy_from_slice(&length.to_be_bytes());
    header[4] = frame_type.into();

    Ok(header)
}

/// Decodes a frame header into the type byte and the payload length that follows.
///
/// The type is returned raw; an unknown type still has a well-defined length, so the reader can
/// skip its payload.
pub fn decode_header(header: &[u8; FRAME_HEADER_LEN]) -> Result<(u8, usize), TunnelError> {
    let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);

    if length == 0 {
        return Err(TunnelError::InvalidLength);
    }

    Ok((header[4], (length - 1) as usize))
}

/// The device's end of the frame tunnel.
///
/// Raw proxy mode calls this from bulk OUT completion context. `send` must not block; `recv`
/// blocks for at most `timeout`.
pub trait FrameLink {
    /// Whether a remote controller is attached.
    fn is_connected(&self) -> bool;

    /// Queues one frame for the remote controller.
    fn send(&mut self, frame_type: FrameType, payload: &[u8]) -> Result<(), TunnelError>;

    /// Receives one frame into `buf` and returns its type and payload length.
    ///
    /// # Errors
    ///
    /// * [`TunnelError::Timeout`] - No frame arrived within `timeout`.
    /// * [`TunnelError::NotConnected`] - No remote controller is attached.
    /// * [`TunnelError::FrameTooLarge`] - The frame's payload does not fit `buf`; the frame is
    ///   consumed.
    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<(FrameType, usize), TunnelError>;
}

impl<T: FrameLink + ?Sized> FrameLink for &mut T {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn send(&mut self, frame_type: FrameType, payload: &[u8]) -> Result<(), TunnelError> {
        (**self).send(frame_type, payload)
    }

    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<(FrameType, usize), TunnelError> {
        (**self).recv(buf, timeout)
    }
}

/// A link that is never connected, for camera emulation mode.
#[derive(Default, Debug, Clone, Copy)]
pub struct Disconnected;

impl FrameLink for Disconnected {
    fn is_connected(&self) -> bool {
        false
    }

    fn send(&mut self, _frame_type: FrameType, _payload: &[u8]) -> Result<(), TunnelError> {
        Err(TunnelError::NotConnected)
    }

    fn recv(&mut self, _buf: &mut [u8], _timeout: Duration) -> Result<(FrameType, usize), TunnelError> {
        Err(TunnelError::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        assert_eq!(
            encode_header(FrameType::RawDeviceToHost, 3).unwrap(),
            [0, 0, 0, 4, 0x10]
        );
        assert_eq!(
            encode_header(FrameType::EndOfReply, 0).unwrap(),
            [0, 0, 0, 1, 0x12]
        );
        assert_eq!(
            encode_header(FrameType::RawHostToDevice, 0x1234).unwrap(),
            [0, 0, 0x12, 0x35, 0x11]
        );
    }

    #[test]
    fn decode() {
        assert_eq!(decode_header(&[0, 0, 0, 3, 0x11]).unwrap(), (0x11, 2));
        assert_eq!(decode_header(&[0, 0, 0, 1, 0x12]).unwrap(), (0x12, 0));
        assert!(matches!(
            decode_header(&[0, 0, 0, 0, 0x12]),
            Err(TunnelError::InvalidLength)
        ));
    }

    #[test]
    fn frame_types() {
        assert_eq!(FrameType::try_from(0x11u8).ok(), Some(FrameType::RawHostToDevice));
        assert!(FrameType::try_from(0x13u8).is_err());
        assert_eq!(u8::from(FrameType::EndOfReply), 0x12);
    }

    #[test]
    fn disconnected_link() {
        let mut link = Disconnected;
        let mut buf = [0u8; 4];

        assert!(!link.is_connected());
        assert!(matches!(
            link.send(FrameType::RawDeviceToHost, &[1]),
            Err(TunnelError::NotConnected)
        ));
        assert!(matches!(
            link.recv(&mut buf, Duration::from_millis(1)),
            Err(TunnelError::NotConnected)
        ));
    }
}

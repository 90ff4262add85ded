//! Container codec.
//!
//! Hosts disagree on how a container header is laid out, so received containers are sniffed
//! against five layouts. Three of them have no length field and start with zero padding; two
//! carry a little-endian 32-bit length. Transmitted containers always use
//! [`Layout::Standard`].

use crate::ptp::ContainerKind;
use crate::CapacityError;
use heapless::Vec;

/// Length of a [`Layout::Standard`] header, which is the only layout used on transmit.
pub const HEADER_LEN: usize = 12;

/// Maximum number of 32-bit parameters a container carries.
pub const MAX_PARAMS: usize = 5;

/// Header layout of a received container.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layout {
    /// `len32 kind16 code16 tid32`
    Standard,
    /// `len32 code16 tid32 kind16`
    Alternate,
    /// `00 kind16 code16 tid32`
    Pad8,
    /// `00 00 kind16 code16 tid32`
    Pad16,
    /// `00 00 00 kind16 code16 tid32`
    Pad24,
}

impl Layout {
    /// Bytes consumed by the header before the parameters or payload.
    pub const fn header_len(self) -> usize {
        match self {
            Layout::Standard | Layout::Alternate => 12,
            Layout::Pad8 => 9,
            Layout::Pad16 => 10,
            Layout::Pad24 => 11,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Layout::Standard => "std_len",
            Layout::Alternate => "alt_len",
            Layout::Pad8 => "pad8",
            Layout::Pad16 => "pad16",
            Layout::Pad24 => "pad24",
        }
    }
}

/// A decoded container. The payload is not copied; use [`Container::payload`] on the buffer the
/// container was decoded from.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Container {
    pub layout: Layout,
    pub kind: ContainerKind,
    pub code: u16,
    pub transaction_id: u32,
    pub params: Vec<u32, MAX_PARAMS>,
}

impl Container {
    pub fn header_len(&self) -> usize {
        self.layout.header_len()
    }

    /// First parameter, or 0 when the container carries none.
    pub fn param0(&self) -> u32 {
        self.params.first().copied().unwrap_or(0)
    }

    /// Bytes following the header in `buf`.
    pub fn payload<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        buf.get(self.header_len()..).unwrap_or(&[])
    }
}

/// Errors returned by [`decode`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// None of the known layouts matches the received bytes.
    #[error("no container layout matches {len} received bytes")]
    Malformed { len: usize },
}

#[derive(Copy, Clone)]
struct Header {
    kind: ContainerKind,
    code: u16,
    transaction_id: u32,
}

type TryDecode = fn(&[u8]) -> Option<Header>;

/// Candidate layouts in decode priority order. The shorter no-length forms are tried first; a
/// buffer that starts with zero padding could otherwise be mistaken for a length-prefixed one.
const DECODERS: [(Layout, TryDecode); 5] = [
    (Layout::Pad24, try_pad24),
    (Layout::Pad16, try_pad16),
    (Layout::Pad8, try_pad8),
    (Layout::Standard, try_standard),
    (Layout::Alternate, try_alternate),
];

fn rd_le16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn rd_le32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn kind_at(buf: &[u8], at: usize) -> Option<ContainerKind> {
    ContainerKind::try_from(rd_le16(buf, at)).ok()
}

fn padded(buf: &[u8], pad: usize) -> Option<Header> {
    if buf.len() < pad + 8 || buf[..pad].iter().any(|&b| b != 0) {
        return None;
    }

    Some(Header {
        kind: kind_at(buf, pad)?,
        code: rd_le16(buf, pad + 2),
        transaction_id: rd_le32(buf, pad + 4),
    })
}

fn try_pad24(buf: &[u8]) -> Option<Header> {
    padded(buf, 3)
}

fn try_pad16(buf: &[u8]) -> Option<Header> {
    padded(buf, 2)
}

fn try_pad8(buf: &[u8]) -> Option<Header> {
    padded(buf, 1)
}

fn try_standard(buf: &[u8]) -> Option<Header> {
    if buf.len() < HEADER_LEN {
        return None;
    }

    Some(Header {
        kind: kind_at(buf, 4)?,
        code: rd_le16(buf, 6),
        transaction_id: rd_le32(buf, 8),
    })
}

fn try_alternate(buf: &[u8]) -> Option<Header> {
    if buf.len() < HEADER_LEN {
        return None;
    }

    Some(Header {
        kind: kind_at(buf, 10)?,
        code: rd_le16(buf, 4),
        transaction_id: rd_le32(buf, 6),
    })
}

/// Decodes a received container, trying each layout in priority order.
///
/// Parameters are read from whole 32-bit words following the header, at most
/// [`MAX_PARAMS`]; a trailing partial word is ignored.
pub fn decode(buf: &[u8]) -> Result<Container, DecodeError> {
    let (layout, header) = DECODERS
        .iter()
        .find_map(|(layout, try_decode)| try_decode(buf).map(|h| (*layout, h)))
        .ok_or(DecodeError::Malformed { len: buf.len() })?;

    let start = layout.header_len();
    let mut params = Vec::new();
    for word in buf[start..].chunks_exact(4).take(MAX_PARAMS) {
        // cannot fail, take() bounds the count
        let _ = params.push(rd_le32(word, 0));
    }

    Ok(Container {
        layout,
        kind: header.kind,
        code: header.code,
        transaction_id: header.transaction_id,
        params,
    })
}

/// Builds a [`Layout::Standard`] header announcing `payload_len` bytes of payload.
pub fn encode(kind: ContainerKind, code: u16, transaction_id: u32, payload_len: usize) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    let length = (HEADER_LEN + payload_len) as u32;

    header[0..4].copy_from_slice(&length.to_le_bytes());
    header[4..6].copy_from_slice(&u16::from(kind).to_le_bytes());
    header[6..8].copy_from_slice(&code.to_le_bytes());
    header[8..12].copy_from_slice(&transaction_id.to_le_bytes());

    header
}

/// Serializes a parameter-only container in any layout. Returns the number of bytes written.
///
/// The device never transmits anything but [`Layout::Standard`]; the other layouts exist so
/// host-side tools and tests can produce what the various hosts send.
pub fn encode_in_layout(
    layout: Layout,
    kind: ContainerKind,
    code: u16,
    transaction_id: u32,
    params: &[u32],
    out: &mut [u8],
) -> Result<usize, CapacityError> {
    let params = &params[..params.len().min(MAX_PARAMS)];
    let header_len = layout.header_len();
    let total = header_len + params.len() * 4;

    if out.len() < total {
        return Err(CapacityError {
            needed: total,
            capacity: out.len(),
        });
    }

    let kind = u16::from(kind).to_le_bytes();
    let code = code.to_le_bytes();
    let tid = transaction_id.to_le_bytes();

    match layout {
        Layout::Standard => {
            out[0..4].copy_from_slice(&(total as u32).to_le_bytes());
            out[4..6].copy_from_slice(&kind);
            out[6..8].copy_from_slice(&code);
            out[8..12].copy_from_slice(&tid);
        }
        Layout::Alternate => {
            out[0..4].copy_from_slice(&(total as u32).to_le_bytes());
            out[4..6].copy_from_slice(&code);
            out[6..10].copy_from_slice(&tid);
            out[10..12].copy_from_slice(&kind);
        }
        Layout::Pad8 | Layout::Pad16 | Layout::Pad24 => {
            let pad = header_len - 8;
            out[..pad].fill(0);
            out[pad..pad + 2].copy_from_slice(&kind);
            out[pad + 2..pad + 4].copy_from_slice(&code);
            out[pad + 4..pad + 8].copy_from_slice(&tid);
        }
    }

    for (i, param) in params.iter().enumerate() {
        let at = header_len + i * 4;
        out[at..at + 4].copy_from_slice(&param.to_le_bytes());
    }

    Ok(total)
}

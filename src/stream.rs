//! Bulk IN stream transmitter.
//!
//! A data phase is sent as one Standard container: the first transfer carries the header and
//! as much payload as fits, later transfers carry raw payload. A zero-length packet terminates
//! the transfer when the container length is an exact multiple of the endpoint's maximum packet
//! size, and an OK response may follow.

use crate::container::{self, HEADER_LEN};
use crate::payloads::GeneratedPayload;
use crate::ptp::{ContainerKind, ResponseCode};

/// Largest bulk IN transfer the transmitter will build.
pub const MAX_CHUNK: usize = 512;

/// Payload of a data phase.
#[derive(Clone, Debug)]
pub enum Payload {
    /// A fixed reply table.
    Static(&'static [u8]),
    /// A payload generated for this transaction.
    Generated(GeneratedPayload),
}

impl Payload {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Payload::Static(bytes) => bytes,
            Payload::Generated(bytes) => bytes.as_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What the transport has to do next on the bulk IN endpoint.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Action<'a> {
    /// Start a bulk IN transfer of these bytes.
    SendChunk(&'a [u8]),
    /// Send a zero-length packet.
    SendZeroLengthPacket,
    /// Send a header-only Response container.
    SendResponse {
        code: ResponseCode,
        transaction_id: u32,
    },
    /// Nothing to send.
    Idle,
}

#[derive(Debug)]
struct StreamContext {
    code: u16,
    transaction_id: u32,
    payload: Payload,
    offset: usize,
    needs_zlp: bool,
    zlp_sent: bool,
    emit_ok_after: bool,
}

enum Step {
    Chunk(usize, usize),
    ZeroLengthPacket,
    Finish,
}

/// Streams at most one data phase at a time.
pub struct StreamTransmitter {
    chunk_capacity: usize,
    max_packet_size: usize,
    ctx: Option<StreamContext>,
    buf: [u8; MAX_CHUNK],
}

impl StreamTransmitter {
    /// Creates a transmitter building transfers of at most `chunk_capacity` bytes for an endpoint
    /// with the given maximum packet size.
    ///
    /// The capacity is rounded down to a multiple of the packet size, so only the last transfer
    /// of a data phase can end in a short packet, and kept within `HEADER_LEN + 1..=MAX_CHUNK`.
    pub fn new(chunk_capacity: usize, max_packet_size: u16) -> Self {
        let mps = usize::from(max_packet_size.max(1));

        let mut capacity = chunk_capacity.min(MAX_CHUNK);
        capacity -= capacity % mps;
        if capacity <= HEADER_LEN {
            capacity = (HEADER_LEN / mps + 1) * mps;
        }

        StreamTransmitter {
            chunk_capacity: capacity.min(MAX_CHUNK),
            max_packet_size: mps,
            ctx: None,
            buf: [0; MAX_CHUNK],
        }
    }

    pub fn chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }

    /// Whether a data phase is in progress.
    pub fn is_active(&self) -> bool {
        self.ctx.is_some()
    }

    /// Drops any data phase in progress. Completions that arrive afterwards resume to
    /// [`Action::Idle`].
    pub fn reset(&mut self) {
        self.ctx = None;
    }

    /// Starts a data phase and returns the first transfer: the header followed by the first
    /// part of the payload.
    pub fn start(
        &mut self,
        code: u16,
        transaction_id: u32,
        payload: Payload,
        emit_ok_after: bool,
    ) -> Action<'_> {
        if let Some(old) = &self.ctx {
            ptp_warn!(
                "stream: abandoning op={:#x} tid={} at {}/{}",
                old.code,
                old.transaction_id,
                old.offset,
                old.payload.len()
            );
        }

        let len = payload.len();
        let first = len.min(self.chunk_capacity - HEADER_LEN);
        let header = container::encode(ContainerKind::Data, code, transaction_id, len);

        self.buf[..HEADER_LEN].copy_from_slice(&header);
        self.buf[HEADER_LEN..HEADER_LEN + first].copy_from_slice(&payload.as_slice()[..first]);

        let needs_zlp = (HEADER_LEN + len) % self.max_packet_size == 0;

        ptp_debug!(
            "stream: start op={:#x} tid={} len={} zlp={}",
            code,
            transaction_id,
            len,
            needs_zlp
        );

        self.ctx = Some(StreamContext {
            code,
            transaction_id,
            payload,
            offset: first,
            needs_zlp,
            zlp_sent: false,
            emit_ok_after,
        });

        Action::SendChunk(&self.buf[..HEADER_LEN + first])
    }

    /// Header-only Response, sent without a data phase.
    pub fn respond(&self, code: ResponseCode, transaction_id: u32) -> Action<'static> {
        Action::SendResponse {
            code,
            transaction_id,
        }
    }

    /// Advances the data phase after a bulk IN completion.
    pub fn resume(&mut self) -> Action<'_> {
        let chunk_capacity = self.chunk_capacity;

        let step = match &mut self.ctx {
            None => return Action::Idle,
            Some(ctx) => {
                let len = ctx.payload.len();
                if ctx.offset < len {
                    let start = ctx.offset;
                    ctx.offset = (start + chunk_capacity).min(len);
                    Step::Chunk(start, ctx.offset)
                } else if ctx.needs_zlp && !ctx.zlp_sent {
                    ctx.zlp_sent = true;
                    Step::ZeroLengthPacket
                } else {
                    Step::Finish
                }
            }
        };

        match step {
            Step::Chunk(start, end) => match &self.ctx {
                Some(ctx) => Action::SendChunk(&ctx.payload.as_slice()[start..end]),
                None => Action::Idle,
            },
            Step::ZeroLengthPacket => Action::SendZeroLengthPacket,
            Step::Finish => match self.ctx.take() {
                Some(ctx) if ctx.emit_ok_after => Action::SendResponse {
                    code: ResponseCode::Ok,
                    transaction_id: ctx.transaction_id,
                },
                _ => Action::Idle,
            },
        }
    }
}

//! Raw proxy mode: bulk traffic is relayed verbatim through a [`FrameLink`].

use core::time::Duration;
use heapless::{Deque, Vec};

use crate::stream::Action;
use crate::tunnel_frame::{FrameLink, FrameType, TunnelError, MAX_FRAME_PAYLOAD};

/// Frames the bridge reads back for one received transfer.
pub const QUEUE_DEPTH: usize = 8;

/// One bulk IN transfer requested by the remote controller.
pub type Frame = Vec<u8, MAX_FRAME_PAYLOAD>;

pub struct TunnelBridge {
    queue: Deque<Frame, QUEUE_DEPTH>,
    in_busy: bool,
    timeout: Duration,
}

impl TunnelBridge {
    /// Creates a bridge that waits at most `timeout` for each frame.
    pub fn new(timeout: Duration) -> Self {
        TunnelBridge {
            queue: Deque::new(),
            in_busy: false,
            timeout,
        }
    }

    /// Number of frames not yet completed on the bulk IN endpoint, including the one in flight.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Drops all queued frames. A completion for a transfer started before the reset is ignored.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.in_busy = false;
    }

    /// Relays a received bulk OUT transfer and collects the remote controller's reply.
    ///
    /// Blocks for up to `timeout` per frame, at most [`QUEUE_DEPTH`] frames. Returns the first
    /// transfer to start on the bulk IN endpoint, if any.
    pub fn on_bulk_out<L: FrameLink>(&mut self, data: &[u8], link: &mut L) -> Action<'_> {
        if !link.is_connected() {
            ptp_debug!("proxy: no client, dropping {} bytes", data.len());
            self.reset();
            return Action::Idle;
        }

        if let Err(_e) = link.send(FrameType::RawDeviceToHost, data) {
            ptp_warn!("proxy: forwarding {} bytes failed", data.len());
        }

        self.queue.clear();
        self.in_busy = false;

        self.collect(link);

        if self.queue.is_empty() {
            ptp_debug!("proxy: no IN frames queued");
        }

        self.start_next()
    }

    fn collect<L: FrameLink>(&mut self, link: &mut L) {
        let mut buf = [0u8; MAX_FRAME_PAYLOAD];

        while !self.queue.is_full() {
            match link.recv(&mut buf, self.timeout) {
                Ok((FrameType::RawHostToDevice, n)) => {
                    // n <= MAX_FRAME_PAYLOAD and the queue has room
                    let frame = Frame::from_slice(&buf[..n]).unwrap_or_default();
                    let _ = self.queue.push_back(frame);
                }
                Ok((FrameType::EndOfReply, 0)) => {
                    ptp_trace!("proxy: end of reply after {} frames", self.queue.len());
                    break;
                }
                Ok((FrameType::EndOfReply, _n)) => {
                    ptp_warn!("proxy: skipping end of reply carrying {} bytes", _n);
                }
                Ok((_other, _)) => {
                    ptp_warn!("proxy: unexpected frame {:?}", _other);
                    break;
                }
                Err(TunnelError::Timeout) => {
                    ptp_debug!("proxy: timed out after {} frames", self.queue.len());
                    break;
                }
                Err(_e) => {
                    ptp_warn!("proxy: receive failed after {} frames", self.queue.len());
                    break;
                }
            }
        }
    }

    fn start_next(&mut self) -> Action<'_> {
        match self.queue.front() {
            Some(frame) => {
                self.in_busy = true;
                ptp_trace!("proxy: IN {} bytes", frame.len());
                Action::SendChunk(frame)
            }
            None => Action::Idle,
        }
    }

    /// Advances the queue after a bulk IN completion.
    ///
    /// Frames queued by a controller that has since disconnected are discarded.
    pub fn on_bulk_in_complete<L: FrameLink>(&mut self, link: &L) -> Action<'_> {
        if !self.in_busy {
            return Action::Idle;
        }

        if !link.is_connected() {
            ptp_debug!("proxy: client gone, discarding {} frames", self.queue.len());
            self.reset();
            return Action::Idle;
        }

        let _ = self.queue.pop_front();
        self.in_busy = false;

        self.start_next()
    }
}

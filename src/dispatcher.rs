//! Operation dispatcher for camera emulation mode.

use crate::container::Container;
use crate::events::{status, RecordingEvent, RecordingKind, RecordingSink, StatusSink};
use crate::payloads;
use crate::ptp::{self, ContainerKind, OperationCode, ResponseCode};
use crate::stream::Payload;

/// A vendor command waiting for its data phase.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TwoStageWait {
    pub code: u16,
    pub transaction_id: u32,
    pub param0: u32,
}

impl TwoStageWait {
    fn matches(&self, container: &Container) -> bool {
        container.code == self.code && container.transaction_id == self.transaction_id
    }
}

/// What to transmit in reply to a container.
#[derive(Clone, Debug)]
pub enum Reply {
    /// A data phase followed by an OK response.
    Data {
        code: u16,
        transaction_id: u32,
        payload: Payload,
    },
    /// A header-only response.
    Response {
        code: ResponseCode,
        transaction_id: u32,
    },
    /// Nothing is sent.
    None,
}

/// Per-session protocol state in camera emulation mode.
#[derive(Debug, Default)]
pub struct Dispatcher {
    session_id: u32,
    wait: Option<TwoStageWait>,
    recording: bool,
    last_code: u16,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session id latched by OpenSession, 0 when no session is open.
    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    pub fn pending_wait(&self) -> Option<TwoStageWait> {
        self.wait
    }

    /// Whether the last honored record trigger started recording.
    pub fn recording(&self) -> bool {
        self.recording
    }

    /// Operation code of the last decoded container.
    pub fn last_code(&self) -> u16 {
        self.last_code
    }

    /// Clears the two-stage wait and the session. The recording state survives; only the host's
    /// next stop trigger clears it.
    pub fn reset(&mut self) {
        self.wait = None;
        self.session_id = 0;
    }

    /// Handles one decoded container. `payload` is the bytes following the header.
    pub fn handle<R, S>(
        &mut self,
        container: &Container,
        payload: &[u8],
        recorder: &mut R,
        status: &mut S,
    ) -> Reply
    where
        R: RecordingSink,
        S: StatusSink,
    {
        self.last_code = container.code;
        status.status(status::received(container.code));

        match container.kind {
            ContainerKind::Command => self.command(container),
            ContainerKind::Data => self.data(container, payload, recorder, status),
            kind => {
                ptp_debug!(
                    "dispatch: dropping {:?} container op={:#x} tid={}",
                    kind,
                    container.code,
                    container.transaction_id
                );
                Reply::None
            }
        }
    }

    fn command(&mut self, container: &Container) -> Reply {
        let tid = container.transaction_id;
        let data = |payload| Reply::Data {
            code: container.code,
            transaction_id: tid,
            payload,
        };
        let respond = |code| Reply::Response {
            code,
            transaction_id: tid,
        };

        let op = match OperationCode::try_from(container.code) {
            Ok(op) => op,
            Err(_) => {
                ptp_debug!("dispatch: unsupported op={:#x} tid={}", container.code, tid);
                return respond(ResponseCode::OperationNotSupported);
            }
        };

        if op != OperationCode::Vendor9209 {
            ptp_info!("cmd {} op={:#x} tid={}", op.name(), container.code, tid);
        }

        if let Some(table) = payloads::fixed_payload(op) {
            return data(Payload::Static(table));
        }

        match op {
            OperationCode::GetStorageInfo => match payloads::storage_info() {
                Ok(info) => data(Payload::Generated(info)),
                Err(_e) => {
                    ptp_warn!("dispatch: storage info does not fit");
                    respond(ResponseCode::OperationNotSupported)
                }
            },
            OperationCode::GetNumObjects | OperationCode::GetObjectHandles => {
                data(Payload::Generated(payloads::zero_count()))
            }
            OperationCode::OpenSession => {
                self.session_id = container.param0();
                respond(ResponseCode::Ok)
            }
            OperationCode::CloseSession => {
                ptp_info!("dispatch: close session {}", self.session_id);
                self.session_id = 0;
                respond(ResponseCode::Ok)
            }
            OperationCode::VendorControl => {
                let wait = TwoStageWait {
                    code: container.code,
                    transaction_id: tid,
                    param0: container.param0(),
                };
                ptp_debug!("dispatch: waiting for data tid={} p0={:#x}", tid, wait.param0);
                self.wait = Some(wait);
                Reply::None
            }
            _ => respond(ResponseCode::OperationNotSupported),
        }
    }

    fn data<R, S>(
        &mut self,
        container: &Container,
        payload: &[u8],
        recorder: &mut R,
        status: &mut S,
    ) -> Reply
    where
        R: RecordingSink,
        S: StatusSink,
    {
        let wait = match self.wait {
            Some(wait) if wait.matches(container) => wait,
            _ => {
                ptp_debug!(
                    "dispatch: unmatched data op={:#x} tid={}",
                    container.code,
                    container.transaction_id
                );
                return Reply::None;
            }
        };

        let tid = container.transaction_id;

        if wait.param0 != ptp::FULL_PRESS {
            ptp_debug!("dispatch: ignoring data for p0={:#x}", wait.param0);
        } else {
            match payload.first().copied() {
                Some(ptp::RECORD_START) => {
                    self.recording = true;
                    recorder.publish(RecordingEvent::new(RecordingKind::Start, tid, payload));
                    status.status(status::RECORD_START);
                }
                Some(ptp::RECORD_STOP) => {
                    self.recording = false;
                    recorder.publish(RecordingEvent::new(RecordingKind::Stop, tid, payload));
                    status.status(status::RECORD_STOP);
                }
                Some(_other) => {
                    ptp_debug!("dispatch: unknown record byte {:#x}", _other);
                }
                None => {
                    ptp_debug!("dispatch: empty record payload");
                }
            }
        }

        self.wait = None;

        Reply::Response {
            code: ResponseCode::Ok,
            transaction_id: tid,
        }
    }
}

//! Collaborator interfaces: recording events and progress status lines.

use crate::ptp::{OperationCode, ResponseCode};
use heapless::Vec;

/// Payload bytes kept in a [`RecordingEvent`].
pub const EVENT_PAYLOAD_LEN: usize = 5;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordingKind {
    Start,
    Stop,
}

/// A record start/stop decoded from the vendor two-stage operation.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RecordingEvent {
    pub kind: RecordingKind,
    /// Recording state after applying the event.
    pub recording: bool,
    pub transaction_id: u32,
    /// Leading bytes of the data phase.
    pub payload: Vec<u8, EVENT_PAYLOAD_LEN>,
}

impl RecordingEvent {
    pub fn new(kind: RecordingKind, transaction_id: u32, payload: &[u8]) -> Self {
        let keep = &payload[..payload.len().min(EVENT_PAYLOAD_LEN)];

        RecordingEvent {
            kind,
            recording: kind == RecordingKind::Start,
            transaction_id,
            payload: Vec::from_slice(keep).unwrap_or_default(),
        }
    }
}

/// Receives recording events. Called from transfer completion context, so implementations must
/// not block; queue the event and return.
pub trait RecordingSink {
    fn publish(&mut self, event: RecordingEvent);
}

/// Best-effort one-line progress display.
pub trait StatusSink {
    fn status(&mut self, line: &str);
}

/// A sink that discards everything.
#[derive(Default, Debug, Clone, Copy)]
pub struct NullSink;

impl RecordingSink for NullSink {
    fn publish(&mut self, _event: RecordingEvent) {}
}

impl StatusSink for NullSink {
    fn status(&mut self, _line: &str) {}
}

impl<T: RecordingSink + ?Sized> RecordingSink for &mut T {
    fn publish(&mut self, event: RecordingEvent) {
        (**self).publish(event)
    }
}

impl<T: StatusSink + ?Sized> StatusSink for &mut T {
    fn status(&mut self, line: &str) {
        (**self).status(line)
    }
}

/// Status line strings.
pub mod status {
    use super::*;

    pub const RECORD_START: &str = "rec start";
    pub const RECORD_STOP: &str = "rec stop";

    /// Line shown when a command arrives.
    pub fn received(code: u16) -> &'static str {
        match OperationCode::try_from(code) {
            Ok(OperationCode::OpenSession) => "open sess",
            Ok(OperationCode::GetDeviceInfo) => "get info",
            Ok(OperationCode::GetStorageIds) => "stor ids",
            Ok(OperationCode::GetStorageInfo) => "stor info",
            Ok(OperationCode::GetNumObjects) => "num objs",
            Ok(OperationCode::GetObjectHandles) => "obj hndl",
            Ok(OperationCode::CloseSession) => "close",
            _ if code < 0x1000 => "vendor",
            _ => "other",
        }
    }

    /// Line shown when a data phase starts for `code`.
    pub fn data(code: u16) -> &'static str {
        match OperationCode::try_from(code) {
            Ok(OperationCode::GetDeviceInfo) => "send info",
            Ok(OperationCode::GetStorageIds) => "send ids",
            Ok(OperationCode::GetStorageInfo) => "send stor",
            Ok(OperationCode::GetNumObjects) => "send num",
            Ok(OperationCode::GetObjectHandles) => "send hndl",
            _ => "send",
        }
    }

    /// Line shown when a response goes out. `last_code` is the last command received.
    pub fn response(response: u16, last_code: u16) -> &'static str {
        match ResponseCode::try_from(response) {
            Ok(ResponseCode::Ok) => match OperationCode::try_from(last_code) {
                Ok(OperationCode::OpenSession) => "open ok",
                Ok(OperationCode::GetDeviceInfo) => "info ok",
                Ok(OperationCode::GetStorageIds) => "ids ok",
                Ok(OperationCode::GetStorageInfo) => "stor ok",
                Ok(OperationCode::GetNumObjects) => "num ok",
                Ok(OperationCode::GetObjectHandles) => "hndl ok",
                Ok(OperationCode::CloseSession) => "close ok",
                _ => "ok",
            },
            Ok(ResponseCode::OperationNotSupported) => "unsup",
            Err(_) => "resp",
        }
    }
}

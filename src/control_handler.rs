//! Control requests handled by the still-image interface.
//!
//! The host this device talks to aborts and re-enumerates when a request is stalled, so every
//! class request addressed to the interface and every standard request addressed to an
//! endpoint is acknowledged.

use crate::control::{Recipient, Request, RequestType};
use crate::endpoint::EndpointAddress;
use crate::ptp::{request as pr, ResponseCode};

/// Data stage of GET_DEVICE_STATUS: length 4, status OK.
pub const DEVICE_STATUS_OK: [u8; 4] = {
    let ok = (ResponseCode::Ok as u16).to_le_bytes();
    [0x04, 0x00, ok[0], ok[1]]
};

/// Size of the scratch buffer used for control data stages.
pub const CONTROL_BUF_LEN: usize = 64;

/// How a request is answered.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ControlReply {
    /// Status handshake, no data.
    Ack,
    /// Data stage with this many bytes from the buffer.
    Data(usize),
    /// Status handshake; the class must drop all bulk pipe state.
    Reset,
    /// Clear the stall on an endpoint, then acknowledge.
    ClearHalt(EndpointAddress),
    /// Not addressed to this interface.
    Ignore,
}

fn is_class_request(req: &Request, interface_number: u8) -> bool {
    req.request_type == RequestType::Class
        && req.recipient == Recipient::Interface
        && req.index as u8 == interface_number
}

fn is_endpoint_request(req: &Request) -> bool {
    req.request_type == RequestType::Standard && req.recipient == Recipient::Endpoint
}

/// Answers a request without a device-to-host data stage.
pub fn control_out(req: &Request, data: &[u8], interface_number: u8) -> ControlReply {
    if is_endpoint_request(req) {
        return match (req.request, req.value) {
            (Request::CLEAR_FEATURE, Request::FEATURE_ENDPOINT_HALT) => {
                ControlReply::ClearHalt(EndpointAddress::from(req.index as u8))
            }
            _ => ControlReply::Ack,
        };
    }

    if !is_class_request(req, interface_number) {
        return ControlReply::Ignore;
    }

    match req.request {
        pr::CANCEL => {
            let mut scratch = [0u8; CONTROL_BUF_LEN];
            let n = data.len().min(scratch.len());
            scratch[..n].copy_from_slice(&data[..n]);

            if n >= 6 {
                let _code = u16::from_le_bytes([scratch[0], scratch[1]]);
                let _tid = u32::from_le_bytes([scratch[2], scratch[3], scratch[4], scratch[5]]);
                ptp_debug!("ctrl: cancel code={:#x} tid={}", _code, _tid);
            }

            ControlReply::Ack
        }
        pr::DEVICE_RESET => ControlReply::Reset,
        _request => {
            ptp_debug!("ctrl: acking class request {:#x}", _request);
            ControlReply::Ack
        }
    }
}

/// Answers a request with a device-to-host data stage, writing the data into `buf`.
pub fn control_in(req: &Request, buf: &mut [u8], interface_number: u8) -> ControlReply {
    if is_endpoint_request(req) {
        return ControlReply::Ack;
    }

    if !is_class_request(req, interface_number) {
        return ControlReply::Ignore;
    }

    let limit = usize::from(req.length).min(buf.len());

    match req.request {
        pr::GET_DEVICE_STATUS => {
            let n = DEVICE_STATUS_OK.len().min(limit);
            buf[..n].copy_from_slice(&DEVICE_STATUS_OK[..n]);
            ControlReply::Data(n)
        }
        pr::GET_EXTENDED_EVENT_DATA => {
            buf[..limit].fill(0);
            ControlReply::Data(limit)
        }
        pr::DEVICE_RESET => ControlReply::Reset,
        _request => {
            ptp_debug!("ctrl: acking class request {:#x}", _request);
            ControlReply::Ack
        }
    }
}

use crate::UsbDirection;
use num_enum::{FromPrimitive, TryFromPrimitive};

/// Control request type.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestType {
    /// Request is a USB standard request. Usually handled by the platform stack.
    Standard = 0,
    /// Request is intended for a USB class.
    Class = 1,
    /// Request is vendor-specific.
    Vendor = 2,
    /// Reserved.
    Reserved = 3,
}

/// Control request recipient.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Recipient {
    /// Request is intended for the entire device.
    Device = 0,
    /// Request is intended for an interface. Generally, the `index` field of the request
    /// specifies the interface number.
    Interface = 1,
    /// Request is intended for an endpoint. Generally, the `index` field of the request specifies
    /// the endpoint address.
    Endpoint = 2,
    /// None of the above.
    Other = 3,
    /// Reserved. Every value above 3 maps here.
    #[num_enum(default)]
    Reserved = 4,
}

/// A control request read from a SETUP packet.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Request {
    /// Direction of the request.
    pub direction: UsbDirection,
    /// Type of the request.
    pub request_type: RequestType,
    /// Recipient of the request.
    pub recipient: Recipient,
    /// Request code. The meaning of the value depends on the previous fields.
    pub request: u8,
    /// Request value. The meaning of the value depends on the previous fields.
    pub value: u16,
    /// Request index. The meaning of the value depends on the previous fields.
    pub index: u16,
    /// Length of the DATA stage. For control OUT transfers this is the exact length of the data the
    /// host sent. For control IN transfers this is the maximum length of data the device should
    /// return.
    pub length: u16,
}

impl Request {
    pub const GET_STATUS: u8 = 0;
    pub const CLEAR_FEATURE: u8 = 1;
    pub const SET_FEATURE: u8 = 3;

    /// Feature selector for CLEAR_FEATURE / SET_FEATURE on an endpoint.
    pub const FEATURE_ENDPOINT_HALT: u16 = 0;

    /// Parses a SETUP packet.
    pub fn parse(buf: &[u8; 8]) -> Request {
        let rt = buf[0];

        Request {
            direction: rt.into(),
            request_type: RequestType::try_from((rt >> 5) & 0b11).unwrap_or(RequestType::Reserved),
            recipient: Recipient::from(rt & 0b11111),
            request: buf[1],
            value: u16::from_le_bytes([buf[2], buf[3]]),
            index: u16::from_le_bytes([buf[4], buf[5]]),
            length: u16::from_le_bytes([buf[6], buf[7]]),
        }
    }

    /// Packs the request back into the `bmRequestType` byte.
    pub fn request_type_byte(&self) -> u8 {
        (self.direction as u8) | ((self.request_type as u8) << 5) | (self.recipient as u8)
    }
}

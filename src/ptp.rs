//! Still-image protocol constants: container kinds, operation codes, response codes and the
//! class-specific control requests.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Container kind, carried in a 16-bit field that must lie in `1..=4`.
#[repr(u16)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContainerKind {
    Command = 1,
    Data = 2,
    Response = 3,
    Event = 4,
}

/// Operation codes understood in camera emulation mode.
#[repr(u16)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationCode {
    GetDeviceInfo = 0x1001,
    OpenSession = 0x1002,
    CloseSession = 0x1003,
    GetStorageIds = 0x1004,
    GetStorageInfo = 0x1005,
    GetNumObjects = 0x1006,
    GetObjectHandles = 0x1007,
    /// Vendor information query.
    Vendor9201 = 0x9201,
    /// Vendor information query (supported property list).
    Vendor9202 = 0x9202,
    /// Vendor two-stage shutter / record trigger. A Data container follows the command.
    VendorControl = 0x9207,
    /// Vendor information query (property descriptors).
    Vendor9209 = 0x9209,
}

impl OperationCode {
    /// Name used in command traces.
    pub fn name(self) -> &'static str {
        match self {
            OperationCode::GetDeviceInfo => "GetDeviceInfo",
            OperationCode::OpenSession => "OpenSession",
            OperationCode::CloseSession => "CloseSession",
            OperationCode::GetStorageIds => "GetStorageIDs",
            OperationCode::GetStorageInfo => "GetStorageInfo",
            OperationCode::GetNumObjects => "GetNumObjects",
            OperationCode::GetObjectHandles => "GetObjectHandles",
            OperationCode::Vendor9201 => "Vendor 0x9201",
            OperationCode::Vendor9202 => "Vendor 0x9202",
            OperationCode::VendorControl => "Vendor REC",
            OperationCode::Vendor9209 => "Vendor 0x9209",
        }
    }
}

/// Response codes the device emits.
#[repr(u16)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseCode {
    Ok = 0x2001,
    OperationNotSupported = 0x2005,
}

/// Parameter 0 of [`OperationCode::VendorControl`] for a full shutter press.
pub const FULL_PRESS: u32 = 0x0000_D2C8;

/// Parameter 0 of [`OperationCode::VendorControl`] for a half shutter press.
pub const HALF_PRESS: u32 = 0x0000_D2C1;

/// First data byte of a full press that starts recording.
pub const RECORD_START: u8 = 0x02;

/// First data byte of a full press that stops recording.
pub const RECORD_STOP: u8 = 0x01;

/// Class-specific control requests of the Still Image class.
pub mod request {
    pub const CANCEL: u8 = 0x64;
    pub const GET_EXTENDED_EVENT_DATA: u8 = 0x65;
    pub const DEVICE_RESET: u8 = 0x66;
    pub const GET_DEVICE_STATUS: u8 = 0x67;
}

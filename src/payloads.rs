//! Response payloads served in camera emulation mode.
//!
//! The fixed tables are byte dumps captured from a real camera of the impersonated model.
//! They are opaque; only their lengths are meaningful to the protocol logic.

use crate::ptp::OperationCode;
use crate::CapacityError;
use heapless::Vec;

/// Capacity of a payload generated at runtime.
pub const GENERATED_CAPACITY: usize = 160;

/// A payload built at runtime.
pub type GeneratedPayload = Vec<u8, GENERATED_CAPACITY>;

/// Identifier of the single storage the device reports.
pub const STORAGE_ID: u32 = 0x0001_0000;

/// Vendor 0x9201 reply: eight zero bytes.
pub static VENDOR_9201: [u8; 8] = [0; 8];

/// DeviceInfo dataset.
pub static DEVICE_INFO: [u8; 247] = [
    0x64, 0x00, 0x11, 0x00, 0x00, 0x00, 0x64, 0x00, 0x14, 0x53, 0x00, 0x6f,
    0x00, 0x6e, 0x00, 0x79, 0x00, 0x20, 0x00, 0x50, 0x00, 0x54, 0x00, 0x50,
    0x00, 0x20, 0x00, 0x45, 0x00, 0x78, 0x00, 0x74, 0x00, 0x65, 0x00, 0x6e,
    0x00, 0x73, 0x00, 0x69, 0x00, 0x6f, 0x00, 0x6e, 0x00, 0x73, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x02, 0x10, 0x03, 0x10, 0x01,
    0x10, 0x04, 0x10, 0x05, 0x10, 0x06, 0x10, 0x07, 0x10, 0x08, 0x10, 0x09,
    0x10, 0x0a, 0x10, 0x1b, 0x10, 0x01, 0x92, 0x02, 0x92, 0x05, 0x92, 0x07,
    0x92, 0x09, 0x92, 0x03, 0x00, 0x00, 0x00, 0x01, 0xc2, 0x02, 0xc2, 0x03,
    0xc2, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00,
    0x00, 0x01, 0x38, 0x01, 0xb3, 0x01, 0xb1, 0x11, 0x53, 0x00, 0x6f, 0x00,
    0x6e, 0x00, 0x79, 0x00, 0x20, 0x00, 0x43, 0x00, 0x6f, 0x00, 0x72, 0x00,
    0x70, 0x00, 0x6f, 0x00, 0x72, 0x00, 0x61, 0x00, 0x74, 0x00, 0x69, 0x00,
    0x6f, 0x00, 0x6e, 0x00, 0x00, 0x00, 0x0a, 0x49, 0x00, 0x4c, 0x00, 0x43,
    0x00, 0x45, 0x00, 0x2d, 0x00, 0x35, 0x00, 0x31, 0x00, 0x30, 0x00, 0x30,
    0x00, 0x00, 0x00, 0x04, 0x33, 0x00, 0x2e, 0x00, 0x30, 0x00, 0x00, 0x00,
    0x21, 0x30, 0x00, 0x30, 0x00, 0x30, 0x00, 0x30, 0x00, 0x30, 0x00, 0x30,
    0x00, 0x30, 0x00, 0x30, 0x00, 0x30, 0x00, 0x30, 0x00, 0x30, 0x00, 0x30,
    0x00, 0x30, 0x00, 0x30, 0x00, 0x30, 0x00, 0x30, 0x00, 0x33, 0x00, 0x32,
    0x00, 0x38, 0x00, 0x32, 0x00, 0x37, 0x00, 0x36, 0x00, 0x33, 0x00, 0x30,
    0x00, 0x30, 0x00, 0x33, 0x00, 0x38, 0x00, 0x35, 0x00, 0x39, 0x00, 0x30,
    0x00, 0x38, 0x00, 0x37, 0x00, 0x00, 0x00,
];

/// StorageIDs array: one storage, [`STORAGE_ID`].
pub static STORAGE_IDS: [u8; 8] = [
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
];

/// Vendor 0x9202 reply.
pub static VENDOR_9202: [u8; 84] = [
    0xc8, 0x00, 0x1f, 0x00, 0x00, 0x00, 0x04, 0x50, 0x05, 0x50, 0x07, 0x50,
    0x0a, 0x50, 0x0b, 0x50, 0x0c, 0x50, 0x0e, 0x50, 0x10, 0x50, 0x13, 0x50,
    0x00, 0xd2, 0x01, 0xd2, 0x03, 0xd2, 0x0d, 0xd2, 0x0e, 0xd2, 0x0f, 0xd2,
    0x10, 0xd2, 0x1c, 0xd2, 0x11, 0xd2, 0x13, 0xd2, 0x1e, 0xd2, 0x1b, 0xd2,
    0x1d, 0xd2, 0x1f, 0xd2, 0x17, 0xd2, 0x18, 0xd2, 0x19, 0xd2, 0x12, 0xd2,
    0x21, 0xd2, 0x14, 0xd2, 0x15, 0xd2, 0x20, 0xd2, 0x06, 0x00, 0x00, 0x00,
    0xc1, 0xd2, 0xc2, 0xd2, 0xc3, 0xd2, 0xc8, 0xd2, 0xc5, 0xd2, 0xc7, 0xd2,
];

/// Vendor 0x9209 reply.
pub static VENDOR_9209: [u8; 1011] = [
    0x24, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x50, 0x02, 0x00,
    0x01, 0x00, 0x02, 0x03, 0x02, 0x07, 0x00, 0x01, 0x02, 0x03, 0x10, 0x13,
    0x20, 0x23, 0x05, 0x50, 0x04, 0x00, 0x01, 0x01, 0x02, 0x00, 0x02, 0x00,
    0x02, 0x0c, 0x00, 0x02, 0x00, 0x04, 0x00, 0x11, 0x80, 0x10, 0x80, 0x06,
    0x00, 0x01, 0x80, 0x02, 0x80, 0x03, 0x80, 0x04, 0x80, 0x30, 0x80, 0x12,
    0x80, 0x23, 0x80, 0x07, 0x50, 0x04, 0x00, 0x00, 0x01, 0xff, 0xff, 0xc8,
    0x00, 0x01, 0x00, 0x00, 0xff, 0xff, 0x01, 0x00, 0x0a, 0x50, 0x04, 0x00,
    0x00, 0x02, 0x01, 0x00, 0x04, 0x80, 0x02, 0x07, 0x00, 0x01, 0x00, 0x02,
    0x00, 0x03, 0x00, 0x04, 0x80, 0x05, 0x80, 0x06, 0x80, 0x07, 0x80, 0x0b,
    0x50, 0x04, 0x00, 0x00, 0x02, 0x01, 0x00, 0x01, 0x00, 0x02, 0x03, 0x00,
    0x04, 0x00, 0x01, 0x00, 0x02, 0x80, 0x0c, 0x50, 0x04, 0x00, 0x00, 0x00,
    0x01, 0x00, 0x00, 0x00, 0x02, 0x09, 0x00, 0x02, 0x00, 0x01, 0x00, 0x04,
    0x00, 0x03, 0x00, 0x05, 0x00, 0x01, 0x80, 0x03, 0x80, 0x31, 0x80, 0x32,
    0x80, 0x0e, 0x50, 0x04, 0x00, 0x00, 0x02, 0x01, 0x00, 0x51, 0x80, 0x02,
    0x15, 0x00, 0x00, 0x80, 0x01, 0x80, 0x02, 0x00, 0x03, 0x00, 0x04, 0x00,
    0x01, 0x00, 0x50, 0x80, 0x51, 0x80, 0x52, 0x80, 0x53, 0x80, 0x54, 0x80,
    0x41, 0x80, 0x07, 0x00, 0x11, 0x80, 0x15, 0x80, 0x14, 0x80, 0x12, 0x80,
    0x13, 0x80, 0x16, 0x80, 0x17, 0x80, 0x18, 0x80, 0x10, 0x50, 0x03, 0x00,
    0x00, 0x01, 0x00, 0x00, 0xd4, 0xfe, 0x02, 0x2b, 0x00, 0x00, 0x00, 0x01,
    0x00, 0x02, 0x00, 0x88, 0x13, 0x5c, 0x12, 0x94, 0x11, 0xcc, 0x10, 0xa0,
    0x0f, 0x74, 0x0e, 0xac, 0x0d, 0xe4, 0x0c, 0xb8, 0x0b, 0x8c, 0x0a, 0xc4,
    0x09, 0xfc, 0x08, 0xd0, 0x07, 0xa4, 0x06, 0xdc, 0x05, 0x14, 0x05, 0xe8,
    0x03, 0xbc, 0x02, 0xf4, 0x01, 0x2c, 0x01, 0xd4, 0xfe, 0x0c, 0xfe, 0x44,
    0xfd, 0x18, 0xfc, 0xec, 0xfa, 0x24, 0xfa, 0x5c, 0xf9, 0x30, 0xf8, 0x04,
    0xf7, 0x3c, 0xf6, 0x74, 0xf5, 0x48, 0xf4, 0x1c, 0xf3, 0x54, 0xf2, 0x8c,
    0xf1, 0x60, 0xf0, 0x34, 0xef, 0x6c, 0xee, 0xa4, 0xed, 0x78, 0xec, 0x13,
    0x50, 0x04, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x02, 0x1d, 0x00,
    0x01, 0x00, 0x02, 0x00, 0x12, 0x80, 0x05, 0x80, 0x04, 0x80, 0x08, 0x80,
    0x09, 0x80, 0x37, 0x83, 0x37, 0x85, 0x57, 0x83, 0x57, 0x85, 0x77, 0x83,
    0x77, 0x85, 0x11, 0x83, 0x21, 0x83, 0x31, 0x83, 0x36, 0x83, 0x36, 0x85,
    0x56, 0x83, 0x56, 0x85, 0x76, 0x83, 0x76, 0x85, 0x10, 0x83, 0x20, 0x83,
    0x30, 0x83, 0x18, 0x80, 0x28, 0x80, 0x19, 0x80, 0x29, 0x80, 0x00, 0xd2,
    0x03, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x02, 0x1b, 0x00, 0x00,
    0x00, 0x01, 0x00, 0x02, 0x00, 0xb8, 0x0b, 0x8c, 0x0a, 0xc4, 0x09, 0xfc,
    0x08, 0xd0, 0x07, 0xa4, 0x06, 0xdc, 0x05, 0x14, 0x05, 0xe8, 0x03, 0xbc,
    0x02, 0xf4, 0x01, 0x2c, 0x01, 0xd4, 0xfe, 0x0c, 0xfe, 0x44, 0xfd, 0x18,
    0xfc, 0xec, 0xfa, 0x24, 0xfa, 0x5c, 0xf9, 0x30, 0xf8, 0x04, 0xf7, 0x3c,
    0xf6, 0x74, 0xf5, 0x48, 0xf4, 0x01, 0xd2, 0x02, 0x00, 0x01, 0x01, 0x01,
    0x01, 0x02, 0x07, 0x00, 0x01, 0x1f, 0x11, 0x12, 0x13, 0x14, 0x15, 0x03,
    0xd2, 0x02, 0x00, 0x01, 0x01, 0x04, 0x01, 0x02, 0x03, 0x00, 0x01, 0x02,
    0x03, 0x0d, 0xd2, 0x06, 0x00, 0x00, 0x02, 0xff, 0xff, 0xff, 0xff, 0x64,
    0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff,
    0x01, 0x00, 0x00, 0x00, 0x0e, 0xd2, 0x02, 0x00, 0x00, 0x02, 0x01, 0x05,
    0x02, 0x0a, 0x00, 0x01, 0x02, 0x03, 0x08, 0x09, 0x0a, 0x04, 0x05, 0x06,
    0x07, 0x0f, 0xd2, 0x04, 0x00, 0x01, 0x00, 0x7c, 0x15, 0x00, 0x00, 0x01,
    0xc4, 0x09, 0xac, 0x26, 0x64, 0x00, 0x10, 0xd2, 0x02, 0x00, 0x01, 0x01,
    0x80, 0x80, 0x01, 0x79, 0x87, 0x01, 0x1c, 0xd2, 0x02, 0x00, 0x01, 0x01,
    0x80, 0x80, 0x01, 0x79, 0x87, 0x01, 0x11, 0xd2, 0x02, 0x00, 0x01, 0x01,
    0x01, 0x02, 0x02, 0x02, 0x00, 0x01, 0x02, 0x13, 0xd2, 0x02, 0x00, 0x00,
    0x02, 0x01, 0x01, 0x02, 0x06, 0x00, 0x01, 0x02, 0x03, 0x05, 0x06, 0x07,
    0x1e, 0xd2, 0x06, 0x00, 0x00, 0x01, 0xff, 0xff, 0xff, 0x00, 0xff, 0xff,
    0xff, 0x00, 0x02, 0x1d, 0x00, 0xff, 0xff, 0xff, 0x00, 0x19, 0x00, 0x00,
    0x00, 0x64, 0x00, 0x00, 0x00, 0x7d, 0x00, 0x00, 0x00, 0xa0, 0x00, 0x00,
    0x00, 0xc8, 0x00, 0x00, 0x00, 0xfa, 0x00, 0x00, 0x00, 0x40, 0x01, 0x00,
    0x00, 0x90, 0x01, 0x00, 0x00, 0xf4, 0x01, 0x00, 0x00, 0x80, 0x02, 0x00,
    0x00, 0x20, 0x03, 0x00, 0x00, 0xe8, 0x03, 0x00, 0x00, 0xe2, 0x04, 0x00,
    0x00, 0x40, 0x06, 0x00, 0x00, 0xd0, 0x07, 0x00, 0x00, 0xc4, 0x09, 0x00,
    0x00, 0x80, 0x0c, 0x00, 0x00, 0xa0, 0x0f, 0x00, 0x00, 0x88, 0x13, 0x00,
    0x00, 0x00, 0x19, 0x00, 0x00, 0x40, 0x1f, 0x00, 0x00, 0x10, 0x27, 0x00,
    0x00, 0x00, 0x32, 0x00, 0x00, 0x80, 0x3e, 0x00, 0x00, 0x20, 0x4e, 0x00,
    0x00, 0x00, 0x64, 0x00, 0x00, 0x00, 0x90, 0x01, 0x00, 0x10, 0x27, 0x00,
    0x01, 0x1b, 0xd2, 0x04, 0x00, 0x01, 0x01, 0x00, 0x80, 0x00, 0x80, 0x02,
    0x10, 0x00, 0x00, 0x80, 0x01, 0x80, 0x02, 0x80, 0x03, 0x80, 0x04, 0x80,
    0x05, 0x80, 0x10, 0x80, 0x20, 0x80, 0x21, 0x80, 0x30, 0x80, 0x40, 0x80,
    0x50, 0x80, 0x51, 0x80, 0x52, 0x80, 0x53, 0x80, 0x60, 0x80, 0x1d, 0xd2,
    0x02, 0x00, 0x00, 0x02, 0x00, 0x00, 0x01, 0x00, 0x02, 0x01, 0x1f, 0xd2,
    0x02, 0x00, 0x00, 0x02, 0x01, 0x00, 0x02, 0x00, 0x00, 0x17, 0xd2, 0x02,
    0x00, 0x00, 0x02, 0x01, 0x01, 0x02, 0x02, 0x00, 0x02, 0x01, 0x18, 0xd2,
    0x01, 0x00, 0x00, 0x02, 0xff, 0x31, 0x01, 0xff, 0x64, 0x01, 0x19, 0xd2,
    0x02, 0x00, 0x00, 0x02, 0x01, 0x02, 0x02, 0x02, 0x00, 0x02, 0x01, 0xc1,
    0xd2, 0x04, 0x00, 0x81, 0x01, 0x01, 0x00, 0x01, 0x00, 0x02, 0x02, 0x00,
    0x01, 0x00, 0x02, 0x00, 0xc2, 0xd2, 0x04, 0x00, 0x81, 0x01, 0x01, 0x00,
    0x01, 0x00, 0x02, 0x02, 0x00, 0x01, 0x00, 0x02, 0x00, 0xc3, 0xd2, 0x04,
    0x00, 0x81, 0x01, 0x01, 0x00, 0x01, 0x00, 0x02, 0x02, 0x00, 0x01, 0x00,
    0x02, 0x00, 0xc8, 0xd2, 0x04, 0x00, 0x81, 0x01, 0x01, 0x00, 0x01, 0x00,
    0x02, 0x02, 0x00, 0x01, 0x00, 0x02, 0x00, 0x12, 0xd2, 0x02, 0x00, 0x00,
    0x01, 0x00, 0x00, 0x01, 0x00, 0x0f, 0x01, 0x21, 0xd2, 0x02, 0x00, 0x01,
    0x01, 0x00, 0x00, 0x02, 0x03, 0x00, 0x00, 0x01, 0x02, 0x14, 0xd2, 0x06,
    0x00, 0x00, 0x01, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01,
    0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0x01, 0x00, 0x00, 0x00,
    0x15, 0xd2, 0x04, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
    0x00, 0xff, 0xff, 0x01, 0x00, 0xc5, 0xd2, 0x04, 0x00, 0x83, 0x01, 0x01,
    0x00, 0x01, 0x00, 0x02, 0x02, 0x00, 0x01, 0x00, 0x02, 0x00, 0xc7, 0xd2,
    0x04, 0x00, 0x81, 0x01, 0x01, 0x00, 0x01, 0x00, 0x02, 0x02, 0x00, 0x01,
    0x00, 0x02, 0x00,
];

/// Appends little-endian fields to a bounded buffer.
pub struct PayloadWriter<'a, const N: usize> {
    buf: &'a mut Vec<u8, N>,
}

impl<'a, const N: usize> PayloadWriter<'a, N> {
    pub fn new(buf: &'a mut Vec<u8, N>) -> Self {
        PayloadWriter { buf }
    }

    pub fn bytes(&mut self, data: &[u8]) -> Result<&mut Self, CapacityError> {
        let needed = self.buf.len() + data.len();
        self.buf
            .extend_from_slice(data)
            .map_err(|_| CapacityError { needed, capacity: N })?;
        Ok(self)
    }

    pub fn u16(&mut self, v: u16) -> Result<&mut Self, CapacityError> {
        self.bytes(&v.to_le_bytes())
    }

    pub fn u32(&mut self, v: u32) -> Result<&mut Self, CapacityError> {
        self.bytes(&v.to_le_bytes())
    }

    pub fn u64(&mut self, v: u64) -> Result<&mut Self, CapacityError> {
        self.bytes(&v.to_le_bytes())
    }

    /// Writes a protocol string: a count byte (characters plus terminator), each character as a
    /// little-endian UTF-16 unit, then a 16-bit terminator. `None` and `""` both write a single
    /// zero count byte. Strings longer than 254 characters are cut.
    pub fn string(&mut self, s: Option<&str>) -> Result<&mut Self, CapacityError> {
        let s = match s {
            Some(s) if !s.is_empty() => s,
            _ => return self.bytes(&[0]),
        };

        let len = s.encode_utf16().count().min(254);
        self.bytes(&[(len + 1) as u8])?;
        for unit in s.encode_utf16().take(len) {
            self.u16(unit)?;
        }
        self.bytes(&[0, 0])
    }
}

/// StorageInfo dataset for the single internal storage.
pub fn storage_info() -> Result<GeneratedPayload, CapacityError> {
    const GIB: u64 = 1024 * 1024 * 1024;

    let mut buf = Vec::new();
    PayloadWriter::new(&mut buf)
        .u16(0x0002)? // storage type: fixed RAM
        .u16(0x0002)? // filesystem: generic hierarchical
        .u16(0x0000)? // access: read-write
        .u64(32 * GIB)?
        .u64(31 * GIB)?
        .u32(0xFFFF_FFFF)? // free space in images: unknown
        .string(Some("Internal Storage"))?
        .string(Some("SONY"))?;

    Ok(buf)
}

/// A single 32-bit zero, used for an object count and an empty handle array.
pub fn zero_count() -> GeneratedPayload {
    let mut buf = Vec::new();
    let _ = buf.extend_from_slice(&0u32.to_le_bytes());
    buf
}

/// Static reply table for information operations whose payload never changes.
pub fn fixed_payload(op: OperationCode) -> Option<&'static [u8]> {
    match op {
        OperationCode::GetDeviceInfo => Some(&DEVICE_INFO),
        OperationCode::GetStorageIds => Some(&STORAGE_IDS),
        OperationCode::Vendor9201 => Some(&VENDOR_9201),
        OperationCode::Vendor9202 => Some(&VENDOR_9202),
        OperationCode::Vendor9209 => Some(&VENDOR_9209),
        _ => None,
    }
}

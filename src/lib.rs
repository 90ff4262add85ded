//! USB still-image (PTP) camera emulation for embedded devices.
//!
//! The crate answers the bulk and control traffic of a single still-image interface. In
//! [`Mode::CameraEmulation`] commands are answered locally from captured response tables; in
//! [`Mode::RawProxy`] every received transfer is forwarded verbatim to a remote controller
//! over a length-prefixed [frame tunnel](tunnel_frame) and the controller's replies are
//! replayed on the bulk IN pipe.
//!
//! The platform USB stack owns enumeration and endpoint 0; it drives this crate through the
//! [`UsbClass`](class::UsbClass) callbacks and the crate talks back through
//! [`UsbBus`](bus::UsbBus).

#![no_std]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

/// A USB stack error.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsbError {
    /// An operation would block because the endpoint is currently busy or there is no packet
    /// to read.
    WouldBlock,

    /// Data does not fit the buffer supplied or allocated for it.
    BufferOverflow,

    /// The endpoint address is not one the class or bus knows about.
    InvalidEndpoint,

    /// A configuration value was rejected by the builder.
    InvalidConfig,
}

/// Result for USB operations.
pub type Result<T> = core::result::Result<T, UsbError>;

/// Data did not fit a bounded buffer or queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
#[error("{needed} bytes do not fit in a buffer of {capacity}")]
pub struct CapacityError {
    pub needed: usize,
    pub capacity: usize,
}

/// Direction of USB traffic. Note that in the USB standard the direction is always indicated
/// from the perspective of the host, which is backward for devices.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsbDirection {
    /// Host to device (OUT)
    Out = 0x00,
    /// Device to host (IN)
    In = 0x80,
}

impl From<u8> for UsbDirection {
    fn from(value: u8) -> Self {
        if value & 0x80 != 0 {
            UsbDirection::In
        } else {
            UsbDirection::Out
        }
    }
}

pub mod bus;
pub mod class;
pub mod config;
pub mod container;
pub mod control;
pub mod control_handler;
pub mod descriptor;
pub mod dispatcher;
pub mod endpoint;
pub mod events;
pub mod payloads;
pub mod ptp;
pub mod stream;
pub mod tunnel_bridge;
pub mod tunnel_frame;

#[cfg(feature = "tunnel")]
pub mod tunnel;

pub use config::{Mode, PtpClassBuilder, PtpConfig};

pub mod prelude {
    pub use crate::class::{PtpClass, UsbClass};
    pub use crate::config::{Mode, PtpClassBuilder, PtpConfig};
    pub use crate::events::{RecordingEvent, RecordingKind, RecordingSink, StatusSink};
    pub use crate::tunnel_frame::FrameLink;
    pub use crate::UsbError;
}

pub mod class_prelude {
    pub use crate::bus::UsbBus;
    pub use crate::class::{ControlInResult, ControlOutResult, UsbClass};
    pub use crate::control;
    pub use crate::descriptor::DescriptorWriter;
    pub use crate::endpoint::{EndpointAddress, EndpointType};
    pub use crate::UsbError;
}

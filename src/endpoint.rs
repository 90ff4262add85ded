use crate::UsbDirection;

/// Default bulk IN endpoint (device to host). Matches the camera the class impersonates.
pub const DEFAULT_BULK_IN: EndpointAddress = EndpointAddress(0x81);

/// Default bulk OUT endpoint (host to device).
pub const DEFAULT_BULK_OUT: EndpointAddress = EndpointAddress(0x02);

/// Full-speed bulk maximum packet size.
pub const FULL_SPEED_BULK_PACKET_SIZE: u16 = 64;

/// USB endpoint address that contains a direction and number.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndpointAddress(u8);

impl From<u8> for EndpointAddress {
    #[inline]
    fn from(addr: u8) -> EndpointAddress {
        EndpointAddress(addr)
    }
}

impl From<EndpointAddress> for u8 {
    #[inline]
    fn from(addr: EndpointAddress) -> u8 {
        addr.0
    }
}

impl EndpointAddress {
    const INBITS: u8 = UsbDirection::In as u8;

    /// Constructs a new EndpointAddress with the given number and direction.
    #[inline]
    pub const fn from_parts(number: u8, dir: UsbDirection) -> Self {
        EndpointAddress((number & 0x0f) | dir as u8)
    }

    /// Gets the direction part of the address.
    #[inline]
    pub fn direction(&self) -> UsbDirection {
        if (self.0 & Self::INBITS) != 0 {
            UsbDirection::In
        } else {
            UsbDirection::Out
        }
    }

    /// Gets the number part of the endpoint address.
    #[inline]
    pub fn number(&self) -> u8 {
        self.0 & !Self::INBITS
    }

    /// Whether two addresses name the same endpoint, ignoring reserved bits the host may set
    /// in the `wIndex` of an endpoint request.
    #[inline]
    pub fn same_endpoint(&self, other: EndpointAddress) -> bool {
        (self.0 & 0x8f) == (other.0 & 0x8f)
    }
}

/// USB endpoint transfer type. The values of this enum can be directly cast into `u8` to get the
/// transfer bmAttributes transfer type bits.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EndpointType {
    /// Control endpoint. Used for device management. Only the host can initiate requests. Usually
    /// used only endpoint 0.
    Control = 0b00,

    /// Isochronous endpoint. Not used by the still-image interface.
    Isochronous = 0b01,

    /// Bulk endpoint. Used for containers in both directions.
    Bulk = 0b10,

    /// Interrupt endpoint. The impersonated camera exposes no event endpoint.
    Interrupt = 0b11,
}

/// Static description of one endpoint, used when writing descriptors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EndpointDescriptor {
    /// Endpoint address.
    pub address: EndpointAddress,

    /// Endpoint transfer type.
    pub ep_type: EndpointType,

    /// Maximum packet size.
    pub max_packet_size: u16,

    /// Poll interval for interrupt endpoints.
    pub interval: u8,
}

impl EndpointDescriptor {
    /// Describes a bulk endpoint.
    pub const fn bulk(address: EndpointAddress, max_packet_size: u16) -> Self {
        EndpointDescriptor {
            address,
            ep_type: EndpointType::Bulk,
            max_packet_size,
            interval: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parts() {
        assert_eq!(DEFAULT_BULK_IN.direction(), UsbDirection::In);
        assert_eq!(DEFAULT_BULK_IN.number(), 1);
        assert_eq!(DEFAULT_BULK_OUT.direction(), UsbDirection::Out);
        assert_eq!(DEFAULT_BULK_OUT.number(), 2);
        assert_eq!(
            EndpointAddress::from_parts(1, UsbDirection::In),
            DEFAULT_BULK_IN
        );
    }

    #[test]
    fn same_endpoint_ignores_reserved_bits() {
        assert!(DEFAULT_BULK_IN.same_endpoint(EndpointAddress::from(0x81 | 0x10)));
        assert!(!DEFAULT_BULK_IN.same_endpoint(DEFAULT_BULK_OUT));
    }
}

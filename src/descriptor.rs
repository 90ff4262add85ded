use crate::endpoint::EndpointDescriptor;
use crate::{Result, UsbError};

pub mod descriptor_type {
    pub const INTERFACE: u8 = 4;
    pub const ENDPOINT: u8 = 5;
}

/// Still Image interface triple.
pub mod still_image {
    pub const CLASS: u8 = 0x06;
    pub const SUBCLASS: u8 = 0x01;
    pub const PROTOCOL: u8 = 0x01;
}

/// A writer for USB descriptors into a caller-provided buffer.
pub struct DescriptorWriter<'a> {
    buf: &'a mut [u8],
    position: usize,
    next_interface_number: u8,
}

impl<'a> DescriptorWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        DescriptorWriter {
            buf,
            position: 0,
            next_interface_number: 0,
        }
    }

    /// Number of interfaces written so far.
    pub fn num_interfaces(&self) -> u8 {
        self.next_interface_number
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.position]
    }

    fn write_header(&mut self, length: usize, descriptor_type: u8) -> Result<()> {
        if self.position + length + 2 > self.buf.len() || length + 2 > 255 {
            return Err(UsbError::BufferOverflow);
        }

        self.buf[self.position] = (length + 2) as u8;
        self.buf[self.position + 1] = descriptor_type;
        self.position += 2;

        Ok(())
    }

    /// Writes an arbitrary (usually class-specific) descriptor.
    pub fn write(&mut self, descriptor_type: u8, descriptor: &[u8]) -> Result<()> {
        let length = descriptor.len();

        self.write_header(length, descriptor_type)?;

        self.buf[self.position..self.position + length].copy_from_slice(descriptor);
        self.position += length;

        Ok(())
    }

    /// Writes an interface descriptor and returns the interface number it was given.
    ///
    /// # Arguments
    ///
    /// * `num_endpoints` - Number of endpoint descriptors that follow.
    /// * `interface_class` - Class code assigned by USB.org.
    /// * `interface_sub_class` - Sub-class code. Depends on class.
    /// * `interface_protocol` - Protocol code. Depends on class and sub-class.
    /// * `interface_string` - Index of the interface string, or 0 for none.
    pub fn interface(
        &mut self,
        num_endpoints: u8,
        interface_class: u8,
        interface_sub_class: u8,
        interface_protocol: u8,
        interface_string: u8,
    ) -> Result<u8> {
        let number = self.next_interface_number;

        self.write(
            descriptor_type::INTERFACE,
            &[
                number,              // bInterfaceNumber
                0,                   // bAlternateSetting
                num_endpoints,       // bNumEndpoints
                interface_class,     // bInterfaceClass
                interface_sub_class, // bInterfaceSubClass
                interface_protocol,  // bInterfaceProtocol
                interface_string,    // iInterface
            ],
        )?;

        self.next_interface_number += 1;

        Ok(number)
    }

    /// Writes an endpoint descriptor.
    pub fn endpoint(&mut self, endpoint: &EndpointDescriptor) -> Result<()> {
        let mps = endpoint.max_packet_size.to_le_bytes();

        self.write(
            descriptor_type::ENDPOINT,
            &[
                endpoint.address.into(), // bEndpointAddress
                endpoint.ep_type as u8,  // bmAttributes
                mps[0],
                mps[1],             // wMaxPacketSize
                endpoint.interval, // bInterval
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{DEFAULT_BULK_IN, DEFAULT_BULK_OUT};

    #[test]
    fn interface_and_endpoints() {
        let mut buf = [0u8; 64];
        let mut writer = DescriptorWriter::new(&mut buf);

        let number = writer
            .interface(2, still_image::CLASS, still_image::SUBCLASS, still_image::PROTOCOL, 4)
            .unwrap();
        writer.endpoint(&EndpointDescriptor::bulk(DEFAULT_BULK_OUT, 64)).unwrap();
        writer.endpoint(&EndpointDescriptor::bulk(DEFAULT_BULK_IN, 64)).unwrap();

        assert_eq!(number, 0);
        assert_eq!(writer.num_interfaces(), 1);
        assert_eq!(
            writer.written(),
            &[
                9, 4, 0, 0, 2, 0x06, 0x01, 0x01, 4, // interface
                7, 5, 0x02, 0x02, 0x40, 0x00, 0x00, // bulk OUT
                7, 5, 0x81, 0x02, 0x40, 0x00, 0x00, // bulk IN
            ]
        );
    }

    #[test]
    fn overflow_is_reported() {
        let mut buf = [0u8; 8];
        let mut writer = DescriptorWriter::new(&mut buf);

        assert_eq!(
            writer.interface(2, 6, 1, 1, 0),
            Err(UsbError::BufferOverflow)
        );
        assert_eq!(writer.position(), 0);
        assert_eq!(writer.num_interfaces(), 0);
    }
}

use core::time::Duration;

use crate::endpoint::{
    EndpointAddress, DEFAULT_BULK_IN, DEFAULT_BULK_OUT, FULL_SPEED_BULK_PACKET_SIZE,
};
use crate::stream::MAX_CHUNK;
use crate::container::HEADER_LEN;
use crate::{Result, UsbDirection, UsbError};

/// How bulk traffic is answered.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Commands are answered locally from captured reply tables.
    #[default]
    CameraEmulation,
    /// Every received transfer is forwarded over the frame tunnel and the remote controller's
    /// frames are replayed on the bulk IN endpoint.
    RawProxy,
}

/// Settings of a [`PtpClass`](crate::class::PtpClass).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct PtpConfig<'a> {
    pub mode: Mode,
    pub max_packet_size: u16,
    pub chunk_capacity: usize,
    pub tunnel_timeout: Duration,
    pub bulk_in: EndpointAddress,
    pub bulk_out: EndpointAddress,
    pub interface_number: u8,
    pub interface_string_index: u8,
    pub interface_string: &'a str,
}

impl Default for PtpConfig<'_> {
    fn default() -> Self {
        PtpConfig {
            mode: Mode::CameraEmulation,
            max_packet_size: FULL_SPEED_BULK_PACKET_SIZE,
            chunk_capacity: MAX_CHUNK,
            tunnel_timeout: Duration::from_millis(1500),
            bulk_in: DEFAULT_BULK_IN,
            bulk_out: DEFAULT_BULK_OUT,
            interface_number: 0,
            interface_string_index: 4,
            interface_string: "PTP",
        }
    }
}

/// Used to build a [`PtpConfig`].
#[derive(Clone, Debug, Default)]
pub struct PtpClassBuilder<'a> {
    config: PtpConfig<'a>,
}

macro_rules! builder_fields {
    ( $( $(#[$meta:meta])* $name:ident: $type:ty, )* ) => {
        $(
            $(#[$meta])*
            pub fn $name(&mut self, $name: $type) -> &mut Self {
                self.config.$name = $name;
                self
            }
        )*
    }
}

impl<'a> PtpClassBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    builder_fields! {
        /// Sets how bulk traffic is answered.
        ///
        /// Default: [`Mode::CameraEmulation`]
        mode: Mode,

        /// Sets the maximum packet size of both bulk endpoints. Only full-speed sizes are valid.
        ///
        /// Default: 64 bytes
        max_packet_size: u16,

        /// Sets the largest bulk IN transfer built by the stream transmitter. Must be a multiple
        /// of the maximum packet size, larger than a container header and at most 512.
        ///
        /// Default: 512 bytes
        chunk_capacity: usize,

        /// Sets how long raw proxy mode waits for each frame from the remote controller.
        ///
        /// Default: 1500 ms
        tunnel_timeout: Duration,

        /// Sets the bulk IN endpoint address.
        ///
        /// Default: `0x81`
        bulk_in: EndpointAddress,

        /// Sets the bulk OUT endpoint address.
        ///
        /// Default: `0x02`
        bulk_out: EndpointAddress,

        /// Sets the interface number assigned by the platform stack. Class requests addressed to
        /// any other interface are ignored.
        ///
        /// Default: `0`
        interface_number: u8,

        /// Sets the string index the interface descriptor points at.
        ///
        /// Default: `4`
        interface_string_index: u8,

        /// Sets the interface string.
        ///
        /// Default: `"PTP"`
        interface_string: &'a str,
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// * [`InvalidConfig`](crate::UsbError::InvalidConfig) - The packet size is not 8, 16, 32 or
    ///   64, the chunk capacity is not a multiple of it or out of range, or an endpoint address
    ///   points the wrong way.
    pub fn build(&self) -> Result<PtpConfig<'a>> {
        let c = self.config;

        if !matches!(c.max_packet_size, 8 | 16 | 32 | 64) {
            return Err(UsbError::InvalidConfig);
        }

        let mps = usize::from(c.max_packet_size);
        if c.chunk_capacity <= HEADER_LEN
            || c.chunk_capacity > MAX_CHUNK
            || c.chunk_capacity % mps != 0
        {
            return Err(UsbError::InvalidConfig);
        }

        if c.bulk_in.direction() != UsbDirection::In || c.bulk_out.direction() != UsbDirection::Out
        {
            return Err(UsbError::InvalidConfig);
        }

        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = PtpClassBuilder::new().build().unwrap();

        assert_eq!(c.mode, Mode::CameraEmulation);
        assert_eq!(c.max_packet_size, 64);
        assert_eq!(c.chunk_capacity, 512);
        assert_eq!(c.tunnel_timeout, Duration::from_millis(1500));
        assert_eq!(u8::from(c.bulk_in), 0x81);
        assert_eq!(u8::from(c.bulk_out), 0x02);
        assert_eq!(c.interface_string, "PTP");
    }

    #[test]
    fn chained_setters() {
        let c = PtpClassBuilder::new()
            .mode(Mode::RawProxy)
            .chunk_capacity(64)
            .tunnel_timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        assert_eq!(c.mode, Mode::RawProxy);
        assert_eq!(c.chunk_capacity, 64);
        assert_eq!(c.tunnel_timeout, Duration::from_millis(200));
    }

    #[test]
    fn rejects_bad_sizes() {
        assert_eq!(
            PtpClassBuilder::new().max_packet_size(100).build(),
            Err(UsbError::InvalidConfig)
        );
        assert_eq!(
            PtpClassBuilder::new().chunk_capacity(100).build(),
            Err(UsbError::InvalidConfig)
        );
        assert_eq!(
            PtpClassBuilder::new().chunk_capacity(1024).build(),
            Err(UsbError::InvalidConfig)
        );
        assert_eq!(
            PtpClassBuilder::new().max_packet_size(8).chunk_capacity(8).build(),
            Err(UsbError::InvalidConfig)
        );
    }

    #[test]
    fn rejects_swapped_endpoints() {
        assert_eq!(
            PtpClassBuilder::new()
                .bulk_in(DEFAULT_BULK_OUT)
                .build(),
            Err(UsbError::InvalidConfig)
        );
    }
}

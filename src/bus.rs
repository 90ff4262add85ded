use crate::endpoint::EndpointAddress;
use crate::Result;

/// The transport side of the still-image interface. Implement this on top of the platform USB
/// stack to run a [`PtpClass`](crate::class::PtpClass) on real hardware.
///
/// The bus is shared by reference with the class, so any required mutability must be
/// implemented using interior mutability. All methods are called from the single execution
/// context that delivers transfer completions and must not block.
pub trait UsbBus {
    /// Starts one bulk IN transfer of `buf` on the specified endpoint and returns the number of
    /// bytes queued. The peripheral splits the transfer into packets of the endpoint's maximum
    /// packet size. An empty `buf` sends a zero-length packet.
    ///
    /// Completion of the transfer is reported back through
    /// [`UsbClass::endpoint_in_complete`](crate::class::UsbClass::endpoint_in_complete).
    ///
    /// # Errors
    ///
    /// * [`InvalidEndpoint`](crate::UsbError::InvalidEndpoint) - The `ep_addr` does not point to a
    ///   valid bulk IN endpoint.
    /// * [`WouldBlock`](crate::UsbError::WouldBlock) - A previously started transfer is still
    ///   pending.
    /// * [`BufferOverflow`](crate::UsbError::BufferOverflow) - The transfer is longer than the
    ///   peripheral's transfer buffer.
    fn write(&self, ep_addr: EndpointAddress, buf: &[u8]) -> Result<usize>;

    /// Reads the transfer that just completed on a bulk OUT endpoint and returns its length.
    ///
    /// This also re-arms the endpoint so the host can send the next transfer. The class always
    /// reads a completed transfer, even one it is going to drop, so the host is never left
    /// waiting on an unarmed pipe.
    ///
    /// # Errors
    ///
    /// * [`InvalidEndpoint`](crate::UsbError::InvalidEndpoint) - The `ep_addr` does not point to a
    ///   valid bulk OUT endpoint.
    /// * [`WouldBlock`](crate::UsbError::WouldBlock) - There is no completed transfer to read.
    ///   Note that this is different from a received zero-length packet, which returns `Ok(0)`.
    /// * [`BufferOverflow`](crate::UsbError::BufferOverflow) - The received transfer is too long
    ///   to fit in `buf`.
    fn read(&self, ep_addr: EndpointAddress, buf: &mut [u8]) -> Result<usize>;

    /// Sets or clears the STALL condition for an endpoint. If the endpoint is an OUT endpoint, it
    /// should be prepared to receive data again.
    fn set_stalled(&self, ep_addr: EndpointAddress, stalled: bool);

    /// Gets whether the STALL condition is set for an endpoint.
    fn is_stalled(&self, ep_addr: EndpointAddress) -> bool;
}

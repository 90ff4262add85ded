use crate::bus::UsbBus;
use crate::config::{Mode, PtpConfig};
use crate::container::{self, Layout};
use crate::control;
use crate::control_handler::{self, ControlReply};
use crate::descriptor::{still_image, DescriptorWriter};
use crate::dispatcher::{Dispatcher, Reply};
use crate::endpoint::{EndpointAddress, EndpointDescriptor};
use crate::events::{status, NullSink, RecordingSink, StatusSink};
use crate::ptp::{ContainerKind, ResponseCode};
use crate::stream::{Action, StreamTransmitter};
use crate::tunnel_bridge::TunnelBridge;
use crate::tunnel_frame::{Disconnected, FrameLink, MAX_FRAME_PAYLOAD};
use crate::{Result, UsbError};

/// Size of the bulk OUT receive buffer.
pub const RX_BUF_LEN: usize = MAX_FRAME_PAYLOAD;

/// Result of a class-specific control OUT request.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ControlOutResult {
    /// The request was accepted.
    Ok,
    /// The request was rejected; the platform stack stalls it.
    Err,
    /// The request was not handled by this class; the platform stack decides.
    Ignore,
}

/// Result of a class-specific control IN request.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ControlInResult {
    /// The request was accepted and this many bytes of the buffer form the data stage.
    Ok(usize),
    /// The request was rejected; the platform stack stalls it.
    Err,
    /// The request was not handled by this class; the platform stack decides.
    Ignore,
}

/// A USB class driven by the platform stack's callbacks.
///
/// All methods are called from the single context that delivers USB events and must not be
/// called concurrently.
pub trait UsbClass {
    /// Called after a USB reset after the bus reset sequence is complete.
    fn reset(&mut self) {}

    /// Called when the platform stack builds the configuration descriptor. Write interface and
    /// endpoint descriptors for the class here.
    fn get_configuration_descriptors(&self, writer: &mut DescriptorWriter) -> Result<()> {
        let _ = writer;
        Ok(())
    }

    /// Called when a control request without a device-to-host data stage is received. `data` is
    /// the OUT data stage, if any.
    fn control_out(&mut self, req: &control::Request, data: &[u8]) -> ControlOutResult {
        let _ = (req, data);
        ControlOutResult::Ignore
    }

    /// Called when a control request with a device-to-host data stage is received. Write the
    /// response into `data`.
    fn control_in(&mut self, req: &control::Request, data: &mut [u8]) -> ControlInResult {
        let _ = (req, data);
        ControlInResult::Ignore
    }

    /// Called when a bulk OUT transfer completes on an endpoint.
    fn endpoint_out(&mut self, addr: EndpointAddress) {
        let _ = addr;
    }

    /// Called when a bulk IN transfer started by the class completes.
    fn endpoint_in_complete(&mut self, addr: EndpointAddress) {
        let _ = addr;
    }

    /// Gets a string descriptor owned by the class.
    fn get_string(&self, index: u8, lang_id: u16) -> Option<&str> {
        let _ = (index, lang_id);
        None
    }
}

enum Engine {
    Emulation(Dispatcher),
    Proxy(TunnelBridge),
}

/// The still-image interface.
///
/// In camera emulation mode received containers are decoded and answered from the reply
/// tables, record triggers go to `R` and progress lines go to `S`. In raw proxy mode every
/// received transfer is relayed through `L`.
pub struct PtpClass<'a, B, R = NullSink, S = NullSink, L = Disconnected>
where
    B: UsbBus,
    R: RecordingSink,
    S: StatusSink,
    L: FrameLink,
{
    bus: &'a B,
    config: PtpConfig<'a>,
    engine: Engine,
    stream: StreamTransmitter,
    rx_buf: [u8; RX_BUF_LEN],
    last_rx_layout: Option<Layout>,
    recorder: R,
    status: S,
    link: L,
}

impl<'a, B, R, S, L> PtpClass<'a, B, R, S, L>
where
    B: UsbBus,
    R: RecordingSink,
    S: StatusSink,
    L: FrameLink,
{
    /// Creates the class. Build `config` with
    /// [`PtpClassBuilder`](crate::config::PtpClassBuilder).
    pub fn new(bus: &'a B, config: PtpConfig<'a>, recorder: R, status: S, link: L) -> Self {
        let engine = match config.mode {
            Mode::CameraEmulation => Engine::Emulation(Dispatcher::new()),
            Mode::RawProxy => Engine::Proxy(TunnelBridge::new(config.tunnel_timeout)),
        };

        PtpClass {
            bus,
            config,
            engine,
            stream: StreamTransmitter::new(config.chunk_capacity, config.max_packet_size),
            rx_buf: [0; RX_BUF_LEN],
            last_rx_layout: None,
            recorder,
            status,
            link,
        }
    }

    pub fn config(&self) -> &PtpConfig<'a> {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Layout of the last container decoded in camera emulation mode.
    pub fn last_rx_layout(&self) -> Option<Layout> {
        self.last_rx_layout
    }

    /// Session id latched by OpenSession. Always 0 in raw proxy mode.
    pub fn session_id(&self) -> u32 {
        match &self.engine {
            Engine::Emulation(d) => d.session_id(),
            Engine::Proxy(_) => 0,
        }
    }

    /// Recording state driven by the vendor record trigger.
    pub fn recording(&self) -> bool {
        match &self.engine {
            Engine::Emulation(d) => d.recording(),
            Engine::Proxy(_) => false,
        }
    }

    /// Camera emulation state, `None` in raw proxy mode.
    pub fn dispatcher(&self) -> Option<&Dispatcher> {
        match &self.engine {
            Engine::Emulation(d) => Some(d),
            Engine::Proxy(_) => None,
        }
    }

    /// Whether a data phase is being streamed.
    pub fn is_streaming(&self) -> bool {
        self.stream.is_active()
    }

    /// Frames from the remote controller not yet sent. Always 0 in camera emulation mode.
    pub fn queued_frames(&self) -> usize {
        match &self.engine {
            Engine::Emulation(_) => 0,
            Engine::Proxy(bridge) => bridge.queued(),
        }
    }

    /// Whether a remote controller is attached to the frame tunnel.
    pub fn tunnel_connected(&self) -> bool {
        self.link.is_connected()
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn status_sink(&self) -> &S {
        &self.status
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Drops every transaction in progress: the two-stage wait, the session, the data phase and
    /// queued proxy frames. Completions for abandoned transfers are ignored afterwards.
    fn reset_state(&mut self) {
        self.stream.reset();
        match &mut self.engine {
            Engine::Emulation(d) => d.reset(),
            Engine::Proxy(bridge) => bridge.reset(),
        }
    }

    fn device_reset(&mut self) {
        for ep in [self.config.bulk_out, self.config.bulk_in] {
            if self.bus.is_stalled(ep) {
                self.bus.set_stalled(ep, false);
            }
        }

        self.reset_state();
        ptp_info!("ctrl: device reset");
    }

    fn clear_halt(&mut self, ep: EndpointAddress) {
        if self.bus.is_stalled(ep) {
            self.bus.set_stalled(ep, false);
            ptp_debug!("ctrl: cleared halt on {:#x}", u8::from(ep));
        }
    }

    fn transmit(bus: &B, ep: EndpointAddress, action: Action<'_>) -> Option<ResponseCode> {
        let (result, response) = match action {
            Action::SendChunk(bytes) => (bus.write(ep, bytes), None),
            Action::SendZeroLengthPacket => (bus.write(ep, &[]), None),
            Action::SendResponse {
                code,
                transaction_id,
            } => {
                let header =
                    container::encode(ContainerKind::Response, code.into(), transaction_id, 0);
                (bus.write(ep, &header), Some(code))
            }
            Action::Idle => return None,
        };

        if let Err(_e) = result {
            ptp_warn!("bulk IN write failed: {:?}", _e);
        }

        response
    }

    fn receive(&mut self) -> Option<usize> {
        match self.bus.read(self.config.bulk_out, &mut self.rx_buf) {
            Ok(n) => Some(n),
            Err(UsbError::WouldBlock) => None,
            Err(_e) => {
                ptp_warn!("bulk OUT read failed: {:?}", _e);
                None
            }
        }
    }

    fn emulate(&mut self, n: usize) {
        let Engine::Emulation(dispatcher) = &mut self.engine else {
            return;
        };

        let buf = &self.rx_buf[..n];
        let container = match container::decode(buf) {
            Ok(c) => c,
            Err(_e) => {
                ptp_debug!("rx: malformed container, {} bytes", n);
                return;
            }
        };

        ptp_trace!(
            "rx: {} {:?} op={:#x} tid={} params={}",
            container.layout.name(),
            container.kind,
            container.code,
            container.transaction_id,
            container.params.len()
        );
        self.last_rx_layout = Some(container.layout);

        let reply = dispatcher.handle(
            &container,
            container.payload(buf),
            &mut self.recorder,
            &mut self.status,
        );
        let last_code = dispatcher.last_code();

        let action = match reply {
            Reply::Data {
                code,
                transaction_id,
                payload,
            } => {
                self.status.status(status::data(code));
                self.stream.start(code, transaction_id, payload, true)
            }
            Reply::Response {
                code,
                transaction_id,
            } => self.stream.respond(code, transaction_id),
            Reply::None => Action::Idle,
        };

        if let Some(code) = Self::transmit(self.bus, self.config.bulk_in, action) {
            self.status.status(status::response(code.into(), last_code));
        }
    }

    fn proxy(&mut self, n: usize) {
        let Engine::Proxy(bridge) = &mut self.engine else {
            return;
        };

        ptp_trace!("rx: {} raw bytes", n);

        let action = bridge.on_bulk_out(&self.rx_buf[..n], &mut self.link);
        Self::transmit(self.bus, self.config.bulk_in, action);
    }
}

impl<B, R, S, L> UsbClass for PtpClass<'_, B, R, S, L>
where
    B: UsbBus,
    R: RecordingSink,
    S: StatusSink,
    L: FrameLink,
{
    fn reset(&mut self) {
        self.reset_state();
        self.last_rx_layout = None;
    }

    fn get_configuration_descriptors(&self, writer: &mut DescriptorWriter) -> Result<()> {
        writer.interface(
            2,
            still_image::CLASS,
            still_image::SUBCLASS,
            still_image::PROTOCOL,
            self.config.interface_string_index,
        )?;
        writer.endpoint(&EndpointDescriptor::bulk(
            self.config.bulk_out,
            self.config.max_packet_size,
        ))?;
        writer.endpoint(&EndpointDescriptor::bulk(
            self.config.bulk_in,
            self.config.max_packet_size,
        ))?;

        Ok(())
    }

    fn control_out(&mut self, req: &control::Request, data: &[u8]) -> ControlOutResult {
        match control_handler::control_out(req, data, self.config.interface_number) {
            ControlReply::Ack | ControlReply::Data(_) => ControlOutResult::Ok,
            ControlReply::Reset => {
                self.device_reset();
                ControlOutResult::Ok
            }
            ControlReply::ClearHalt(ep) => {
                self.clear_halt(ep);
                ControlOutResult::Ok
            }
            ControlReply::Ignore => ControlOutResult::Ignore,
        }
    }

    fn control_in(&mut self, req: &control::Request, data: &mut [u8]) -> ControlInResult {
        match control_handler::control_in(req, data, self.config.interface_number) {
            ControlReply::Data(n) => ControlInResult::Ok(n),
            ControlReply::Ack => ControlInResult::Ok(0),
            ControlReply::Reset => {
                self.device_reset();
                ControlInResult::Ok(0)
            }
            ControlReply::ClearHalt(ep) => {
                self.clear_halt(ep);
                ControlInResult::Ok(0)
            }
            ControlReply::Ignore => ControlInResult::Ignore,
        }
    }

    fn endpoint_out(&mut self, addr: EndpointAddress) {
        if !addr.same_endpoint(self.config.bulk_out) {
            return;
        }

        // reading re-arms the endpoint
        let Some(n) = self.receive() else {
            return;
        };

        match self.config.mode {
            Mode::CameraEmulation => self.emulate(n),
            Mode::RawProxy => self.proxy(n),
        }
    }

    fn endpoint_in_complete(&mut self, addr: EndpointAddress) {
        if !addr.same_endpoint(self.config.bulk_in) {
            return;
        }

        let last_code = match &self.engine {
            Engine::Emulation(d) => d.last_code(),
            Engine::Proxy(_) => 0,
        };

        let action = match &mut self.engine {
            Engine::Emulation(_) => self.stream.resume(),
            Engine::Proxy(bridge) => bridge.on_bulk_in_complete(&self.link),
        };

        if let Some(code) = Self::transmit(self.bus, self.config.bulk_in, action) {
            self.status.status(status::response(code.into(), last_code));
        }
    }

    fn get_string(&self, index: u8, lang_id: u16) -> Option<&str> {
        let _ = lang_id;

        if index == self.config.interface_string_index {
            Some(self.config.interface_string)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::descriptor_type;

    struct IdleBus;

    impl UsbBus for IdleBus {
        fn write(&self, _ep_addr: EndpointAddress, _buf: &[u8]) -> Result<usize> {
            Err(UsbError::WouldBlock)
        }

        fn read(&self, _ep_addr: EndpointAddress, _buf: &mut [u8]) -> Result<usize> {
            Err(UsbError::WouldBlock)
        }

        fn set_stalled(&self, _ep_addr: EndpointAddress, _stalled: bool) {}

        fn is_stalled(&self, _ep_addr: EndpointAddress) -> bool {
            false
        }
    }

    #[test]
    fn interface_descriptor() {
        let bus = IdleBus;
        let config = PtpConfig::default();
        let class: PtpClass<'_, IdleBus> =
            PtpClass::new(&bus, config, NullSink, NullSink, Disconnected);

        let mut buf = [0u8; 64];
        let mut writer = DescriptorWriter::new(&mut buf);
        class.get_configuration_descriptors(&mut writer).unwrap();

        assert_eq!(writer.num_interfaces(), 1);
        assert_eq!(
            writer.written(),
            &[
                9, descriptor_type::INTERFACE, 0, 0, 2, 0x06, 0x01, 0x01, 4,
                7, descriptor_type::ENDPOINT, 0x02, 0x02, 64, 0, 0,
                7, descriptor_type::ENDPOINT, 0x81, 0x02, 64, 0, 0,
            ]
        );
    }

    #[test]
    fn interface_string() {
        let bus = IdleBus;
        let class: PtpClass<'_, IdleBus> =
            PtpClass::new(&bus, PtpConfig::default(), NullSink, NullSink, Disconnected);

        assert_eq!(class.get_string(4, 0x0409), Some("PTP"));
        assert_eq!(class.get_string(5, 0x0409), None);
    }

    #[test]
    fn proxy_mode_state() {
        let bus = IdleBus;
        let config = PtpConfig {
            mode: Mode::RawProxy,
            ..PtpConfig::default()
        };
        let mut class: PtpClass<'_, IdleBus> =
            PtpClass::new(&bus, config, NullSink, NullSink, Disconnected);

        assert!(class.dispatcher().is_none());
        assert!(!class.tunnel_connected());

        // nothing to read
        class.endpoint_out(config.bulk_out);
        assert_eq!(class.queued_frames(), 0);
        assert_eq!(class.session_id(), 0);
    }
}

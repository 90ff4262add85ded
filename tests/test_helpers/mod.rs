#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use ptp_device::bus::UsbBus;
use ptp_device::class::UsbClass;
use ptp_device::container::{self, Layout};
use ptp_device::endpoint::{EndpointAddress, DEFAULT_BULK_IN, DEFAULT_BULK_OUT};
use ptp_device::events::{RecordingEvent, RecordingSink, StatusSink};
use ptp_device::ptp::ContainerKind;
use ptp_device::{Result, UsbError};

pub const BULK_IN: EndpointAddress = DEFAULT_BULK_IN;
pub const BULK_OUT: EndpointAddress = DEFAULT_BULK_OUT;

/// A bus that records every bulk IN transfer and hands out OUT transfers queued by the test.
#[derive(Default)]
pub struct TestBus {
    written: RefCell<VecDeque<Vec<u8>>>,
    received: RefCell<VecDeque<Vec<u8>>>,
    stalled: RefCell<Vec<u8>>,
}

impl TestBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a bulk OUT transfer from the host.
    pub fn host_sends(&self, data: &[u8]) {
        self.received.borrow_mut().push_back(data.to_vec());
    }

    /// Takes the oldest bulk IN transfer started by the class.
    pub fn next_written(&self) -> Option<Vec<u8>> {
        self.written.borrow_mut().pop_front()
    }

    pub fn pending_out(&self) -> usize {
        self.received.borrow().len()
    }

    pub fn stall(&self, ep_addr: EndpointAddress) {
        self.set_stalled(ep_addr, true);
    }
}

impl UsbBus for TestBus {
    fn write(&self, _ep_addr: EndpointAddress, buf: &[u8]) -> Result<usize> {
        self.written.borrow_mut().push_back(buf.to_vec());
        Ok(buf.len())
    }

    fn read(&self, _ep_addr: EndpointAddress, buf: &mut [u8]) -> Result<usize> {
        let data = self
            .received
            .borrow_mut()
            .pop_front()
            .ok_or(UsbError::WouldBlock)?;

        if data.len() > buf.len() {
            return Err(UsbError::BufferOverflow);
        }

        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }

    fn set_stalled(&self, ep_addr: EndpointAddress, stalled: bool) {
        let addr = u8::from(ep_addr);
        let mut eps = self.stalled.borrow_mut();

        eps.retain(|&a| a != addr);
        if stalled {
            eps.push(addr);
        }
    }

    fn is_stalled(&self, ep_addr: EndpointAddress) -> bool {
        self.stalled.borrow().contains(&u8::from(ep_addr))
    }
}

/// Delivers one OUT transfer to the class and completes every IN transfer it starts, in order,
/// until it goes quiet. Returns the IN transfers.
pub fn exchange<C: UsbClass>(bus: &TestBus, class: &mut C, data: &[u8]) -> Vec<Vec<u8>> {
    bus.host_sends(data);
    class.endpoint_out(BULK_OUT);
    drain(bus, class)
}

/// Completes IN transfers until the class starts no new one.
pub fn drain<C: UsbClass>(bus: &TestBus, class: &mut C) -> Vec<Vec<u8>> {
    let mut transfers = Vec::new();

    while let Some(transfer) = bus.next_written() {
        transfers.push(transfer);
        class.endpoint_in_complete(BULK_IN);
    }

    transfers
}

pub fn command(code: u16, transaction_id: u32, params: &[u32]) -> Vec<u8> {
    command_in(Layout::Standard, code, transaction_id, params)
}

pub fn command_in(layout: Layout, code: u16, transaction_id: u32, params: &[u32]) -> Vec<u8> {
    let mut buf = [0u8; 64];
    let n = container::encode_in_layout(
        layout,
        ContainerKind::Command,
        code,
        transaction_id,
        params,
        &mut buf,
    )
    .unwrap();

    buf[..n].to_vec()
}

pub fn data(code: u16, transaction_id: u32, payload: &[u8]) -> Vec<u8> {
    let mut buf = container::encode(ContainerKind::Data, code, transaction_id, payload.len()).to_vec();
    buf.extend_from_slice(payload);
    buf
}

/// A Standard Response header.
pub fn response(code: u16, transaction_id: u32) -> Vec<u8> {
    container::encode(ContainerKind::Response, code, transaction_id, 0).to_vec()
}

#[derive(Default)]
pub struct Recorder {
    pub events: Vec<RecordingEvent>,
}

impl RecordingSink for Recorder {
    fn publish(&mut self, event: RecordingEvent) {
        self.events.push(event);
    }
}

#[derive(Default)]
pub struct StatusLines {
    pub lines: Vec<String>,
}

impl StatusSink for StatusLines {
    fn status(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }
}

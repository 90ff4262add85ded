use crate::device::*;
use ptp_device::container::{self, Layout, HEADER_LEN};
use ptp_device::payloads;
use ptp_device::ptp::{request, ContainerKind};
use rand::prelude::*;
use rusb::{request_type, Direction, Recipient, RequestType};

pub type TestFn = fn(&mut DeviceHandles, &mut String) -> ();

macro_rules! tests {
    { $(fn $name:ident($dev:ident, $out:ident) $body:expr)* } => {
        pub fn get_tests() -> Vec<(&'static str, TestFn)> {
            let mut tests: Vec<(&'static str, TestFn)> = Vec::new();

            $(
                fn $name($dev: &mut DeviceHandles, $out: &mut String) {
                    $body
                }

                tests.push((stringify!($name), $name));
            )*

            tests
        }
    }
}

tests! {

fn device_status(dev, _out) {
    let mut response = [0u8; 4];

    assert_eq!(
        dev.read_control(
            request_type(Direction::In, RequestType::Class, Recipient::Interface),
            request::GET_DEVICE_STATUS, 0, dev.interface_index(),
            &mut response, TIMEOUT).expect("control read"),
        4);

    assert_eq!(response, [0x04, 0x00, 0x01, 0x20]);
}

fn extended_event_data(dev, _out) {
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(1..64);
    let mut response = vec![0xffu8; len];

    assert_eq!(
        dev.read_control(
            request_type(Direction::In, RequestType::Class, Recipient::Interface),
            request::GET_EXTENDED_EVENT_DATA, 0, dev.interface_index(),
            &mut response, TIMEOUT).expect("control read"),
        len);

    assert!(response.iter().all(|&b| b == 0));
}

fn device_info(dev, _out) {
    let tid = random_tid();
    send_command(dev, Layout::Standard, 0x1001, tid, &[]);

    let data = read_container(dev);
    assert_eq!(&data[..HEADER_LEN], &container::encode(ContainerKind::Data, 0x1001, tid, payloads::DEVICE_INFO.len()));
    assert_eq!(&data[HEADER_LEN..], &payloads::DEVICE_INFO[..]);

    expect_response(dev, 0x2001, tid);
}

fn open_close_session(dev, _out) {
    let tid = random_tid();
    send_command(dev, Layout::Standard, 0x1002, tid, &[1]);
    expect_response(dev, 0x2001, tid);

    send_command(dev, Layout::Standard, 0x1003, tid.wrapping_add(1), &[]);
    expect_response(dev, 0x2001, tid.wrapping_add(1));
}

fn padded_layouts(dev, _out) {
    for layout in [Layout::Pad8, Layout::Pad16, Layout::Pad24, Layout::Alternate] {
        let tid = random_tid();
        send_command(dev, layout, 0x1004, tid, &[]);

        let data = read_container(dev);
        assert_eq!(&data[HEADER_LEN..], &payloads::STORAGE_IDS[..], "{}", layout.name());

        expect_response(dev, 0x2001, tid);
    }
}

fn long_payload(dev, out) {
    let tid = random_tid();
    send_command(dev, Layout::Standard, 0x9209, tid, &[]);

    let data = read_container(dev);
    assert_eq!(&data[HEADER_LEN..], &payloads::VENDOR_9209[..]);

    expect_response(dev, 0x2001, tid);

    use std::fmt::Write;
    writeln!(out, "  {} bytes in packets of {}", data.len(), dev.bulk_max_packet_size).expect("write failed");
}

fn unsupported_operation(dev, _out) {
    let tid = random_tid();
    send_command(dev, Layout::Standard, 0x100c, tid, &[]);
    expect_response(dev, 0x2005, tid);
}

fn device_reset(dev, _out) {
    dev.write_control(
        request_type(Direction::Out, RequestType::Class, Recipient::Interface),
        request::DEVICE_RESET, 0, dev.interface_index(),
        &[], TIMEOUT).expect("control write");

    let tid = random_tid();
    send_command(dev, Layout::Standard, 0x1002, tid, &[1]);
    expect_response(dev, 0x2001, tid);
}

}

fn random_tid() -> u32 {
    rand::thread_rng().gen_range(1..0x1000_0000)
}

fn send_command(dev: &DeviceHandles, layout: Layout, code: u16, tid: u32, params: &[u32]) {
    let mut buf = [0u8; 64];
    let n = container::encode_in_layout(layout, ContainerKind::Command, code, tid, params, &mut buf)
        .expect("encode command");

    assert_eq!(dev.write_bulk(dev.bulk_out, &buf[..n], TIMEOUT).expect("bulk write"), n);
}

/// Reads one container, following its length field across transfers.
fn read_container(dev: &DeviceHandles) -> Vec<u8> {
    let mut data = Vec::new();
    let mut buf = [0u8; 512];

    loop {
        let n = dev.read_bulk(dev.bulk_in, &mut buf, TIMEOUT).expect("bulk read");
        data.extend_from_slice(&buf[..n]);

        if data.len() >= 4 {
            let total = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
            if data.len() >= total {
                break;
            }
        }
    }

    // a data phase that fills whole packets is followed by a zero-length packet
    if data.len() % usize::from(dev.bulk_max_packet_size) == 0 {
        let n = dev.read_bulk(dev.bulk_in, &mut buf, TIMEOUT).expect("zero-length packet");
        assert_eq!(n, 0);
    }

    data
}

fn expect_response(dev: &DeviceHandles, code: u16, tid: u32) {
    let mut buf = [0u8; 64];
    let n = dev.read_bulk(dev.bulk_in, &mut buf, TIMEOUT).expect("bulk read");

    assert_eq!(&buf[..n], &container::encode(ContainerKind::Response, code, tid, 0));
}

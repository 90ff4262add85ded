use ptp_device::descriptor::still_image;
use rusb::{Context, DeviceHandle, Direction, TransferType, UsbContext as _};
use std::time::Duration;

pub const TIMEOUT: Duration = Duration::from_secs(1);

pub struct DeviceHandles {
    pub handle: DeviceHandle<Context>,
    pub interface_number: u8,
    pub bulk_in: u8,
    pub bulk_out: u8,
    pub bulk_max_packet_size: u16,
}

impl DeviceHandles {
    /// Index to put in wIndex of a class request addressed to the still-image interface.
    pub fn interface_index(&self) -> u16 {
        u16::from(self.interface_number)
    }
}

impl ::std::ops::Deref for DeviceHandles {
    type Target = DeviceHandle<Context>;

    fn deref(&self) -> &DeviceHandle<Context> {
        &self.handle
    }
}

impl ::std::ops::DerefMut for DeviceHandles {
    fn deref_mut(&mut self) -> &mut DeviceHandle<Context> {
        &mut self.handle
    }
}

/// Opens the first device exposing a still-image interface with a bulk endpoint pair.
pub fn open_device(ctx: &Context) -> rusb::Result<DeviceHandles> {
    for device in ctx.devices()?.iter() {
        let Ok(config_descriptor) = device.active_config_descriptor() else {
            continue;
        };

        for interface in config_descriptor.interfaces() {
            for desc in interface.descriptors() {
                if !(desc.class_code() == still_image::CLASS
                    && desc.sub_class_code() == still_image::SUBCLASS
                    && desc.protocol_code() == still_image::PROTOCOL)
                {
                    continue;
                }

                let bulk = |dir| {
                    desc.endpoint_descriptors().find(|ep| {
                        ep.transfer_type() == TransferType::Bulk && ep.direction() == dir
                    })
                };

                let (Some(ep_in), Some(ep_out)) = (bulk(Direction::In), bulk(Direction::Out))
                else {
                    continue;
                };

                let handle = device.open()?;
                let _ = handle.set_auto_detach_kernel_driver(true);
                handle.claim_interface(desc.interface_number())?;

                return Ok(DeviceHandles {
                    handle,
                    interface_number: desc.interface_number(),
                    bulk_in: ep_in.address(),
                    bulk_out: ep_out.address(),
                    bulk_max_packet_size: ep_in.max_packet_size(),
                });
            }
        }
    }

    Err(rusb::Error::NoDevice)
}

//! USB HID composite device - pointer + keyboard + joystick.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral and exposes three HID endpoints.

use defmt::{info, warn};
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Config, UsbDevice};
use lightgun::config;
use lightgun::hid::joystick::JOYSTICK_REPORT_DESCRIPTOR;
use lightgun::hid::keyboard::KEYBOARD_REPORT_DESCRIPTOR;
use lightgun::hid::pointer::POINTER_REPORT_DESCRIPTOR;
use lightgun::hid::{HidReport, MAX_REPORT_SIZE};
use lightgun::Error;
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;

/// Depth of the gun→USB report channel.
pub const REPORT_CHANNEL_DEPTH: usize = 16;

static POINTER_STATE: StaticCell<State> = StaticCell::new();
static KB_STATE: StaticCell<State> = StaticCell::new();
static JOYSTICK_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// Build result containing the USB device runner and the three HID writers.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub pointer_writer: HidWriter<'static, UsbDriver, 8>,
    pub keyboard_writer: HidWriter<'static, UsbDriver, 8>,
    pub joystick_writer: HidWriter<'static, UsbDriver, 16>,
}

fn hid_config(report_descriptor: &'static [u8], max_packet_size: u16) -> HidConfig<'static> {
    HidConfig {
        report_descriptor,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size,
    }
}

/// Initialise the USB stack and create the composite HID device.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbHidDevice {
    // Create the low-level USB driver with hardware VBUS detection.
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA, the GunCon is powered from the same rail
    usb_config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        usb_config,
        USB_CONFIG_DESC.init([0u8; 256]),
        USB_BOS_DESC.init([0u8; 256]),
        USB_MSOS_DESC.init([0u8; 256]),
        USB_CTRL_BUF.init([0u8; 128]),
    );

    let pointer_writer = HidWriter::new(
        &mut builder,
        POINTER_STATE.init(State::new()),
        hid_config(POINTER_REPORT_DESCRIPTOR, 8),
    );
    let keyboard_writer = HidWriter::new(
        &mut builder,
        KB_STATE.init(State::new()),
        hid_config(KEYBOARD_REPORT_DESCRIPTOR, 8),
    );
    let joystick_writer = HidWriter::new(
        &mut builder,
        JOYSTICK_STATE.init(State::new()),
        hid_config(JOYSTICK_REPORT_DESCRIPTOR, 16),
    );

    let device = builder.build();

    info!("USB HID composite device initialised (pointer + keyboard + joystick)");

    UsbHidDevice {
        device,
        pointer_writer,
        keyboard_writer,
        joystick_writer,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

/// HID report forwarding task - reads from the gun→USB channel and
/// writes to the matching USB HID endpoint.
///
/// While the endpoint is disabled (not yet configured, or suspended) the
/// report is held until the host is back, so a release is never lost.
pub async fn hid_writer_task(
    mut pointer: HidWriter<'static, UsbDriver, 8>,
    mut keyboard: HidWriter<'static, UsbDriver, 8>,
    mut joystick: HidWriter<'static, UsbDriver, 16>,
    report_rx: Receiver<'static, CriticalSectionRawMutex, HidReport, REPORT_CHANNEL_DEPTH>,
) -> ! {
    info!("HID writer task started - waiting for reports");

    let mut buf = [0u8; MAX_REPORT_SIZE];

    loop {
        let report = report_rx.receive().await;
        let n = report.serialize(&mut buf);

        let result = match report {
            HidReport::Pointer(_) => write_report(&mut pointer, &buf[..n]).await,
            HidReport::Keyboard(_) => write_report(&mut keyboard, &buf[..n]).await,
            HidReport::Joystick(_) => write_report(&mut joystick, &buf[..n]).await,
        };
        if result.is_err() {
            warn!("USB write failed: {}", Error::Usb);
        }
    }
}

async fn write_report<const N: usize>(
    writer: &mut HidWriter<'static, UsbDriver, N>,
    report: &[u8],
) -> Result<(), EndpointError> {
    match writer.write(report).await {
        Err(EndpointError::Disabled) => {
            writer.ready().await;
            writer.write(report).await
        }
        other => other,
    }
}

//! lightgun firmware - GunCon to USB HID bridge for nRF52840.
//!
//! Polls a PlayStation GunCon over the PSX bus, runs the light-gun state
//! machines from the `lightgun` library, and forwards the resulting
//! pointer, keyboard and joystick reports to the host over USB.
//!
//! Task layout:
//!
//! - `gun_task`: fixed-period poll loop, owns the controller link
//! - `usb_task`: USB device stack (enumeration, suspend, endpoints)
//! - `hid_task`: drains the report channel into the HID endpoints

#![no_std]
#![no_main]

mod link;
mod usb;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_nrf::gpio::Pin;
use embassy_nrf::peripherals;
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender, TrySendError};
use embassy_time::{Duration, Instant, Ticker, Timer};
use embassy_usb::class::hid::HidWriter;
use embassy_usb::UsbDevice;
use lightgun::config::POLL_PERIOD_US;
use lightgun::hid::{HidReport, ReportSink};
use lightgun::{Axis, Cycle, Error, LightGun, OutputButton, OutputMode, OutputSink, Tuning};
use {defmt_rtt as _, panic_probe as _};

use crate::link::PsxLink;
use crate::usb::hid_device::{self, REPORT_CHANNEL_DEPTH};

type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;
type ReportChannel = Channel<CriticalSectionRawMutex, HidReport, REPORT_CHANNEL_DEPTH>;

static REPORT_CHANNEL: ReportChannel = Channel::new();

/// [`ReportSink`] whose flush hands the changed reports to the USB writer.
struct ChannelSink {
    reports: ReportSink,
    tx: Sender<'static, CriticalSectionRawMutex, HidReport, REPORT_CHANNEL_DEPTH>,
}

impl OutputSink for ChannelSink {
    fn move_pointer(&mut self, x: u16, y: u16) {
        self.reports.move_pointer(x, y);
    }

    fn press_button(&mut self, button: OutputButton) {
        self.reports.press_button(button);
    }

    fn release_button(&mut self, button: OutputButton) {
        self.reports.release_button(button);
    }

    fn press_key(&mut self, key: u8) {
        self.reports.press_key(key);
    }

    fn release_key(&mut self, key: u8) {
        self.reports.release_key(key);
    }

    fn set_axis(&mut self, axis: Axis, value: u16) {
        self.reports.set_axis(axis, value);
    }

    fn flush(&mut self) {
        self.reports.flush();
        for report in self.reports.take_reports() {
            // Never block the poll loop; a report that does not fit is
            // re-sent by a later flush.
            if let Err(TrySendError::Full(report)) = self.tx.try_send(report) {
                warn!("{}", Error::ReportChannelFull);
                self.reports.requeue(report);
            }
        }
    }

    fn select_mode(&mut self, mode: OutputMode) {
        self.reports.select_mode(mode);
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("lightgun starting");

    let p = embassy_nrf::init(Default::default());

    let usb = hid_device::init(p.USBD);
    spawner.must_spawn(usb_task(usb.device));
    spawner.must_spawn(hid_task(
        usb.pointer_writer,
        usb.keyboard_writer,
        usb.joystick_writer,
    ));

    let link = PsxLink::new(
        p.SPI3,
        p.P0_13.degrade(),
        p.P0_15.degrade(),
        p.P0_14.degrade(),
        p.P0_16.degrade(),
    );
    spawner.must_spawn(gun_task(link));
}

#[embassy_executor::task]
async fn usb_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn hid_task(
    pointer: HidWriter<'static, UsbDriver, 8>,
    keyboard: HidWriter<'static, UsbDriver, 8>,
    joystick: HidWriter<'static, UsbDriver, 16>,
) -> ! {
    hid_device::hid_writer_task(pointer, keyboard, joystick, REPORT_CHANNEL.receiver()).await
}

#[embassy_executor::task]
async fn gun_task(mut link: PsxLink<'static>) -> ! {
    let tuning = Tuning::default();
    let mut gun: LightGun = match LightGun::new(tuning) {
        Ok(gun) => gun,
        Err(e) => defmt::panic!("Gun: {}", e),
    };
    let mut sink = ChannelSink {
        reports: ReportSink::new(),
        tx: REPORT_CHANNEL.sender(),
    };

    info!("Gun: waiting for controller (trigger = pointer, A = joystick)");

    let mut ticker = Ticker::every(Duration::from_micros(POLL_PERIOD_US));
    let mut last = Cycle::Disconnected;
    loop {
        let now = Instant::now().as_micros();
        let outcome = gun.cycle(now, &mut link, &mut sink);

        if outcome != last {
            info!("Gun: {}", outcome);
            last = outcome;
        }

        if outcome == Cycle::Disabled {
            // Let go of all three buttons before the next read.
            Timer::after_millis(tuning.disable_pause_ms).await;
            ticker.reset();
            continue;
        }

        ticker.next().await;
    }
}

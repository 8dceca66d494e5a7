//! PlayStation controller bus link.
//!
//! The GunCon talks the PSX pad protocol: synchronous serial, LSB first,
//! clock idle high, sampled on the rising edge (SPI mode 3), framed by
//! the active-low ATT line.  SPIM3 drives CLK/CMD/DATA and ATT is a
//! plain GPIO.  One poll is a single 9-byte exchange.
//!
//! The exchange is short (about 300 µs at 250 kHz) and runs with
//! interrupts masked so a USB interrupt cannot stretch a byte gap past
//! what the gun tolerates.

use defmt::{debug, warn};
use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive};
use embassy_nrf::spim::{self, BitOrder, Frequency, Spim, MODE_3};
use embassy_nrf::{bind_interrupts, peripherals, Peripheral};
use lightgun::controller::{decode_frame, FrameState, PSX_FRAME_LEN, PSX_POLL_COMMAND};
use lightgun::error::TransportError;
use lightgun::{Button, Controller, Error, LightStatus};

bind_interrupts!(struct Irqs {
    SPIM3 => spim::InterruptHandler<peripherals::SPI3>;
});

pub struct PsxLink<'d> {
    spim: Spim<'d, peripherals::SPI3>,
    att: Output<'d>,
    state: FrameState,
}

impl<'d> PsxLink<'d> {
    pub fn new(
        spi: impl Peripheral<P = peripherals::SPI3> + 'd,
        clk: AnyPin,
        data: AnyPin,
        cmd: AnyPin,
        att: AnyPin,
    ) -> Self {
        let mut config = spim::Config::default();
        config.frequency = Frequency::K250;
        config.mode = MODE_3;
        config.bit_order = BitOrder::LSB_FIRST;
        // CMD idles high between bytes.
        config.orc = 0xFF;

        Self {
            spim: Spim::new(spi, Irqs, clk, data, cmd, config),
            att: Output::new(att, Level::High, OutputDrive::Standard),
            state: FrameState::new(),
        }
    }

    /// One full poll exchange.
    fn exchange(&mut self) -> Result<(), Error> {
        let tx = PSX_POLL_COMMAND;
        let mut rx = [0u8; PSX_FRAME_LEN];

        let result = cortex_m::interrupt::free(|_| {
            self.att.set_low();
            let r = self.spim.blocking_transfer(&mut rx, &tx);
            self.att.set_high();
            r
        });
        if result.is_err() {
            return Err(TransportError::Bus.into());
        }

        let frame = decode_frame(&rx)?;
        self.state.push(frame);
        Ok(())
    }
}

impl Controller for PsxLink<'_> {
    fn connect(&mut self) -> bool {
        match self.exchange() {
            Ok(()) => {
                if let Some(frame) = self.state.frame() {
                    debug!("PSX: device {} answered", frame.device);
                }
                true
            }
            Err(_) => {
                self.state.clear();
                false
            }
        }
    }

    fn poll(&mut self) -> bool {
        match self.exchange() {
            Ok(()) => true,
            Err(e) => {
                warn!("PSX: poll failed: {}", e);
                self.state.clear();
                false
            }
        }
    }

    fn button_pressed(&self, button: Button) -> bool {
        self.state.pressed(button)
    }

    fn button_just_pressed(&self, button: Button) -> bool {
        self.state.just_pressed(button)
    }

    fn button_just_released(&self, button: Button) -> bool {
        self.state.just_released(button)
    }

    fn light_status(&self) -> LightStatus {
        self.state.light()
    }

    fn analog_stick(&self) -> (u8, u8) {
        self.state.stick()
    }
}

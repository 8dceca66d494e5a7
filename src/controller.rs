//! Input side of the bridge: the light-gun controller.
//!
//! [`Controller`] is what the orchestrator polls once per cycle.  The
//! firmware implements it over the PlayStation controller bus; the frame
//! decoding for that bus lives here so it can be tested on the host.
//!
//! PSX poll exchange (9 bytes, LSB first):
//! ```text
//! TX: 01 42 00 00 00 00 00 00 00
//! RX: FF ID 5A B0 B1 D0 D1 D2 D3
//!
//! ID   0x63 = GunCon, 0x41 = digital pad, 0x73 = analog pad
//! B0/1 button bitfield, active low (bit 3 START, bit 13 CIRCLE, bit 14 CROSS)
//! D0-3 GunCon: X (LE u16), Y (LE u16)
//!      analog pad: RX, RY, LX, LY
//! ```

use crate::error::TransportError;

/// Logical controller buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Trigger,
    A,
    B,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::Trigger, Button::A, Button::B];

    /// Bit in the PSX button word, as the GunCon reports it.
    pub const fn psx_mask(self) -> u16 {
        match self {
            Button::Trigger => 1 << 13,
            Button::A => 1 << 3,
            Button::B => 1 << 14,
        }
    }
}

/// Sensor result for the last poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightStatus {
    Ok { x: u16, y: u16 },
    NoLight,
    Error,
}

/// Input collaborator polled by the orchestrator.
pub trait Controller {
    /// Try to (re)establish the link. `true` once a supported device answers.
    fn connect(&mut self) -> bool;
    /// Read one frame. `false` means the device is gone.
    fn poll(&mut self) -> bool;
    fn button_pressed(&self, button: Button) -> bool;
    fn button_just_pressed(&self, button: Button) -> bool;
    fn button_just_released(&self, button: Button) -> bool;
    fn light_status(&self) -> LightStatus;
    /// Analog stick `(x, y)`, 0..=255, centred at 128.
    fn analog_stick(&self) -> (u8, u8);
}

// PSX protocol

pub const PSX_FRAME_LEN: usize = 9;
pub const PSX_POLL_COMMAND: [u8; PSX_FRAME_LEN] = [0x01, 0x42, 0, 0, 0, 0, 0, 0, 0];

const READY_MARKER: u8 = 0x5A;
const ID_GUNCON: u8 = 0x63;
const ID_DIGITAL: u8 = 0x41;
const ID_ANALOG: u8 = 0x73;

/// GunCon's "saw no light" coordinate code.
const GUNCON_NO_LIGHT: (u16, u16) = (0x0001, 0x000A);
/// GunCon's "unexpected light / scan error" coordinate code.
const GUNCON_ERROR: (u16, u16) = (0x0000, 0x0005);

const STICK_CENTER: (u8, u8) = (0x80, 0x80);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceKind {
    GunCon,
    DigitalPad,
    AnalogPad,
}

/// One decoded poll frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub device: DeviceKind,
    /// Button word, active high (already inverted).
    pub buttons: u16,
    pub light: LightStatus,
    pub stick: (u8, u8),
}

impl Frame {
    pub fn pressed(&self, button: Button) -> bool {
        self.buttons & button.psx_mask() != 0
    }
}

/// Decode the response to [`PSX_POLL_COMMAND`].
pub fn decode_frame(rx: &[u8]) -> Result<Frame, TransportError> {
    if rx.len() < 5 {
        return Err(TransportError::ShortFrame);
    }
    if rx[2] != READY_MARKER {
        return Err(TransportError::BadHeader);
    }
    let device = match rx[1] {
        ID_GUNCON => DeviceKind::GunCon,
        ID_DIGITAL => DeviceKind::DigitalPad,
        ID_ANALOG => DeviceKind::AnalogPad,
        other => return Err(TransportError::UnsupportedDevice(other)),
    };
    let buttons = !u16::from_le_bytes([rx[3], rx[4]]);

    let (light, stick) = match device {
        DeviceKind::DigitalPad => (LightStatus::Error, STICK_CENTER),
        DeviceKind::GunCon | DeviceKind::AnalogPad => {
            if rx.len() < PSX_FRAME_LEN {
                return Err(TransportError::ShortFrame);
            }
            if device == DeviceKind::GunCon {
                let x = u16::from_le_bytes([rx[5], rx[6]]);
                let y = u16::from_le_bytes([rx[7], rx[8]]);
                (classify_light(x, y), STICK_CENTER)
            } else {
                // Right stick carries the aim on analog pads.
                (LightStatus::Error, (rx[5], rx[6]))
            }
        }
    };

    Ok(Frame {
        device,
        buttons,
        light,
        stick,
    })
}

fn classify_light(x: u16, y: u16) -> LightStatus {
    match (x, y) {
        GUNCON_NO_LIGHT => LightStatus::NoLight,
        GUNCON_ERROR => LightStatus::Error,
        _ => LightStatus::Ok { x, y },
    }
}

/// Edge tracking over successive frames, shared by bus implementations.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameState {
    current: Option<Frame>,
    previous_buttons: u16,
}

impl FrameState {
    pub const fn new() -> Self {
        Self {
            current: None,
            previous_buttons: 0,
        }
    }

    /// Fold in a newly decoded frame.
    pub fn push(&mut self, frame: Frame) {
        self.previous_buttons = self.current.map_or(0, |f| f.buttons);
        self.current = Some(frame);
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.current.as_ref()
    }

    pub fn pressed(&self, button: Button) -> bool {
        self.current.is_some_and(|f| f.pressed(button))
    }

    pub fn just_pressed(&self, button: Button) -> bool {
        self.pressed(button) && self.previous_buttons & button.psx_mask() == 0
    }

    pub fn just_released(&self, button: Button) -> bool {
        !self.pressed(button) && self.previous_buttons & button.psx_mask() != 0
    }

    pub fn light(&self) -> LightStatus {
        self.current.map_or(LightStatus::Error, |f| f.light)
    }

    pub fn stick(&self) -> (u8, u8) {
        self.current.map_or(STICK_CENTER, |f| f.stick)
    }
}

//! Light-gun timing and state-machine core for lightgun.
//!
//! Everything between a raw controller poll and a USB HID report lives
//! here and runs on the host as well as on the nRF52840:
//!
//! - [`queue`]: bounded, drop-oldest queue of buffered primary clicks
//! - [`trigger`]: trigger debounce, auxiliary-key pulse, click scheduling
//! - [`light`]: light acquisition and hold-XY across sensor dropout
//! - [`calibration`]: observed coordinate bounds with press-count lock
//! - [`combo`]: "hold A+B" infinite-hold toggle
//! - [`normalize`]: raw coordinate → full-scale axis value
//! - [`gun`]: the poll-driven orchestrator tying it together
//!
//! Usage: `cargo test --lib`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main].
//! It implements [`controller::Controller`] over the PSX bus and forwards
//! [`hid::ReportSink`] output to the USB HID endpoints.

#![cfg_attr(not(test), no_std)]

pub mod calibration;
pub mod combo;
pub mod config;
pub mod controller;
pub mod error;
pub mod gun;
pub mod hid;
pub mod light;
pub mod normalize;
pub mod queue;
pub mod sink;
pub mod time;
pub mod trigger;

pub use config::Tuning;
pub use controller::{Button, Controller, LightStatus};
pub use error::Error;
pub use gun::{Cycle, LightGun, ModeFlags};
pub use sink::{Axis, OutputButton, OutputMode, OutputSink};

//! Unified error type for lightgun.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Derives `defmt::Format` when the `defmt` feature is on, for
//! efficient on-target logging.

use core::fmt;

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Controller
    /// The controller bus returned an unusable frame.
    Transport(TransportError),

    // Configuration
    /// A tuning value the state machines cannot honour.
    InvalidTuning(TuningError),

    // USB
    /// USB stack returned an error.
    Usb,

    /// The report channel to the USB writer task was full.
    ReportChannelFull,
}

/// Controller frame faults. Any of these means "treat as disconnected".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The bus transfer itself failed.
    Bus,
    /// Fewer bytes than the device ID announces.
    ShortFrame,
    /// The `0x5A` ready marker was missing.
    BadHeader,
    /// The device ID is not a GunCon or a pad we understand.
    UnsupportedDevice(u8),
}

/// Rejected [`Tuning`](crate::config::Tuning) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TuningError {
    ZeroDebounce,
    ZeroCoordinatePeriod,
    ZeroLockThreshold,
    EmptySensorWindow,
    OffscreenOutOfRange,
}

// Convenience conversions

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl From<TuningError> for Error {
    fn from(e: TuningError) -> Self {
        Error::InvalidTuning(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "controller transport: {}", e),
            Error::InvalidTuning(e) => write!(f, "invalid tuning: {}", e),
            Error::Usb => f.write_str("usb stack error"),
            Error::ReportChannelFull => f.write_str("report channel full"),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Bus => f.write_str("bus transfer failed"),
            TransportError::ShortFrame => f.write_str("short frame"),
            TransportError::BadHeader => f.write_str("missing ready marker"),
            TransportError::UnsupportedDevice(id) => write!(f, "unsupported device id {:#04x}", id),
        }
    }
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            TuningError::ZeroDebounce => "debounce interval must be non-zero",
            TuningError::ZeroCoordinatePeriod => "coordinate period must be non-zero",
            TuningError::ZeroLockThreshold => "calibration lock threshold must be non-zero",
            TuningError::EmptySensorWindow => "sensor window is empty",
            TuningError::OffscreenOutOfRange => "off-screen position exceeds output range",
        };
        f.write_str(msg)
    }
}

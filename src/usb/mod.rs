//! USB Device subsystem - presents a composite HID device to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`.  We create a **composite device** with three HID
//! interfaces:
//!
//! - Interface 0: Pointer  (absolute X/Y, three buttons)
//! - Interface 1: Keyboard (boot protocol, carries the shot key pulse)
//! - Interface 2: Joystick (X/Y/Rx/Ry, three buttons)
//!
//! The writer task reads HID reports from the gun→USB channel and writes
//! them to the matching HID endpoint.

pub mod hid_device;

//! In-process TR3 reader emulator.
//!
//! Speaks the reader side of the wire protocol over real TCP so clients
//! can be exercised end to end without hardware. The emulator consumes
//! the same codec and parser as the client; it is a test double with
//! canned replies, not a faithful reader model.

pub mod device;
pub mod responder;

pub use device::{DeviceEmulator, EmulatorHandle};
pub use responder::{build_replies, default_tags, ROM_IDENT};

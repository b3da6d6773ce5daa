//! Transaction client for TR3 LAN readers.
//!
//! This is the "one command, one reply" layer. A [`Tr3Client`] owns at
//! most one TCP connection to a reader; [`transact`](Tr3Client::transact)
//! writes an encoded command frame and assembles exactly one response
//! frame under a timeout/retry policy, serialized across threads.
//! [`receive_only`](Tr3Client::receive_only) collects follow-up frames a
//! reader sends after an initiating command, such as tag reports after an
//! inventory acknowledgment.

pub mod client;
pub mod error;
pub mod reply;

pub use client::{Tr3Client, DEFAULT_TIMEOUT};
pub use error::{ClientError, Result};
pub use reply::Reply;

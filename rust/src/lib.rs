//! tracking-id: process-local generator of time-ordered 12-byte identifiers.
//!
//! Identifiers follow the ObjectId layout and render as 24 uppercase hex
//! characters. They are unique across threads of one process and, with high
//! probability, across processes and machines without coordination.
//!
//! # Format
//!
//! ```text
//! TIMESTAMP(4) MACHINE(3) PROCESS(2) COUNTER(3)
//! ```
//!
//! # Example
//!
//! ```
//! let id = tracking_id::generate_id();
//! assert_eq!(id.len(), 24);
//! assert!(tracking_id::validate_tracking_id(&id));
//! println!("{}", id); // e.g., "6710C4F2A3F91C5E2B0C91D4"
//! ```

mod async_api;
mod fingerprint;
mod generator;
mod host;
mod id;

pub use async_api::{async_id_stream, async_next_id};
pub use fingerprint::{Fingerprint, FingerprintSource, Origin, string_hash};
pub use generator::{Generator, generate_id, init, try_generate_id};
pub use host::{Clock, HostEnvironment, SystemClock, SystemHost};
pub use id::{
    HEX_LEN, ID_LEN, ParsedTrackingId, TrackingId, TrackingIdError, parse_tracking_id,
    validate_tracking_id,
};

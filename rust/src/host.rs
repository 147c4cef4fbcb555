//! Read interfaces to the host: wall clock, network interfaces, process
//! identity and the secure random source.

use chrono::{DateTime, Utc};
use mac_address::MacAddressIterator;

use crate::id::TrackingIdError;

/// Provides the current time.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Host lookups consumed once while deriving fingerprints.
///
/// `None` from a lookup selects the random fallback; only the random source
/// itself may fail.
pub trait HostEnvironment: Send + Sync {
    /// Hardware addresses of every enumerable network interface.
    fn hardware_addresses(&self) -> Option<Vec<[u8; 6]>>;

    /// A string identifying this process, `"<pid>@<hostname>"`.
    fn process_identity(&self) -> Option<String>;

    /// A value from a cryptographically secure random source.
    fn random_u32(&self) -> Result<u32, TrackingIdError>;
}

/// The live host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostEnvironment for SystemHost {
    fn hardware_addresses(&self) -> Option<Vec<[u8; 6]>> {
        match MacAddressIterator::new() {
            Ok(iter) => Some(iter.map(|mac| mac.bytes()).collect()),
            Err(e) => {
                tracing::debug!(error = %e, "network interface enumeration failed");
                None
            }
        }
    }

    fn process_identity(&self) -> Option<String> {
        let host = gethostname::gethostname().into_string().ok()?;
        if host.is_empty() {
            return None;
        }
        Some(format!("{}@{}", std::process::id(), host))
    }

    fn random_u32(&self) -> Result<u32, TrackingIdError> {
        getrandom::u32().map_err(TrackingIdError::Entropy)
    }
}

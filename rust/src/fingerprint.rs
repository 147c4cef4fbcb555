//! Machine and process fingerprints.
//!
//! Both are derived once per process from host lookups and fall back to the
//! secure random source when a lookup yields nothing.

use std::fmt::Write;

use sha2::{Digest, Sha256};

use crate::host::HostEnvironment;
use crate::id::{MASK_24, TrackingIdError};

/// Where a fingerprint field came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Derived from the host lookup.
    Host,
    /// Substituted from the secure random source.
    Random,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Random => "random",
        }
    }
}

/// Per-field origin of a [`Fingerprint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintSource {
    pub machine: Origin,
    pub process: Origin,
}

/// The fixed fields shared by every identifier of one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    /// 24-bit machine fingerprint.
    pub machine: u32,
    /// 16-bit process fingerprint.
    pub process: u16,
    pub source: FingerprintSource,
}

impl Fingerprint {
    /// Fingerprint with explicit values; both fields count as host-derived.
    pub fn new(machine: u32, process: u16) -> Self {
        Self {
            machine: machine & MASK_24,
            process,
            source: FingerprintSource {
                machine: Origin::Host,
                process: Origin::Host,
            },
        }
    }

    /// Derive both fingerprints from the host.
    pub fn from_host(host: &dyn HostEnvironment) -> Result<Self, TrackingIdError> {
        let (machine, machine_origin) = machine_fingerprint(host)?;
        let (process, process_origin) = process_fingerprint(host)?;
        Ok(Self {
            machine,
            process,
            source: FingerprintSource {
                machine: machine_origin,
                process: process_origin,
            },
        })
    }
}

/// Stable string hash: the first four bytes of the SHA-256 digest.
pub fn string_hash(s: &str) -> u32 {
    let digest = Sha256::digest(s.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Uppercase hex of every non-zero hardware address, concatenated.
fn hardware_key(addresses: &[[u8; 6]]) -> String {
    let mut key = String::with_capacity(addresses.len() * 12);
    for mac in addresses.iter().filter(|mac| mac.iter().any(|&b| b != 0)) {
        for b in mac {
            let _ = write!(key, "{:02X}", b);
        }
    }
    key
}

/// 24-bit machine fingerprint from the hardware addresses of all interfaces.
pub fn machine_fingerprint(host: &dyn HostEnvironment) -> Result<(u32, Origin), TrackingIdError> {
    let key = host
        .hardware_addresses()
        .map(|addresses| hardware_key(&addresses))
        .filter(|key| !key.is_empty());

    match key {
        Some(key) => Ok((string_hash(&key) & MASK_24, Origin::Host)),
        None => {
            tracing::debug!("no hardware address available, using random machine fingerprint");
            Ok((host.random_u32()? & MASK_24, Origin::Random))
        }
    }
}

/// 16-bit process fingerprint from the process identity string.
pub fn process_fingerprint(host: &dyn HostEnvironment) -> Result<(u16, Origin), TrackingIdError> {
    match host.process_identity() {
        Some(identity) => Ok(((string_hash(&identity) & 0xFFFF) as u16, Origin::Host)),
        None => {
            tracing::debug!("process identity unavailable, using random process fingerprint");
            Ok(((host.random_u32()? & 0xFFFF) as u16, Origin::Random))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::stub::StubHost;

    const MAC_A: [u8; 6] = [0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E];
    const MAC_B: [u8; 6] = [0xF0, 0x0D, 0xBE, 0xEF, 0x00, 0x01];

    #[test]
    fn test_string_hash_is_stable() {
        // SHA-256("abc") = ba7816bf...
        assert_eq!(string_hash("abc"), 0xBA78_16BF);
        assert_eq!(string_hash("1234@host"), string_hash("1234@host"));
        assert_ne!(string_hash("1234@host"), string_hash("1235@host"));
    }

    #[test]
    fn test_hardware_key_skips_zero_addresses() {
        let key = hardware_key(&[[0; 6], MAC_A, MAC_B]);
        assert_eq!(key, "001A2B3C4D5EF00DBEEF0001");
    }

    #[test]
    fn test_machine_from_hardware() {
        let host = StubHost::new(Some(vec![MAC_A, MAC_B]), None, Ok(0xFFFF_FFFF));
        let (machine, origin) = machine_fingerprint(&host).unwrap();
        assert_eq!(origin, Origin::Host);
        assert_eq!(machine, string_hash("001A2B3C4D5EF00DBEEF0001") & MASK_24);
        assert!(machine <= MASK_24);
        assert_eq!(host.random_calls(), 0);
    }

    #[test]
    fn test_machine_falls_back_when_enumeration_fails() {
        let host = StubHost::new(None, None, Ok(0xDEAD_BEEF));
        let (machine, origin) = machine_fingerprint(&host).unwrap();
        assert_eq!(origin, Origin::Random);
        assert_eq!(machine, 0xADBEEF);
        assert_eq!(host.random_calls(), 1);
    }

    #[test]
    fn test_machine_falls_back_without_usable_addresses() {
        let empty = StubHost::new(Some(vec![]), None, Ok(0x0012_3456));
        assert_eq!(
            machine_fingerprint(&empty).unwrap(),
            (0x123456, Origin::Random)
        );

        let loopback_only = StubHost::new(Some(vec![[0; 6]]), None, Ok(0x0065_4321));
        assert_eq!(
            machine_fingerprint(&loopback_only).unwrap(),
            (0x654321, Origin::Random)
        );
    }

    #[test]
    fn test_process_from_identity() {
        let host = StubHost::new(None, Some("4242@build-box"), Ok(0));
        let (process, origin) = process_fingerprint(&host).unwrap();
        assert_eq!(origin, Origin::Host);
        assert_eq!(process, (string_hash("4242@build-box") & 0xFFFF) as u16);
        assert_eq!(host.random_calls(), 0);
    }

    #[test]
    fn test_process_falls_back_to_random() {
        let host = StubHost::new(None, None, Ok(0xCAFE_1234));
        assert_eq!(process_fingerprint(&host).unwrap(), (0x1234, Origin::Random));
    }

    #[test]
    fn test_entropy_failure_is_fatal_only_on_fallback() {
        let failing = Err(TrackingIdError::Entropy(getrandom::Error::UNSUPPORTED));

        let host = StubHost::new(Some(vec![MAC_A]), Some("1@h"), failing.clone());
        let fp = Fingerprint::from_host(&host).unwrap();
        assert_eq!(fp.source.machine, Origin::Host);
        assert_eq!(fp.source.process, Origin::Host);

        let bare = StubHost::new(None, None, failing);
        assert!(matches!(
            Fingerprint::from_host(&bare),
            Err(TrackingIdError::Entropy(_))
        ));
    }

    #[test]
    fn test_new_masks_machine() {
        let fp = Fingerprint::new(0x01AB_CDEF, 0x1234);
        assert_eq!(fp.machine, 0xABCDEF);
        assert_eq!(fp.process, 0x1234);
        assert_eq!(fp.source.machine.as_str(), "host");
    }
}

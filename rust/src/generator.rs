//! Tracking identifier generator.
//!
//! A [`Generator`] pairs the fixed process fingerprint with a shared atomic
//! counter. The process-wide instance is created once, on first use or by an
//! explicit [`init`] call at startup.

use std::sync::atomic::{AtomicU32, Ordering};

use once_cell::sync::Lazy;

use crate::fingerprint::Fingerprint;
use crate::host::{Clock, HostEnvironment, SystemClock, SystemHost};
use crate::id::{TrackingId, TrackingIdError};

/// Thread-safe generator of [`TrackingId`]s.
pub struct Generator {
    fingerprint: Fingerprint,
    counter: AtomicU32,
    clock: Box<dyn Clock>,
}

impl Generator {
    /// Derive fingerprints from `host` and seed the counter from its random source.
    pub fn from_host(
        host: &dyn HostEnvironment,
        clock: impl Clock + 'static,
    ) -> Result<Self, TrackingIdError> {
        let fingerprint = Fingerprint::from_host(host)?;
        let seed = host.random_u32()?;
        Ok(Self::with_state(fingerprint, seed, clock))
    }

    /// Build a generator from known state. The first identifier carries
    /// `counter_seed` (low 24 bits) in its counter field.
    pub fn with_state(
        fingerprint: Fingerprint,
        counter_seed: u32,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            fingerprint,
            counter: AtomicU32::new(counter_seed),
            clock: Box::new(clock),
        }
    }

    /// Generate the next identifier.
    pub fn next_id(&self) -> TrackingId {
        // Wraps past 2038 like the 32-bit field it fills.
        let timestamp = self.clock.now().timestamp() as i32;
        let counter = self.counter.fetch_add(1, Ordering::Relaxed);
        TrackingId::from_parts(
            timestamp,
            self.fingerprint.machine,
            self.fingerprint.process,
            counter,
        )
    }

    /// Generate the next identifier as 24 uppercase hex characters.
    pub fn generate_id(&self) -> String {
        self.next_id().to_hex()
    }

    /// Generate n identifiers.
    pub fn next_n(&self, n: usize) -> Vec<String> {
        self.iter().take(n).collect()
    }

    /// Endless stream of rendered identifiers.
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::repeat_with(|| self.generate_id())
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

static GLOBAL: Lazy<Result<Generator, TrackingIdError>> = Lazy::new(|| {
    let generator = Generator::from_host(&SystemHost, SystemClock);
    match &generator {
        Ok(g) => tracing::debug!(
            machine = %format!("{:06X}", g.fingerprint.machine),
            process = %format!("{:04X}", g.fingerprint.process),
            machine_source = g.fingerprint.source.machine.as_str(),
            process_source = g.fingerprint.source.process.as_str(),
            "tracking id generator initialized"
        ),
        Err(e) => tracing::error!(error = %e, "tracking id generator initialization failed"),
    }
    generator
});

/// Initialize the process-wide generator.
///
/// Runs host lookups exactly once; later calls return the cached outcome,
/// including a cached failure.
pub fn init() -> Result<&'static Generator, TrackingIdError> {
    (*GLOBAL).as_ref().map_err(Clone::clone)
}

/// Generate an identifier from the process-wide generator.
pub fn try_generate_id() -> Result<String, TrackingIdError> {
    Ok(init()?.generate_id())
}

/// Generate an identifier from the process-wide generator.
///
/// # Panics
///
/// Panics if the process-wide generator could not be initialized, which only
/// happens when the secure random source is unavailable. Call [`init`] at
/// startup to handle that case explicitly.
pub fn generate_id() -> String {
    match init() {
        Ok(generator) => generator.generate_id(),
        Err(e) => panic!("tracking id generator unavailable: {e}"),
    }
}

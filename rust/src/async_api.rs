//! Async convenience API built on top of the process-wide generator.

use crate::generator::init;
use crate::id::TrackingIdError;

/// Get one tracking id in async contexts.
pub async fn async_next_id() -> Result<String, TrackingIdError> {
    Ok(init()?.generate_id())
}

/// Generate a finite async stream of tracking ids as a vector.
pub async fn async_id_stream(count: usize) -> Result<Vec<String>, TrackingIdError> {
    Ok(init()?.next_n(count))
}

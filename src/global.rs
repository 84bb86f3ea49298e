//! Process-wide resolver for callers that cannot thread a `Resolver` through.
//!
//! The first successful call fixes the configuration for the life of the
//! process; later calls return the same instance and ignore their argument.
//! Prefer constructing a `Registry` explicitly where possible.

use std::sync::{Mutex, OnceLock};
use tracing::debug;

use crate::config::ScanConfig;
use crate::error::RebuildError;
use crate::registry::Registry;
use crate::resolver::Resolver;

static INSTANCE: OnceLock<Mutex<Resolver>> = OnceLock::new();

pub fn instance(config: ScanConfig) -> Result<&'static Mutex<Resolver>, RebuildError> {
    if let Some(existing) = INSTANCE.get() {
        debug!(root = %config.root().display(), "Resolver already initialized, ignoring configuration");
        return Ok(existing);
    }

    let resolver = Resolver::new(Registry::open(config)?);
    Ok(INSTANCE.get_or_init(|| Mutex::new(resolver)))
}

pub fn get() -> Option<&'static Mutex<Resolver>> {
    INSTANCE.get()
}

//! Reader-scoped configuration (§10.2). The only process-wide state the design notes
//! call out — a debug-logging toggle — lives here as a per-reader field instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Validate offset and segment tables eagerly instead of lazily.
    pub pedantic: bool,

    /// The debug-logging toggle called out in the design notes; reader-scoped rather
    /// than global. The core has no logging dependency, so this only gates the
    /// `debug_assert!`-adjacent bookkeeping a caller might want surfaced, not an actual
    /// log sink.
    pub debug: bool,
}

impl ReaderOptions {
    pub const fn with_default_options() -> Self {
        ReaderOptions { pedantic: false, debug: false }
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self::with_default_options()
    }
}

/// A cheap, shareable flag a caller can trip to abort an in-progress read.
/// Consulted between outer-dimension iterations of the enumerator and between chunks
/// in tiled reads (§5).
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() { Err(Error::Cancelled) } else { Ok(()) }
    }
}

//! Process-wide setup of the double-description delegate.
//!
//! The numeric constants are computed once, on first use, and live for the
//! rest of the process. There is no teardown.

use std::sync::OnceLock;

use tracing::debug;

/// Numeric settings handed to the double-description delegate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DdConstants {
    /// Values with magnitude below this are treated as zero.
    pub zero_tolerance: f64,
}

impl Default for DdConstants {
    fn default() -> Self {
        Self {
            zero_tolerance: 1e-9,
        }
    }
}

static CONSTANTS: OnceLock<DdConstants> = OnceLock::new();

/// Initialize the global constants if needed and return them.
///
/// Idempotent and thread-safe; concurrent first calls initialize once.
pub fn ensure_initialized() -> &'static DdConstants {
    CONSTANTS.get_or_init(|| {
        let constants = DdConstants::default();
        debug!(
            "double description initialized: zero_tolerance={}",
            constants.zero_tolerance
        );
        constants
    })
}

pub fn is_initialized() -> bool {
    CONSTANTS.get().is_some()
}

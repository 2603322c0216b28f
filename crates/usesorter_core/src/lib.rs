//! Core domain logic for usesorter.
//! Holds the atom record, its fixed-capacity storage and the allocation policy.

pub mod alloc;
pub mod logging;
pub mod model;

pub use alloc::{
    alloc_policy, allocate_or_abort, configure_alloc_policy, AllocError, AllocPolicy,
    AllocResult, Allocator,
};
pub use logging::{default_log_level, flush_logging, init_logging, logging_status};
pub use model::atom::{Atom, AtomDecodeError, FLAG_CAPACITY};
pub use model::name::{truncate_to_capacity, AtomName, NAME_CAPACITY};
pub use model::use_flag::{FlagState, UseFlag, UseFlagParseError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

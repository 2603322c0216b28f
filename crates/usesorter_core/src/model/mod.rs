//! Domain model for package atoms and their USE flags.
//!
//! # Responsibility
//! - Define the atom record and the value types it owns.
//!
//! # Invariants
//! - Model types own their storage; nothing here borrows from callers.

pub mod atom;
pub mod name;
pub mod use_flag;

//! Atom domain model.
//!
//! # Responsibility
//! - Define the record holding one package atom name and its USE flags.
//! - Provide copy-in / copy-out name accessors over fixed-capacity storage.
//!
//! # Invariants
//! - A fresh atom has no name; `get_name` returns `None` until `set_name`.
//! - A stored name is at most `NAME_CAPACITY` bytes; longer input is truncated
//!   without error.
//! - Flag storage is reserved once for `FLAG_CAPACITY` entries and never grows.
//! - Every allocation for an atom goes through the atom's own `Allocator`.

use crate::alloc::{or_abort, AllocError, AllocResult, Allocator};
use crate::model::name::AtomName;
use crate::model::use_flag::UseFlag;
use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

/// Number of flag slots reserved per atom.
pub const FLAG_CAPACITY: usize = 64;

/// One package atom with an optional name and a list of USE flags.
///
/// Dropping the atom releases the name buffer, every flag and the flag
/// storage. [`Atom::destroy`] is the explicit, consuming form of the same.
#[derive(Debug, Serialize, Deserialize)]
#[serde(try_from = "AtomRecord")]
pub struct Atom {
    name: Option<AtomName>,
    flags: Vec<UseFlag>,
    #[serde(skip)]
    allocator: Allocator,
}

impl Atom {
    /// Creates an unnamed atom using the process-wide allocator.
    ///
    /// Allocation failure is fatal here regardless of the configured policy;
    /// use [`Atom::try_new_in`] to receive it as an error.
    pub fn new() -> Self {
        or_abort(Self::try_new_in(Allocator::system()))
    }

    /// Creates an unnamed atom drawing all storage from `allocator`.
    ///
    /// # Invariants
    /// - `name` starts as `None`; no name buffer is allocated yet.
    /// - Flag storage has room for `FLAG_CAPACITY` entries.
    pub fn try_new_in(allocator: Allocator) -> AllocResult<Self> {
        let flags = allocator.reserve::<UseFlag>(FLAG_CAPACITY)?;
        debug!(
            "event=atom_new module=model status=ok flag_capacity={}",
            FLAG_CAPACITY
        );
        Ok(Self {
            name: None,
            flags,
            allocator,
        })
    }

    /// Releases the atom and everything it owns.
    pub fn destroy(self) {
        debug!(
            "event=atom_destroy module=model status=ok named={} flag_count={}",
            self.name.is_some(),
            self.flags.len()
        );
        drop(self);
    }

    /// Borrowed view of the current name, without copying.
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(AtomName::as_str)
    }

    /// Returns an independent copy of the current name, or `None` when unset.
    ///
    /// Later `set_name` calls do not affect a returned copy.
    pub fn get_name(&self) -> Option<AtomName> {
        or_abort(self.try_get_name())
    }

    /// Fallible form of [`Atom::get_name`].
    pub fn try_get_name(&self) -> AllocResult<Option<AtomName>> {
        self.name
            .as_ref()
            .map(|name| name.try_clone_in(&self.allocator))
            .transpose()
    }

    /// Copies `value` into the atom's name buffer, allocating it on first use.
    ///
    /// Input beyond `NAME_CAPACITY` bytes is dropped silently. Returns the
    /// number of bytes kept, so callers can tell when truncation happened.
    pub fn set_name(&mut self, value: &str) -> usize {
        or_abort(self.try_set_name(value))
    }

    /// Fallible form of [`Atom::set_name`]. On error the atom is unchanged.
    pub fn try_set_name(&mut self, value: &str) -> AllocResult<usize> {
        let name = match self.name.take() {
            Some(name) => name,
            None => AtomName::new_in(&self.allocator)?,
        };
        let stored = self.name.insert(name).write(value);
        if stored < value.len() {
            debug!(
                "event=atom_set_name module=model status=truncated input_len={} stored_len={}",
                value.len(),
                stored
            );
        }
        Ok(stored)
    }

    /// Writes `<name>\n` to `out` when a name is set; writes nothing otherwise.
    pub fn print_to<W: io::Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        if let Some(name) = &self.name {
            writeln!(out, "{}", name.as_str())?;
        }
        Ok(())
    }

    /// Read-only view of the flags, in stored order.
    pub fn flags(&self) -> &[UseFlag] {
        &self.flags
    }

    pub fn flag_capacity(&self) -> usize {
        FLAG_CAPACITY
    }
}

impl Default for Atom {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.flags == other.flags
    }
}

impl Eq for Atom {}

impl Display for Atom {
    /// Renders a `package.use` style line: the name, then each flag, space
    /// separated. An unnamed or empty-named atom renders only its flags.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut separator = "";
        if let Some(name) = self.name().filter(|name| !name.is_empty()) {
            f.write_str(name)?;
            separator = " ";
        }
        for flag in &self.flags {
            write!(f, "{separator}{flag}")?;
            separator = " ";
        }
        Ok(())
    }
}

/// Wire shape used when decoding an atom.
#[derive(Debug, Deserialize)]
struct AtomRecord {
    name: Option<String>,
    #[serde(default)]
    flags: Vec<UseFlag>,
}

/// Errors raised while decoding an atom record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomDecodeError {
    TooManyFlags { count: usize, capacity: usize },
    Alloc(AllocError),
}

impl Display for AtomDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyFlags { count, capacity } => write!(
                f,
                "atom has {count} use flags but capacity is {capacity}"
            ),
            Self::Alloc(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AtomDecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TooManyFlags { .. } => None,
            Self::Alloc(err) => Some(err),
        }
    }
}

impl From<AllocError> for AtomDecodeError {
    fn from(value: AllocError) -> Self {
        Self::Alloc(value)
    }
}

impl TryFrom<AtomRecord> for Atom {
    type Error = AtomDecodeError;

    fn try_from(record: AtomRecord) -> Result<Self, Self::Error> {
        if record.flags.len() > FLAG_CAPACITY {
            return Err(AtomDecodeError::TooManyFlags {
                count: record.flags.len(),
                capacity: FLAG_CAPACITY,
            });
        }

        let mut atom = Self::try_new_in(Allocator::system())?;
        if let Some(name) = record.name.as_deref() {
            atom.try_set_name(name)?;
        }
        atom.flags.extend(record.flags);
        Ok(atom)
    }
}

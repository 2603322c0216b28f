//! Allocation capability for atom storage.
//!
//! # Responsibility
//! - Hand out zero-initialized storage for an exact element count.
//! - Apply one failure policy per process, chosen at the system boundary.
//!
//! # Invariants
//! - Under `AllocPolicy::Abort`, exhaustion never returns to the caller.
//! - Under `AllocPolicy::Propagate`, exhaustion surfaces as `AllocError`.
//! - The process-wide policy is configured at most once.
//!
//! # See also
//! - `crate::model::atom` and `crate::model::name` for the storage consumers.

use log::{error, warn};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::mem::size_of;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static ALLOC_POLICY: OnceCell<AllocPolicy> = OnceCell::new();

/// What happens when an allocation request cannot be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocPolicy {
    /// Report to stderr and the error log, then terminate the process.
    Abort,
    /// Return `AllocError` to the caller.
    Propagate,
}

impl AllocPolicy {
    /// Stable lowercase id used in log lines and config errors.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Propagate => "propagate",
        }
    }
}

pub type AllocResult<T> = Result<T, AllocError>;

/// Allocation failure surfaced under `AllocPolicy::Propagate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    Exhausted { count: usize, element_size: usize },
}

impl Display for AllocError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted {
                count,
                element_size,
            } => write!(
                f,
                "failed to allocate {count} elements of {element_size} bytes: out of memory"
            ),
        }
    }
}

impl Error for AllocError {}

/// Sets the process-wide allocation policy.
///
/// # Invariants
/// - Repeating the call with the active policy is a no-op.
/// - Switching to a different policy after the first call is rejected.
///
/// # Errors
/// - Returns a human-readable message when a different policy is already active.
pub fn configure_alloc_policy(policy: AllocPolicy) -> Result<(), String> {
    let active = *ALLOC_POLICY.get_or_init(|| policy);
    if active != policy {
        return Err(format!(
            "allocation policy already configured as `{}`; refusing to switch to `{}`",
            active.as_str(),
            policy.as_str()
        ));
    }
    Ok(())
}

/// Returns the configured process-wide policy, `Abort` when never configured.
pub fn alloc_policy() -> AllocPolicy {
    ALLOC_POLICY.get().copied().unwrap_or(AllocPolicy::Abort)
}

/// Injectable allocation capability.
///
/// Cloning shares the byte budget, so every clone draws from the same pool.
#[derive(Debug, Clone)]
pub struct Allocator {
    policy: AllocPolicy,
    budget: Option<Arc<AtomicUsize>>,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::system()
    }
}

impl Allocator {
    /// Allocator using the process-wide policy and no byte budget.
    pub fn system() -> Self {
        Self::with_policy(alloc_policy())
    }

    /// Allocator with an explicit policy, ignoring the process-wide one.
    pub fn with_policy(policy: AllocPolicy) -> Self {
        Self {
            policy,
            budget: None,
        }
    }

    /// Caps the total number of bytes this allocator (and its clones) may hand out.
    ///
    /// Released storage is not credited back.
    pub fn with_budget(mut self, bytes: usize) -> Self {
        self.budget = Some(Arc::new(AtomicUsize::new(bytes)));
        self
    }

    pub fn policy(&self) -> AllocPolicy {
        self.policy
    }

    /// Bytes left in the budget, `None` when unbounded.
    pub fn remaining_budget(&self) -> Option<usize> {
        self.budget
            .as_ref()
            .map(|budget| budget.load(Ordering::Relaxed))
    }

    /// Returns an empty vector with room for exactly `count` elements.
    pub fn reserve<T>(&self, count: usize) -> AllocResult<Vec<T>> {
        self.settle(self.try_reserve(count))
    }

    /// Returns `count` elements, each `T::default()`.
    ///
    /// For integer element types this is zero-filled storage of
    /// `count * size_of::<T>()` bytes.
    pub fn allocate_zeroed<T: Default + Clone>(&self, count: usize) -> AllocResult<Vec<T>> {
        let storage = self.try_reserve(count).map(|mut storage| {
            storage.resize(count, T::default());
            storage
        });
        self.settle(storage)
    }

    fn try_reserve<T>(&self, count: usize) -> AllocResult<Vec<T>> {
        let element_size = size_of::<T>();
        let exhausted = AllocError::Exhausted {
            count,
            element_size,
        };
        let bytes = count.checked_mul(element_size).ok_or(exhausted)?;

        // Budget is only drawn once the storage actually exists.
        let mut storage = Vec::new();
        storage.try_reserve_exact(count).map_err(|_| exhausted)?;
        self.charge(bytes).ok_or(exhausted)?;
        Ok(storage)
    }

    fn charge(&self, bytes: usize) -> Option<()> {
        let Some(budget) = self.budget.as_ref() else {
            return Some(());
        };
        budget
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |remaining| {
                remaining.checked_sub(bytes)
            })
            .map(|_| ())
            .ok()
    }

    fn settle<T>(&self, result: AllocResult<T>) -> AllocResult<T> {
        match (result, self.policy) {
            (Ok(value), _) => Ok(value),
            (Err(err), AllocPolicy::Abort) => abort_on_exhaustion(err),
            (Err(err), AllocPolicy::Propagate) => {
                warn!(
                    "event=alloc_failed module=alloc status=error policy=propagate detail={}",
                    err
                );
                Err(err)
            }
        }
    }
}

/// Requests `count * element_size` zeroed bytes, terminating the process on failure.
///
/// Never returns an empty result in place of storage; callers may assume
/// success or non-return.
pub fn allocate_or_abort(count: usize, element_size: usize) -> Vec<u8> {
    let Some(bytes) = count.checked_mul(element_size) else {
        abort_on_exhaustion(AllocError::Exhausted {
            count,
            element_size,
        });
    };
    or_abort(Allocator::with_policy(AllocPolicy::Abort).allocate_zeroed::<u8>(bytes))
}

/// Unwraps an allocation result, treating failure as fatal.
pub(crate) fn or_abort<T>(result: AllocResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => abort_on_exhaustion(err),
    }
}

fn abort_on_exhaustion(err: AllocError) -> ! {
    error!(
        "event=alloc_failed module=alloc status=fatal policy=abort detail={}",
        err
    );
    log::logger().flush();
    eprintln!("usesorter: {err}");
    std::process::abort()
}

#[cfg(test)]
mod tests {
    use super::{
        alloc_policy, allocate_or_abort, configure_alloc_policy, AllocError, AllocPolicy,
        Allocator,
    };

    #[test]
    fn allocate_or_abort_returns_exact_zeroed_bytes() {
        let storage = allocate_or_abort(65, 1);
        assert_eq!(storage.len(), 65);
        assert!(storage.iter().all(|byte| *byte == 0));

        let wide = allocate_or_abort(8, 4);
        assert_eq!(wide.len(), 32);
    }

    #[test]
    fn allocate_zeroed_fills_with_defaults() {
        let allocator = Allocator::with_policy(AllocPolicy::Propagate);
        let words = allocator
            .allocate_zeroed::<u32>(16)
            .expect("small allocation should succeed");
        assert_eq!(words, vec![0_u32; 16]);
    }

    #[test]
    fn reserve_returns_empty_storage_with_capacity() {
        let allocator = Allocator::with_policy(AllocPolicy::Propagate);
        let slots = allocator
            .reserve::<String>(64)
            .expect("small reservation should succeed");
        assert!(slots.is_empty());
        assert!(slots.capacity() >= 64);
    }

    #[test]
    fn propagate_policy_reports_budget_exhaustion() {
        let allocator = Allocator::with_policy(AllocPolicy::Propagate).with_budget(100);
        allocator
            .allocate_zeroed::<u8>(65)
            .expect("first request fits the budget");
        assert_eq!(allocator.remaining_budget(), Some(35));

        let err = allocator
            .allocate_zeroed::<u8>(65)
            .expect_err("second request exceeds the budget");
        assert_eq!(
            err,
            AllocError::Exhausted {
                count: 65,
                element_size: 1
            }
        );
        assert_eq!(allocator.remaining_budget(), Some(35));
    }

    #[test]
    fn clones_share_one_budget() {
        let allocator = Allocator::with_policy(AllocPolicy::Propagate).with_budget(8);
        let clone = allocator.clone();
        clone.allocate_zeroed::<u32>(2).expect("fits budget");
        assert_eq!(allocator.remaining_budget(), Some(0));
        assert!(allocator.allocate_zeroed::<u8>(1).is_err());
    }

    #[test]
    fn size_overflow_is_exhaustion() {
        let allocator = Allocator::with_policy(AllocPolicy::Propagate);
        let err = allocator
            .reserve::<u64>(usize::MAX)
            .expect_err("overflowing request must fail");
        assert_eq!(
            err,
            AllocError::Exhausted {
                count: usize::MAX,
                element_size: 8
            }
        );
        assert!(err.to_string().contains("out of memory"));
    }

    #[test]
    fn failed_reservation_leaves_budget_untouched() {
        let allocator = Allocator::with_policy(AllocPolicy::Propagate).with_budget(usize::MAX);
        // Fits `usize` but exceeds `isize::MAX`, so the reservation itself fails.
        let count = isize::MAX as usize + 1;
        let err = allocator
            .reserve::<u8>(count)
            .expect_err("reservation past isize::MAX must fail");
        assert_eq!(
            err,
            AllocError::Exhausted {
                count,
                element_size: 1
            }
        );
        assert_eq!(allocator.remaining_budget(), Some(usize::MAX));
    }

    #[test]
    fn configure_alloc_policy_is_idempotent_and_rejects_switch() {
        configure_alloc_policy(AllocPolicy::Abort).expect("first configuration succeeds");
        configure_alloc_policy(AllocPolicy::Abort).expect("same policy is idempotent");

        let err = configure_alloc_policy(AllocPolicy::Propagate)
            .expect_err("switching policy must be rejected");
        assert!(err.contains("refusing to switch"));
        assert_eq!(alloc_policy(), AllocPolicy::Abort);
        assert_eq!(Allocator::system().policy(), AllocPolicy::Abort);
    }
}

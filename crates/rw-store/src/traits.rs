use crate::error::StoreResult;
use crate::record::StateSnapshot;

/// Persistence for the per-kind state snapshot.
///
/// All implementations must satisfy these invariants:
/// - `load` on a fresh or unreadable-content store yields an empty snapshot.
/// - `save` replaces the whole snapshot; a failed save leaves the previously
///   saved snapshot loadable.
/// - I/O errors other than "not found" are propagated.
pub trait StateStore: Send + Sync {
    /// Load the last saved snapshot.
    fn load(&self) -> StoreResult<StateSnapshot>;

    /// Durably replace the saved snapshot.
    fn save(&self, state: &StateSnapshot) -> StoreResult<()>;
}

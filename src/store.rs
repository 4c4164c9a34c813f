// Registry Store - persistence seam
// All lookups are case-insensitive on the code and the country.

use crate::entities::SwiftCodeEntry;
use crate::error::Result;

/// Keyed store of SWIFT code entries
///
/// The store's own uniqueness constraint on the code is the authoritative
/// duplicate guard: `save` must fail with `RegistryError::Conflict` when the
/// code already exists, whatever pre-check the caller did.
pub trait RegistryStore: Send + Sync {
    fn find_by_code(&self, code: &str) -> Result<Option<SwiftCodeEntry>>;

    /// Entries of one country, ordered by code
    fn find_by_country(&self, iso2: &str) -> Result<Vec<SwiftCodeEntry>>;

    /// Entries whose code starts with `prefix`, except `exclude_code` itself, ordered by code
    fn find_branches(&self, prefix: &str, exclude_code: &str) -> Result<Vec<SwiftCodeEntry>>;

    fn exists(&self, code: &str) -> Result<bool>;

    fn save(&self, entry: &SwiftCodeEntry) -> Result<()>;

    /// Save a batch atomically; a repeated code keeps the last row's fields
    ///
    /// Returns the number of codes that were not present before.
    fn save_batch(&self, entries: &[SwiftCodeEntry]) -> Result<usize>;

    /// Delete by code, returning whether a row was removed
    fn delete(&self, code: &str) -> Result<bool>;

    fn count(&self) -> Result<i64>;
}

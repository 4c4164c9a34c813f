// Hierarchy Resolver - headquarters expand into their branches at read time
// The relationship is never stored; it is derived from the shared 8-character prefix.

use crate::error::{RegistryError, Result};
use crate::projection::{project, SwiftCodeView};
use crate::store::RegistryStore;

/// Look up one code and, for a headquarters, attach its branches
///
/// Branches are projected without country name. An HQ with no branches, and
/// every non-HQ entry, gets no branch list at all.
pub fn resolve_details(store: &dyn RegistryStore, code: &str) -> Result<SwiftCodeView> {
    tracing::debug!("Attempting to retrieve details for SWIFT code: {}", code);

    let entry = store.find_by_code(code)?.ok_or_else(|| {
        tracing::warn!("SWIFT code '{}' not found.", code);
        RegistryError::NotFound(format!("SWIFT code '{}' not found.", code))
    })?;

    let mut view = project(&entry, true);

    if entry.is_headquarter {
        let prefix = entry.branch_prefix();
        let branches = store.find_branches(&prefix, &entry.swift_code)?;
        tracing::debug!("Found {} branches for prefix '{}'", branches.len(), prefix);

        if !branches.is_empty() {
            view.branches = Some(branches.iter().map(|b| project(b, false)).collect());
        }
        tracing::info!("Returning details for HQ: {}", entry.swift_code);
    } else {
        tracing::info!("Returning details for branch: {}", entry.swift_code);
    }

    Ok(view)
}

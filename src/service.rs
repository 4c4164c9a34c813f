// SWIFT Code Service - the four caller-facing operations
// Each call is one validate-then-store or one read-then-project step.

use crate::error::{RegistryError, Result};
use crate::hierarchy::resolve_details;
use crate::projection::{project_country, CountryView, SwiftCodeView};
use crate::store::RegistryStore;
use crate::validation::{validate_and_normalize, SwiftCodeRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Acknowledgment returned by writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct SwiftCodeService {
    store: Arc<dyn RegistryStore>,
}

impl SwiftCodeService {
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        SwiftCodeService { store }
    }

    pub fn store(&self) -> &dyn RegistryStore {
        self.store.as_ref()
    }

    /// Lookup by code; headquarters come back with their branches
    pub fn get_details(&self, swift_code: &str) -> Result<SwiftCodeView> {
        resolve_details(self.store(), swift_code.trim())
    }

    /// All entries of one country, possibly none
    pub fn get_by_country(&self, country_iso2: &str) -> Result<CountryView> {
        let iso2 = country_iso2.trim().to_uppercase();
        if iso2.is_empty() {
            return Err(RegistryError::ValidationFailed(
                "'countryISO2': Country ISO2 code cannot be blank".to_string(),
            ));
        }

        tracing::debug!("Attempting to retrieve SWIFT codes for country: {}", iso2);
        let entries = self.store.find_by_country(&iso2)?;
        if entries.is_empty() {
            tracing::info!("No SWIFT codes found for country code: {}", iso2);
        }

        let view = project_country(&iso2, &entries);
        tracing::info!("Found {} SWIFT codes for country {}", view.swift_codes.len(), iso2);

        Ok(view)
    }

    pub fn add(&self, request: &SwiftCodeRequest) -> Result<MessageResponse> {
        tracing::debug!("Attempting to add SWIFT code: {}", request.swift_code.trim());

        let entry = validate_and_normalize(request, self.store())?;
        // A concurrent insert of the same code surfaces here as Conflict
        self.store.save(&entry)?;

        tracing::info!("Successfully added SWIFT code: {}", entry.swift_code);
        Ok(MessageResponse::new(format!(
            "SWIFT code '{}' added successfully.",
            entry.swift_code
        )))
    }

    pub fn delete(&self, swift_code: &str) -> Result<MessageResponse> {
        let code = swift_code.trim().to_uppercase();
        tracing::debug!("Attempting to delete SWIFT code: {}", code);

        let not_found = || {
            tracing::warn!("Attempted to delete non-existent SWIFT code: {}", code);
            RegistryError::NotFound(format!("SWIFT code '{}' not found, cannot delete.", code))
        };

        let entry = self.store.find_by_code(&code)?.ok_or_else(not_found)?;
        if !self.store.delete(&entry.swift_code)? {
            return Err(not_found());
        }

        tracing::info!("Successfully deleted SWIFT code: {}", code);
        Ok(MessageResponse::new(format!(
            "SWIFT code '{}' deleted successfully.",
            code
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteRegistry;
    use crate::error::ErrorKind;

    fn service() -> SwiftCodeService {
        SwiftCodeService::new(Arc::new(SqliteRegistry::open_in_memory().unwrap()))
    }

    fn request(code: &str, iso2: &str, hq: bool) -> SwiftCodeRequest {
        SwiftCodeRequest {
            swift_code: code.to_string(),
            bank_name: "Test Bank".to_string(),
            address: Some("Test Street 1".to_string()),
            country_iso2: iso2.to_string(),
            country_name: "Poland".to_string(),
            is_headquarter: Some(hq),
        }
    }

    #[test]
    fn test_add_then_lookup_returns_normalized_fields() {
        let svc = service();
        let ack = svc.add(&request(" aaaaplpwxxx ", "pl", true)).unwrap();
        assert_eq!(ack.message, "SWIFT code 'AAAAPLPWXXX' added successfully.");

        let view = svc.get_details("AAAAPLPWXXX").unwrap();
        assert_eq!(view.swift_code, "AAAAPLPWXXX");
        assert_eq!(view.country_iso2, "PL");
        assert_eq!(view.country_name.as_deref(), Some("POLAND"));
        assert_eq!(view.bank_name, "Test Bank");
        assert_eq!(view.address, "Test Street 1");
        assert!(view.is_headquarter);
    }

    #[test]
    fn test_add_duplicate_leaves_store_unchanged() {
        let svc = service();
        svc.add(&request("AAAAPLPWXXX", "PL", true)).unwrap();

        let mut again = request("aaaaPLPWxxx", "PL", true);
        again.bank_name = "Other Bank".to_string();
        let err = svc.add(&again).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(svc.store().count().unwrap(), 1);
        assert_eq!(svc.get_details("AAAAPLPWXXX").unwrap().bank_name, "Test Bank");
    }

    #[test]
    fn test_headquarter_and_branch_lookup() {
        let svc = service();
        svc.add(&request("AAAAPLCCXXX", "PL", true)).unwrap();
        svc.add(&request("AAAAPLCCD01", "PL", false)).unwrap();

        let hq = svc.get_details("aaaaplccxxx").unwrap();
        let branches = hq.branches.expect("HQ should list its branch");
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].swift_code, "AAAAPLCCD01");

        let branch = svc.get_details("AAAAPLCCD01").unwrap();
        assert!(branch.branches.is_none());
    }

    #[test]
    fn test_country_listing() {
        let svc = service();
        svc.add(&request("AAAAPLPWXXX", "PL", true)).unwrap();
        svc.add(&request("BBBBPLPW", "PL", false)).unwrap();
        svc.add(&request("CCCCPLPW123", "PL", false)).unwrap();

        let view = svc.get_by_country("pl").unwrap();
        assert_eq!(view.country_iso2, "PL");
        assert_eq!(view.country_name, "POLAND");
        assert_eq!(view.swift_codes.len(), 3);
        assert!(view.swift_codes.iter().all(|v| v.country_name.is_none()));

        let empty = svc.get_by_country("de").unwrap();
        assert_eq!(empty.country_iso2, "DE");
        assert_eq!(empty.country_name, "");
        assert!(empty.swift_codes.is_empty());
    }

    #[test]
    fn test_delete_case_insensitive() {
        let svc = service();
        svc.add(&request("AAAAPLPWXXX", "PL", true)).unwrap();

        let ack = svc.delete("aaaaplpwxxx").unwrap();
        assert_eq!(ack.message, "SWIFT code 'AAAAPLPWXXX' deleted successfully.");

        let err = svc.delete("AAAAPLPWXXX").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.kind(), svc.get_details("AAAAPLPWXXX").unwrap_err().kind());
    }

    #[test]
    fn test_add_rejections_by_kind() {
        let svc = service();

        let err = svc.add(&request("AAAADEPWXXX", "PL", true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InconsistentData);

        let err = svc.add(&request("AAAAPLPWXXX", "PL", false)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InconsistentData);

        let err = svc.add(&request("AAAA", "PL", false)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);

        assert_eq!(svc.store().count().unwrap(), 0);
    }
}

// ✅ Validation & Consistency Checker
// Structural checks, normalization, then consistency checks against the code itself.
//
// Order matters for which failure the caller sees:
//   1. field validation   -> ValidationFailed (all field errors at once)
//   2. duplicate pre-check -> Conflict
//   3. embedded country    -> InconsistentData
//   4. headquarters flag   -> InconsistentData

use crate::entities::{embedded_country, is_headquarter_code, SwiftCodeEntry};
use crate::error::{RegistryError, Result};
use crate::store::RegistryStore;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Bank (4 letters) + country (2 letters) + location (2 alnum) + optional branch (3 alnum)
static SWIFT_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{4}[A-Z]{2}[A-Z0-9]{2}([A-Z0-9]{3})?$").unwrap());

static ISO2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}$").unwrap());

pub const MAX_ADDRESS_LEN: usize = 512;

// ============================================================================
// CANDIDATE
// ============================================================================

/// Candidate fields for a new registry entry, as supplied by a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwiftCodeRequest {
    #[serde(default)]
    pub swift_code: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, rename = "countryISO2")]
    pub country_iso2: String,
    #[serde(default)]
    pub country_name: String,
    #[serde(default)]
    pub is_headquarter: Option<bool>,
}

// ============================================================================
// FIELD ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}': {}", self.field, self.message)
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Check a candidate's fields in isolation, without touching the store
pub fn validate_fields(request: &SwiftCodeRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let mut push = |field: &'static str, message: &str| {
        errors.push(FieldError {
            field,
            message: message.to_string(),
        })
    };

    if is_blank(&request.swift_code) {
        push("swiftCode", "SWIFT code cannot be blank");
    } else if !SWIFT_CODE_RE.is_match(&request.swift_code.trim().to_uppercase()) {
        push(
            "swiftCode",
            "Invalid SWIFT/BIC format. Should be an 8 to 11-character identifier (e.g., BANKPLPWXXX, BANKDEFF)",
        );
    }

    if is_blank(&request.bank_name) {
        push("bankName", "Bank name cannot be blank");
    }

    if let Some(address) = &request.address {
        if address.chars().count() > MAX_ADDRESS_LEN {
            push("address", "Address cannot exceed 512 characters");
        }
    }

    if is_blank(&request.country_iso2) {
        push("countryISO2", "Country ISO2 code cannot be blank");
    } else if !ISO2_RE.is_match(&request.country_iso2) {
        push("countryISO2", "Country ISO2 code must be exactly 2 letters");
    }

    if is_blank(&request.country_name) {
        push("countryName", "Country name cannot be blank");
    }

    if request.is_headquarter.is_none() {
        push("isHeadquarter", "isHeadquarter flag must be provided");
    }

    errors
}

// ============================================================================
// CHECKER
// ============================================================================

/// Validate a candidate and return the normalized entry ready for `save`
///
/// Performs one existence read against the store. That read is only a
/// pre-check; the store's uniqueness constraint still decides a race.
pub fn validate_and_normalize(
    request: &SwiftCodeRequest,
    store: &dyn RegistryStore,
) -> Result<SwiftCodeEntry> {
    let errors = validate_fields(request);
    if !errors.is_empty() {
        let message = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        tracing::warn!("Rejected SWIFT code request: {}", message);
        return Err(RegistryError::ValidationFailed(message));
    }

    let entry = SwiftCodeEntry::new(
        &request.swift_code,
        request.bank_name.clone(),
        request.address.clone(),
        None,
        &request.country_iso2,
        &request.country_name,
    );

    if store.exists(&entry.swift_code)? {
        tracing::warn!("Attempted to add duplicate SWIFT code: {}", entry.swift_code);
        return Err(RegistryError::duplicate(&entry.swift_code));
    }

    check_consistency(&entry, request.is_headquarter)?;

    Ok(entry)
}

/// Cross-field checks between the code and the other fields of an entry
pub fn check_consistency(entry: &SwiftCodeEntry, claimed_headquarter: Option<bool>) -> Result<()> {
    let embedded = embedded_country(&entry.swift_code).unwrap_or_default();
    if !embedded.eq_ignore_ascii_case(&entry.country_iso2) {
        let message = format!(
            "Data consistency error: The country code from SWIFT ('{}' in '{}') does not match the provided Country ISO2 ('{}').",
            embedded, entry.swift_code, entry.country_iso2
        );
        tracing::warn!("{}", message);
        return Err(RegistryError::InconsistentData(message));
    }

    let expected = is_headquarter_code(&entry.swift_code);
    if let Some(claimed) = claimed_headquarter {
        if claimed != expected {
            tracing::warn!(
                "Inconsistent isHeadquarter flag for SWIFT code {}. Flag was: {}, expected based on code: {}",
                entry.swift_code,
                claimed,
                expected
            );
            return Err(RegistryError::InconsistentData(format!(
                "Provided 'isHeadquarter' flag ({}) is inconsistent with the SWIFT code format ({}).",
                claimed, entry.swift_code
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteRegistry;
    use crate::error::ErrorKind;

    fn valid_request() -> SwiftCodeRequest {
        SwiftCodeRequest {
            swift_code: "BANKPLPWXXX".to_string(),
            bank_name: "Bank Polski".to_string(),
            address: Some("Marszalkowska 1".to_string()),
            country_iso2: "PL".to_string(),
            country_name: "Poland".to_string(),
            is_headquarter: Some(true),
        }
    }

    #[test]
    fn test_valid_request_is_normalized() {
        let store = SqliteRegistry::open_in_memory().unwrap();
        let mut request = valid_request();
        request.swift_code = "  bankplpwxxx ".to_string();
        request.country_iso2 = "pl".to_string();

        let entry = validate_and_normalize(&request, &store).unwrap();

        assert_eq!(entry.swift_code, "BANKPLPWXXX");
        assert_eq!(entry.country_iso2, "PL");
        assert_eq!(entry.country_name, "POLAND");
        assert_eq!(entry.bank_name, "Bank Polski");
        assert_eq!(entry.address.as_deref(), Some("Marszalkowska 1"));
        assert!(entry.town_name.is_none());
        assert!(entry.is_headquarter);
    }

    #[test]
    fn test_blank_fields_collected() {
        let request = SwiftCodeRequest {
            is_headquarter: Some(false),
            ..Default::default()
        };

        let errors = validate_fields(&request);
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["swiftCode", "bankName", "countryISO2", "countryName"]);
    }

    #[test]
    fn test_malformed_code_fails_validation() {
        let store = SqliteRegistry::open_in_memory().unwrap();

        for code in ["BANKPL", "BANKPLPWXX", "1ANKPLPWXXX", "BANKPLPW-XX", "BANKPLPWXXXX"] {
            let mut request = valid_request();
            request.swift_code = code.to_string();
            let err = validate_and_normalize(&request, &store).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValidationFailed, "code {}", code);
        }
    }

    #[test]
    fn test_bad_iso2_and_missing_flag() {
        let mut request = valid_request();
        request.country_iso2 = "P1".to_string();
        request.is_headquarter = None;

        let errors = validate_fields(&request);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].to_string(),
            "'countryISO2': Country ISO2 code must be exactly 2 letters"
        );
        assert_eq!(errors[1].field, "isHeadquarter");
    }

    #[test]
    fn test_address_too_long() {
        let mut request = valid_request();
        request.address = Some("x".repeat(MAX_ADDRESS_LEN + 1));
        assert_eq!(validate_fields(&request)[0].field, "address");

        request.address = None;
        assert!(validate_fields(&request).is_empty());
    }

    #[test]
    fn test_duplicate_any_case_is_conflict() {
        let store = SqliteRegistry::open_in_memory().unwrap();
        let entry = validate_and_normalize(&valid_request(), &store).unwrap();
        store.save(&entry).unwrap();

        let mut request = valid_request();
        request.swift_code = "bankplpwxxx".to_string();
        let err = validate_and_normalize(&request, &store).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_country_mismatch_is_inconsistent() {
        let store = SqliteRegistry::open_in_memory().unwrap();
        let mut request = valid_request();
        request.country_iso2 = "DE".to_string();

        let err = validate_and_normalize(&request, &store).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InconsistentData);
        assert!(err.to_string().contains("'PL' in 'BANKPLPWXXX'"));
    }

    #[test]
    fn test_headquarter_flag_mismatch_is_inconsistent() {
        let store = SqliteRegistry::open_in_memory().unwrap();

        let mut request = valid_request();
        request.is_headquarter = Some(false);
        let err = validate_and_normalize(&request, &store).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InconsistentData);

        let mut request = valid_request();
        request.swift_code = "BANKPLPW123".to_string();
        request.is_headquarter = Some(true);
        let err = validate_and_normalize(&request, &store).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InconsistentData);
    }

    #[test]
    fn test_request_deserializes_external_field_names() {
        let json = r#"{
            "swiftCode": "BANKPLPW",
            "bankName": "Bank",
            "address": "Street",
            "countryISO2": "PL",
            "countryName": "Poland",
            "isHeadquarter": false
        }"#;

        let request: SwiftCodeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.swift_code, "BANKPLPW");
        assert_eq!(request.country_iso2, "PL");
        assert_eq!(request.is_headquarter, Some(false));
    }
}

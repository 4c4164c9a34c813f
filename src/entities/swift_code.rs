// 🏦 SWIFT Code Entity - one registry record per BIC
//
// The code itself carries structure:
//   BBBB CC LL [BBB]
//   bank country location [branch]
// Headquarters end in "XXX"; branches share the first 8 characters with their HQ.

use serde::{Deserialize, Serialize};

/// Suffix that marks a headquarters code
pub const HEADQUARTER_SUFFIX: &str = "XXX";

/// Length of the bank + country + location part shared by an HQ and its branches
pub const BRANCH_PREFIX_LEN: usize = 8;

/// Valid code lengths (BIC8 and BIC11)
pub const VALID_CODE_LENGTHS: [usize; 2] = [8, 11];

// ============================================================================
// CODE STRUCTURE HELPERS
// ============================================================================

/// True iff the code ends with the headquarters suffix (case-insensitive)
pub fn is_headquarter_code(code: &str) -> bool {
    code.to_uppercase().ends_with(HEADQUARTER_SUFFIX)
}

/// Characters 5-6 of the code, i.e. the embedded ISO2 country
///
/// Returns `None` when the code is too short to carry one.
pub fn embedded_country(code: &str) -> Option<String> {
    let country: String = code.chars().skip(4).take(2).collect();
    if country.chars().count() == 2 {
        Some(country)
    } else {
        None
    }
}

/// First 8 characters of the code, shared by an HQ and all of its branches
pub fn branch_prefix(code: &str) -> String {
    code.chars().take(BRANCH_PREFIX_LEN).collect()
}

/// Code length counted in characters
pub fn code_length(code: &str) -> usize {
    code.chars().count()
}

pub fn has_valid_length(code: &str) -> bool {
    VALID_CODE_LENGTHS.contains(&code_length(code))
}

// ============================================================================
// SWIFT CODE ENTRY
// ============================================================================

/// A persisted registry record
///
/// Entries are built once (by ingestion or a validated insert) and never
/// mutated afterwards; removal is an explicit delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwiftCodeEntry {
    /// Canonical uppercase code, unique case-insensitively
    pub swift_code: String,
    pub bank_name: String,
    pub address: Option<String>,
    /// Locality, used when the address is missing
    pub town_name: Option<String>,
    pub country_iso2: String,
    pub country_name: String,
    pub is_headquarter: bool,
}

impl SwiftCodeEntry {
    /// Build an entry in canonical form
    ///
    /// Trims and uppercases the code, uppercases the country fields and
    /// derives the headquarters flag from the code suffix.
    pub fn new(
        swift_code: &str,
        bank_name: String,
        address: Option<String>,
        town_name: Option<String>,
        country_iso2: &str,
        country_name: &str,
    ) -> Self {
        let swift_code = swift_code.trim().to_uppercase();
        let is_headquarter = swift_code.ends_with(HEADQUARTER_SUFFIX);

        SwiftCodeEntry {
            swift_code,
            bank_name,
            address,
            town_name,
            country_iso2: country_iso2.to_uppercase(),
            country_name: country_name.to_uppercase(),
            is_headquarter,
        }
    }

    /// Prefix used to look up branches of this entry
    pub fn branch_prefix(&self) -> String {
        branch_prefix(&self.swift_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headquarter_detection() {
        assert!(is_headquarter_code("AAAABBCCXXX"));
        assert!(is_headquarter_code("aaaabbccxxx"));
        assert!(!is_headquarter_code("AAAABBCCD01"));
        assert!(!is_headquarter_code("AAAABBCC"));
    }

    #[test]
    fn test_embedded_country() {
        assert_eq!(embedded_country("DEUTPLPX"), Some("PL".to_string()));
        assert_eq!(embedded_country("ABCD"), None);
        assert_eq!(embedded_country("ABCDE"), None);
    }

    #[test]
    fn test_valid_length() {
        assert!(has_valid_length("DEUTPLPX"));
        assert!(has_valid_length("DEUTPLPXXXX"));
        assert!(!has_valid_length("DEUTPLP"));
        assert!(!has_valid_length("DEUTPLPXXX"));
    }

    #[test]
    fn test_new_normalizes() {
        let e = SwiftCodeEntry::new(
            "  aaaabbccxxx ",
            "Bank".to_string(),
            Some("Street 1".to_string()),
            None,
            "bb",
            "poland",
        );

        assert_eq!(e.swift_code, "AAAABBCCXXX");
        assert_eq!(e.country_iso2, "BB");
        assert_eq!(e.country_name, "POLAND");
        assert!(e.is_headquarter);
        assert_eq!(e.branch_prefix(), "AAAABBCC");
    }
}

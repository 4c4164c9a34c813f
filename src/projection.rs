// Response Projection - stored entries to external views
//
// Country name is only carried at the top level; entries nested in a list
// (country members, branches under an HQ) leave it out.

use crate::entities::SwiftCodeEntry;
use serde::{Deserialize, Serialize};

/// External view of one entry
///
/// Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwiftCodeView {
    pub address: String,

    #[serde(rename = "bankName")]
    pub bank_name: String,

    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "countryName")]
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,

    #[serde(rename = "isHeadquarter")]
    pub is_headquarter: bool,

    #[serde(rename = "swiftCode")]
    pub swift_code: String,

    /// Present only for headquarters that have at least one branch
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<SwiftCodeView>>,
}

/// All entries of one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryView {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "countryName")]
    pub country_name: String,

    #[serde(rename = "swiftCodes")]
    pub swift_codes: Vec<SwiftCodeView>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Address with town fallback; never null
pub fn display_address(entry: &SwiftCodeEntry) -> String {
    non_blank(entry.address.as_deref())
        .or_else(|| non_blank(entry.town_name.as_deref()))
        .unwrap_or_default()
        .to_string()
}

pub fn project(entry: &SwiftCodeEntry, include_country_name: bool) -> SwiftCodeView {
    SwiftCodeView {
        address: display_address(entry),
        bank_name: entry.bank_name.clone(),
        country_iso2: entry.country_iso2.clone(),
        country_name: include_country_name.then(|| entry.country_name.clone()),
        is_headquarter: entry.is_headquarter,
        swift_code: entry.swift_code.clone(),
        branches: None,
    }
}

/// Container view for a country listing
///
/// The container's name comes from the first entry; an empty listing has an
/// empty name.
pub fn project_country(iso2: &str, entries: &[SwiftCodeEntry]) -> CountryView {
    let country_name = entries
        .first()
        .map(|e| e.country_name.to_uppercase())
        .unwrap_or_default();

    CountryView {
        country_iso2: iso2.trim().to_uppercase(),
        country_name,
        swift_codes: entries.iter().map(|e| project(e, false)).collect(),
    }
}

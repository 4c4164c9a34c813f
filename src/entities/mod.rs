// Entity Models
//
// A SWIFT code entry is keyed by its code; the headquarters/branch
// relationship is derived from the code, never stored.

pub mod swift_code;

pub use swift_code::{
    branch_prefix, embedded_country, has_valid_length, is_headquarter_code, SwiftCodeEntry,
    BRANCH_PREFIX_LEN, HEADQUARTER_SUFFIX,
};

// SWIFT Registry - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod hierarchy;
pub mod ingest;
pub mod logging;
pub mod projection;
pub mod service;
pub mod store;
pub mod validation;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Config;
pub use db::{setup_database, RegistryStats, SqliteRegistry};
pub use entities::SwiftCodeEntry;
pub use error::{ErrorKind, RegistryError};
pub use hierarchy::resolve_details;
pub use ingest::{IngestionOutcome, IngestionPipeline, IngestionReport, SkipReason};
pub use projection::{project, project_country, CountryView, SwiftCodeView};
pub use service::{MessageResponse, SwiftCodeService};
pub use store::RegistryStore;
pub use validation::{validate_and_normalize, SwiftCodeRequest};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Shared types and pipeline stages for helpdesk SLA reporting.
//!
//! Raw exports flow through `normalizer` and `sla` into a canonical ticket
//! table, which `aggregate`, `render` and `document` turn into a paginated
//! PDF report. `report` wires the stages together.

pub mod aggregate;
pub mod clients;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod normalizer;
pub mod render;
pub mod report;
pub mod sla;
pub mod table;
pub mod ticket;

pub use config::SlaConfig;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::DeskError;
pub use table::{CanonicalTable, RawTable};
pub use ticket::{Resolution, Ticket};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "DESK_CONFIG";

/// Config file used when neither a flag nor the environment names one
pub const DEFAULT_CONFIG_PATH: &str = "config/details.json";

/// Default directory for intermediate artifacts
pub const DEFAULT_RESOURCE_ROOT: &str = "resources";

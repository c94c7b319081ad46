//! # gcodemeta core
//!
//! Schema and value types shared by every part of the extractor:
//! the attribute registry, normalized values and units, the metadata
//! record, scan configuration and the error taxonomy.

pub mod config;
pub mod error;
pub mod record;
pub mod registry;
pub mod units;
pub mod value;

pub use config::ScanConfig;
pub use error::{ConfigError, ExtractError, Result};
pub use record::{Assignment, MetadataRecord};
pub use registry::{attr, AttributeRegistry, AttributeSpec, SLICERS};
pub use units::Unit;
pub use value::{AttributeValue, ValueKind};

//! Apex incident model
//!
//! Typed incident and reference data for the incident console.
//!
//! # Overview
//!
//! - **RawIncident**: the untyped object the REST API returns
//! - **ReferenceData**: master-data collections (categories, sites, ...)
//! - **normalize**: resolves every classification reference of a raw
//!   incident into a canonical [`ClassificationField`]
//!
//! # Example
//!
//! ```rust
//! use apex_model::{normalize, ClassificationKind, RawIncident, ReferenceData};
//! use apex_model::{ReferenceKind, ReferenceRecord};
//! use serde_json::json;
//!
//! let reference = ReferenceData::new().with_collection(
//!     ReferenceKind::Categories,
//!     [ReferenceRecord::new(3, "Hardware")].into_iter().collect(),
//! );
//! let raw = RawIncident::from_value(json!({"id": 42, "categoryName": "hardware"})).unwrap();
//!
//! let incident = normalize(&raw, &reference);
//! assert_eq!(incident.classification_id(ClassificationKind::Category), Some(3));
//! ```

#![warn(missing_docs)]

pub mod classification;
pub mod enrichment;
pub mod error;
pub mod incident;
pub mod json;
pub mod reference;

// Re-exports
pub use classification::{ClassificationField, ClassificationKind};
pub use enrichment::normalize;
pub use error::ModelError;
pub use incident::{Incident, RawIncident};
pub use json::{alnum_fold, json_id, json_label};
pub use reference::{ReferenceCollection, ReferenceData, ReferenceKind, ReferenceRecord, User};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with incidents
    pub use crate::{
        normalize, ClassificationField, ClassificationKind, Incident, RawIncident,
        ReferenceCollection, ReferenceData, ReferenceKind, ReferenceRecord,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

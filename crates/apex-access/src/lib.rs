//! Apex access rules
//!
//! Maps a user's team label and the session's read-only flag to a
//! capability set and the ordered list of incident editor tabs.
//!
//! # Example
//!
//! ```rust
//! use apex_access::{IncidentTab, PermissionSet};
//!
//! let permissions = PermissionSet::resolve("Incident Handler", false);
//! assert!(permissions.has_full_access);
//! assert_eq!(permissions.visible_tabs().last(), Some(&IncidentTab::Knowledge));
//! ```

#![warn(missing_docs)]

pub mod permission;
pub mod role;
pub mod tab;

// Re-exports
pub use permission::{visible_tabs, PermissionSet};
pub use role::{RoleSet, TeamRole};
pub use tab::{clamp_tab, IncidentTab};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

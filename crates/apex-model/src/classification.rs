//! Classification fields of an incident
//!
//! An incident references seven master-data collections. On the wire each
//! reference can arrive as an id, a bare display name, or a nested
//! `{id, name}` object. [`ClassificationField`] is the one shape the rest of
//! the workspace sees.

use crate::reference::ReferenceKind;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The seven classification references carried by an incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationKind {
    /// Incident category
    Category,
    /// Site the incident was raised for
    Site,
    /// How the incident was reported
    ContactType,
    /// Urgency rating
    Urgency,
    /// Impact rating
    Impact,
    /// Affected asset
    Asset,
    /// Workflow state
    IncidentState,
}

impl ClassificationKind {
    /// Every classification kind, in normalization order
    pub const ALL: [Self; 7] = [
        Self::Category,
        Self::Site,
        Self::ContactType,
        Self::Urgency,
        Self::Impact,
        Self::Asset,
        Self::IncidentState,
    ];

    /// Wire key holding the foreign-key id
    #[inline]
    #[must_use]
    pub fn id_key(self) -> &'static str {
        match self {
            Self::Category => "category_id",
            Self::Site => "site_id",
            Self::ContactType => "contact_type_id",
            Self::Urgency => "urgency_id",
            Self::Impact => "impact_id",
            Self::Asset => "asset_id",
            Self::IncidentState => "incidentstate_id",
        }
    }

    /// Wire key holding the nested `{id, name}` object
    #[inline]
    #[must_use]
    pub fn object_key(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Site => "site",
            Self::ContactType => "contacttype",
            Self::Urgency => "urgency",
            Self::Impact => "impact",
            Self::Asset => "asset",
            Self::IncidentState => "incidentstate",
        }
    }

    /// Wire key holding a display name without an id, if the API has one
    #[inline]
    #[must_use]
    pub fn name_key(self) -> Option<&'static str> {
        match self {
            Self::Category => Some("categoryName"),
            Self::Site => Some("siteName"),
            Self::ContactType => Some("contactTypeName"),
            Self::Urgency => Some("urgencyName"),
            Self::Impact => Some("impactName"),
            Self::Asset => Some("assetName"),
            Self::IncidentState => None,
        }
    }

    /// Reference collection the field points into
    #[inline]
    #[must_use]
    pub fn reference_kind(self) -> ReferenceKind {
        match self {
            Self::Category => ReferenceKind::Categories,
            Self::Site => ReferenceKind::Sites,
            Self::ContactType => ReferenceKind::ContactTypes,
            Self::Urgency => ReferenceKind::Urgencies,
            Self::Impact => ReferenceKind::Impacts,
            Self::Asset => ReferenceKind::Assets,
            Self::IncidentState => ReferenceKind::IncidentStates,
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Site => "site",
            Self::ContactType => "contact type",
            Self::Urgency => "urgency",
            Self::Impact => "impact",
            Self::Asset => "asset",
            Self::IncidentState => "incident state",
        }
    }

    /// Whether `key` is one of the wire keys of this field
    #[must_use]
    pub fn owns_key(self, key: &str) -> bool {
        key == self.id_key() || key == self.object_key() || self.name_key() == Some(key)
    }
}

impl std::fmt::Display for ClassificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical classification reference
///
/// `id` is `None` when a display name could not be matched against
/// reference data; the name is then kept exactly as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassificationField {
    /// Foreign-key id into the reference collection
    pub id: Option<i64>,
    /// Display name
    pub name: String,
}

impl ClassificationField {
    /// Create a field
    #[inline]
    #[must_use]
    pub fn new(id: Option<i64>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Create a resolved field
    #[inline]
    #[must_use]
    pub fn resolved(id: i64, name: impl Into<String>) -> Self {
        Self::new(Some(id), name)
    }

    /// Create a field whose name matched nothing
    #[inline]
    #[must_use]
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::new(None, name)
    }

    /// Whether the field points at a known record
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.id.is_some()
    }

    /// Wire form `{id, name}`
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({ "id": self.id, "name": self.name })
    }
}

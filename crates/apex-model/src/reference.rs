//! Reference ("master") data
//!
//! Collections of `{id, name, ...}` records fetched once per editing session
//! and treated as immutable for its lifetime.

use crate::classification::ClassificationKind;
use crate::error::ModelError;
use crate::json::{alnum_fold, json_id, json_label};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Named reference collections served under `/master/{slug}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Incident categories
    Categories,
    /// Sub-categories, each tagged with a parent `category_id`
    SubCategories,
    /// Contact types
    ContactTypes,
    /// Impact ratings
    Impacts,
    /// Urgency ratings
    Urgencies,
    /// Workflow states, ordered by id
    IncidentStates,
    /// Sites; names may live under `premises` or `catchment`
    Sites,
    /// Assets
    Assets,
}

impl ReferenceKind {
    /// Every collection, in fetch order
    pub const ALL: [Self; 8] = [
        Self::Categories,
        Self::SubCategories,
        Self::ContactTypes,
        Self::Impacts,
        Self::Urgencies,
        Self::IncidentStates,
        Self::Sites,
        Self::Assets,
    ];

    /// Path segment under `/master`
    #[inline]
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::SubCategories => "subcategories",
            Self::ContactTypes => "contact-types",
            Self::Impacts => "impacts",
            Self::Urgencies => "urgencies",
            Self::IncidentStates => "incident-states",
            Self::Sites => "sites",
            Self::Assets => "assets",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ReferenceKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == wanted)
            .ok_or_else(|| ModelError::UnknownName {
                what: "reference collection",
                value: s.to_string(),
            })
    }
}

/// One record of a reference collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceRecord {
    /// Unique id within the collection
    pub id: i64,
    /// Display name (may be empty for sites named by premises)
    pub name: String,
    /// Alternate site name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premises: Option<String>,
    /// Alternate site name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catchment: Option<String>,
    /// Parent category for sub-categories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    /// Remaining fields, untouched
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ReferenceRecord {
    /// Create a record with just an id and a name
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            premises: None,
            catchment: None,
            category_id: None,
            attributes: Map::new(),
        }
    }

    /// With parent category
    #[must_use]
    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// With alternate site names
    #[must_use]
    pub fn with_site_names(mut self, premises: Option<&str>, catchment: Option<&str>) -> Self {
        self.premises = premises.map(str::to_owned);
        self.catchment = catchment.map(str::to_owned);
        self
    }

    /// Read a record from an API payload element
    ///
    /// # Errors
    /// `NotAnObject` for non-objects, `MissingId` when `id` is absent or not an integer.
    pub fn from_value(value: &Value) -> Result<Self, ModelError> {
        let object = value
            .as_object()
            .ok_or_else(|| ModelError::not_an_object("reference", value))?;
        let id = object
            .get("id")
            .and_then(json_id)
            .ok_or(ModelError::MissingId { what: "reference" })?;

        let attributes = object
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "id" | "name" | "premises" | "catchment" | "category_id"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            id,
            name: object.get("name").and_then(json_label).unwrap_or_default(),
            premises: object.get("premises").and_then(json_label),
            catchment: object.get("catchment").and_then(json_label),
            category_id: object.get("category_id").and_then(json_id),
            attributes,
        })
    }

    /// First non-empty of `name`, `premises`, `catchment`
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name_candidates().next().unwrap_or_default()
    }

    /// Every label this record can be matched by
    pub fn name_candidates(&self) -> impl Iterator<Item = &str> {
        [Some(self.name.as_str()), self.premises.as_deref(), self.catchment.as_deref()]
            .into_iter()
            .flatten()
            .filter(|label| !label.trim().is_empty())
    }
}

/// Insertion-ordered collection keyed by record id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceCollection {
    records: IndexMap<i64, ReferenceRecord>,
}

impl ReferenceCollection {
    /// Create an empty collection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from payload elements, skipping unreadable ones
    #[must_use]
    pub fn from_values(values: &[Value]) -> Self {
        let mut collection = Self::new();
        for value in values {
            match ReferenceRecord::from_value(value) {
                Ok(record) => {
                    collection.insert(record);
                }
                Err(error) => tracing::debug!(%error, "skipping reference record"),
            }
        }
        collection
    }

    /// Insert a record; the first record wins on duplicate ids
    ///
    /// Returns `false` when the id was already present.
    pub fn insert(&mut self, record: ReferenceRecord) -> bool {
        match self.records.entry(record.id) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Look up by id
    #[inline]
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&ReferenceRecord> {
        self.records.get(&id)
    }

    /// Find the record a display name refers to
    ///
    /// Case-insensitive exact match first, then a match with every
    /// non-alphanumeric character removed. Sites are also matched by their
    /// `premises` and `catchment` labels.
    #[must_use]
    pub fn match_name(&self, name: &str) -> Option<&ReferenceRecord> {
        let wanted = name.trim();
        if wanted.is_empty() {
            return None;
        }

        let lowered = wanted.to_lowercase();
        let exact = self
            .records
            .values()
            .find(|record| record.name_candidates().any(|label| label.trim().to_lowercase() == lowered));
        if exact.is_some() {
            return exact;
        }

        let folded = alnum_fold(wanted);
        if folded.is_empty() {
            return None;
        }
        self.records
            .values()
            .find(|record| record.name_candidates().any(|label| alnum_fold(label) == folded))
    }

    /// Records ordered by ascending id
    #[must_use]
    pub fn sorted_by_id(&self) -> Vec<&ReferenceRecord> {
        let mut records: Vec<&ReferenceRecord> = self.records.values().collect();
        records.sort_by_key(|record| record.id);
        records
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceRecord> {
        self.records.values()
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ReferenceRecord> for ReferenceCollection {
    fn from_iter<I: IntoIterator<Item = ReferenceRecord>>(iter: I) -> Self {
        let mut collection = Self::new();
        for record in iter {
            collection.insert(record);
        }
        collection
    }
}

/// A console user as returned by `/users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// User id
    pub id: i64,
    /// Name shown in assignment lists and history
    pub display_name: String,
    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Team/role label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

impl User {
    /// Read a user from an API payload element
    ///
    /// # Errors
    /// `NotAnObject` for non-objects, `MissingId` when `id` is unusable.
    pub fn from_value(value: &Value) -> Result<Self, ModelError> {
        let object = value
            .as_object()
            .ok_or_else(|| ModelError::not_an_object("user", value))?;
        let id = object
            .get("id")
            .and_then(json_id)
            .ok_or(ModelError::MissingId { what: "user" })?;
        let label = |key: &str| object.get(key).and_then(json_label);

        let full_name = match (label("first_name"), label("last_name")) {
            (Some(first), Some(last)) => Some(format!("{} {}", first.trim(), last.trim())),
            (Some(only), None) | (None, Some(only)) => Some(only.trim().to_string()),
            (None, None) => None,
        };
        let email = label("email");
        let display_name = label("name")
            .or(full_name)
            .or_else(|| label("username"))
            .or_else(|| email.clone())
            .unwrap_or_else(|| format!("User #{id}"));

        let team = label("team").or_else(|| label("team_name")).or_else(|| {
            object
                .get("team")
                .and_then(|team| team.get("name"))
                .and_then(json_label)
        });

        Ok(Self {
            id,
            display_name,
            email,
            team,
        })
    }
}

/// Every reference collection needed to edit an incident
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    categories: ReferenceCollection,
    sub_categories: ReferenceCollection,
    contact_types: ReferenceCollection,
    impacts: ReferenceCollection,
    urgencies: ReferenceCollection,
    incident_states: ReferenceCollection,
    sites: ReferenceCollection,
    assets: ReferenceCollection,
    users: Vec<User>,
    user_lookup: BTreeMap<i64, String>,
}

impl ReferenceData {
    /// Create empty reference data
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a collection
    #[must_use]
    pub fn with_collection(mut self, kind: ReferenceKind, collection: ReferenceCollection) -> Self {
        *self.collection_mut(kind) = collection;
        self
    }

    /// With users; rebuilds the user lookup
    #[must_use]
    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.user_lookup = users
            .iter()
            .map(|user| (user.id, user.display_name.clone()))
            .collect();
        self.users = users;
        self
    }

    /// Collection by kind
    #[must_use]
    pub fn collection(&self, kind: ReferenceKind) -> &ReferenceCollection {
        match kind {
            ReferenceKind::Categories => &self.categories,
            ReferenceKind::SubCategories => &self.sub_categories,
            ReferenceKind::ContactTypes => &self.contact_types,
            ReferenceKind::Impacts => &self.impacts,
            ReferenceKind::Urgencies => &self.urgencies,
            ReferenceKind::IncidentStates => &self.incident_states,
            ReferenceKind::Sites => &self.sites,
            ReferenceKind::Assets => &self.assets,
        }
    }

    fn collection_mut(&mut self, kind: ReferenceKind) -> &mut ReferenceCollection {
        match kind {
            ReferenceKind::Categories => &mut self.categories,
            ReferenceKind::SubCategories => &mut self.sub_categories,
            ReferenceKind::ContactTypes => &mut self.contact_types,
            ReferenceKind::Impacts => &mut self.impacts,
            ReferenceKind::Urgencies => &mut self.urgencies,
            ReferenceKind::IncidentStates => &mut self.incident_states,
            ReferenceKind::Sites => &mut self.sites,
            ReferenceKind::Assets => &mut self.assets,
        }
    }

    /// Collection a classification field points into
    #[inline]
    #[must_use]
    pub fn for_classification(&self, kind: ClassificationKind) -> &ReferenceCollection {
        self.collection(kind.reference_kind())
    }

    /// Workflow states
    #[inline]
    #[must_use]
    pub fn incident_states(&self) -> &ReferenceCollection {
        &self.incident_states
    }

    /// Sub-categories belonging to a category
    pub fn subcategories_for(&self, category_id: i64) -> impl Iterator<Item = &ReferenceRecord> {
        self.sub_categories
            .iter()
            .filter(move |record| record.category_id == Some(category_id))
    }

    /// All users
    #[inline]
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// User id → display name
    #[inline]
    #[must_use]
    pub fn user_lookup(&self) -> &BTreeMap<i64, String> {
        &self.user_lookup
    }

    /// Display name of a user
    #[must_use]
    pub fn user_name(&self, id: i64) -> Option<&str> {
        self.user_lookup.get(&id).map(String::as_str)
    }
}

//! Partial incident updates

use apex_model::{json_id, ClassificationKind, Incident, RawIncident};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Keys the payload reserves for identification
const RESERVED_KEYS: [&str; 3] = ["id", "user_id", "incident_id"];

/// Changed fields of an incident
///
/// Only what was set is sent; classifications are sent by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentUpdate {
    fields: Map<String, Value>,
    classifications: BTreeSet<ClassificationKind>,
}

impl IncidentUpdate {
    /// Create empty update
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the one-line summary
    #[must_use]
    pub fn short_description(self, text: impl Into<String>) -> Self {
        self.field("short_description", Value::String(text.into()))
    }

    /// Set the description
    #[must_use]
    pub fn description(self, text: impl Into<String>) -> Self {
        self.field("description", Value::String(text.into()))
    }

    /// Set the narration
    #[must_use]
    pub fn narration(self, text: impl Into<String>) -> Self {
        self.field("narration", Value::String(text.into()))
    }

    /// Point a classification at another record, or clear it
    #[must_use]
    pub fn classification(mut self, kind: ClassificationKind, id: Option<i64>) -> Self {
        self.classifications.insert(kind);
        self.fields
            .insert(kind.id_key().to_owned(), id.map_or(Value::Null, Value::from));
        self
    }

    /// Move the incident to another workflow state
    #[must_use]
    pub fn status(self, state_id: i64) -> Self {
        self.classification(ClassificationKind::IncidentState, Some(state_id))
    }

    /// Set an arbitrary field
    ///
    /// Identification keys (`id`, `user_id`, `incident_id`) are ignored.
    /// A classification id key (`category_id`, ...) is routed through
    /// [`Self::classification`]; a value that is not an id clears it.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if RESERVED_KEYS.contains(&key.as_str()) {
            return self;
        }
        if let Some(kind) = ClassificationKind::ALL
            .into_iter()
            .find(|kind| kind.id_key() == key.as_str())
        {
            return self.classification(kind, json_id(&value));
        }
        self.fields.insert(key, value);
        self
    }

    /// Fields that differ between `original` and `edited`
    #[must_use]
    pub fn diff(original: &Incident, edited: &Incident) -> Self {
        let mut update = Self::new();

        if original.short_description != edited.short_description {
            update = update.short_description(edited.short_description.clone());
        }
        if original.description != edited.description {
            update = update.description(edited.description.clone());
        }
        if original.narration != edited.narration {
            update = update.narration(edited.narration.clone());
        }
        for kind in ClassificationKind::ALL {
            let before = original.classification_id(kind);
            let after = edited.classification_id(kind);
            if before != after {
                update = update.classification(kind, after);
            }
        }
        for (key, value) in &edited.extra {
            if original.extra.get(key) != Some(value) {
                update = update.field(key.clone(), value.clone());
            }
        }
        update
    }

    /// Nothing changed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Changed fields
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Request body for the edit endpoint
    #[must_use]
    pub fn to_payload(&self, user_id: i64, incident_id: i64) -> Value {
        let mut body = self.fields.clone();
        body.insert("user_id".into(), user_id.into());
        body.insert("incident_id".into(), incident_id.into());
        Value::Object(body)
    }

    /// `raw` with this update applied
    ///
    /// A changed classification drops its nested object and name keys so
    /// the next normalization resolves the new id instead of a stale name.
    #[must_use]
    pub fn apply_to(&self, raw: &RawIncident) -> RawIncident {
        let mut base = raw.clone();
        for kind in &self.classifications {
            base.remove(kind.object_key());
            if let Some(name_key) = kind.name_key() {
                base.remove(name_key);
            }
        }
        base.merged_with(&self.fields)
    }
}

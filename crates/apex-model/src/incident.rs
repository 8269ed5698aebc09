//! Incident records
//!
//! [`RawIncident`] is the untyped object the API hands out. [`Incident`] is
//! the normalized record produced by [`crate::normalize`]; nothing past the
//! enrichment pass should need to look at raw keys.

use crate::classification::{ClassificationField, ClassificationKind};
use crate::error::ModelError;
use crate::json::json_id;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Incident exactly as received from the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawIncident(Map<String, Value>);

impl RawIncident {
    /// Wrap a JSON object
    #[inline]
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Accept a JSON value if it is an object
    ///
    /// # Errors
    /// `ModelError::NotAnObject` for any other JSON type.
    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(ModelError::not_an_object("incident", &other)),
        }
    }

    /// Underlying fields
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Field by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Incident id, when present
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(json_id)
    }

    /// Copy with `changes` written over existing keys
    #[must_use]
    pub fn merged_with(&self, changes: &Map<String, Value>) -> Self {
        let mut fields = self.0.clone();
        for (key, value) in changes {
            fields.insert(key.clone(), value.clone());
        }
        Self(fields)
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Unwrap into a JSON value
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for RawIncident {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Keys consumed by normalization besides the classification keys
pub(crate) const CORE_KEYS: [&str; 7] = [
    "id",
    "incident_no",
    "short_description",
    "shortDescription",
    "description",
    "narration",
    "status_id",
];

/// Normalized incident
///
/// Every classification that carried any information holds a
/// [`ClassificationField`]; all other input keys survive in `extra`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Incident {
    /// Stable incident id
    pub id: Option<i64>,
    /// Display number, e.g. `INC-00042`
    pub incident_no: Option<String>,
    /// One-line summary
    pub short_description: String,
    /// Full description
    pub description: String,
    /// Free-form narration
    pub narration: String,
    /// Legacy workflow status id
    pub status_id: Option<i64>,
    pub(crate) classifications: BTreeMap<ClassificationKind, ClassificationField>,
    /// Every other field, untouched
    pub extra: Map<String, Value>,
}

impl Incident {
    /// Classification by kind
    #[inline]
    #[must_use]
    pub fn classification(&self, kind: ClassificationKind) -> Option<&ClassificationField> {
        self.classifications.get(&kind)
    }

    /// Classification id by kind
    #[inline]
    #[must_use]
    pub fn classification_id(&self, kind: ClassificationKind) -> Option<i64> {
        self.classification(kind).and_then(|field| field.id)
    }

    /// Present classifications in kind order
    pub fn classifications(&self) -> impl Iterator<Item = (ClassificationKind, &ClassificationField)> {
        self.classifications.iter().map(|(kind, field)| (*kind, field))
    }

    /// Replace or clear a classification
    pub fn set_classification(&mut self, kind: ClassificationKind, field: Option<ClassificationField>) {
        match field {
            Some(field) => {
                self.classifications.insert(kind, field);
            }
            None => {
                self.classifications.remove(&kind);
            }
        }
    }

    /// Canonical wire form
    ///
    /// Each present classification is written as both `<field>_id` and a
    /// nested `<field>` object. Alternate input keys are not re-emitted.
    #[must_use]
    pub fn to_raw(&self) -> RawIncident {
        let mut fields = self.extra.clone();
        if let Some(id) = self.id {
            fields.insert("id".into(), id.into());
        }
        if let Some(number) = &self.incident_no {
            fields.insert("incident_no".into(), number.clone().into());
        }
        fields.insert("short_description".into(), self.short_description.clone().into());
        fields.insert("description".into(), self.description.clone().into());
        fields.insert("narration".into(), self.narration.clone().into());
        if let Some(status) = self.status_id {
            fields.insert("status_id".into(), status.into());
        }
        for (kind, field) in &self.classifications {
            fields.insert(kind.id_key().into(), field.id.map_or(Value::Null, Value::from));
            fields.insert(kind.object_key().into(), field.to_value());
        }
        RawIncident(fields)
    }

    /// Title for headings: `"<incident_no> <short_description>"`
    #[must_use]
    pub fn title(&self) -> String {
        match &self.incident_no {
            Some(number) if !self.short_description.is_empty() => {
                format!("{number} {}", self.short_description)
            }
            Some(number) => number.clone(),
            None => self.short_description.clone(),
        }
    }
}

impl Serialize for Incident {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_raw().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_incident_rejects_non_objects() {
        assert!(RawIncident::from_value(json!({"id": 1})).is_ok());
        assert!(RawIncident::from_value(json!([1])).is_err());
    }

    #[test]
    fn merged_with_overwrites_keys() {
        let raw = RawIncident::from_value(json!({"id": 1, "narration": "old"})).unwrap();
        let mut changes = Map::new();
        changes.insert("narration".into(), json!("new"));
        let merged = raw.merged_with(&changes);
        assert_eq!(merged.get("narration"), Some(&json!("new")));
        assert_eq!(raw.get("narration"), Some(&json!("old")));
    }

    #[test]
    fn to_raw_emits_both_id_and_object() {
        let mut incident = Incident {
            id: Some(3),
            ..Incident::default()
        };
        incident.set_classification(
            ClassificationKind::Urgency,
            Some(ClassificationField::unresolved("Soon")),
        );
        let raw = incident.to_raw();
        assert_eq!(raw.get("urgency_id"), Some(&Value::Null));
        assert_eq!(raw.get("urgency"), Some(&json!({"id": null, "name": "Soon"})));
        assert_eq!(raw.id(), Some(3));
    }

    #[test]
    fn title_combines_number_and_summary() {
        let incident = Incident {
            incident_no: Some("INC-7".into()),
            short_description: "Printer jam".into(),
            ..Incident::default()
        };
        assert_eq!(incident.title(), "INC-7 Printer jam");
    }
}

//! Incident enrichment
//!
//! Resolves every classification reference of a raw incident against
//! reference data so that each one has both an id and a display name.
//! A name that matches nothing keeps its original text with a null id.

use crate::classification::{ClassificationField, ClassificationKind};
use crate::incident::{Incident, RawIncident, CORE_KEYS};
use crate::json::{json_id, json_label, json_text};
use crate::reference::{ReferenceCollection, ReferenceData};
use serde_json::{Map, Value};

/// Normalize a raw incident against reference data
///
/// Pure and idempotent: normalizing the wire form of the result again
/// yields the same incident.
#[must_use]
pub fn normalize(raw: &RawIncident, reference: &ReferenceData) -> Incident {
    let fields = raw.as_map();

    let classifications = ClassificationKind::ALL
        .into_iter()
        .filter_map(|kind| {
            resolve_classification(kind, fields, reference.for_classification(kind))
                .map(|field| (kind, field))
        })
        .collect();

    let extra = fields
        .iter()
        .filter(|(key, _)| !is_consumed_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Incident {
        id: fields.get("id").and_then(json_id),
        incident_no: fields.get("incident_no").and_then(incident_number),
        short_description: text_field(fields, &["short_description", "shortDescription"]),
        description: text_field(fields, &["description"]),
        narration: text_field(fields, &["narration"]),
        status_id: fields.get("status_id").and_then(json_id),
        classifications,
        extra,
    }
}

fn resolve_classification(
    kind: ClassificationKind,
    fields: &Map<String, Value>,
    collection: &ReferenceCollection,
) -> Option<ClassificationField> {
    let explicit_id = fields.get(kind.id_key()).and_then(json_id);
    let nested = fields.get(kind.object_key());
    let nested_id = nested.and_then(|value| value.get("id")).and_then(json_id);

    // Already enriched: keep the name, `<field>_id` overrides the nested id.
    if let Some(name) = nested
        .and_then(|value| value.get("name"))
        .and_then(Value::as_str)
    {
        return Some(ClassificationField::new(explicit_id.or(nested_id), name));
    }

    let supplied_name = kind
        .name_key()
        .and_then(|key| fields.get(key))
        .and_then(json_label)
        .or_else(|| nested.and_then(json_label));

    match (explicit_id.or(nested_id), supplied_name) {
        (Some(id), supplied) => {
            let name = collection
                .get(id)
                .map(|record| record.display_name().to_owned())
                .or(supplied)
                .unwrap_or_default();
            Some(ClassificationField::resolved(id, name))
        }
        (None, Some(name)) => Some(match collection.match_name(&name) {
            Some(record) => ClassificationField::resolved(record.id, record.display_name()),
            None => {
                tracing::debug!(field = %kind, %name, "no reference match, keeping name");
                ClassificationField::unresolved(name)
            }
        }),
        (None, None) => None,
    }
}

fn text_field(fields: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| fields.get(*key).and_then(json_text))
        .unwrap_or_default()
}

fn incident_number(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        other => json_label(other),
    }
}

fn is_consumed_key(key: &str) -> bool {
    CORE_KEYS.contains(&key) || ClassificationKind::ALL.iter().any(|kind| kind.owns_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{ReferenceKind, ReferenceRecord};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn reference() -> ReferenceData {
        ReferenceData::new()
            .with_collection(
                ReferenceKind::Categories,
                [ReferenceRecord::new(1, "Hardware"), ReferenceRecord::new(2, "Network")]
                    .into_iter()
                    .collect(),
            )
            .with_collection(
                ReferenceKind::Sites,
                [
                    ReferenceRecord::new(5, "Head Office"),
                    ReferenceRecord::new(6, "").with_site_names(Some("North Depot"), None),
                ]
                .into_iter()
                .collect(),
            )
            .with_collection(
                ReferenceKind::IncidentStates,
                [ReferenceRecord::new(1, "New"), ReferenceRecord::new(2, "In Progress")]
                    .into_iter()
                    .collect(),
            )
    }

    fn raw(value: Value) -> RawIncident {
        RawIncident::from_value(value).unwrap()
    }

    #[test]
    fn name_only_field_is_resolved() {
        let incident = normalize(&raw(json!({"id": 1, "categoryName": "hardware"})), &reference());
        assert_eq!(
            incident.classification(ClassificationKind::Category),
            Some(&ClassificationField::resolved(1, "Hardware"))
        );
    }

    #[test]
    fn site_name_matches_premises() {
        let incident = normalize(&raw(json!({"siteName": "north-depot"})), &reference());
        assert_eq!(
            incident.classification(ClassificationKind::Site),
            Some(&ClassificationField::resolved(6, "North Depot"))
        );
    }

    #[test]
    fn nested_name_is_kept_and_id_backfilled() {
        let incident = normalize(&raw(json!({"category": {"id": 2, "name": "Networking"}})), &reference());
        assert_eq!(
            incident.classification(ClassificationKind::Category),
            Some(&ClassificationField::resolved(2, "Networking"))
        );
    }

    #[test]
    fn explicit_id_overrides_nested_id() {
        let incident = normalize(
            &raw(json!({"category_id": 1, "category": {"id": 2, "name": "Network"}})),
            &reference(),
        );
        assert_eq!(incident.classification_id(ClassificationKind::Category), Some(1));
    }

    #[test]
    fn id_only_field_gets_reference_name() {
        let incident = normalize(&raw(json!({"incidentstate_id": "2"})), &reference());
        assert_eq!(
            incident.classification(ClassificationKind::IncidentState),
            Some(&ClassificationField::resolved(2, "In Progress"))
        );
    }

    #[test]
    fn unknown_id_keeps_supplied_name() {
        let incident = normalize(&raw(json!({"category_id": 99, "categoryName": "Legacy"})), &reference());
        assert_eq!(
            incident.classification(ClassificationKind::Category),
            Some(&ClassificationField::resolved(99, "Legacy"))
        );
    }

    #[test]
    fn bare_string_object_is_treated_as_name() {
        let incident = normalize(&raw(json!({"category": "network"})), &reference());
        assert_eq!(incident.classification_id(ClassificationKind::Category), Some(2));
    }

    #[test]
    fn absent_fields_stay_absent() {
        let incident = normalize(&raw(json!({"id": 4})), &reference());
        assert_eq!(incident.classifications().count(), 0);
    }

    #[test]
    fn short_description_falls_back_to_camel_case() {
        let incident = normalize(
            &raw(json!({"short_description": "", "shortDescription": "Printer jam", "description": "Tray 2"})),
            &reference(),
        );
        assert_eq!(incident.short_description, "Printer jam");
        assert_eq!(incident.description, "Tray 2");
    }

    #[test]
    fn unrelated_fields_are_preserved() {
        let incident = normalize(
            &raw(json!({"id": 4, "reported_by": 12, "categoryName": "Hardware"})),
            &reference(),
        );
        assert_eq!(incident.extra.get("reported_by"), Some(&json!(12)));
        assert!(!incident.extra.contains_key("categoryName"));
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let input = raw(json!({
            "id": 8,
            "incident_no": 1008,
            "shortDescription": "VPN down",
            "categoryName": "Xyzzy",
            "siteName": "head office",
            "urgency_id": 4,
            "incidentstate": {"id": 2},
            "status_id": 2,
        }));
        let once = normalize(&input, &reference());
        let twice = normalize(&once.to_raw(), &reference());
        assert_eq!(once, twice);
    }
}

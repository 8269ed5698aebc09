use apex_model::{
    normalize, ClassificationField, ClassificationKind, RawIncident, ReferenceCollection,
    ReferenceData, ReferenceKind, ReferenceRecord,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn reference() -> ReferenceData {
    let collection = |records: &[(i64, &str)]| -> ReferenceCollection {
        records
            .iter()
            .map(|(id, name)| ReferenceRecord::new(*id, *name))
            .collect()
    };
    ReferenceData::new()
        .with_collection(ReferenceKind::Categories, collection(&[(1, "Hardware"), (2, "Soft-ware")]))
        .with_collection(
            ReferenceKind::Sites,
            [
                ReferenceRecord::new(1, "Head Office"),
                ReferenceRecord::new(2, "").with_site_names(Some("North Depot"), Some("Zone A")),
            ]
            .into_iter()
            .collect(),
        )
        .with_collection(ReferenceKind::ContactTypes, collection(&[(1, "Phone"), (2, "Email")]))
        .with_collection(ReferenceKind::Urgencies, collection(&[(1, "High"), (2, "Low")]))
        .with_collection(ReferenceKind::Impacts, collection(&[(1, "Wide"), (3, "Single User")]))
        .with_collection(ReferenceKind::Assets, collection(&[(7, "Laptop 7")]))
        .with_collection(
            ReferenceKind::IncidentStates,
            collection(&[(1, "New"), (2, "In Progress"), (3, "Resolved"), (4, "Closed")]),
        )
}

/// One way the API may encode a classification reference
#[derive(Debug, Clone)]
enum Encoding {
    Absent,
    IdOnly(i64),
    NameOnly(String),
    Nested(Option<i64>, String),
    NestedIdOnly(i64),
    IdAndName(i64, String),
}

fn name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("hardware".to_string()),
        Just("SOFT ware".to_string()),
        Just("north depot".to_string()),
        Just("zone-a".to_string()),
        Just("Xyzzy".to_string()),
        Just("in progress".to_string()),
        "[A-Za-z -]{1,12}",
    ]
}

fn encoding() -> impl Strategy<Value = Encoding> {
    prop_oneof![
        Just(Encoding::Absent),
        (0i64..10).prop_map(Encoding::IdOnly),
        name().prop_map(Encoding::NameOnly),
        (proptest::option::of(0i64..10), name()).prop_map(|(id, n)| Encoding::Nested(id, n)),
        (0i64..10).prop_map(Encoding::NestedIdOnly),
        (0i64..10, name()).prop_map(|(id, n)| Encoding::IdAndName(id, n)),
    ]
}

fn encode(kind: ClassificationKind, encoding: &Encoding, fields: &mut Map<String, Value>) {
    let name_key = kind.name_key().unwrap_or(kind.object_key());
    match encoding {
        Encoding::Absent => {}
        Encoding::IdOnly(id) => {
            fields.insert(kind.id_key().into(), json!(id));
        }
        Encoding::NameOnly(name) => {
            fields.insert(name_key.into(), json!(name));
        }
        Encoding::Nested(id, name) => {
            fields.insert(kind.object_key().into(), json!({"id": id, "name": name}));
        }
        Encoding::NestedIdOnly(id) => {
            fields.insert(kind.object_key().into(), json!({ "id": id }));
        }
        Encoding::IdAndName(id, name) => {
            fields.insert(kind.id_key().into(), json!(id.to_string()));
            fields.insert(name_key.into(), json!(name));
        }
    }
}

fn raw_incident() -> impl Strategy<Value = RawIncident> {
    (
        proptest::collection::vec(encoding(), 7),
        proptest::option::of(1i64..1000),
        "[a-z ]{0,10}",
        proptest::bool::ANY,
    )
        .prop_map(|(encodings, id, summary, camel_case)| {
            let mut fields = Map::new();
            if let Some(id) = id {
                fields.insert("id".into(), json!(id));
            }
            let summary_key = if camel_case { "shortDescription" } else { "short_description" };
            fields.insert(summary_key.into(), json!(summary));
            fields.insert("reported_by".into(), json!(12));
            for (kind, encoding) in ClassificationKind::ALL.iter().zip(&encodings) {
                encode(*kind, encoding, &mut fields);
            }
            RawIncident::new(fields)
        })
}

proptest! {
    #[test]
    fn prop_normalize_is_idempotent(raw in raw_incident()) {
        let reference = reference();
        let once = normalize(&raw, &reference);
        let twice = normalize(&once.to_raw(), &reference);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_every_present_field_has_id_and_object(raw in raw_incident()) {
        let normalized = normalize(&raw, &reference()).to_raw();
        for (kind, _) in normalize(&raw, &reference()).classifications() {
            let id = normalized.get(kind.id_key()).cloned();
            let object = normalized.get(kind.object_key()).cloned().unwrap_or(Value::Null);
            prop_assert!(id.is_some());
            prop_assert_eq!(object.get("id").cloned(), id);
            prop_assert!(object.get("name").and_then(Value::as_str).is_some());
        }
    }

    #[test]
    fn prop_nested_id_is_backfilled(kind_index in 0usize..7, id in 1i64..500) {
        let kind = ClassificationKind::ALL[kind_index];
        let mut fields = Map::new();
        fields.insert(kind.object_key().into(), json!({"id": id, "name": "Anything"}));

        let incident = normalize(&RawIncident::new(fields), &reference());
        prop_assert_eq!(incident.classification_id(kind), Some(id));
        prop_assert_eq!(incident.to_raw().get(kind.id_key()).cloned(), Some(json!(id)));
    }
}

#[test]
fn unmatched_name_is_never_dropped() {
    let raw = RawIncident::from_value(json!({"id": 1, "categoryName": "Xyzzy"})).unwrap();
    let incident = normalize(&raw, &reference());
    assert_eq!(
        incident.classification(ClassificationKind::Category),
        Some(&ClassificationField::unresolved("Xyzzy"))
    );
    assert_eq!(incident.to_raw().get("category_id"), Some(&Value::Null));
}

#[test]
fn every_name_field_matches_case_and_punctuation_insensitively() {
    let raw = RawIncident::from_value(json!({
        "categoryName": "HARD-WARE",
        "siteName": "zone a",
        "contactTypeName": "e-mail",
        "urgencyName": "low",
        "impactName": "single_user",
        "assetName": "laptop7",
    }))
    .unwrap();
    let incident = normalize(&raw, &reference());

    let ids: Vec<Option<i64>> = [
        ClassificationKind::Category,
        ClassificationKind::Site,
        ClassificationKind::ContactType,
        ClassificationKind::Urgency,
        ClassificationKind::Impact,
        ClassificationKind::Asset,
    ]
    .into_iter()
    .map(|kind| incident.classification_id(kind))
    .collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(2), Some(2), Some(3), Some(7)]);
}

//! Console commands

use crate::render;
use anyhow::{anyhow, bail, Context};
use apex_access::PermissionSet;
use apex_client::ApiClient;
use apex_core::{IncidentEditSession, IncidentUpdate, SessionRequest, SessionSettings, SessionUser};
use apex_model::RawIncident;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

/// `tabs`: permission set and tabs for a team label
#[must_use]
pub fn tabs(team_label: &str, read_only: bool) -> String {
    render::permissions_text(&PermissionSet::resolve(team_label, read_only))
}

/// `show`: open a session on an incident and describe it
///
/// # Errors
/// The incident cannot be fetched, or the session fails to open.
pub async fn show(
    api: ApiClient,
    settings: SessionSettings,
    incident_id: i64,
    team_label: &str,
    edit: bool,
    as_json: bool,
) -> anyhow::Result<String> {
    let session = open(api, settings, incident_id, SessionUser::new(None, team_label), !edit).await?;
    if as_json {
        Ok(serde_json::to_string_pretty(&render::session_json(&session))?)
    } else {
        Ok(render::session_text(&session))
    }
}

/// `save`: apply `assignments` to an incident
///
/// Returns whether the server accepted the update.
///
/// # Errors
/// The incident cannot be fetched, or the session fails to open. A refused
/// save is not an error; its message is logged and `false` returned.
pub async fn save(
    api: ApiClient,
    settings: SessionSettings,
    incident_id: i64,
    user: SessionUser,
    assignments: &[(String, Value)],
) -> anyhow::Result<bool> {
    if assignments.is_empty() {
        bail!("nothing to save, pass at least one --set KEY=VALUE");
    }
    let mut session = open(api, settings, incident_id, user, false).await?;

    let saved = session.save(build_update(assignments)).await;
    match (saved, session.error()) {
        (true, _) => info!(incident_id, detail = session.success().unwrap_or_default(), "saved"),
        (false, Some(error)) => tracing::error!(incident_id, %error, "save failed"),
        (false, None) => tracing::error!(incident_id, "save failed"),
    }
    Ok(saved)
}

/// Parse `KEY=VALUE`; the value is JSON when it parses, a string otherwise
///
/// # Errors
/// Missing `=` or an empty key.
pub fn parse_assignment(raw: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key in {raw:?}");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), value))
}

/// Update from `KEY=VALUE` pairs; classification id keys are sent as ids
#[must_use]
pub fn build_update(assignments: &[(String, Value)]) -> IncidentUpdate {
    assignments
        .iter()
        .fold(IncidentUpdate::new(), |update, (key, value)| update.field(key.clone(), value.clone()))
}

async fn open(
    api: ApiClient,
    settings: SessionSettings,
    incident_id: i64,
    user: SessionUser,
    read_only: bool,
) -> anyhow::Result<IncidentEditSession> {
    // View mode re-fetches inside the session, so a bare id record is enough.
    let incident = if read_only {
        let mut stub = Map::new();
        stub.insert("id".into(), incident_id.into());
        Arc::new(RawIncident::new(stub))
    } else {
        let fetched = api
            .fetch_incident(incident_id)
            .await
            .ok_or_else(|| not_fetched(incident_id))?;
        Arc::new(fetched)
    };

    let request = SessionRequest::new(Arc::clone(&incident), user).read_only(read_only);
    let session = IncidentEditSession::open(api, settings, request)
        .await
        .context("failed to open incident session")?;
    if read_only && Arc::ptr_eq(session.source_incident(), &incident) {
        return Err(not_fetched(incident_id));
    }
    Ok(session)
}

fn not_fetched(incident_id: i64) -> anyhow::Error {
    anyhow!("incident {incident_id} could not be fetched")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assignments_parse_json_or_text() {
        assert_eq!(parse_assignment("urgency_id=3").unwrap(), ("urgency_id".into(), json!(3)));
        assert_eq!(
            parse_assignment("narration=Replaced the fuser").unwrap(),
            ("narration".into(), json!("Replaced the fuser"))
        );
        assert_eq!(parse_assignment("site_id=null").unwrap().1, Value::Null);
        assert!(parse_assignment("narration").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn classification_keys_become_ids() {
        let update = build_update(&[
            ("category_id".into(), json!("2")),
            ("narration".into(), json!("x")),
        ]);
        assert_eq!(
            update.to_payload(1, 2),
            json!({"category_id": 2, "narration": "x", "user_id": 1, "incident_id": 2})
        );
    }

    #[test]
    fn tabs_for_read_only() {
        assert!(tabs("Incident Manager", true).contains("details, actions, evidence, history"));
    }
}

//! Text and JSON rendering of sessions

use apex_access::{IncidentTab, PermissionSet};
use apex_core::{IncidentEditSession, StepStatus};
use serde_json::{json, Value};
use std::fmt::Write;

/// Permission summary and visible tabs
#[must_use]
pub fn permissions_text(permissions: &PermissionSet) -> String {
    let flags = [
        ("end user", permissions.is_end_user),
        ("field engineer", permissions.is_field_engineer),
        ("advanced", permissions.is_advanced),
        ("edit incident", permissions.can_edit_incident),
        ("edit evidence", permissions.can_edit_evidence),
        ("full access", permissions.has_full_access),
        ("read only", permissions.read_only),
    ];
    let mut out = String::new();
    for (label, set) in flags {
        let _ = writeln!(out, "{label:<15} {}", if set { "yes" } else { "no" });
    }
    let _ = writeln!(out, "{:<15} {}", "tabs", tab_list(&permissions.visible_tabs()));
    out
}

/// Human-readable session summary
#[must_use]
pub fn session_text(session: &IncidentEditSession) -> String {
    let incident = session.incident();
    let mut out = String::new();

    let _ = writeln!(out, "{}", incident.title());
    if !incident.description.is_empty() {
        let _ = writeln!(out, "  {}", incident.description);
    }
    for (kind, field) in incident.classifications() {
        let id = field.id.map_or_else(|| "-".to_owned(), |id| id.to_string());
        let _ = writeln!(out, "  {:<15} {} [{id}]", kind.label(), field.name);
    }

    let progression = session.status_progression();
    let steps: Vec<String> = progression
        .steps()
        .map(|(stage, status)| match status {
            StepStatus::Completed => format!("({})", stage.name),
            StepStatus::Active => format!("[{}]", stage.name),
            StepStatus::Pending => stage.name.clone(),
        })
        .collect();
    let _ = writeln!(out, "status: {}", steps.join(" > "));
    let _ = writeln!(out, "tabs: {} (active: {})", tab_list(&session.visible_tabs()), session.active_tab());

    if let Some(warning) = session.warning() {
        let _ = writeln!(out, "warning: {warning}");
    }
    out
}

/// Machine-readable session summary
#[must_use]
pub fn session_json(session: &IncidentEditSession) -> Value {
    let degraded: Vec<String> = session
        .reference_failures()
        .iter()
        .map(|failure| failure.source.to_string())
        .collect();
    json!({
        "session_id": session.id(),
        "phase": session.phase(),
        "incident": session.incident(),
        "permissions": session.permissions(),
        "visible_tabs": session.visible_tabs(),
        "active_tab": session.active_tab(),
        "status_progression": session.status_progression(),
        "degraded_reference_data": degraded,
    })
}

fn tab_list(tabs: &[IncidentTab]) -> String {
    tabs.iter().copied().map(IncidentTab::as_str).collect::<Vec<_>>().join(", ")
}

//! Capability sets
//!
//! Derived on demand from `(team label, read-only)`; never stored or
//! mutated in place.

use crate::role::RoleSet;
use crate::tab::IncidentTab;
use serde::Serialize;

/// What the current user may do with the open incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PermissionSet {
    /// Label matched the end-user role
    pub is_end_user: bool,
    /// Label matched the field-engineer role
    pub is_field_engineer: bool,
    /// Label matched an advanced role
    pub is_advanced: bool,
    /// May edit incident details
    pub can_edit_incident: bool,
    /// May add or change evidence
    pub can_edit_evidence: bool,
    /// Sees every tab, including assignment and knowledge
    pub has_full_access: bool,
    /// Session was opened in view mode
    pub read_only: bool,
}

impl PermissionSet {
    /// Resolve capabilities for a team label
    #[must_use]
    pub fn resolve(team_label: &str, read_only: bool) -> Self {
        Self::from_roles(RoleSet::from_label(team_label), read_only)
    }

    /// Resolve capabilities for already classified roles
    #[must_use]
    pub fn from_roles(roles: RoleSet, read_only: bool) -> Self {
        let is_end_user = roles.is_end_user();
        let is_field_engineer = roles.is_field_engineer();
        let is_advanced = roles.is_advanced();
        let writable = !read_only;

        Self {
            is_end_user,
            is_field_engineer,
            is_advanced,
            can_edit_incident: writable && (is_end_user || is_advanced),
            can_edit_evidence: writable && !is_end_user,
            has_full_access: writable && is_advanced && !is_field_engineer && !is_end_user,
            read_only,
        }
    }

    /// Tabs this user sees, in display order
    ///
    /// View mode always shows details, actions, evidence and history.
    /// Otherwise end users and unrecognised roles only see details.
    #[must_use]
    pub fn visible_tabs(&self) -> Vec<IncidentTab> {
        use IncidentTab::{Actions, Assignment, Details, Evidence, History, Knowledge};

        if self.read_only {
            vec![Details, Actions, Evidence, History]
        } else if self.is_end_user {
            vec![Details]
        } else if self.is_field_engineer {
            vec![Details, Evidence, Actions, Assignment, History]
        } else if self.has_full_access {
            vec![Details, Actions, Assignment, Evidence, History, Knowledge]
        } else {
            vec![Details]
        }
    }

    /// Whether `tab` is visible
    #[must_use]
    pub fn can_view(&self, tab: IncidentTab) -> bool {
        self.visible_tabs().contains(&tab)
    }
}

/// Tabs visible for a team label
#[must_use]
pub fn visible_tabs(team_label: &str, read_only: bool) -> Vec<IncidentTab> {
    PermissionSet::resolve(team_label, read_only).visible_tabs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_manager_can_edit_but_lacks_full_access() {
        let permissions = PermissionSet::resolve("Field Manager", false);
        assert!(permissions.can_edit_incident);
        assert!(permissions.can_edit_evidence);
        assert!(!permissions.has_full_access);
        assert_eq!(permissions.visible_tabs()[1], IncidentTab::Evidence);
    }

    #[test]
    fn unknown_role_sees_details_only() {
        let permissions = PermissionSet::resolve("Auditor", false);
        assert!(!permissions.can_edit_incident);
        assert!(permissions.can_edit_evidence);
        assert_eq!(permissions.visible_tabs(), vec![IncidentTab::Details]);
    }

    #[test]
    fn can_view_follows_tab_list() {
        let permissions = PermissionSet::resolve("End User", false);
        assert!(permissions.can_view(IncidentTab::Details));
        assert!(!permissions.can_view(IncidentTab::History));
    }
}

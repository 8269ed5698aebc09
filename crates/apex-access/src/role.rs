//! Team role classification
//!
//! The API identifies a user's team by a free-form label ("Incident
//! Handler", "field_engineer", ...). [`RoleSet::from_label`] is the single
//! place that label is inspected; everything downstream branches on
//! [`TeamRole`] values.

use serde::{Deserialize, Serialize};

/// Closed set of team roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    /// Reports incidents, edits its own details only
    EndUser,
    /// Works incidents on site
    FieldEngineer,
    /// Incident handler
    Handler,
    /// Incident manager
    Manager,
    /// Administrator
    Admin,
    /// Expert team member
    ExpertTeam,
    /// Label matched no known role
    Other,
}

impl TeamRole {
    /// Every role
    pub const ALL: [Self; 7] = [
        Self::EndUser,
        Self::FieldEngineer,
        Self::Handler,
        Self::Manager,
        Self::Admin,
        Self::ExpertTeam,
        Self::Other,
    ];

    /// Roles that count as advanced (handler, manager, admin, expert team)
    #[inline]
    #[must_use]
    pub fn is_advanced(self) -> bool {
        matches!(self, Self::Handler | Self::Manager | Self::Admin | Self::ExpertTeam)
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl std::fmt::Display for TeamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::EndUser => "end user",
            Self::FieldEngineer => "field engineer",
            Self::Handler => "handler",
            Self::Manager => "manager",
            Self::Admin => "admin",
            Self::ExpertTeam => "expert team",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// Every role a team label matched
///
/// Labels are not exclusive: "Field Manager" is both a field engineer and
/// a manager, and the permission rules depend on the combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    /// Classify a raw team label
    ///
    /// The label is trimmed and lower-cased, then:
    /// - end user: contains `end_user`, or is exactly `end user` / `enduser`
    /// - field engineer: contains `field` (covers `field_engineer`,
    ///   `field engineer` and `fieldengineer`)
    /// - handler / manager / admin: contains the word
    /// - expert team: contains `expert` (covers `expert_team`, `expert team`)
    ///
    /// A label matching none of these yields `{Other}`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        let mut roles = Self::default();

        if label.contains("end_user") || label == "end user" || label == "enduser" {
            roles.insert(TeamRole::EndUser);
        }
        if label.contains("field") {
            roles.insert(TeamRole::FieldEngineer);
        }
        if label.contains("handler") {
            roles.insert(TeamRole::Handler);
        }
        if label.contains("manager") {
            roles.insert(TeamRole::Manager);
        }
        if label.contains("admin") {
            roles.insert(TeamRole::Admin);
        }
        if label.contains("expert") {
            roles.insert(TeamRole::ExpertTeam);
        }

        if roles.is_empty() {
            roles.insert(TeamRole::Other);
        }
        roles
    }

    /// Set containing exactly `role`
    #[inline]
    #[must_use]
    pub fn only(role: TeamRole) -> Self {
        Self(role.bit())
    }

    /// Add a role
    #[inline]
    pub fn insert(&mut self, role: TeamRole) {
        self.0 |= role.bit();
    }

    /// Whether `role` is in the set
    #[inline]
    #[must_use]
    pub fn contains(self, role: TeamRole) -> bool {
        self.0 & role.bit() != 0
    }

    /// Whether no role is set
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// End user role matched
    #[inline]
    #[must_use]
    pub fn is_end_user(self) -> bool {
        self.contains(TeamRole::EndUser)
    }

    /// Field engineer role matched
    #[inline]
    #[must_use]
    pub fn is_field_engineer(self) -> bool {
        self.contains(TeamRole::FieldEngineer)
    }

    /// Any advanced role matched
    #[inline]
    #[must_use]
    pub fn is_advanced(self) -> bool {
        self.iter().any(TeamRole::is_advanced)
    }

    /// Roles in declaration order
    pub fn iter(self) -> impl Iterator<Item = TeamRole> {
        TeamRole::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

impl FromIterator<TeamRole> for RoleSet {
    fn from_iter<I: IntoIterator<Item = TeamRole>>(iter: I) -> Self {
        let mut roles = Self::default();
        for role in iter {
            roles.insert(role);
        }
        roles
    }
}

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// Action a caller may be permitted to perform.
///
/// Serialized as dotted identifiers (e.g. `"patient.read"`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Action {
    PatientRead,
    PatientWrite,
    VisitRead,
    VisitWrite,
    NoteRead,
    NoteWrite,
    NoteSign,
    AudioUpload,
    ReportGenerate,
    TemplateRead,
    TemplateManage,
    EmployeeRead,
    EmployeeManage,
    OrganizationRead,
    OrganizationManage,
    BackupManage,
    TenantManage,
    TenantImpersonate,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

impl Action {
    pub const ALL: [Action; 18] = [
        Action::PatientRead,
        Action::PatientWrite,
        Action::VisitRead,
        Action::VisitWrite,
        Action::NoteRead,
        Action::NoteWrite,
        Action::NoteSign,
        Action::AudioUpload,
        Action::ReportGenerate,
        Action::TemplateRead,
        Action::TemplateManage,
        Action::EmployeeRead,
        Action::EmployeeManage,
        Action::OrganizationRead,
        Action::OrganizationManage,
        Action::BackupManage,
        Action::TenantManage,
        Action::TenantImpersonate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::PatientRead => "patient.read",
            Action::PatientWrite => "patient.write",
            Action::VisitRead => "visit.read",
            Action::VisitWrite => "visit.write",
            Action::NoteRead => "note.read",
            Action::NoteWrite => "note.write",
            Action::NoteSign => "note.sign",
            Action::AudioUpload => "audio.upload",
            Action::ReportGenerate => "report.generate",
            Action::TemplateRead => "template.read",
            Action::TemplateManage => "template.manage",
            Action::EmployeeRead => "employee.read",
            Action::EmployeeManage => "employee.manage",
            Action::OrganizationRead => "organization.read",
            Action::OrganizationManage => "organization.manage",
            Action::BackupManage => "backup.manage",
            Action::TenantManage => "tenant.manage",
            Action::TenantImpersonate => "tenant.impersonate",
        }
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

impl TryFrom<String> for Action {
    type Error = UnknownAction;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Action> for &'static str {
    fn from(value: Action) -> Self {
        value.as_str()
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Permission table
// ─────────────────────────────────────────────────────────────────────────────

const ADMIN_ACTIONS: &[Action] = &[
    Action::PatientRead,
    Action::PatientWrite,
    Action::VisitRead,
    Action::VisitWrite,
    Action::NoteRead,
    Action::NoteWrite,
    Action::NoteSign,
    Action::AudioUpload,
    Action::ReportGenerate,
    Action::TemplateRead,
    Action::TemplateManage,
    Action::EmployeeRead,
    Action::EmployeeManage,
    Action::OrganizationRead,
    Action::OrganizationManage,
    Action::BackupManage,
];

const DOCTOR_ACTIONS: &[Action] = &[
    Action::PatientRead,
    Action::PatientWrite,
    Action::VisitRead,
    Action::VisitWrite,
    Action::NoteRead,
    Action::NoteWrite,
    Action::NoteSign,
    Action::AudioUpload,
    Action::ReportGenerate,
    Action::TemplateRead,
    Action::OrganizationRead,
];

const STAFF_ACTIONS: &[Action] = &[
    Action::PatientRead,
    Action::PatientWrite,
    Action::VisitRead,
    Action::VisitWrite,
    Action::NoteRead,
    Action::AudioUpload,
    Action::TemplateRead,
    Action::OrganizationRead,
];

/// Actions granted to `role`. Static; there are no runtime grants.
pub fn actions_for(role: Role) -> &'static [Action] {
    match role {
        Role::SuperAdmin => &Action::ALL,
        Role::Admin => ADMIN_ACTIONS,
        Role::Doctor => DOCTOR_ACTIONS,
        Role::Staff => STAFF_ACTIONS,
    }
}

/// Permission table lookup.
///
/// `None` (no role in effect) never grants anything.
pub fn has_permission(role: Option<Role>, action: Action) -> bool {
    match role {
        Some(role) => actions_for(role).contains(&action),
        None => false,
    }
}

/// Lookup for untyped input (e.g. an admin console). Unknown role or action
/// literals are denied.
pub fn literal_has_permission(role: &str, action: &str) -> bool {
    match (role.parse::<Role>(), action.parse::<Action>()) {
        (Ok(role), Ok(action)) => has_permission(Some(role), action),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_pair_matches_the_table_exactly() {
        for role in Role::ALL {
            let granted: HashSet<Action> = actions_for(role).iter().copied().collect();
            for action in Action::ALL {
                assert_eq!(
                    has_permission(Some(role), action),
                    granted.contains(&action),
                    "{role} / {action}"
                );
            }
        }
    }

    #[test]
    fn absent_role_has_no_permissions() {
        for action in Action::ALL {
            assert!(!has_permission(None, action));
        }
    }

    #[test]
    fn super_admin_is_a_superset_of_every_role() {
        for role in Role::ALL {
            for action in actions_for(role) {
                assert!(has_permission(Some(Role::SuperAdmin), *action));
            }
        }
    }

    #[test]
    fn only_platform_role_manages_or_impersonates_tenants() {
        for role in Role::ALL {
            let expected = role.is_platform();
            assert_eq!(has_permission(Some(role), Action::TenantManage), expected);
            assert_eq!(has_permission(Some(role), Action::TenantImpersonate), expected);
        }
    }

    #[test]
    fn staff_cannot_author_notes() {
        assert!(has_permission(Some(Role::Staff), Action::NoteRead));
        assert!(!has_permission(Some(Role::Staff), Action::NoteWrite));
        assert!(!has_permission(Some(Role::Staff), Action::NoteSign));
        assert!(has_permission(Some(Role::Doctor), Action::NoteSign));
    }

    #[test]
    fn unknown_literals_are_denied() {
        assert!(literal_has_permission("doctor", "note.write"));
        assert!(!literal_has_permission("root", "note.write"));
        assert!(!literal_has_permission("doctor", "note.delete"));
        assert!(!literal_has_permission("", ""));
    }

    #[test]
    fn action_serializes_as_dotted_id() {
        let json = serde_json::to_string(&Action::TenantImpersonate).unwrap();
        assert_eq!(json, "\"tenant.impersonate\"");
        let back: Action = serde_json::from_str("\"note.sign\"").unwrap();
        assert_eq!(back, Action::NoteSign);
    }
}

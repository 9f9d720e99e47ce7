//! The typed permission model.
//!
//! A [`PermissionMatrix`] is a total function from `(Module, Operation)` to a
//! boolean grant, default deny: any pair that was never explicitly granted is
//! denied. Role creation starts from a per-role default template
//! ([`PermissionMatrix::defaults_for`]) and merges caller overrides on top.
//!
//! Modules and operations are closed enums, so an unknown module/operation
//! combination is a compile-time error rather than a silent deny.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The fixed set of role names the system accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    Admin,
    Teacher,
    Student,
    Principal,
}

impl RoleName {
    pub const ALL: [RoleName; 4] = [
        RoleName::Admin,
        RoleName::Teacher,
        RoleName::Student,
        RoleName::Principal,
    ];

    /// Parse a lowercase role name. Returns `None` outside the fixed enumeration.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(RoleName::Admin),
            "teacher" => Some(RoleName::Teacher),
            "student" => Some(RoleName::Student),
            "principal" => Some(RoleName::Principal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "admin",
            RoleName::Teacher => "teacher",
            RoleName::Student => "student",
            RoleName::Principal => "principal",
        }
    }

    /// Derived default for the `can_login` flag: students cannot log in.
    pub fn can_login_default(&self) -> bool {
        !matches!(self, RoleName::Student)
    }

    /// Admin is the only role protected from deletion by default.
    pub fn is_system_role_default(&self) -> bool {
        matches!(self, RoleName::Admin)
    }

    /// Staff roles are the ones eligible for admin password resets.
    pub fn is_staff(&self) -> bool {
        matches!(self, RoleName::Teacher | RoleName::Principal)
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission-gated modules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum Module {
    Batch,
    Student,
    Attendance,
    Grades,
    Announcements,
    Timetable,
    RoleManagement,
    UserManagement,
}

/// Operations a module grant can cover.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Mark,
    Assign,
    Manage,
    View,
    Deactivate,
    PromoteOrRetain,
    OwnOnly,
}

/// Nested `module -> operation -> bool` grant map, default deny.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMatrix {
    grants: BTreeMap<Module, BTreeMap<Operation, bool>>,
}

impl PermissionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total lookup: absent entries are denied.
    pub fn is_allowed(&self, module: Module, operation: Operation) -> bool {
        self.grants
            .get(&module)
            .and_then(|ops| ops.get(&operation))
            .copied()
            .unwrap_or(false)
    }

    pub fn grant(&mut self, module: Module, operation: Operation) -> &mut Self {
        self.set(module, operation, true)
    }

    pub fn set(&mut self, module: Module, operation: Operation, allowed: bool) -> &mut Self {
        self.grants.entry(module).or_default().insert(operation, allowed);
        self
    }

    /// Overlay `overrides` on top of `self`, entry by entry. Explicit `false`
    /// entries in the override revoke template grants.
    pub fn merge(&mut self, overrides: &PermissionMatrix) {
        for (module, ops) in &overrides.grants {
            for (operation, allowed) in ops {
                self.set(*module, *operation, *allowed);
            }
        }
    }

    /// The default permission template applied when a role is created.
    pub fn defaults_for(role: RoleName) -> Self {
        let mut m = PermissionMatrix::new();
        match role {
            RoleName::Admin => {
                m.grant(Module::RoleManagement, Operation::Create)
                    .grant(Module::RoleManagement, Operation::Update)
                    .grant(Module::RoleManagement, Operation::Delete)
                    .grant(Module::UserManagement, Operation::Create)
                    .grant(Module::UserManagement, Operation::Update)
                    .grant(Module::UserManagement, Operation::Deactivate)
                    .grant(Module::Batch, Operation::Create)
                    .grant(Module::Batch, Operation::Read)
                    .grant(Module::Batch, Operation::Update)
                    .grant(Module::Batch, Operation::Delete)
                    .grant(Module::Announcements, Operation::Create)
                    .grant(Module::Announcements, Operation::Read)
                    .grant(Module::Announcements, Operation::Delete)
                    .grant(Module::Timetable, Operation::Manage)
                    .grant(Module::Timetable, Operation::View)
                    .grant(Module::Student, Operation::Create)
                    .grant(Module::Student, Operation::Read)
                    .grant(Module::Student, Operation::Update)
                    .grant(Module::Student, Operation::Delete)
                    .grant(Module::Attendance, Operation::Mark)
                    .grant(Module::Attendance, Operation::Read);
            }
            RoleName::Principal => {
                m.grant(Module::UserManagement, Operation::Create)
                    .grant(Module::UserManagement, Operation::Update)
                    .grant(Module::Batch, Operation::Create)
                    .grant(Module::Batch, Operation::Read)
                    .grant(Module::Batch, Operation::Update)
                    .grant(Module::Announcements, Operation::Create)
                    .grant(Module::Announcements, Operation::Read)
                    .grant(Module::Timetable, Operation::Manage)
                    .grant(Module::Timetable, Operation::View)
                    .grant(Module::Student, Operation::Create)
                    .grant(Module::Student, Operation::Read)
                    .grant(Module::Student, Operation::Update);
            }
            RoleName::Teacher => {
                m.grant(Module::Batch, Operation::Read)
                    .grant(Module::Student, Operation::Read)
                    .grant(Module::Student, Operation::Update)
                    .grant(Module::Attendance, Operation::Mark)
                    .grant(Module::Attendance, Operation::Read)
                    .grant(Module::Grades, Operation::Assign)
                    .grant(Module::Grades, Operation::Read);
            }
            RoleName::Student => {
                m.grant(Module::Student, Operation::Read)
                    .grant(Module::Timetable, Operation::View);
            }
        }
        m
    }
}

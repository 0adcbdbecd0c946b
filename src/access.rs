//! Access policy — which departments and figures each role may see.
//!
//! DESIGN
//! ======
//! Roles, departments and projects are closed sets. The policy is a pure
//! function of `Role`; the only mutable piece is `DepartmentSelection`, which
//! must be migrated explicitly whenever the role changes.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "access_test.rs"]
mod tests;

// =============================================================================
// ROLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Board,
    #[default]
    Employee,
    Customer,
}

impl Role {
    /// Roles in the order the role picker lists them.
    pub const ALL: [Role; 4] = [Role::Employee, Role::Board, Role::Admin, Role::Customer];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Board => "Board",
            Self::Employee => "Employee",
            Self::Customer => "Customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError { kind: "role", value: s.to_string() })
    }
}

// =============================================================================
// DEPARTMENT
// =============================================================================

/// Declaration order is display order (Legal, Approvals, Title, Finance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Department {
    Legal,
    Approvals,
    Title,
    Finance,
}

impl Department {
    pub const ALL: [Department; 4] = [Department::Legal, Department::Approvals, Department::Title, Department::Finance];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legal => "Legal",
            Self::Approvals => "Approvals",
            Self::Title => "Title",
            Self::Finance => "Finance",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dept| dept.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError { kind: "department", value: s.to_string() })
    }
}

// =============================================================================
// PROJECT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Project {
    #[default]
    IHeart,
}

impl Project {
    pub const ALL: [Project; 1] = [Project::IHeart];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IHeart => "iHeart",
        }
    }

    /// Case-insensitive check that `question` names this project.
    #[must_use]
    pub fn is_mentioned_in(self, question: &str) -> bool {
        question
            .to_lowercase()
            .contains(&self.as_str().to_lowercase())
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Project {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|project| project.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError { kind: "project", value: s.to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

// =============================================================================
// POLICY
// =============================================================================

/// Departments `role` is allowed to search.
#[must_use]
pub fn visible_departments(role: Role) -> BTreeSet<Department> {
    match role {
        Role::Admin | Role::Board => Department::ALL.into_iter().collect(),
        Role::Employee => [Department::Legal, Department::Approvals, Department::Title]
            .into_iter()
            .collect(),
        Role::Customer => BTreeSet::from([Department::Approvals]),
    }
}

/// Budget and spend figures are restricted to Admin and Board.
#[must_use]
pub fn can_see_financials(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Board)
}

// =============================================================================
// SELECTION
// =============================================================================

/// The user-toggled set of departments a question is searched in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentSelection {
    selected: BTreeSet<Department>,
}

impl Default for DepartmentSelection {
    fn default() -> Self {
        Self { selected: BTreeSet::from([Department::Legal, Department::Approvals, Department::Title]) }
    }
}

impl DepartmentSelection {
    #[must_use]
    pub fn empty() -> Self {
        Self { selected: BTreeSet::new() }
    }

    #[must_use]
    pub fn from_departments(departments: impl IntoIterator<Item = Department>) -> Self {
        Self { selected: departments.into_iter().collect() }
    }

    #[must_use]
    pub fn departments(&self) -> &BTreeSet<Department> {
        &self.selected
    }

    #[must_use]
    pub fn contains(&self, dept: Department) -> bool {
        self.selected.contains(&dept)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Flip `dept` in the selection. Returns whether it is now selected.
    pub fn toggle(&mut self, dept: Department) -> bool {
        if self.selected.remove(&dept) {
            false
        } else {
            self.selected.insert(dept);
            true
        }
    }

    /// Drop every selected department `role` cannot see. Returns the dropped ones.
    pub fn migrate_to(&mut self, role: Role) -> Vec<Department> {
        let visible = visible_departments(role);
        let dropped: Vec<Department> = self
            .selected
            .iter()
            .copied()
            .filter(|d| !visible.contains(d))
            .collect();
        self.selected.retain(|d| visible.contains(d));
        dropped
    }
}

/// Join departments as `"Legal, Approvals"` in display order.
#[must_use]
pub fn join_departments(departments: &BTreeSet<Department>) -> String {
    departments
        .iter()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

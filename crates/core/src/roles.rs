//! Well-known role names and role-based access to the two dashboards.
//!
//! Role names arrive in several shapes ("Security Admin", "securityadmin",
//! `"IT Admin, Security Guard"`, a JSON array, a list). All comparisons happen
//! on the normalised form: lower-case with whitespace removed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_SECURITY_ADMIN: &str = "securityadmin";
pub const ROLE_IT_ADMIN: &str = "itadmin";
pub const ROLE_SECURITY_GUARD: &str = "securityguard";

/// All known role names.
pub const KNOWN_ROLES: &[&str] = &[ROLE_SECURITY_ADMIN, ROLE_IT_ADMIN, ROLE_SECURITY_GUARD];

/// Role claim as it appears in a token or user payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRoles {
    List(Vec<String>),
    Text(String),
}

/// Lower-case and strip all whitespace.
pub fn normalize_role(role: &str) -> String {
    role.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalise a role claim into a list, keeping first-seen order and
/// dropping blanks and duplicates.
///
/// A text claim may itself hold a JSON array; otherwise it is split on
/// commas.
pub fn normalize_roles(raw: &RawRoles) -> Vec<String> {
    let parts: Vec<String> = match raw {
        RawRoles::List(list) => list.clone(),
        RawRoles::Text(text) => match serde_json::from_str::<Vec<String>>(text) {
            Ok(list) => list,
            Err(_) => text.split(',').map(String::from).collect(),
        },
    };

    let mut seen = BTreeSet::new();
    parts
        .iter()
        .map(|p| normalize_role(p))
        .filter(|r| !r.is_empty() && seen.insert(r.clone()))
        .collect()
}

fn has_any(roles: &[String], wanted: &[&str]) -> bool {
    roles.iter().any(|r| wanted.contains(&r.as_str()))
}

/// Whether the user has `role` (compared after normalisation).
pub fn has_role(roles: &[String], role: &str) -> bool {
    let wanted = normalize_role(role);
    roles.iter().any(|r| *r == wanted)
}

/// Security admins and IT admins may open the admin dashboard.
pub fn can_access_admin(roles: &[String]) -> bool {
    has_any(roles, &[ROLE_SECURITY_ADMIN, ROLE_IT_ADMIN])
}

/// Security guards and IT admins may open the security dashboard.
pub fn can_access_security(roles: &[String]) -> bool {
    has_any(roles, &[ROLE_SECURITY_GUARD, ROLE_IT_ADMIN])
}

pub fn require_admin_access(roles: &[String]) -> Result<(), CoreError> {
    if can_access_admin(roles) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "You don't have Admin privileges.".to_string(),
        ))
    }
}

pub fn require_security_access(roles: &[String]) -> Result<(), CoreError> {
    if can_access_security(roles) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "You don't have Security privileges.".to_string(),
        ))
    }
}

/// Human-readable name; unknown roles are returned as-is.
pub fn display_name(role: &str) -> &str {
    match role {
        ROLE_SECURITY_ADMIN => "Security Admin",
        ROLE_IT_ADMIN => "IT Admin",
        ROLE_SECURITY_GUARD => "Security Guard",
        other => other,
    }
}

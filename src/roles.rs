//! Participant role resolution
//!
//! Roles are resolved once, when a participant joins, and persisted as
//! participant metadata for reuse at leave time. Resolution is total:
//! malformed input always degrades to `Human`, the least-privileged role.

use serde::{Deserialize, Serialize};

/// Role of a participant within a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The caller the room exists for; their presence defines the call
    Driver,
    /// Automated agent; its audio is never relayed back into the call
    Bot,
    /// Any other participant
    Human,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Driver => write!(f, "driver"),
            Role::Bot => write!(f, "bot"),
            Role::Human => write!(f, "human"),
        }
    }
}

/// Structured participant metadata carrying the persisted role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleMetadata {
    pub role: Role,
}

impl RoleMetadata {
    /// Serialize a role into the metadata JSON persisted on the participant
    pub fn encode(role: Role) -> String {
        // A struct of one infallible enum cannot fail to serialize
        serde_json::to_string(&RoleMetadata { role }).unwrap_or_default()
    }
}

/// Resolve a participant's role from identity and optional metadata
///
/// Structured metadata wins when present: a JSON object with a valid `role`
/// field resolves to that role, and anything malformed (bad JSON, missing or
/// unknown field value) resolves to `Human`. Without metadata, e.g. on first
/// join, the identity prefix decides: `driver*` and `bot*` map to their
/// roles, everything else is `Human`.
pub fn resolve_role(identity: &str, metadata: Option<&str>) -> Role {
    match metadata {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<RoleMetadata>(raw)
            .map(|m| m.role)
            .unwrap_or(Role::Human),
        _ => {
            if identity.starts_with("driver") {
                Role::Driver
            } else if identity.starts_with("bot") {
                Role::Bot
            } else {
                Role::Human
            }
        }
    }
}

use serde::{Deserialize, Serialize};

/// Opaque identity of the administrator performing a moderation action.
/// Authentication happens in the surrounding layer; the domain only records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub admin_id: String,
    pub display_name: String,
}

impl AdminIdentity {
    pub fn with_admin_id(admin_id: impl Into<String>) -> Self {
        let admin_id = admin_id.into();
        Self {
            admin_id: admin_id.clone(),
            display_name: admin_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Anonymous,
    Staff,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "anonymous" | "guest" => Some(Role::Anonymous),
            "staff" => Some(Role::Staff),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Anonymous => "anonymous",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    /// Staff may read the back-office listing; only admins may decide.
    pub fn can_view_back_office(&self) -> bool {
        matches!(self, Role::Staff | Role::Admin)
    }

    pub fn can_moderate(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

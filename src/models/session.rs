use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    Admin,
    /// Any role string the gate does not know about.
    #[serde(other)]
    Other,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
            Role::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            "other" => Ok(Role::Other),
            _ => Err(anyhow::anyhow!("Unknown role: {s}")),
        }
    }
}

/// Claims carried in the middle segment of the session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    #[serde(rename = "sub")]
    pub subject_id: String,
    #[serde(default)]
    pub email: String,
    /// `None` until the user has picked a role on `/role`.
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(rename = "isEmailVerified", default)]
    pub is_email_verified: bool,
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl SessionClaims {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at < now
    }

    pub fn has_role(&self) -> bool {
        self.role.is_some()
    }
}

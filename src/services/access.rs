use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{
    decision::{Decision, RedirectTarget},
    session::{Role, SessionClaims},
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("path {0:?} must start with '/'")]
    RelativePath(String),
    #[error("guarded area {0:?} has an empty prefix")]
    EmptyPrefix(String),
    #[error("guarded area {0:?} matches nothing")]
    EmptyArea(String),
    #[error("guarded area name {0:?} is used twice")]
    DuplicateArea(String),
    #[error("role selection path {0:?} is also listed as public or auth-entry")]
    OverlappingRoleSelection(String),
}

/// What a guarded area demands from the session once its matcher hits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AreaPolicy {
    /// Any signed-in user who has picked a role.
    Authenticated,
    Admin,
    Teacher,
    Student,
}

impl AreaPolicy {
    /// Returns the redirect this policy forces, or `None` to let later areas decide.
    pub fn check(self, session: Option<&SessionClaims>) -> Option<RedirectTarget> {
        let role = session.and_then(|claims| claims.role);

        match self {
            AreaPolicy::Authenticated => match (session, role) {
                (None, _) => Some(RedirectTarget::Login),
                (Some(_), None) => Some(RedirectTarget::Home),
                _ => None,
            },
            AreaPolicy::Admin => match role {
                None => Some(RedirectTarget::Login),
                Some(Role::Admin) => None,
                Some(_) => Some(RedirectTarget::Home),
            },
            AreaPolicy::Teacher => match role {
                None => Some(RedirectTarget::Login),
                Some(Role::Teacher) => None,
                Some(Role::Student) => Some(RedirectTarget::StudentDashboard),
                Some(_) => Some(RedirectTarget::Home),
            },
            AreaPolicy::Student => match role {
                None => Some(RedirectTarget::Login),
                Some(Role::Student) => None,
                Some(Role::Teacher) => Some(RedirectTarget::TeacherDashboard),
                Some(_) => Some(RedirectTarget::Home),
            },
        }
    }
}

/// An ordered entry of the guarded-area table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuardedArea {
    pub name: String,
    #[serde(default)]
    pub exact: Vec<String>,
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Paths under these prefixes never match the area, even if `prefixes` does.
    #[serde(default)]
    pub exclude_prefixes: Vec<String>,
    pub policy: AreaPolicy,
}

impl GuardedArea {
    pub fn matches(&self, path: &str) -> bool {
        if self.exclude_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            return false;
        }
        self.exact.iter().any(|p| p == path)
            || self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

/// Route table consumed by [`AccessRules::evaluate`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessRules {
    pub public_paths: Vec<String>,
    pub role_selection_path: String,
    pub auth_entry_paths: Vec<String>,
    pub guarded_areas: Vec<GuardedArea>,
}

impl Default for AccessRules {
    fn default() -> Self {
        let paths = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            public_paths: paths(&[
                "/",
                "/courses",
                "/about",
                "/contact",
                "/forgot-password",
                "/reset-password",
                "/verify-email",
                "/become-teacher",
            ]),
            role_selection_path: "/role".into(),
            auth_entry_paths: paths(&["/login", "/register"]),
            guarded_areas: vec![
                GuardedArea {
                    name: "protected".into(),
                    exact: vec![],
                    prefixes: paths(&[
                        "/dashboard",
                        "/cart",
                        "/profile",
                        "/checkout",
                        "/payment-success",
                        "/payment-failed",
                    ]),
                    exclude_prefixes: vec![],
                    policy: AreaPolicy::Authenticated,
                },
                GuardedArea {
                    name: "admin".into(),
                    exact: vec![],
                    prefixes: paths(&["/admin"]),
                    exclude_prefixes: vec![],
                    policy: AreaPolicy::Admin,
                },
                GuardedArea {
                    name: "teacher-dashboard".into(),
                    exact: vec![],
                    prefixes: paths(&["/teacher-dashboard"]),
                    exclude_prefixes: vec![],
                    policy: AreaPolicy::Teacher,
                },
                GuardedArea {
                    name: "student-dashboard".into(),
                    exact: paths(&["/dashboard"]),
                    prefixes: paths(&["/dashboard/"]),
                    exclude_prefixes: paths(&["/teacher-dashboard"]),
                    policy: AreaPolicy::Student,
                },
            ],
        }
    }
}

impl AccessRules {
    /// Reads a JSON rule table, or the built-in DevCore routes when `path` is `None`.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let rules = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("Cannot read access rules {path}: {e}"))?;
                serde_json::from_str::<AccessRules>(&raw)?
            }
            None => AccessRules::default(),
        };
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        let absolute = |p: &String| {
            if p.starts_with('/') {
                Ok(())
            } else {
                Err(RulesError::RelativePath(p.clone()))
            }
        };

        self.public_paths.iter().try_for_each(absolute)?;
        self.auth_entry_paths.iter().try_for_each(absolute)?;
        absolute(&self.role_selection_path)?;

        if self.public_paths.contains(&self.role_selection_path)
            || self.auth_entry_paths.contains(&self.role_selection_path)
        {
            return Err(RulesError::OverlappingRoleSelection(
                self.role_selection_path.clone(),
            ));
        }

        let mut names = HashSet::new();
        for area in &self.guarded_areas {
            if !names.insert(area.name.as_str()) {
                return Err(RulesError::DuplicateArea(area.name.clone()));
            }
            if area.exact.is_empty() && area.prefixes.is_empty() {
                return Err(RulesError::EmptyArea(area.name.clone()));
            }
            let all_prefixes = area.prefixes.iter().chain(&area.exclude_prefixes);
            for prefix in all_prefixes.clone() {
                if prefix.is_empty() {
                    return Err(RulesError::EmptyPrefix(area.name.clone()));
                }
            }
            area.exact.iter().chain(all_prefixes).try_for_each(absolute)?;
        }

        Ok(())
    }

    /// Decides what happens to a request for `path`.
    ///
    /// `session` must already be `None` for missing, malformed or expired
    /// credentials. Public, role-selection and auth-entry paths are settled
    /// immediately. Guarded areas are then walked in table order: every
    /// matching area is checked, and the first one that demands a redirect
    /// wins. Anything left over is allowed.
    pub fn evaluate(&self, path: &str, session: Option<&SessionClaims>) -> Decision {
        if self.public_paths.iter().any(|p| p == path) {
            return Decision::Continue;
        }

        if path == self.role_selection_path {
            return match session {
                None => Decision::Redirect(RedirectTarget::Register),
                Some(claims) if claims.has_role() => Decision::Redirect(RedirectTarget::Home),
                Some(_) => Decision::Continue,
            };
        }

        if self.auth_entry_paths.iter().any(|p| p == path) {
            return match session {
                Some(claims) if claims.has_role() && claims.is_email_verified => {
                    Decision::Redirect(RedirectTarget::Home)
                }
                Some(claims) if !claims.has_role() => {
                    Decision::Redirect(RedirectTarget::RoleSelection)
                }
                _ => Decision::Continue,
            };
        }

        self.guarded_areas
            .iter()
            .filter(|area| area.matches(path))
            .find_map(|area| area.policy.check(session))
            .map_or(Decision::Continue, Decision::Redirect)
    }

    /// Name of the first guarded area covering `path`, for logging.
    pub fn area_for(&self, path: &str) -> Option<&str> {
        self.guarded_areas
            .iter()
            .find(|area| area.matches(path))
            .map(|area| area.name.as_str())
    }
}

/// The fixed set of pages the gate ever redirects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Home,
    Login,
    Register,
    RoleSelection,
    StudentDashboard,
    TeacherDashboard,
}

impl RedirectTarget {
    pub fn path(self) -> &'static str {
        match self {
            RedirectTarget::Home => "/",
            RedirectTarget::Login => "/login",
            RedirectTarget::Register => "/register",
            RedirectTarget::RoleSelection => "/role",
            RedirectTarget::StudentDashboard => "/dashboard",
            RedirectTarget::TeacherDashboard => "/teacher-dashboard",
        }
    }
}

impl std::fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Redirect(RedirectTarget),
}

impl Decision {
    /// Label used for the `outcome` metric dimension.
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::Continue => "continue",
            Decision::Redirect(_) => "redirect",
        }
    }

    pub fn target_path(&self) -> Option<&'static str> {
        match self {
            Decision::Continue => None,
            Decision::Redirect(target) => Some(target.path()),
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Continue => write!(f, "continue"),
            Decision::Redirect(target) => write!(f, "redirect {target}"),
        }
    }
}

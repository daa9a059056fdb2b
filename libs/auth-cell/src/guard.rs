use serde::Serialize;

use shared_models::auth::{Role, Session};
use shared_utils::extractor::AllowedRoles;

pub const LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct NavItem {
    pub name: &'static str,
    pub href: &'static str,
}

/// Where a role lands after sign-in and what its navigation shows.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RoleHome {
    pub dashboard: &'static str,
    pub nav: &'static [NavItem],
}

const PATIENT_HOME: RoleHome = RoleHome {
    dashboard: "/patient/dashboard",
    nav: &[
        NavItem { name: "Dashboard", href: "/patient/dashboard" },
        NavItem { name: "Symptoms", href: "/patient/symptoms" },
        NavItem { name: "Appointments", href: "/patient/appointments" },
        NavItem { name: "Doctors", href: "/patient/doctors" },
        NavItem { name: "Reports", href: "/patient/reports" },
        NavItem { name: "Settings", href: "/patient/settings" },
    ],
};

const DOCTOR_HOME: RoleHome = RoleHome {
    dashboard: "/doctor/dashboard",
    nav: &[
        NavItem { name: "Dashboard", href: "/doctor/dashboard" },
        NavItem { name: "Patients", href: "/doctor/patients" },
        NavItem { name: "Appointments", href: "/doctor/appointments" },
        NavItem { name: "Reports", href: "/doctor/reports" },
        NavItem { name: "Settings", href: "/doctor/settings" },
    ],
};

const ADMIN_HOME: RoleHome = RoleHome {
    dashboard: "/admin/dashboard",
    nav: &[
        NavItem { name: "Dashboard", href: "/admin/dashboard" },
        NavItem { name: "Doctors", href: "/admin/doctors" },
        NavItem { name: "Appointments", href: "/admin/appointments" },
    ],
};

pub fn home_for(role: Role) -> &'static RoleHome {
    match role {
        Role::Patient => &PATIENT_HOME,
        Role::Doctor => &DOCTOR_HOME,
        Role::Admin => &ADMIN_HOME,
    }
}

/// Route prefixes and the roles allowed under them. First match wins.
const ROUTE_TABLE: [(&str, AllowedRoles); 4] = [
    ("/patient", AllowedRoles::PATIENT),
    ("/doctor", AllowedRoles::DOCTOR),
    ("/admin", AllowedRoles::ADMIN),
    ("/dashboard", AllowedRoles::ANY),
];

/// Roles allowed on `route`, or `None` for a public route.
pub fn allowed_roles(route: &str) -> Option<AllowedRoles> {
    ROUTE_TABLE
        .iter()
        .find(|(prefix, _)| {
            route
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
        .map(|(_, roles)| *roles)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Authorized,
    Redirect(&'static str),
}

/// Decides a single navigation to `route`. Nothing is remembered between
/// calls.
pub fn authorize(route: &str, session: Option<&Session>) -> GuardDecision {
    let Some(allowed) = allowed_roles(route) else {
        return GuardDecision::Authorized;
    };

    match session {
        None => GuardDecision::Redirect(LOGIN_ROUTE),
        Some(session) if allowed.permits(session.role) => GuardDecision::Authorized,
        Some(session) => GuardDecision::Redirect(home_for(session.role).dashboard),
    }
}

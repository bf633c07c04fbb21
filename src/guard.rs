//! Route access policy.
//!
//! Decides, before any page runs, whether a request is served or
//! redirected. The decision depends only on the path and on whether the
//! caller holds a valid session; reading the session happens beforehand.
//!
//! | Path            | No session          | Session               |
//! |-----------------|---------------------|-----------------------|
//! | `/api/auth...`  | pass through        | pass through          |
//! | `/login`        | serve               | redirect `/dashboard` |
//! | `/`             | redirect `/login`   | redirect `/dashboard` |
//! | anything else   | redirect `/login`   | serve                 |

/// Identity provider namespace (sign-in, callback, sign-out)
pub const AUTH_PREFIX: &str = "/api/auth";
pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_HOME: &str = "/dashboard";
pub const ROOT_PATH: &str = "/";

/// Paths that skip the guard entirely
const EXCLUDED_PREFIXES: &[&str] = &[AUTH_PREFIX];

/// Paths served without a session
const PUBLIC_PATHS: &[&str] = &[LOGIN_PATH];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    RedirectTo(&'static str),
}

/// Whether `path` bypasses the guard, so the session need not be read
pub fn is_excluded(path: &str) -> bool {
    EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Decide what to do with a request for `path`.
pub fn decide(path: &str, session_present: bool) -> Action {
    if is_excluded(path) {
        return Action::Continue;
    }

    if path == ROOT_PATH {
        return if session_present {
            Action::RedirectTo(DASHBOARD_HOME)
        } else {
            Action::RedirectTo(LOGIN_PATH)
        };
    }

    match (is_public(path), session_present) {
        (true, true) => Action::RedirectTo(DASHBOARD_HOME),
        (false, false) => Action::RedirectTo(LOGIN_PATH),
        _ => Action::Continue,
    }
}

use worker::*;

use super::session::{decode_session, now_seconds, read_cookie};
use crate::config::Config;
use crate::guard::LOGIN_PATH;
use crate::handlers::redirect;
use crate::models::SessionUser;

/// Session inspection for incoming requests
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Read and verify the session cookie.
    ///
    /// `Ok(None)` means no usable session (missing, forged or expired).
    /// `Err` means the inspection itself failed.
    pub async fn get_session(req: &Request, config: &Config) -> Result<Option<SessionUser>> {
        let cookie_header = req.headers().get("Cookie")?;
        session_from_cookie_header(cookie_header.as_deref(), config, now_seconds())
    }

    /// Whether the request carries a valid session.
    ///
    /// Inspection failures count as no session.
    pub async fn session_present(req: &Request, config: &Config) -> bool {
        Self::inspect(req, config).await.is_some()
    }

    async fn inspect(req: &Request, config: &Config) -> Option<SessionUser> {
        let inspected = Self::get_session(req, config).await;
        if let Err(e) = &inspected {
            console_error!("[AUTH] Session inspection failed: {}", e);
        }
        fail_closed(inspected)
    }

    /// Require a session, returning a login redirect if there is none
    pub async fn require_session(
        req: &Request,
        config: &Config,
    ) -> Result<std::result::Result<SessionUser, Response>> {
        match Self::inspect(req, config).await {
            Some(user) => Ok(Ok(user)),
            None => Ok(Err(redirect(LOGIN_PATH)?)),
        }
    }
}

/// Resolve the session carried by a `Cookie` header at time `now`
pub fn session_from_cookie_header(
    header: Option<&str>,
    config: &Config,
    now: i64,
) -> Result<Option<SessionUser>> {
    let token = match header.and_then(|header| read_cookie(header, config.session_cookie_name())) {
        Some(token) => token,
        None => return Ok(None),
    };

    let secret = config.signing_secret()?;

    Ok(decode_session(&token, secret, now).map(SessionUser::from))
}

/// Collapse an inspection result so that failures read as no session
pub fn fail_closed(inspected: Result<Option<SessionUser>>) -> Option<SessionUser> {
    inspected.ok().flatten()
}

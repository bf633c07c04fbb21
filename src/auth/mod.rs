mod middleware;
mod session;

pub use middleware::AuthMiddleware;
pub use session::{
    clear_cookie, decode_session, encode_session, now_seconds, read_cookie, sanitize_callback,
    set_cookie, SessionClaims,
};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use worker::*;

use crate::config::Config;
use crate::guard::{DASHBOARD_HOME, LOGIN_PATH};
use crate::handlers::{query_param, redirect_with_cookies};
use crate::models::SessionUser;
use crate::AppState;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const GOOGLE_SCOPES: &str = "openid email profile";

const STATE_COOKIE: &str = "pizza.oauth-state";
const CALLBACK_COOKIE: &str = "pizza.callback-url";
const OAUTH_COOKIE_MAX_AGE: i64 = 600;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUser {
    sub: String,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
}

/// Public view of the current session, as returned by `/api/auth/session`
#[derive(Debug, Serialize, PartialEq)]
pub struct SessionResponse {
    pub user: SessionProfile,
    pub expires: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SessionProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

impl SessionResponse {
    pub fn from_user(user: &SessionUser) -> Self {
        let expires = OffsetDateTime::from_unix_timestamp(user.expires_at)
            .ok()
            .and_then(|at| at.format(&Rfc3339).ok())
            .unwrap_or_default();

        Self {
            user: SessionProfile {
                name: user.name.clone(),
                email: user.email.clone(),
                image: user.image.clone(),
            },
            expires,
        }
    }
}

/// Start Google sign-in
pub async fn sign_in(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    let config = &ctx.data.config;

    let client_id = match config.google_credentials() {
        Some((client_id, _)) => client_id,
        None => {
            console_error!("[AUTH] Missing Google OAuth credentials in environment variables!");
            return redirect_with_cookies(&format!("{}?error=Configuration", LOGIN_PATH), &[]);
        }
    };

    let callback = sanitize_callback(
        query_param(&req, "callbackUrl")?.as_deref(),
        DASHBOARD_HOME,
    );
    let redirect_uri = get_redirect_uri(&req)?;
    let state = generate_state()?;

    let auth_url = format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&prompt=select_account",
        GOOGLE_AUTHORIZE_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(&redirect_uri),
        urlencoding::encode(GOOGLE_SCOPES),
        state
    );

    redirect_with_cookies(
        &auth_url,
        &[
            set_cookie(config, STATE_COOKIE, &state, OAUTH_COOKIE_MAX_AGE),
            set_cookie(
                config,
                CALLBACK_COOKIE,
                &urlencoding::encode(&callback),
                OAUTH_COOKIE_MAX_AGE,
            ),
        ],
    )
}

/// Handle the Google OAuth callback
pub async fn handle_callback(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    let config = &ctx.data.config;

    match complete_sign_in(&req, config).await {
        Ok(response) => Ok(response),
        Err(e) => {
            console_error!("[AUTH] Sign-in callback failed: {}", e);
            redirect_with_cookies(
                &format!("{}?error=OAuthCallback", LOGIN_PATH),
                &[
                    clear_cookie(config, STATE_COOKIE),
                    clear_cookie(config, CALLBACK_COOKIE),
                ],
            )
        }
    }
}

/// Sign out and clear the session
pub async fn sign_out(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    let config = &ctx.data.config;
    let target = sanitize_callback(query_param(&req, "callbackUrl")?.as_deref(), LOGIN_PATH);

    if config.auth_debug {
        console_log!("[AUTH] Signing out, redirecting to {}", target);
    }

    redirect_with_cookies(&target, &[clear_cookie(config, config.session_cookie_name())])
}

/// Current session as JSON, or `{}` without one
pub async fn session(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match AuthMiddleware::get_session(&req, &ctx.data.config).await {
        Ok(Some(user)) => Response::from_json(&SessionResponse::from_user(&user)),
        Ok(None) => Response::from_json(&serde_json::json!({})),
        Err(e) => {
            console_error!("[AUTH] Session inspection failed: {}", e);
            Response::from_json(&serde_json::json!({}))
        }
    }
}

async fn complete_sign_in(req: &Request, config: &Config) -> Result<Response> {
    let url = req.url()?;
    let params: HashMap<String, String> = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    if let Some(error) = params.get("error") {
        return Err(format!("provider returned error: {}", error).into());
    }

    // Verify state matches
    let state = params.get("state").ok_or("Missing state parameter")?;
    let cookie_header = req.headers().get("Cookie")?.unwrap_or_default();
    let cookie_state = read_cookie(&cookie_header, STATE_COOKIE).ok_or("Missing state cookie")?;

    if state != &cookie_state {
        return Err("Invalid state parameter".into());
    }

    let code = params.get("code").ok_or("Missing code parameter")?;
    let (client_id, client_secret) = config
        .google_credentials()
        .ok_or("Google OAuth credentials are not configured")?;
    let redirect_uri = get_redirect_uri(req)?;

    let access_token =
        exchange_code_for_token(client_id, client_secret, code, &redirect_uri).await?;
    let google_user = get_google_user(&access_token).await?;

    let now = now_seconds();
    let claims = SessionClaims {
        sub: google_user.sub,
        name: google_user.name,
        email: google_user.email,
        picture: google_user.picture,
        iat: now,
        exp: now.saturating_add(config.session_max_age_seconds()),
    };
    let token = encode_session(&claims, config.signing_secret()?)?;

    let callback = read_cookie(&cookie_header, CALLBACK_COOKIE)
        .and_then(|value| urlencoding::decode(&value).ok().map(|v| v.into_owned()));
    let target = sanitize_callback(callback.as_deref(), DASHBOARD_HOME);

    if config.auth_debug {
        console_log!("[AUTH] Signed in {}, redirecting to {}", claims.sub, target);
    }

    redirect_with_cookies(
        &target,
        &[
            set_cookie(
                config,
                config.session_cookie_name(),
                &token,
                config.session_max_age_seconds(),
            ),
            clear_cookie(config, STATE_COOKIE),
            clear_cookie(config, CALLBACK_COOKIE),
        ],
    )
}

async fn exchange_code_for_token(
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<String> {
    let body = format!(
        "client_id={}&client_secret={}&code={}&redirect_uri={}&grant_type=authorization_code",
        urlencoding::encode(client_id),
        urlencoding::encode(client_secret),
        urlencoding::encode(code),
        urlencoding::encode(redirect_uri)
    );

    let mut init = RequestInit::new();
    init.with_method(Method::Post);
    init.with_body(Some(wasm_bindgen::JsValue::from_str(&body)));

    let headers = Headers::new();
    headers.set("Accept", "application/json")?;
    headers.set("Content-Type", "application/x-www-form-urlencoded")?;
    init.with_headers(headers);

    let request = Request::new_with_init(GOOGLE_TOKEN_URL, &init)?;
    let mut response = Fetch::Request(request).send().await?;

    if response.status_code() != 200 {
        let detail = response.text().await.unwrap_or_default();
        return Err(format!(
            "token exchange failed with status {}: {}",
            response.status_code(),
            detail
        )
        .into());
    }

    let token_response: TokenResponse = response.json().await?;
    Ok(token_response.access_token)
}

async fn get_google_user(token: &str) -> Result<GoogleUser> {
    let headers = Headers::new();
    headers.set("Authorization", &format!("Bearer {}", token))?;
    headers.set("Accept", "application/json")?;

    let mut init = RequestInit::new();
    init.with_method(Method::Get);
    init.with_headers(headers);

    let request = Request::new_with_init(GOOGLE_USERINFO_URL, &init)?;
    let mut response = Fetch::Request(request).send().await?;

    if response.status_code() != 200 {
        return Err(format!("userinfo request failed with status {}", response.status_code()).into());
    }

    response.json().await
}

fn get_redirect_uri(req: &Request) -> Result<String> {
    let url = req.url()?;
    let scheme = url.scheme();
    let host = url.host_str().ok_or("Missing host")?;
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    Ok(format!(
        "{}://{}{}/api/auth/callback/google",
        scheme, host, port
    ))
}

fn generate_state() -> Result<String> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes).map_err(|e| Error::RustError(e.to_string()))?;
    Ok(bytes.iter().map(|b| format!("{:02x}", b)).collect())
}

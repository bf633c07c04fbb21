mod dashboard;
mod orders;

pub use dashboard::dashboard;
pub use orders::{orders, orders_api};

use worker::*;

use crate::templates;
use crate::AppState;

/// Login page
pub fn login(req: Request, _ctx: RouteContext<AppState>) -> Result<Response> {
    let error = query_param(&req, "error")?;
    Response::from_html(templates::render_login(error.as_deref()))
}

/// 404 page
pub fn not_found() -> Result<Response> {
    Response::from_html(templates::render_not_found()).map(|r| r.with_status(404))
}

/// Error page for handler failures
pub fn error_page() -> Result<Response> {
    Response::from_html(templates::render_error()).map(|r| r.with_status(500))
}

/// 302 to `location`, setting each of `cookies`
pub fn redirect_with_cookies(location: &str, cookies: &[String]) -> Result<Response> {
    let headers = Headers::new();
    headers.set("Location", location)?;
    for cookie in cookies {
        headers.append("Set-Cookie", cookie)?;
    }

    Response::empty()
        .map(|r| r.with_status(302))
        .map(|r| r.with_headers(headers))
}

pub fn redirect(location: &str) -> Result<Response> {
    redirect_with_cookies(location, &[])
}

/// First value of a query parameter
pub fn query_param(req: &Request, name: &str) -> Result<Option<String>> {
    let url = req.url()?;
    Ok(url
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned()))
}

/// Whether the request was issued by htmx
pub fn is_htmx(req: &Request) -> Result<bool> {
    Ok(req.headers().get("HX-Request")?.is_some())
}

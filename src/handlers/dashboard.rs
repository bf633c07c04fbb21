use worker::*;

use crate::auth::AuthMiddleware;
use crate::templates;
use crate::AppState;

/// Dashboard home - requires authentication
pub async fn dashboard(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    let user = match AuthMiddleware::require_session(&req, &ctx.data.config).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    Response::from_html(templates::render_dashboard(&user))
}

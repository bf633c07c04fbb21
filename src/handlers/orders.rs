use serde::Serialize;
use worker::*;

use super::is_htmx;
use crate::auth::AuthMiddleware;
use crate::projection::{project, Projection, ViewState};
use crate::templates;
use crate::AppState;

/// JSON body of `/api/orders`
#[derive(Debug, Serialize)]
struct OrdersPayload {
    #[serde(flatten)]
    projection: Projection,
    state: ViewState,
}

/// Orders view - full page, or just the table for htmx requests
pub async fn orders(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    let user = match AuthMiddleware::require_session(&req, &ctx.data.config).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let state = view_state(&req)?;
    let projection = project(ctx.data.orders.orders(), &state);

    if is_htmx(&req)? {
        Response::from_html(templates::render_orders_table(&state, &projection))
    } else {
        Response::from_html(templates::render_orders_page(&user, &state, &projection))
    }
}

/// Projected orders as JSON
pub async fn orders_api(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    if let Err(redirect) = AuthMiddleware::require_session(&req, &ctx.data.config).await? {
        return Ok(redirect);
    }

    let state = view_state(&req)?;
    let projection = project(ctx.data.orders.orders(), &state);

    Response::from_json(&OrdersPayload { projection, state })
}

fn view_state(req: &Request) -> Result<ViewState> {
    let url = req.url()?;
    Ok(ViewState::from_query(url.query_pairs()))
}

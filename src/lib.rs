use worker::*;

pub mod auth;
pub mod config;
pub mod data;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod projection;
pub mod templates;

use config::Config;
use data::{OrderSource, SeedOrders};
use guard::Action;

/// Per-request data handed to every route
pub struct AppState {
    pub config: Config,
    pub orders: Box<dyn OrderSource>,
}

#[event(fetch)]
async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();

    let config = Config::from_env(&env);
    let path = req.path();

    // The auth namespace must not be gated, or the sign-in handshake breaks
    let action = if guard::is_excluded(&path) {
        Action::Continue
    } else {
        let session_present = auth::AuthMiddleware::session_present(&req, &config).await;
        guard::decide(&path, session_present)
    };

    if let Action::RedirectTo(target) = action {
        if config.auth_debug {
            console_log!("[GUARD] {} -> {}", path, target);
        }
        return handlers::redirect(target);
    }

    let state = AppState {
        config,
        orders: Box::new(SeedOrders::new()),
    };

    let response = Router::with_data(state)
        // Pages
        .get("/login", handlers::login)
        .get_async("/dashboard", handlers::dashboard)
        .get_async("/dashboard/orders", handlers::orders)
        // Orders API (JSON)
        .get_async("/api/orders", handlers::orders_api)
        // Identity provider
        .get_async("/api/auth/signin/google", auth::sign_in)
        .get_async("/api/auth/callback/google", auth::handle_callback)
        .get_async("/api/auth/signout", auth::sign_out)
        .post_async("/api/auth/signout", auth::sign_out)
        .get_async("/api/auth/session", auth::session)
        .run(req, env)
        .await;

    match response {
        // Unmatched routes come back from the router as a bare 404
        Ok(response) if response.status_code() == 404 => handlers::not_found(),
        Ok(response) => Ok(response),
        Err(e) => {
            console_error!("[APP] Request to {} failed: {}", path, e);
            handlers::error_page()
        }
    }
}

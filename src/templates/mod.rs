use crate::models::{Order, OrderStatus, SessionUser};
use crate::projection::{Projection, SortDirection, SortField, StatusFilter, ViewState};

const ORDERS_PATH: &str = "/dashboard/orders";

/// Which navbar link is highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Home,
    Orders,
}

/// Render the login page, with an optional `?error=` code from a failed sign-in
pub fn render_login(error: Option<&str>) -> String {
    let banner = error
        .map(|code| {
            format!(
                r#"<div class="alert" role="alert">{}</div>"#,
                escape_html(login_error_message(code))
            )
        })
        .unwrap_or_default();

    layout(
        "Login - Pizza Dashboard",
        "",
        &format!(
            r#"
        <div class="login-container">
            <div class="login-badge">&#127829;</div>
            <div class="login-card">
                <h1>Pizza Dashboard</h1>
                <p>Sign in to manage your pizza orders</p>
                {}
                <a href="/api/auth/signin/google?callbackUrl=%2Fdashboard" class="btn btn-primary btn-block">
                    Sign in with Google
                </a>
            </div>
        </div>
        "#,
            banner
        ),
    )
}

/// Map a sign-in error code to a message
pub fn login_error_message(code: &str) -> &'static str {
    match code {
        "OAuthCallback" => "Authentication failed. Please try again.",
        "Configuration" => "Sign-in is not configured on this server.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Render the dashboard home
pub fn render_dashboard(user: &SessionUser) -> String {
    layout(
        "Dashboard - Pizza Dashboard",
        "",
        &format!(
            r#"
            {}
            <main class="dashboard-main">
                <section class="panel">
                    <div class="panel-header">
                        <div>
                            <h1>Hello, {}!</h1>
                            <p class="muted">Welcome to your dashboard</p>
                        </div>
                    </div>
                    <div class="panel-body">
                        <p>This is your personal dashboard. You can navigate to different
                        sections using the navigation bar above.</p>
                        <p>Check out the <a href="{}"><strong>Pizza Orders</strong></a> section
                        to view all orders.</p>
                    </div>
                </section>
            </main>
            "#,
            render_navbar(user, NavItem::Home),
            escape_html(user.display_name()),
            ORDERS_PATH
        ),
    )
}

/// Render the orders page (full page, used for non-htmx requests)
pub fn render_orders_page(user: &SessionUser, state: &ViewState, projection: &Projection) -> String {
    let options: String = projection
        .counts
        .iter()
        .map(|(filter, count)| {
            let label = match filter {
                StatusFilter::All => "All Statuses",
                StatusFilter::Only(status) => status.as_str(),
            };
            let selected = if filter == state.status_filter {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{}"{}>{} ({})</option>"#,
                escape_html(filter.as_str()),
                selected,
                label,
                count
            )
        })
        .collect();

    layout(
        "Pizza Orders - Pizza Dashboard",
        "",
        &format!(
            r##"
            {}
            <main class="dashboard-main">
                <section class="panel">
                    <div class="panel-header">
                        <div>
                            <h1>Pizza Orders</h1>
                            <p class="muted">View and manage all pizza orders</p>
                        </div>
                        <form id="orders-filter" method="get" action="{path}"
                              hx-get="{path}"
                              hx-trigger="change"
                              hx-target="#orders-table"
                              hx-swap="outerHTML"
                              hx-push-url="true">
                            <label for="status-filter" class="sr-only">Filter by Status</label>
                            <select id="status-filter" name="status">{}</select>
                            <noscript><button type="submit" class="btn btn-secondary btn-sm">Apply</button></noscript>
                        </form>
                    </div>
                    {}
                </section>
            </main>
            "##,
            render_navbar(user, NavItem::Orders),
            options,
            render_orders_table(state, projection),
            path = ORDERS_PATH
        ),
    )
}

/// Render the orders table (htmx partial)
pub fn render_orders_table(state: &ViewState, projection: &Projection) -> String {
    // Sort inputs live with the table so the filter form picks up the
    // current sort after a header click swapped the table.
    let sort_inputs = match state.sort_field {
        Some(field) => format!(
            r#"<input type="hidden" form="orders-filter" name="sort" value="{}"><input type="hidden" form="orders-filter" name="dir" value="{}">"#,
            field.as_str(),
            state.sort_direction.as_str()
        ),
        None => String::new(),
    };

    let headers: String = SortField::ALL
        .iter()
        .map(|&field| render_sort_header(state, field))
        .collect();

    let body = if projection.visible.is_empty() {
        format!(
            r#"<tr><td colspan="{}" class="empty-state">No orders match this filter.</td></tr>"#,
            SortField::ALL.len()
        )
    } else {
        projection.visible.iter().map(render_order_row).collect()
    };

    format!(
        r#"<div id="orders-table" class="table-wrapper">{}<table class="orders-table"><thead><tr>{}</tr></thead><tbody>{}</tbody></table></div>"#,
        sort_inputs, headers, body
    )
}

fn render_sort_header(state: &ViewState, field: SortField) -> String {
    let href = orders_href(&state.with_sort_toggled(field));
    let arrow = match (state.sort_field == Some(field), state.sort_direction) {
        (true, SortDirection::Ascending) => r#"<span class="sort-arrow">↑</span>"#,
        (true, SortDirection::Descending) => r#"<span class="sort-arrow">↓</span>"#,
        (false, _) => "",
    };

    [
        "<th scope=\"col\"><a href=\"",
        &href,
        "\" hx-get=\"",
        &href,
        "\" hx-target=\"#orders-table\" hx-swap=\"outerHTML\" hx-push-url=\"true\">",
        field.label(),
        arrow,
        "</a></th>",
    ]
    .concat()
}

fn render_order_row(order: &Order) -> String {
    [
        "<tr><td class=\"strong\">",
        &escape_html(&order.id),
        "</td><td>",
        &escape_html(&order.customer_name),
        "</td><td>",
        &escape_html(&order.pizza_type),
        "</td><td>",
        &order.quantity.to_string(),
        "</td><td>",
        &escape_html(&order.order_date),
        "</td><td><span class=\"status-badge ",
        status_badge_class(order.status),
        "\">",
        order.status.as_str(),
        "</span></td></tr>",
    ]
    .concat()
}

fn orders_href(state: &ViewState) -> String {
    let query = state.to_query();
    if query.is_empty() {
        ORDERS_PATH.to_string()
    } else {
        // escaped for use inside an attribute
        escape_html(&format!("{}?{}", ORDERS_PATH, query))
    }
}

fn status_badge_class(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "status-pending",
        OrderStatus::Preparing => "status-preparing",
        OrderStatus::OutForDelivery => "status-out-for-delivery",
        OrderStatus::Delivered => "status-delivered",
        OrderStatus::Cancelled => "status-cancelled",
    }
}

fn render_navbar(user: &SessionUser, active: NavItem) -> String {
    let link = |item: NavItem, href: &str, label: &str| {
        let class = if item == active {
            "nav-link active"
        } else {
            "nav-link"
        };
        format!(r#"<a href="{}" class="{}">{}</a>"#, href, class, label)
    };

    let name = escape_html(user.display_name());
    let avatar = user
        .image
        .as_deref()
        .map(|src| {
            format!(
                r#"<img class="avatar" src="{}" alt="{}'s profile" width="32" height="32">"#,
                escape_html(src),
                name
            )
        })
        .unwrap_or_default();

    format!(
        r#"
            <header class="dashboard-header">
                <div class="nav-left">
                    <a href="/dashboard" class="brand">Dashboard</a>
                    <nav>{}{}</nav>
                </div>
                <div class="user-info">
                    {}
                    <span>{}</span>
                    <a href="/api/auth/signout?callbackUrl=%2Flogin" class="btn btn-logout">Logout</a>
                </div>
            </header>
        "#,
        link(NavItem::Home, "/dashboard", "Home"),
        link(NavItem::Orders, ORDERS_PATH, "Pizza Orders"),
        avatar,
        name
    )
}

/// Render the 404 page
pub fn render_not_found() -> String {
    layout(
        "Not Found - Pizza Dashboard",
        r#"<meta http-equiv="refresh" content="10;url=/dashboard">"#,
        r#"
        <div class="login-container">
            <div class="login-card">
                <h1 class="big">404</h1>
                <h2>Oops! We lost that slice.</h2>
                <p>The page you're looking for doesn't exist or was moved to another location.</p>
                <p class="muted">Redirecting to Dashboard in 10 seconds</p>
                <a href="/dashboard" class="btn btn-primary">Go to Dashboard Now</a>
            </div>
        </div>
        "#,
    )
}

/// Render the generic error page
pub fn render_error() -> String {
    layout(
        "Error - Pizza Dashboard",
        r#"<meta http-equiv="refresh" content="15;url=/dashboard">"#,
        r#"
        <div class="login-container">
            <div class="login-card">
                <h1>Oh no! Pizza Burnt</h1>
                <h2>Something went wrong</h2>
                <p>Our chefs are working hard to fix this issue. Please try again later.</p>
                <p class="muted">Redirecting to Dashboard in 15 seconds</p>
                <a href="/dashboard" class="btn btn-primary">Go to Dashboard</a>
            </div>
        </div>
        "#,
    )
}

/// Wrap content in the base layout
fn layout(title: &str, head: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    {}
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <style>
        :root {{
            --bg-primary: #f5f7fb;
            --bg-secondary: #ffffff;
            --bg-tertiary: #f0f2f6;
            --text-primary: #111827;
            --text-secondary: #6b7280;
            --accent: #ef4444;
            --link: #3b82f6;
            --border: #e5e7eb;
        }}

        * {{ box-sizing: border-box; margin: 0; padding: 0; }}

        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.5;
            min-height: 100vh;
        }}

        a {{ color: var(--link); }}

        .sr-only {{
            position: absolute;
            width: 1px;
            height: 1px;
            overflow: hidden;
            clip: rect(0, 0, 0, 0);
        }}

        .muted {{ color: var(--text-secondary); font-size: 0.875rem; }}

        .login-container {{
            display: flex;
            flex-direction: column;
            align-items: center;
            justify-content: center;
            min-height: 100vh;
            padding: 2rem;
            text-align: center;
        }}

        .login-badge {{
            font-size: 3rem;
            margin-bottom: 1.5rem;
        }}

        .login-card {{
            background: var(--bg-secondary);
            border-radius: 12px;
            box-shadow: 0 10px 25px rgba(0, 0, 0, 0.08);
            padding: 2.5rem;
            max-width: 420px;
            width: 100%;
        }}

        .login-card h1 {{ font-size: 2rem; margin-bottom: 0.5rem; }}
        .login-card h1.big {{ font-size: 3rem; }}
        .login-card h2 {{ font-size: 1.25rem; margin-bottom: 0.5rem; }}
        .login-card p {{ color: var(--text-secondary); margin-bottom: 1.5rem; }}

        .alert {{
            background: #fef2f2;
            color: #b91c1c;
            border: 1px solid #fecaca;
            border-radius: 6px;
            padding: 0.75rem;
            margin-bottom: 1.5rem;
            font-size: 0.875rem;
        }}

        .btn {{
            display: inline-flex;
            align-items: center;
            justify-content: center;
            gap: 0.5rem;
            padding: 0.75rem 1.5rem;
            border-radius: 6px;
            text-decoration: none;
            font-weight: 500;
            border: 1px solid transparent;
            cursor: pointer;
        }}

        .btn-block {{ width: 100%; }}
        .btn-primary {{ background: var(--accent); color: white; }}
        .btn-primary:hover {{ background: #dc2626; }}
        .btn-secondary {{ background: var(--bg-tertiary); color: var(--text-primary); border-color: var(--border); }}
        .btn-sm {{ padding: 0.375rem 0.75rem; font-size: 0.75rem; }}
        .btn-logout {{ padding: 0.25rem 0.75rem; color: #dc2626; font-size: 0.875rem; }}

        .dashboard-header {{
            display: flex;
            justify-content: space-between;
            align-items: center;
            padding: 0 2rem;
            height: 4rem;
            background: var(--bg-secondary);
            border-bottom: 1px solid var(--border);
        }}

        .nav-left {{ display: flex; align-items: center; gap: 2rem; height: 100%; }}
        .nav-left nav {{ display: flex; gap: 2rem; height: 100%; }}
        .brand {{ font-size: 1.25rem; font-weight: 700; color: var(--text-primary); text-decoration: none; }}

        .nav-link {{
            display: inline-flex;
            align-items: center;
            border-bottom: 2px solid transparent;
            color: var(--text-secondary);
            text-decoration: none;
            font-size: 0.875rem;
            font-weight: 500;
        }}

        .nav-link.active {{ border-bottom-color: var(--link); color: var(--text-primary); }}

        .user-info {{ display: flex; align-items: center; gap: 1rem; font-size: 0.875rem; }}
        .avatar {{ width: 2rem; height: 2rem; border-radius: 50%; }}

        .dashboard-main {{ padding: 2rem; max-width: 1200px; margin: 0 auto; }}

        .panel {{
            background: var(--bg-secondary);
            border-radius: 8px;
            box-shadow: 0 1px 3px rgba(0, 0, 0, 0.08);
            overflow: hidden;
        }}

        .panel-header {{
            display: flex;
            justify-content: space-between;
            align-items: center;
            padding: 1.25rem 1.5rem;
            border-bottom: 1px solid var(--border);
        }}

        .panel-header h1 {{ font-size: 1.5rem; }}
        .panel-body {{ padding: 1.5rem; display: flex; flex-direction: column; gap: 1rem; }}

        select {{
            padding: 0.5rem 2.5rem 0.5rem 0.75rem;
            border: 1px solid var(--border);
            border-radius: 6px;
            font-size: 0.875rem;
        }}

        .table-wrapper {{ overflow-x: auto; }}
        .orders-table {{ width: 100%; border-collapse: collapse; }}

        .orders-table th {{
            background: var(--bg-tertiary);
            text-align: left;
            font-size: 0.75rem;
            text-transform: uppercase;
            letter-spacing: 0.05em;
            padding: 0.75rem 1.5rem;
        }}

        .orders-table th a {{ color: var(--text-secondary); text-decoration: none; }}
        .sort-arrow {{ margin-left: 0.25rem; }}

        .orders-table td {{
            padding: 1rem 1.5rem;
            border-top: 1px solid var(--border);
            font-size: 0.875rem;
            color: var(--text-secondary);
            white-space: nowrap;
        }}

        .orders-table td.strong {{ color: var(--text-primary); font-weight: 500; }}

        .status-badge {{
            padding: 0.125rem 0.5rem;
            border-radius: 9999px;
            font-size: 0.75rem;
            font-weight: 600;
        }}

        .status-pending {{ background: #fef9c3; color: #854d0e; }}
        .status-preparing {{ background: #dbeafe; color: #1e40af; }}
        .status-out-for-delivery {{ background: #f3e8ff; color: #6b21a8; }}
        .status-delivered {{ background: #dcfce7; color: #166534; }}
        .status-cancelled {{ background: #fee2e2; color: #991b1b; }}

        .empty-state {{ text-align: center; padding: 3rem; }}
    </style>
</head>
<body>
    {}
</body>
</html>"#,
        escape_html(title),
        head,
        content
    )
}

/// Escape HTML special characters
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{OrderSource, SeedOrders};
    use crate::projection::project;

    fn user() -> SessionUser {
        SessionUser {
            id: "1".into(),
            name: Some("Ada <Admin>".into()),
            email: Some("ada@example.com".into()),
            image: Some("https://example.com/a.png".into()),
            expires_at: 0,
        }
    }

    #[test]
    fn escapes_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn login_shows_error_banner_only_on_error() {
        let page = render_login(None);
        assert!(page.contains("Sign in with Google"));
        assert!(!page.contains("role=\"alert\""));

        let page = render_login(Some("OAuthCallback"));
        assert!(page.contains("Authentication failed. Please try again."));
    }

    #[test]
    fn dashboard_greets_user_escaped() {
        let page = render_dashboard(&user());
        assert!(page.contains("Hello, Ada &lt;Admin&gt;!"));
        assert!(page.contains(r#"class="nav-link active">Home"#));
        assert!(page.contains(r#"class="nav-link">Pizza Orders"#));
        assert!(page.contains("https://example.com/a.png"));
    }

    #[test]
    fn table_marks_active_sort_column() {
        let seed = SeedOrders::new();
        let state = ViewState {
            sort_field: Some(SortField::Quantity),
            ..ViewState::default()
        };
        let html = render_orders_table(&state, &project(seed.orders(), &state));

        assert!(html.contains("Quantity<span class=\"sort-arrow\">↑</span>"));
        // clicking the active column again flips to descending
        assert!(html.contains("/dashboard/orders?sort=quantity&amp;dir=desc"));
        // other columns start ascending
        assert!(html.contains("href=\"/dashboard/orders?sort=customerName\""));
        assert!(html.contains(r#"name="sort" value="quantity""#));
    }

    #[test]
    fn table_renders_rows_and_badges() {
        let seed = SeedOrders::new();
        let state = ViewState::default();
        let html = render_orders_table(&state, &project(seed.orders(), &state));

        assert_eq!(html.matches("<tr><td class=\"strong\">").count(), 12);
        assert!(html.contains("Spinach &amp; Feta"));
        assert!(html.contains("status-out-for-delivery"));
        assert!(!html.contains("sort-arrow"));
        assert!(!html.contains("type=\"hidden\""));
    }

    #[test]
    fn table_shows_empty_state() {
        let state = ViewState::default().with_filter(StatusFilter::Only(OrderStatus::Cancelled));
        let html = render_orders_table(&state, &project(&[], &state));

        assert!(html.contains("No orders match this filter."));
    }

    #[test]
    fn filter_select_shows_counts_and_selection() {
        let seed = SeedOrders::new();
        let state = ViewState::default().with_filter(StatusFilter::Only(OrderStatus::OutForDelivery));
        let page = render_orders_page(&user(), &state, &project(seed.orders(), &state));

        assert!(page.contains(r#"<option value="All">All Statuses (12)</option>"#));
        assert!(page.contains(
            r#"<option value="Out for Delivery" selected>Out for Delivery (2)</option>"#
        ));
        assert!(page.contains(r#"class="nav-link active">Pizza Orders"#));
    }

    #[test]
    fn filter_form_swaps_the_table() {
        let seed = SeedOrders::new();
        let state = ViewState::default();
        let page = render_orders_page(&user(), &state, &project(seed.orders(), &state));

        assert!(page.contains(r##"<form id="orders-filter" method="get" action="/dashboard/orders""##));
        assert!(page.contains(r##"hx-target="#orders-table""##));
        assert!(page.contains(r#"<div id="orders-table""#));
        assert!(page.contains("btn-sm"));
    }

    #[test]
    fn error_pages_link_back_to_dashboard() {
        assert!(render_not_found().contains("Oops! We lost that slice."));
        assert!(render_not_found().contains("url=/dashboard"));
        assert!(render_error().contains("Oh no! Pizza Burnt"));
    }
}

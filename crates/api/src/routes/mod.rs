//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Account & auth
//! POST /admin/register          - Register (no token issued)
//! POST /admin/login             - Login, returns bearer token
//! GET  /admin/me                - Current user (capability: Editor)
//!
//! # Products (bearer token required)
//! GET  /admin/product           - Paginated listing, uncached
//! POST /admin/product           - Create (capability: Admin)
//! PUT  /admin/product/{id}      - Update (capability: Admin or Editor)
//!
//! # Public
//! GET  /product/list            - Paginated listing, 20 s read-through cache
//! POST /order/create            - Create an order with line items
//! GET  /login/{provider}            - Redirect to the OAuth provider
//! GET  /login/{provider}/callback   - Provider callback, returns token + user
//! ```

pub mod auth;
pub mod orders;
pub mod products;
pub mod social;

use axum::{
    Router,
    routing::{get, post, put},
};
use serde::Deserialize;

use crate::state::AppState;

/// Query parameters for paginated listings.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

impl PageQuery {
    /// The requested page, defaulting to 1 and clamping nonsense to 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }
}

/// Create the `/admin` routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/product", get(products::index).post(products::create))
        .route("/product/{id}", put(products::update))
}

/// Create the public routes router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/product/list", get(products::list))
        .route("/order/create", post(orders::create))
        .route("/login/{provider}", get(social::redirect))
        .route("/login/{provider}/callback", get(social::callback))
}

/// Assemble the full application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/admin", admin_routes())
        .merge(public_routes())
}

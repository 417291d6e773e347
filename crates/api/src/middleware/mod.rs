//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (the SPA is served from another origin)
//! 4. Rate limiting on the auth routes (governor)
//!
//! Authentication is not a layer: handlers opt in through the
//! [`auth::RequireAuth`] extractor, which checks the `x-auth-token` header.

pub mod auth;
pub mod rate_limit;

pub use auth::{CurrentUser, RequireAuth};
pub use rate_limit::auth_rate_limiter;

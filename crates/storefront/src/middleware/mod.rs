//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Panic catcher (turn handler panics into JSON 500s)
//! 5. Error details (real error text outside production)
//! 6. CORS (allowed origins from config)
//! 7. Security headers
//! 8. Session layer (tower-sessions, cookie `cozy_session`)
//! 9. Rate limiting (governor, wishlist mutation routes only)

pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use rate_limit::{inquiry_rate_limiter, wishlist_rate_limiter};
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, session_layer};

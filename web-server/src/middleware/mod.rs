pub mod rate_limiter;
pub mod token_gate;

pub use rate_limiter::RateLimiter;
pub use token_gate::{AuthenticatedAgent, TokenGate, TokenVerifier, ENTRY_PATH};

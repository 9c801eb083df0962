//! Rate limiting decision engine.

mod decision;
mod identity;
mod limiter;
mod observe;

pub use decision::{ClientKey, Decision, DenialReason};
pub use identity::{
    CompositeResolver, HeaderResolver, IdentifierResolver, RemoteAddrResolver, RequestContext,
};
pub use limiter::RateLimiter;
pub use observe::{DenialObserver, TracingObserver};

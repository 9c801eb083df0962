//! Client identifier resolution.
//!
//! Resolvers map a request context to the client key it is accounted
//! against. They are pure functions of the request: no hidden state, no side
//! effects, and resolution never touches the window store.

use std::collections::HashMap;
use std::net::SocketAddr;

use super::decision::ClientKey;

/// The slice of an inbound request the limiter needs to attribute it.
///
/// The enclosing pipeline builds one of these per request; the limiter never
/// sees the transport's own request type.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Peer address of the connection, when the transport knows it.
    pub peer_addr: Option<SocketAddr>,
    /// Request headers. Names are stored lowercase.
    pub headers: HashMap<String, String>,
}

impl RequestContext {
    /// Create an empty request context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the peer address.
    pub fn with_peer_addr(mut self, addr: SocketAddr) -> Self {
        self.peer_addr = Some(addr);
        self
    }

    /// Add a header. The name is lowercased.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Look up a header value, case-insensitively by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Maps a request to an optional client key.
///
/// Returning `None` means the request carries no usable identity; the
/// limiter's undefined-identifier policy decides what happens next.
pub trait IdentifierResolver: Send + Sync {
    /// Resolve the client key for `request`, if any.
    fn resolve(&self, request: &RequestContext) -> Option<ClientKey>;
}

/// Any plain function of the request context works as a resolver.
impl<F> IdentifierResolver for F
where
    F: Fn(&RequestContext) -> Option<ClientKey> + Send + Sync,
{
    fn resolve(&self, request: &RequestContext) -> Option<ClientKey> {
        self(request)
    }
}

/// Keys clients by the peer IP address.
///
/// The port is excluded so reconnecting clients keep one window.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteAddrResolver;

impl IdentifierResolver for RemoteAddrResolver {
    fn resolve(&self, request: &RequestContext) -> Option<ClientKey> {
        request
            .peer_addr
            .map(|addr| ClientKey::new(addr.ip().to_string()))
    }
}

/// Keys clients by the value of a request header, e.g. an API token.
#[derive(Debug, Clone)]
pub struct HeaderResolver {
    name: String,
}

impl HeaderResolver {
    /// Create a resolver reading the header `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
        }
    }
}

impl IdentifierResolver for HeaderResolver {
    fn resolve(&self, request: &RequestContext) -> Option<ClientKey> {
        request.header(&self.name).map(ClientKey::new)
    }
}

/// Tries resolvers in order; the first one to produce a key wins.
pub struct CompositeResolver {
    resolvers: Vec<Box<dyn IdentifierResolver>>,
}

impl CompositeResolver {
    /// Create a composite over `resolvers`, consulted front to back.
    pub fn new(resolvers: Vec<Box<dyn IdentifierResolver>>) -> Self {
        Self { resolvers }
    }
}

impl IdentifierResolver for CompositeResolver {
    fn resolve(&self, request: &RequestContext) -> Option<ClientKey> {
        self.resolvers.iter().find_map(|r| r.resolve(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with_addr(addr: &str) -> RequestContext {
        RequestContext::new().with_peer_addr(addr.parse().unwrap())
    }

    #[test]
    fn test_remote_addr_resolver_strips_port() {
        let request = context_with_addr("192.168.1.1:54321");
        let key = RemoteAddrResolver.resolve(&request).unwrap();
        assert_eq!(key.as_str(), "192.168.1.1");
    }

    #[test]
    fn test_remote_addr_resolver_without_peer() {
        let request = RequestContext::new();
        assert!(RemoteAddrResolver.resolve(&request).is_none());
    }

    #[test]
    fn test_header_resolver_is_case_insensitive() {
        let request = RequestContext::new().with_header("X-Api-Key", "secret");
        let resolver = HeaderResolver::new("x-api-key");
        assert_eq!(resolver.resolve(&request).unwrap().as_str(), "secret");

        let resolver = HeaderResolver::new("X-API-KEY");
        assert_eq!(resolver.resolve(&request).unwrap().as_str(), "secret");
    }

    #[test]
    fn test_composite_resolver_first_match_wins() {
        let resolver = CompositeResolver::new(vec![
            Box::new(HeaderResolver::new("x-api-key")),
            Box::new(RemoteAddrResolver),
        ]);

        // Token present: the header resolver wins over the address.
        let request = context_with_addr("10.0.0.1:80").with_header("x-api-key", "token-1");
        assert_eq!(resolver.resolve(&request).unwrap().as_str(), "token-1");

        // No token: falls through to the address.
        let request = context_with_addr("10.0.0.1:80");
        assert_eq!(resolver.resolve(&request).unwrap().as_str(), "10.0.0.1");

        // Nothing at all.
        assert!(resolver.resolve(&RequestContext::new()).is_none());
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |request: &RequestContext| {
            request.header("user-id").map(|id| ClientKey::new(format!("user:{}", id)))
        };

        let request = RequestContext::new().with_header("user-id", "42");
        assert_eq!(resolver.resolve(&request).unwrap().as_str(), "user:42");
    }
}

//! The route table.

use super::{Method, Request, Response};
use crate::error::ServerResult;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// A registered request handler over application context `C`.
pub type Handler<C> = Arc<dyn Fn(&C, &Request) -> ServerResult<Response> + Send + Sync>;

/// Route of the default document handler.
const DEFAULT_DOCUMENT: &str = "/index";

/// Maps `(method, target)` pairs to handlers, with a static-directory
/// fallback for retrieval requests.
///
/// Exact resolution tries three forms of the request target in order:
/// the absolute URI, the raw target, then the decoded path. First match
/// wins; a target matching several forms with different registrations
/// resolves by that fixed precedence.
pub struct Router<C> {
    exact: HashMap<Method, HashMap<String, Handler<C>>>,
    static_mounts: Vec<(String, PathBuf)>,
}

impl<C> Default for Router<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Router<C> {
    /// An empty route table.
    pub fn new() -> Self {
        Self {
            exact: HashMap::new(),
            static_mounts: Vec::new(),
        }
    }

    /// Registers a handler for an exact `(method, route)` pair.
    pub fn register<F>(&mut self, method: Method, route: &str, handler: F)
    where
        F: Fn(&C, &Request) -> ServerResult<Response> + Send + Sync + 'static,
    {
        self.exact
            .entry(method)
            .or_default()
            .insert(route.to_string(), Arc::new(handler));
    }

    /// Serves `dir`'s files under `prefix` for retrieval requests. An
    /// empty remainder, or the literal `index`, resolves to the default
    /// document handler instead of a file.
    pub fn mount_static(&mut self, prefix: &str, dir: PathBuf) {
        let prefix = prefix.trim();
        let mut normalized = String::from("/");
        if !prefix.is_empty() && prefix != "/" {
            if !prefix.starts_with('/') {
                normalized.push_str(prefix);
            } else {
                normalized = prefix.to_string();
            }
            if !normalized.ends_with('/') {
                normalized.push('/');
            }
        }
        self.static_mounts.push((normalized, dir));
        // Longest prefix wins when mounts nest.
        self.static_mounts
            .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
    }

    /// Resolves a request to a handler, or nothing for a 404.
    pub fn resolve(&self, request: &Request) -> Option<Handler<C>> {
        if let Some(routes) = self.exact.get(&request.method()) {
            for form in [
                request.absolute_uri(),
                request.raw_target().to_string(),
                request.path().to_string(),
            ] {
                if let Some(handler) = routes.get(&form) {
                    return Some(Arc::clone(handler));
                }
            }
        }

        if request.method().is_retrieval() {
            return self.resolve_static(request.path());
        }
        None
    }

    fn resolve_static(&self, path: &str) -> Option<Handler<C>> {
        let (prefix, dir) = self
            .static_mounts
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix.as_str()))?;

        let remainder = &path[prefix.len()..];
        if remainder.is_empty() || remainder == "index" {
            let routes = self.exact.get(&Method::Get)?;
            return routes.get(DEFAULT_DOCUMENT).map(Arc::clone);
        }
        if remainder.split('/').any(|segment| segment == "..") {
            return None;
        }

        let file = dir.join(remainder);
        if !file.is_file() {
            return None;
        }
        Some(Arc::new(move |_: &C, _: &Request| {
            let content = fs::read(&file)?;
            Ok(Response::html(String::from_utf8_lossy(&content).into_owned()))
        }))
    }
}

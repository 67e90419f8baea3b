//! The connection dispatcher.
//!
//! Accepts connections in a loop and hands each to its own task; there
//! is no admission control or request timeout. Whatever happens inside
//! the handler, the response stream is shut down before the task exits.

use crate::error::{ServerError, ServerResult};
use crate::http::{Request, Response, Router};
use std::net::IpAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, warn};

/// Accept loop plus per-connection workers over application context
/// `C`.
pub struct Dispatcher<C> {
    router: Arc<Router<C>>,
    context: Arc<C>,
}

impl<C: Send + Sync + 'static> Dispatcher<C> {
    /// Builds a dispatcher from a finished route table.
    pub fn new(router: Router<C>, context: Arc<C>) -> Self {
        Self {
            router: Arc::new(router),
            context,
        }
    }

    /// Serves connections from `listener` until accept fails.
    pub async fn serve(&self, listener: TcpListener) -> ServerResult<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            let router = Arc::clone(&self.router);
            let context = Arc::clone(&self.context);
            tokio::spawn(async move {
                handle_connection(router, context, stream, peer.ip()).await;
            });
        }
    }
}

/// Parses, routes and answers one connection, then closes the stream.
async fn handle_connection<C>(
    router: Arc<Router<C>>,
    context: Arc<C>,
    stream: TcpStream,
    peer: IpAddr,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let response = match Request::read(&mut reader, Some(peer)).await {
        Ok(request) => {
            debug!(%peer, target = request.raw_target(), "request");
            dispatch(&router, &context, &request)
        }
        Err(error) => {
            warn!(%peer, %error, "unparseable request");
            Response::bad_request(error.to_string())
        }
    };

    if let Err(error) = response.write_to(&mut write_half).await {
        debug!(%peer, %error, "response write failed");
    }
    // Closed on every exit path, written or not.
    let _ = write_half.shutdown().await;
}

/// Resolves and runs a handler, converting every failure mode into a
/// response. A panicking handler costs its connection a 500, never the
/// process.
fn dispatch<C>(router: &Router<C>, context: &C, request: &Request) -> Response {
    let Some(handler) = router.resolve(request) else {
        return Response::not_found();
    };

    let outcome =
        std::panic::catch_unwind(AssertUnwindSafe(|| handler(context, request)));
    match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(ServerError::BadRequest(message))) => Response::bad_request(message),
        Ok(Err(ServerError::MissingParameter(name))) => {
            Response::bad_request(format!("missing parameter: {name}"))
        }
        Ok(Err(error)) => {
            error!(%error, target = request.raw_target(), "handler failed");
            Response::server_error()
        }
        Err(_) => {
            error!(target = request.raw_target(), "handler panicked");
            Response::server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn start(router: Router<u32>) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let dispatcher = Dispatcher::new(router, Arc::new(7));
        tokio::spawn(async move {
            let _ = dispatcher.serve(listener).await;
        });
        addr
    }

    async fn roundtrip(addr: std::net::SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn routes_and_answers() {
        let mut router: Router<u32> = Router::new();
        router.register(Method::Get, "/ping", |context, _| {
            Ok(Response::text(format!("pong {context}")))
        });
        let addr = start(router).await;

        let response = roundtrip(addr, "GET /ping HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("pong 7"));
    }

    #[tokio::test]
    async fn unrouted_is_404_and_stream_still_closes() {
        let addr = start(Router::new()).await;
        let response = roundtrip(addr, "GET /nowhere HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 404"));
    }

    #[tokio::test]
    async fn panicking_handler_becomes_500() {
        let mut router: Router<u32> = Router::new();
        router.register(Method::Get, "/boom", |_, _| panic!("kaboom"));
        router.register(Method::Get, "/ok", |_, _| Ok(Response::text("fine")));
        let addr = start(router).await;

        let response = roundtrip(addr, "GET /boom HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 500"));

        // The process survives to answer the next connection.
        let response = roundtrip(addr, "GET /ok HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 200"));
    }

    #[tokio::test]
    async fn malformed_request_is_400() {
        let addr = start(Router::new()).await;
        let response = roundtrip(addr, "NONSENSE\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 400"));
    }
}

//! Response building and writing.

use crate::error::ServerResult;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// One outbound response.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    reason: &'static str,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    fn new(status: u16, reason: &'static str) -> Self {
        Self {
            status,
            reason,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// 200 with an HTML body.
    pub fn html(content: impl Into<String>) -> Self {
        let mut response = Self::new(200, "OK");
        response
            .headers
            .push(("Content-Type".into(), "text/html; charset=utf-8".into()));
        response.body = content.into().into_bytes();
        response
    }

    /// 200 with a plain-text body.
    pub fn text(content: impl Into<String>) -> Self {
        let mut response = Self::new(200, "OK");
        response
            .headers
            .push(("Content-Type".into(), "text/plain; charset=utf-8".into()));
        response.body = content.into().into_bytes();
        response
    }

    /// 302 to another page.
    pub fn redirect(location: impl Into<String>) -> Self {
        let mut response = Self::new(302, "Found");
        response.headers.push(("Location".into(), location.into()));
        response
    }

    /// 400 with a short explanation.
    pub fn bad_request(message: impl Into<String>) -> Self {
        let mut response = Self::new(400, "Bad Request");
        response.body = message.into().into_bytes();
        response
    }

    /// 404; nothing routed to the target.
    pub fn not_found() -> Self {
        Self::new(404, "Not Found")
    }

    /// 500; the handler failed.
    pub fn server_error() -> Self {
        Self::new(500, "Internal Server Error")
    }

    /// Attaches a Set-Cookie header.
    #[must_use]
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.headers
            .push(("Set-Cookie".into(), format!("{name}={value}; Path=/")));
        self
    }

    /// The status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// A header value, if set.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Serializes the response onto a stream.
    pub async fn write_to<W>(&self, stream: &mut W) -> ServerResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, self.reason);
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        head.push_str("Connection: close\r\n\r\n");

        stream.write_all(head.as_bytes()).await?;
        stream.write_all(&self.body).await?;
        stream.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serializes_status_headers_and_body() {
        let response = Response::html("<p>hi</p>").with_cookie("session", "abc");

        let mut out = Vec::new();
        response.write_to(&mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Set-Cookie: session=abc; Path=/\r\n"));
        assert!(text.contains("Content-Length: 9\r\n"));
        assert!(text.ends_with("\r\n\r\n<p>hi</p>"));
    }

    #[test]
    fn redirect_sets_location() {
        let response = Response::redirect("/index");
        assert_eq!(response.status(), 302);
        assert_eq!(response.header("location"), Some("/index"));
    }
}

//! Request parsing.

use super::url_decode;
use crate::error::{ServerError, ServerResult};
use std::collections::HashMap;
use std::net::IpAddr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Largest accepted request body.
const MAX_BODY: usize = 4 * 1024 * 1024;
/// Largest accepted header section.
const MAX_HEADER_LINE: usize = 16 * 1024;

/// The request methods the service routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Retrieval.
    Get,
    /// Form submission.
    Post,
}

impl Method {
    /// Parses a request-line method token.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            _ => None,
        }
    }

    /// Whether the method may fall back to static files.
    pub fn is_retrieval(self) -> bool {
        self == Self::Get
    }
}

/// One parsed inbound request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    /// The request-target exactly as it appeared on the request line.
    raw_target: String,
    /// Decoded path portion of the target.
    path: String,
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    /// Peer address, when the transport knows it.
    pub remote: Option<IpAddr>,
}

impl Request {
    /// Reads and parses one request from a buffered stream.
    pub async fn read<R>(stream: &mut R, remote: Option<IpAddr>) -> ServerResult<Self>
    where
        R: AsyncBufRead + Unpin,
    {
        let request_line = read_header_line(stream).await?;
        let mut parts = request_line.split_whitespace();
        let method = parts
            .next()
            .and_then(Method::parse)
            .ok_or_else(|| ServerError::bad_request("unrecognized method"))?;
        let raw_target = parts
            .next()
            .ok_or_else(|| ServerError::bad_request("missing request target"))?
            .to_string();
        if !raw_target.starts_with('/') {
            return Err(ServerError::bad_request("request target must be absolute"));
        }

        let mut headers = HashMap::new();
        loop {
            let line = read_header_line(stream).await?;
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }

        let mut body = Vec::new();
        if let Some(length) = headers.get("content-length") {
            let length: usize = length
                .parse()
                .map_err(|_| ServerError::bad_request("bad content-length"))?;
            if length > MAX_BODY {
                return Err(ServerError::bad_request("body too large"));
            }
            body.resize(length, 0);
            stream.read_exact(&mut body).await?;
        }

        Ok(Self::from_parts(method, raw_target, headers, body, remote))
    }

    /// Assembles a request from already-parsed pieces. Used directly by
    /// router tests.
    pub fn from_parts(
        method: Method,
        raw_target: String,
        headers: HashMap<String, String>,
        body: Vec<u8>,
        remote: Option<IpAddr>,
    ) -> Self {
        let (path_part, query_part) = match raw_target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (raw_target.as_str(), None),
        };
        let path = url_decode(path_part);
        let query = query_part.map(parse_form).unwrap_or_default();

        Self {
            method,
            raw_target,
            path,
            query,
            headers,
            body,
            remote,
        }
    }

    /// Convenience constructor for a GET with no headers or body.
    pub fn get(target: &str) -> Self {
        Self::from_parts(Method::Get, target.to_string(), HashMap::new(), Vec::new(), None)
    }

    /// The request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The request-target as received, query string included.
    pub fn raw_target(&self) -> &str {
        &self.raw_target
    }

    /// The decoded path, query stripped.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The absolute URI the client addressed, reconstructed from the
    /// Host header.
    pub fn absolute_uri(&self) -> String {
        let host = self
            .headers
            .get("host")
            .map(String::as_str)
            .unwrap_or("localhost");
        format!("http://{host}{}", self.raw_target)
    }

    /// A header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// A decoded query parameter.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// A query parameter that must be present.
    pub fn require_query(&self, name: &'static str) -> ServerResult<&str> {
        self.query(name).ok_or(ServerError::MissingParameter(name))
    }

    /// The body parsed as a urlencoded form.
    pub fn form(&self) -> HashMap<String, String> {
        parse_form(&String::from_utf8_lossy(&self.body))
    }

    /// A cookie value by name.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.header("cookie")?;
        for pair in header.split(';') {
            let (key, value) = pair.split_once('=')?;
            if key.trim() == name {
                return Some(value.trim().to_string());
            }
        }
        None
    }
}

/// Splits `a=1&b=2` into a decoded map. Later duplicates win.
fn parse_form(input: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for pair in input.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((key, value)) => map.insert(url_decode(key), url_decode(value)),
            None => map.insert(url_decode(pair), String::new()),
        };
    }
    map
}

async fn read_header_line<R>(stream: &mut R) -> ServerResult<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let read = stream
        .take(MAX_HEADER_LINE as u64)
        .read_line(&mut line)
        .await?;
    if read == 0 {
        return Err(ServerError::bad_request("connection closed mid-request"));
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn parse(raw: &str) -> ServerResult<Request> {
        let mut stream = BufReader::new(raw.as_bytes());
        Request::read(&mut stream, None).await
    }

    #[tokio::test]
    async fn parses_get_with_query_and_cookie() {
        let request = parse(
            "GET /article?id=abc&x=a%20b HTTP/1.1\r\n\
             Host: example.org\r\n\
             Cookie: session=deadbeef; theme=dark\r\n\
             \r\n",
        )
        .await
        .unwrap();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.raw_target(), "/article?id=abc&x=a%20b");
        assert_eq!(request.path(), "/article");
        assert_eq!(request.query("id"), Some("abc"));
        assert_eq!(request.query("x"), Some("a b"));
        assert_eq!(request.cookie("session").as_deref(), Some("deadbeef"));
        assert_eq!(
            request.absolute_uri(),
            "http://example.org/article?id=abc&x=a%20b"
        );
    }

    #[tokio::test]
    async fn parses_post_form() {
        let body = "username=alice1234&password=p%40ss";
        let raw = format!(
            "POST /login HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let request = parse(&raw).await.unwrap();

        assert_eq!(request.method(), Method::Post);
        let form = request.form();
        assert_eq!(form.get("username").map(String::as_str), Some("alice1234"));
        assert_eq!(form.get("password").map(String::as_str), Some("p@ss"));
    }

    #[tokio::test]
    async fn rejects_garbage() {
        assert!(parse("BREW /coffee HTTP/1.1\r\n\r\n").await.is_err());
        assert!(parse("GET example.org HTTP/1.1\r\n\r\n").await.is_err());
        assert!(parse("").await.is_err());
    }

    #[tokio::test]
    async fn missing_query_parameter_is_typed() {
        let request = parse("GET /userinfo HTTP/1.1\r\n\r\n").await.unwrap();
        assert!(matches!(
            request.require_query("username"),
            Err(ServerError::MissingParameter("username"))
        ));
    }
}

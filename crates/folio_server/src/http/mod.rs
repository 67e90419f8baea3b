//! Minimal HTTP/1.1 plumbing: request parsing, response writing and the
//! route table. Just enough protocol for the handlers the service
//! registers; anything fancier belongs behind a reverse proxy.

mod request;
mod response;
mod router;

pub use request::{Method, Request};
pub use response::Response;
pub use router::{Handler, Router};

/// Decodes `%XX` escapes and `+` spaces in a URL component. Invalid
/// escapes pass through untouched.
pub(crate) fn url_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'+' => {
                out.push(b' ');
                index += 1;
            }
            b'%' => {
                match (hex_value(bytes.get(index + 1)), hex_value(bytes.get(index + 2))) {
                    (Some(high), Some(low)) => {
                        out.push(high << 4 | low);
                        index += 3;
                    }
                    _ => {
                        out.push(b'%');
                        index += 1;
                    }
                }
            }
            byte => {
                out.push(byte);
                index += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: Option<&u8>) -> Option<u8> {
    match byte? {
        b @ b'0'..=b'9' => Some(b - b'0'),
        b @ b'a'..=b'f' => Some(b - b'a' + 10),
        b @ b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoding() {
        assert_eq!(url_decode("hello+world"), "hello world");
        assert_eq!(url_decode("a%40x.com"), "a@x.com");
        assert_eq!(url_decode("%e9"), "\u{fffd}".to_string());
        assert_eq!(url_decode("%C3%A9"), "é");
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
    }
}

//! Request handlers for every registered route.

mod articles;
mod auth;
mod logs;
mod notifications;
mod verify;

use crate::http::{Method, Request, Response, Router};
use crate::state::AppState;
use folio_core::entity::Account;
use std::path::PathBuf;

/// Registers every route and mounts the static directory at the site
/// root.
pub fn register_routes(router: &mut Router<AppState>, static_dir: PathBuf) {
    router.register(Method::Post, "/login", auth::login);
    router.register(Method::Post, "/signup", auth::signup);
    router.register(Method::Get, "/logout", auth::logout);
    router.register(Method::Get, "/userinfo", auth::userinfo);
    router.register(Method::Get, "/setperms", auth::set_permissions);

    router.register(Method::Get, "/index", articles::front_page);
    router.register(Method::Get, "/article", articles::read_article);
    router.register(Method::Post, "/upload", articles::upload);
    router.register(Method::Get, "/editor", articles::editor_operation);
    router.register(Method::Get, "/revise_editor", articles::revision_editor);
    router.register(Method::Post, "/revise", articles::revise);
    router.register(Method::Post, "/comment", articles::comment);

    router.register(Method::Get, "/notifications", notifications::list);
    router.register(Method::Get, "/resolve_notif", notifications::resolve);

    router.register(Method::Get, "/verify_landing", verify::landing);
    router.register(Method::Get, "/verify", verify::validate_code);

    router.register(Method::Get, "/logs", logs::fetch);

    router.mount_static("/", static_dir);
}

/// A user-visible error page. Never a protocol-level failure; the
/// request itself succeeded.
pub(crate) fn error_page(title: &str, details: &[&str]) -> Response {
    let mut body = format!("<html><body><h1>{}</h1>", escape(title));
    for detail in details {
        body.push_str(&format!("<p>{}</p>", escape(detail)));
    }
    body.push_str("</body></html>");
    Response::html(body)
}

/// Escapes text destined for an HTML body.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The logged-in account, or a login-required error page.
pub(crate) fn require_login(
    state: &AppState,
    request: &Request,
    title: &str,
) -> Result<Account, Response> {
    state
        .current_account(request)
        .ok_or_else(|| error_page(title, &["You must log in first."]))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping() {
        assert_eq!(escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}

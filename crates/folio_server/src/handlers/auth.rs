//! Login, signup, profile and permission handlers.

use super::{error_page, escape, require_login};
use crate::error::ServerResult;
use crate::http::{Request, Response};
use crate::state::AppState;
use folio_core::{EventSeverity, Permission};

/// `POST /login` with `username` (name or email) and `password`.
pub fn login(state: &AppState, request: &Request) -> ServerResult<Response> {
    let form = request.form();
    let (Some(username), Some(password)) = (form.get("username"), form.get("password")) else {
        return Ok(error_page(
            "Failed to Login",
            &["Both a username and a password are required."],
        ));
    };

    let Some(account) = state.service.accounts().get(username)? else {
        return Ok(error_page(
            "Failed to Login",
            &[&format!("Username or email {username} doesn't exist.")],
        ));
    };
    if account.password != *password {
        state.service.log_event(
            EventSeverity::Warning,
            "failed login attempt",
            Some(&account.name),
            request.remote,
        )?;
        return Ok(error_page("Failed to Login", &["Wrong password received."]));
    }

    start_session(state, &account.name, account.verified)
}

/// `POST /signup` with `username`, `password` and `email`.
pub fn signup(state: &AppState, request: &Request) -> ServerResult<Response> {
    let form = request.form();
    let (Some(username), Some(password), Some(email)) = (
        form.get("username"),
        form.get("password"),
        form.get("email"),
    ) else {
        return Ok(error_page(
            "Failed to Register New Account",
            &["A username, a password and an email are required."],
        ));
    };

    if !valid_username(username) {
        return Ok(error_page(
            "Failed to Register New Account",
            &["Usernames must be alphanumerical and between 8 and 25 characters."],
        ));
    }
    if !valid_email(email) {
        return Ok(error_page(
            "Failed to Register New Account",
            &[&format!("{email} does not look like an email address.")],
        ));
    }
    if state.service.accounts().contains(username) || state.service.accounts().contains(email) {
        return Ok(error_page(
            "Failed to Register New Account",
            &[&format!("Username {username} already taken.")],
        ));
    }

    let account =
        state
            .service
            .accounts()
            .register(username, password, email, state.service.clock().now())?;
    state.service.log_event(
        EventSeverity::Information,
        "account registered",
        Some(&account.name),
        request.remote,
    )?;

    start_session(state, &account.name, account.verified)
}

/// `GET /logout`.
pub fn logout(state: &AppState, request: &Request) -> ServerResult<Response> {
    if let Some(id) = request.cookie("session").and_then(|raw| raw.parse().ok()) {
        state.service.sessions().end(id);
    }
    Ok(Response::redirect("/index"))
}

/// `GET /userinfo?username=...`.
pub fn userinfo(state: &AppState, request: &Request) -> ServerResult<Response> {
    let username = request.require_query("username")?;
    let Some(account) = state.service.accounts().get(username)? else {
        return Ok(error_page(
            "Couldn't Fetch User Information",
            &[&format!("User {username} doesn't exist.")],
        ));
    };

    // Editors and admins additionally see the contact address.
    let viewer = state.current_account(request);
    let privileged = viewer
        .as_ref()
        .is_some_and(|viewer| viewer.permission >= Permission::Editor);

    let mut body = format!("<html><body><h1>{}</h1><dl>", escape(&account.name));
    if privileged {
        body.push_str(&format!("<dt>Email</dt><dd>{}</dd>", escape(&account.email)));
    }
    body.push_str(&format!(
        "<dt>Created</dt><dd>{}</dd>",
        account.created.unix_seconds()
    ));
    body.push_str(&format!("<dt>Permissions</dt><dd>{}</dd>", account.permission));
    body.push_str(&format!(
        "<dt>Online</dt><dd>{}</dd>",
        if state.service.sessions().is_logged_in(&account.name) {
            "Yes"
        } else {
            "No"
        }
    ));
    body.push_str(&format!(
        "<dt>Verified</dt><dd>{}</dd>",
        if account.verified { "Yes" } else { "No" }
    ));
    body.push_str("</dl></body></html>");
    Ok(Response::html(body))
}

/// `GET /setperms?username=...&perms=...`. Admin only, and never on
/// yourself.
pub fn set_permissions(state: &AppState, request: &Request) -> ServerResult<Response> {
    let username = request.require_query("username")?;
    let token = request.require_query("perms")?;

    if !state.service.accounts().contains(username) {
        return Ok(error_page(
            "Couldn't Set User Permissions",
            &[&format!("User {username} doesn't exist.")],
        ));
    }

    let viewer = match require_login(state, request, "Couldn't Set User Permissions") {
        Ok(viewer) => viewer,
        Err(page) => return Ok(page),
    };
    if viewer.permission != Permission::Admin {
        state.service.log_event(
            EventSeverity::Alert,
            "unauthorized attempt to change permissions",
            Some(&viewer.name),
            request.remote,
        )?;
        return Ok(error_page(
            "Couldn't Set User Permissions",
            &["You must be logged in as an administrator to change user permissions."],
        ));
    }
    if viewer.name == username {
        state.service.log_event(
            EventSeverity::Alert,
            "attempt to change own permissions",
            Some(&viewer.name),
            request.remote,
        )?;
        return Ok(error_page(
            "Couldn't Set User Permissions",
            &["Potential conflict of interest; you cannot change your own permissions."],
        ));
    }

    let Some(permission) = Permission::parse_token(token) else {
        return Ok(error_page(
            "Couldn't Set User Permissions",
            &[&format!("Unrecognized permission level {token}.")],
        ));
    };

    let account = state.service.accounts().set_permission(username, permission)?;
    Ok(Response::redirect(format!("/userinfo?username={}", account.name)))
}

/// Logs the account in, setting the session cookie and routing
/// unverified accounts to the verification landing page.
fn start_session(state: &AppState, name: &str, verified: bool) -> ServerResult<Response> {
    let id = match state.service.sessions().create(name) {
        Ok(id) => id,
        Err(folio_core::CoreError::AlreadyLoggedIn { account }) => {
            return Ok(error_page(
                "Failed to Login",
                &[&format!("You've already logged in, {account}.")],
            ));
        }
        Err(error) => return Err(error.into()),
    };
    let target = if verified { "/index" } else { "/verify_landing" };
    Ok(Response::redirect(target).with_cookie("session", &id.to_string()))
}

fn valid_username(username: &str) -> bool {
    (8..=25).contains(&username.chars().count())
        && username.chars().all(|ch| ch.is_ascii_alphanumeric())
}

fn valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

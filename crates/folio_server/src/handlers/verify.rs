//! Email verification handlers.

use super::{error_page, escape, require_login};
use crate::error::ServerResult;
use crate::http::{Request, Response};
use crate::state::AppState;

/// `GET /verify_landing?resend=yes`. Issues a five-digit code, mails
/// it, and shows the entry form. Revisiting reuses the outstanding
/// code unless a resend is asked for.
pub fn landing(state: &AppState, request: &Request) -> ServerResult<Response> {
    let viewer = match require_login(state, request, "Couldn't Verify Account") {
        Ok(viewer) => viewer,
        Err(page) => return Ok(page),
    };
    if viewer.verified {
        return Ok(Response::redirect("/index"));
    }

    let resend = request.query("resend").is_some();
    if resend || !state.service.sessions().has_code(&viewer.name) {
        let code = state.service.sessions().issue_code(&viewer.name);
        let delivered = state.notifier.notify(
            &viewer.email,
            "Your verification code",
            &format!("Your verification code is {code:05}."),
        );
        if !delivered {
            return Ok(error_page(
                "Couldn't Verify Account",
                &[&format!("Failed to send a verification code to {}.", viewer.email)],
            ));
        }
    }

    Ok(Response::html(format!(
        "<html><body><h1>Verify your account</h1>\
         <p>A five-digit code was sent to {}.</p>\
         <form method=\"get\" action=\"/verify\">\
         <input type=\"text\" name=\"verifcode\">\
         <input type=\"submit\" value=\"Verify\"></form>\
         <p><a href=\"/verify_landing?resend=yes\">Send a new code</a></p>\
         </body></html>",
        escape(&viewer.email)
    )))
}

/// `GET /verify?verifcode=...`. Checks the code and marks the account
/// verified.
pub fn validate_code(state: &AppState, request: &Request) -> ServerResult<Response> {
    let viewer = match require_login(state, request, "Couldn't Verify Account") {
        Ok(viewer) => viewer,
        Err(page) => return Ok(page),
    };
    if viewer.verified {
        return Ok(Response::redirect("/index"));
    }

    let raw = request.require_query("verifcode")?;
    let code = match raw.parse::<u32>() {
        Ok(code) if code < 100_000 => code,
        _ => {
            return Ok(error_page(
                "Couldn't Verify Account",
                &[&format!("{raw} is not a five-digit code.")],
            ))
        }
    };

    if !state.service.sessions().verify_code(&viewer.name, code) {
        return Ok(Response::redirect("/verify_landing"));
    }

    state.service.accounts().mark_verified(&viewer.name)?;
    Ok(Response::redirect("/index"))
}

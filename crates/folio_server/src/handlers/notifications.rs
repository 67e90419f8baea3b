//! Notification inbox handlers.

use super::{error_page, escape, require_login};
use crate::error::ServerResult;
use crate::http::{Request, Response};
use crate::state::AppState;
use folio_core::{CoreError, NotificationSeverity};
use uuid::Uuid;

/// `GET /notifications`. Renders the inbox, newest first. Viewing
/// marks actionable-less notifications as read, which dismisses the
/// ones flagged to delete on resolve.
pub fn list(state: &AppState, request: &Request) -> ServerResult<Response> {
    let viewer = match require_login(state, request, "Couldn't Fetch Notifications") {
        Ok(viewer) => viewer,
        Err(page) => return Ok(page),
    };

    let inbox = state.service.notifications().list(&viewer.name, false)?;

    let mut body = String::from("<html><body><h1>Notifications</h1><ul>");
    if inbox.is_empty() {
        body.push_str("<li>Nothing new.</li>");
    }
    for notification in &inbox {
        body.push_str(&format!(
            "<li{}><b>{}</b>{}<br>{}",
            match notification.severity {
                NotificationSeverity::CanIgnore => "",
                NotificationSeverity::ShouldResolve => " class=\"should-resolve\"",
                NotificationSeverity::MustResolve => " class=\"must-resolve\"",
            },
            escape(&notification.subject),
            if notification.read { " (read)" } else { "" },
            escape(&notification.body)
        ));
        if let Some((label, _)) = &notification.resolve_action {
            body.push_str(&format!(
                "<br><a href=\"/resolve_notif?notifid={}\">{}</a>",
                notification.id,
                escape(label)
            ));
        }
        body.push_str("</li>");
    }
    body.push_str("</ul></body></html>");

    // Rendering counts as reading for notifications with no action
    // attached; the actionable ones stay until resolved.
    for notification in &inbox {
        if notification.resolve_action.is_none() && !notification.read {
            state
                .service
                .notifications()
                .mark_read(&viewer.name, notification.id)?;
        }
    }

    Ok(Response::html(body))
}

/// `GET /resolve_notif?notifid=...`. Resolves the notification and
/// follows its action target.
pub fn resolve(state: &AppState, request: &Request) -> ServerResult<Response> {
    let viewer = match require_login(state, request, "Couldn't Resolve Notification") {
        Ok(viewer) => viewer,
        Err(page) => return Ok(page),
    };
    let Ok(id) = request.require_query("notifid")?.parse::<Uuid>() else {
        return Ok(error_page(
            "Couldn't Resolve Notification",
            &["Malformed notification id."],
        ));
    };

    match state.service.notifications().resolve(&viewer.name, id) {
        Ok(target) => Ok(Response::redirect(target)),
        Err(CoreError::NotFound { .. }) => Ok(error_page(
            "Couldn't Resolve Notification",
            &[&format!("No notification {id} exists.")],
        )),
        Err(CoreError::InvalidOperation { message }) => {
            Ok(error_page("Couldn't Resolve Notification", &[&message]))
        }
        Err(error) => Err(error.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::{body_text, fixture, get};
    use super::*;
    use folio_core::Clock;

    #[test]
    fn viewing_dismisses_ignorable_notifications() {
        let fx = fixture();
        let session = fx.login("alice1234", "a@x.com");
        fx.state
            .service
            .notifications()
            .push(
                "alice1234",
                "Welcome".to_string(),
                "Glad to have you.".to_string(),
                NotificationSeverity::CanIgnore,
                None,
                true,
                fx.clock.now(),
            )
            .unwrap();

        let response = list(&fx.state, &get("/notifications", Some(session))).unwrap();
        assert!(body_text(&response).contains("Welcome"));

        // Gone after being seen once.
        let response = list(&fx.state, &get("/notifications", Some(session))).unwrap();
        assert!(body_text(&response).contains("Nothing new"));
    }

    #[test]
    fn actionable_notifications_survive_until_resolved() {
        let fx = fixture();
        let session = fx.login("alice1234", "a@x.com");
        let notification = fx
            .state
            .service
            .notifications()
            .push(
                "alice1234",
                "Rejected".to_string(),
                "Revise your article.".to_string(),
                NotificationSeverity::MustResolve,
                Some(("Revise".to_string(), "/revise_editor?id=abc".to_string())),
                true,
                fx.clock.now(),
            )
            .unwrap();

        // Viewing does not clear it.
        list(&fx.state, &get("/notifications", Some(session))).unwrap();
        let response = list(&fx.state, &get("/notifications", Some(session))).unwrap();
        assert!(body_text(&response).contains("Rejected"));

        // Resolving follows the action target and deletes it.
        let response = resolve(
            &fx.state,
            &get(&format!("/resolve_notif?notifid={}", notification.id), Some(session)),
        )
        .unwrap();
        assert_eq!(response.status(), 302);
        assert_eq!(response.header("location"), Some("/revise_editor?id=abc"));
        let response = list(&fx.state, &get("/notifications", Some(session))).unwrap();
        assert!(body_text(&response).contains("Nothing new"));
    }

    #[test]
    fn resolving_unknown_notification_is_reported() {
        let fx = fixture();
        let session = fx.login("alice1234", "a@x.com");
        let response = resolve(
            &fx.state,
            &get(
                &format!("/resolve_notif?notifid={}", Uuid::new_v4()),
                Some(session),
            ),
        )
        .unwrap();
        assert!(body_text(&response).contains("No notification"));
    }
}

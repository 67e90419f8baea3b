//! Article listing, reading, submission and review handlers.

use super::{error_page, escape, require_login};
use crate::error::ServerResult;
use crate::http::{Request, Response};
use crate::state::AppState;
use folio_core::entity::{Account, Comment, Permission, PublishStatus};
use folio_core::{CoreError, EventSeverity, NotificationSeverity};
use uuid::Uuid;

/// `GET /index?day=...&unpub=yes`. Lists the articles of one day,
/// newest day by default. Only editors may list unpublished work.
pub fn front_page(state: &AppState, request: &Request) -> ServerResult<Response> {
    let today = state.service.clock().now().day_number();
    let day = match request.query("day") {
        Some(raw) => match raw.parse::<i64>() {
            Ok(day) => day,
            Err(_) => return Ok(error_page("Bad Day", &[&format!("{raw} is not a day number.")])),
        },
        None => today,
    };

    let viewer = state.current_account(request);
    let unpublished = request.query("unpub").is_some() && is_editor(viewer.as_ref());

    let articles = state.service.articles().on_day(day, unpublished)?;

    let mut body = format!(
        "<html><body><h1>Articles for day {day}</h1><p><a href=\"/index?day={}\">&lt; previous</a> \
         <a href=\"/index?day={}\">next &gt;</a></p><ul>",
        day - 1,
        day + 1
    );
    for article in &articles {
        body.push_str(&format!(
            "<li><a href=\"/article?id={}\">{}</a> by <a href=\"/userinfo?username={}\">{}</a>",
            article.id,
            escape(&article.title),
            escape(&article.author),
            escape(&article.author)
        ));
        if article.status != PublishStatus::Published {
            body.push_str(&format!(" <em>[{}]</em>", article.status.name()));
        }
        body.push_str(&format!("<br>{}</li>", escape(article.snippet())));
    }
    if articles.is_empty() {
        body.push_str("<li>Nothing on this day.</li>");
    }
    body.push_str("</ul></body></html>");
    Ok(Response::html(body))
}

/// `GET /article?id=...`.
pub fn read_article(state: &AppState, request: &Request) -> ServerResult<Response> {
    let Some(id) = parse_id(request.require_query("id")?) else {
        return Ok(error_page("Couldn't Read Article", &["Malformed article id."]));
    };
    let Some(article) = state.service.articles().get(id)? else {
        return Ok(error_page(
            "Couldn't Read Article",
            &[&format!("No article {id} exists.")],
        ));
    };

    let viewer = state.current_account(request);
    let reviewer = is_editor(viewer.as_ref())
        || viewer
            .as_ref()
            .is_some_and(|viewer| viewer.name == article.author);

    let mut body = format!(
        "<html><body><h1>{}</h1><p>by <a href=\"/userinfo?username={}\">{}</a></p>",
        escape(&article.title),
        escape(&article.author),
        escape(&article.author)
    );
    if article.status != PublishStatus::Published {
        body.push_str(&format!("<p><em>Status: {}</em></p>", article.status.name()));
    }
    if let Some(next) = article.next_revision {
        body.push_str(&format!(
            "<p>A <a href=\"/article?id={next}\">newer revision</a> of this article exists.</p>"
        ));
    }
    body.push_str(&format!("<div>{}</div>", escape(&article.body)));

    // A revised article hands its discussion to the chain tail.
    let discussion = if article.next_revision.is_some() {
        state.service.articles().latest_revision(id)?.id
    } else {
        id
    };

    // Revision-request comments are review chatter; only the author and
    // editors see them.
    let comments = state.service.comments().load(discussion, !reviewer)?;
    body.push_str("<h2>Comments</h2><ul>");
    for comment in &comments {
        body.push_str(&format!(
            "<li><b>{}</b>{}: {}</li>",
            escape(&comment.sender),
            if comment.revision_requested {
                " (revision requested)"
            } else {
                ""
            },
            escape(&comment.content)
        ));
    }
    body.push_str("</ul>");
    if viewer.is_some() {
        body.push_str(&format!(
            "<form method=\"post\" action=\"/comment\">\
             <input type=\"hidden\" name=\"id\" value=\"{id}\">\
             <textarea name=\"content\"></textarea>\
             <input type=\"submit\" value=\"Comment\"></form>"
        ));
    }
    body.push_str("</body></html>");
    Ok(Response::html(body))
}

/// `POST /upload` with `title` and `body`. Submits an article for
/// review.
pub fn upload(state: &AppState, request: &Request) -> ServerResult<Response> {
    let author = match require_login(state, request, "Failed to Upload Article") {
        Ok(author) => author,
        Err(page) => return Ok(page),
    };

    let form = request.form();
    let (Some(title), Some(body)) = (form.get("title"), form.get("body")) else {
        return Ok(error_page(
            "Failed to Upload Article",
            &["Both a title and a body are required."],
        ));
    };
    if title.trim().is_empty() || body.trim().is_empty() {
        return Ok(error_page(
            "Failed to Upload Article",
            &["Articles cannot have an empty title or body."],
        ));
    }

    let article = state.service.articles().submit(
        title.clone(),
        body.clone(),
        author.name.clone(),
        state.service.clock().now(),
    )?;
    state.service.log_event(
        EventSeverity::Information,
        "article submitted for review",
        Some(&author.name),
        request.remote,
    )?;
    Ok(Response::redirect(format!("/article?id={}", article.id)))
}

/// `GET /editor?id=...&op=...`. Publishes or rejects an under-review
/// article. `op` accepts `p`/`pub`/`publish` and `rej`/`reject`.
pub fn editor_operation(state: &AppState, request: &Request) -> ServerResult<Response> {
    let Some(id) = parse_id(request.require_query("id")?) else {
        return Ok(error_page("Editor Operation Failed", &["Malformed article id."]));
    };
    let op = request.require_query("op")?;

    let editor = match require_login(state, request, "Editor Operation Failed") {
        Ok(editor) => editor,
        Err(page) => return Ok(page),
    };
    if editor.permission < Permission::Editor {
        state.service.log_event(
            EventSeverity::Alert,
            "unauthorized editor operation",
            Some(&editor.name),
            request.remote,
        )?;
        return Ok(error_page(
            "Editor Operation Failed",
            &["Only editors may publish or reject articles."],
        ));
    }

    let mut article = match state.service.articles().get(id)? {
        Some(article) => article,
        None => {
            return Ok(error_page(
                "Editor Operation Failed",
                &[&format!("No article {id} exists.")],
            ))
        }
    };

    let outcome = match op {
        "p" | "pub" | "publish" => article.publish(state.service.clock().now()).map(|()| {
            (
                "article published",
                format!("Your article \"{}\" has been published.", article.title),
                NotificationSeverity::CanIgnore,
                None,
            )
        }),
        "rej" | "reject" => article.reject().map(|()| {
            (
                "article rejected",
                format!(
                    "Your article \"{}\" was rejected. Please revise and resubmit it.",
                    article.title
                ),
                NotificationSeverity::MustResolve,
                Some(("Revise".to_string(), format!("/revise_editor?id={id}"))),
            )
        }),
        other => {
            return Ok(error_page(
                "Editor Operation Failed",
                &[&format!("Unknown operation {other}.")],
            ))
        }
    };

    let (event, message, severity, action) = match outcome {
        Ok(parts) => parts,
        Err(CoreError::InvalidOperation { message }) => {
            return Ok(error_page("Editor Operation Failed", &[&message]))
        }
        Err(error) => return Err(error.into()),
    };

    state.service.articles().save(&article)?;
    state.service.notifications().push(
        &article.author,
        "Editorial decision".to_string(),
        message,
        severity,
        action,
        true,
        state.service.clock().now(),
    )?;
    state
        .service
        .log_event(EventSeverity::Information, event, Some(&editor.name), request.remote)?;
    Ok(Response::redirect(format!("/article?id={id}")))
}

/// `GET /revise_editor?id=...`. The revision form for an under-review
/// article.
pub fn revision_editor(state: &AppState, request: &Request) -> ServerResult<Response> {
    let Some(id) = parse_id(request.require_query("id")?) else {
        return Ok(error_page("Couldn't Revise Article", &["Malformed article id."]));
    };
    let viewer = match require_login(state, request, "Couldn't Revise Article") {
        Ok(viewer) => viewer,
        Err(page) => return Ok(page),
    };
    let article = match state.service.articles().get(id)? {
        Some(article) => article,
        None => {
            return Ok(error_page(
                "Couldn't Revise Article",
                &[&format!("No article {id} exists.")],
            ))
        }
    };
    if let Err(page) = check_revision_rights(&viewer, &article.author) {
        return Ok(page);
    }
    if article.status != PublishStatus::UnderReview {
        return Ok(error_page(
            "Couldn't Revise Article",
            &[&format!(
                "Only articles under review can be revised; this one is {}.",
                article.status.name()
            )],
        ));
    }

    Ok(Response::html(format!(
        "<html><body><h1>Revise \"{}\"</h1>\
         <form method=\"post\" action=\"/revise\">\
         <input type=\"hidden\" name=\"id\" value=\"{id}\">\
         <input type=\"text\" name=\"title\" value=\"{}\"><br>\
         <textarea name=\"body\">{}</textarea><br>\
         <input type=\"submit\" value=\"Submit revision\"></form></body></html>",
        escape(&article.title),
        escape(&article.title),
        escape(&article.body)
    )))
}

/// `POST /revise` with `id`, `title` and `body`. Freezes the old
/// article and takes over review with the revised text.
pub fn revise(state: &AppState, request: &Request) -> ServerResult<Response> {
    let viewer = match require_login(state, request, "Couldn't Revise Article") {
        Ok(viewer) => viewer,
        Err(page) => return Ok(page),
    };

    let form = request.form();
    let (Some(raw_id), Some(title), Some(body)) =
        (form.get("id"), form.get("title"), form.get("body"))
    else {
        return Ok(error_page(
            "Couldn't Revise Article",
            &["An article id, a title and a body are required."],
        ));
    };
    let Some(id) = parse_id(raw_id) else {
        return Ok(error_page("Couldn't Revise Article", &["Malformed article id."]));
    };

    let article = match state.service.articles().get(id)? {
        Some(article) => article,
        None => {
            return Ok(error_page(
                "Couldn't Revise Article",
                &[&format!("No article {id} exists.")],
            ))
        }
    };
    if let Err(page) = check_revision_rights(&viewer, &article.author) {
        return Ok(page);
    }

    let revised = match state.service.articles().revise(
        id,
        title.clone(),
        body.clone(),
        state.service.clock().now(),
    ) {
        Ok(revised) => revised,
        Err(CoreError::InvalidOperation { message }) => {
            return Ok(error_page("Couldn't Revise Article", &[&message]))
        }
        Err(error) => return Err(error.into()),
    };
    state.service.log_event(
        EventSeverity::Information,
        "article revised",
        Some(&viewer.name),
        request.remote,
    )?;
    Ok(Response::redirect(format!("/article?id={}", revised.id)))
}

/// `POST /comment` with `id`, `content` and optionally `revise=yes`.
/// Commenting takes a verified account; the comment lands on the
/// discussion of the revision-chain tail.
pub fn comment(state: &AppState, request: &Request) -> ServerResult<Response> {
    let sender = match require_login(state, request, "Couldn't Post Comment") {
        Ok(sender) => sender,
        Err(page) => return Ok(page),
    };
    if !sender.verified {
        return Ok(error_page(
            "Couldn't Post Comment",
            &["You must verify your account before commenting."],
        ));
    }

    let form = request.form();
    let (Some(raw_id), Some(content)) = (form.get("id"), form.get("content")) else {
        return Ok(error_page(
            "Couldn't Post Comment",
            &["An article id and comment text are required."],
        ));
    };
    let Some(id) = parse_id(raw_id) else {
        return Ok(error_page("Couldn't Post Comment", &["Malformed article id."]));
    };
    if !state.service.articles().exists(id) {
        return Ok(error_page(
            "Couldn't Post Comment",
            &[&format!("No article {id} exists.")],
        ));
    }
    if content.trim().is_empty() {
        return Ok(error_page("Couldn't Post Comment", &["Comments cannot be empty."]));
    }

    let revision_requested = form.get("revise").map(String::as_str) == Some("yes");
    if revision_requested && sender.permission < Permission::Editor {
        state.service.log_event(
            EventSeverity::Alert,
            "unauthorized revision request",
            Some(&sender.name),
            request.remote,
        )?;
        return Ok(error_page(
            "Couldn't Post Comment",
            &["Only editors may request revisions."],
        ));
    }

    let tail = state.service.articles().latest_revision(id)?;
    state.service.comments().add(
        tail.id,
        &Comment::new(
            sender.name.clone(),
            content.clone(),
            revision_requested,
            state.service.clock().now(),
        ),
    )?;

    if tail.author != sender.name {
        let (severity, subject) = if revision_requested {
            (NotificationSeverity::ShouldResolve, "Revision requested")
        } else {
            (NotificationSeverity::CanIgnore, "New comment")
        };
        state.service.notifications().push(
            &tail.author,
            subject.to_string(),
            format!("{} commented on \"{}\".", sender.name, tail.title),
            severity,
            None,
            true,
            state.service.clock().now(),
        )?;
    }

    Ok(Response::redirect(format!("/article?id={}", tail.id)))
}

fn is_editor(account: Option<&Account>) -> bool {
    account.is_some_and(|account| account.permission >= Permission::Editor)
}

/// Authors may revise their own work; editors may revise anyone's.
fn check_revision_rights(viewer: &Account, author: &str) -> Result<(), Response> {
    if viewer.name == author || viewer.permission >= Permission::Editor {
        Ok(())
    } else {
        Err(error_page(
            "Couldn't Revise Article",
            &["Only the author or an editor may revise an article."],
        ))
    }
}

fn parse_id(raw: &str) -> Option<Uuid> {
    raw.parse().ok()
}

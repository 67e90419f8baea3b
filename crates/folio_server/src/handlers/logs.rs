//! Audit log browsing.

use super::{error_page, escape, require_login};
use crate::error::ServerResult;
use crate::http::{Request, Response};
use crate::state::AppState;
use folio_codec::{Ticks, TICKS_PER_DAY};
use folio_core::{EventQuery, EventSeverity, Permission};
use std::net::IpAddr;

const DEFAULT_SPAN_DAYS: i64 = 7;

/// `GET /logs?to=...&span=...&page=...&pagesize=...&user=...&addr=...&minsev=...`.
///
/// Administrators browse the whole log. Everyone else may only ask
/// about their own account; anything wider is itself logged.
pub fn fetch(state: &AppState, request: &Request) -> ServerResult<Response> {
    let viewer = match require_login(state, request, "Couldn't Fetch Event Logs") {
        Ok(viewer) => viewer,
        Err(page) => return Ok(page),
    };

    let username = request.query("user").map(str::to_string);
    if viewer.permission != Permission::Admin && username.as_deref() != Some(&viewer.name) {
        state.service.log_event(
            EventSeverity::Alert,
            "unauthorized attempt to read event logs",
            Some(&viewer.name),
            request.remote,
        )?;
        return Ok(error_page(
            "Couldn't Fetch Event Logs",
            &["Only administrators may browse logs beyond their own account."],
        ));
    }

    let today = state.service.clock().now().day_number();
    let to_day = match parse_number(request, "to", today) {
        Ok(value) => value,
        Err(page) => return Ok(page),
    };
    let span = match parse_number(request, "span", DEFAULT_SPAN_DAYS) {
        Ok(value) => value.max(1),
        Err(page) => return Ok(page),
    };
    let page = match parse_number(request, "page", 0) {
        Ok(value) => value.max(0) as usize,
        Err(page) => return Ok(page),
    };
    let pagesize = match parse_number(request, "pagesize", 10) {
        Ok(value) => value.clamp(1, 100) as usize,
        Err(page) => return Ok(page),
    };

    let address = match request.query("addr") {
        Some(raw) => match raw.parse::<IpAddr>() {
            Ok(address) => Some(address),
            Err(_) => {
                return Ok(error_page(
                    "Couldn't Fetch Event Logs",
                    &[&format!("{raw} is not an IP address.")],
                ))
            }
        },
        None => None,
    };
    let min_severity = match request.query("minsev") {
        Some(raw) => match raw.parse::<u8>().ok().and_then(|b| EventSeverity::from_byte(b).ok()) {
            Some(severity) => severity,
            None => {
                return Ok(error_page(
                    "Couldn't Fetch Event Logs",
                    &[&format!("{raw} is not a severity between 1 and 4.")],
                ))
            }
        },
        None => EventSeverity::Information,
    };

    let from = Ticks::from_raw((to_day - span + 1) * TICKS_PER_DAY);
    let to = Ticks::from_raw((to_day + 1) * TICKS_PER_DAY - 1);
    let query = EventQuery {
        offset: page * pagesize,
        limit: pagesize,
        username,
        address,
        min_severity,
    };
    let events = state.service.events().query(from, to, &query)?;

    let mut body = format!(
        "<html><body><h1>Event log</h1><p>Page {page}, days {} through {to_day}.</p>\
         <table><tr><th>Time</th><th>Severity</th><th>User</th><th>Address</th><th>Event</th></tr>",
        to_day - span + 1
    );
    for event in &events {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            event.time.unix_seconds(),
            event.severity.name(),
            escape(event.username.as_deref().unwrap_or("-")),
            event
                .address
                .map(|address| address.to_string())
                .unwrap_or_else(|| "-".to_string()),
            escape(&event.description)
        ));
    }
    body.push_str("</table></body></html>");
    Ok(Response::html(body))
}

fn parse_number(request: &Request, name: &str, default: i64) -> Result<i64, Response> {
    match request.query(name) {
        Some(raw) => raw.parse().map_err(|_| {
            error_page(
                "Couldn't Fetch Event Logs",
                &[&format!("{raw} is not a valid {name} value.")],
            )
        }),
        None => Ok(default),
    }
}

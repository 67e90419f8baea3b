//! Notify command implementation.

use folio_core::NotificationSeverity;
use std::path::Path;

/// Runs the notify command.
pub fn run(
    data_dir: &Path,
    account: &str,
    subject: String,
    body: String,
    severity: &str,
    action: Option<(String, String)>,
    delete_on_resolve: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let severity = match severity {
        "ignore" => NotificationSeverity::CanIgnore,
        "should" => NotificationSeverity::ShouldResolve,
        "must" => NotificationSeverity::MustResolve,
        other => return Err(format!("unrecognized severity {other:?}").into()),
    };

    let service = super::open_service(data_dir)?;
    let name = service.accounts().require(account)?.name;
    let now = service.clock().now();
    let notification = service
        .notifications()
        .push(&name, subject, body, severity, action, delete_on_resolve, now)?;
    println!("sent {} to {name}", notification.id);
    Ok(())
}

//! Info command implementation.

use std::path::Path;

/// Runs the info command.
pub fn run(data_dir: &Path, account: &str) -> Result<(), Box<dyn std::error::Error>> {
    let service = super::open_service(data_dir)?;
    let account = service.accounts().require(account)?;

    println!("Name:        {}", account.name);
    println!("Email:       {}", account.email);
    println!("Permissions: {}", account.permission);
    println!("Created:     {} (unix)", account.created.unix_seconds());
    println!("Verified:    {}", if account.verified { "yes" } else { "no" });

    let unread = service
        .notifications()
        .list(&account.name, true)?
        .len();
    println!("Unread notifications: {unread}");
    Ok(())
}

//! Perm command implementation.

use folio_core::Permission;
use std::path::Path;

/// Runs the perm command.
pub fn run(data_dir: &Path, account: &str, level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let Some(permission) = Permission::parse_token(level) else {
        return Err(format!("unrecognized permission level {level:?}").into());
    };

    let service = super::open_service(data_dir)?;
    let account = service.accounts().set_permission(account, permission)?;
    println!("{} is now {}", account.name, account.permission);
    Ok(())
}

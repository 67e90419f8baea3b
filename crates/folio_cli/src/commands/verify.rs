//! Verify command implementation.

use std::path::Path;

/// Runs the verify command.
pub fn run(data_dir: &Path, account: &str) -> Result<(), Box<dyn std::error::Error>> {
    let service = super::open_service(data_dir)?;
    let account = service.accounts().mark_verified(account)?;
    println!("{} is now verified", account.name);
    Ok(())
}

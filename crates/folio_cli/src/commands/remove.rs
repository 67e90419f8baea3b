//! Remove command implementation.

use std::path::Path;

/// Runs the remove command.
pub fn run(data_dir: &Path, account: &str) -> Result<(), Box<dyn std::error::Error>> {
    let service = super::open_service(data_dir)?;
    let name = service.accounts().require(account)?.name;
    service.accounts().remove(&name)?;
    println!("removed {name}");
    Ok(())
}

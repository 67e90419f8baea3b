//! Users command implementation.

use std::path::Path;

/// Runs the users command.
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let service = super::open_service(data_dir)?;
    let accounts = service.accounts();

    let mut names = accounts.names();
    names.sort();
    names.dedup();

    println!("{} account(s)", names.len());
    for name in names {
        let account = accounts.require(&name)?;
        println!(
            "  {name} [{}]{}",
            account.permission,
            if account.verified { "" } else { " (unverified)" }
        );
    }
    Ok(())
}

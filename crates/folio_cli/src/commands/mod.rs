//! CLI command implementations.

pub mod info;
pub mod notify;
pub mod perm;
pub mod remove;
pub mod users;
pub mod verify;

use folio_core::{Service, SystemClock};
use std::path::Path;
use std::sync::Arc;

/// Opens the service offline, taking the directory lock.
pub fn open_service(data_dir: &Path) -> Result<Service, Box<dyn std::error::Error>> {
    Ok(Service::open(data_dir, Arc::new(SystemClock))?)
}

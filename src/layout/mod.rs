//! On-disk layout of the certificate authority.
//!
//! This module owns the directory/file contract: where each artifact lives,
//! how the structure is created, and how its contents are listed.

pub mod init;
pub mod listing;
pub mod paths;

use crate::error::Result;
use std::path::Path;

/// Set the permission bits of `path`. No-op off Unix.
pub(crate) fn set_mode(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = (path, mode);

    Ok(())
}

//! Directory initializer.
//!
//! Creates the root layout, seeds OpenSSL's bookkeeping files and renders the
//! OpenSSL configuration. There is no rollback: a failure part way leaves
//! whatever was already created.

use crate::error::{EasyCertError, Result};
use crate::layout::paths::Layout;
use crate::layout::set_mode;
use crate::template::render;
use std::fs;
use std::io::ErrorKind;
use tracing::{info, warn};

/// Configuration template, rendered into `openssl.cfg`.
pub const CONFIG_TEMPLATE: &str = include_str!("../../data/openssl.cfg.tmpl");

/// Alternate names added after the hostname in `[ alt_names ]`.
pub const LOOPBACK_ALT_NAMES: &str = "IP.1 = 127.0.0.1";

/// Mode of every directory in the layout.
pub const DIR_MODE: u32 = 0o755;
/// Mode of the private key directory.
pub const PRIVATE_DIR_MODE: u32 = 0o710;
/// Mode of the rendered configuration.
pub const CONFIG_MODE: u32 = 0o600;

/// Initial content of `serial` and `crlnumber`.
const FIRST_SERIAL: &[u8] = b"01\n";

/// The local hostname, used as default common name and first DNS alt name.
pub fn local_hostname() -> Result<String> {
    hostname::get()
        .map_err(|e| EasyCertError::Hostname(e.to_string()))?
        .into_string()
        .map_err(|raw| EasyCertError::Hostname(format!("not valid UTF-8: {:?}", raw)))
}

/// Render the OpenSSL configuration for `layout`.
pub fn render_config(layout: &Layout, host_name: &str) -> Result<String> {
    let root = layout.root.to_string_lossy();

    render(
        CONFIG_TEMPLATE,
        &[
            ("RootDir", root.as_ref()),
            ("HostName", host_name),
            ("AltNames", LOOPBACK_ALT_NAMES),
        ],
    )
}

/// Create the directory structure that handles the certificates.
///
/// Fails with [`EasyCertError::AlreadyExists`] if the root is already there,
/// without touching it.
///
/// # Arguments
///
/// * `layout` - The layout to create
/// * `host_name` - Name written into the configuration as default common name
///
/// # Example
///
/// ```rust,no_run
/// use easycert::layout::init::{local_hostname, setup_dir};
/// use easycert::layout::paths::Layout;
///
/// # fn example() -> easycert::error::Result<()> {
/// let layout = Layout::in_home()?;
/// setup_dir(&layout, &local_hostname()?)?;
/// # Ok(())
/// # }
/// ```
pub fn setup_dir(layout: &Layout, host_name: &str) -> Result<()> {
    if layout.root.exists() {
        return Err(EasyCertError::already_exists(
            "The directory structure exists:",
            &layout.root,
        ));
    }

    for dir in layout.directories() {
        // create_dir, not create_dir_all: a root that appeared since the check
        // above must still fail.
        fs::create_dir(dir).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => {
                EasyCertError::already_exists("The directory structure exists:", dir)
            }
            _ => EasyCertError::Io(e),
        })?;
        set_mode(dir, DIR_MODE)?;
    }
    set_mode(&layout.private, PRIVATE_DIR_MODE)?;

    fs::write(&layout.index, b"")?;
    fs::write(&layout.serial, FIRST_SERIAL)?;
    fs::write(&layout.crl_number, FIRST_SERIAL)?;

    let config = render_config(layout, host_name)?;
    fs::write(&layout.config, config)?;
    if let Err(e) = set_mode(&layout.config, CONFIG_MODE) {
        warn!(path = ?layout.config, error = %e, "could not restrict configuration permissions");
    }

    info!(root = ?layout.root, "directory structure created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_layout() -> (TempDir, Layout) {
        let temp_dir = TempDir::new().unwrap();
        let layout = Layout::new(temp_dir.path().join("cert"));
        (temp_dir, layout)
    }

    #[test]
    fn test_setup_dir_creates_layout() {
        let (_temp_dir, layout) = temp_layout();

        setup_dir(&layout, "box.example").unwrap();

        for dir in layout.directories() {
            assert!(dir.is_dir(), "{:?} missing", dir);
        }
        assert_eq!(fs::read(&layout.index).unwrap(), b"");
        assert_eq!(fs::read(&layout.serial).unwrap(), b"01\n");
        assert_eq!(fs::read(&layout.crl_number).unwrap(), b"01\n");
        assert!(layout.config.is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_setup_dir_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp_dir, layout) = temp_layout();
        setup_dir(&layout, "box.example").unwrap();

        let mode = |p: &std::path::Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&layout.certs), DIR_MODE);
        assert_eq!(mode(&layout.private), PRIVATE_DIR_MODE);
        assert_eq!(mode(&layout.config), CONFIG_MODE);
    }

    #[test]
    fn test_setup_dir_twice_fails_without_changes() {
        let (_temp_dir, layout) = temp_layout();
        setup_dir(&layout, "first.example").unwrap();

        fs::write(&layout.serial, b"2A\n").unwrap();
        let config_before = fs::read_to_string(&layout.config).unwrap();

        let result = setup_dir(&layout, "second.example");
        match result {
            Err(EasyCertError::AlreadyExists(_)) => {}
            _ => panic!("Expected AlreadyExists"),
        }

        assert_eq!(fs::read(&layout.serial).unwrap(), b"2A\n");
        assert_eq!(fs::read_to_string(&layout.config).unwrap(), config_before);
    }

    #[test]
    fn test_render_config() {
        let layout = Layout::new("/srv/pki");
        let config = render_config(&layout, "box.example").unwrap();

        assert!(config.contains("dir              = /srv/pki\n"));
        assert!(config.contains("commonName_default          = box.example"));
        assert!(config.contains("DNS.1 = box.example\nIP.1 = 127.0.0.1\n"));
        assert!(!config.contains("{{"));
    }

    #[test]
    fn test_local_hostname() {
        let host = local_hostname().unwrap();
        assert!(!host.is_empty());
    }
}

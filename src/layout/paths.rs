//! Path resolution for the certificate directory layout.
//!
//! Everything easycert touches lives under a single root:
//!
//! ```text
//! <root>/
//!   openssl.cfg  index.txt  serial  crlnumber  <name>.csr
//!   certs/<name>.crt
//!   newcerts/<serial>.pem
//!   private/<name>.key  private/<name>.pem
//!   crl/ca.crl
//! ```

use crate::error::{EasyCertError, Result};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Default root directory name, relative to the user's home.
pub const DIR_ROOT: &str = ".cert";

/// Reserved artifact name of the certificate authority.
pub const NAME_CA: &str = "ca";

/// Rendered OpenSSL configuration.
pub const FILE_CONFIG: &str = "openssl.cfg";
/// OpenSSL's issued-certificate database.
pub const FILE_INDEX: &str = "index.txt";
/// Next serial number to issue.
pub const FILE_SERIAL: &str = "serial";
/// Next CRL number to issue.
pub const FILE_CRL_NUMBER: &str = "crlnumber";

/// The kinds of file a logical name maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Certificate, can be publicly distributed.
    Cert,
    /// Private key, restrictive permissions.
    Key,
    /// Certificate request, not needed once signed.
    Request,
    /// Certificate followed by its key, for servers that want a single file.
    CertAndKey,
    /// Certificate revocation list.
    Revocation,
}

impl ArtifactKind {
    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Cert => ".crt",
            ArtifactKind::Key => ".key",
            ArtifactKind::Request => ".csr",
            ArtifactKind::CertAndKey => ".pem",
            ArtifactKind::Revocation => ".crl",
        }
    }
}

/// Absolute directory and file paths of a certificate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Root directory with certificates.
    pub root: PathBuf,
    /// Where the certificates are placed.
    pub certs: PathBuf,
    /// Where OpenSSL copies each issued certificate as `<serial>.pem`.
    pub new_certs: PathBuf,
    /// Where the private keys are placed.
    pub private: PathBuf,
    /// Where the revocation lists are placed.
    pub crl: PathBuf,

    /// OpenSSL configuration file.
    pub config: PathBuf,
    /// Serves as a database for OpenSSL.
    pub index: PathBuf,
    /// Contains the next certificate's serial number.
    pub serial: PathBuf,
    /// Contains the next CRL number.
    pub crl_number: PathBuf,
}

/// The files belonging to one logical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub name: String,
    pub cert: PathBuf,
    pub key: PathBuf,
    pub request: PathBuf,
    pub combined: PathBuf,
}

impl Layout {
    /// Lay out the directory structure under `root`. Nothing is touched on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();

        Self {
            certs: root.join("certs"),
            new_certs: root.join("newcerts"),
            private: root.join("private"),
            crl: root.join("crl"),
            config: root.join(FILE_CONFIG),
            index: root.join(FILE_INDEX),
            serial: root.join(FILE_SERIAL),
            crl_number: root.join(FILE_CRL_NUMBER),
            root,
        }
    }

    /// The layout rooted at `~/.cert`.
    pub fn in_home() -> Result<Self> {
        let home = dirs::home_dir().ok_or(EasyCertError::HomeNotFound)?;
        Ok(Self::new(home.join(DIR_ROOT)))
    }

    /// Subdirectories in creation order, root first.
    pub fn directories(&self) -> [&Path; 5] {
        [
            self.root.as_path(),
            self.certs.as_path(),
            self.new_certs.as_path(),
            self.private.as_path(),
            self.crl.as_path(),
        ]
    }

    /// Directory holding artifacts of `kind`.
    pub fn dir_for(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Cert => &self.certs,
            ArtifactKind::Key | ArtifactKind::CertAndKey => &self.private,
            ArtifactKind::Request => &self.root,
            ArtifactKind::Revocation => &self.crl,
        }
    }

    /// Path of the `kind` file for the logical `name`.
    ///
    /// # Example
    ///
    /// ```
    /// use easycert::layout::paths::{ArtifactKind, Layout};
    /// use std::path::Path;
    ///
    /// let layout = Layout::new("/home/me/.cert");
    /// let cert = layout.artifact_path("www", ArtifactKind::Cert).unwrap();
    /// assert_eq!(cert, Path::new("/home/me/.cert/certs/www.crt"));
    /// ```
    pub fn artifact_path(&self, name: &str, kind: ArtifactKind) -> Result<PathBuf> {
        let name = checked_name(name)?;
        Ok(self
            .dir_for(kind)
            .join(format!("{}{}", name, kind.extension())))
    }

    /// All the paths of the logical `name`.
    pub fn artifact(&self, name: &str) -> Result<ArtifactPaths> {
        let name = checked_name(name)?;

        Ok(ArtifactPaths {
            name: name.to_string(),
            cert: self.artifact_path(name, ArtifactKind::Cert)?,
            key: self.artifact_path(name, ArtifactKind::Key)?,
            request: self.artifact_path(name, ArtifactKind::Request)?,
            combined: self.artifact_path(name, ArtifactKind::CertAndKey)?,
        })
    }

    /// The certificate authority's own files.
    pub fn ca(&self) -> ArtifactPaths {
        ArtifactPaths {
            name: NAME_CA.to_string(),
            cert: self.certs.join(format!("{}{}", NAME_CA, ArtifactKind::Cert.extension())),
            key: self.private.join(format!("{}{}", NAME_CA, ArtifactKind::Key.extension())),
            request: self
                .root
                .join(format!("{}{}", NAME_CA, ArtifactKind::Request.extension())),
            combined: self
                .private
                .join(format!("{}{}", NAME_CA, ArtifactKind::CertAndKey.extension())),
        }
    }

    /// The CA's revocation list.
    pub fn crl_file(&self) -> PathBuf {
        self.crl
            .join(format!("{}{}", NAME_CA, ArtifactKind::Revocation.extension()))
    }

    /// Resolve a command-line argument that is either a name or a file path.
    ///
    /// Arguments starting with `.` or the path separator are file paths and
    /// are returned unchanged; anything else is looked up as a `kind` artifact.
    pub fn resolve_target(&self, arg: &str, kind: ArtifactKind) -> Result<PathBuf> {
        if is_file_argument(arg) {
            return Ok(PathBuf::from(arg));
        }
        self.artifact_path(arg, kind)
    }
}

/// Whether `arg` names a file rather than an artifact in the layout.
pub fn is_file_argument(arg: &str) -> bool {
    arg.starts_with('.') || arg.starts_with(MAIN_SEPARATOR)
}

fn checked_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EasyCertError::MissingName);
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::new("/srv/pki")
    }

    #[test]
    fn test_layout_directories() {
        let layout = layout();

        assert_eq!(layout.certs, Path::new("/srv/pki/certs"));
        assert_eq!(layout.new_certs, Path::new("/srv/pki/newcerts"));
        assert_eq!(layout.private, Path::new("/srv/pki/private"));
        assert_eq!(layout.crl, Path::new("/srv/pki/crl"));
        assert_eq!(layout.config, Path::new("/srv/pki/openssl.cfg"));
        assert_eq!(layout.index, Path::new("/srv/pki/index.txt"));
        assert_eq!(layout.serial, Path::new("/srv/pki/serial"));
        assert_eq!(layout.directories()[0], Path::new("/srv/pki"));
    }

    #[test]
    fn test_artifact_suffixes() {
        let paths = layout().artifact("www").unwrap();

        assert_eq!(paths.name, "www");
        assert_eq!(paths.cert, Path::new("/srv/pki/certs/www.crt"));
        assert_eq!(paths.key, Path::new("/srv/pki/private/www.key"));
        assert_eq!(paths.request, Path::new("/srv/pki/www.csr"));
        assert_eq!(paths.combined, Path::new("/srv/pki/private/www.pem"));
    }

    #[test]
    fn test_artifact_is_deterministic() {
        let layout = layout();
        assert_eq!(layout.artifact("db").unwrap(), layout.artifact("db").unwrap());
        assert_eq!(
            Layout::new("/srv/pki").artifact("db").unwrap(),
            layout.artifact("db").unwrap()
        );
    }

    #[test]
    fn test_ca_matches_named_artifact() {
        let layout = layout();
        assert_eq!(layout.ca(), layout.artifact(NAME_CA).unwrap());
        assert_eq!(layout.crl_file(), Path::new("/srv/pki/crl/ca.crl"));
    }

    #[test]
    fn test_missing_name() {
        let result = layout().artifact("  ");
        match result {
            Err(EasyCertError::MissingName) => {}
            _ => panic!("Expected MissingName"),
        }
    }

    #[test]
    fn test_resolve_target_name() {
        let layout = layout();

        assert_eq!(
            layout.resolve_target("www", ArtifactKind::Cert).unwrap(),
            Path::new("/srv/pki/certs/www.crt")
        );
        assert_eq!(
            layout.resolve_target("www", ArtifactKind::Key).unwrap(),
            Path::new("/srv/pki/private/www.key")
        );
    }

    #[test]
    fn test_resolve_target_file() {
        let layout = layout();

        assert_eq!(
            layout.resolve_target("./www.crt", ArtifactKind::Cert).unwrap(),
            Path::new("./www.crt")
        );
        assert_eq!(
            layout.resolve_target("/tmp/www.key", ArtifactKind::Cert).unwrap(),
            Path::new("/tmp/www.key")
        );
    }
}

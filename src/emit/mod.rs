//! Generated source files embedding certificate material.
//!
//! Two files are written per run: a server file with the CA certificate, the
//! server certificate and its key, and a client file with the CA certificate
//! only. Both embed the PEM bytes as escaped byte literals.

pub mod escape;
pub mod templates;

use crate::error::{EasyCertError, Result};
use crate::layout::paths::{ArtifactKind, Layout};
use crate::openssl::command::OpenSsl;
use crate::openssl::inspect::end_date;
use crate::template::render;
use escape::escape_bytes;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Target language of the generated files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Go,
    Rust,
}

impl Language {
    /// Names of the (server, client) files.
    pub fn file_names(self) -> (&'static str, &'static str) {
        match self {
            Language::Go => ("z-cert_srv.go", "z-cert_cl.go"),
            Language::Rust => ("z_cert_srv.rs", "z_cert_cl.rs"),
        }
    }

    fn templates(self) -> (&'static str, &'static str) {
        match self {
            Language::Go => (templates::GO_SERVER, templates::GO_CLIENT),
            Language::Rust => (templates::RUST_SERVER, templates::RUST_CLIENT),
        }
    }

    fn indent(self) -> &'static str {
        match self {
            Language::Go => "\t",
            Language::Rust => "    ",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "go" => Ok(Language::Go),
            "rust" | "rs" => Ok(Language::Rust),
            _ => Err(format!("Unsupported language: '{}'. Use 'go' or 'rust'", s)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Go => f.write_str("go"),
            Language::Rust => f.write_str("rust"),
        }
    }
}

/// Facts written in the header of the generated files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub system: String,
    pub arch: String,
    /// `openssl version` output.
    pub version: String,
    /// Generation timestamp.
    pub date: String,
    /// Expiry date of the server certificate.
    pub valid_until: String,
}

impl Metadata {
    /// Metadata for this host at the current local time.
    pub fn now(version: String, valid_until: String) -> Self {
        Self {
            system: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            version,
            date: chrono::Local::now().format("%d %b %y %H:%M %z").to_string(),
            valid_until,
        }
    }
}

/// PEM contents embedded in the generated files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    pub ca_cert: Vec<u8>,
    pub cert: Vec<u8>,
    pub key: Vec<u8>,
}

/// Generated (server, client) sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub server: String,
    pub client: String,
}

/// Render the server and client sources of `language`.
pub fn render_sources(language: Language, meta: &Metadata, material: &Material) -> Result<Sources> {
    let indent = language.indent();
    let ca_cert = escape_bytes(&material.ca_cert, indent);
    let cert = escape_bytes(&material.cert, indent);
    let key = escape_bytes(&material.key, indent);

    let values = [
        ("System", meta.system.as_str()),
        ("Arch", meta.arch.as_str()),
        ("Version", meta.version.as_str()),
        ("Date", meta.date.as_str()),
        ("ValidUntil", meta.valid_until.as_str()),
        ("CACert", ca_cert.as_str()),
        ("Cert", cert.as_str()),
        ("Key", key.as_str()),
    ];

    let (server, client) = language.templates();
    Ok(Sources {
        server: render(server, &values)?,
        client: render(client, &values)?,
    })
}

/// Paths of the (server, client) files of `language` in `out_dir`.
pub fn output_paths(language: Language, out_dir: &Path) -> (PathBuf, PathBuf) {
    let (server, client) = language.file_names();
    (out_dir.join(server), out_dir.join(client))
}

/// Write `sources` into `out_dir`.
///
/// Both files are checked first; if either exists nothing is written.
pub fn write_sources(
    language: Language,
    out_dir: &Path,
    sources: &Sources,
) -> Result<(PathBuf, PathBuf)> {
    let (server, client) = output_paths(language, out_dir);

    for path in [&server, &client] {
        if path.exists() {
            return Err(EasyCertError::already_exists("File", path));
        }
    }

    write_new(&server, &sources.server)?;
    write_new(&client, &sources.client)?;

    info!(server = ?server, client = ?client, %language, "source files generated");
    Ok((server, client))
}

fn write_new(path: &Path, contents: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => EasyCertError::already_exists("File", path),
            _ => EasyCertError::Io(e),
        })?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

fn read_material(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => EasyCertError::not_found(what, path),
        _ => EasyCertError::Io(e),
    })
}

/// Generate the source files for the server certificate `server_cert`.
///
/// # Arguments
///
/// * `openssl` - Tool used for the version string and the expiry date
/// * `layout` - Certificate layout
/// * `language` - Language of the generated files
/// * `server_cert` - Name of the server certificate and key
/// * `ca_cert` - Name or file of the CA certificate
/// * `out_dir` - Directory receiving the files
///
/// # Example
///
/// ```rust,no_run
/// use easycert::emit::{emit_bindings, Language};
/// use easycert::layout::paths::Layout;
/// use easycert::openssl::command::OpenSsl;
/// use std::path::Path;
///
/// # fn example() -> easycert::error::Result<()> {
/// let (server, client) = emit_bindings(
///     &OpenSsl::find()?,
///     &Layout::in_home()?,
///     Language::Go,
///     "www",
///     "ca",
///     Path::new("."),
/// )?;
/// # Ok(())
/// # }
/// ```
pub fn emit_bindings(
    openssl: &OpenSsl,
    layout: &Layout,
    language: Language,
    server_cert: &str,
    ca_cert: &str,
    out_dir: &Path,
) -> Result<(PathBuf, PathBuf)> {
    let ca_path = layout.resolve_target(ca_cert, ArtifactKind::Cert)?;
    let server = layout.artifact(server_cert)?;

    let (server_out, client_out) = output_paths(language, out_dir);
    for path in [&server_out, &client_out] {
        if path.exists() {
            return Err(EasyCertError::already_exists("File", path));
        }
    }

    let material = Material {
        ca_cert: read_material(&ca_path, "CA certificate")?,
        cert: read_material(&server.cert, "Certificate")?,
        key: read_material(&server.key, "Private key")?,
    };
    let meta = Metadata::now(openssl.version()?, end_date(openssl, &server.cert)?);

    let sources = render_sources(language, &meta, &material)?;
    write_sources(language, out_dir, &sources)
}

//! Certificate requests, the certificate authority, and signing.
//!
//! Every function here checks the paths it is about to create before OpenSSL
//! runs, so an existing key or certificate is never overwritten.

use crate::error::{EasyCertError, Result};
use crate::layout::init::local_hostname;
use crate::layout::paths::{ArtifactPaths, Layout};
use crate::layout::set_mode;
use crate::openssl::command::OpenSsl;
use crate::settings::{validity_days, RsaSize, DEFAULT_CA_YEARS, DEFAULT_YEARS};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::info;

/// Mode of private keys and combined cert+key files.
pub const KEY_FILE_MODE: u32 = 0o600;

/// Config section with default alternate names (hostname and loopback).
const REQ_EXTENSIONS: &str = "v3_req";
/// Config section without alternate names, for `--host`.
const REQ_EXTENSIONS_BASE: &str = "v3_req_base";
/// Config section for the CA certificate.
const CA_EXTENSIONS: &str = "v3_ca";

/// One entry of a subject alternative name list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltName {
    Dns(String),
    Ip(IpAddr),
}

impl fmt::Display for AltName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AltName::Dns(name) => write!(f, "DNS:{}", name),
            AltName::Ip(ip) => write!(f, "IP:{}", ip),
        }
    }
}

/// Parse a comma-separated list of hostnames and IP addresses.
///
/// # Example
///
/// ```
/// use easycert::openssl::request::{parse_hosts, AltName};
///
/// let hosts = parse_hosts("www.example.com, 10.0.0.1").unwrap();
/// assert_eq!(hosts[0], AltName::Dns("www.example.com".to_string()));
/// assert_eq!(hosts[1], AltName::Ip("10.0.0.1".parse().unwrap()));
/// ```
pub fn parse_hosts(list: &str) -> Result<Vec<AltName>> {
    list.split(',')
        .map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() || entry.contains(char::is_whitespace) {
                return Err(EasyCertError::InvalidHost(entry.to_string()));
            }
            Ok(match entry.parse::<IpAddr>() {
                Ok(ip) => AltName::Ip(ip),
                Err(_) => AltName::Dns(entry.to_string()),
            })
        })
        .collect()
}

/// `subjectAltName=...` value for OpenSSL's `-addext`.
pub fn subject_alt_name(hosts: &[AltName]) -> String {
    let names: Vec<String> = hosts.iter().map(AltName::to_string).collect();
    format!("subjectAltName={}", names.join(","))
}

/// Options for a new certificate request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub rsa_size: RsaSize,
    /// Subject in OpenSSL's `/K=V/...` form; defaults to `/CN=<name>`.
    pub subject: Option<String>,
    /// Alternate names replacing the configured defaults.
    pub hosts: Vec<AltName>,
}

/// Options for the certificate authority.
#[derive(Debug, Clone)]
pub struct CaOptions {
    pub rsa_size: RsaSize,
    pub years: u32,
    /// Subject in OpenSSL's `/K=V/...` form; defaults to
    /// `/CN=<hostname> Certificate Authority`.
    pub subject: Option<String>,
}

impl Default for CaOptions {
    fn default() -> Self {
        Self {
            rsa_size: RsaSize::default(),
            years: DEFAULT_CA_YEARS,
            subject: None,
        }
    }
}

/// Options for signing a request.
#[derive(Debug, Clone)]
pub struct SignOptions {
    pub years: u32,
    /// Also write `private/<name>.pem` with certificate and key.
    pub combined: bool,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            years: DEFAULT_YEARS,
            combined: false,
        }
    }
}

fn os(s: impl AsRef<OsStr>) -> OsString {
    s.as_ref().to_owned()
}

fn ensure_absent(path: &Path, what: &str) -> Result<()> {
    if path.exists() {
        return Err(EasyCertError::already_exists(what, path));
    }
    Ok(())
}

fn ensure_present(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        return Err(EasyCertError::not_found(what, path));
    }
    Ok(())
}

fn read_existing(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => EasyCertError::not_found(what, path),
        _ => EasyCertError::Io(e),
    })
}

fn ensure_config(layout: &Layout) -> Result<()> {
    if !layout.config.is_file() {
        return Err(EasyCertError::NotFound(format!(
            "OpenSSL configuration {:?}; run `easycert new` first",
            layout.config
        )));
    }
    Ok(())
}

/// Arguments of `openssl req` creating a key and a request for `paths`.
pub fn request_args(layout: &Layout, paths: &ArtifactPaths, opts: &RequestOptions) -> Vec<OsString> {
    let subject = opts
        .subject
        .clone()
        .unwrap_or_else(|| format!("/CN={}", paths.name));

    let mut args = vec![
        os("req"),
        os("-new"),
        os("-newkey"),
        os(format!("rsa:{}", opts.rsa_size)),
        os("-nodes"),
        os("-keyout"),
        os(&paths.key),
        os("-out"),
        os(&paths.request),
        os("-config"),
        os(&layout.config),
        os("-subj"),
        os(subject),
    ];

    if opts.hosts.is_empty() {
        args.extend([os("-reqexts"), os(REQ_EXTENSIONS)]);
    } else {
        args.extend([
            os("-reqexts"),
            os(REQ_EXTENSIONS_BASE),
            os("-addext"),
            os(subject_alt_name(&opts.hosts)),
        ]);
    }

    args
}

/// Arguments of `openssl req -x509` creating the self-signed CA.
pub fn ca_args(layout: &Layout, ca: &ArtifactPaths, opts: &CaOptions, subject: &str) -> Vec<OsString> {
    vec![
        os("req"),
        os("-new"),
        os("-x509"),
        os("-newkey"),
        os(format!("rsa:{}", opts.rsa_size)),
        os("-nodes"),
        os("-keyout"),
        os(&ca.key),
        os("-out"),
        os(&ca.cert),
        os("-days"),
        os(validity_days(opts.years).to_string()),
        os("-config"),
        os(&layout.config),
        os("-extensions"),
        os(CA_EXTENSIONS),
        os("-subj"),
        os(subject),
    ]
}

/// Arguments of `openssl ca` signing the request of `paths`.
pub fn sign_args(layout: &Layout, paths: &ArtifactPaths, years: u32) -> Vec<OsString> {
    vec![
        os("ca"),
        os("-batch"),
        os("-notext"),
        os("-config"),
        os(&layout.config),
        os("-days"),
        os(validity_days(years).to_string()),
        os("-in"),
        os(&paths.request),
        os("-out"),
        os(&paths.cert),
    ]
}

/// Create a private key and a certificate request for `name`.
///
/// Fails with [`EasyCertError::AlreadyExists`] if the request or the key is
/// already there.
///
/// # Example
///
/// ```rust,no_run
/// use easycert::layout::paths::Layout;
/// use easycert::openssl::command::OpenSsl;
/// use easycert::openssl::request::{new_request, RequestOptions};
///
/// # fn example() -> easycert::error::Result<()> {
/// let layout = Layout::in_home()?;
/// let paths = new_request(&OpenSsl::find()?, &layout, "www", &RequestOptions::default())?;
/// println!("request at {}", paths.request.display());
/// # Ok(())
/// # }
/// ```
pub fn new_request(
    openssl: &OpenSsl,
    layout: &Layout,
    name: &str,
    opts: &RequestOptions,
) -> Result<ArtifactPaths> {
    let paths = layout.artifact(name)?;

    ensure_absent(&paths.request, "Certificate request")?;
    ensure_absent(&paths.key, "Private key")?;
    ensure_config(layout)?;

    openssl.run(request_args(layout, &paths, opts))?;
    set_mode(&paths.key, KEY_FILE_MODE)?;

    info!(request = ?paths.request, key = ?paths.key, "certificate request created");
    Ok(paths)
}

/// Create the self-signed certificate authority.
pub fn build_ca(openssl: &OpenSsl, layout: &Layout, opts: &CaOptions) -> Result<ArtifactPaths> {
    let ca = layout.ca();

    ensure_absent(&ca.cert, "CA certificate")?;
    ensure_absent(&ca.key, "CA private key")?;
    ensure_config(layout)?;

    let subject = match &opts.subject {
        Some(subject) => subject.clone(),
        None => format!("/CN={} Certificate Authority", local_hostname()?),
    };

    openssl.run(ca_args(layout, &ca, opts, &subject))?;
    set_mode(&ca.key, KEY_FILE_MODE)?;

    info!(cert = ?ca.cert, years = opts.years, "certificate authority created");
    Ok(ca)
}

/// Sign the pending request of `name` with the CA.
///
/// Fails with [`EasyCertError::AlreadyExists`] if the certificate exists and
/// with [`EasyCertError::NotFound`] if the request or the CA is missing, or
/// the key when a combined file is asked for.
pub fn sign_request(
    openssl: &OpenSsl,
    layout: &Layout,
    name: &str,
    opts: &SignOptions,
) -> Result<ArtifactPaths> {
    let paths = layout.artifact(name)?;
    let ca = layout.ca();

    ensure_absent(&paths.cert, "Certificate")?;
    if opts.combined {
        ensure_absent(&paths.combined, "Certificate and key file")?;
    }
    ensure_present(&paths.request, "Certificate request")?;
    if opts.combined {
        ensure_present(&paths.key, "Private key")?;
    }
    ensure_present(&ca.cert, "CA certificate")?;
    ensure_config(layout)?;

    openssl.run(sign_args(layout, &paths, opts.years))?;
    info!(cert = ?paths.cert, years = opts.years, "certificate signed");

    if opts.combined {
        write_combined(&paths)?;
    }
    Ok(paths)
}

/// Write `private/<name>.pem`: the certificate followed by its key.
pub fn write_combined(paths: &ArtifactPaths) -> Result<PathBuf> {
    let cert = read_existing(&paths.cert, "Certificate")?;
    let key = read_existing(&paths.key, "Private key")?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&paths.combined)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => {
                EasyCertError::already_exists("Certificate and key file", &paths.combined)
            }
            _ => EasyCertError::Io(e),
        })?;
    set_mode(&paths.combined, KEY_FILE_MODE)?;

    file.write_all(&cert)?;
    if !cert.ends_with(b"\n") {
        file.write_all(b"\n")?;
    }
    file.write_all(&key)?;

    info!(path = ?paths.combined, "combined certificate and key written");
    Ok(paths.combined.clone())
}

/// Revoke the signed certificate of `name` in the CA database.
pub fn revoke(openssl: &OpenSsl, layout: &Layout, name: &str) -> Result<PathBuf> {
    let paths = layout.artifact(name)?;

    ensure_present(&paths.cert, "Certificate")?;
    ensure_config(layout)?;

    openssl.run([
        os("ca"),
        os("-batch"),
        os("-config"),
        os(&layout.config),
        os("-revoke"),
        os(&paths.cert),
    ])?;

    info!(cert = ?paths.cert, "certificate revoked");
    Ok(paths.cert)
}

/// Regenerate the CA's revocation list in `crl/ca.crl`.
pub fn generate_crl(openssl: &OpenSsl, layout: &Layout) -> Result<PathBuf> {
    let ca = layout.ca();
    let crl = layout.crl_file();

    ensure_present(&ca.cert, "CA certificate")?;
    ensure_config(layout)?;

    openssl.run([
        os("ca"),
        os("-batch"),
        os("-config"),
        os(&layout.config),
        os("-gencrl"),
        os("-out"),
        os(&crl),
    ])?;

    info!(path = ?crl, "revocation list generated");
    Ok(crl)
}

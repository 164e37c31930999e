//! Read-only queries on certificates and keys.

use crate::error::{EasyCertError, Result};
use crate::openssl::command::OpenSsl;
use std::ffi::OsStr;
use std::path::Path;

/// A single piece of certificate information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoField {
    /// Date until which the certificate is valid.
    EndDate,
    /// Subject name hash.
    Hash,
    Issuer,
    Subject,
    /// Full text dump.
    Full,
}

impl InfoField {
    /// The `openssl x509` flag printing this field.
    pub fn flag(self) -> &'static str {
        match self {
            InfoField::EndDate => "-enddate",
            InfoField::Hash => "-hash",
            InfoField::Issuer => "-issuer",
            InfoField::Subject => "-subject",
            InfoField::Full => "-text",
        }
    }

    /// Fields asked for on the command line, in output order.
    ///
    /// `full` wins over the single fields; nothing selected means the subject.
    pub fn selected(end_date: bool, hash: bool, issuer: bool, subject: bool, full: bool) -> Vec<Self> {
        if full {
            return vec![InfoField::Full];
        }

        let fields: Vec<Self> = [
            (end_date, InfoField::EndDate),
            (hash, InfoField::Hash),
            (issuer, InfoField::Issuer),
            (subject, InfoField::Subject),
        ]
        .into_iter()
        .filter_map(|(on, field)| on.then_some(field))
        .collect();

        if fields.is_empty() {
            vec![InfoField::Subject]
        } else {
            fields
        }
    }
}

fn require_file(path: &Path, what: &str) -> Result<()> {
    if !path.is_file() {
        return Err(EasyCertError::not_found(what, path));
    }
    Ok(())
}

/// Check that `path` holds a readable certificate.
pub fn check_cert(openssl: &OpenSsl, path: &Path) -> Result<()> {
    require_file(path, "Certificate")?;
    openssl.run([OsStr::new("x509"), OsStr::new("-in"), path.as_os_str(), OsStr::new("-noout")])?;
    Ok(())
}

/// Check the consistency of the RSA key in `path`; returns OpenSSL's verdict.
pub fn check_key(openssl: &OpenSsl, path: &Path) -> Result<String> {
    require_file(path, "Private key")?;
    openssl.run([
        OsStr::new("rsa"),
        OsStr::new("-in"),
        path.as_os_str(),
        OsStr::new("-check"),
        OsStr::new("-noout"),
    ])
}

/// The certificate in `path`, as PEM re-encoded by OpenSSL.
pub fn cat_cert(openssl: &OpenSsl, path: &Path) -> Result<String> {
    require_file(path, "Certificate")?;
    openssl.run([OsStr::new("x509"), OsStr::new("-in"), path.as_os_str()])
}

/// The private key in `path`, as PEM re-encoded by OpenSSL.
pub fn cat_key(openssl: &OpenSsl, path: &Path) -> Result<String> {
    require_file(path, "Private key")?;
    openssl.run([OsStr::new("pkey"), OsStr::new("-in"), path.as_os_str()])
}

/// Print one field of the certificate in `path`.
pub fn info(openssl: &OpenSsl, path: &Path, field: InfoField) -> Result<String> {
    require_file(path, "Certificate")?;
    openssl.run([
        OsStr::new("x509"),
        OsStr::new("-in"),
        path.as_os_str(),
        OsStr::new("-noout"),
        OsStr::new(field.flag()),
    ])
}

/// Expiry date of the certificate in `path`, e.g. `Jan  1 00:00:00 2030 GMT`.
pub fn end_date(openssl: &OpenSsl, path: &Path) -> Result<String> {
    Ok(parse_end_date(&info(openssl, path, InfoField::EndDate)?))
}

/// Strip the `notAfter=` label from `openssl x509 -enddate` output.
pub fn parse_end_date(output: &str) -> String {
    let line = output.trim();
    line.strip_prefix("notAfter=").unwrap_or(line).to_string()
}

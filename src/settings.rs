//! Run configuration.
//!
//! Everything an operation needs to know about where things live is carried
//! in a [`Settings`] value built once per run and passed down by reference.

use crate::error::{EasyCertError, Result};
use crate::layout::paths::Layout;
use crate::openssl::command::OpenSsl;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Smallest RSA key accepted, in bits.
pub const MIN_RSA_SIZE: u32 = 2048;
/// RSA key sizes must be a multiple of this.
pub const RSA_SIZE_STEP: u32 = 1024;

/// Validity of requested and signed certificates, in years.
pub const DEFAULT_YEARS: u32 = 1;
/// Validity of the CA certificate, in years.
pub const DEFAULT_CA_YEARS: u32 = 10;

/// Size in bits of an RSA key to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsaSize(u32);

impl RsaSize {
    /// Validate `bits`: at least 2048 and a multiple of 1024.
    pub fn new(bits: u32) -> Result<Self> {
        if bits < MIN_RSA_SIZE {
            return Err(EasyCertError::InvalidKeySize(format!(
                "key size must be at least {}",
                MIN_RSA_SIZE
            )));
        }
        if bits % RSA_SIZE_STEP != 0 {
            return Err(EasyCertError::InvalidKeySize(format!(
                "key size must be multiple of {}",
                RSA_SIZE_STEP
            )));
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl Default for RsaSize {
    fn default() -> Self {
        Self(MIN_RSA_SIZE)
    }
}

impl FromStr for RsaSize {
    type Err = EasyCertError;

    fn from_str(s: &str) -> Result<Self> {
        let bits = s
            .trim()
            .parse::<u32>()
            .map_err(|e| EasyCertError::InvalidKeySize(format!("{:?}: {}", s, e)))?;
        Self::new(bits)
    }
}

impl fmt::Display for RsaSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Days in `years` of validity, as OpenSSL's `-days` expects.
pub fn validity_days(years: u32) -> u32 {
    years.saturating_mul(365)
}

/// Where the certificate authority lives and which OpenSSL drives it.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory layout of the certificate root.
    pub layout: Layout,
    openssl_path: Option<PathBuf>,
}

impl Settings {
    /// Settings for an explicit layout.
    ///
    /// With `openssl_path` unset, the tool is searched on `PATH` when first
    /// needed.
    pub fn new(layout: Layout, openssl_path: Option<PathBuf>) -> Self {
        Self {
            layout,
            openssl_path,
        }
    }

    /// Settings from the command line, falling back to `~/.cert`.
    pub fn resolve(root: Option<PathBuf>, openssl_path: Option<PathBuf>) -> Result<Self> {
        let layout = match root {
            Some(root) => Layout::new(root),
            None => Layout::in_home()?,
        };
        Ok(Self::new(layout, openssl_path))
    }

    /// Locate the OpenSSL executable.
    pub fn openssl(&self) -> Result<OpenSsl> {
        match &self.openssl_path {
            Some(path) => OpenSsl::at(path),
            None => OpenSsl::find(),
        }
    }
}

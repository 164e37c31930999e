//! easycert: a small certificate authority driven through OpenSSL.
//!
//! This library keeps a certificate authority in a fixed directory layout and
//! delegates every cryptographic operation to the `openssl` executable. It
//! enables users to:
//!
//! - Create the directory structure and OpenSSL configuration
//! - Build a self-signed certification authority
//! - Create certificate requests and sign them
//! - Revoke certificates and generate the revocation list
//! - Inspect certificates and keys
//! - Generate Go or Rust source files embedding the PEM material
//!
//! # Example
//!
//! ```rust,no_run
//! use easycert::layout::init::{local_hostname, setup_dir};
//! use easycert::openssl::request::{build_ca, CaOptions};
//! use easycert::settings::Settings;
//! use easycert::error::Result;
//!
//! fn example() -> Result<()> {
//!     let settings = Settings::resolve(None, None)?;
//!     setup_dir(&settings.layout, &local_hostname()?)?;
//!     build_ca(&settings.openssl()?, &settings.layout, &CaOptions::default())?;
//!     Ok(())
//! }
//! ```

pub mod emit;
pub mod error;
pub mod layout;
pub mod openssl;
pub mod settings;
pub mod template;

// Re-export commonly used types
pub use error::{EasyCertError, Result};
pub use layout::paths::{ArtifactKind, ArtifactPaths, Layout};
pub use settings::Settings;

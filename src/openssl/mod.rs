//! External tool invocation.
//!
//! Every cryptographic operation is delegated to the `openssl` executable:
//!
//! - [`command`] locates it and runs it, turning failed exits into errors
//! - [`request`] creates requests, the CA, signs, revokes and builds the CRL
//! - [`inspect`] checks, prints and queries certificates and keys

pub mod command;
pub mod inspect;
pub mod request;

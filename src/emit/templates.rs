//! Source templates for the generated files.
//!
//! Placeholders: `Version`, `System`, `Arch`, `Date`, `ValidUntil`, and the
//! escaped blocks `CACert`, `Cert`, `Key`.

pub const GO_SERVER: &str = r#"// MACHINE GENERATED BY easycert; DO NOT EDIT.
// {{Version}} on {{System}}/{{Arch}}
// Generated on {{Date}}; the certificate is valid until {{ValidUntil}}.

package main

import (
	"crypto/tls"
	"crypto/x509"
)

// srvCACert is the certificate of the certification authority.
var srvCACert = []byte{
{{CACert}}}

// srvCert is the server certificate.
var srvCert = []byte{
{{Cert}}}

// srvKey is the server private key.
var srvKey = []byte{
{{Key}}}

// serverTLSConfig returns the TLS configuration of a server which requires
// clients certified by the same authority.
func serverTLSConfig() (*tls.Config, error) {
	cert, err := tls.X509KeyPair(srvCert, srvKey)
	if err != nil {
		return nil, err
	}
	pool := x509.NewCertPool()
	pool.AppendCertsFromPEM(srvCACert)

	return &tls.Config{
		Certificates: []tls.Certificate{cert},
		ClientCAs:    pool,
	}, nil
}
"#;

pub const GO_CLIENT: &str = r#"// MACHINE GENERATED BY easycert; DO NOT EDIT.
// {{Version}} on {{System}}/{{Arch}}
// Generated on {{Date}}; the server certificate is valid until {{ValidUntil}}.

package main

import (
	"crypto/tls"
	"crypto/x509"
)

// clCACert is the certificate of the certification authority.
var clCACert = []byte{
{{CACert}}}

// clientTLSConfig returns the TLS configuration of a client which trusts
// servers certified by the authority.
func clientTLSConfig() *tls.Config {
	pool := x509.NewCertPool()
	pool.AppendCertsFromPEM(clCACert)

	return &tls.Config{RootCAs: pool}
}
"#;

pub const RUST_SERVER: &str = r#"//! Machine generated by easycert; do not edit.
//!
//! {{Version}} on {{System}}/{{Arch}}
//! Generated on {{Date}}; the certificate is valid until {{ValidUntil}}.

/// PEM certificate of the certification authority.
pub const CA_CERT: &[u8] = &[
{{CACert}}];

/// PEM server certificate.
pub const SERVER_CERT: &[u8] = &[
{{Cert}}];

/// PEM server private key.
pub const SERVER_KEY: &[u8] = &[
{{Key}}];
"#;

pub const RUST_CLIENT: &str = r#"//! Machine generated by easycert; do not edit.
//!
//! {{Version}} on {{System}}/{{Arch}}
//! Generated on {{Date}}; the server certificate is valid until {{ValidUntil}}.

/// PEM certificate of the certification authority.
pub const CA_CERT: &[u8] = &[
{{CACert}}];
"#;

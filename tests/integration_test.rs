//! Integration tests for easycert.
//!
//! These tests verify the complete workflows of the system. The ones driving
//! OpenSSL return early when no `openssl` is on PATH.

use easycert::emit::{emit_bindings, Language};
use easycert::error::{EasyCertError, Result};
use easycert::layout::init::setup_dir;
use easycert::layout::listing::{list_certificates, list_requests};
use easycert::layout::paths::{ArtifactKind, Layout};
use easycert::openssl::command::OpenSsl;
use easycert::openssl::inspect::{self, InfoField};
use easycert::openssl::request::{
    build_ca, generate_crl, new_request, parse_hosts, revoke, sign_request, CaOptions,
    RequestOptions, SignOptions,
};
use easycert::settings::{RsaSize, Settings};
use std::fs;
use tempfile::TempDir;

fn openssl_or_skip() -> Option<OpenSsl> {
    match OpenSsl::find() {
        Ok(openssl) => Some(openssl),
        Err(_) => {
            eprintln!("openssl not found on PATH; skipping");
            None
        }
    }
}

fn ca_options() -> CaOptions {
    CaOptions {
        rsa_size: RsaSize::default(),
        years: 10,
        subject: Some("/O=easycert tests/CN=Test CA".to_string()),
    }
}

#[test]
fn test_directory_setup_is_guarded() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let settings = Settings::new(Layout::new(temp_dir.path().join(".cert")), None);
    let layout = &settings.layout;

    // 1. First initialization creates everything
    setup_dir(layout, "first.example")?;
    assert!(layout.private.is_dir());
    assert!(layout.config.is_file());

    // 2. Simulate some CA activity
    fs::write(&layout.index, "V\t300101000000Z\t\t01\tunknown\t/CN=www\n")?;
    fs::write(&layout.serial, "02\n")?;
    let config = fs::read_to_string(&layout.config)?;

    // 3. A second initialization fails and leaves the state alone
    let result = setup_dir(layout, "second.example");
    assert!(matches!(result, Err(EasyCertError::AlreadyExists(_))));

    assert_eq!(
        fs::read_to_string(&layout.index)?,
        "V\t300101000000Z\t\t01\tunknown\t/CN=www\n"
    );
    assert_eq!(fs::read_to_string(&layout.serial)?, "02\n");
    assert_eq!(fs::read_to_string(&layout.config)?, config);
    assert!(!config.contains("second.example"));

    Ok(())
}

#[test]
fn test_path_resolution_workflow() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let layout = Layout::new(temp_dir.path());

    for name in ["www", "db", "mail.example.com"] {
        let paths = layout.artifact(name)?;

        assert_eq!(paths.cert, layout.certs.join(format!("{}.crt", name)));
        assert_eq!(paths.key, layout.private.join(format!("{}.key", name)));
        assert_eq!(paths.request, layout.root.join(format!("{}.csr", name)));
        assert_eq!(paths.cert, layout.resolve_target(name, ArtifactKind::Cert)?);
        assert_eq!(paths.key, layout.resolve_target(name, ArtifactKind::Key)?);
    }

    assert!(matches!(
        layout.artifact(""),
        Err(EasyCertError::MissingName)
    ));

    Ok(())
}

#[test]
fn test_listing_returns_base_names() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let layout = Layout::new(temp_dir.path().join(".cert"));
    setup_dir(&layout, "box.example")?;

    fs::write(layout.certs.join("ca.crt"), "x")?;
    fs::write(layout.certs.join("www.crt"), "x")?;
    fs::write(layout.root.join("db.csr"), "x")?;

    let certs = list_certificates(&layout)?;
    let requests = list_requests(&layout)?;

    assert_eq!(certs, vec!["ca.crt", "www.crt"]);
    assert_eq!(requests, vec!["db.csr"]);
    assert!(certs
        .iter()
        .chain(requests.iter())
        .all(|name| !name.contains(std::path::MAIN_SEPARATOR)));

    Ok(())
}

#[test]
fn test_complete_certificate_authority_workflow() -> Result<()> {
    let Some(openssl) = openssl_or_skip() else {
        return Ok(());
    };
    let temp_dir = TempDir::new().unwrap();
    let layout = Layout::new(temp_dir.path().join(".cert"));

    // 1. Directory structure and CA
    setup_dir(&layout, "localhost")?;
    let ca = build_ca(&openssl, &layout, &ca_options())?;
    assert!(ca.cert.is_file());
    assert!(ca.key.is_file());
    inspect::check_cert(&openssl, &ca.cert)?;

    // 2. A second CA is refused
    assert!(matches!(
        build_ca(&openssl, &layout, &ca_options()),
        Err(EasyCertError::AlreadyExists(_))
    ));

    // 3. Request with explicit alternate names
    let opts = RequestOptions {
        hosts: parse_hosts("www.example.com,127.0.0.1")?,
        ..RequestOptions::default()
    };
    let www = new_request(&openssl, &layout, "www", &opts)?;
    assert!(www.request.is_file());
    assert_eq!(list_requests(&layout)?, vec!["www.csr"]);

    // 4. Sign it, with the combined file
    let sign_opts = SignOptions {
        years: 1,
        combined: true,
    };
    sign_request(&openssl, &layout, "www", &sign_opts)?;
    assert_eq!(list_certificates(&layout)?, vec!["ca.crt", "www.crt"]);

    let combined = fs::read_to_string(&www.combined)?;
    assert!(combined.contains("BEGIN CERTIFICATE"));
    assert!(combined.contains("PRIVATE KEY"));

    // 5. Signing twice is refused
    assert!(matches!(
        sign_request(&openssl, &layout, "www", &SignOptions::default()),
        Err(EasyCertError::AlreadyExists(_))
    ));

    // 6. Inspection
    inspect::check_cert(&openssl, &www.cert)?;
    inspect::check_key(&openssl, &www.key)?;

    let subject = inspect::info(&openssl, &www.cert, InfoField::Subject)?;
    assert!(subject.contains("www"));
    let issuer = inspect::info(&openssl, &www.cert, InfoField::Issuer)?;
    assert!(issuer.contains("Test CA"));
    let full = inspect::info(&openssl, &www.cert, InfoField::Full)?;
    assert!(full.contains("www.example.com"));

    let hash = inspect::info(&openssl, &www.cert, InfoField::Hash)?;
    assert_eq!(hash.trim().len(), 8);
    assert!(!inspect::end_date(&openssl, &www.cert)?.starts_with("notAfter="));

    let pem = inspect::cat_cert(&openssl, &www.cert)?;
    assert!(pem.starts_with("-----BEGIN CERTIFICATE-----"));
    let key = inspect::cat_key(&openssl, &www.key)?;
    assert!(key.contains("PRIVATE KEY"));

    // 7. Revocation
    revoke(&openssl, &layout, "www")?;
    let crl = generate_crl(&openssl, &layout)?;
    assert_eq!(crl, layout.crl.join("ca.crl"));
    assert!(fs::read_to_string(&crl)?.contains("BEGIN X509 CRL"));

    Ok(())
}

#[test]
fn test_emit_bindings_workflow() -> Result<()> {
    let Some(openssl) = openssl_or_skip() else {
        return Ok(());
    };
    let temp_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let layout = Layout::new(temp_dir.path().join(".cert"));

    setup_dir(&layout, "localhost")?;
    build_ca(&openssl, &layout, &ca_options())?;
    new_request(&openssl, &layout, "srv", &RequestOptions::default())?;
    sign_request(&openssl, &layout, "srv", &SignOptions::default())?;

    // CA given as a file rather than a name
    let ca_file = layout.ca().cert.to_string_lossy().into_owned();
    let (server, client) = emit_bindings(
        &openssl,
        &layout,
        Language::Go,
        "srv",
        &ca_file,
        out_dir.path(),
    )?;

    let server_src = fs::read_to_string(&server)?;
    let client_src = fs::read_to_string(&client)?;
    assert!(server_src.contains("var srvKey = []byte{"));
    assert!(server_src.contains("the certificate is valid until"));
    assert!(client_src.contains("var clCACert = []byte{"));
    assert!(!client_src.contains("srvKey"));

    // 0x2d is '-', the first byte of every PEM block
    assert!(server_src.contains("\t0x2d, 0x2d, 0x2d, 0x2d, 0x2d, 0x42,"));

    // Existing output is never overwritten
    let again = emit_bindings(
        &openssl,
        &layout,
        Language::Go,
        "srv",
        "ca",
        out_dir.path(),
    );
    assert!(matches!(again, Err(EasyCertError::AlreadyExists(_))));

    // Another language writes its own files
    emit_bindings(&openssl, &layout, Language::Rust, "srv", "ca", out_dir.path())?;
    assert!(out_dir.path().join("z_cert_srv.rs").is_file());

    Ok(())
}

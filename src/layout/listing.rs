//! Listing of the certificates and requests built so far.

use crate::error::Result;
use crate::layout::paths::{ArtifactKind, Layout};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// File names (not paths) of the certificates in `certs/`, sorted.
pub fn list_certificates(layout: &Layout) -> Result<Vec<String>> {
    list_with_extension(&layout.certs, ArtifactKind::Cert)
}

/// File names (not paths) of the pending requests in the root, sorted.
pub fn list_requests(layout: &Layout) -> Result<Vec<String>> {
    list_with_extension(&layout.root, ArtifactKind::Request)
}

/// One output line per listed kind: certificates first, then requests.
///
/// With neither `certs` nor `requests` set both kinds are listed. A kind
/// without entries produces no line.
pub fn list_lines(layout: &Layout, certs: bool, requests: bool) -> Result<Vec<String>> {
    let both = !certs && !requests;
    let mut lines = Vec::new();

    if certs || both {
        lines.extend(names_line(&list_certificates(layout)?));
    }
    if requests || both {
        lines.extend(names_line(&list_requests(layout)?));
    }
    Ok(lines)
}

/// The names tab-separated on one line, or `None` when there are none.
pub fn names_line(names: &[String]) -> Option<String> {
    if names.is_empty() {
        None
    } else {
        Some(names.join("\t"))
    }
}

/// Names of the regular files in `dir` ending with the extension of `kind`.
///
/// A missing directory lists as empty.
fn list_with_extension(dir: &Path, kind: ArtifactKind) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.len() > kind.extension().len() && name.ends_with(kind.extension()) {
                names.push(name.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

//! Minimal text templates.
//!
//! Placeholders are written `{{Name}}`. Every placeholder in the template must
//! have a value; extra values are ignored.

use crate::error::{EasyCertError, Result};

/// Substitute `{{Name}}` placeholders in `template` with `values`.
///
/// # Example
///
/// ```
/// use easycert::template::render;
///
/// let out = render("dir = {{RootDir}}", &[("RootDir", "/home/me/.cert")]).unwrap();
/// assert_eq!(out, "dir = /home/me/.cert");
/// ```
pub fn render(template: &str, values: &[(&str, &str)]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);

        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or_else(|| {
            EasyCertError::Template(format!("unterminated placeholder near {:?}", snippet(after)))
        })?;

        let key = after[..end].trim();
        let value = values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .ok_or_else(|| EasyCertError::Template(format!("no value for {{{{{}}}}}", key)))?;

        out.push_str(value);
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

fn snippet(s: &str) -> &str {
    match s.char_indices().nth(20) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

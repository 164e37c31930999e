//! Locating and running the OpenSSL executable.

use crate::error::{EasyCertError, Result};
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Name of the executable searched for on `PATH`.
pub const TOOL_NAME: &str = "openssl";

/// Handle on an OpenSSL executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSsl {
    program: PathBuf,
}

impl OpenSsl {
    /// Find `openssl` on the execution path.
    pub fn find() -> Result<Self> {
        let path_var = env::var_os("PATH").unwrap_or_default();
        find_in_path(TOOL_NAME, &path_var)
            .map(|program| Self { program })
            .ok_or_else(|| EasyCertError::ToolNotFound(TOOL_NAME.to_string()))
    }

    /// Use the executable at `program`.
    pub fn at(program: impl Into<PathBuf>) -> Result<Self> {
        let program = program.into();
        if !is_executable(&program) {
            return Err(EasyCertError::ToolNotFound(program.display().to_string()));
        }
        Ok(Self { program })
    }

    /// Path of the executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run OpenSSL with `args` and return its standard output.
    ///
    /// A non-zero exit becomes [`EasyCertError::ToolFailed`] carrying stderr.
    pub fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        debug!(program = ?self.program, ?args, "running openssl");

        let output = Command::new(&self.program).args(&args).output()?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(EasyCertError::ToolFailed {
                command: args
                    .first()
                    .map(|a| a.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                status: output.status,
                stderr,
            });
        }
        if !stderr.is_empty() {
            debug!(%stderr, "openssl diagnostics");
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// The `openssl version` line, without trailing newline.
    pub fn version(&self) -> Result<String> {
        Ok(self.run(["version"])?.trim_end().to_string())
    }
}

/// Search the directories of a `PATH`-style list for an executable `name`.
pub fn find_in_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = path.metadata() else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    let executable = {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    };
    #[cfg(not(unix))]
    let executable = true;

    executable
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_find_in_path_first_match() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();

        let plain = first.path().join("openssl");
        fs::write(&plain, "not executable").unwrap();

        let tool = second.path().join("openssl");
        fs::write(&tool, "#!/bin/sh\n").unwrap();
        make_executable(&tool);

        let path_var = env::join_paths([first.path(), second.path()]).unwrap();
        assert_eq!(find_in_path("openssl", &path_var), Some(tool));
    }

    #[test]
    fn test_find_in_path_missing() {
        let dir = TempDir::new().unwrap();
        let path_var = env::join_paths([dir.path()]).unwrap();
        assert_eq!(find_in_path("openssl", &path_var), None);
    }

    #[test]
    fn test_at_missing_program() {
        let result = OpenSsl::at("/nonexistent/bin/openssl");
        match result {
            Err(EasyCertError::ToolNotFound(_)) => {}
            _ => panic!("Expected ToolNotFound"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_surfaces_failure() {
        let shell = OpenSsl::at("/bin/sh").unwrap();
        match shell.run(["-c", "echo bad option >&2; exit 3"]) {
            Err(EasyCertError::ToolFailed {
                command,
                status,
                stderr,
            }) => {
                assert_eq!(command, "-c");
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "bad option");
            }
            other => panic!("Expected ToolFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_returns_stdout() {
        let shell = OpenSsl::at("/bin/sh").unwrap();
        let out = shell.run(["-c", "echo FakeSSL 1.0; echo note >&2"]).unwrap();
        assert_eq!(out, "FakeSSL 1.0\n");
    }
}

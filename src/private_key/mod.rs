//! Locates the App's PEM private key.
//!
//! Sources, in order: an explicit file path, the `PRIVATE_KEY` variable (raw,
//! base64 encoded, or with escaped newlines), the file named by
//! `PRIVATE_KEY_PATH`, and finally a single `*.pem` file in the working directory.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Env;

const BEGIN_MARKER: &str = "-----BEGIN";
const END_MARKER: &str = "-----END";
const PEM_LINE_WIDTH: usize = 64;

/// Private key lookup error.
#[derive(Debug, Error)]
pub enum PrivateKeyError {
    #[error(
        "the contents of PRIVATE_KEY could not be validated; expected a PEM key with BEGIN and END markers"
    )]
    InvalidContents,
    #[error("private key does not exist at path {}; check PRIVATE_KEY_PATH", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read private key {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to scan {} for private keys: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("found several private keys: {}; set PRIVATE_KEY_PATH to pick one", .0.join(", "))]
    Ambiguous(Vec<String>),
}

/// Loads a private key relative to a working directory.
#[derive(Debug, Clone)]
pub struct PrivateKeyLoader {
    cwd: PathBuf,
    filepath: Option<PathBuf>,
}

impl PrivateKeyLoader {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            filepath: None,
        }
    }

    /// Reads the key from this file, ignoring the environment.
    pub fn with_filepath(mut self, filepath: impl Into<PathBuf>) -> Self {
        self.filepath = Some(filepath.into());
        self
    }

    /// Returns the key text, or `None` when no source provides one.
    pub fn load(&self, env: &Env) -> Result<Option<String>, PrivateKeyError> {
        if let Some(ref filepath) = self.filepath {
            return read_key(&self.cwd.join(filepath)).map(Some);
        }

        if let Some(value) = env.non_empty("PRIVATE_KEY") {
            return normalize_key(value).map(Some);
        }

        if let Some(relative) = env.non_empty("PRIVATE_KEY_PATH") {
            let path = self.cwd.join(relative);
            if !path.exists() {
                return Err(PrivateKeyError::NotFound(PathBuf::from(relative)));
            }
            return read_key(&path).map(Some);
        }

        let mut pem_files = self.pem_files()?;
        match pem_files.len() {
            0 => Ok(None),
            1 => read_key(&self.cwd.join(pem_files.remove(0))).map(Some),
            _ => Err(PrivateKeyError::Ambiguous(pem_files)),
        }
    }

    /// Names of `*.pem` files directly inside the working directory, sorted.
    fn pem_files(&self) -> Result<Vec<String>, PrivateKeyError> {
        let entries = fs::read_dir(&self.cwd).map_err(|source| PrivateKeyError::ReadDir {
            path: self.cwd.clone(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".pem"))
            .collect();
        names.sort();
        Ok(names)
    }
}

impl Default for PrivateKeyLoader {
    fn default() -> Self {
        Self::new(".")
    }
}

fn read_key(path: &Path) -> Result<String, PrivateKeyError> {
    fs::read_to_string(path).map_err(|source| PrivateKeyError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Turns the `PRIVATE_KEY` value into PEM text.
pub(crate) fn normalize_key(value: &str) -> Result<String, PrivateKeyError> {
    let mut key = if value.contains(BEGIN_MARKER) {
        value.to_string()
    } else {
        decode_base64(value).unwrap_or_else(|| value.to_string())
    };

    if !key.contains(BEGIN_MARKER) || !key.contains(END_MARKER) {
        return Err(PrivateKeyError::InvalidContents);
    }

    if key.contains("\\n") {
        key = key.replace("\\n", "\n");
    }
    if !key.contains('\n') {
        key = rewrap(&key).ok_or(PrivateKeyError::InvalidContents)?;
    }

    Ok(key)
}

fn decode_base64(value: &str) -> Option<String> {
    let compact: String = value.split_whitespace().collect();
    let bytes = STANDARD.decode(compact).ok()?;
    String::from_utf8(bytes).ok()
}

/// Restores line breaks in a PEM key that was flattened onto one line.
fn rewrap(key: &str) -> Option<String> {
    let begin = key.find(BEGIN_MARKER)?;
    let header_end = begin + BEGIN_MARKER.len() + key[begin + BEGIN_MARKER.len()..].find("-----")? + 5;
    let footer_start = key.find(END_MARKER)?;
    if footer_start < header_end {
        return None;
    }

    let header = &key[begin..header_end];
    let footer = key[footer_start..].trim_end();
    let body: String = key[header_end..footer_start].split_whitespace().collect();

    let mut lines = vec![header.to_string()];
    lines.extend(
        body.as_bytes()
            .chunks(PEM_LINE_WIDTH)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned()),
    );
    lines.push(footer.to_string());
    Some(lines.join("\n") + "\n")
}

#[cfg(test)]
mod tests;

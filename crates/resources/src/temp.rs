//! Temporary files as managed resources
//!
//! [`TempFileFactory`] creates uniquely named files in a fixed directory and
//! persists them immediately, so a file lives exactly as long as the
//! [`ManagedResource`](crate::ManagedResource) that owns it. Nothing is
//! removed at process exit unless a manager released it.

use std::fmt;
use std::path::{Path, PathBuf};

use tempshare_config::Config;
use tempshare_errors::{Error, ResourceError};
use tracing::debug;

use crate::resource::{Resource, ResourceFactory};

/// Compression formats recognised from a file suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Bzip2,
    Xz,
    Zstd,
    Zip,
    Lz4,
}

impl Compression {
    /// Detect compression from the final extension of `name`
    #[must_use]
    pub fn detect(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "gz" | "tgz" => Some(Self::Gzip),
            "bz2" | "tbz2" => Some(Self::Bzip2),
            "xz" | "txz" => Some(Self::Xz),
            "zst" => Some(Self::Zstd),
            "zip" => Some(Self::Zip),
            "lz4" => Some(Self::Lz4),
            _ => None,
        }
    }
}

/// A validated file-name suffix such as `.csv` or `.csv.gz`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempSuffix(String);

impl TempSuffix {
    /// Parse a suffix, adding a leading dot if it is missing.
    ///
    /// The text after the dot is kept verbatim; a compression extension in
    /// particular is never rewritten.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::InvalidSuffix` for empty suffixes and suffixes
    /// containing a path separator.
    pub fn parse(raw: &str) -> Result<Self, ResourceError> {
        let invalid = |reason: &str| ResourceError::InvalidSuffix {
            suffix: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.contains(std::path::is_separator) {
            return Err(invalid("contains a path separator"));
        }
        if raw.contains('\0') {
            return Err(invalid("contains a NUL byte"));
        }

        let body = raw.strip_prefix('.').unwrap_or(raw);
        if body.is_empty() || body.chars().all(|c| c == '.') {
            return Err(invalid("no extension after the dot"));
        }

        Ok(Self(format!(".{body}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compression implied by the final extension
    #[must_use]
    pub fn compression(&self) -> Option<Compression> {
        Compression::detect(&self.0)
    }
}

impl fmt::Display for TempSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted temporary file; closing it deletes the file
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    name: String,
}

impl TempFile {
    /// Take ownership of an existing file
    #[must_use]
    pub fn from_path(path: PathBuf) -> Self {
        let name = path.to_string_lossy().into_owned();
        Self { path, name }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compression implied by the file name
    #[must_use]
    pub fn compression(&self) -> Option<Compression> {
        Compression::detect(&self.name)
    }
}

impl Resource for TempFile {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn close(&mut self) -> Result<(), ResourceError> {
        std::fs::remove_file(&self.path).map_err(|e| ResourceError::close_failed(&self.name, &e))
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// Creates uniquely named [`TempFile`]s in one directory
#[derive(Debug, Clone)]
pub struct TempFileFactory {
    dir: PathBuf,
    prefix: String,
    random_len: usize,
}

impl TempFileFactory {
    /// Factory for `dir` with the default prefix and name length
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let defaults = Config::default();
        Self {
            dir: dir.into(),
            prefix: defaults.temp.prefix,
            random_len: defaults.temp.random_len,
        }
    }

    /// Factory configured from the `[temp]` section
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            dir: config.temp_dir(),
            prefix: config.temp.prefix.clone(),
            random_len: config.temp.random_len,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Create a new empty file, optionally ending in `suffix`
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::CreateFailed` if the directory cannot be
    /// created or the file cannot be created and persisted.
    pub fn create_file(&self, suffix: Option<&TempSuffix>) -> Result<TempFile, Error> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ResourceError::create_failed(&self.dir, &e))?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.prefix).rand_bytes(self.random_len);
        if let Some(suffix) = suffix {
            builder.suffix(suffix.as_str());
        }

        let file = builder
            .tempfile_in(&self.dir)
            .map_err(|e| ResourceError::create_failed(&self.dir, &e))?;
        let path = file
            .into_temp_path()
            .keep()
            .map_err(|e| ResourceError::create_failed(&self.dir, &e.error))?;

        let temp = TempFile::from_path(path);
        debug!(
            path = %temp.path.display(),
            compression = ?temp.compression(),
            "created temp file"
        );
        Ok(temp)
    }
}

impl Default for TempFileFactory {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ResourceFactory for TempFileFactory {
    fn create(&self) -> Result<Box<dyn Resource>, Error> {
        Ok(Box::new(self.create_file(None)?))
    }
}

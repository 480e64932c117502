//! Deployment settings, read from TOML.
//!
//! ```toml
//! stream_prefix = "prod:"
//! run_inline = false
//! progress = { every_chunks = 100 }
//!
//! [store]
//! kind = "fs"
//! root = "/srv/objects"
//!
//! [database]
//! path = "/var/lib/fixity/records"
//! ```
//!
//! Every field is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::ProgressPolicy;
use crate::effects::{DEFAULT_FS_CHUNK_SIZE, JobOptions};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Prepended to every broadcast topic.
    pub stream_prefix: String,

    /// Await jobs in the creating task instead of spawning them.
    pub run_inline: bool,

    pub progress: ProgressPolicy,

    pub store: StoreSettings,

    pub database: DatabaseSettings,
}

/// Where objects are read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum StoreSettings {
    /// Objects registered at runtime; nothing persists.
    Memory,

    /// `<root>/<bucket>/<path>` on the local filesystem.
    Fs {
        root:       PathBuf,
        #[serde(default = "default_chunk_size")]
        chunk_size: usize,
    },

    /// Path-style `GET <endpoint>/<bucket>/<path>`.
    Http { endpoint: String },
}

fn default_chunk_size() -> usize { DEFAULT_FS_CHUNK_SIZE }

impl Default for StoreSettings {
    fn default() -> Self {
        Self::Fs {
            root:       PathBuf::from("."),
            chunk_size: DEFAULT_FS_CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSettings {
    /// sled database directory. Records stay in memory when unset.
    pub path: Option<PathBuf>,
}

impl Settings {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let settings = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn job_options(&self) -> JobOptions {
        JobOptions {
            stream_prefix: self.stream_prefix.clone(),
            progress:      self.progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU64;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.stream_prefix, "");
        assert!(!settings.run_inline);
        assert_eq!(settings.progress, ProgressPolicy::every_chunks(NonZeroU64::new(100).unwrap()));
        assert_eq!(settings.database.path, None);
        assert!(matches!(settings.store, StoreSettings::Fs { chunk_size: DEFAULT_FS_CHUNK_SIZE, .. }));
    }

    #[test]
    fn test_full_file() {
        let settings = Settings::from_toml(
            r#"
            stream_prefix = "prod:"
            run_inline = true
            progress = { interval_ms = 5000 }

            [store]
            kind = "http"
            endpoint = "http://localhost:9000"

            [database]
            path = "/var/lib/fixity"
            "#,
        )
        .unwrap();

        assert_eq!(settings.stream_prefix, "prod:");
        assert!(settings.run_inline);
        assert_eq!(settings.progress, ProgressPolicy::interval(Duration::from_secs(5)));
        assert_eq!(settings.store, StoreSettings::Http {
            endpoint: "http://localhost:9000".into(),
        });
        assert_eq!(settings.database.path.as_deref(), Some(Path::new("/var/lib/fixity")));

        let options = settings.job_options();
        assert_eq!(options.stream_prefix, "prod:");
        assert_eq!(options.progress, settings.progress);
    }

    #[test]
    fn test_fs_store_chunk_size() {
        let settings = Settings::from_toml(
            r#"
            [store]
            kind = "fs"
            root = "/data"
            chunk_size = 4096
            "#,
        )
        .unwrap();
        assert_eq!(settings.store, StoreSettings::Fs {
            root:       "/data".into(),
            chunk_size: 4096,
        });
    }

    #[test]
    fn test_one_progress_policy_only() {
        let err = Settings::from_toml("progress = { every_chunks = 10, interval_ms = 10 }").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Settings::from_toml("progress = { every_chunks = 0 }").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_store_and_fields() {
        assert!(Settings::from_toml("[store]\nkind = \"s3\"").is_err());
        assert!(Settings::from_toml("stream_prefx = \"typo\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixity.toml");
        std::fs::write(&path, "stream_prefix = \"x:\"\n[store]\nkind = \"memory\"\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.stream_prefix, "x:");
        assert_eq!(settings.store, StoreSettings::Memory);

        assert!(matches!(Settings::load(dir.path().join("missing.toml")), Err(Error::Config(_))));
    }
}

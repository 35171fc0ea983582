//! Backend configuration, read from RON.
//!
//! ```ron
//! (
//!     batch_size: 5000,
//!     id_scheme: sha256_name_v5,
//! )
//! ```
//!
//! Every field is optional. `id_scheme` records which derivation the stored
//! identifiers were minted under; switching it is a data migration.

use std::path::Path;

use assembler_types::IdScheme;
use serde::{Deserialize, Serialize};

use crate::batch;
use crate::error::ConfigError;

/// Default batch size for bulk writes and `IN (...)` lookups.
pub const DEFAULT_BATCH_SIZE: usize = 5000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Maximum items per bulk statement.
    pub batch_size: usize,
    /// Content-addressed ID derivation in force for this store.
    pub id_scheme: IdScheme,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            id_scheme: IdScheme::CURRENT,
        }
    }
}

impl BackendConfig {
    /// Parse and validate a RON document.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: BackendConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&text)?;
        tracing::info!(
            path = %path.display(),
            batch_size = config.batch_size,
            id_scheme = ?config.id_scheme,
            "loaded backend config"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        Ok(())
    }

    /// Split `items` into batches of the configured size.
    pub fn chunk<'a, T>(&self, items: &'a [T]) -> Vec<&'a [T]> {
        batch::chunk(items, self.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BackendConfig::default();
        assert_eq!(config.batch_size, 5000);
        assert_eq!(config.id_scheme, IdScheme::Sha256NameV5);
    }

    #[test]
    fn test_parse_full() {
        let config =
            BackendConfig::from_ron("(batch_size: 250, id_scheme: sha256_name_v5)").unwrap();
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.id_scheme, IdScheme::Sha256NameV5);
    }

    #[test]
    fn test_missing_fields_default() {
        let config = BackendConfig::from_ron("(id_scheme: sha256_name_v5)").unwrap();
        assert_eq!(config, BackendConfig::default());

        let config = BackendConfig::from_ron("(batch_size: 10)").unwrap();
        assert_eq!(config.id_scheme, IdScheme::CURRENT);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = BackendConfig::from_ron("(batch_size: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBatchSize));
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        let err = BackendConfig::from_ron("(id_scheme: md5_v3)").unwrap_err();
        assert!(matches!(err, ConfigError::Ron(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(batch_size: 2)").unwrap();
        let config = BackendConfig::load(file.path()).unwrap();
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.chunk(&[1, 2, 3]), vec![&[1, 2][..], &[3][..]]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BackendConfig::load(dir.path().join("absent.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

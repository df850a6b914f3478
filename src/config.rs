// Connection settings read once from the JSON data file.

use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::io;
use std::path::Path;

/// Contents of `data.json`. Unknown keys are ignored and missing keys are
/// left empty; a bad URL or user only shows up when the API rejects it.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    #[serde(rename = "pideaUrl")]
    pub url: String,
    #[serde(rename = "pideaApiUser")]
    pub api_user: String,
    #[serde(rename = "pideaRealm")]
    pub realm: Option<String>,
}

impl ApiConfig {
    /// Read and parse the data file at `path`.
    pub fn load(path: &Path) -> AppResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AppError::ConfigMissing(path.to_path_buf()),
            _ => AppError::fs("failed to read data file", path, e),
        })?;
        Self::from_slice(&bytes).map_err(|source| AppError::ConfigInvalid {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Pick the realm to export. A `--realm` value other than `NONE` wins,
    /// then a non-empty `pideaRealm` from the file.
    pub fn resolve_realm(&self, flag: &str) -> AppResult<String> {
        let flag = flag.trim();
        if !flag.is_empty() && !flag.eq_ignore_ascii_case(crate::cli::REALM_UNSET) {
            return Ok(flag.to_string());
        }
        match self.realm.as_deref().map(str::trim) {
            Some(realm) if !realm.is_empty() => Ok(realm.to_string()),
            _ => Err(AppError::RealmMissing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_known_keys_and_ignores_others() {
        let cfg = ApiConfig::from_slice(
            br#"{"pideaUrl":"https://pi.example","pideaApiUser":"svc","pideaRealm":"corp","extra":1}"#,
        )
        .unwrap();
        assert_eq!(cfg.url, "https://pi.example");
        assert_eq!(cfg.api_user, "svc");
        assert_eq!(cfg.realm.as_deref(), Some("corp"));
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let cfg = ApiConfig::from_slice(br#"{"pideaUrl":"https://pi.example"}"#).unwrap();
        assert_eq!(cfg.api_user, "");
        assert_eq!(cfg.realm, None);
    }

    #[test]
    fn load_reports_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.json");
        assert!(matches!(ApiConfig::load(&path), Err(AppError::ConfigMissing(p)) if p == path));
    }

    #[test]
    fn load_reports_invalid_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ApiConfig::load(&path),
            Err(AppError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn realm_flag_overrides_file() {
        let cfg = ApiConfig {
            realm: Some("from-file".into()),
            ..Default::default()
        };
        assert_eq!(cfg.resolve_realm("cli").unwrap(), "cli");
        assert_eq!(cfg.resolve_realm("NONE").unwrap(), "from-file");
        assert_eq!(cfg.resolve_realm("none").unwrap(), "from-file");
    }

    #[test]
    fn realm_missing_everywhere_is_an_error() {
        let cfg = ApiConfig {
            realm: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(cfg.resolve_realm("NONE"), Err(AppError::RealmMissing)));
        assert!(matches!(
            ApiConfig::default().resolve_realm(""),
            Err(AppError::RealmMissing)
        ));
    }
}

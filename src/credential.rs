//! API key handling and persistence.
//!
//! The key is held in a [`Credential`] and handed to the pipeline through a
//! [`TransformConfig`]. [`CredentialStore`] keeps one copy on disk between
//! sessions.

use crate::error::{PhotoStyleError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable consulted for the key.
pub const API_KEY_ENV_VAR: &str = "GOOGLE_API_KEY";

/// File name the key is stored under.
const STORE_KEY: &str = "gemini-api-key";

/// Directory under the platform config dir.
const APP_DIR: &str = "photostyle";

/// An access credential for the remote service.
///
/// Only non-emptiness is checked; the content is opaque.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Creates a credential, trimming surrounding whitespace.
    ///
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(key: impl AsRef<str>) -> Option<Self> {
        let key = key.as_ref().trim();
        (!key.is_empty()).then(|| Self(key.to_string()))
    }

    /// Returns the raw key.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns the key with all but its last four characters masked.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let visible = chars.len().min(4);
        let tail: String = chars[chars.len() - visible..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - visible), tail)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(\"[REDACTED]\")")
    }
}

/// Per-call settings for a transform.
///
/// Passed explicitly so the pipeline has no hidden state.
#[derive(Debug, Clone, Default)]
pub struct TransformConfig {
    /// Key sent with the request. `None` fails fast with `MissingCredential`.
    pub credential: Option<Credential>,
}

impl TransformConfig {
    /// Creates a config carrying the given key.
    ///
    /// Surrounding whitespace is trimmed before the key is sent, and a
    /// whitespace-only key counts as absent, so the transform fails with
    /// `MissingCredential` instead of reaching the service.
    pub fn new(api_key: impl AsRef<str>) -> Self {
        Self {
            credential: Credential::new(api_key),
        }
    }

    /// Resolves the key from an explicit value, then `GOOGLE_API_KEY`,
    /// then the given store.
    pub fn resolve(explicit: Option<&str>, store: &CredentialStore) -> Result<Self> {
        let credential = match explicit.and_then(Credential::new) {
            Some(credential) => Some(credential),
            None => match std::env::var(API_KEY_ENV_VAR).ok().and_then(Credential::new) {
                Some(credential) => Some(credential),
                None => store.load()?,
            },
        };

        Ok(Self { credential })
    }
}

/// File-backed store holding a single key.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Uses `<config dir>/photostyle/gemini-api-key`.
    pub fn open_default() -> Result<Self> {
        let dir = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .ok_or_else(|| {
                PhotoStyleError::InvalidInput("could not determine a config directory".into())
            })?;
        Ok(Self::in_dir(dir.join(APP_DIR)))
    }

    /// Uses `<dir>/gemini-api-key`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STORE_KEY),
        }
    }

    /// Returns the file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored key. Missing or blank files yield `None`.
    pub fn load(&self) -> Result<Option<Credential>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Credential::new(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Stores a trimmed key, replacing any previous one.
    ///
    /// Blank input is rejected and nothing is written.
    pub fn save(&self, key: &str) -> Result<Credential> {
        let credential = Credential::new(key)
            .ok_or_else(|| PhotoStyleError::InvalidInput("API key must not be empty".into()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, credential.expose())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        tracing::debug!(path = %self.path.display(), "stored API key");
        Ok(credential)
    }

    /// Removes the stored key. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_rejects_blank() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   \n").is_none());
        assert_eq!(Credential::new("  abc  ").unwrap().expose(), "abc");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("secret-key").unwrap();
        assert!(!format!("{credential:?}").contains("secret"));
    }

    #[test]
    fn test_credential_masked() {
        assert_eq!(Credential::new("abcdefgh").unwrap().masked(), "****efgh");
        assert_eq!(Credential::new("ab").unwrap().masked(), "ab");
    }

    #[test]
    fn test_config_blank_key_is_absent() {
        assert!(TransformConfig::new("  ").credential.is_none());
        assert!(TransformConfig::new("\t\n").credential.is_none());
        let config = TransformConfig::new("  k  ");
        assert_eq!(config.credential.unwrap().expose(), "k");
    }

    #[test]
    fn test_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::in_dir(dir.path().join("nested"));

        assert_eq!(store.load().unwrap(), None);

        store.save("  my-key\n").unwrap();
        assert_eq!(store.load().unwrap().unwrap().expose(), "my-key");

        store.save("other").unwrap();
        assert_eq!(store.load().unwrap().unwrap().expose(), "other");

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_store_rejects_blank_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::in_dir(dir.path());

        let err = store.save("   ").unwrap_err();
        assert!(matches!(err, PhotoStyleError::InvalidInput(_)));
        assert!(!store.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_store_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::in_dir(dir.path());
        store.save("key").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    /// Holds `GOOGLE_API_KEY` at a fixed value and restores it on drop.
    struct EnvKeyGuard {
        previous: Option<String>,
        _lock: std::sync::MutexGuard<'static, ()>,
    }

    impl EnvKeyGuard {
        fn set(value: Option<&str>) -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            let previous = std::env::var(API_KEY_ENV_VAR).ok();
            match value {
                Some(v) => std::env::set_var(API_KEY_ENV_VAR, v),
                None => std::env::remove_var(API_KEY_ENV_VAR),
            }
            Self {
                previous,
                _lock: lock,
            }
        }
    }

    impl Drop for EnvKeyGuard {
        fn drop(&mut self) {
            match &self.previous {
                Some(v) => std::env::set_var(API_KEY_ENV_VAR, v),
                None => std::env::remove_var(API_KEY_ENV_VAR),
            }
        }
    }

    fn store_with(key: Option<&str>) -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::in_dir(dir.path());
        if let Some(key) = key {
            store.save(key).unwrap();
        }
        (dir, store)
    }

    #[test]
    fn test_resolve_env_beats_store() {
        let _env = EnvKeyGuard::set(Some("from-env"));
        let (_dir, store) = store_with(Some("stored"));

        let config = TransformConfig::resolve(None, &store).unwrap();
        assert_eq!(config.credential.unwrap().expose(), "from-env");
    }

    #[test]
    fn test_resolve_blank_explicit_key_falls_through() {
        let _env = EnvKeyGuard::set(Some("from-env"));
        let (_dir, store) = store_with(Some("stored"));

        let config = TransformConfig::resolve(Some("   "), &store).unwrap();
        assert_eq!(config.credential.unwrap().expose(), "from-env");
    }

    #[test]
    fn test_resolve_falls_back_to_store() {
        let _env = EnvKeyGuard::set(None);
        let (_dir, store) = store_with(Some("stored"));

        let config = TransformConfig::resolve(Some(""), &store).unwrap();
        assert_eq!(config.credential.unwrap().expose(), "stored");
    }

    #[test]
    fn test_resolve_blank_env_falls_back_to_store() {
        let _env = EnvKeyGuard::set(Some("  "));
        let (_dir, store) = store_with(Some("stored"));

        let config = TransformConfig::resolve(None, &store).unwrap();
        assert_eq!(config.credential.unwrap().expose(), "stored");
    }

    #[test]
    fn test_resolve_without_any_key() {
        let _env = EnvKeyGuard::set(None);
        let (_dir, store) = store_with(None);

        let config = TransformConfig::resolve(None, &store).unwrap();
        assert!(config.credential.is_none());
    }

    #[test]
    fn test_resolve_prefers_explicit_key() {
        let _env = EnvKeyGuard::set(Some("from-env"));
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::in_dir(dir.path());
        store.save("stored").unwrap();

        let config = TransformConfig::resolve(Some("explicit"), &store).unwrap();
        assert_eq!(config.credential.unwrap().expose(), "explicit");
    }
}

//! Credential store — AI provider selection and per-provider API keys.
//!
//! DESIGN
//! ======
//! Storage goes through the [`KeyValueStore`] trait so the binary can persist
//! to a JSON file while tests use [`MemoryStore`]. Keys mirror a flat
//! key-value layout: `ai_provider` holds the active provider and
//! `{provider}_api_key` holds each provider's key, so switching providers
//! never loses a previously entered key.
//!
//! ERROR HANDLING
//! ==============
//! Storage is treated as always available. `FileStore` logs write failures
//! and keeps serving its in-memory copy instead of surfacing errors.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

pub const ACTIVE_PROVIDER_KEY: &str = "ai_provider";

// =============================================================================
// PROVIDER
// =============================================================================

/// External AI vendor whose key is passed through to the suggestion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Provider {
    OpenAi,
    #[default]
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAi, Provider::Gemini];

    /// Wire identifier, as sent in `X-AI-Provider`.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Gemini",
        }
    }

    /// Header carrying this provider's API key.
    #[must_use]
    pub fn key_header(self) -> &'static str {
        match self {
            Self::OpenAi => "x-openai-api-key",
            Self::Gemini => "x-gemini-api-key",
        }
    }

    fn storage_key(self) -> String {
        format!("{}_api_key", self.id())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider '{0}' (expected 'openai' or 'gemini')")]
pub struct ProviderParseError(pub String);

impl FromStr for Provider {
    type Err = ProviderParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            _ => Err(ProviderParseError(raw.to_owned())),
        }
    }
}

/// The active provider together with its key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub provider: Provider,
    pub api_key: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// BACKING STORES
// =============================================================================

/// Durable string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store; contents vanish with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// JSON-object file store. The whole file is rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing, unreadable, or malformed file
    /// yields an empty store; a malformed file is first renamed to
    /// `<path>.bak` so the next write cannot destroy it.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    set_aside(&path, &e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "credential file unreadable; starting empty");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        if let Err(e) = self.write_file() {
            warn!(path = %self.path.display(), error = %e, "credential file write failed");
        }
    }

    /// Owner-only on unix: new directories get `0o700` and the file is
    /// always left at `0o600`, including a pre-existing one.
    fn write_file(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            let mut dirs = std::fs::DirBuilder::new();
            dirs.recursive(true);
            #[cfg(unix)]
            std::os::unix::fs::DirBuilderExt::mode(&mut dirs, 0o700);
            dirs.create(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.entries)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        std::os::unix::fs::OpenOptionsExt::mode(&mut options, 0o600);
        let mut file = options.open(&self.path)?;
        #[cfg(unix)]
        file.set_permissions(std::os::unix::fs::PermissionsExt::from_mode(0o600))?;
        file.write_all(raw.as_bytes())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.persist();
        }
    }
}

/// `<path>.bak`, next to the credential file.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

fn set_aside(path: &Path, parse_error: &serde_json::Error) {
    let backup = backup_path(path);
    match std::fs::rename(path, &backup) {
        Ok(()) => warn!(
            path = %path.display(),
            backup = %backup.display(),
            error = %parse_error,
            "credential file malformed; moved aside, starting empty"
        ),
        Err(e) => warn!(
            path = %path.display(),
            error = %parse_error,
            rename_error = %e,
            "credential file malformed and could not be moved aside; starting empty"
        ),
    }
}

// =============================================================================
// CREDENTIAL STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct CredentialStore<S> {
    store: S,
}

impl<S: KeyValueStore> CredentialStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn backing(&self) -> &S {
        &self.store
    }

    /// Persist `api_key` for `provider` and make it the active provider.
    pub fn save(&mut self, provider: Provider, api_key: &str) {
        self.store.set(&provider.storage_key(), api_key);
        self.store.set(ACTIVE_PROVIDER_KEY, provider.id());
        info!(%provider, "credential saved");
    }

    /// Saved key for `provider`, or an empty string.
    pub fn load(&self, provider: Provider) -> String {
        self.store.get(&provider.storage_key()).unwrap_or_default()
    }

    /// Remove the active-provider marker and every provider key.
    pub fn clear(&mut self) {
        self.store.remove(ACTIVE_PROVIDER_KEY);
        for provider in Provider::ALL {
            self.store.remove(&provider.storage_key());
        }
        info!("credentials cleared");
    }

    /// Last-saved provider, or [`Provider::default`] when none is stored.
    pub fn active_provider(&self) -> Provider {
        self.stored_provider().unwrap_or_default()
    }

    /// Switch the active provider without touching any stored key.
    pub fn set_active_provider(&mut self, provider: Provider) {
        self.store.set(ACTIVE_PROVIDER_KEY, provider.id());
        debug!(%provider, "active provider switched");
    }

    /// Credential to attach to outbound requests. Present only when a
    /// provider has been selected AND that provider has a non-empty key.
    pub fn credential(&self) -> Option<Credential> {
        let provider = self.stored_provider()?;
        let api_key = self.load(provider);
        if api_key.is_empty() {
            return None;
        }
        Some(Credential { provider, api_key })
    }

    fn stored_provider(&self) -> Option<Provider> {
        let raw = self.store.get(ACTIVE_PROVIDER_KEY)?;
        match raw.parse() {
            Ok(provider) => Some(provider),
            Err(e) => {
                warn!(error = %e, "ignoring stored provider");
                None
            }
        }
    }
}

// =============================================================================
// SHARING
// =============================================================================

/// Read side of the credential store used by the suggestion client. Reads
/// happen at call time so changes made through settings apply immediately.
pub trait CredentialSource: Send + Sync {
    fn credential(&self) -> Option<Credential>;
}

pub type SharedCredentials<S> = Arc<Mutex<CredentialStore<S>>>;

/// Wrap `store` for sharing between the client and the settings surface.
pub fn shared<S: KeyValueStore>(store: S) -> SharedCredentials<S> {
    Arc::new(Mutex::new(CredentialStore::new(store)))
}

impl<S: KeyValueStore + Send> CredentialSource for Mutex<CredentialStore<S>> {
    fn credential(&self) -> Option<Credential> {
        self.lock().unwrap_or_else(PoisonError::into_inner).credential()
    }
}

#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;

//! Persistent access/refresh token storage
//!
//! Two small JSON files live in the token directory:
//!
//! - `emo-platform-api.json` holds the latest pair issued by the platform.
//! - `emo-platform-api_previous.json` remembers the credentials last supplied
//!   by the caller or the environment.
//!
//! When the caller supplies credentials that differ from the remembered ones,
//! the saved pair is discarded so the new credentials take effect. When the
//! caller supplies nothing, the saved pair is used as-is.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use emo_domain::constants::{ENV_REFRESH_TOKEN, PREVIOUS_TOKEN_FILE_NAME, TOKEN_FILE_NAME};
use emo_domain::{EmoPlatformError, EmoTokens, Result, Tokens};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// On-disk token pair. Missing tokens are stored as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    access_token: String,
}

impl StoredTokens {
    const fn is_empty(&self) -> bool {
        self.refresh_token.is_empty() && self.access_token.is_empty()
    }
}

impl From<Tokens> for StoredTokens {
    fn from(tokens: Tokens) -> Self {
        Self {
            refresh_token: tokens.refresh_token.unwrap_or_default(),
            access_token: tokens.access_token.unwrap_or_default(),
        }
    }
}

/// Where a refresh token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// The token file written after the last successful refresh.
    Saved,
    /// Explicit credentials or the environment.
    Initial,
}

/// A refresh token to try, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCandidate {
    pub source: TokenSource,
    pub token: String,
}

#[derive(Debug)]
struct TokenState {
    saved: StoredTokens,
    access_token: String,
}

/// Token store shared by a client and its room clients.
#[derive(Debug)]
pub struct TokenStore {
    token_file: PathBuf,
    previous_file: PathBuf,
    initial: StoredTokens,
    state: Mutex<TokenState>,
}

impl TokenStore {
    /// Open the store in `dir`, creating the directory when needed.
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory holding the token files
    /// * `explicit` - Credentials passed by the caller; win over `env`
    /// * `env` - Credentials read from the environment
    /// * `use_cached_credentials` - Trust the saved file and skip change
    ///   detection
    ///
    /// # Errors
    ///
    /// Returns `Token` when no access token and no refresh token is available
    /// from any source, or `Io` when the token files cannot be written.
    pub fn open(
        dir: &Path,
        explicit: Tokens,
        env: Tokens,
        use_cached_credentials: bool,
    ) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let token_file = dir.join(TOKEN_FILE_NAME);
        let previous_file = dir.join(PREVIOUS_TOKEN_FILE_NAME);

        let initial = StoredTokens::from(if explicit.is_empty() { env } else { explicit });

        let saved = if use_cached_credentials || initial.is_empty() {
            read_tokens(&token_file)?.unwrap_or_default()
        } else {
            let previous = read_tokens(&previous_file)?.unwrap_or_default();
            if previous == initial {
                match read_tokens(&token_file)? {
                    Some(saved) => saved,
                    None => {
                        write_tokens(&token_file, &StoredTokens::default())?;
                        StoredTokens::default()
                    }
                }
            } else {
                info!(path = %token_file.display(), "Credentials changed, resetting saved tokens");
                write_tokens(&previous_file, &initial)?;
                write_tokens(&token_file, &StoredTokens::default())?;
                StoredTokens::default()
            }
        };

        let access_token = if saved.access_token.is_empty() {
            initial.access_token.clone()
        } else {
            saved.access_token.clone()
        };

        if access_token.is_empty() && saved.refresh_token.is_empty() && initial.refresh_token.is_empty()
        {
            return Err(EmoPlatformError::Token(format!(
                "No credentials available. Please set a refresh token as environment variable '{ENV_REFRESH_TOKEN}'"
            )));
        }

        debug!(
            path = %token_file.display(),
            saved_refresh = !saved.refresh_token.is_empty(),
            "Token store opened"
        );

        Ok(Self { token_file, previous_file, initial, state: Mutex::new(TokenState { saved, access_token }) })
    }

    /// Access token currently sent as bearer credential.
    pub fn access_token(&self) -> String {
        self.state.lock().access_token.clone()
    }

    /// Refresh tokens to try, saved token first.
    pub fn refresh_candidates(&self) -> Vec<RefreshCandidate> {
        let state = self.state.lock();
        let mut candidates = Vec::with_capacity(2);
        if !state.saved.refresh_token.is_empty() {
            candidates.push(RefreshCandidate {
                source: TokenSource::Saved,
                token: state.saved.refresh_token.clone(),
            });
        }
        if !self.initial.refresh_token.is_empty()
            && self.initial.refresh_token != state.saved.refresh_token
        {
            candidates.push(RefreshCandidate {
                source: TokenSource::Initial,
                token: self.initial.refresh_token.clone(),
            });
        }
        candidates
    }

    /// Use and persist a freshly issued token pair.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the token file cannot be written. The in-memory pair
    /// is updated either way.
    pub fn store(&self, tokens: &EmoTokens) -> Result<()> {
        let saved = StoredTokens {
            refresh_token: tokens.refresh_token.clone(),
            access_token: tokens.access_token.clone(),
        };
        {
            let mut state = self.state.lock();
            state.access_token = saved.access_token.clone();
            state.saved = saved.clone();
        }
        write_tokens(&self.token_file, &saved)
    }

    /// Record that the platform rejected a refresh token from `source`.
    ///
    /// A rejected saved token clears the token file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the token file cannot be written.
    pub fn reject(&self, source: TokenSource) -> Result<()> {
        match source {
            TokenSource::Saved => {
                warn!(path = %self.token_file.display(), "Saved refresh token rejected, clearing");
                self.state.lock().saved = StoredTokens::default();
                write_tokens(&self.token_file, &StoredTokens::default())
            }
            TokenSource::Initial => {
                warn!("Supplied refresh token rejected");
                Ok(())
            }
        }
    }

    /// Token pair currently held in the token file.
    pub fn saved_tokens(&self) -> Tokens {
        let state = self.state.lock();
        Tokens::new(Some(state.saved.access_token.clone()), Some(state.saved.refresh_token.clone()))
    }

    pub fn token_file(&self) -> &Path {
        &self.token_file
    }

    pub fn previous_file(&self) -> &Path {
        &self.previous_file
    }
}

fn read_tokens(path: &Path) -> Result<Option<StoredTokens>> {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(tokens) => Ok(Some(tokens)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable token file");
                Ok(None)
            }
        },
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_tokens(path: &Path, tokens: &StoredTokens) -> Result<()> {
    let contents = serde_json::to_string(tokens)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn tokens(access: &str, refresh: &str) -> Tokens {
        Tokens::new(Some(access.to_string()), Some(refresh.to_string()))
    }

    fn issued(access: &str, refresh: &str) -> EmoTokens {
        EmoTokens { access_token: access.to_string(), refresh_token: refresh.to_string() }
    }

    #[test]
    fn first_open_uses_initial_tokens_and_writes_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::open(dir.path(), Tokens::default(), tokens("a0", "r0"), false).unwrap();

        assert_eq!(store.access_token(), "a0");
        let snapshot = fs::read_to_string(store.previous_file()).unwrap();
        assert!(snapshot.contains("r0"));
        assert_eq!(store.refresh_candidates(), vec![RefreshCandidate {
            source: TokenSource::Initial,
            token: "r0".to_string()
        }]);
    }

    #[test]
    fn saved_tokens_survive_reopen_with_same_credentials() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::open(dir.path(), tokens("a0", "r0"), Tokens::default(), false).unwrap();
        store.store(&issued("a1", "r1")).unwrap();

        let reopened =
            TokenStore::open(dir.path(), tokens("a0", "r0"), Tokens::default(), false).unwrap();
        assert_eq!(reopened.access_token(), "a1");
        let sources: Vec<_> = reopened.refresh_candidates().into_iter().map(|c| c.source).collect();
        assert_eq!(sources, vec![TokenSource::Saved, TokenSource::Initial]);
    }

    #[test]
    fn changed_credentials_reset_saved_tokens() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::open(dir.path(), tokens("a0", "r0"), Tokens::default(), false).unwrap();
        store.store(&issued("a1", "r1")).unwrap();

        let reopened =
            TokenStore::open(dir.path(), tokens("b0", "s0"), Tokens::default(), false).unwrap();
        assert_eq!(reopened.access_token(), "b0");
        assert!(reopened.saved_tokens().is_empty());
    }

    #[test]
    fn missing_credentials_fall_back_to_saved_file() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::open(dir.path(), Tokens::default(), tokens("a0", "r0"), false).unwrap();
        store.store(&issued("a1", "r1")).unwrap();

        let reopened =
            TokenStore::open(dir.path(), Tokens::default(), Tokens::default(), false).unwrap();
        assert_eq!(reopened.access_token(), "a1");
    }

    #[test]
    fn explicit_tokens_win_over_environment() {
        let dir = TempDir::new().unwrap();
        let store =
            TokenStore::open(dir.path(), tokens("explicit", "r"), tokens("env", "r"), false).unwrap();
        assert_eq!(store.access_token(), "explicit");
    }

    #[test]
    fn cached_credentials_ignore_changes() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::open(dir.path(), tokens("a0", "r0"), Tokens::default(), false).unwrap();
        store.store(&issued("a1", "r1")).unwrap();

        let cached = TokenStore::open(dir.path(), tokens("b0", "s0"), Tokens::default(), true).unwrap();
        assert_eq!(cached.access_token(), "a1");
        assert_eq!(cached.refresh_candidates()[0].token, "r1");
    }

    #[test]
    fn no_credentials_anywhere_is_a_token_error() {
        let dir = TempDir::new().unwrap();
        let err = TokenStore::open(dir.path(), Tokens::default(), Tokens::default(), false).unwrap_err();
        assert!(matches!(err, EmoPlatformError::Token(_)));
    }

    #[test]
    fn rejected_saved_token_clears_file() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::open(dir.path(), tokens("a0", "r0"), Tokens::default(), false).unwrap();
        store.store(&issued("a1", "r1")).unwrap();

        store.reject(TokenSource::Saved).unwrap();
        let on_disk = fs::read_to_string(store.token_file()).unwrap();
        assert!(!on_disk.contains("r1"));
        assert_eq!(store.refresh_candidates().len(), 1);
        assert_eq!(store.refresh_candidates()[0].source, TokenSource::Initial);
    }

    #[test]
    fn corrupt_token_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(TOKEN_FILE_NAME), "not json").unwrap();
        let store = TokenStore::open(dir.path(), Tokens::default(), tokens("a0", "r0"), true).unwrap();
        assert_eq!(store.access_token(), "a0");
    }
}

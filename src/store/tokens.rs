use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::info;

use super::file_store::write_atomically;
use crate::error::Result;
use crate::model::UserId;

const TOKEN_BYTES: usize = 16;

#[derive(Default)]
struct Tokens {
    by_token: HashMap<String, UserId>,
    by_user: HashMap<UserId, String>,
}

impl Tokens {
    fn insert(&mut self, token: String, user: UserId) {
        self.by_user.insert(user, token.clone());
        self.by_token.insert(token, user);
    }
}

/// Maps each user to the secret token in their dashboard links.
pub struct TokenRegistry {
    path: Option<PathBuf>,
    tokens: RwLock<Tokens>,
}

impl TokenRegistry {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join("tokens.json");

        let mut tokens = Tokens::default();
        match fs::read(&path) {
            Ok(buf) => {
                let stored: HashMap<String, UserId> = serde_json::from_slice(&buf)
                    .map_err(|e| (format!("couldn't decode {}", path.display()), e))?;
                for (token, user) in stored {
                    tokens.insert(token, user);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => (),
            Err(e) => return Err((format!("couldn't read {}", path.display()), e).into()),
        }

        Ok(Self {
            path: Some(path),
            tokens: RwLock::new(tokens),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            tokens: RwLock::new(Tokens::default()),
        }
    }

    /// The user's token, issuing one on first use.
    pub fn token_for(&self, user: UserId) -> Result<String> {
        if let Some(token) = self.tokens.read().by_user.get(&user) {
            return Ok(token.clone());
        }

        let mut tokens = self.tokens.write();
        if let Some(token) = tokens.by_user.get(&user) {
            return Ok(token.clone());
        }

        let token = generate_token();
        tokens.insert(token.clone(), user);
        if let Err(e) = self.persist(&tokens) {
            tokens.by_token.remove(&token);
            tokens.by_user.remove(&user);
            return Err(e);
        }

        info!(user, "issued dashboard token");
        Ok(token)
    }

    pub fn user_for(&self, token: &str) -> Option<UserId> {
        self.tokens.read().by_token.get(token).copied()
    }

    fn persist(&self, tokens: &Tokens) -> Result<()> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };

        let buf =
            serde_json::to_vec(&tokens.by_token).map_err(|e| ("JSON serialization failed", e))?;
        write_atomically(path, &buf)
    }
}

fn generate_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_stable_per_user() -> Result<()> {
        let registry = TokenRegistry::in_memory();
        let first = registry.token_for(1)?;
        let second = registry.token_for(1)?;
        let other = registry.token_for(2)?;

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.len(), TOKEN_BYTES * 2);
        assert_eq!(registry.user_for(&first), Some(1));
        assert_eq!(registry.user_for(&other), Some(2));
        assert_eq!(registry.user_for("nope"), None);
        Ok(())
    }

    #[test]
    fn test_tokens_survive_reopen() -> Result<()> {
        let dir = tempfile::tempdir().map_err(|e| ("tempdir", e))?;
        let token = TokenRegistry::open(dir.path())?.token_for(99)?;

        let registry = TokenRegistry::open(dir.path())?;
        assert_eq!(registry.user_for(&token), Some(99));
        assert_eq!(registry.token_for(99)?, token);
        Ok(())
    }

    #[test]
    fn test_failed_persist_issues_no_token() -> Result<()> {
        let dir = tempfile::tempdir().map_err(|e| ("tempdir", e))?;
        let registry = TokenRegistry::open(dir.path())?;
        fs::create_dir(dir.path().join("tokens.json.tmp")).map_err(|e| ("mkdir", e))?;

        assert!(registry.token_for(5).is_err());
        assert!(registry.tokens.read().by_user.is_empty());
        assert!(registry.tokens.read().by_token.is_empty());
        Ok(())
    }
}

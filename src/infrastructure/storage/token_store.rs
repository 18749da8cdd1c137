//! 계정별 OAuth 토큰 저장소(보안 저장소에 JSON으로 보관).

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ports::{SecretStore, TokenRepository};
use crate::domain::error::StorageError;
use crate::domain::remote::Account;
use crate::domain::token::Token;

pub const TOKEN_SERVICE: &str = "repolink.remote-tokens";

pub struct TokenStore {
    secrets: Arc<dyn SecretStore>,
}

impl TokenStore {
    pub fn new(secrets: Arc<dyn SecretStore>) -> Self {
        Self { secrets }
    }
}

impl TokenRepository for TokenStore {
    fn save(&self, token: &Token, account: &Account) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(token)
            .map_err(|e| StorageError(format!("failed to encode token: {e}")))?;
        self.secrets
            .save(TOKEN_SERVICE, &account.token_key(), &encoded)?;
        debug!(account = %account.label(), "stored token");
        Ok(())
    }

    fn read(&self, account: &Account) -> Option<Token> {
        let key = account.token_key();
        let raw = match self.secrets.read(TOKEN_SERVICE, &key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(account = %account.label(), "failed to read token: {err}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(token) => Some(token),
            Err(err) => {
                warn!(account = %account.label(), "stored token is not valid JSON: {err}");
                None
            }
        }
    }

    fn delete(&self, account: &Account) -> Result<(), StorageError> {
        self.secrets.delete(TOKEN_SERVICE, &account.token_key())
    }
}

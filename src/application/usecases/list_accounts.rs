//! 연결된 계정과 토큰 상태 조회 유스케이스.

use crate::application::ports::{AccountRepository, TokenRepository};
use crate::domain::error::StorageError;
use crate::domain::remote::Account;
use crate::domain::token::now_unix_seconds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Valid,
    Expired,
    Missing,
}

impl TokenState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Expired => "expired",
            Self::Missing => "missing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountStatus {
    pub account: Account,
    pub token_state: TokenState,
}

pub struct ListAccountsUseCase<'a> {
    pub accounts: &'a dyn AccountRepository,
    pub tokens: &'a dyn TokenRepository,
}

impl<'a> ListAccountsUseCase<'a> {
    pub fn execute(&self) -> Result<Vec<AccountStatus>, StorageError> {
        let now = now_unix_seconds();
        Ok(self
            .accounts
            .load()?
            .into_iter()
            .map(|account| {
                let token_state = match self.tokens.read(&account) {
                    None => TokenState::Missing,
                    Some(token) if token.is_expired_at(now) => TokenState::Expired,
                    Some(_) => TokenState::Valid,
                };
                AccountStatus {
                    account,
                    token_state,
                }
            })
            .collect())
    }
}

/// 계정 선택자(id, `provider:username`, username)로 계정을 찾는다.
/// 선택자가 없으면 첫 번째 계정을 사용한다.
pub fn select_account<'b>(accounts: &'b [Account], selector: Option<&str>) -> Option<&'b Account> {
    let Some(selector) = selector.map(str::trim).filter(|s| !s.is_empty()) else {
        return accounts.first();
    };

    accounts
        .iter()
        .find(|a| a.id.to_string() == selector)
        .or_else(|| {
            accounts
                .iter()
                .find(|a| a.label().eq_ignore_ascii_case(selector))
        })
        .or_else(|| accounts.iter().find(|a| a.username == selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::remote::ProviderKind;

    fn account(provider: ProviderKind, username: &str) -> Account {
        Account::new(
            provider,
            username.to_string(),
            "hint".to_string(),
            String::new(),
            String::new(),
        )
    }

    #[test]
    fn selector_matches_id_label_or_username() {
        let accounts = vec![
            account(ProviderKind::GitHub, "octo"),
            account(ProviderKind::GitLab, "octo"),
            account(ProviderKind::GitLab, "alice"),
        ];

        assert_eq!(select_account(&accounts, None), Some(&accounts[0]));
        assert_eq!(select_account(&accounts, Some(" ")), Some(&accounts[0]));
        assert_eq!(
            select_account(&accounts, Some(&accounts[2].id.to_string())),
            Some(&accounts[2])
        );
        assert_eq!(
            select_account(&accounts, Some("gitlab:octo")),
            Some(&accounts[1])
        );
        assert_eq!(select_account(&accounts, Some("alice")), Some(&accounts[2]));
        assert_eq!(select_account(&accounts, Some("nobody")), None);
        assert_eq!(select_account(&[], None), None);
    }
}

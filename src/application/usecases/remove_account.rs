//! 연결된 계정 제거 유스케이스(저장된 토큰도 함께 삭제).

use tracing::{info, warn};

use crate::application::ports::{AccountRepository, TokenRepository};
use crate::domain::error::RemoveAccountError;
use crate::domain::remote::Account;

pub struct RemoveAccountUseCase<'a> {
    pub accounts: &'a dyn AccountRepository,
    pub tokens: &'a dyn TokenRepository,
}

impl<'a> RemoveAccountUseCase<'a> {
    pub fn execute(&self, account: &Account) -> Result<(), RemoveAccountError> {
        let mut accounts = self.accounts.load()?;
        let before = accounts.len();
        accounts.retain(|a| a != account);
        if accounts.len() == before {
            return Err(RemoveAccountError::NotFound(account.label()));
        }

        self.accounts.save(&accounts)?;
        // 같은 identity의 다른 레코드가 남아 있으면 토큰 키를 공유하므로 지우지 않는다.
        if !accounts.iter().any(|a| a.same_identity(account))
            && let Err(err) = self.tokens.delete(account)
        {
            warn!(account = %account.label(), "failed to delete token: {err}");
        }
        info!(account = %account.label(), "removed account");
        Ok(())
    }
}

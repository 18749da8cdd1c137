//! 연결된 계정 목록 저장소(`accounts.json`).

use std::path::PathBuf;

use crate::application::ports::AccountRepository;
use crate::domain::error::StorageError;
use crate::domain::remote::Account;

use super::json_file::JsonFileStore;

pub const ACCOUNTS_FILE: &str = "accounts.json";

pub struct AccountStore {
    file: JsonFileStore<Vec<Account>>,
}

impl AccountStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFileStore::new(path),
        }
    }
}

impl AccountRepository for AccountStore {
    fn load(&self) -> Result<Vec<Account>, StorageError> {
        self.file.load()
    }

    fn save(&self, accounts: &[Account]) -> Result<(), StorageError> {
        self.file.save(&accounts.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::remote::ProviderKind;

    #[test]
    fn accounts_round_trip_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = AccountStore::new(dir.path().join(ACCOUNTS_FILE));
        assert!(store.load().expect("load").is_empty());

        let accounts = vec![
            Account::new(
                ProviderKind::GitHub,
                "octo".to_string(),
                "abcd".to_string(),
                "https://github.com".to_string(),
                "https://api.github.com".to_string(),
            ),
            Account::new(
                ProviderKind::GitLab,
                "alice".to_string(),
                "wxyz".to_string(),
                "https://gitlab.com".to_string(),
                "https://gitlab.com/api/v4".to_string(),
            ),
        ];
        store.save(&accounts).expect("save");
        assert_eq!(store.load().expect("load"), accounts);

        let raw = std::fs::read_to_string(dir.path().join(ACCOUNTS_FILE)).expect("read");
        assert!(raw.contains("\"provider\": \"gitlab\""));
        assert!(!raw.contains("access_token"));
    }
}

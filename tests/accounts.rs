mod common;

use common::Stores;
use repolink::application::ports::{AccountRepository, TokenRepository};
use repolink::application::usecases::list_accounts::{ListAccountsUseCase, TokenState};
use repolink::application::usecases::remove_account::RemoveAccountUseCase;
use repolink::application::usecases::save_configuration::{
    ConfigurationPatch, SaveConfigurationUseCase,
};
use repolink::domain::error::RemoveAccountError;
use repolink::domain::remote::{Account, ProviderKind};
use repolink::domain::token::Token;
use repolink::infrastructure::storage::{ACCOUNTS_FILE, PROVIDERS_FILE};

fn account(provider: ProviderKind, username: &str) -> Account {
    Account::new(
        provider,
        username.to_string(),
        "abcd".to_string(),
        "https://example.com".to_string(),
        "https://example.com/api".to_string(),
    )
}

fn token(expires_in: Option<i64>, created_at: Option<i64>) -> Token {
    Token {
        access_token: "secret-abcd".to_string(),
        token_type: "bearer".to_string(),
        refresh_token: None,
        expires_in,
        created_at,
        scope: None,
    }
}

#[test]
fn accounts_report_token_state() {
    let stores = Stores::new();
    let valid = account(ProviderKind::GitHub, "octo");
    let expired = account(ProviderKind::GitLab, "alice");
    let missing = account(ProviderKind::GitLab, "bob");
    stores
        .accounts
        .save(&[valid.clone(), expired.clone(), missing.clone()])
        .expect("accounts");
    stores.tokens.save(&token(None, None), &valid).expect("token");
    stores
        .tokens
        .save(&token(Some(7200), Some(1000)), &expired)
        .expect("token");

    let statuses = ListAccountsUseCase {
        accounts: &stores.accounts,
        tokens: &stores.tokens,
    }
    .execute()
    .expect("statuses");

    let states: Vec<TokenState> = statuses.iter().map(|s| s.token_state).collect();
    assert_eq!(
        states,
        [TokenState::Valid, TokenState::Expired, TokenState::Missing]
    );
    assert_eq!(statuses[0].account, valid);
}

#[test]
fn removing_account_deletes_its_token() {
    let stores = Stores::new();
    let keep = account(ProviderKind::GitHub, "octo");
    let drop = account(ProviderKind::GitLab, "alice");
    stores
        .accounts
        .save(&[keep.clone(), drop.clone()])
        .expect("accounts");
    stores.tokens.save(&token(None, None), &keep).expect("token");
    stores.tokens.save(&token(None, None), &drop).expect("token");

    let usecase = RemoveAccountUseCase {
        accounts: &stores.accounts,
        tokens: &stores.tokens,
    };
    usecase.execute(&drop).expect("remove");

    assert_eq!(stores.accounts.load().expect("accounts"), vec![keep.clone()]);
    assert_eq!(stores.tokens.read(&drop), None);
    assert!(stores.tokens.read(&keep).is_some());

    let err = usecase.execute(&drop).expect_err("already removed");
    assert!(matches!(err, RemoveAccountError::NotFound(_)));
}

#[test]
fn configuration_patch_is_persisted_per_provider() {
    let stores = Stores::new();
    let usecase = SaveConfigurationUseCase {
        provider_configs: &stores.configs,
    };

    assert_eq!(
        usecase.load(ProviderKind::GitLab).expect("defaults").base_url,
        "https://gitlab.com"
    );

    usecase
        .patch(
            ProviderKind::GitLab,
            ConfigurationPatch {
                client_id: Some("gl-app".to_string()),
                client_secret: Some("gl-secret".to_string()),
                base_url: Some("https://git.example.com".to_string()),
                ..Default::default()
            },
        )
        .expect("patch gitlab");
    usecase
        .patch(
            ProviderKind::GitHub,
            ConfigurationPatch {
                client_id: Some("gh-app".to_string()),
                ..Default::default()
            },
        )
        .expect("patch github");

    let all = usecase.load_all().expect("all");
    assert_eq!(all.len(), 2);
    let gitlab = &all[&ProviderKind::GitLab];
    assert_eq!(gitlab.client_id, "gl-app");
    assert_eq!(gitlab.client_secret(), Some("gl-secret"));
    assert_eq!(gitlab.base_url, "https://git.example.com");
    assert_eq!(all[&ProviderKind::GitHub].client_secret(), None);
}

#[test]
fn corrupt_files_block_writes_instead_of_resetting() {
    let stores = Stores::new();
    let accounts_path = stores.dir.path().join(ACCOUNTS_FILE);
    let providers_path = stores.dir.path().join(PROVIDERS_FILE);
    std::fs::write(&accounts_path, "[{").expect("write");
    std::fs::write(&providers_path, r#"{"gitlab":"#).expect("write");

    let err = RemoveAccountUseCase {
        accounts: &stores.accounts,
        tokens: &stores.tokens,
    }
    .execute(&account(ProviderKind::GitHub, "octo"))
    .expect_err("corrupt accounts");
    assert!(matches!(err, RemoveAccountError::Storage(_)));

    SaveConfigurationUseCase {
        provider_configs: &stores.configs,
    }
    .patch(
        ProviderKind::GitHub,
        ConfigurationPatch {
            client_id: Some("gh-app".to_string()),
            ..Default::default()
        },
    )
    .expect_err("corrupt providers");

    assert_eq!(std::fs::read_to_string(&accounts_path).expect("read"), "[{");
    assert_eq!(
        std::fs::read_to_string(&providers_path).expect("read"),
        r#"{"gitlab":"#
    );
}

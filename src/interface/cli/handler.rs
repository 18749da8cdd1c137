//! CLI 동작 실행(유스케이스 호출 + 콘솔 출력).

use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};

use super::command::CliAction;
use crate::application::config::Config;
use crate::application::ports::{ConfigRepository, Reporter};
use crate::application::usecases::list_accounts::select_account;
use crate::application::usecases::list_repositories::{ListingNotice, RepositoryListing};
use crate::domain::error::{ConnectError, ListError};
use crate::domain::remote::{Account, ProviderConfiguration};
use crate::infrastructure::adapters::JsonConfigRepository;
use crate::interface::composition::AppComposition;

/// 설정을 읽고 조립한 뒤 동작을 실행한다.
pub async fn execute(action: CliAction) -> Result<()> {
    let mut config: Config = JsonConfigRepository.load()?;
    if let CliAction::Connect {
        open_browser: false,
        ..
    } = &action
    {
        config.defaults.open_browser = Some(false);
    }
    let composition = AppComposition::from_config(&config)?;
    run(&composition, action).await
}

async fn run(app: &AppComposition, action: CliAction) -> Result<()> {
    let reporter = app.reporter();

    match action {
        CliAction::Accounts => {
            let statuses = app.list_accounts_usecase().execute()?;
            reporter.section("Accounts");
            if statuses.is_empty() {
                reporter.raw("no connected accounts (run `repolink connect github|gitlab`)");
            }
            for status in statuses {
                reporter.status(
                    status.token_state.as_str(),
                    &format!(
                        "{}  token …{}  {}  ({})",
                        status.account.label(),
                        status.account.token_hint,
                        status.account.web_base_url,
                        status.account.id
                    ),
                );
            }
        }
        CliAction::Connect { provider, .. } => match app.connect_usecase().execute(provider).await {
            Ok(connected) => reporter.status(
                "ok",
                &format!(
                    "connected {} (token …{})",
                    connected.account.label(),
                    connected.account.token_hint
                ),
            ),
            Err(ConnectError::Authorization(err)) if err.is_cancelled() => {
                reporter.status("cancelled", "authorization cancelled, nothing was saved");
            }
            Err(err) => return Err(err).with_context(|| format!("failed to connect {provider}")),
        },
        CliAction::Repos { account, all, json } => {
            let accounts = app.accounts()?;
            let targets: Vec<Account> = if all {
                accounts
            } else {
                vec![require_account(&accounts, account.as_deref())?.clone()]
            };

            let listing = app.list_repositories_usecase();
            let results = listing.execute_all(&targets).await;
            if json {
                print_listings_json(&results, all)?;
            } else {
                for (account, result) in &results {
                    print_listing(reporter, account, result);
                }
            }
            if let Some((account, Err(err))) = results.iter().find(|(_, r)| r.is_err()) {
                return Err(anyhow!("{}: {err}", account.label()));
            }
        }
        CliAction::Remove { account } => {
            let accounts = app.accounts()?;
            let target = select_account(&accounts, Some(&account))
                .ok_or_else(|| anyhow!("account not found: {account}"))?;
            app.remove_account_usecase().execute(target)?;
            reporter.status("ok", &format!("removed {}", target.label()));
        }
        CliAction::InspectConfig => {
            println!("{}", app.inspect_config_usecase().execute()?);
        }
        CliAction::SetConfig { provider, patch } => {
            let saved = app.save_configuration_usecase().patch(provider, patch)?;
            reporter.section(&format!("{} configuration", provider.display_name()));
            print_configuration(reporter, &saved);
        }
        CliAction::Clone {
            full_name,
            dest,
            account,
            protocol,
        } => {
            let accounts = app.accounts()?;
            let target = require_account(&accounts, account.as_deref())?;
            let repo = app
                .clone_usecase()
                .execute(target, &full_name, dest.as_deref(), protocol)
                .await?;
            reporter.status("ok", &format!("cloned {}", repo.full_name));
        }
    }
    Ok(())
}

fn require_account<'a>(accounts: &'a [Account], selector: Option<&str>) -> Result<&'a Account> {
    select_account(accounts, selector).ok_or_else(|| match selector {
        Some(selector) => anyhow!("account not found: {selector}"),
        None => anyhow!("no connected accounts (run `repolink connect github|gitlab`)"),
    })
}

fn print_listing(
    reporter: &dyn Reporter,
    account: &Account,
    result: &Result<RepositoryListing, ListError>,
) {
    reporter.section(&account.label());
    match result {
        Ok(listing) => {
            if let Some(notice) = listing.notice {
                let scope = match notice {
                    ListingNotice::TokenMissing => "missing",
                    ListingNotice::TokenExpired => "expired",
                };
                reporter.status(scope, notice.message());
                return;
            }
            if listing.repositories.is_empty() {
                reporter.raw("(no repositories)");
            }
            for repo in &listing.repositories {
                let visibility = if repo.is_private { "private" } else { "public" };
                let line = if repo.description.is_empty() {
                    repo.full_name.clone()
                } else {
                    format!("{:<40} {}", repo.full_name, repo.description)
                };
                reporter.status(visibility, &line);
            }
        }
        Err(err) => reporter.status("error", &err.to_string()),
    }
}

fn print_listings_json(
    results: &[(Account, Result<RepositoryListing, ListError>)],
    keyed: bool,
) -> Result<()> {
    let listing_value = |result: &Result<RepositoryListing, ListError>| -> Result<Value> {
        Ok(match result {
            Ok(listing) => serde_json::to_value(&listing.repositories)?,
            Err(_) => Value::Array(Vec::new()),
        })
    };

    let value = if keyed {
        let mut map = Map::new();
        for (account, result) in results {
            map.insert(account.label(), listing_value(result)?);
        }
        Value::Object(map)
    } else {
        match results.first() {
            Some((_, result)) => listing_value(result)?,
            None => Value::Array(Vec::new()),
        }
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_configuration(reporter: &dyn Reporter, config: &ProviderConfiguration) {
    reporter.kv("client_id", &config.client_id);
    reporter.kv(
        "secret",
        if config.client_secret().is_some() {
            "set"
        } else {
            "not set"
        },
    );
    reporter.kv("redirect", &config.redirect_uri);
    reporter.kv("scopes", &config.scopes);
    if !config.base_url.is_empty() {
        reporter.kv("base_url", &config.base_url);
    }
}

//! CLI 명령 파싱 모듈.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::usecases::clone_repository::CloneProtocol;
use crate::application::usecases::save_configuration::ConfigurationPatch;
use crate::domain::remote::ProviderKind;

#[derive(Debug, Parser)]
#[command(name = "repolink")]
#[command(about = "Connect GitHub/GitLab accounts with OAuth (PKCE) and browse their repositories")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List connected accounts and their token state
    Accounts,
    /// Connect an account through the browser (OAuth authorization code + PKCE)
    Connect {
        /// github | gitlab
        provider: ProviderKind,
        /// Print the authorization URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// List repositories of a connected account (first page)
    Repos {
        /// Account id, provider:username or username (default: first account)
        #[arg(conflicts_with = "all")]
        account: Option<String>,
        /// List every connected account concurrently
        #[arg(long)]
        all: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Remove a connected account and its stored token
    Remove {
        /// Account id, provider:username or username
        account: String,
    },
    /// Inspect settings or edit provider OAuth app configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Clone a repository listed for a connected account
    Clone {
        /// owner/name (GitHub) or group/project (GitLab)
        full_name: String,
        /// Target directory (default: git's choice)
        dest: Option<PathBuf>,
        /// Account id, provider:username or username (default: first account)
        #[arg(long)]
        account: Option<String>,
        /// Clone over SSH instead of HTTPS
        #[arg(long)]
        ssh: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show merged settings, provider configuration and data paths
    Show,
    /// Update the OAuth app configuration of a provider
    Set {
        /// github | gitlab
        provider: ProviderKind,
        #[arg(long)]
        client_id: Option<String>,
        /// Stored in the OS keyring, never in providers.json
        #[arg(long, conflicts_with = "clear_secret")]
        client_secret: Option<String>,
        /// Remove the stored client secret (public PKCE client)
        #[arg(long)]
        clear_secret: bool,
        #[arg(long)]
        redirect_uri: Option<String>,
        /// Space separated scopes
        #[arg(long)]
        scopes: Option<String>,
        /// GitLab instance URL (self-managed)
        #[arg(long)]
        base_url: Option<String>,
    },
}

pub enum CliAction {
    Accounts,
    Connect {
        provider: ProviderKind,
        open_browser: bool,
    },
    Repos {
        account: Option<String>,
        all: bool,
        json: bool,
    },
    Remove {
        account: String,
    },
    InspectConfig,
    SetConfig {
        provider: ProviderKind,
        patch: ConfigurationPatch,
    },
    Clone {
        full_name: String,
        dest: Option<PathBuf>,
        account: Option<String>,
        protocol: CloneProtocol,
    },
}

impl Cli {
    pub fn parse_action() -> Result<CliAction, String> {
        Cli::parse().into_action()
    }

    fn into_action(self) -> Result<CliAction, String> {
        let action = match self.command {
            Commands::Accounts => CliAction::Accounts,
            Commands::Connect {
                provider,
                no_browser,
            } => CliAction::Connect {
                provider,
                open_browser: !no_browser,
            },
            Commands::Repos { account, all, json } => CliAction::Repos { account, all, json },
            Commands::Remove { account } => CliAction::Remove { account },
            Commands::Config { command } => match command {
                ConfigCommands::Show => CliAction::InspectConfig,
                ConfigCommands::Set {
                    provider,
                    client_id,
                    client_secret,
                    clear_secret,
                    redirect_uri,
                    scopes,
                    base_url,
                } => {
                    let patch = ConfigurationPatch {
                        client_id,
                        client_secret,
                        clear_secret,
                        redirect_uri,
                        scopes,
                        base_url,
                    };
                    if patch.is_empty() {
                        return Err(format!(
                            "config set {provider}: nothing to change (see `repolink config set --help`)"
                        ));
                    }
                    CliAction::SetConfig { provider, patch }
                }
            },
            Commands::Clone {
                full_name,
                dest,
                account,
                ssh,
            } => CliAction::Clone {
                full_name,
                dest,
                account,
                protocol: if ssh {
                    CloneProtocol::Ssh
                } else {
                    CloneProtocol::Https
                },
            },
        };
        Ok(action)
    }
}

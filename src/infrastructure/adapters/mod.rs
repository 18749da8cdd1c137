//! 애플리케이션 포트를 실제 인프라 구현체로 연결하는 어댑터 계층.

mod authorization_session;
mod config_repository;
mod git_cloner;
mod provider_factory;
mod reporter;

pub use authorization_session::SystemAuthorizationSession;
pub use config_repository::JsonConfigRepository;
pub use git_cloner::GitCommandCloner;
pub use provider_factory::RemoteProviderFactoryAdapter;
pub use reporter::ConsoleReporter;

//! 애플리케이션 유스케이스 모음.

pub mod clone_repository;
pub mod connect_account;
pub mod inspect_config;
pub mod list_accounts;
pub mod list_repositories;
pub mod remove_account;
pub mod save_configuration;

//! CLI 인터페이스 모듈 묶음.
//! 입력 파싱과 동작 실행을 한 네임스페이스로 관리한다.

pub mod command;
pub mod handler;

pub use command::{Cli, CliAction};
pub use handler::execute;

//! Interface layer
//! CLI 입력을 유스케이스 호출로 연결하고 의존성을 조립한다.

pub mod cli;
pub mod composition;

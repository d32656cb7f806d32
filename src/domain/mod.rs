//! Domain Layer - 领域层
//!
//! 单一限界上下文：祝福会话

pub mod session;

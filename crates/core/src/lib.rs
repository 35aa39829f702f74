//! # `rosoku-core` - 领域模型与端口定义
//!
//! 本 crate 是 Rosoku 行情看板数据层的领域核心。
//! 只包含实体 (Entity)、端口 (Port Trait)、错误类型与配置，
//! 不依赖任何具体的 HTTP 客户端或运行时实现。
//!
//! ## 架构职责
//! - 定义 K 线与逐笔价格的数据实体
//! - 定义行情数据提供者的抽象接口
//! - 定义策略参数的类型化模型与校验错误
//! - 提供时间与显示度量的能力注入接口

pub mod common;
pub mod config;
pub mod market;
pub mod strategy;

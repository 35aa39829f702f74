//! # `rosoku-feed` - 交易后端行情适配器
//!
//! 通过 `reqwest` 访问交易后端的行情端点，
//! 将原始 JSON 响应归一化为 `rosoku-core` 定义的领域实体。

pub mod upbit;

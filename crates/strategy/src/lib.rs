//! # `rosoku-strategy` - 策略表单与执行请求
//!
//! 管理用户选择的策略参数，组装策略执行请求体，
//! 并将后端响应渲染为可展示的文本。

pub mod execute;
pub mod form;

use thiserror::Error;

/// # Summary
/// 策略选项校验错误枚举。
/// 类型化解析器以结构化错误取代静默回退默认值。
///
/// # Invariants
/// - 错误信息必须携带出错的字段名，便于前端逐项提示。
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OptionsError {
    // 必填字段缺失或为空
    #[error("Missing field: {0}")]
    MissingField(String),
    // 字段存在但无法解析为数值
    #[error("Invalid number for {field}: {value}")]
    InvalidNumber { field: String, value: String },
    // 未知的策略名
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
    // 未知的趋势计算方式
    #[error("Unknown trend method: {0}")]
    UnknownTrendMethod(String),
}

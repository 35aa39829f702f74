use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 单根 K 线数据实体，记录特定时段内的行情波动。
/// 由一条原始快照记录归一化产生，构造后不可变。
///
/// # Invariants
/// - `high` 必须大于或等于 `low`, `open`, `close`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandlePoint {
    // K 线开始时间
    pub time: DateTime<Utc>,
    // 开盘价
    pub open: f64,
    // 最高价
    pub high: f64,
    // 最低价
    pub low: f64,
    // 收盘价
    pub close: f64,
    // 累计成交量
    pub volume: f64,
}

/// # Summary
/// 流式逐笔价格点，由轮询行情源的一次响应归一化产生。
///
/// # Invariants
/// - `timestamp` 是已格式化的 KST 本地时间展示串 (`HH:MM:SS`)。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    // 展示用时间串
    pub timestamp: String,
    // 成交价
    pub price: f64,
}

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod display;
pub mod time;

/// # Summary
/// 市场标的实体，代表系统关注的特定交易对。
///
/// # Invariants
/// - `code` 必须是合法的市场代码 (例如: KRW-BTC)。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketCode {
    // 市场代码 (例如: KRW-BTC, KRW-ETH)
    pub code: String,
}

impl MarketCode {
    /// 从任意字符串构造市场代码
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

impl std::fmt::Display for MarketCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// # Summary
/// K 线粒度枚举，定义快照行情的时间跨度。
/// 取值与后端 `unit` 查询参数一一对应。
///
/// # Invariants
/// - 仅允许日线与 1/3/5/10/30/60/240 分钟线。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Granularity {
    // 日线
    Days,
    // 1分钟
    Min1,
    // 3分钟
    Min3,
    // 5分钟
    Min5,
    // 10分钟
    Min10,
    // 30分钟
    Min30,
    // 60分钟
    Min60,
    // 240分钟 (4小时)
    Min240,
}

impl Granularity {
    /// 所有受支持的粒度，按前端下拉框的展示顺序排列
    pub const ALL: [Granularity; 8] = [
        Granularity::Days,
        Granularity::Min1,
        Granularity::Min3,
        Granularity::Min5,
        Granularity::Min10,
        Granularity::Min30,
        Granularity::Min60,
        Granularity::Min240,
    ];

    /// # Summary
    /// 返回该粒度对应的时间跨度秒数。
    ///
    /// # Logic
    /// 日线按 86400 秒计，分钟线按分钟数乘 60。
    ///
    /// # Returns
    /// 周期秒数。
    pub fn cycle_secs(&self) -> i64 {
        match self {
            Granularity::Days => 86_400,
            Granularity::Min1 => 60,
            Granularity::Min3 => 180,
            Granularity::Min5 => 300,
            Granularity::Min10 => 600,
            Granularity::Min30 => 1_800,
            Granularity::Min60 => 3_600,
            Granularity::Min240 => 14_400,
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "days" => Ok(Granularity::Days),
            "minutes/1" => Ok(Granularity::Min1),
            "minutes/3" => Ok(Granularity::Min3),
            "minutes/5" => Ok(Granularity::Min5),
            "minutes/10" => Ok(Granularity::Min10),
            "minutes/30" => Ok(Granularity::Min30),
            "minutes/60" => Ok(Granularity::Min60),
            "minutes/240" => Ok(Granularity::Min240),
            _ => Err(format!("Unknown granularity: {}", s)),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Days => write!(f, "days"),
            Granularity::Min1 => write!(f, "minutes/1"),
            Granularity::Min3 => write!(f, "minutes/3"),
            Granularity::Min5 => write!(f, "minutes/5"),
            Granularity::Min10 => write!(f, "minutes/10"),
            Granularity::Min30 => write!(f, "minutes/30"),
            Granularity::Min60 => write!(f, "minutes/60"),
            Granularity::Min240 => write!(f, "minutes/240"),
        }
    }
}

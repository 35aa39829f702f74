use crate::strategy::error::OptionsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// # Summary
/// 可选择的交易策略枚举。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    InverseVolatility,
    Trend,
    CounterTrend,
    Spread,
}

impl Strategy {
    /// 所有策略，按前端下拉框的展示顺序排列
    pub const ALL: [Strategy; 4] = [
        Strategy::InverseVolatility,
        Strategy::Trend,
        Strategy::CounterTrend,
        Strategy::Spread,
    ];

    /// # Summary
    /// 返回该策略对应的动态表单字段目录。
    ///
    /// # Logic
    /// 每个策略声明自己需要渲染的输入字段，
    /// 表单层据此生成输入控件并将结果写回选项映射。
    ///
    /// # Returns
    /// 字段描述符切片。
    pub fn field_specs(&self) -> &'static [FieldSpec] {
        match self {
            Strategy::InverseVolatility => &[FieldSpec {
                name: "numTickers",
                label: "Number of tickers",
                kind: FieldKind::Number,
                placeholder: "e.g. 3",
            }],
            Strategy::Trend => &[FieldSpec {
                name: "trendType",
                label: "Trend method",
                kind: FieldKind::Select,
                placeholder: "sma / ema / nDayBreakout",
            }],
            Strategy::CounterTrend => &[
                FieldSpec {
                    name: "kValue",
                    label: "K value",
                    kind: FieldKind::Number,
                    placeholder: "e.g. 2.2",
                },
                FieldSpec {
                    name: "nDays",
                    label: "N days",
                    kind: FieldKind::Number,
                    placeholder: "e.g. 20",
                },
            ],
            Strategy::Spread => &[
                FieldSpec {
                    name: "ticker1",
                    label: "Ticker 1",
                    kind: FieldKind::Text,
                    placeholder: "e.g. KRW-BTC",
                },
                FieldSpec {
                    name: "ticker2",
                    label: "Ticker 2",
                    kind: FieldKind::Text,
                    placeholder: "e.g. KRW-ETH",
                },
                FieldSpec {
                    name: "maxHoldingPeriod",
                    label: "Max holding period",
                    kind: FieldKind::Number,
                    placeholder: "e.g. 10",
                },
                FieldSpec {
                    name: "enterLongSigma",
                    label: "Enter long sigma",
                    kind: FieldKind::Number,
                    placeholder: "e.g. 1",
                },
                FieldSpec {
                    name: "enterShortSigma",
                    label: "Enter short sigma",
                    kind: FieldKind::Number,
                    placeholder: "e.g. -1",
                },
                FieldSpec {
                    name: "exitLongSigma",
                    label: "Exit long sigma",
                    kind: FieldKind::Number,
                    placeholder: "e.g. -1",
                },
                FieldSpec {
                    name: "exitShortSigma",
                    label: "Exit short sigma",
                    kind: FieldKind::Number,
                    placeholder: "e.g. 1",
                },
            ],
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::InverseVolatility => write!(f, "InverseVolatility"),
            Strategy::Trend => write!(f, "Trend"),
            Strategy::CounterTrend => write!(f, "CounterTrend"),
            Strategy::Spread => write!(f, "Spread"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "InverseVolatility" => Ok(Strategy::InverseVolatility),
            "Trend" => Ok(Strategy::Trend),
            "CounterTrend" => Ok(Strategy::CounterTrend),
            "Spread" => Ok(Strategy::Spread),
            _ => Err(OptionsError::UnknownStrategy(s.to_string())),
        }
    }
}

/// # Summary
/// 动态表单字段的输入类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Text,
    Select,
}

/// # Summary
/// 动态表单字段描述符。
/// 驱动前端按策略渲染对应的输入控件。
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub placeholder: &'static str,
}

/// # Summary
/// 趋势策略的计算方式及其参数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrendMethod {
    // 简单移动平均
    Sma { short_period: u32, long_period: u32 },
    // 指数移动平均
    Ema {
        period: u32,
        entry_ratio: f64,
        alpha: f64,
    },
    // N 日突破
    NDayBreakout { n: u32, entry_ratio: f64 },
}

/// # Summary
/// 类型化的策略参数变体。
/// 由松散的字符串选项映射经显式校验器解析而来，
/// 校验失败时报告结构化的 OptionsError 而非静默回退。
///
/// # Invariants
/// - `InverseVolatility.tickers` 不包含空槽位。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StrategyParams {
    InverseVolatility {
        num_tickers: usize,
        tickers: Vec<String>,
    },
    Trend {
        method: TrendMethod,
    },
    CounterTrend {
        k: f64,
        n_days: u32,
    },
    Spread {
        ticker1: String,
        ticker2: String,
        max_holding_period: u32,
        enter_long_sigma: f64,
        enter_short_sigma: f64,
        exit_long_sigma: f64,
        exit_short_sigma: f64,
    },
}

impl StrategyParams {
    /// # Summary
    /// 从原始字符串选项映射解析出类型化的策略参数。
    ///
    /// # Logic
    /// 1. 根据策略类型选择对应的变体解析分支。
    /// 2. InverseVolatility 按 `numTickers` 收集 `ticker{i}` 并丢弃空槽位。
    /// 3. Trend 根据 `trendType` 分派到具体计算方式的参数解析。
    /// 4. 任何缺失或非法数值字段立即返回结构化错误。
    ///
    /// # Arguments
    /// * `strategy`: 策略类型。
    /// * `options`: 表单累积的原始选项映射。
    ///
    /// # Returns
    /// 成功返回类型化参数，失败返回 OptionsError。
    pub fn parse(
        strategy: Strategy,
        options: &BTreeMap<String, String>,
    ) -> Result<Self, OptionsError> {
        match strategy {
            Strategy::InverseVolatility => {
                let num_tickers: usize = require_parsed(options, "numTickers")?;
                let tickers = (0..num_tickers)
                    .filter_map(|i| options.get(&format!("ticker{}", i)))
                    .filter(|t| !t.is_empty())
                    .cloned()
                    .collect();
                Ok(StrategyParams::InverseVolatility {
                    num_tickers,
                    tickers,
                })
            }
            Strategy::Trend => {
                let method = match require_str(options, "trendType")? {
                    "sma" => TrendMethod::Sma {
                        short_period: require_u32(options, "shortPeriod")?,
                        long_period: require_u32(options, "longPeriod")?,
                    },
                    "ema" => TrendMethod::Ema {
                        period: require_u32(options, "period")?,
                        entry_ratio: require_f64(options, "entryRatio")?,
                        alpha: require_f64(options, "emaAlpha")?,
                    },
                    "nDayBreakout" | "breakout" => TrendMethod::NDayBreakout {
                        n: require_u32(options, "n")?,
                        entry_ratio: require_f64(options, "entryRatio")?,
                    },
                    other => return Err(OptionsError::UnknownTrendMethod(other.to_string())),
                };
                Ok(StrategyParams::Trend { method })
            }
            Strategy::CounterTrend => Ok(StrategyParams::CounterTrend {
                k: require_f64(options, "kValue")?,
                n_days: require_u32(options, "nDays")?,
            }),
            Strategy::Spread => Ok(StrategyParams::Spread {
                ticker1: require_str(options, "ticker1")?.to_string(),
                ticker2: require_str(options, "ticker2")?.to_string(),
                max_holding_period: require_u32(options, "maxHoldingPeriod")?,
                enter_long_sigma: require_f64(options, "enterLongSigma")?,
                enter_short_sigma: require_f64(options, "enterShortSigma")?,
                exit_long_sigma: require_f64(options, "exitLongSigma")?,
                exit_short_sigma: require_f64(options, "exitShortSigma")?,
            }),
        }
    }
}

fn require_str<'a>(
    options: &'a BTreeMap<String, String>,
    field: &str,
) -> Result<&'a str, OptionsError> {
    options
        .get(field)
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| OptionsError::MissingField(field.to_string()))
}

fn require_parsed<T: std::str::FromStr>(
    options: &BTreeMap<String, String>,
    field: &str,
) -> Result<T, OptionsError> {
    let raw = require_str(options, field)?;
    raw.parse().map_err(|_| OptionsError::InvalidNumber {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

fn require_f64(options: &BTreeMap<String, String>, field: &str) -> Result<f64, OptionsError> {
    require_parsed(options, field)
}

fn require_u32(options: &BTreeMap<String, String>, field: &str) -> Result<u32, OptionsError> {
    require_parsed(options, field)
}

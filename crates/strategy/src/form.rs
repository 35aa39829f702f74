use rosoku_core::strategy::entity::{Strategy, StrategyParams};
use rosoku_core::strategy::error::OptionsError;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// `volatilityPeriod` 缺失或非数值时的回退窗口
pub const DEFAULT_VOLATILITY_WINDOW: f64 = 20.0;

/// # Summary
/// 策略执行请求体。
/// 提交时从表单状态瞬时构建，不做持久化。
///
/// # Invariants
/// - 线上格式：`tickers` 与 `volatility_window` 嵌在 `options` 对象内，
///   与累积的原始选项并列。
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestSpec {
    // 策略名
    pub strategy: String,
    // 合并后的选项对象
    pub options: Map<String, Value>,
}

/// # Summary
/// 策略配置表单控制器。
/// 持有 UI 选中的策略参数，无时间语义，仅负责请求体组装。
///
/// # Invariants
/// - 切换策略时清空已累积的选项。
#[derive(Debug, Clone)]
pub struct StrategyForm {
    // 当前选中的主标的
    primary_ticker: String,
    // 当前选中的策略
    strategy: Strategy,
    // 动态表单累积的原始选项
    options: BTreeMap<String, String>,
}

impl StrategyForm {
    /// # Summary
    /// 以默认策略 (InverseVolatility) 创建表单。
    ///
    /// # Arguments
    /// * `primary_ticker`: 初始选中的主标的。
    pub fn new(primary_ticker: impl Into<String>) -> Self {
        Self {
            primary_ticker: primary_ticker.into(),
            strategy: Strategy::InverseVolatility,
            options: BTreeMap::new(),
        }
    }

    /// 当前选中的策略
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// 当前选中的主标的
    pub fn primary_ticker(&self) -> &str {
        &self.primary_ticker
    }

    /// 当前累积的原始选项
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    /// 切换主标的
    pub fn select_ticker(&mut self, ticker: impl Into<String>) {
        self.primary_ticker = ticker.into();
    }

    /// # Summary
    /// 切换策略并清空已累积的选项。
    ///
    /// # Logic
    /// 不同策略的字段互不兼容，残留选项会污染下一次提交。
    pub fn select_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
        self.options.clear();
    }

    /// 写入或覆盖一个表单选项
    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.options.insert(name.into(), value.into());
    }

    /// # Summary
    /// 将原始选项解析为类型化的策略参数。
    ///
    /// # Returns
    /// 成功返回类型化参数，失败返回结构化校验错误。
    pub fn parse_params(&self) -> Result<StrategyParams, OptionsError> {
        StrategyParams::parse(self.strategy, &self.options)
    }

    /// # Summary
    /// 从当前表单状态组装策略执行请求体。
    ///
    /// # Logic
    /// 1. InverseVolatility：读取 `numTickers` 为整数 N（非法按 0 计），
    ///    收集 `ticker0..ticker{N-1}` 并丢弃空槽位。
    /// 2. 其他策略：使用当前主标的作为唯一标的。
    /// 3. `volatility_window` 取 `volatilityPeriod` 的数值，
    ///    缺失或非数值时回退 20。
    /// 4. 将全部原始选项合并进 options 对象，与 tickers、
    ///    volatility_window 并列。
    ///
    /// # Returns
    /// 可直接序列化为 JSON 的请求体。
    pub fn build_request(&self) -> RequestSpec {
        let tickers: Vec<String> = if self.strategy == Strategy::InverseVolatility {
            let num_tickers: usize = self
                .options
                .get("numTickers")
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
            (0..num_tickers)
                .filter_map(|i| self.options.get(&format!("ticker{}", i)))
                .filter(|t| !t.is_empty())
                .cloned()
                .collect()
        } else {
            vec![self.primary_ticker.clone()]
        };

        let volatility_window: f64 = self
            .options
            .get("volatilityPeriod")
            .and_then(|v| v.parse().ok())
            .filter(|v: &f64| v.is_finite())
            .unwrap_or(DEFAULT_VOLATILITY_WINDOW);

        let mut options = Map::new();
        options.insert("tickers".to_string(), json!(tickers));
        options.insert("volatility_window".to_string(), json!(volatility_window));
        for (name, value) in &self.options {
            options.insert(name.clone(), Value::String(value.clone()));
        }

        RequestSpec {
            strategy: self.strategy.to_string(),
            options,
        }
    }
}

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDateTime, TimeZone};
use reqwest::Client;
use rosoku_core::common::time::{KST_OFFSET_SECS, format_kst_time};
use rosoku_core::common::{Granularity, MarketCode};
use rosoku_core::market::entity::{CandlePoint, PricePoint};
use rosoku_core::market::error::MarketError;
use rosoku_core::market::port::MarketDataProvider;
use serde::Deserialize;
use std::time::Duration;

/// 单次快照请求允许的最大 K 线数量（最大调用点上界）
pub const MAX_CANDLE_COUNT: usize = 365;

/// # Summary
/// 交易后端行情网关，代理 Upbit 数据的 `/api/v1/market` 端点适配器。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯。
/// - 单次请求的 `count` 被钳制在 MAX_CANDLE_COUNT 以内。
#[derive(Clone)]
pub struct UpbitGateway {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 后端基地址
    base_url: String,
}

impl UpbitGateway {
    /// # Summary
    /// 创建一个新的 UpbitGateway 实例。
    ///
    /// # Logic
    /// 1. 配置 10 秒超时。
    /// 2. 初始化 reqwest 客户端并记录基地址。
    ///
    /// # Arguments
    /// * `base_url`: 后端基地址 (例如: http://localhost:8000)。
    ///
    /// # Returns
    /// 返回初始化后的 UpbitGateway。
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
        }
    }
}

/// # Summary
/// 后端 K 线端点的单条原始记录。
///
/// # Invariants
/// - 字段名映射自 Upbit 风格的 candles 接口。
#[derive(Deserialize, Debug)]
struct RawCandle {
    // KST 本地时间串 (例如: 2024-01-01T09:00:00)
    candle_date_time_kst: String,
    // 开盘价
    opening_price: f64,
    // 最高价
    high_price: f64,
    // 最低价
    low_price: f64,
    // 收盘价
    trade_price: f64,
    // 累计成交量
    candle_acc_trade_volume: f64,
}

/// # Summary
/// 价格端点的单条原始记录。
#[derive(Deserialize, Debug)]
struct RawTick {
    // 毫秒级 epoch 成交时间戳
    trade_timestamp: i64,
    // 成交价，可能以数值或数值字符串两种形态下发
    trade_price: PriceField,
}

/// # Summary
/// 兼容数值与数值字符串两种形态的价格字段。
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum PriceField {
    Number(f64),
    Text(String),
}

impl PriceField {
    /// 显式数值化，字符串形态按十进制解析
    fn to_f64(&self) -> Result<f64, MarketError> {
        match self {
            PriceField::Number(n) => Ok(*n),
            PriceField::Text(s) => s
                .parse()
                .map_err(|_| MarketError::Parse(format!("Non-numeric price: {}", s))),
        }
    }
}

/// # Summary
/// 价格端点响应的形状归一化容器。
/// 后端可能返回单个对象或对象数组，两者必须等价处理。
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// # Summary
/// 将一条原始 K 线记录归一化为领域实体。
///
/// # Logic
/// 1. 按 `%Y-%m-%dT%H:%M:%S` 解析 KST 本地时间串。
/// 2. 附加 UTC+9 固定偏移后转换为 UTC。
/// 3. 按文档字段名拷贝价格与成交量。
///
/// # Arguments
/// * `raw`: 原始记录。
///
/// # Returns
/// 成功返回 CandlePoint，时间串非法时返回 Parse 错误。
fn normalize_candle(raw: &RawCandle) -> Result<CandlePoint, MarketError> {
    let naive = NaiveDateTime::parse_from_str(&raw.candle_date_time_kst, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| MarketError::Parse(format!("Bad candle timestamp: {}", e)))?;
    let kst = FixedOffset::east_opt(KST_OFFSET_SECS)
        .ok_or_else(|| MarketError::Unknown("Bad KST offset".into()))?;
    let time = kst
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| {
            MarketError::Parse(format!(
                "Ambiguous candle timestamp: {}",
                raw.candle_date_time_kst
            ))
        })?
        .with_timezone(&chrono::Utc);

    Ok(CandlePoint {
        time,
        open: raw.opening_price,
        high: raw.high_price,
        low: raw.low_price,
        close: raw.trade_price,
        volume: raw.candle_acc_trade_volume,
    })
}

/// # Summary
/// 将一条原始成交记录归一化为流式价格点。
///
/// # Logic
/// 1. 将毫秒时间戳格式化为 KST 展示串。
/// 2. 对价格字段做显式数值化。
///
/// # Arguments
/// * `raw`: 原始记录。
///
/// # Returns
/// 成功返回 PricePoint，失败返回 Parse 错误。
fn normalize_tick(raw: &RawTick) -> Result<PricePoint, MarketError> {
    let timestamp = format_kst_time(raw.trade_timestamp).ok_or_else(|| {
        MarketError::Parse(format!("Bad trade timestamp: {}", raw.trade_timestamp))
    })?;
    Ok(PricePoint {
        timestamp,
        price: raw.trade_price.to_f64()?,
    })
}

#[async_trait]
impl MarketDataProvider for UpbitGateway {
    /// # Summary
    /// 从后端抓取最近的 K 线快照。
    ///
    /// # Logic
    /// 1. 将粒度映射为 `unit` 查询参数。
    /// 2. 构建包含 unit / market_code / count 的请求并发起。
    /// 3. 解析 JSON 数组并逐条归一化。
    /// 4. 保持源顺序（最新在前），倒序归一化由上层窗口组件负责。
    ///
    /// # Arguments
    /// * `market`: 市场标的。
    /// * `granularity`: K 线粒度。
    /// * `count`: 请求数量上限。
    ///
    /// # Returns
    /// 成功返回 K 线列表，失败返回 MarketError。
    async fn fetch_candles(
        &self,
        market: &MarketCode,
        granularity: Granularity,
        count: usize,
    ) -> Result<Vec<CandlePoint>, MarketError> {
        let count = count.min(MAX_CANDLE_COUNT);
        let url = format!("{}/api/v1/market/candles", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("unit", granularity.to_string().as_str()),
                ("market_code", market.code.as_str()),
                ("count", count.to_string().as_str()),
            ])
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let raw: Vec<RawCandle> = resp
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        raw.iter().map(normalize_candle).collect()
    }

    /// # Summary
    /// 从后端抓取最新成交价。
    ///
    /// # Logic
    /// 1. 请求按标的寻址的价格端点。
    /// 2. 将单对象响应与数组响应统一归一化为数组。
    /// 3. 逐条归一化为价格点。
    ///
    /// # Arguments
    /// * `market`: 市场标的。
    ///
    /// # Returns
    /// 成功返回一条或多条价格点，失败返回 MarketError。
    async fn fetch_price(&self, market: &MarketCode) -> Result<Vec<PricePoint>, MarketError> {
        let url = format!("{}/api/v1/market/price/{}", self.base_url, market.code);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let raw: OneOrMany<RawTick> = resp
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        raw.into_vec().iter().map(normalize_tick).collect()
    }
}

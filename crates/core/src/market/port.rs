use crate::common::{Granularity, MarketCode};
use crate::market::entity::{CandlePoint, PricePoint};
use crate::market::error::MarketError;
use async_trait::async_trait;

/// # Summary
/// 行情数据提供者接口（原始数据源）。
///
/// # Invariants
/// - `fetch_candles` 按数据源原始顺序返回（最新在前），由上层负责倒序归一化。
/// - `fetch_price` 必须已完成单对象到数组的形状归一化。
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// # Summary
    /// 获取特定标的在指定粒度下的最近 K 线数据。
    ///
    /// # Logic
    /// 1. 构建数据源请求（unit / market_code / count）。
    /// 2. 执行网络请求并解析响应数组。
    /// 3. 逐条归一化为 CandlePoint，保持最新在前的源顺序。
    ///
    /// # Arguments
    /// * `market`: 市场标的。
    /// * `granularity`: K 线粒度。
    /// * `count`: 请求的数量上限。
    ///
    /// # Returns
    /// 成功返回 K 线列表（最新在前），失败返回 MarketError。
    async fn fetch_candles(
        &self,
        market: &MarketCode,
        granularity: Granularity,
        count: usize,
    ) -> Result<Vec<CandlePoint>, MarketError>;

    /// # Summary
    /// 获取特定标的的最新成交价。
    ///
    /// # Logic
    /// 1. 请求单点价格端点。
    /// 2. 将单对象或数组响应统一归一化为数组。
    /// 3. 逐条转换为 PricePoint（时间展示串 + 数值价格）。
    ///
    /// # Arguments
    /// * `market`: 市场标的。
    ///
    /// # Returns
    /// 成功返回一条或多条价格点，失败返回 MarketError。
    async fn fetch_price(&self, market: &MarketCode) -> Result<Vec<PricePoint>, MarketError>;
}

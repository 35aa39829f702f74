use rosoku_core::common::display::DisplayMetrics;
use rosoku_core::common::{Granularity, MarketCode};
use rosoku_core::market::entity::CandlePoint;
use rosoku_core::market::port::MarketDataProvider;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// # Summary
/// 快照抓取参数，任一字段变化都会触发整轮重抓。
#[derive(Debug, Clone)]
pub struct FetchParams {
    // 市场标的
    pub market: MarketCode,
    // K 线粒度
    pub granularity: Granularity,
    // 请求数量上限
    pub count: usize,
}

/// # Summary
/// K 线快照序列，由抓取控制器独占持有。
///
/// # Invariants
/// - 归一化完成后按时间升序排列，即使数据源按降序下发。
/// - 每次成功抓取整体替换，从不增量合并。
#[derive(Debug, Clone, Default)]
pub struct CandleSeries {
    // 升序排列的 K 线点
    points: Vec<CandlePoint>,
    // 可见窗口内最多展示的点数
    window: usize,
}

impl CandleSeries {
    /// 使用指定的展示窗口大小创建空序列
    pub fn new(window: usize) -> Self {
        Self {
            points: Vec::new(),
            window,
        }
    }

    /// # Summary
    /// 用一批最新在前的原始序列整体替换当前序列。
    ///
    /// # Logic
    /// 1. 反转输入使最终顺序为时间升序。
    /// 2. 丢弃旧序列，整体换入新序列。
    ///
    /// # Arguments
    /// * `newest_first`: 数据源原始顺序（最新在前）的 K 线批次。
    pub fn replace_newest_first(&mut self, mut newest_first: Vec<CandlePoint>) {
        newest_first.reverse();
        self.points = newest_first;
    }

    /// 升序排列的全部数据点
    pub fn points(&self) -> &[CandlePoint] {
        &self.points
    }

    /// 数据点数量
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 序列是否为空
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// # Summary
    /// 计算可见窗口的索引范围。
    ///
    /// # Logic
    /// X 轴可见范围从距末尾 window 个位置（下限 0）延伸到最新点，
    /// 即最多展示最近 window 个点。
    ///
    /// # Returns
    /// 可见窗口的半开索引区间。
    pub fn visible_range(&self) -> Range<usize> {
        self.points.len().saturating_sub(self.window)..self.points.len()
    }

    /// 可见窗口内的数据点切片
    pub fn visible(&self) -> &[CandlePoint] {
        &self.points[self.visible_range()]
    }

    /// # Summary
    /// 结合注入的显示度量计算可绘制视图。
    ///
    /// # Arguments
    /// * `metrics`: 显示度量供给器。
    ///
    /// # Returns
    /// 物理画布宽度与可见窗口区间。
    pub fn view(&self, metrics: &dyn DisplayMetrics) -> ChartView {
        ChartView {
            canvas_width: f64::from(metrics.container_width()) * metrics.pixel_ratio(),
            window: self.visible_range(),
        }
    }
}

/// # Summary
/// 图表的可绘制视图描述。
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    // 物理像素画布宽度 (逻辑宽度 × 像素比)
    pub canvas_width: f64,
    // 可见窗口的索引区间
    pub window: Range<usize>,
}

/// # Summary
/// 快照管线的状态快照。
#[derive(Debug, Clone, Default)]
pub enum CandleState {
    // 尚未发起任何抓取
    #[default]
    Idle,
    // 抓取进行中，或上一次抓取失败后停留于此
    Loading,
    // 最近一次成功抓取的序列
    Ready(CandleSeries),
}

impl CandleState {
    /// 是否已有可展示的序列
    pub fn is_ready(&self) -> bool {
        matches!(self, CandleState::Ready(_))
    }
}

/// # Summary
/// K 线快照抓取控制器。
/// 宿主视图在关键参数变化时调用 `start`，卸载时调用 `stop`。
///
/// # Invariants
/// - 每次 `start` 递增代数计数并中止上一轮任务，
///   迟到的旧代响应一律丢弃（防止乱序覆盖）。
/// - 状态仅由控制器自身的任务写入。
pub struct CandleController {
    // 行情数据源驱动
    provider: Arc<dyn MarketDataProvider>,
    // 可见窗口大小
    window: usize,
    // 当前代数，每次 start/stop 递增
    generation: Arc<AtomicU64>,
    // 管线状态快照
    state: Arc<RwLock<CandleState>>,
    // 在飞任务句柄
    task: Mutex<Option<AbortHandle>>,
}

impl CandleController {
    /// # Summary
    /// 构造控制器实例。
    ///
    /// # Arguments
    /// * `provider`: 行情数据源驱动。
    /// * `window`: 可见窗口内最多展示的点数。
    ///
    /// # Returns
    /// 初始状态为 Idle 的控制器。
    pub fn new(provider: Arc<dyn MarketDataProvider>, window: usize) -> Self {
        Self {
            provider,
            window,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(RwLock::new(CandleState::Idle)),
            task: Mutex::new(None),
        }
    }

    /// # Summary
    /// 以新参数启动一轮抓取。
    ///
    /// # Logic
    /// 1. 递增代数并中止上一轮在飞任务。
    /// 2. 状态置为 Loading。
    /// 3. 派生任务执行抓取；响应返回后校验代数，
    ///    仅当代数仍为当前值才应用结果。
    /// 4. 抓取失败时记录日志，状态停留在 Loading（不重试）。
    ///
    /// # Arguments
    /// * `params`: 本轮抓取参数。
    pub fn start(&self, params: FetchParams) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_running();
        self.set_state(CandleState::Loading);

        let provider = self.provider.clone();
        let state = self.state.clone();
        let counter = self.generation.clone();
        let window = self.window;

        let handle = tokio::spawn(async move {
            let result = provider
                .fetch_candles(&params.market, params.granularity, params.count)
                .await;

            if counter.load(Ordering::SeqCst) != generation {
                debug!("Discarding stale candle response for {}", params.market);
                return;
            }

            match result {
                Ok(raw) => {
                    let mut series = CandleSeries::new(window);
                    series.replace_newest_first(raw);
                    let mut guard = state.write().unwrap_or_else(|e| e.into_inner());
                    *guard = CandleState::Ready(series);
                }
                Err(e) => {
                    // 快照管线不重试，视图停留在 Loading
                    warn!("Candle fetch for {} failed: {}", params.market, e);
                }
            }
        })
        .abort_handle();

        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        *task = Some(handle);
    }

    /// # Summary
    /// 停止当前抓取并回到 Idle。
    ///
    /// # Logic
    /// 递增代数使迟到响应失效，中止在飞任务，状态复位。
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_running();
        self.set_state(CandleState::Idle);
    }

    /// 获取当前状态快照
    pub fn state(&self) -> CandleState {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn abort_running(&self) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }

    fn set_state(&self, next: CandleState) {
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        *guard = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use rosoku_core::common::display::FixedMetrics;
    use rosoku_core::market::entity::PricePoint;
    use rosoku_core::market::error::MarketError;
    use std::time::Duration;

    fn descending_candles(count: usize) -> Vec<CandlePoint> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap();
        (0..count)
            .map(|i| {
                let offset = i64::try_from(count - i).unwrap();
                CandlePoint {
                    time: base + ChronoDuration::days(offset),
                    open: 1.0,
                    high: 2.0,
                    low: 0.5,
                    close: 1.5,
                    volume: 10.0,
                }
            })
            .collect()
    }

    #[test]
    fn test_replace_reverses_to_ascending() {
        for len in [0usize, 1, 7, 50] {
            let mut series = CandleSeries::new(50);
            series.replace_newest_first(descending_candles(len));
            assert_eq!(series.len(), len);
            assert!(
                series
                    .points()
                    .windows(2)
                    .all(|w| w[0].time <= w[1].time)
            );
        }
    }

    #[test]
    fn test_replace_discards_previous_series() {
        let mut series = CandleSeries::new(50);
        series.replace_newest_first(descending_candles(50));
        series.replace_newest_first(descending_candles(3));
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_visible_window_is_full_series_at_cap() {
        let mut series = CandleSeries::new(50);
        series.replace_newest_first(descending_candles(50));
        assert_eq!(series.visible_range(), 0..50);
        assert_eq!(series.visible().len(), 50);
    }

    #[test]
    fn test_visible_window_bounds_long_series() {
        let mut series = CandleSeries::new(50);
        series.replace_newest_first(descending_candles(120));
        assert_eq!(series.visible_range(), 70..120);
        assert_eq!(series.visible().len(), 50);
    }

    #[test]
    fn test_view_uses_injected_metrics() {
        let mut series = CandleSeries::new(50);
        series.replace_newest_first(descending_candles(10));
        let view = series.view(&FixedMetrics::new(800, 2.0));
        assert_eq!(view.canvas_width, 1600.0);
        assert_eq!(view.window, 0..10);
    }

    /// 按市场代码区分响应延迟与收盘价的测试数据源
    struct TimedProvider;

    #[async_trait]
    impl MarketDataProvider for TimedProvider {
        async fn fetch_candles(
            &self,
            market: &MarketCode,
            _granularity: Granularity,
            count: usize,
        ) -> Result<Vec<CandlePoint>, MarketError> {
            let (delay_ms, close) = match market.code.as_str() {
                "KRW-SLOW" => (100, 1.0),
                "KRW-FAIL" => return Err(MarketError::Network("boom".into())),
                _ => (0, 2.0),
            };
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap();
            Ok((0..count)
                .map(|i| CandlePoint {
                    time: base + ChronoDuration::days(i64::try_from(count - i).unwrap()),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 0.0,
                })
                .collect())
        }

        async fn fetch_price(&self, _: &MarketCode) -> Result<Vec<PricePoint>, MarketError> {
            Ok(vec![])
        }
    }

    fn params(code: &str) -> FetchParams {
        FetchParams {
            market: MarketCode::new(code),
            granularity: Granularity::Days,
            count: 50,
        }
    }

    #[tokio::test]
    async fn test_start_reaches_ready() {
        let controller = CandleController::new(Arc::new(TimedProvider), 50);
        controller.start(params("KRW-BTC"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        match controller.state() {
            CandleState::Ready(series) => {
                assert_eq!(series.len(), 50);
                assert_eq!(series.visible_range(), 0..50);
            }
            other => panic!("Expected Ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let controller = CandleController::new(Arc::new(TimedProvider), 50);
        controller.start(params("KRW-SLOW"));
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.start(params("KRW-BTC"));
        tokio::time::sleep(Duration::from_millis(200)).await;
        match controller.state() {
            CandleState::Ready(series) => {
                // 慢响应即使更晚返回也不得覆盖新参数的结果
                assert_eq!(series.points()[0].close, 2.0);
            }
            other => panic!("Expected Ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_stays_loading() {
        let controller = CandleController::new(Arc::new(TimedProvider), 50);
        controller.start(params("KRW-FAIL"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(controller.state(), CandleState::Loading));
    }

    #[tokio::test]
    async fn test_stop_prevents_late_mutation() {
        let controller = CandleController::new(Arc::new(TimedProvider), 50);
        controller.start(params("KRW-SLOW"));
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.stop();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(matches!(controller.state(), CandleState::Idle));
    }
}

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use rosoku_chart::candle::{CandleController, CandleState, FetchParams};
use rosoku_chart::price::PricePoller;
use rosoku_core::common::{Granularity, MarketCode};
use rosoku_core::market::entity::{CandlePoint, PricePoint};
use rosoku_core::market::error::MarketError;
use rosoku_core::market::port::MarketDataProvider;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// 模拟后端：K 线按最新在前下发，价格每次调用自增
struct FakeBackend {
    ticks: AtomicU64,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl MarketDataProvider for FakeBackend {
    async fn fetch_candles(
        &self,
        _market: &MarketCode,
        _granularity: Granularity,
        count: usize,
    ) -> Result<Vec<CandlePoint>, MarketError> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap();
        // 源顺序为时间降序
        Ok((0..count)
            .map(|i| CandlePoint {
                time: base + ChronoDuration::days(i64::try_from(count - i).unwrap()),
                open: 100.0,
                high: 110.0,
                low: 90.0,
                close: 105.0,
                volume: 1.0,
            })
            .collect())
    }

    async fn fetch_price(&self, _market: &MarketCode) -> Result<Vec<PricePoint>, MarketError> {
        let n = self.ticks.fetch_add(1, Ordering::SeqCst);
        #[allow(clippy::cast_precision_loss)]
        let price = 50_000.0 + n as f64;
        Ok(vec![PricePoint {
            timestamp: "09:00:00".to_string(),
            price,
        }])
    }
}

#[tokio::test]
async fn test_candle_snapshot_scenario() {
    // unit=days, count=50, 50 条降序记录 => 50 点升序序列，窗口为全序列
    let backend = Arc::new(FakeBackend::new());
    let controller = CandleController::new(backend, 50);
    controller.start(FetchParams {
        market: MarketCode::new("KRW-BTC"),
        granularity: Granularity::Days,
        count: 50,
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let CandleState::Ready(series) = controller.state() else {
        panic!("Expected Ready state");
    };
    assert_eq!(series.len(), 50);
    assert!(series.points().windows(2).all(|w| w[0].time < w[1].time));
    assert_eq!(series.visible_range(), 0..50);
}

#[tokio::test]
async fn test_pipelines_run_independently() {
    let backend = Arc::new(FakeBackend::new());
    let controller = CandleController::new(backend.clone(), 50);
    let poller = PricePoller::new(backend, 100, Duration::from_millis(5));

    controller.start(FetchParams {
        market: MarketCode::new("KRW-BTC"),
        granularity: Granularity::Min5,
        count: 50,
    });
    poller.start(MarketCode::new("KRW-BTC"));
    tokio::time::sleep(Duration::from_millis(100)).await;
    poller.stop();

    // 两条管线各自推进，互不依赖对方的进度
    assert!(controller.state().is_ready());
    assert!(poller.len() >= 2);
    let points = poller.snapshot();
    assert!(points.windows(2).all(|w| w[1].price > w[0].price));
}

#[tokio::test]
async fn test_granularity_change_replaces_series() {
    let backend = Arc::new(FakeBackend::new());
    let controller = CandleController::new(backend, 50);

    controller.start(FetchParams {
        market: MarketCode::new("KRW-BTC"),
        granularity: Granularity::Days,
        count: 365,
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    let CandleState::Ready(first) = controller.state() else {
        panic!("Expected Ready state");
    };
    assert_eq!(first.len(), 365);
    // 超过窗口上限时仅展示最近 50 点
    assert_eq!(first.visible_range(), 315..365);

    controller.start(FetchParams {
        market: MarketCode::new("KRW-BTC"),
        granularity: Granularity::Min60,
        count: 50,
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    let CandleState::Ready(second) = controller.state() else {
        panic!("Expected Ready state");
    };
    // 整体替换而非合并
    assert_eq!(second.len(), 50);
}

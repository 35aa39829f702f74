use crate::buffer::RollingWindow;
use rosoku_core::common::MarketCode;
use rosoku_core::market::entity::PricePoint;
use rosoku_core::market::port::MarketDataProvider;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{info, warn};

/// # Summary
/// 流式价格轮询器。
/// 启动后立即抓取一次，此后按固定节拍持续轮询，
/// 直到 `stop` 或以新标的重新 `start`。
///
/// # Invariants
/// - 序列长度由滚动窗口钳制在容量以内（超出从队首逐出）。
/// - 单次轮询失败不终止节拍，记录日志后下一拍照常进行。
/// - `stop` 或换标的之后，迟到的响应不会再写入序列。
pub struct PricePoller {
    // 行情数据源驱动
    provider: Arc<dyn MarketDataProvider>,
    // 轮询间隔
    poll_interval: Duration,
    // 当前代数，每次 start/stop 递增
    generation: Arc<AtomicU64>,
    // 有界价格序列，由轮询任务独占写入
    window: Arc<RwLock<RollingWindow<PricePoint>>>,
    // 在飞任务句柄
    task: Mutex<Option<AbortHandle>>,
}

impl PricePoller {
    /// # Summary
    /// 构造轮询器实例。
    ///
    /// # Arguments
    /// * `provider`: 行情数据源驱动。
    /// * `capacity`: 序列保留的最大点数。
    /// * `poll_interval`: 轮询节拍。
    ///
    /// # Returns
    /// 尚未启动的轮询器。
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        capacity: usize,
        poll_interval: Duration,
    ) -> Self {
        Self {
            provider,
            poll_interval,
            generation: Arc::new(AtomicU64::new(0)),
            window: Arc::new(RwLock::new(RollingWindow::new(capacity))),
            task: Mutex::new(None),
        }
    }

    /// # Summary
    /// 为指定标的启动轮询。
    ///
    /// # Logic
    /// 1. 递增代数并中止上一轮任务（换标的时从零开始）。
    /// 2. 清空序列。
    /// 3. 派生定时任务：首拍立即触发，此后按固定间隔轮询。
    ///    每拍抓取成功且代数未变时追加并按容量逐出；
    ///    失败时记录 warn 日志，节拍照常继续。
    ///
    /// # Arguments
    /// * `market`: 目标市场标的。
    pub fn start(&self, market: MarketCode) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_running();
        {
            let mut window = self.window.write().unwrap_or_else(|e| e.into_inner());
            window.clear();
        }

        let provider = self.provider.clone();
        let counter = self.generation.clone();
        let window = self.window.clone();
        let poll_interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            info!("Price poller for {} started", market);
            let mut interval = tokio::time::interval(poll_interval);

            loop {
                interval.tick().await;
                if counter.load(Ordering::SeqCst) != generation {
                    return;
                }

                match provider.fetch_price(&market).await {
                    Ok(points) => {
                        // 响应挂起期间可能已经换代，写入前再次校验
                        if counter.load(Ordering::SeqCst) != generation {
                            return;
                        }
                        let mut guard = window.write().unwrap_or_else(|e| e.into_inner());
                        guard.extend(points);
                    }
                    Err(e) => {
                        warn!("Price poll for {} failed: {}", market, e);
                    }
                }
            }
        })
        .abort_handle();

        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        *task = Some(handle);
    }

    /// # Summary
    /// 停止轮询并使迟到响应失效。
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_running();
    }

    /// 获取当前序列内容（插入顺序）
    pub fn snapshot(&self) -> Vec<PricePoint> {
        self.window
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .to_vec()
    }

    /// 当前序列长度
    pub fn len(&self) -> usize {
        self.window
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// 序列是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn abort_running(&self) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }
}

impl Drop for PricePoller {
    /// # Summary
    /// 析构时回收后台定时任务，防止泄漏仍在运行的轮询协程。
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rosoku_core::common::Granularity;
    use rosoku_core::market::entity::CandlePoint;
    use rosoku_core::market::error::MarketError;

    /// 每次调用产出一个自增价格点的测试数据源
    struct CountingProvider {
        calls: AtomicU64,
        fail_every_other: bool,
        delay: Duration,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                calls: AtomicU64::new(0),
                fail_every_other: false,
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for CountingProvider {
        async fn fetch_candles(
            &self,
            _: &MarketCode,
            _: Granularity,
            _: usize,
        ) -> Result<Vec<CandlePoint>, MarketError> {
            Ok(vec![])
        }

        async fn fetch_price(&self, market: &MarketCode) -> Result<Vec<PricePoint>, MarketError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_every_other && n % 2 == 1 {
                return Err(MarketError::Network("tick failed".into()));
            }
            #[allow(clippy::cast_precision_loss)]
            let price = n as f64;
            Ok(vec![PricePoint {
                timestamp: format!("{}@{}", market, n),
                price,
            }])
        }
    }

    #[tokio::test]
    async fn test_immediate_first_tick() {
        let poller = PricePoller::new(
            Arc::new(CountingProvider::new()),
            100,
            Duration::from_secs(60),
        );
        poller.start(MarketCode::new("KRW-BTC"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        // 间隔远未到期，首拍也必须已经产出一个点
        assert_eq!(poller.len(), 1);
        poller.stop();
    }

    #[tokio::test]
    async fn test_window_bounds_at_capacity() {
        let poller = PricePoller::new(
            Arc::new(CountingProvider::new()),
            100,
            Duration::from_millis(1),
        );
        poller.start(MarketCode::new("KRW-BTC"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        poller.stop();

        let points = poller.snapshot();
        assert_eq!(points.len(), 100);
        // 保留的恰好是最近的 100 个点，且按到达顺序排列
        assert!(
            points
                .windows(2)
                .all(|w| w[1].price == w[0].price + 1.0)
        );
    }

    #[tokio::test]
    async fn test_tick_failure_does_not_stop_schedule() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicU64::new(0),
            fail_every_other: true,
            delay: Duration::ZERO,
        });
        let poller = PricePoller::new(provider.clone(), 100, Duration::from_millis(5));
        poller.start(MarketCode::new("KRW-BTC"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        poller.stop();

        // 半数拍次失败，但成功的拍次仍持续进账
        assert!(poller.len() >= 3);
        assert!(provider.calls.load(Ordering::SeqCst) > u64::try_from(poller.len()).unwrap());
    }

    #[tokio::test]
    async fn test_restart_clears_series_for_new_market() {
        let poller = PricePoller::new(
            Arc::new(CountingProvider::new()),
            100,
            Duration::from_millis(5),
        );
        poller.start(MarketCode::new("KRW-BTC"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!poller.is_empty());

        poller.start(MarketCode::new("KRW-ETH"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        poller.stop();

        // 换标的后序列从零重建，不残留旧标的的点
        assert!(
            poller
                .snapshot()
                .iter()
                .all(|p| p.timestamp.starts_with("KRW-ETH@"))
        );
    }

    #[tokio::test]
    async fn test_stop_prevents_late_mutation() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicU64::new(0),
            fail_every_other: false,
            delay: Duration::from_millis(50),
        });
        let poller = PricePoller::new(provider, 100, Duration::from_millis(5));
        poller.start(MarketCode::new("KRW-BTC"));
        // 首拍仍挂在慢响应上时立即停止
        tokio::time::sleep(Duration::from_millis(10)).await;
        poller.stop();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(poller.is_empty());
    }
}

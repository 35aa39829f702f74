use rosoku_chart::candle::{CandleController, CandleState, FetchParams};
use rosoku_chart::price::PricePoller;
use rosoku_core::common::{Granularity, MarketCode};
use rosoku_core::config::AppConfig;
use rosoku_feed::upbit::UpbitGateway;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 启动时默认跟踪的标的
const DEFAULT_TICKER: &str = "KRW-BTC";

/// # Summary
/// 从默认值、可选配置文件与环境变量叠加出应用配置。
///
/// # Logic
/// 1. 以 AppConfig::default() 作为基线。
/// 2. 叠加可选的 `rosoku.toml`。
/// 3. 叠加 `ROSOKU_*` 环境变量（双下划线分段）。
fn load_config() -> Result<AppConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::Config::try_from(&AppConfig::default())?)
        .add_source(config::File::with_name("rosoku").required(false))
        .add_source(config::Environment::with_prefix("ROSOKU").separator("__"))
        .build()?
        .try_deserialize()
}

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化行情网关并接入两条图表数据管线。
///
/// # Logic
/// 1. 初始化全局日志。
/// 2. 加载应用配置。
/// 3. 实例化基础设施层（行情网关）。
/// 4. 启动快照管线与流式管线。
/// 5. 挂起等待外部信号退出，退出前回收后台任务。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 初始化日志
    tracing_subscriber::fmt::init();
    info!("Rosoku dashboard core starting...");

    // 2. 加载配置
    let config = load_config()?;
    info!("Backend at {}", config.backend.base_url);

    // 3. 实例化基础设施层
    let gateway = Arc::new(UpbitGateway::new(config.backend.base_url.clone()));

    // 4. 启动两条数据管线
    let controller = CandleController::new(gateway.clone(), config.chart.candle_window);
    controller.start(FetchParams {
        market: MarketCode::new(DEFAULT_TICKER),
        granularity: Granularity::Days,
        count: config.chart.candle_count,
    });

    let poller = PricePoller::new(
        gateway,
        config.chart.price_capacity,
        Duration::from_millis(config.chart.price_poll_ms),
    );
    poller.start(MarketCode::new(DEFAULT_TICKER));

    // 5. 周期性输出管线状态，直至收到退出信号
    let mut status_tick = tokio::time::interval(Duration::from_secs(5));
    loop {
        tokio::select! {
            _ = status_tick.tick() => {
                let candles = match controller.state() {
                    CandleState::Ready(series) => series.len(),
                    _ => 0,
                };
                info!(
                    "{}: {} candles, {} price points",
                    DEFAULT_TICKER,
                    candles,
                    poller.len()
                );
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    info!("Shutdown signal received. Exiting...");
    poller.stop();
    controller.stop();

    Ok(())
}

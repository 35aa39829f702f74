use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub chart: ChartConfig,
}

/// 交易后端连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    // 后端基地址，所有 /api/v1 端点都挂在其下
    pub base_url: String,
}

/// 图表数据管线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    // 每次快照请求的 K 线数量
    pub candle_count: usize,
    // 可见窗口内最多展示的 K 线数量
    pub candle_window: usize,
    // 流式价格序列的最大保留点数
    pub price_capacity: usize,
    // 价格轮询间隔 (毫秒)
    pub price_poll_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://localhost:8000".to_string(),
            },
            chart: ChartConfig {
                candle_count: 50,
                candle_window: 50,
                price_capacity: 100,
                price_poll_ms: 1000,
            },
        }
    }
}

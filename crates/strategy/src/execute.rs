use crate::form::RequestSpec;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// # Summary
/// 策略执行请求的错误枚举。
/// 提交路径不重试，错误直接向调用方传播。
#[derive(Error, Debug)]
pub enum ExecuteError {
    // 网络层错误
    #[error("Network error: {0}")]
    Network(String),
    // 响应体解析错误
    #[error("Parse error: {0}")]
    Parse(String),
}

/// # Summary
/// 策略执行客户端，负责向交易后端提交请求体。
#[derive(Clone)]
pub struct ExecuteClient {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 后端基地址
    base_url: String,
}

impl ExecuteClient {
    /// # Summary
    /// 创建一个新的 ExecuteClient 实例。
    ///
    /// # Arguments
    /// * `base_url`: 后端基地址。
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// # Summary
    /// 提交策略执行请求。
    ///
    /// # Logic
    /// 1. 将请求体序列化为 JSON 并 POST 到执行端点。
    /// 2. 非 2xx 状态按网络错误传播。
    /// 3. 响应体按任意 JSON 解析并包装为执行报告。
    ///
    /// # Arguments
    /// * `spec`: 表单组装的请求体。
    ///
    /// # Returns
    /// 成功返回执行报告，失败返回 ExecuteError。
    pub async fn execute(&self, spec: &RequestSpec) -> Result<ExecutionReport, ExecuteError> {
        let url = format!("{}/api/v1/trading/execute", self.base_url);
        info!("Submitting {} strategy request", spec.strategy);

        let resp = self
            .client
            .post(&url)
            .json(spec)
            .send()
            .await
            .map_err(|e| ExecuteError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ExecuteError::Network(format!("HTTP {}", resp.status())));
        }

        let raw: Value = resp
            .json()
            .await
            .map_err(|e| ExecuteError::Parse(e.to_string()))?;

        Ok(ExecutionReport { raw })
    }
}

/// # Summary
/// 策略执行响应的展示包装。
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    // 后端返回的任意 JSON
    raw: Value,
}

impl ExecutionReport {
    /// 从任意 JSON 构造执行报告
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// 原始响应
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// # Summary
    /// 提取权重映射 (标的 → 配比)。
    ///
    /// # Returns
    /// 响应包含 `weights` 对象时返回其数值项，否则返回 None。
    pub fn weights(&self) -> Option<BTreeMap<String, f64>> {
        let obj = self.raw.get("weights")?.as_object()?;
        Some(
            obj.iter()
                .filter_map(|(ticker, w)| w.as_f64().map(|w| (ticker.clone(), w)))
                .collect(),
        )
    }

    /// # Summary
    /// 渲染为展示文本。
    ///
    /// # Logic
    /// 1. 存在权重映射时，每个标的一行 `ticker: xx.xx%`。
    /// 2. 否则输出格式化后的原始 JSON。
    ///
    /// # Returns
    /// 展示文本。
    pub fn render(&self) -> String {
        if let Some(weights) = self.weights() {
            weights
                .iter()
                .map(|(ticker, weight)| format!("{}: {:.2}%", ticker, weight * 100.0))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string())
        }
    }
}

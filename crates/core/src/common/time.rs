use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::sync::RwLock;

/// 行情源所在时区 (KST, UTC+9) 的秒偏移
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

/// # Summary
/// 时间供给器接口，用于劫持和隔离物理系统时钟。
/// 所有需要"当前时间"的展示逻辑必须通过此接口获取挂载时间。
pub trait TimeProvider: Send + Sync {
    /// 获取当前挂载的时间
    fn now(&self) -> DateTime<Utc>;
}

/// # Summary
/// 针对实际运行的真实时钟，直接返回操作系统当前时间。
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// # Summary
/// 测试专用虚拟时钟，允许用例主动拨快或回退时间。
///
/// # Invariants
/// - 并发安全：内部利用 `RwLock` 提供给多线程安全修改和读取时间的权限。
pub struct FakeClockProvider {
    current_time: RwLock<DateTime<Utc>>,
}

impl FakeClockProvider {
    /// 使用指定的初始时间创建虚拟时钟
    pub fn new(initial_time: DateTime<Utc>) -> Self {
        Self {
            current_time: RwLock::new(initial_time),
        }
    }

    /// 强制修改时钟的当前时间
    pub fn set_time(&self, new_time: DateTime<Utc>) {
        let mut time = self
            .current_time
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *time = new_time;
    }
}

impl TimeProvider for FakeClockProvider {
    fn now(&self) -> DateTime<Utc> {
        *self
            .current_time
            .read()
            .unwrap_or_else(|e| e.into_inner())
    }
}

/// # Summary
/// 将毫秒级 epoch 时间戳格式化为 KST 时区的 `HH:MM:SS` 展示串。
///
/// # Logic
/// 1. 将毫秒时间戳解析为 UTC 时间。
/// 2. 转换到 UTC+9 固定偏移。
/// 3. 按 `%H:%M:%S` 格式化。
///
/// # Arguments
/// * `millis`: 毫秒级 epoch 时间戳。
///
/// # Returns
/// 格式化后的时间串；时间戳非法时返回 None。
pub fn format_kst_time(millis: i64) -> Option<String> {
    let kst = FixedOffset::east_opt(KST_OFFSET_SECS)?;
    let utc = Utc.timestamp_millis_opt(millis).single()?;
    Some(utc.with_timezone(&kst).format("%H:%M:%S").to_string())
}

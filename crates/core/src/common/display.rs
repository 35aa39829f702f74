/// # Summary
/// 显示度量供给器接口，用于隔离宿主环境的全局视口状态。
/// 图表窗口逻辑通过此接口获取容器宽度与像素比，
/// 从而可以在无渲染环境下进行测试。
pub trait DisplayMetrics: Send + Sync {
    /// 图表容器的逻辑宽度 (CSS 像素)
    fn container_width(&self) -> u32;

    /// 设备像素比
    fn pixel_ratio(&self) -> f64;
}

/// # Summary
/// 固定值的显示度量实现，适用于 headless 运行与测试。
#[derive(Debug, Clone, Copy)]
pub struct FixedMetrics {
    width: u32,
    ratio: f64,
}

impl FixedMetrics {
    /// 使用指定宽度与像素比构造
    pub fn new(width: u32, ratio: f64) -> Self {
        Self { width, ratio }
    }
}

impl Default for FixedMetrics {
    /// 默认 800px 宽、像素比 1.0，对应原始看板的初始容器尺寸
    fn default() -> Self {
        Self {
            width: 800,
            ratio: 1.0,
        }
    }
}

impl DisplayMetrics for FixedMetrics {
    fn container_width(&self) -> u32 {
        self.width
    }

    fn pixel_ratio(&self) -> f64 {
        self.ratio
    }
}

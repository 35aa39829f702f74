//! # `rosoku-chart` - 图表数据管线
//!
//! 本 crate 实现看板图表背后的两条数据管线：
//! - 快照管线：K 线序列的抓取控制器与展示窗口计算
//! - 流式管线：固定节拍的价格轮询器与有界滚动窗口
//!
//! 所有状态由各自的组件独占持有，组件之间不共享序列。

pub mod buffer;
pub mod candle;
pub mod price;

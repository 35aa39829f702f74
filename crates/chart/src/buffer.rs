use std::collections::VecDeque;

/// # Summary
/// 固定容量的滚动窗口，保留最近插入的 N 个元素。
///
/// # Invariants
/// - 长度永不超过容量，超出时从队首逐出最旧元素。
/// - 迭代顺序即插入顺序。
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    // 内部存储容器
    data: VecDeque<T>,
    // 最大容量
    capacity: usize,
}

impl<T: Clone> RollingWindow<T> {
    /// # Summary
    /// 创建一个新的滚动窗口。
    ///
    /// # Logic
    /// 预分配指定容量的双端队列；容量下限为 1。
    ///
    /// # Arguments
    /// * `capacity`: 固定容量上限。
    ///
    /// # Returns
    /// 初始化后的 RollingWindow 实例。
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// # Summary
    /// 向窗口推送新元素。
    ///
    /// # Logic
    /// 1. 追加到队尾。
    /// 2. 若超出容量，从队首逐出最旧元素。
    ///
    /// # Arguments
    /// * `item`: 待插入的元素。
    pub fn push(&mut self, item: T) {
        self.data.push_back(item);
        while self.data.len() > self.capacity {
            self.data.pop_front();
        }
    }

    /// # Summary
    /// 批量追加一组元素并执行容量逐出。
    ///
    /// # Logic
    /// 逐个调用 push，保证批量插入后仍满足容量不变式。
    ///
    /// # Arguments
    /// * `items`: 待插入的元素序列。
    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.push(item);
        }
    }

    /// 清空窗口内容，容量保持不变
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// 获取最新插入的元素
    pub fn last(&self) -> Option<&T> {
        self.data.back()
    }

    /// 当前元素数量
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 窗口是否为空
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 容量上限
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// # Summary
    /// 获取按插入顺序排列的完整数据列表。
    ///
    /// # Returns
    /// 包含所有有效元素的有序 Vec 集合。
    pub fn to_vec(&self) -> Vec<T> {
        self.data.iter().cloned().collect()
    }
}

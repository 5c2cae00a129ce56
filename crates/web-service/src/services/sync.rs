//! 项目与技术栈关联的同步计划

use std::collections::BTreeSet;

/// 把当前关联集合调整为目标集合需要执行的操作
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TechnologySync {
    /// 需要新增的关联：目标 − 当前
    pub attach: Vec<i64>,
    /// 需要删除的关联：当前 − 目标
    pub detach: Vec<i64>,
}

impl TechnologySync {
    pub fn plan(current: &BTreeSet<i64>, desired: &BTreeSet<i64>) -> Self {
        Self {
            attach: desired.difference(current).copied().collect(),
            detach: current.difference(desired).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attach.is_empty() && self.detach.is_empty()
    }
}

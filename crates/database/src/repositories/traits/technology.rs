//! 技术栈仓库 trait 定义

use crate::models::technology::TechnologyRecord;
use crate::DatabaseResult;

/// 技术栈仓库trait定义
#[async_trait::async_trait]
pub trait TechnologyRepositoryTrait: Send + Sync + 'static {
    /// 获取全部技术栈，按名称排序，用于表单多选列表
    async fn list_technologies(&self) -> DatabaseResult<Vec<TechnologyRecord>>;

    /// 在给定的 ID 中筛选出数据库里真实存在的部分
    async fn existing_ids(&self, ids: &[i64]) -> DatabaseResult<Vec<i64>>;

    /// 获取项目关联的全部技术栈
    async fn technologies_for_project(&self, project_id: i64) -> DatabaseResult<Vec<TechnologyRecord>>;
}

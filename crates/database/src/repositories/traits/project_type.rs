//! 项目类型仓库 trait 定义

use crate::models::project_type::ProjectTypeRecord;
use crate::DatabaseResult;

/// 项目类型仓库trait定义
#[async_trait::async_trait]
pub trait ProjectTypeRepositoryTrait: Send + Sync + 'static {
    /// 获取全部类型，按名称排序，用于表单下拉列表
    async fn list_types(&self) -> DatabaseResult<Vec<ProjectTypeRecord>>;

    /// 根据 ID 查找类型，不存在时返回 `None`
    async fn find_type(&self, id: i64) -> DatabaseResult<Option<ProjectTypeRecord>>;
}

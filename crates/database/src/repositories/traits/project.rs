//! 项目仓库 trait 定义
//!
//! 定义项目数据库操作的抽象接口

use crate::models::project::{ProjectCreate, ProjectPage, ProjectRecord, ProjectUpdate};
use crate::DatabaseResult;

/// 项目仓库trait定义
///
/// 定义了项目相关的数据库操作接口，支持：
/// - 项目分页列表
/// - 项目创建/查询/更新/删除
/// - 标题唯一性检查
/// - 图片路径引用检查
/// - 项目与技术栈的关联维护
#[async_trait::async_trait]
pub trait ProjectRepositoryTrait: Send + Sync + 'static {
    /// 分页查询项目，按 `updated_at`、`created_at` 倒序排列
    ///
    /// # 参数
    /// - `page_size`: 页面大小
    /// - `offset`: 偏移量
    async fn find_projects(&self, page_size: i64, offset: i64) -> DatabaseResult<ProjectPage>;

    /// 创建新项目
    ///
    /// 标题重复时返回 [`crate::DatabaseError::UniqueViolation`]
    async fn create_project(&self, project: ProjectCreate) -> DatabaseResult<ProjectRecord>;

    /// 根据 ID 获取项目信息
    async fn get_project_by_id(&self, id: i64) -> DatabaseResult<ProjectRecord>;

    /// 更新项目信息，同时刷新 `updated_at`
    async fn update_project(&self, id: i64, update: ProjectUpdate) -> DatabaseResult<ProjectRecord>;

    /// 删除项目
    ///
    /// 关联表中的记录由外键的 `ON DELETE CASCADE` 自动删除
    ///
    /// # 返回值
    /// 返回被删除的项目信息
    async fn delete_project(&self, id: i64) -> DatabaseResult<ProjectRecord>;

    /// 判断标题是否已被占用
    ///
    /// # 参数
    /// - `title`: 待检查的标题
    /// - `ignore_id`: 需要排除的项目 ID（编辑自身时使用）
    async fn title_exists(&self, title: &str, ignore_id: Option<i64>) -> DatabaseResult<bool>;

    /// 判断图片路径是否被项目引用
    ///
    /// 不同标题可能生成相同的slug，写入或删除图片前需要确认文件不属于其他项目。
    ///
    /// # 参数
    /// - `path`: 图片在文件存储中的路径
    /// - `ignore_id`: 需要排除的项目 ID（图片的当前所有者）
    async fn image_in_use(&self, path: &str, ignore_id: Option<i64>) -> DatabaseResult<bool>;

    /// 获取项目当前关联的技术栈 ID 列表
    async fn technology_ids(&self, project_id: i64) -> DatabaseResult<Vec<i64>>;

    /// 为项目添加技术栈关联，已存在的关联会被忽略
    async fn attach_technologies(&self, project_id: i64, technology_ids: &[i64]) -> DatabaseResult<()>;

    /// 删除项目的指定技术栈关联
    async fn detach_technologies(&self, project_id: i64, technology_ids: &[i64]) -> DatabaseResult<()>;
}

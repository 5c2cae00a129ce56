//! 服务层 trait 定义
//!
//! 定义服务层的抽象接口，遵循六边形架构的端口适配器模式

use crate::models::err::AppResult;
use crate::models::flash::ActionOutcome;
use crate::models::projects::{ProjectDetail, ProjectForm, ProjectFormData, ProjectListing};

/// 项目服务 trait 定义
///
/// 定义了项目管理后台的全部业务接口，作为应用层的端口(Port)。
/// 路由层通过 `Arc<dyn ProjectServiceTrait>` 调用，具体实现由 [`crate::services::ProjectService`] 提供。
#[async_trait::async_trait]
pub trait ProjectServiceTrait: Send + Sync + 'static {
    /// 分页查询项目，最近修改的排在前面
    ///
    /// # 参数
    /// - `page_index`: 页码，从1开始，每页固定10条
    async fn list_projects(&self, page_index: u32) -> AppResult<ProjectListing>;

    /// 新建项目表单需要的数据：空项目 + 全部类型和技术栈
    async fn new_project_form(&self) -> AppResult<ProjectFormData>;

    /// 校验并创建项目
    ///
    /// # 返回值
    /// 成功时返回提示消息和新项目的详情页地址
    async fn create_project(&self, form: ProjectForm) -> AppResult<ActionOutcome>;

    /// 查询项目详情，项目不存在时返回 NotFound
    async fn get_project(&self, id: i64) -> AppResult<ProjectDetail>;

    /// 编辑项目表单需要的数据，包含当前已关联的技术栈
    async fn edit_project_form(&self, id: i64) -> AppResult<ProjectFormData>;

    /// 校验并更新项目，同时同步技术栈关联
    async fn update_project(&self, id: i64, form: ProjectForm) -> AppResult<ActionOutcome>;

    /// 删除项目
    async fn delete_project(&self, id: i64) -> AppResult<ActionOutcome>;
}

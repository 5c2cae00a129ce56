//! 项目管理相关接口
//!
//! 写接口接收 `multipart/form-data` 表单，成功后返回提示消息和跳转地址（见 [`ActionOutcome`]）。

use crate::models::common::{PageQuery, Reply, ReplyList};
use crate::models::err::AppError;
use crate::models::flash::{ActionOutcome, FlashMessage};
use crate::models::projects::{ProjectDetail, ProjectForm, ProjectFormData, ProjectInfo};
use crate::AppState;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;
use validator::Validate;

/// 项目列表
///
/// 按最近修改时间倒序返回项目，每页固定10条。
///
/// ## 参数
///
/// - state: 从路由函数传递给来的共享数据
/// - query: 页码，从1开始，默认为1
#[utoipa::path(get,
    path = "/projects",
    tag = "projects",
    params(PageQuery),
    responses(
        (status = 200, description = "Project list", body = ReplyList<ProjectInfo>),
        (status = 400, description = "Invalid page"),
    ),
)]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ReplyList<ProjectInfo>>, AppError> {
    debug!("🔍 查询项目列表 {:?}", query);

    // 验证输入参数，确保有效性
    query.validate()?;

    let listing = state.project_service.list_projects(query.page_index()).await?;

    Ok(Json(ReplyList::new(
        listing.projects,
        listing.total,
        listing.page_index,
        listing.page_size,
    )))
}

/// 新建项目表单
///
/// 返回空项目以及全部可选的类型和技术栈
#[utoipa::path(get,
    path = "/projects/create",
    tag = "projects",
    responses(
        (status = 200, description = "Empty form scaffold", body = Reply<ProjectFormData>)
    ),
)]
pub async fn new_project_form(State(state): State<AppState>) -> Result<Json<Reply<ProjectFormData>>, AppError> {
    let data = state.project_service.new_project_form().await?;

    Ok(Json(Reply { data }))
}

/// 创建项目
///
/// 校验失败时返回422和字段级错误信息，成功时返回201以及新项目的详情页地址
#[utoipa::path(post,
    path = "/projects",
    tag = "projects",
    request_body(content = ProjectForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Project created", body = Reply<FlashMessage>),
        (status = 422, description = "Validation failed"),
    ),
)]
pub async fn create_project(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, ActionOutcome), AppError> {
    let form = ProjectForm::from_multipart(multipart).await?;
    debug!("📝 创建项目 {:?}", form);

    let outcome = state.project_service.create_project(form).await?;

    Ok((StatusCode::CREATED, outcome))
}

/// 查询指定项目信息
#[utoipa::path(get,
    path = "/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "项目ID")),
    responses(
        (status = 200, description = "Project detail", body = Reply<ProjectDetail>),
        (status = 404, description = "Project not found"),
    ),
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<Reply<ProjectDetail>>, AppError> {
    debug!("Getting project id {}", project_id);

    let data = state.project_service.get_project(project_id).await?;

    Ok(Json(Reply { data }))
}

/// 编辑项目表单
///
/// 返回项目当前值、全部类型和技术栈，以及已关联的技术栈ID
#[utoipa::path(get,
    path = "/projects/{id}/edit",
    tag = "projects",
    params(("id" = i64, Path, description = "项目ID")),
    responses(
        (status = 200, description = "Pre-filled form scaffold", body = Reply<ProjectFormData>),
        (status = 404, description = "Project not found"),
    ),
)]
pub async fn edit_project_form(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<Reply<ProjectFormData>>, AppError> {
    let data = state.project_service.edit_project_form(project_id).await?;

    Ok(Json(Reply { data }))
}

/// 更新项目信息
///
/// 表单字段与创建项目相同。没有提交 `technologies` 时会清空项目的全部技术栈。
#[utoipa::path(put,
    path = "/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "项目ID")),
    request_body(content = ProjectForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Project updated", body = Reply<FlashMessage>),
        (status = 404, description = "Project not found"),
        (status = 422, description = "Validation failed"),
    ),
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    multipart: Multipart,
) -> Result<ActionOutcome, AppError> {
    let form = ProjectForm::from_multipart(multipart).await?;
    debug!("Updating project {} with {:?}", project_id, form);

    state.project_service.update_project(project_id, form).await
}

/// 删除指定的项目
#[utoipa::path(delete,
    path = "/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "项目ID")),
    responses(
        (status = 200, description = "Project deleted", body = Reply<FlashMessage>),
        (status = 404, description = "Project not found"),
    ),
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<ActionOutcome, AppError> {
    debug!("delete project {}", project_id);

    state.project_service.delete_project(project_id).await
}

use std::collections::BTreeMap;

use axum::extract::multipart::MultipartError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use color_eyre::eyre::Error;
use database::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::services::storage::StorageError;

/// 服务层/路由层统一使用的结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 使用 [`thiserror`] 定义错误类型
/// 方便根据类型转换为相应的http错误码
#[derive(Error, Debug)]
pub enum AppError {
    /// 数据验证错误，这种错误通常都是用户参数不正确导致的，转换为422并返回字段级错误信息
    #[error(transparent)]
    ValidationFailed(#[from] ValidationErrors),

    /// 仓库层数据库错误
    #[error(transparent)]
    RepositoryError(#[from] DatabaseError),

    /// 图片文件读写错误
    #[error(transparent)]
    StorageError(#[from] StorageError),

    /// multipart表单解析失败
    #[error(transparent)]
    MultipartError(#[from] MultipartError),

    /// 其他类型错误
    #[error(transparent)]
    InternalError(#[from] Error),
}

/// 把 [`ValidationErrors`] 转换为 `字段 -> 错误信息列表` 的形式
///
/// 没有自定义message的错误使用错误码代替
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| e.message.as_ref().map_or_else(|| e.code.to_string(), ToString::to_string))
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::ValidationFailed(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "message": "Validate failed",
                    "errors": field_messages(&err),
                })),
            )
                .into_response(),
            AppError::RepositoryError(err) => match err {
                DatabaseError::SqlxError(sqlx::Error::RowNotFound) => {
                    (StatusCode::NOT_FOUND, format!("Record not found: {err}")).into_response()
                }
                DatabaseError::NotFound(msg) => (StatusCode::NOT_FOUND, format!("Resource not found: {msg}")).into_response(),
                DatabaseError::ForeignKeyViolation(_) | DatabaseError::UniqueViolation(_) => {
                    (StatusCode::CONFLICT, format!("Conflict: {err}")).into_response()
                }
                _ => {
                    error!("❌ Repository error: {err}");
                    (StatusCode::INTERNAL_SERVER_ERROR, format!("Repository error: {err}")).into_response()
                }
            },
            AppError::StorageError(err) => {
                error!("❌ Storage error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Storage error: {err}")).into_response()
            }
            AppError::MultipartError(err) => (err.status(), format!("Invalid form data: {err}")).into_response(),
            AppError::InternalError(err) => {
                error!("❌ Internal error: {err:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Something went wrong: {err}")).into_response()
            }
        }
    }
}

//! 写操作的结果
//!
//! 创建/更新/删除成功后，服务层只描述"跳转到哪里、提示什么"，
//! 具体如何展示（重定向、弹出提示）由调用方决定。

use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::common::Reply;
use crate::routes::API_PREFIX;

/// 提示消息的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Danger,
}

/// 操作完成后的跳转目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// 项目列表页
    Index,
    /// 指定项目的详情页
    Show(i64),
}

impl Redirect {
    /// 跳转目标对应的接口地址，带 [`API_PREFIX`] 前缀
    pub fn to_path(self) -> String {
        match self {
            Redirect::Index => format!("{API_PREFIX}/projects"),
            Redirect::Show(id) => format!("{API_PREFIX}/projects/{id}"),
        }
    }
}

/// 写操作的结果：成功/失败类别 + 提示消息 + 跳转目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub kind: FlashKind,
    pub message: String,
    pub redirect: Redirect,
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>, redirect: Redirect) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
            redirect,
        }
    }

    pub fn danger(message: impl Into<String>, redirect: Redirect) -> Self {
        Self {
            kind: FlashKind::Danger,
            message: message.into(),
            redirect,
        }
    }
}

/// [`ActionOutcome`] 的json表示
#[derive(Debug, Serialize, ToSchema)]
pub struct FlashMessage {
    #[serde(rename = "type")]
    #[schema(example = "success")]
    /// 提示类别：`success` 或 `danger`
    pub kind: FlashKind,

    #[schema(example = "Progetto creato con successo")]
    pub message: String,

    #[schema(example = "/api/v1/projects/15")]
    /// 前端应该跳转到的页面
    pub redirect_to: String,
}

impl From<ActionOutcome> for FlashMessage {
    fn from(outcome: ActionOutcome) -> Self {
        Self {
            kind: outcome.kind,
            message: outcome.message,
            redirect_to: outcome.redirect.to_path(),
        }
    }
}

/// 返回json提示，同时通过 `Location` 头告诉前端跳转目标
impl IntoResponse for ActionOutcome {
    fn into_response(self) -> Response {
        let location = self.redirect.to_path();
        ([(header::LOCATION, location)], Json(Reply { data: FlashMessage::from(self) })).into_response()
    }
}

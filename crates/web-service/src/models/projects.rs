use std::fmt;

use axum::extract::multipart::{Multipart, MultipartError};
use chrono::{DateTime, Utc};
use database::{ProjectRecord, ProjectTypeRecord, TechnologyRecord};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

/// 创建/更新项目时提交的表单
///
/// 只保存用户原始输入，字段校验由 [`crate::services::validation`] 完成。
/// `Option` 表示字段是否出现在请求中：`is_published` 只关心是否出现，不关心取值。
#[derive(Debug, Default, Clone, ToSchema)]
pub struct ProjectForm {
    #[schema(example = "Portfolio Site")]
    /// 项目标题，5~50个字符，不能与其他项目重复
    pub title: Option<String>,

    #[schema(example = "Il mio portfolio personale")]
    /// 项目内容
    pub content: Option<String>,

    #[schema(value_type = Option<String>, format = Binary)]
    /// 项目图片，仅支持 png/jpg/jpeg
    pub image: Option<UploadedImage>,

    #[schema(example = "1")]
    /// 复选框，出现即表示发布
    pub is_published: Option<String>,

    #[schema(example = "2")]
    /// 项目类型ID，可为空
    pub type_id: Option<String>,

    #[schema(example = json!(["1", "3"]))]
    /// 关联的技术栈ID列表，字段名也可以写成 `technologies[]`
    pub technologies: Option<Vec<String>>,
}

impl ProjectForm {
    /// 从 multipart 请求中读取项目表单
    ///
    /// - 未知字段会被忽略
    /// - `technologies` / `technologies[]` 可以出现多次
    /// - 没有内容的 `image` 字段（浏览器未选择文件时也会提交）视为没有上传图片
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = ProjectForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "title" => form.title = Some(field.text().await?),
                "content" => form.content = Some(field.text().await?),
                "is_published" => form.is_published = Some(field.text().await?),
                "type_id" => form.type_id = Some(field.text().await?),
                "technologies" | "technologies[]" => {
                    let value = field.text().await?;
                    form.technologies.get_or_insert_with(Vec::new).push(value);
                }
                "image" => {
                    let file_name = field.file_name().map(str::to_owned);
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field.bytes().await?;
                    if !bytes.is_empty() {
                        form.image = Some(UploadedImage {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                other => debug!("忽略未知表单字段: {other}"),
            }
        }

        Ok(form)
    }
}

/// 上传的图片文件
#[derive(Clone, Default)]
pub struct UploadedImage {
    /// 客户端提供的文件名
    pub file_name: Option<String>,
    /// 客户端声明的 Content-Type，仅用于日志，不参与校验
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProjectInfo {
    #[schema(example = 15)]
    /// 项目ID
    pub id: i64,

    #[schema(example = "Portfolio Site")]
    pub title: String,

    #[schema(example = "portfolio-site")]
    pub slug: String,

    pub content: String,

    #[schema(example = "project_images/portfolio-site.png")]
    /// 图片在文件存储中的路径
    pub image: Option<String>,

    pub is_published: bool,

    pub type_id: Option<i64>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl From<ProjectRecord> for ProjectInfo {
    fn from(record: ProjectRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            slug: record.slug,
            content: record.content,
            image: record.image,
            is_published: record.is_published,
            type_id: record.type_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// 项目类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TypeInfo {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Frontend")]
    pub label: String,
}

impl From<ProjectTypeRecord> for TypeInfo {
    fn from(record: ProjectTypeRecord) -> Self {
        Self {
            id: record.id,
            label: record.label,
        }
    }
}

/// 技术栈
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TechnologyInfo {
    #[schema(example = 3)]
    pub id: i64,
    #[schema(example = "Rust")]
    pub label: String,
}

impl From<TechnologyRecord> for TechnologyInfo {
    fn from(record: TechnologyRecord) -> Self {
        Self {
            id: record.id,
            label: record.label,
        }
    }
}

/// 项目详情，包含类型和关联的技术栈
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectDetail {
    pub project: ProjectInfo,
    pub project_type: Option<TypeInfo>,
    pub technologies: Vec<TechnologyInfo>,
}

/// 表单中可编辑的项目字段
///
/// 新建项目时为空，编辑项目时为当前值
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ProjectFields {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub is_published: bool,
    pub type_id: Option<i64>,
}

impl From<&ProjectRecord> for ProjectFields {
    fn from(record: &ProjectRecord) -> Self {
        Self {
            title: record.title.clone(),
            content: record.content.clone(),
            image: record.image.clone(),
            is_published: record.is_published,
            type_id: record.type_id,
        }
    }
}

/// 新建/编辑表单需要的全部数据
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectFormData {
    /// 编辑时为项目ID，新建时为空
    pub project_id: Option<i64>,
    pub project: ProjectFields,
    /// 所有可选的项目类型
    pub types: Vec<TypeInfo>,
    /// 所有可选的技术栈
    pub technologies: Vec<TechnologyInfo>,
    /// 当前已关联的技术栈ID，用于预选
    pub selected_technologies: Vec<i64>,
}

/// 一页项目列表
#[derive(Debug, Clone)]
pub struct ProjectListing {
    pub projects: Vec<ProjectInfo>,
    pub total: u64,
    pub page_index: u32,
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};

    const BOUNDARY: &str = "X-PORTFOLIO-BOUNDARY";

    fn text_part(name: &str, value: &str) -> String {
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
    }

    async fn multipart_from(parts: Vec<String>, file: Option<(&str, &[u8])>) -> Multipart {
        let mut body: Vec<u8> = parts.concat().into_bytes();
        if let Some((file_name, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/projects")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_from_multipart_reads_fields() {
        let multipart = multipart_from(
            vec![
                text_part("title", "Portfolio Site"),
                text_part("content", "Contenuto"),
                text_part("is_published", "0"),
                text_part("technologies[]", "1"),
                text_part("technologies[]", "3"),
                text_part("_token", "ignored"),
            ],
            Some(("cover.PNG", &b"\x89PNG\r\n\x1a\nrest"[..])),
        )
        .await;

        let form = ProjectForm::from_multipart(multipart).await.unwrap();

        assert_eq!(form.title.as_deref(), Some("Portfolio Site"));
        assert_eq!(form.content.as_deref(), Some("Contenuto"));
        assert_eq!(form.is_published.as_deref(), Some("0"));
        assert_eq!(form.type_id, None);
        assert_eq!(form.technologies, Some(vec!["1".to_string(), "3".to_string()]));

        let image = form.image.unwrap();
        assert_eq!(image.file_name.as_deref(), Some("cover.PNG"));
        assert_eq!(image.bytes, b"\x89PNG\r\n\x1a\nrest".to_vec());
    }

    #[tokio::test]
    async fn test_from_multipart_empty_image_is_absent() {
        let multipart = multipart_from(vec![text_part("title", "Senza immagine")], Some(("", &b""[..]))).await;

        let form = ProjectForm::from_multipart(multipart).await.unwrap();

        assert!(form.image.is_none());
        assert!(form.technologies.is_none());
        assert!(form.is_published.is_none());
    }
}

//! 项目表单校验
//!
//! 校验规则与错误信息（意大利语）：
//!
//! | 字段 | 规则 |
//! |---|---|
//! | title | 必填，5~50个字符，不能与其他项目重复 |
//! | content | 必填 |
//! | image | 可选，必须是图片，且只能是 png/jpg/jpeg |
//! | is_published | 可选，复选框取值 |
//! | type_id | 可选，必须是已存在的类型 |
//! | technologies | 可选，每一项都必须是已存在的技术栈 |
//!
//! 所有字段都会被检查，错误一次性返回，校验失败时不会写入任何数据。

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::Path;

use database::{ProjectRepositoryTrait, ProjectTypeRepositoryTrait, TechnologyRepositoryTrait};
use slug::slugify;
use validator::{ValidationError, ValidationErrors};

use crate::models::err::AppResult;
use crate::models::projects::{ProjectForm, UploadedImage};

pub const TITLE_REQUIRED: &str = "Il titolo é obbligatorio";
pub const TITLE_MIN: &str = "Il titolo deve essere almeno 5 caratteri";
pub const TITLE_MAX: &str = "Il titolo deve essere al massimo 50 caratteri";
pub const TITLE_UNIQUE: &str = "Non possono esistere due progetti con lo stesso titolo";
pub const CONTENT_REQUIRED: &str = "Il contenuto é obbligatorio";
pub const IMAGE_NOT_IMAGE: &str = "Il file inserito non é un'immagine";
pub const IMAGE_MIMES: &str = "Le estensioni valide sono png, jpg, jpeg";
pub const IS_PUBLISHED_BOOLEAN: &str = "Il valore del campo non é valido";
pub const TYPE_EXISTS: &str = "Tipo non valido";
pub const TECHNOLOGIES_EXISTS: &str = "Tecnologia selezionata non valida";

const TITLE_MIN_CHARS: usize = 5;
const TITLE_MAX_CHARS: usize = 50;

/// 复选框可以接受的取值（忽略大小写）
const BOOLEAN_VALUES: [&str; 7] = ["", "1", "0", "true", "false", "on", "off"];

/// 通过文件头识别出的图片类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
}

impl ImageKind {
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else if bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else {
            None
        }
    }

    /// 项目图片只允许 png/jpg/jpeg
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Png | Self::Jpeg)
    }

    fn canonical_extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
        }
    }

    fn accepts_extension(self, extension: &str) -> bool {
        match self {
            Self::Png => extension == "png",
            Self::Jpeg => extension == "jpg" || extension == "jpeg",
            _ => false,
        }
    }
}

/// 通过校验的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl ValidImage {
    /// 存储时使用的文件名：`<slug>.<扩展名>`
    pub fn file_name(&self, slug: &str) -> String {
        format!("{slug}.{}", self.extension)
    }
}

/// 通过校验的项目数据
#[derive(Debug, Clone)]
pub struct ValidProject {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image: Option<ValidImage>,
    pub is_published: bool,
    pub type_id: Option<i64>,
    /// `None` 表示请求中没有技术栈字段
    pub technologies: Option<BTreeSet<i64>>,
}

/// 需要访问数据库的校验器（唯一性、外键存在性）
pub struct ProjectValidator<'a, PR, TR, CR> {
    pub projects: &'a PR,
    pub types: &'a TR,
    pub technologies: &'a CR,
}

impl<PR, TR, CR> ProjectValidator<'_, PR, TR, CR>
where
    PR: ProjectRepositoryTrait,
    TR: ProjectTypeRepositoryTrait,
    CR: TechnologyRepositoryTrait,
{
    /// 校验表单
    ///
    /// # 参数
    /// - `form`: 用户提交的表单
    /// - `ignore_id`: 检查标题唯一性时需要排除的项目（编辑自身）
    pub async fn validate(&self, form: ProjectForm, ignore_id: Option<i64>) -> AppResult<ValidProject> {
        let mut errors = ValidationErrors::new();

        let title = check_title(form.title.as_deref(), &mut errors);
        let content = check_content(form.content.as_deref(), &mut errors);
        let image = form.image.as_ref().and_then(|upload| check_image(upload, &mut errors));
        let is_published = check_is_published(form.is_published.as_deref(), &mut errors);
        let type_id = parse_type_id(form.type_id.as_deref(), &mut errors);
        let technologies = parse_technologies(form.technologies.as_deref(), &mut errors);

        if let Some(title) = &title {
            if self.projects.title_exists(title, ignore_id).await? {
                add_error(&mut errors, "title", "unique", TITLE_UNIQUE);
            }
        }

        if let Some(id) = type_id {
            if self.types.find_type(id).await?.is_none() {
                add_error(&mut errors, "type_id", "exists", TYPE_EXISTS);
            }
        }

        if let Some(ids) = technologies.as_ref().filter(|ids| !ids.is_empty()) {
            let requested: Vec<i64> = ids.iter().copied().collect();
            let found: BTreeSet<i64> = self.technologies.existing_ids(&requested).await?.into_iter().collect();
            if &found != ids {
                add_error(&mut errors, "technologies", "exists", TECHNOLOGIES_EXISTS);
            }
        }

        let (Some(title), Some(content), true) = (title, content, errors.is_empty()) else {
            return Err(errors.into());
        };

        Ok(ValidProject {
            slug: slugify(&title),
            title,
            content,
            image,
            is_published,
            type_id,
            technologies,
        })
    }
}

/// 数据库唯一约束冲突时使用的标题错误
pub fn title_taken() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    add_error(&mut errors, "title", "unique", TITLE_UNIQUE);
    errors
}

fn add_error(errors: &mut ValidationErrors, field: &'static str, code: &'static str, message: &'static str) {
    errors.add(field, ValidationError::new(code).with_message(Cow::Borrowed(message)));
}

/// 检查标题，返回去掉首尾空白后的标题
fn check_title(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    let title = raw.map(str::trim).unwrap_or_default();
    let chars = title.chars().count();

    if title.is_empty() {
        add_error(errors, "title", "required", TITLE_REQUIRED);
        None
    } else if chars < TITLE_MIN_CHARS {
        add_error(errors, "title", "min", TITLE_MIN);
        None
    } else if chars > TITLE_MAX_CHARS {
        add_error(errors, "title", "max", TITLE_MAX);
        None
    } else {
        Some(title.to_string())
    }
}

fn check_content(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    match raw.map(str::trim) {
        Some(content) if !content.is_empty() => Some(content.to_string()),
        _ => {
            add_error(errors, "content", "required", CONTENT_REQUIRED);
            None
        }
    }
}

/// 检查上传的图片
///
/// 非图片文件同时违反 `image` 和 `mimes` 两条规则
fn check_image(upload: &UploadedImage, errors: &mut ValidationErrors) -> Option<ValidImage> {
    let kind = match ImageKind::detect(&upload.bytes) {
        Some(kind) => kind,
        None => {
            add_error(errors, "image", "image", IMAGE_NOT_IMAGE);
            add_error(errors, "image", "mimes", IMAGE_MIMES);
            return None;
        }
    };

    if !kind.is_allowed() {
        add_error(errors, "image", "mimes", IMAGE_MIMES);
        return None;
    }

    // 优先保留客户端文件名中的扩展名，与文件内容不符时使用内容对应的扩展名
    let extension = upload
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| kind.accepts_extension(ext))
        .unwrap_or_else(|| kind.canonical_extension().to_string());

    Some(ValidImage {
        extension,
        bytes: upload.bytes.clone(),
    })
}

/// 字段出现即为发布，与取值无关；取值本身仍需是合法的复选框值
fn check_is_published(raw: Option<&str>, errors: &mut ValidationErrors) -> bool {
    let Some(value) = raw else {
        return false;
    };

    let value = value.trim().to_ascii_lowercase();
    if !BOOLEAN_VALUES.contains(&value.as_str()) {
        add_error(errors, "is_published", "boolean", IS_PUBLISHED_BOOLEAN);
    }
    true
}

/// 空值表示不设置类型
fn parse_type_id(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<i64> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty())?;

    match value.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            add_error(errors, "type_id", "exists", TYPE_EXISTS);
            None
        }
    }
}

/// 空字符串会被忽略，重复的ID会被合并
fn parse_technologies(raw: Option<&[String]>, errors: &mut ValidationErrors) -> Option<BTreeSet<i64>> {
    let values = raw?;
    let mut ids = BTreeSet::new();
    let mut invalid = false;

    for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        match value.parse::<i64>() {
            Ok(id) => {
                ids.insert(id);
            }
            Err(_) => invalid = true,
        }
    }

    if invalid {
        add_error(errors, "technologies", "exists", TECHNOLOGIES_EXISTS);
    }
    Some(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::err::field_messages;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    fn upload(file_name: &str, bytes: &[u8]) -> UploadedImage {
        UploadedImage {
            file_name: Some(file_name.to_string()),
            content_type: None,
            bytes: bytes.to_vec(),
        }
    }

    fn messages(errors: &ValidationErrors, field: &str) -> Vec<String> {
        field_messages(errors).remove(field).unwrap_or_default()
    }

    #[test]
    fn test_title_rules() {
        let mut errors = ValidationErrors::new();
        assert_eq!(check_title(Some("  Portfolio Site  "), &mut errors), Some("Portfolio Site".to_string()));
        assert!(errors.is_empty());

        for (raw, expected) in [
            (None, TITLE_REQUIRED),
            (Some("   "), TITLE_REQUIRED),
            (Some("Sito"), TITLE_MIN),
            (Some("x".repeat(51).as_str()), TITLE_MAX),
        ] {
            let mut errors = ValidationErrors::new();
            assert!(check_title(raw, &mut errors).is_none());
            assert_eq!(messages(&errors, "title"), vec![expected.to_string()]);
        }
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        let mut errors = ValidationErrors::new();
        // 5个字符，10个字节
        assert!(check_title(Some("èèèèè"), &mut errors).is_some());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_content_required() {
        let mut errors = ValidationErrors::new();
        assert!(check_content(Some(""), &mut errors).is_none());
        assert_eq!(messages(&errors, "content"), vec![CONTENT_REQUIRED.to_string()]);
    }

    #[test]
    fn test_image_detection() {
        assert_eq!(ImageKind::detect(PNG), Some(ImageKind::Png));
        assert_eq!(ImageKind::detect(JPEG), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::detect(b"GIF89a..."), Some(ImageKind::Gif));
        assert_eq!(ImageKind::detect(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageKind::Webp));
        assert_eq!(ImageKind::detect(b"hello world"), None);
    }

    #[test]
    fn test_image_extension() {
        let mut errors = ValidationErrors::new();

        let image = check_image(&upload("Cover.JPEG", JPEG), &mut errors).unwrap();
        assert_eq!(image.extension, "jpeg");
        assert_eq!(image.file_name("portfolio-site"), "portfolio-site.jpeg");

        // 扩展名与内容不符时使用内容对应的扩展名
        let image = check_image(&upload("cover.jpg", PNG), &mut errors).unwrap();
        assert_eq!(image.extension, "png");

        assert!(errors.is_empty());
    }

    #[test]
    fn test_image_rejections() {
        let mut errors = ValidationErrors::new();
        assert!(check_image(&upload("notes.png", b"just text"), &mut errors).is_none());
        assert_eq!(
            messages(&errors, "image"),
            vec![IMAGE_NOT_IMAGE.to_string(), IMAGE_MIMES.to_string()]
        );

        let mut errors = ValidationErrors::new();
        assert!(check_image(&upload("anim.gif", b"GIF89a...."), &mut errors).is_none());
        assert_eq!(messages(&errors, "image"), vec![IMAGE_MIMES.to_string()]);
    }

    #[test]
    fn test_is_published_presence() {
        let mut errors = ValidationErrors::new();
        assert!(!check_is_published(None, &mut errors));
        assert!(check_is_published(Some("1"), &mut errors));
        assert!(check_is_published(Some("0"), &mut errors));
        assert!(check_is_published(Some("on"), &mut errors));
        assert!(check_is_published(Some(""), &mut errors));
        assert!(errors.is_empty());

        assert!(check_is_published(Some("maybe"), &mut errors));
        assert_eq!(messages(&errors, "is_published"), vec![IS_PUBLISHED_BOOLEAN.to_string()]);
    }

    #[test]
    fn test_parse_ids() {
        let mut errors = ValidationErrors::new();
        assert_eq!(parse_type_id(Some(""), &mut errors), None);
        assert_eq!(parse_type_id(Some(" 4 "), &mut errors), Some(4));

        let raw = vec!["3".to_string(), "1".to_string(), "3".to_string(), "".to_string()];
        assert_eq!(parse_technologies(Some(raw.as_slice()), &mut errors), Some(BTreeSet::from([1, 3])));
        assert_eq!(parse_technologies(None, &mut errors), None);
        assert!(errors.is_empty());

        assert_eq!(parse_type_id(Some("abc"), &mut errors), None);
        let raw = vec!["x".to_string()];
        parse_technologies(Some(raw.as_slice()), &mut errors);
        assert_eq!(messages(&errors, "type_id"), vec![TYPE_EXISTS.to_string()]);
        assert_eq!(messages(&errors, "technologies"), vec![TECHNOLOGIES_EXISTS.to_string()]);
    }
}

//! 项目数据库模型
//!
//! 定义项目相关的数据库模型结构体

use chrono::{DateTime, Utc};

/// 项目信息结构体，对应 `projects` 表的一行
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProjectRecord {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    /// 图片在文件存储中的相对路径
    pub image: Option<String>,
    pub is_published: bool,
    pub type_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 分页查询结果
#[derive(Debug, Clone)]
pub struct ProjectPage {
    pub projects: Vec<ProjectRecord>,
    pub total: u64,
}

/// 项目创建参数
///
/// 所有字段都需要显式赋值，`slug` 由上层根据标题计算
#[derive(Debug, Clone)]
pub struct ProjectCreate {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image: Option<String>,
    pub is_published: bool,
    pub type_id: Option<i64>,
}

/// 项目更新参数
///
/// 与 [`ProjectCreate`] 不同，这里的值会整体覆盖数据库中的旧值。
/// 如果不需要修改图片，上层需要把旧路径原样传回。
#[derive(Debug, Clone)]
pub struct ProjectUpdate {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image: Option<String>,
    pub is_published: bool,
    pub type_id: Option<i64>,
}

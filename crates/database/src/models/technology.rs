//! 技术栈数据库模型

/// `technologies` 表记录，通过 `project_technology` 关联到项目
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TechnologyRecord {
    pub id: i64,
    pub label: String,
}

//! 项目类型数据库模型

/// `types` 表记录，只读的参考数据
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProjectTypeRecord {
    pub id: i64,
    pub label: String,
}

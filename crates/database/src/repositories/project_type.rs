//! 项目类型仓库

use crate::models::project_type::ProjectTypeRecord;
use crate::repositories::traits::ProjectTypeRepositoryTrait;
use crate::DatabaseResult;
use sqlx::PgPool;
use tracing::debug;

/// 项目类型仓库结构体
#[derive(Debug, Clone)]
pub struct ProjectTypeRepository {
    pool: PgPool,
}

impl ProjectTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProjectTypeRepositoryTrait for ProjectTypeRepository {
    async fn list_types(&self) -> DatabaseResult<Vec<ProjectTypeRecord>> {
        debug!("🔍 查询全部项目类型");

        let types = sqlx::query_as::<_, ProjectTypeRecord>("SELECT id, label FROM types ORDER BY label, id")
            .fetch_all(&self.pool)
            .await?;

        Ok(types)
    }

    async fn find_type(&self, id: i64) -> DatabaseResult<Option<ProjectTypeRecord>> {
        let project_type = sqlx::query_as::<_, ProjectTypeRecord>("SELECT id, label FROM types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(project_type)
    }
}

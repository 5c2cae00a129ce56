//! 技术栈仓库

use crate::models::technology::TechnologyRecord;
use crate::repositories::traits::TechnologyRepositoryTrait;
use crate::DatabaseResult;
use sqlx::PgPool;
use tracing::debug;

/// 技术栈仓库结构体
#[derive(Debug, Clone)]
pub struct TechnologyRepository {
    pool: PgPool,
}

impl TechnologyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TechnologyRepositoryTrait for TechnologyRepository {
    async fn list_technologies(&self) -> DatabaseResult<Vec<TechnologyRecord>> {
        debug!("🔍 查询全部技术栈");

        let technologies = sqlx::query_as::<_, TechnologyRecord>("SELECT id, label FROM technologies ORDER BY label, id")
            .fetch_all(&self.pool)
            .await?;

        Ok(technologies)
    }

    async fn existing_ids(&self, ids: &[i64]) -> DatabaseResult<Vec<i64>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found = sqlx::query_scalar("SELECT id FROM technologies WHERE id = ANY($1) ORDER BY id")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;

        Ok(found)
    }

    async fn technologies_for_project(&self, project_id: i64) -> DatabaseResult<Vec<TechnologyRecord>> {
        let technologies = sqlx::query_as::<_, TechnologyRecord>(
            r#"
            SELECT t.id, t.label
            FROM technologies t
            JOIN project_technology pt ON pt.technology_id = t.id
            WHERE pt.project_id = $1
            ORDER BY t.label, t.id
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(technologies)
    }
}

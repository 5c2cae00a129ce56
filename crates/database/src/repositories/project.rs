//! 项目仓库
//!
//! 负责项目相关的数据库操作

use crate::models::project::{ProjectCreate, ProjectPage, ProjectRecord, ProjectUpdate};
use crate::repositories::traits::ProjectRepositoryTrait;
use crate::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::debug;

/// 查询项目时统一使用的字段列表
const PROJECT_COLUMNS: &str = "id, title, slug, content, image, is_published, type_id, created_at, updated_at";

/// 项目仓库结构体
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    /// 创建新的项目仓库实例
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProjectRepositoryTrait for ProjectRepository {
    /// 分页查询项目列表
    ///
    /// 最近修改的项目排在前面，修改时间相同时再按创建时间倒序。
    ///
    /// # SQL 查询说明
    ///
    /// 总数使用单独的 `COUNT(*)` 查询，这样即使 `offset` 超出范围，也能返回正确的总数。
    async fn find_projects(&self, page_size: i64, offset: i64) -> DatabaseResult<ProjectPage> {
        debug!("🔍 查询项目列表 - 页面大小: {}, 偏移量: {}", page_size, offset);

        let projects = sqlx::query_as::<_, ProjectRecord>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            ORDER BY updated_at DESC, created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;

        debug!("✅ 查询完成 - 当前页 {} 个项目，总计 {} 个", projects.len(), total);

        Ok(ProjectPage {
            projects,
            total: total.max(0) as u64,
        })
    }

    async fn create_project(&self, project: ProjectCreate) -> DatabaseResult<ProjectRecord> {
        debug!("📝 创建项目: {:#?}", project);

        let record = sqlx::query_as::<_, ProjectRecord>(&format!(
            r#"
            INSERT INTO projects (title, slug, content, image, is_published, type_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, now(), now())
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&project.title)
        .bind(&project.slug)
        .bind(&project.content)
        .bind(&project.image)
        .bind(project.is_published)
        .bind(project.type_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_write)?;

        debug!("✅ 项目创建成功: {}", record.id);
        Ok(record)
    }

    async fn get_project_by_id(&self, id: i64) -> DatabaseResult<ProjectRecord> {
        debug!("🔍 根据 ID 获取项目: {}", id);

        sqlx::query_as::<_, ProjectRecord>(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 LIMIT 1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("project {id}")))
    }

    /// 更新项目信息
    ///
    /// 所有字段都会被 [`ProjectUpdate`] 中的值覆盖，不使用 `coalesce` 保留旧值：
    /// `image`/`type_id` 需要能被显式设置为 `NULL`。
    async fn update_project(&self, id: i64, update: ProjectUpdate) -> DatabaseResult<ProjectRecord> {
        debug!("🔄 更新项目 {} 信息: {:#?}", id, update);

        let record = sqlx::query_as::<_, ProjectRecord>(&format!(
            r#"
            UPDATE projects
            SET title = $2,
                slug = $3,
                content = $4,
                image = $5,
                is_published = $6,
                type_id = $7,
                updated_at = now()
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.title)
        .bind(&update.slug)
        .bind(&update.content)
        .bind(&update.image)
        .bind(update.is_published)
        .bind(update.type_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_write)?
        .ok_or_else(|| DatabaseError::not_found(format!("project {id}")))?;

        debug!("✅ 项目更新成功: {}", record.id);
        Ok(record)
    }

    async fn delete_project(&self, id: i64) -> DatabaseResult<ProjectRecord> {
        debug!("🗑️ 删除项目: {}", id);

        let record = sqlx::query_as::<_, ProjectRecord>(&format!(
            "DELETE FROM projects WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found(format!("project {id}")))?;

        debug!("✅ 项目删除成功: {}", record.id);
        Ok(record)
    }

    async fn title_exists(&self, title: &str, ignore_id: Option<i64>) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM projects
                WHERE title = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(title)
        .bind(ignore_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn image_in_use(&self, path: &str, ignore_id: Option<i64>) -> DatabaseResult<bool> {
        let in_use: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM projects
                WHERE image = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(path)
        .bind(ignore_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(in_use)
    }

    async fn technology_ids(&self, project_id: i64) -> DatabaseResult<Vec<i64>> {
        let ids = sqlx::query_scalar(
            "SELECT technology_id FROM project_technology WHERE project_id = $1 ORDER BY technology_id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn attach_technologies(&self, project_id: i64, technology_ids: &[i64]) -> DatabaseResult<()> {
        debug!("🔗 项目 {} 添加技术栈: {:?}", project_id, technology_ids);

        sqlx::query(
            r#"
            INSERT INTO project_technology (project_id, technology_id)
            SELECT $1, UNNEST($2::BIGINT[])
            ON CONFLICT (project_id, technology_id) DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(technology_ids.to_vec())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_write)?;

        Ok(())
    }

    async fn detach_technologies(&self, project_id: i64, technology_ids: &[i64]) -> DatabaseResult<()> {
        debug!("✂️ 项目 {} 移除技术栈: {:?}", project_id, technology_ids);

        sqlx::query("DELETE FROM project_technology WHERE project_id = $1 AND technology_id = ANY($2)")
            .bind(project_id)
            .bind(technology_ids.to_vec())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

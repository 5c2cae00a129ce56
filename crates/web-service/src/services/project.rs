//! 项目服务
//!
//! 提供项目管理后台的业务逻辑：表单校验、字段映射、图片存储以及技术栈关联的同步。

use std::collections::BTreeSet;

use database::{
    DatabaseError, ProjectCreate, ProjectRepositoryTrait, ProjectTypeRepositoryTrait, ProjectUpdate,
    TechnologyRepositoryTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::models::common::PAGE_SIZE;
use crate::models::err::{AppError, AppResult};
use crate::models::flash::{ActionOutcome, Redirect};
use crate::models::projects::{
    ProjectDetail, ProjectFields, ProjectForm, ProjectFormData, ProjectListing,
};
use crate::services::storage::{FileStorage, PROJECT_IMAGES_DIR};
use crate::services::sync::TechnologySync;
use crate::services::traits::ProjectServiceTrait;
use crate::services::validation::{title_taken, ProjectValidator, ValidImage};

pub const PROJECT_CREATED: &str = "Progetto creato con successo";
pub const PROJECT_UPDATED: &str = "Progetto modificato con successo";
pub const PROJECT_DELETED: &str = "Progetto eliminato";

#[derive(Debug, Clone)]
pub struct ProjectService<PR, TR, CR, FS> {
    project_repository: PR,
    type_repository: TR,
    technology_repository: CR,
    storage: FS,
}

impl<PR, TR, CR, FS> ProjectService<PR, TR, CR, FS>
where
    PR: ProjectRepositoryTrait,
    TR: ProjectTypeRepositoryTrait,
    CR: TechnologyRepositoryTrait,
    FS: FileStorage,
{
    pub fn new(project_repository: PR, type_repository: TR, technology_repository: CR, storage: FS) -> Self {
        Self {
            project_repository,
            type_repository,
            technology_repository,
            storage,
        }
    }

    fn validator(&self) -> ProjectValidator<'_, PR, TR, CR> {
        ProjectValidator {
            projects: &self.project_repository,
            types: &self.type_repository,
            technologies: &self.technology_repository,
        }
    }

    /// 保存图片，返回存储路径
    ///
    /// 文件名为 `<slug>.<扩展名>`。不同标题可能得到相同的slug，
    /// 文件名已被其他项目引用时依次尝试 `<slug>-2`、`<slug>-3`…
    async fn store_image(&self, image: &ValidImage, slug: &str, owner: Option<i64>) -> AppResult<String> {
        let mut file_name = image.file_name(slug);
        let mut suffix = 1;
        while self
            .project_repository
            .image_in_use(&format!("{PROJECT_IMAGES_DIR}/{file_name}"), owner)
            .await?
        {
            suffix += 1;
            file_name = image.file_name(&format!("{slug}-{suffix}"));
        }

        let path = self
            .storage
            .put_file_as(PROJECT_IMAGES_DIR, &file_name, &image.bytes)
            .await?;
        Ok(path)
    }

    /// 删除 `owner` 的图片，其他项目仍在引用时保留文件
    async fn release_image(&self, path: &str, owner: i64) -> AppResult<()> {
        if self.project_repository.image_in_use(path, Some(owner)).await? {
            debug!("图片 {} 仍被其他项目引用，跳过删除", path);
            return Ok(());
        }
        self.storage.delete(path).await?;
        Ok(())
    }

    /// 写入数据库失败后清理刚保存的图片，失败只记录日志
    async fn discard_image(&self, path: &str) {
        if let Err(err) = self.storage.delete(path).await {
            warn!("⚠️ 清理图片失败: {} ({})", path, err);
        }
    }

    /// 组装表单数据，`project` 为空时表示新建
    async fn form_data(&self, project: Option<(i64, ProjectFields)>, selected: Vec<i64>) -> AppResult<ProjectFormData> {
        let types = self.type_repository.list_types().await?;
        let technologies = self.technology_repository.list_technologies().await?;
        let (project_id, project) = match project {
            Some((id, fields)) => (Some(id), fields),
            None => (None, ProjectFields::default()),
        };

        Ok(ProjectFormData {
            project_id,
            project,
            types: types.into_iter().map(Into::into).collect(),
            technologies: technologies.into_iter().map(Into::into).collect(),
            selected_technologies: selected,
        })
    }
}

/// 写操作中的唯一约束冲突说明标题被并发请求占用，按标题校验失败处理
fn write_error(err: DatabaseError) -> AppError {
    match err {
        DatabaseError::UniqueViolation(_) => AppError::ValidationFailed(title_taken()),
        other => other.into(),
    }
}

#[async_trait::async_trait]
impl<PR, TR, CR, FS> ProjectServiceTrait for ProjectService<PR, TR, CR, FS>
where
    PR: ProjectRepositoryTrait,
    TR: ProjectTypeRepositoryTrait,
    CR: TechnologyRepositoryTrait,
    FS: FileStorage,
{
    #[instrument(skip(self))]
    async fn list_projects(&self, page_index: u32) -> AppResult<ProjectListing> {
        let page_index = page_index.max(1);
        // saturating_sub(1)会保证结果>=0，不会出现溢出
        let offset = i64::from(page_index.saturating_sub(1)) * i64::from(PAGE_SIZE);

        let page = self
            .project_repository
            .find_projects(i64::from(PAGE_SIZE), offset)
            .await?;

        Ok(ProjectListing {
            projects: page.projects.into_iter().map(Into::into).collect(),
            total: page.total,
            page_index,
            page_size: PAGE_SIZE,
        })
    }

    #[instrument(skip(self))]
    async fn new_project_form(&self) -> AppResult<ProjectFormData> {
        self.form_data(None, Vec::new()).await
    }

    #[instrument(skip(self))]
    async fn create_project(&self, form: ProjectForm) -> AppResult<ActionOutcome> {
        let project = self.validator().validate(form, None).await?;

        let image = match &project.image {
            Some(image) => Some(self.store_image(image, &project.slug, None).await?),
            None => None,
        };

        let created = self
            .project_repository
            .create_project(ProjectCreate {
                title: project.title,
                slug: project.slug,
                content: project.content,
                image: image.clone(),
                is_published: project.is_published,
                type_id: project.type_id,
            })
            .await;

        let record = match created {
            Ok(record) => record,
            Err(err) => {
                // 项目没有保存成功，刚写入的图片不再有用
                if let Some(path) = &image {
                    self.discard_image(path).await;
                }
                return Err(write_error(err));
            }
        };

        if let Some(technologies) = project.technologies.filter(|ids| !ids.is_empty()) {
            let ids: Vec<i64> = technologies.into_iter().collect();
            self.project_repository.attach_technologies(record.id, &ids).await?;
        }

        info!("✅ 项目创建成功: {} ({})", record.id, record.slug);
        Ok(ActionOutcome::success(PROJECT_CREATED, Redirect::Show(record.id)))
    }

    #[instrument(skip(self))]
    async fn get_project(&self, id: i64) -> AppResult<ProjectDetail> {
        let record = self.project_repository.get_project_by_id(id).await?;

        let project_type = match record.type_id {
            Some(type_id) => self.type_repository.find_type(type_id).await?,
            None => None,
        };
        let technologies = self.technology_repository.technologies_for_project(id).await?;

        Ok(ProjectDetail {
            project: record.into(),
            project_type: project_type.map(Into::into),
            technologies: technologies.into_iter().map(Into::into).collect(),
        })
    }

    #[instrument(skip(self))]
    async fn edit_project_form(&self, id: i64) -> AppResult<ProjectFormData> {
        let record = self.project_repository.get_project_by_id(id).await?;
        let selected = self.project_repository.technology_ids(id).await?;

        self.form_data(Some((record.id, ProjectFields::from(&record))), selected).await
    }

    #[instrument(skip(self))]
    async fn update_project(&self, id: i64, form: ProjectForm) -> AppResult<ActionOutcome> {
        let existing = self.project_repository.get_project_by_id(id).await?;
        let project = self.validator().validate(form, Some(id)).await?;

        let mut image = existing.image.clone();
        let mut stored = None;
        if let Some(upload) = &project.image {
            // 先删除旧图片，再按新的slug保存
            if let Some(old) = existing.image.as_deref() {
                self.release_image(old, id).await?;
            }
            let path = self.store_image(upload, &project.slug, Some(id)).await?;
            image = Some(path.clone());
            stored = Some(path);
        }

        let updated = self
            .project_repository
            .update_project(
                id,
                ProjectUpdate {
                    title: project.title,
                    slug: project.slug,
                    content: project.content,
                    image,
                    is_published: project.is_published,
                    type_id: project.type_id,
                },
            )
            .await;

        let record = match updated {
            Ok(record) => record,
            Err(err) => {
                if let Some(path) = &stored {
                    self.discard_image(path).await;
                }
                return Err(write_error(err));
            }
        };

        // 没有提交技术栈字段时清空全部关联
        let desired = project.technologies.unwrap_or_default();
        let current: BTreeSet<i64> = self.project_repository.technology_ids(id).await?.into_iter().collect();
        let sync = TechnologySync::plan(&current, &desired);

        if !sync.is_empty() {
            self.project_repository.attach_technologies(id, &sync.attach).await?;
            self.project_repository.detach_technologies(id, &sync.detach).await?;
        }

        info!(
            "✅ 项目更新成功: {} (新增技术栈 {:?}, 移除技术栈 {:?})",
            record.id, sync.attach, sync.detach
        );
        Ok(ActionOutcome::success(PROJECT_UPDATED, Redirect::Show(record.id)))
    }

    #[instrument(skip(self))]
    async fn delete_project(&self, id: i64) -> AppResult<ActionOutcome> {
        let removed = self.project_repository.delete_project(id).await?;

        if let Some(path) = removed.image.as_deref() {
            if let Err(err) = self.release_image(path, id).await {
                warn!("⚠️ 删除项目 {} 的图片失败: {} ({})", id, path, err);
            }
        }

        info!("🗑️ 项目已删除: {}", removed.id);
        Ok(ActionOutcome::danger(PROJECT_DELETED, Redirect::Index))
    }
}

//! 测试用的内存实现
//!
//! [`InMemoryRepository`] 同时实现三个仓库trait，模拟数据库约束：
//! 标题唯一、删除项目时级联删除关联记录。

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use database::{
    DatabaseError, DatabaseResult, ProjectCreate, ProjectPage, ProjectRecord, ProjectRepositoryTrait,
    ProjectTypeRecord, ProjectTypeRepositoryTrait, ProjectUpdate, TechnologyRecord, TechnologyRepositoryTrait,
};

use crate::services::storage::{FileStorage, StorageError};

#[derive(Debug, Default)]
struct Tables {
    projects: BTreeMap<i64, ProjectRecord>,
    links: BTreeSet<(i64, i64)>,
    types: Vec<ProjectTypeRecord>,
    technologies: Vec<TechnologyRecord>,
    next_id: i64,
    /// 逻辑时钟，保证每次写入的时间戳严格递增
    ticks: i64,
    /// 模拟并发请求在校验之后抢先写入了相同标题
    title_race: bool,
}

impl Tables {
    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        DateTime::<Utc>::default() + Duration::seconds(self.ticks)
    }

    fn title_taken(&self, title: &str, ignore_id: Option<i64>) -> bool {
        self.projects
            .values()
            .any(|p| p.title == title && Some(p.id) != ignore_id)
    }

    fn unique_violation(&self, title: &str, ignore_id: Option<i64>) -> bool {
        self.title_race || self.title_taken(title, ignore_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    pub fn with_reference_data(types: &[(i64, &str)], technologies: &[(i64, &str)]) -> Self {
        let repo = Self::default();
        {
            let mut tables = repo.tables.lock().unwrap();
            tables.types = types
                .iter()
                .map(|(id, label)| ProjectTypeRecord {
                    id: *id,
                    label: label.to_string(),
                })
                .collect();
            tables.technologies = technologies
                .iter()
                .map(|(id, label)| TechnologyRecord {
                    id: *id,
                    label: label.to_string(),
                })
                .collect();
        }
        repo
    }

    /// 之后的项目写入都会违反标题唯一约束，`title_exists` 不受影响
    pub fn simulate_title_race(&self) {
        self.tables.lock().unwrap().title_race = true;
    }

    pub fn project_count(&self) -> usize {
        self.tables.lock().unwrap().projects.len()
    }

    pub fn linked_technologies(&self, project_id: i64) -> Vec<i64> {
        self.tables
            .lock()
            .unwrap()
            .links
            .iter()
            .filter(|(p, _)| *p == project_id)
            .map(|(_, t)| *t)
            .collect()
    }
}

#[async_trait::async_trait]
impl ProjectRepositoryTrait for InMemoryRepository {
    async fn find_projects(&self, page_size: i64, offset: i64) -> DatabaseResult<ProjectPage> {
        let tables = self.tables.lock().unwrap();
        let mut projects: Vec<ProjectRecord> = tables.projects.values().cloned().collect();
        projects.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Ok(ProjectPage {
            total: projects.len() as u64,
            projects: projects
                .into_iter()
                .skip(offset as usize)
                .take(page_size as usize)
                .collect(),
        })
    }

    async fn create_project(&self, project: ProjectCreate) -> DatabaseResult<ProjectRecord> {
        let mut tables = self.tables.lock().unwrap();
        if tables.unique_violation(&project.title, None) {
            return Err(DatabaseError::UniqueViolation("projects_title_unique".to_string()));
        }

        tables.next_id += 1;
        let now = tables.now();
        let record = ProjectRecord {
            id: tables.next_id,
            title: project.title,
            slug: project.slug,
            content: project.content,
            image: project.image,
            is_published: project.is_published,
            type_id: project.type_id,
            created_at: now,
            updated_at: now,
        };
        tables.projects.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_project_by_id(&self, id: i64) -> DatabaseResult<ProjectRecord> {
        self.tables
            .lock()
            .unwrap()
            .projects
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found(format!("project {id}")))
    }

    async fn update_project(&self, id: i64, update: ProjectUpdate) -> DatabaseResult<ProjectRecord> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.projects.contains_key(&id) {
            return Err(DatabaseError::not_found(format!("project {id}")));
        }
        if tables.unique_violation(&update.title, Some(id)) {
            return Err(DatabaseError::UniqueViolation("projects_title_unique".to_string()));
        }

        let now = tables.now();
        let record = tables
            .projects
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found(format!("project {id}")))?;
        record.title = update.title;
        record.slug = update.slug;
        record.content = update.content;
        record.image = update.image;
        record.is_published = update.is_published;
        record.type_id = update.type_id;
        record.updated_at = now;
        Ok(record.clone())
    }

    async fn delete_project(&self, id: i64) -> DatabaseResult<ProjectRecord> {
        let mut tables = self.tables.lock().unwrap();
        let record = tables
            .projects
            .remove(&id)
            .ok_or_else(|| DatabaseError::not_found(format!("project {id}")))?;
        // ON DELETE CASCADE
        tables.links.retain(|(project_id, _)| *project_id != id);
        Ok(record)
    }

    async fn title_exists(&self, title: &str, ignore_id: Option<i64>) -> DatabaseResult<bool> {
        Ok(self.tables.lock().unwrap().title_taken(title, ignore_id))
    }

    async fn image_in_use(&self, path: &str, ignore_id: Option<i64>) -> DatabaseResult<bool> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .projects
            .values()
            .any(|p| p.image.as_deref() == Some(path) && Some(p.id) != ignore_id))
    }

    async fn technology_ids(&self, project_id: i64) -> DatabaseResult<Vec<i64>> {
        Ok(self.linked_technologies(project_id))
    }

    async fn attach_technologies(&self, project_id: i64, technology_ids: &[i64]) -> DatabaseResult<()> {
        let mut tables = self.tables.lock().unwrap();
        for technology_id in technology_ids {
            tables.links.insert((project_id, *technology_id));
        }
        Ok(())
    }

    async fn detach_technologies(&self, project_id: i64, technology_ids: &[i64]) -> DatabaseResult<()> {
        let mut tables = self.tables.lock().unwrap();
        for technology_id in technology_ids {
            tables.links.remove(&(project_id, *technology_id));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProjectTypeRepositoryTrait for InMemoryRepository {
    async fn list_types(&self) -> DatabaseResult<Vec<ProjectTypeRecord>> {
        let mut types = self.tables.lock().unwrap().types.clone();
        types.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(types)
    }

    async fn find_type(&self, id: i64) -> DatabaseResult<Option<ProjectTypeRecord>> {
        Ok(self.tables.lock().unwrap().types.iter().find(|t| t.id == id).cloned())
    }
}

#[async_trait::async_trait]
impl TechnologyRepositoryTrait for InMemoryRepository {
    async fn list_technologies(&self) -> DatabaseResult<Vec<TechnologyRecord>> {
        let mut technologies = self.tables.lock().unwrap().technologies.clone();
        technologies.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(technologies)
    }

    async fn existing_ids(&self, ids: &[i64]) -> DatabaseResult<Vec<i64>> {
        let tables = self.tables.lock().unwrap();
        Ok(ids
            .iter()
            .copied()
            .filter(|id| tables.technologies.iter().any(|t| t.id == *id))
            .collect())
    }

    async fn technologies_for_project(&self, project_id: i64) -> DatabaseResult<Vec<TechnologyRecord>> {
        let tables = self.tables.lock().unwrap();
        let mut technologies: Vec<TechnologyRecord> = tables
            .technologies
            .iter()
            .filter(|t| tables.links.contains(&(project_id, t.id)))
            .cloned()
            .collect();
        technologies.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(technologies)
    }
}

/// 存储操作记录，用于检查调用顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEvent {
    Put(String),
    Delete(String),
}

#[derive(Debug, Default)]
struct Files {
    files: BTreeMap<String, Vec<u8>>,
    events: Vec<StorageEvent>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    inner: Arc<Mutex<Files>>,
}

impl InMemoryStorage {
    pub fn events(&self) -> Vec<StorageEvent> {
        self.inner.lock().unwrap().events.clone()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner.lock().unwrap().files.contains_key(path)
    }
}

#[async_trait::async_trait]
impl FileStorage for InMemoryStorage {
    async fn put_file_as(&self, directory: &str, file_name: &str, contents: &[u8]) -> Result<String, StorageError> {
        let path = format!("{directory}/{file_name}");
        let mut inner = self.inner.lock().unwrap();
        inner.files.insert(path.clone(), contents.to_vec());
        inner.events.push(StorageEvent::Put(path.clone()));
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.files.remove(path);
        inner.events.push(StorageEvent::Delete(path.to_string()));
        Ok(())
    }
}

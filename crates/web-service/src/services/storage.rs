//! 文件存储
//!
//! 项目图片通过 [`FileStorage`] 保存，默认实现 [`LocalFileStorage`] 写入本地磁盘。

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// 项目图片在存储中的目录
pub const PROJECT_IMAGES_DIR: &str = "project_images";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("文件读写失败 {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// 路径为绝对路径或包含 `..`
    #[error("非法的存储路径: {0}")]
    InvalidPath(String),
}

/// 文件存储trait
///
/// 返回/接收的路径都是相对于存储根目录的路径，例如 `project_images/portfolio-site.png`
#[async_trait::async_trait]
pub trait FileStorage: Send + Sync + 'static {
    /// 以指定文件名保存文件，同名文件会被覆盖
    ///
    /// # 返回值
    /// 返回文件的存储路径
    async fn put_file_as(&self, directory: &str, file_name: &str, contents: &[u8]) -> Result<String, StorageError>;

    /// 删除文件，文件不存在时视为成功
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}

/// 本地磁盘存储
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 把相对路径转换为磁盘路径，拒绝逃逸出根目录的路径
    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let path = Path::new(relative);
        let is_safe = !relative.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)));
        if !is_safe {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait::async_trait]
impl FileStorage for LocalFileStorage {
    async fn put_file_as(&self, directory: &str, file_name: &str, contents: &[u8]) -> Result<String, StorageError> {
        let relative = format!("{directory}/{file_name}");
        let target = self.resolve(&relative)?;
        let io_err = |source| StorageError::Io {
            path: relative.clone(),
            source,
        };

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&target, contents).await.map_err(io_err)?;

        debug!("💾 文件已保存: {} ({} bytes)", relative, contents.len());
        Ok(relative)
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let target = self.resolve(path)?;

        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                debug!("🗑️ 文件已删除: {}", path);
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}

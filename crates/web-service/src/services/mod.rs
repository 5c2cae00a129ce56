//! 服务层模块
//!
//! 包含业务逻辑的服务层实现，遵循六边形架构原则：
//! 数据库与文件存储都通过trait注入，服务本身不依赖具体实现。

pub mod project;
pub mod storage;
pub mod sync;
pub mod traits;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use project::ProjectService;
pub use storage::{FileStorage, LocalFileStorage, StorageError};
pub use traits::ProjectServiceTrait;

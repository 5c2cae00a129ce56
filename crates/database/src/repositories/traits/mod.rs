//! 数据库仓库 trait 定义
//!
//! 这里定义了各种数据库仓库的抽象接口
//!
//! ## Repository Trait 约束 🎯
//!
//! 所有 Repository trait 都使用相同的约束：
//!
//! ```rust,ignore
//! pub trait XxxRepositoryTrait: Send + Sync + 'static {
//!     // 异步方法定义...
//! }
//! ```
//!
//! - `Send + Sync`：同一个仓库实例会被多个请求并发访问
//! - `'static`：仓库保存在 axum 的共享状态中，生命周期与进程一致
//!
//! 服务层通过泛型持有仓库（例如 `ProjectService<PR, TR, CR, FS>`），测试时可以替换为内存实现。
//!
//! 所有方法都返回 `DatabaseResult<T>`，找不到记录时返回 [`crate::DatabaseError::NotFound`]。

pub mod project;
pub mod project_type;
pub mod technology;

// 重新导出
pub use project::ProjectRepositoryTrait;
pub use project_type::ProjectTypeRepositoryTrait;
pub use technology::TechnologyRepositoryTrait;

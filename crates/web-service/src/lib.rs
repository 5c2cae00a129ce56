//! Web服务模块
//!
//! 提供项目管理后台的 HTTP API 接口和文档服务

use color_eyre::eyre::Context;
use color_eyre::Result;
use database::{DatabasePool, ProjectRepository, ProjectTypeRepository, TechnologyRepository};
use shared_lib::AppConfig;
use std::sync::Arc;
use tokio::sync::watch::Receiver;
use tracing::info;

pub mod models;
pub mod routes;
pub mod services;

use services::{LocalFileStorage, ProjectService, ProjectServiceTrait};

/// 使用 Postgres 仓库和本地磁盘存储的项目服务
pub type ConcreteProjectService =
    ProjectService<ProjectRepository, ProjectTypeRepository, TechnologyRepository, LocalFileStorage>;

/// 应用共享状态
///
/// 路由层只依赖服务trait，测试时可以替换为任意实现
#[derive(Clone)]
pub struct AppState {
    pub project_service: Arc<dyn ProjectServiceTrait>,
}

impl AppState {
    /// 根据数据库连接池和配置组装全部依赖
    pub fn from_pool(pool: DatabasePool, config: &AppConfig) -> Self {
        let service: ConcreteProjectService = ProjectService::new(
            ProjectRepository::new(pool.clone()),
            ProjectTypeRepository::new(pool.clone()),
            TechnologyRepository::new(pool),
            LocalFileStorage::new(config.storage_root.clone()),
        );

        Self {
            project_service: Arc::new(service),
        }
    }
}

/// 启动 Web 服务
///
/// 收到 `shutdown_rx` 的变更通知后停止接收新连接，等待已有请求处理完毕再返回
pub async fn start_web_service(
    pool: DatabasePool,
    config: Arc<AppConfig>,
    mut shutdown_rx: Receiver<bool>,
) -> Result<()> {
    let shared_state = AppState::from_pool(pool, &config);

    let router = routes::create_app_router(shared_state, config.max_upload_bytes);

    info!("🚀 启动 Web Service 在 {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Can not bind to {}", config.bind_addr))?;

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            // 发送端被丢弃时同样视为关闭信号
            let _ = shutdown_rx.changed().await;
            info!("🛑 Web Service 正在关闭...");
        })
        .await?;

    Ok(())
}

use color_eyre::Result;
use database::initialize_database;
use shared_lib::AppConfig;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use web_service::start_web_service;

/// 未设置 `RUST_LOG` 时使用的日志级别
const DEFAULT_LOG_FILTER: &str = "info,web_service=debug,database=debug";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .init();

    let config = AppConfig::load()?;

    info!("🔌 正在连接数据库...");
    let pool = initialize_database(config.clone()).await?;

    // 收到 Ctrl+C 后通知 Web 服务优雅退出
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("❌ 监听退出信号失败: {}", e);
            return;
        }
        info!("📴 收到退出信号");
        let _ = shutdown_tx.send(true);
    });

    start_web_service(pool, config, shutdown_rx).await?;

    info!("👋 服务已退出");
    Ok(())
}

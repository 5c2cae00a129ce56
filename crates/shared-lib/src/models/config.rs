use color_eyre::eyre::{eyre, Context};
use color_eyre::{Help, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// 默认的HTTP监听地址
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// 默认的上传文件存储根目录
const DEFAULT_STORAGE_ROOT: &str = "storage/app";

/// 默认的请求体大小上限（2MB）
const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// 数据库连接池配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// 启动时预留的连接数
    ///
    /// 可通过环境变量 `DB_MIN_CONNECTIONS` 来调整
    pub min_connections: u32,

    /// 连接池最大连接数
    ///
    /// 可通过环境变量 `DB_MAX_CONNECTIONS` 来调整
    pub max_connections: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 2,
            max_connections: 20,
        }
    }
}

/// 程序配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// postgresql数据库链接字符串
    pub postgresql_conn_str: String,

    /// HTTP服务监听地址
    pub bind_addr: String,

    /// 上传文件（项目图片）的存储根目录
    pub storage_root: PathBuf,

    /// multipart请求体大小上限，单位字节
    pub max_upload_bytes: usize,

    /// 数据库连接池配置
    pub pool: PoolConfig,
}

impl AppConfig {
    pub fn load() -> Result<Arc<AppConfig>> {
        // 加载.env文件中的数据注入到环境变量中，方便本地测试
        // 线上环境部署时会直接使用环境变量，不需要.env文件
        if let Err(err) = dotenvy::dotenv() {
            debug!("未加载 .env 文件: {err}");
        }

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        Ok(Arc::new(config))
    }

    /// 根据 `lookup` 返回的变量值构造配置
    ///
    /// 只有 `DATABASE_URL` 是必填项，其他变量缺失或无法解析时使用默认值。
    pub fn from_lookup<F>(lookup: F) -> Result<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 读取数据库地址信息（仅支持postgresql）
        let db_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| eyre!("DATABASE_URL is empty"))
            .context("Can not load DATABASE_URL in environment")
            .suggestion("设置 DATABASE_URL 环境变量")?;

        let defaults = PoolConfig::default();

        Ok(AppConfig {
            postgresql_conn_str: db_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            storage_root: lookup("STORAGE_ROOT").map_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT), PathBuf::from),
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .map_or(DEFAULT_MAX_UPLOAD_BYTES, |s| s.parse().unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)),
            pool: PoolConfig {
                min_connections: lookup("DB_MIN_CONNECTIONS")
                    .map_or(defaults.min_connections, |s| s.parse().unwrap_or(defaults.min_connections)),
                max_connections: lookup("DB_MAX_CONNECTIONS")
                    .map_or(defaults.max_connections, |s| s.parse().unwrap_or(defaults.max_connections)),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_optional_vars_missing() {
        let config = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/portfolio")])).unwrap();

        assert_eq!(config.postgresql_conn_str, "postgres://localhost/portfolio");
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.storage_root, PathBuf::from(DEFAULT_STORAGE_ROOT));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.pool, PoolConfig::default());
    }

    #[test]
    fn test_overrides_and_invalid_numbers() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/portfolio"),
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("STORAGE_ROOT", "/var/lib/portfolio"),
            ("MAX_UPLOAD_BYTES", "not-a-number"),
            ("DB_MAX_CONNECTIONS", "8"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.storage_root, PathBuf::from("/var/lib/portfolio"));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.pool.max_connections, 8);
        assert_eq!(config.pool.min_connections, PoolConfig::default().min_connections);
    }

    #[test]
    fn test_missing_database_url() {
        assert!(AppConfig::from_lookup(lookup_from(&[])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).is_err());
    }
}

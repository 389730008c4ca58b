use crate::db::StorageBackend;
use std::path::PathBuf;
use std::time::Duration;

/// 应用配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (`.env` 文件会先被加载)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HR_DATA_DIR | ./hr-data | 数据目录 (file / redb 后端) |
/// | HR_STORAGE | file | 存储后端: memory \| file \| redb |
/// | HR_NOTICE_MS | 2500 | 通知显示时长(毫秒) |
/// | HR_SEED_DEMO | true | 空集合写入演示数据 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (unset) | 按天滚动的日志目录 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// HR_STORAGE=redb HR_DATA_DIR=/var/lib/hr-desk hr-desk list vendors
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 数据目录
    pub data_dir: PathBuf,
    /// 存储后端
    pub storage: StorageBackend,
    /// 通知显示时长 (毫秒)
    pub notice_ms: u64,
    /// 是否写入演示数据
    pub seed_demo: bool,
    /// 日志级别
    pub log_level: String,
    /// 日志文件目录，未设置时只输出到 stderr
    pub log_dir: Option<String>,
    /// 运行环境: development | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("HR_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./hr-data")),
            storage: std::env::var("HR_STORAGE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            notice_ms: std::env::var("HR_NOTICE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2500),
            seed_demo: std::env::var("HR_SEED_DEMO")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(data_dir: impl Into<PathBuf>, storage: StorageBackend) -> Self {
        let mut config = Self::from_env();
        config.data_dir = data_dir.into();
        config.storage = storage;
        config
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

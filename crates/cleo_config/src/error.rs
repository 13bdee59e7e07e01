// crates/cleo_config/src/error.rs

//! 配置错误类型

use std::path::PathBuf;

use thiserror::Error;

use cleo_foundation::CleoError;

/// 配置模块结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 配置错误枚举
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件不存在
    #[error("配置文件不存在: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// 配置文件读取失败
    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    /// YAML 解析失败（缺键、类型不符等）
    #[error("YAML 解析失败: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// 键值未通过验证
    #[error("配置键 {key} 无效: {reason}")]
    InvalidKey {
        key: &'static str,
        reason: String,
    },
}

impl ConfigError {
    /// 创建键验证错误
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key,
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for CleoError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::FileNotFound { path } => CleoError::file_not_found(path),
            ConfigError::Io(e) => CleoError::io_with_source("读取配置失败", e),
            other => CleoError::invalid_input(other.to_string()),
        }
    }
}

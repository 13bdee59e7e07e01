// crates/cleo_io/src/error.rs

//! IO 错误类型

use std::path::PathBuf;

use thiserror::Error;

use cleo_foundation::CleoError;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 分块写入失败（已重试一次）
    #[error("分块写入失败 (已重试): {key}")]
    ChunkWriteFailed {
        /// 存储键
        key: String,
        /// 底层 IO 错误
        #[source]
        source: std::io::Error,
    },

    /// 数组元数据序列化失败
    #[error("元数据序列化失败: {0}")]
    Metadata(#[from] serde_json::Error),

    /// 二进制输入文件解析失败
    #[error("文件解析错误: {}: {message}", path.display())]
    Parse {
        /// 文件路径
        path: PathBuf,
        /// 诊断信息
        message: String,
    },

    /// 普通 IO 失败
    #[error("IO 失败: {0}")]
    Io(#[from] std::io::Error),

    /// 基础层错误
    #[error("基础层错误: {0}")]
    Foundation(#[from] CleoError),
}

impl IoError {
    /// 创建解析错误
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<IoError> for CleoError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Foundation(e) => e,
            IoError::Io(e) => CleoError::io_with_source("IO 操作失败", e),
            other => CleoError::io(other.to_string()),
        }
    }
}

// crates/cleo_io/src/zarr/store.rs

//! 文件系统 Zarr 存储
//!
//! 以 `basedir` 为根的键值存储，满足 Zarr 存储规范 v2
//! (https://zarr.readthedocs.io/en/stable/spec/v2.html)。
//! 构造时初始化 zarr group（`.zgroup` 与全局 `.zattrs`）。

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::warn;
use serde_json::json;

use crate::error::{IoError, IoResult};

/// 文件系统 Zarr v2 存储（单写者）
#[derive(Debug, Clone)]
pub struct FsStore {
    basedir: PathBuf,
}

impl FsStore {
    /// 在 `basedir` 下创建存储并初始化 zarr group
    pub fn new(basedir: impl Into<PathBuf>) -> IoResult<Self> {
        let store = Self {
            basedir: basedir.into(),
        };
        fs::create_dir_all(&store.basedir)?;

        store.write_json(".zgroup", &json!({ "zarr_format": 2 }))?;
        store.write_json(
            ".zattrs",
            &json!({
                "creator": "CLEO",
                "title": "CLEO superdroplet model output"
            }),
        )?;

        Ok(store)
    }

    /// 存储根目录
    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    /// 把原始字节写入键 `key`
    ///
    /// 失败对当前键重试一次，再失败返回
    /// [`IoError::ChunkWriteFailed`] 中止运行。
    pub fn write(&self, key: &str, bytes: &[u8]) -> IoResult<()> {
        match self.write_once(key, bytes) {
            Ok(()) => Ok(()),
            Err(first) => {
                warn!("存储键 {} 写入失败 ({}), 重试一次", key, first);
                self.write_once(key, bytes)
                    .map_err(|source| IoError::ChunkWriteFailed {
                        key: key.to_string(),
                        source,
                    })
            }
        }
    }

    fn write_once(&self, key: &str, bytes: &[u8]) -> std::io::Result<()> {
        let path = self.basedir.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        file.flush()
    }

    /// 序列化 JSON 值并写入键 `key`
    pub fn write_json(&self, key: &str, value: &serde_json::Value) -> IoResult<()> {
        let text = serde_json::to_string_pretty(value)?;
        self.write(key, text.as_bytes())
    }

    /// 读取键 `key` 的原始字节（测试与往返校验用）
    pub fn read(&self, key: &str) -> IoResult<Vec<u8>> {
        Ok(fs::read(self.basedir.join(key))?)
    }

    /// 键是否存在
    pub fn contains(&self, key: &str) -> bool {
        self.basedir.join(key).exists()
    }
}

// ============================================================================
// 测试
// ============================================================================

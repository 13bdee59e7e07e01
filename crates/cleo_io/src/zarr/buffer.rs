// crates/cleo_io/src/zarr/buffer.rs

//! 分块缓冲
//!
//! 所有 Zarr 数组共享的缓冲原语：固定容量等于一个分块的
//! 元素数，`copy_from` 返回未能容纳的剩余切片，`take_le_bytes`
//! 取出已填充前缀的小端字节并复位。

use crate::error::IoResult;
use crate::zarr::store::FsStore;

/// 可写入 Zarr 数组的标量类型
pub trait ZarrScalar: Copy + Send + Sync {
    /// Zarr dtype 字符串（小端）
    const DTYPE: &'static str;

    /// 追加本值的小端字节
    fn write_le(self, out: &mut Vec<u8>);
}

impl ZarrScalar for f64 {
    const DTYPE: &'static str = "<f8";

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl ZarrScalar for u64 {
    const DTYPE: &'static str = "<u8";

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl ZarrScalar for u32 {
    const DTYPE: &'static str = "<u4";

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

/// 一个分块大小的写缓冲
#[derive(Debug)]
pub struct Buffer<T> {
    data: Vec<T>,
    chunksize: usize,
}

impl<T: ZarrScalar> Buffer<T> {
    /// 创建容量为 `chunksize` 个元素的缓冲
    pub fn new(chunksize: usize) -> Self {
        Self {
            data: Vec::with_capacity(chunksize),
            chunksize,
        }
    }

    /// 已填充元素数
    #[inline]
    pub fn fill(&self) -> usize {
        self.data.len()
    }

    /// 剩余空间
    #[inline]
    pub fn space(&self) -> usize {
        self.chunksize - self.data.len()
    }

    /// 缓冲是否已满
    #[inline]
    pub fn is_full(&self) -> bool {
        self.data.len() == self.chunksize
    }

    /// 缓冲是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 写入单个值；缓冲已满时返回 false（不写入）
    #[inline]
    pub fn push(&mut self, value: T) -> bool {
        if self.is_full() {
            false
        } else {
            self.data.push(value);
            true
        }
    }

    /// 尽量拷入 `values`，返回未容纳的剩余切片
    pub fn copy_from<'a>(&mut self, values: &'a [T]) -> &'a [T] {
        let take = values.len().min(self.space());
        self.data.extend_from_slice(&values[..take]);
        &values[take..]
    }

    /// 把已填充前缀写入存储键 `key` 并复位缓冲
    pub fn flush(&mut self, store: &FsStore, key: &str) -> IoResult<()> {
        let mut bytes = Vec::with_capacity(self.data.len() * std::mem::size_of::<T>());
        for &v in &self.data {
            v.write_le(&mut bytes);
        }
        store.write(key, &bytes)?;
        self.data.clear();
        Ok(())
    }
}

// ============================================================================
// 测试
// ============================================================================

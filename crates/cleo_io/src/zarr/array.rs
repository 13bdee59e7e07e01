// crates/cleo_io/src/zarr/array.rs

//! 分块数组写入器
//!
//! - [`Array1d`]: 1-D 数组（坐标、锯齿状液滴数据及其计数）
//! - [`Array2d`]: `[nobs, ngbxs]` 网格盒场数组，分块沿网格盒轴
//!   为其整数倍
//!
//! 分块文件按点号连接的分块坐标命名（`"0"`, `"1.0"`, …），
//! 内容为声明 dtype 的原始小端数据。

use serde_json::json;

use cleo_foundation::CleoError;

use crate::error::IoResult;
use crate::zarr::buffer::{Buffer, ZarrScalar};
use crate::zarr::store::FsStore;

/// 2-D 数组的分块元素数：不超过 maxchunk 的 ndim1 最大整数倍
pub fn good_2d_chunk(maxchunk: usize, ndim1: usize) -> usize {
    (maxchunk / ndim1).max(1) * ndim1
}

/// 写 `.zarray` 与 `.zattrs` 元数据
#[allow(clippy::too_many_arguments)]
fn write_metadata_jsons(
    store: &FsStore,
    name: &str,
    shape: serde_json::Value,
    chunks: serde_json::Value,
    dtype: &str,
    dims: serde_json::Value,
    units: &str,
    scale_factor: f64,
    sample_dimension: Option<&str>,
) -> IoResult<()> {
    let zarray = json!({
        "shape": shape,
        "chunks": chunks,
        "dtype": dtype,
        "order": "C",
        "compressor": null,
        "fill_value": null,
        "filters": null,
        "zarr_format": 2,
    });
    store.write_json(&format!("{}/.zarray", name), &zarray)?;

    let mut zattrs = json!({
        "_ARRAY_DIMENSIONS": dims,
        "units": units,
        "scale_factor": scale_factor,
    });
    if let Some(sample) = sample_dimension {
        zattrs["sample_dimension"] = json!(sample);
    }
    store.write_json(&format!("{}/.zattrs", name), &zattrs)
}

// ============================================================================
// 1-D 数组
// ============================================================================

/// 经缓冲分块写入的 1-D 数组
#[derive(Debug)]
pub struct Array1d<T> {
    store: FsStore,
    name: String,
    units: String,
    scale_factor: f64,
    dim: String,
    sample_dimension: Option<String>,
    chunksize: usize,
    buffer: Buffer<T>,
    chunkcount: u64,
    ndata: u64,
}

impl<T: ZarrScalar> Array1d<T> {
    /// 创建 1-D 数组写入器
    pub fn new(
        store: FsStore,
        name: impl Into<String>,
        chunksize: usize,
        units: impl Into<String>,
        scale_factor: f64,
        dim: impl Into<String>,
    ) -> Self {
        Self {
            store,
            name: name.into(),
            units: units.into(),
            scale_factor,
            dim: dim.into(),
            sample_dimension: None,
            chunksize,
            buffer: Buffer::new(chunksize),
            chunkcount: 0,
            ndata: 0,
        }
    }

    /// 标注 `sample_dimension`（锯齿状数组的 raggedcount 配套属性）
    pub fn with_sample_dimension(mut self, sample: impl Into<String>) -> Self {
        self.sample_dimension = Some(sample.into());
        self
    }

    /// 已写入的数据点总数
    pub fn ndata(&self) -> u64 {
        self.ndata
    }

    /// 写入单个值
    pub fn push(&mut self, value: T) -> IoResult<()> {
        if self.buffer.is_full() {
            self.flush_chunk()?;
        }
        self.buffer.push(value);
        self.ndata += 1;
        Ok(())
    }

    /// 写入一段值
    pub fn extend(&mut self, values: &[T]) -> IoResult<()> {
        let mut rest = values;
        loop {
            let before = rest.len();
            rest = self.buffer.copy_from(rest);
            self.ndata += (before - rest.len()) as u64;
            if rest.is_empty() {
                break;
            }
            self.flush_chunk()?;
        }
        Ok(())
    }

    /// 冲刷当前缓冲为下一分块并更新元数据
    fn flush_chunk(&mut self) -> IoResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let key = format!("{}/{}", self.name, self.chunkcount);
        self.buffer.flush(&self.store, &key)?;
        self.chunkcount += 1;
        self.write_metadata()
    }

    /// 输出 `.zarray`/`.zattrs`；shape 随分块提交增量更新
    fn write_metadata(&self) -> IoResult<()> {
        let shape = self.ndata - self.buffer.fill() as u64;
        write_metadata_jsons(
            &self.store,
            &self.name,
            json!([shape]),
            json!([self.chunksize]),
            T::DTYPE,
            json!([self.dim]),
            &self.units,
            self.scale_factor,
            self.sample_dimension.as_deref(),
        )
    }

    /// 收尾：冲刷残余缓冲为最后一个分块并写最终元数据
    pub fn finalise(&mut self) -> IoResult<()> {
        self.flush_chunk()?;
        self.write_final_metadata()
    }

    fn write_final_metadata(&self) -> IoResult<()> {
        write_metadata_jsons(
            &self.store,
            &self.name,
            json!([self.ndata]),
            json!([self.chunksize]),
            T::DTYPE,
            json!([self.dim]),
            &self.units,
            self.scale_factor,
            self.sample_dimension.as_deref(),
        )
    }
}

// ============================================================================
// 2-D 数组
// ============================================================================

/// `[nobs, ndim1]` 形状的 2-D 数组（逐观测事件按行写入）
#[derive(Debug)]
pub struct Array2d<T> {
    store: FsStore,
    name: String,
    units: String,
    scale_factor: f64,
    dim1name: String,
    ndim1: usize,
    chunksize: usize,
    buffer: Buffer<T>,
    chunkcount: u64,
    nobs: u64,
}

impl<T: ZarrScalar> Array2d<T> {
    /// 创建 2-D 数组写入器
    ///
    /// 分块元素数取 `maxchunk` 内 `ndim1` 的最大整数倍，
    /// 保证分块形状 `[chunksize/ndim1, ndim1]` 整除。
    pub fn new(
        store: FsStore,
        name: impl Into<String>,
        maxchunk: usize,
        units: impl Into<String>,
        scale_factor: f64,
        dim1name: impl Into<String>,
        ndim1: usize,
    ) -> Self {
        let chunksize = good_2d_chunk(maxchunk, ndim1);
        Self {
            store,
            name: name.into(),
            units: units.into(),
            scale_factor,
            dim1name: dim1name.into(),
            ndim1,
            chunksize,
            buffer: Buffer::new(chunksize),
            chunkcount: 0,
            nobs: 0,
        }
    }

    /// 已观测事件数
    pub fn nobs(&self) -> u64 {
        self.nobs
    }

    /// 写入一个观测事件的整行（长度必须等于 ndim1）
    pub fn push_row(&mut self, row: &[T]) -> IoResult<()> {
        CleoError::check_size("array2d.row", self.ndim1, row.len())
            .map_err(crate::error::IoError::from)?;

        if self.buffer.is_full() {
            self.flush_chunk()?;
        }
        // chunksize 为 ndim1 整数倍，整行必定放得下
        let leftover = self.buffer.copy_from(row);
        debug_assert!(leftover.is_empty());
        self.nobs += 1;
        Ok(())
    }

    fn flush_chunk(&mut self) -> IoResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let key = format!("{}/{}.0", self.name, self.chunkcount);
        self.buffer.flush(&self.store, &key)?;
        self.chunkcount += 1;
        self.write_metadata()
    }

    fn write_metadata(&self) -> IoResult<()> {
        write_metadata_jsons(
            &self.store,
            &self.name,
            json!([self.nobs, self.ndim1]),
            json!([self.chunksize / self.ndim1, self.ndim1]),
            T::DTYPE,
            json!(["time", self.dim1name]),
            &self.units,
            self.scale_factor,
            None,
        )
    }

    /// 收尾：冲刷残余缓冲并写最终元数据
    pub fn finalise(&mut self) -> IoResult<()> {
        self.flush_chunk()?;
        self.write_metadata()
    }
}

// ============================================================================
// 测试
// ============================================================================

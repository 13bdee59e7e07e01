// crates/cleo_io/src/zarr/mod.rs

//! Zarr v2 兼容存储
//!
//! 文件系统键值存储，键形如 `"<array>/<chunk_coord>"`，值为
//! 原始小端字节（默认不压缩）。每个数组经一个分块大小的
//! [`Buffer`] 写入；缓冲写满即冲刷到下一分块坐标，收尾时
//! 残余缓冲作为最后一个（截短的）分块冲刷。
//!
//! 元数据：首次写分块与关闭时输出 `<array>/.zarray`
//! （zarr_format 2, order 'C', shape/chunks/dtype,
//! compressor/fill_value/filters 均为 null）与
//! `<array>/.zattrs`（`_ARRAY_DIMENSIONS`, units, scale_factor），
//! shape 随分块提交增量更新。

pub mod array;
pub mod buffer;
pub mod store;

pub use array::{good_2d_chunk, Array1d, Array2d};
pub use buffer::{Buffer, ZarrScalar};
pub use store::FsStore;

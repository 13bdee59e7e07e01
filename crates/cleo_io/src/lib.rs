// crates/cleo_io/src/lib.rs

//! CLEO IO 层
//!
//! - [`zarr`]: 文件系统 Zarr v2 兼容存储（分块缓冲写入）
//! - [`observers`]: 观测器管线（网格盒场与锯齿状液滴数组）
//! - [`input`]: 网格边界 / 初始液滴 / 热力学时间序列的二进制读写
//! - [`setup`]: config + constants 组合记录的 setup 日志
//!
//! Zarr 存储为单写者；观测器写入串行执行。分块写失败对当前
//! 分块重试一次，再失败则中止运行。

pub mod error;
pub mod input;
pub mod observers;
pub mod setup;
pub mod zarr;

pub use error::{IoError, IoResult};
pub use observers::{
    CombinedObserver, GbxIndexObserver, MassMomentsObserver, NsupersObserver, NullObserver,
    Observer, StateObserver, SupersAttrsObserver, TimeObserver,
};
pub use zarr::{Array1d, Array2d, Buffer, FsStore, ZarrScalar};

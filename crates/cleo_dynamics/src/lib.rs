// crates/cleo_dynamics/src/lib.rs

//! CLEO 耦合动力学层
//!
//! 可插拔的动力学提供者，经统一契约与 SDM 引擎交换
//! 热力学状态：
//!
//! - [`NullDynamics`]: 全空操作
//! - [`FromFileDynamics`]: 从磁盘读取的按时间索引的场
//! - [`ParcelDynamics`]: 每网格盒四变量 (p, T, qv, qc) 的
//!   绝热气块 ODE 求解器（自适应嵌入式 Runge–Kutta）
//!
//! 双向耦合的关键不变量：SDM 引起的 T/qv/qc 不连续必须在
//! 下一次推进之前通过 `receive_from_gridboxes` 以增量重初始化。

pub mod contract;
pub mod error;
pub mod fromfile;
pub mod null;
pub mod parcel;

pub use contract::{CoupledDynamics, DynamicsKind};
pub use error::{DynamicsError, DynamicsResult};
pub use fromfile::FromFileDynamics;
pub use null::NullDynamics;
pub use parcel::ParcelDynamics;

// crates/cleo_domain/src/lib.rs

//! CLEO 领域层 (Layer 2)
//!
//! 定义超级液滴模型的核心数据结构：
//!
//! - [`superdrop`]: 超级液滴及其溶质属性
//! - [`state`]: 网格盒热力学状态
//! - [`gridbox`]: 网格盒记录（状态 + 随机数流）
//! - [`arena`]: 超级液滴 Arena（按网格盒索引排序/分区/压实）
//! - [`maps`]: 笛卡尔网格拓扑映射（边界、邻居、域边缘判定）
//! - [`init`]: 由初始条件向量构造 Arena 与网格盒

pub mod arena;
pub mod gridbox;
pub mod init;
pub mod maps;
pub mod state;
pub mod superdrop;

pub use arena::SuperdropArena;
pub use gridbox::Gridbox;
pub use init::{InitGbxsData, InitSupersData};
pub use maps::{Axis, CartesianMaps};
pub use state::{State, StateDelta};
pub use superdrop::{SoluteProperties, Superdrop};

// crates/cleo_foundation/src/lib.rs

//! CLEO 基础层 (Layer 1)
//!
//! 提供整个超级液滴模型 (Superdroplet Model, SDM) 的基础设施：
//!
//! - [`constants`]: 有量纲常数与无量纲化特征尺度
//! - [`error`]: 基础错误类型 [`CleoError`]
//! - [`index`]: 网格盒索引 [`GbxIndex`]（含域外哨兵值）与液滴 ID
//! - [`timesteps`]: 整数模型步与真实时间/无量纲时间的转换
//! - [`rng`]: 逐网格盒确定性随机数流 [`GbxRng`]
//!
//! # 设计原则
//!
//! 1. **纯净性**：本层不引入任何微物理或网格领域概念
//! 2. **零全局可变状态**：常数全部为 `const`，随机数种子显式传入

pub mod constants;
pub mod error;
pub mod index;
pub mod rng;
pub mod timesteps;

pub use error::{CleoError, CleoResult};
pub use index::{GbxIndex, SdId, SdIdGenerator};
pub use rng::GbxRng;

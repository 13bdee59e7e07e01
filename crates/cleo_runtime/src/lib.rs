// crates/cleo_runtime/src/lib.rs

//! CLEO 运行时层 (Layer 4)
//!
//! SDM 驱动器：外层时间步循环按固定顺序推进微物理、液滴
//! 运动与耦合，并协调观测器。调度模型为阶段内网格盒级
//! 数据并行（rayon），运动步结束的按索引排序为下一次
//! 微物理建立 happens-before 边。

pub mod error;
pub mod run;
pub mod stats;
pub mod stepper;

pub use error::{RuntimeError, RuntimeResult};
pub use run::run_cleo;
pub use stats::RunStats;
pub use stepper::SdmStepper;

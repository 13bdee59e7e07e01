// crates/cleo_physics/src/lib.rs

//! CLEO 微物理层 (Layer 3)
//!
//! 作用于超级液滴的微物理过程与液滴运动：
//!
//! - [`thermodynamics`]: 饱和水汽压、过饱和比等热力学关系式
//! - [`condensation`]: 凝结/蒸发（隐式欧拉 + Newton–Raphson）
//! - [`collisions`]: Monte-Carlo 碰撞配对（并合与破碎）及相互作用核
//! - [`terminalvelocity`]: 沉降末速公式
//! - [`motion`]: 预估-校正运动更新与跨网格盒重新归箱
//! - [`process`]: 微物理过程组合（幺半群式串联）
//!
//! 微物理过程共享统一形状：常数时间步 `interval`、
//! `on_step(t) = (t % interval == 0)` 判定以及逐网格盒的
//! `run_step(state, slice, rng)` 动作。

pub mod collisions;
pub mod condensation;
pub mod error;
pub mod motion;
pub mod process;
pub mod terminalvelocity;
pub mod thermodynamics;

pub use collisions::{
    kernels::{
        golovin_prob, long_hydro_prob, lowlist_breakup_prob, lowlist_coal_prob, CollisionProb,
        GolovinProb, HydrodynamicProb, KernelEfficiency, LongKernelEff,
    },
    breakup::Breakup,
    coalescence::Coalescence,
    DoCollisions, PairEnactment, PairProbability,
};
pub use condensation::{Condensation, ImplicitEuler};
pub use error::{PhysicsError, PhysicsResult};
pub use motion::PredCorrMotion;
pub use process::{CombinedProcess, MicrophysicalProcess, NullProcess};
pub use terminalvelocity::{
    NullTerminalVelocity, RogersYauTerminalVelocity, SimmelTerminalVelocity, TerminalVelocity,
};

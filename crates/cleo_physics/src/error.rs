// crates/cleo_physics/src/error.rs

//! 微物理层错误类型
//!
//! 运行期致命错误（无效热力学状态、CFL 违例、求解器不收敛）
//! 携带完整诊断信息（网格盒索引、液滴 ID）并中止当前运行。

use thiserror::Error;

use cleo_foundation::{CleoError, GbxIndex, SdId};

/// 微物理模块结果类型别名
pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// 微物理错误枚举
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// 无效热力学状态（如 T ≤ 0K 进入 psat、负半径）
    #[error("无效状态: {message}")]
    InvalidState {
        /// 诊断信息
        message: String,
    },

    /// 运动检测到液滴单步跨越超过一个网格盒
    #[error(
        "CFL 判据不满足: 网格盒 {gbxindex}, 液滴 {drop_id}, 轴 {axis}, \
         位移 {delta:.6e} 超过网格步长 {gridstep:.6e}; 请减小运动时间步"
    )]
    CflViolation {
        /// 所在网格盒
        gbxindex: GbxIndex,
        /// 违例液滴
        drop_id: SdId,
        /// 违例轴（"coord3"/"coord1"/"coord2"）
        axis: &'static str,
        /// 单步位移
        delta: f64,
        /// 网格步长
        gridstep: f64,
    },

    /// 重新归箱后液滴仍不在新网格盒边界内（等价于 CFL 违例）
    #[error(
        "重新归箱失败: 液滴 {drop_id} 在轴 {axis} 上既不在网格盒 {gbxindex} 内也未离域; \
         运动步跨越了多个网格盒"
    )]
    RebinExceeded {
        /// 目标网格盒
        gbxindex: GbxIndex,
        /// 液滴
        drop_id: SdId,
        /// 轴
        axis: &'static str,
    },

    /// 凝结 Newton–Raphson 迭代未在限定次数内收敛
    #[error("凝结求解失败: Newton-Raphson 在 {maxiters} 次迭代内未收敛 (液滴 {drop_id})")]
    NonConvergence {
        /// 迭代上限
        maxiters: usize,
        /// 液滴
        drop_id: SdId,
    },

    /// 碰撞过程进入未定义分支（ξ 记账被破坏）
    #[error("碰撞过程内部错误: {message}")]
    CollisionBookkeeping {
        /// 诊断信息
        message: String,
    },

    /// 基础层错误
    #[error("基础层错误: {0}")]
    Foundation(#[from] CleoError),
}

impl From<PhysicsError> for CleoError {
    fn from(err: PhysicsError) -> Self {
        match err {
            PhysicsError::Foundation(e) => e,
            other => CleoError::internal(other.to_string()),
        }
    }
}

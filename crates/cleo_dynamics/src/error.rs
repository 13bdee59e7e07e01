// crates/cleo_dynamics/src/error.rs

//! 耦合动力学错误类型

use thiserror::Error;

use cleo_foundation::CleoError;
use cleo_physics::PhysicsError;

/// 动力学模块结果类型别名
pub type DynamicsResult<T> = Result<T, DynamicsError>;

/// 耦合动力学错误枚举
#[derive(Error, Debug)]
pub enum DynamicsError {
    /// ODE 求解器推进失败（步长塌缩、步数超限）
    #[error("动力学求解器失败: {message}")]
    SolverFailed {
        /// 诊断信息
        message: String,
    },

    /// 时间序列数据耗尽（t_mdl 超出文件覆盖范围）
    #[error("时间序列耗尽: 请求步 {requested}, 可用 {available}")]
    SeriesExhausted {
        /// 请求的时间槽
        requested: usize,
        /// 可用的时间槽数
        available: usize,
    },

    /// 微物理层错误（psat 等热力学关系式）
    #[error("微物理层错误: {0}")]
    Physics(#[from] PhysicsError),

    /// 基础层错误
    #[error("基础层错误: {0}")]
    Foundation(#[from] CleoError),
}

impl DynamicsError {
    /// 创建求解器失败错误
    pub fn solver(message: impl Into<String>) -> Self {
        Self::SolverFailed {
            message: message.into(),
        }
    }
}

impl From<DynamicsError> for CleoError {
    fn from(err: DynamicsError) -> Self {
        match err {
            DynamicsError::Foundation(e) => e,
            DynamicsError::Physics(e) => e.into(),
            other => CleoError::internal(other.to_string()),
        }
    }
}

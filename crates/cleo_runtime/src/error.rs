// crates/cleo_runtime/src/error.rs

//! 运行时错误类型
//!
//! 所有运行期致命错误在此携带 t_mdl 上下文后向上传播；
//! 没有任何错误被静默吞掉。

use thiserror::Error;

use cleo_dynamics::DynamicsError;
use cleo_foundation::CleoError;
use cleo_io::IoError;
use cleo_physics::PhysicsError;

/// 运行时结果类型别名
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// 运行时错误枚举
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// 微物理/运动阶段失败
    #[error("t_mdl = {t_mdl}: 微物理阶段失败: {source}")]
    Physics {
        /// 当前模型时刻
        t_mdl: u64,
        /// 底层错误
        #[source]
        source: PhysicsError,
    },

    /// 耦合动力学阶段失败
    #[error("t_mdl = {t_mdl}: 耦合动力学失败: {source}")]
    Dynamics {
        /// 当前模型时刻
        t_mdl: u64,
        /// 底层错误
        #[source]
        source: DynamicsError,
    },

    /// 观测器写入失败
    #[error("t_mdl = {t_mdl}: 观测器失败: {source}")]
    Observer {
        /// 当前模型时刻
        t_mdl: u64,
        /// 底层错误
        #[source]
        source: IoError,
    },

    /// 基础层错误（构造期）
    #[error("基础层错误: {0}")]
    Foundation(#[from] CleoError),
}

impl RuntimeError {
    /// 给微物理错误附加时刻上下文
    pub fn physics(t_mdl: u64, source: PhysicsError) -> Self {
        Self::Physics { t_mdl, source }
    }

    /// 给动力学错误附加时刻上下文
    pub fn dynamics(t_mdl: u64, source: DynamicsError) -> Self {
        Self::Dynamics { t_mdl, source }
    }

    /// 给观测器错误附加时刻上下文
    pub fn observer(t_mdl: u64, source: IoError) -> Self {
        Self::Observer { t_mdl, source }
    }
}

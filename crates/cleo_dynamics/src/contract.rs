// crates/cleo_dynamics/src/contract.rs

//! 耦合动力学契约
//!
//! 所有动力学提供者实现同一接口：耦合步长、到期判定、
//! 一次性准备、区间推进，以及与网格盒的双向状态交换。
//! 驱动器保证微物理看到最近一次 `send_to_gridboxes` 写入的
//! 状态，且回读发生在微物理之后。

use cleo_domain::Gridbox;
use cleo_foundation::timesteps::{next_multiple, on_multiple};

use crate::error::DynamicsResult;
use crate::fromfile::FromFileDynamics;
use crate::null::NullDynamics;
use crate::parcel::ParcelDynamics;

/// 耦合动力学提供者
pub trait CoupledDynamics {
    /// 耦合时间步（模型步）
    fn couplstep(&self) -> u64;

    /// 当前时刻是否为耦合步
    fn on_step(&self, t: u64) -> bool {
        on_multiple(t, self.couplstep())
    }

    /// 下一次耦合时刻
    fn next_step(&self, t: u64) -> u64 {
        next_multiple(t, self.couplstep())
    }

    /// 外层循环之前的一次性准备
    fn prepare_to_timestep(&mut self) -> DynamicsResult<()>;

    /// 在 [t_mdl, t_next] 上推进内部状态
    fn run_step(&mut self, t_mdl: u64, t_next: u64) -> DynamicsResult<()>;

    /// 把新的热力学场写回每个网格盒的状态
    fn send_to_gridboxes(&mut self, gbxs: &mut [Gridbox]) -> DynamicsResult<()>;

    /// 读取网格盒状态（或其增量）反馈给动力学（仅双向耦合）
    fn receive_from_gridboxes(&mut self, gbxs: &[Gridbox]) -> DynamicsResult<()>;
}

/// 运行期选择的动力学提供者（枚举分发）
#[derive(Debug)]
pub enum DynamicsKind {
    /// 全空操作
    Null(NullDynamics),
    /// 按时间索引的文件场
    FromFile(FromFileDynamics),
    /// 绝热气块 ODE
    Parcel(ParcelDynamics),
}

impl CoupledDynamics for DynamicsKind {
    fn couplstep(&self) -> u64 {
        match self {
            Self::Null(d) => d.couplstep(),
            Self::FromFile(d) => d.couplstep(),
            Self::Parcel(d) => d.couplstep(),
        }
    }

    fn prepare_to_timestep(&mut self) -> DynamicsResult<()> {
        match self {
            Self::Null(d) => d.prepare_to_timestep(),
            Self::FromFile(d) => d.prepare_to_timestep(),
            Self::Parcel(d) => d.prepare_to_timestep(),
        }
    }

    fn run_step(&mut self, t_mdl: u64, t_next: u64) -> DynamicsResult<()> {
        match self {
            Self::Null(d) => d.run_step(t_mdl, t_next),
            Self::FromFile(d) => d.run_step(t_mdl, t_next),
            Self::Parcel(d) => d.run_step(t_mdl, t_next),
        }
    }

    fn send_to_gridboxes(&mut self, gbxs: &mut [Gridbox]) -> DynamicsResult<()> {
        match self {
            Self::Null(d) => d.send_to_gridboxes(gbxs),
            Self::FromFile(d) => d.send_to_gridboxes(gbxs),
            Self::Parcel(d) => d.send_to_gridboxes(gbxs),
        }
    }

    fn receive_from_gridboxes(&mut self, gbxs: &[Gridbox]) -> DynamicsResult<()> {
        match self {
            Self::Null(d) => d.receive_from_gridboxes(gbxs),
            Self::FromFile(d) => d.receive_from_gridboxes(gbxs),
            Self::Parcel(d) => d.receive_from_gridboxes(gbxs),
        }
    }
}

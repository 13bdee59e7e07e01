// crates/cleo_dynamics/src/null.rs

//! 空动力学提供者

use cleo_domain::Gridbox;

use crate::contract::CoupledDynamics;
use crate::error::DynamicsResult;

/// 全空操作的动力学提供者
///
/// 网格盒状态保持初始值不变（或为 null 运行模式）。
#[derive(Debug, Clone, Copy)]
pub struct NullDynamics {
    interval: u64,
}

impl NullDynamics {
    /// 创建空提供者
    pub fn new(couplstep: u64) -> Self {
        Self { interval: couplstep }
    }
}

impl CoupledDynamics for NullDynamics {
    fn couplstep(&self) -> u64 {
        self.interval
    }

    fn prepare_to_timestep(&mut self) -> DynamicsResult<()> {
        Ok(())
    }

    fn run_step(&mut self, _t_mdl: u64, _t_next: u64) -> DynamicsResult<()> {
        Ok(())
    }

    fn send_to_gridboxes(&mut self, _gbxs: &mut [Gridbox]) -> DynamicsResult<()> {
        Ok(())
    }

    fn receive_from_gridboxes(&mut self, _gbxs: &[Gridbox]) -> DynamicsResult<()> {
        Ok(())
    }
}

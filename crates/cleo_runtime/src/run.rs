// crates/cleo_runtime/src/run.rs

//! 外层时间步循环
//!
//! ```text
//! t ← 0
//! while t ≤ t_end:
//!     observe            若 obs.on_step(t)
//!     微物理             若 microphys.on_step(t)
//!     运动 + 重新归箱    若 motion.on_step(t)
//!     耦合               若 coupl.on_step(t):
//!         receive(gbxs→dyn, 增量重初始化)
//!         run_step(t, t+couplstep)
//!         send(dyn→gbxs)
//!     t ← 所有子系统 next_step 的最小值
//! ```
//!
//! 耦合阶段内先回读后发送：回读捕获微物理造成的状态增量并
//! 在推进之前重初始化求解器（双向耦合的不变量），随后发送的
//! 新热力学场是后续微物理读到的状态。

use log::info;

use cleo_dynamics::CoupledDynamics;
use cleo_io::Observer;
use cleo_physics::{MicrophysicalProcess, TerminalVelocity};

use crate::error::{RuntimeError, RuntimeResult};
use crate::stats::RunStats;
use crate::stepper::SdmStepper;

/// 从 t = 0 步进 CLEO 到 t_end
pub fn run_cleo<P, TV, D, O>(
    stepper: &mut SdmStepper<P, TV>,
    coupldyn: &mut D,
    obs: &mut O,
    t_end: u64,
) -> RuntimeResult<RunStats>
where
    P: MicrophysicalProcess,
    TV: TerminalVelocity,
    D: CoupledDynamics,
    O: Observer,
{
    let mut stats = RunStats::new();

    coupldyn
        .prepare_to_timestep()
        .map_err(|e| RuntimeError::dynamics(0, e))?;
    obs.before_timestepping(stepper.gbxs())
        .map_err(|e| RuntimeError::observer(0, e))?;
    stats.pre_timestepping();

    info!("开始时间步进: t_end = {}", t_end);

    let mut t_mdl: u64 = 0;
    while t_mdl <= t_end {
        if obs.on_step(t_mdl) {
            obs.at_start_step(t_mdl, stepper.gbxs(), stepper.arena())
                .map_err(|e| RuntimeError::observer(t_mdl, e))?;
            stats.observations += 1;
        }

        if stepper.microphys_on_step(t_mdl) {
            stepper.microphysics_step(t_mdl)?;
        }

        if stepper.motion_on_step(t_mdl) {
            stepper.motion_step(t_mdl)?;
        }

        if coupldyn.on_step(t_mdl) {
            let t_next = t_mdl + coupldyn.couplstep();
            coupldyn
                .receive_from_gridboxes(stepper.gbxs())
                .map_err(|e| RuntimeError::dynamics(t_mdl, e))?;
            coupldyn
                .run_step(t_mdl, t_next)
                .map_err(|e| RuntimeError::dynamics(t_mdl, e))?;
            coupldyn
                .send_to_gridboxes(stepper.gbxs_mut())
                .map_err(|e| RuntimeError::dynamics(t_mdl, e))?;
            stats.couplings += 1;
        }

        t_mdl = next_timestep(t_mdl, stepper, coupldyn, obs);
        stats.steps += 1;
    }

    obs.after_timestepping()
        .map_err(|e| RuntimeError::observer(t_end, e))?;
    stats.post_timestepping();
    stats.summary();

    Ok(stats)
}

/// 所有子系统下一次到期时刻的最小值
fn next_timestep<P, TV, D, O>(
    t_mdl: u64,
    stepper: &SdmStepper<P, TV>,
    coupldyn: &D,
    obs: &O,
) -> u64
where
    P: MicrophysicalProcess,
    TV: TerminalVelocity,
    D: CoupledDynamics,
    O: Observer,
{
    stepper
        .microphys_next_step(t_mdl)
        .min(stepper.motion_next_step(t_mdl))
        .min(coupldyn.next_step(t_mdl))
        .min(obs.next_step(t_mdl))
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cleo_domain::{CartesianMaps, InitGbxsData, InitSupersData, SoluteProperties};
    use cleo_dynamics::NullDynamics;
    use cleo_foundation::{GbxRng, SdIdGenerator};
    use cleo_io::NullObserver;
    use cleo_physics::{
        NullProcess, NullTerminalVelocity, PhysicsResult, PredCorrMotion,
    };
    use cleo_domain::{State, Superdrop};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    /// 记录调用次数的试验过程（计数器共享给测试体）
    struct RecordingProcess {
        interval: u64,
        calls: Arc<AtomicU64>,
    }

    impl MicrophysicalProcess for RecordingProcess {
        fn interval(&self) -> u64 {
            self.interval
        }

        fn run_step(
            &self,
            _t: u64,
            _state: &mut State,
            _supers: &mut [Superdrop],
            _rng: &mut GbxRng,
        ) -> PhysicsResult<()> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    fn one_box_stepper<P: MicrophysicalProcess>(
        microphys: P,
    ) -> SdmStepper<P, NullTerminalVelocity> {
        let maps = CartesianMaps::uniform(
            [1, 1, 1],
            (0.0, 1.0),
            (0.0, 1.0),
            (0.0, 1.0),
            true,
        )
        .unwrap();
        let gbxs = InitGbxsData::uniform(1, 1.0, 1.0, 0.01, 0.0)
            .into_gridboxes(&maps, 0)
            .unwrap();
        let ids = SdIdGenerator::new();
        let arena = InitSupersData {
            sdgbxindex: vec![0; 2],
            xi: vec![1; 2],
            radius: vec![10.0; 2],
            msol: vec![0.0; 2],
            coord3: vec![0.5; 2],
            coord1: vec![0.5; 2],
            coord2: vec![0.5; 2],
        }
        .into_arena(2, &maps, Arc::new(SoluteProperties::default()), &ids)
        .unwrap();

        SdmStepper::new(
            maps,
            microphys,
            PredCorrMotion::new(50, NullTerminalVelocity),
            gbxs,
            arena,
        )
        .unwrap()
    }

    #[test]
    fn test_loop_fires_microphysics_on_its_interval() {
        // 微物理步 20, 运动步 50, t_end = 100:
        // 微物理在 t = 0,20,40,60,80,100 共 6 次
        let calls = Arc::new(AtomicU64::new(0));
        let mut stepper = one_box_stepper(RecordingProcess {
            interval: 20,
            calls: Arc::clone(&calls),
        });
        let mut dynamics = NullDynamics::new(100);
        let mut obs = NullObserver;

        run_cleo(&mut stepper, &mut dynamics, &mut obs, 100).unwrap();

        assert_eq!(calls.load(Ordering::Relaxed), 6);
        assert_eq!(stepper.arena().len(), 2);
    }

    #[test]
    fn test_null_everything_terminates() {
        let mut stepper = one_box_stepper(NullProcess);
        let mut dynamics = NullDynamics::new(100);
        let mut obs = NullObserver;

        let stats = run_cleo(&mut stepper, &mut dynamics, &mut obs, 1000).unwrap();
        assert!(stats.steps > 0);
        assert!(stats.couplings > 0);
    }
}

// crates/cleo_physics/src/condensation.rs

//! 凝结/蒸发
//!
//! 对每个液滴积分（无量纲）半径增长方程，驱动力为由网格盒
//! 状态导出的过饱和度。刚性 ODE 以隐式欧拉离散，对 z = r²
//! 的隐式方程用 Newton–Raphson 求根（Shima et al. 2009 §5.1.2）。
//!
//! 步进结束后按质量守恒回写网格盒的 qvap 与 qcond：
//! 单位空气质量凝结水的变化等于水汽混合比变化的相反数，
//! 释放的潜热更新温度。
//!
//! 引用的公式编号 [X.YY] 出自 Lohmann, Luond & Mahrt 教科书。

use std::f64::consts::PI;

use cleo_domain::{State, Superdrop};
use cleo_foundation::constants::{dimless as dlc, dimmed as dc};
use cleo_foundation::timesteps::step2dimlesstime;
use cleo_foundation::{GbxRng, SdId};

use crate::error::{PhysicsError, PhysicsResult};
use crate::process::MicrophysicalProcess;
use crate::thermodynamics::{moist_specific_heat, saturation_pressure, supersaturation_ratio};

// ============================================================================
// 隐式欧拉求解器
// ============================================================================

/// 凝结 ODE 的隐式欧拉积分器
///
/// 每步对 g(z) 做 Newton–Raphson 迭代，z = r²。
/// 收敛判据为标准局部误差检验
/// `|g_new − g_old| < rtol·|g_new| + atol`。
#[derive(Debug, Clone)]
pub struct ImplicitEuler {
    /// Newton–Raphson 最大迭代次数
    maxiters: usize,
    /// 单个隐式步的无量纲时长
    delt: f64,
    /// 相对容差
    rtol: f64,
    /// 绝对容差
    atol: f64,
}

impl ImplicitEuler {
    /// 创建积分器
    pub fn new(maxiters: usize, delt: f64, rtol: f64, atol: f64) -> Self {
        Self {
            maxiters,
            delt,
            rtol,
            atol,
        }
    }

    /// 隐式步进凝结方程 [7.28]，返回新半径
    ///
    /// `rprev` 为上一时刻半径；akoh/bkoh 为 Köhler 因子，
    /// fkl/fdl 为热/汽扩散因子。
    pub fn solve(
        &self,
        drop_id: SdId,
        s_ratio: f64,
        akoh: f64,
        bkoh: f64,
        fkl: f64,
        fdl: f64,
        rprev: f64,
    ) -> PhysicsResult<f64> {
        let ffactor = dlc::RHO_L * (fkl + fdl);

        let mut ziter = self.initial_guess(rprev, akoh, bkoh);
        let mut numerator = self.ode_gfunc(ziter, rprev, s_ratio, akoh, bkoh, ffactor);

        for _ in 0..self.maxiters {
            let denominator = self.ode_gfunc_derivative(ziter, akoh, bkoh, ffactor);
            ziter *= 1.0 - numerator / denominator;

            let new_numerator = self.ode_gfunc(ziter, rprev, s_ratio, akoh, bkoh, ffactor);
            let threshold = self.rtol * new_numerator.abs() + self.atol;
            if (new_numerator - numerator).abs() < threshold {
                return Ok(ziter.sqrt());
            }
            numerator = new_numerator;
        }

        Err(PhysicsError::NonConvergence {
            maxiters: self.maxiters,
            drop_id,
        })
    }

    /// 基于解唯一性判据的初始猜测
    ///
    /// 取 max(r_prev², b/a)，其中 b/a 是 s_ratio = 1 时的
    /// 平衡半径平方。
    fn initial_guess(&self, rprev: f64, akoh: f64, bkoh: f64) -> f64 {
        let r1sqrd = bkoh / akoh;
        (rprev * rprev).max(r1sqrd)
    }

    /// g(z)·delt/z：Newton–Raphson 的目标函数
    ///
    /// z = ziter = radius²。
    fn ode_gfunc(
        &self,
        rsqrd: f64,
        rprev: f64,
        s_ratio: f64,
        akoh: f64,
        bkoh: f64,
        ffactor: f64,
    ) -> f64 {
        let radius = rsqrd.sqrt();
        let alpha = s_ratio - 1.0 - akoh / radius + bkoh / radius.powi(3);
        let beta = 2.0 * self.delt / (rsqrd * ffactor);
        let gamma = (rprev / radius).powi(2);

        1.0 - gamma - alpha * beta
    }

    /// dg(z)/dz·delt：目标函数对 z 的导数
    fn ode_gfunc_derivative(&self, rsqrd: f64, akoh: f64, bkoh: f64, ffactor: f64) -> f64 {
        let radius = rsqrd.sqrt();
        let alpha = akoh / radius - 3.0 * bkoh / radius.powi(3);
        let beta = self.delt / (rsqrd * ffactor);

        1.0 - alpha * beta
    }
}

// ============================================================================
// 凝结过程
// ============================================================================

/// 凝结/蒸发微物理过程
#[derive(Debug, Clone)]
pub struct Condensation {
    /// 过程时间步（模型步）
    interval: u64,
    /// 隐式子步数（interval / subtimestep，向上取整）
    nsubsteps: u64,
    /// 凝结是否反馈网格盒热力学状态
    do_alter_thermo: bool,
    /// 隐式欧拉积分器
    implicit: ImplicitEuler,
}

impl Condensation {
    /// 创建凝结过程
    ///
    /// `subtimestep`（模型步）细分 `interval` 为若干隐式子步。
    pub fn new(
        interval: u64,
        subtimestep: u64,
        maxiters: usize,
        rtol: f64,
        atol: f64,
        do_alter_thermo: bool,
    ) -> Self {
        let sub = subtimestep.clamp(1, interval);
        let nsubsteps = interval.div_ceil(sub);
        let delt = step2dimlesstime(interval) / nsubsteps as f64;
        Self {
            interval,
            nsubsteps,
            do_alter_thermo,
            implicit: ImplicitEuler::new(maxiters, delt, rtol, atol),
        }
    }

    /// 热/汽扩散因子 Fkl 与 Fdl（[7.23]–[7.26]，无量纲）
    ///
    /// 仅依赖网格盒状态，每盒每步计算一次。
    fn diffusion_factors(press: f64, temp: f64, psat: f64) -> (f64, f64) {
        const A: f64 = 7.11756e-5; // T*[7.24] 中 T² 的系数
        const B: f64 = 4.38127686e-3; // T*[7.24] 中 T 的系数
        const LATENT_RGAS_V: f64 = dc::LATENT_V / dc::RGAS_V;
        const D: f64 = 4.012182971e-5; // [7.26] 中的常数

        let temp_k = temp * dlc::TEMP0;
        let press_pa = press * dlc::P0;
        let psat_pa = psat * dlc::P0;

        let thermk = A * temp_k.powi(2) + temp_k * B; // K·T, [7.24]
        let diffuse_v = (D / press_pa * temp_k.powf(1.94)) / dc::RGAS_V; // D_v/R_v, [7.26]

        let fkl = (LATENT_RGAS_V / temp_k - 1.0) * dc::LATENT_V / (thermk * dlc::F0); // [7.23]
        let fdl = temp_k / (diffuse_v * psat_pa) / dlc::F0; // [7.25]

        (fkl, fdl)
    }

    /// 单个液滴的凝结增长，返回凝结到该超级液滴上的液水量
    /// （计及倍率 ξ；[7.22] 乘 Δt）
    fn grow_superdrop(
        &self,
        temp: f64,
        s_ratio: f64,
        fkl: f64,
        fdl: f64,
        drop: &mut Superdrop,
    ) -> PhysicsResult<f64> {
        let dmdt_const = 4.0 * PI * drop.solute().rho_l * dlc::R0.powi(3);
        let akoh = drop.akohler_factor(temp);
        let bkoh = drop.bkohler_factor();

        let mut newradius = drop.radius;
        for _ in 0..self.nsubsteps {
            newradius = self
                .implicit
                .solve(drop.id(), s_ratio, akoh, bkoh, fkl, fdl, newradius)?;
        }
        let delta_radius = drop.change_radius(newradius);

        Ok(dmdt_const * drop.radius.powi(2) * drop.xi as f64 * delta_radius)
    }

    /// 凝结质量反馈热力学状态
    ///
    /// `tot_rho_condensed` 为该时间步内单位体积凝结的液水量。
    fn alter_thermostate(state: &mut State, tot_rho_condensed: f64) {
        let delta_qcond = tot_rho_condensed / dlc::RHO_DRY;
        let delta_qvap = -delta_qcond;
        let delta_temp =
            dlc::LATENT_V / moist_specific_heat(state.qvap, state.qcond) * delta_qcond;

        state.temp += delta_temp;
        state.qvap += delta_qvap;
        state.qcond += delta_qcond;
    }
}

impl MicrophysicalProcess for Condensation {
    fn interval(&self) -> u64 {
        self.interval
    }

    fn run_step(
        &self,
        _t: u64,
        state: &mut State,
        supers: &mut [Superdrop],
        _rng: &mut GbxRng,
    ) -> PhysicsResult<()> {
        let psat = saturation_pressure(state.temp)?;
        let s_ratio = supersaturation_ratio(state.press, state.qvap, psat);
        let (fkl, fdl) = Self::diffusion_factors(state.press, state.temp, psat);

        // 该网格盒内凝结的累计液水量（单位体积）
        let volume = state.volume() * dlc::COORD0.powi(3); // 真实体积 [m³]
        let mut tot_rho_condensed = 0.0;

        for drop in supers.iter_mut() {
            let delta_mass = self.grow_superdrop(state.temp, s_ratio, fkl, fdl, drop)?;
            tot_rho_condensed += delta_mass / volume;
        }

        if self.do_alter_thermo {
            Self::alter_thermostate(state, tot_rho_condensed);
        }

        Ok(())
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cleo_domain::SoluteProperties;
    use cleo_foundation::GbxIndex;
    use std::sync::Arc;

    fn test_drop(radius: f64, msol: f64) -> Superdrop {
        Superdrop::new(
            SdId::default(),
            GbxIndex::new(0),
            1000,
            radius,
            msol,
            0.5,
            0.5,
            0.5,
            Arc::new(SoluteProperties::default()),
        )
    }

    /// 约 1% 过饱和的网格盒状态
    fn supersaturated_state() -> State {
        let temp = 1.0; // 273.15 K
        let press = 1.0; // 100000 Pa
        let psat = saturation_pressure(temp).unwrap();
        let qvap = {
            // 由目标 s_ratio 反解 qvap
            let s_target = 1.01;
            s_target * psat * dlc::MR_RATIO / (press - s_target * psat)
        };
        State::new(1.0, press, temp, qvap, 0.0)
    }

    fn condensation() -> Condensation {
        // interval=100 tick (1s), 无子步细分
        Condensation::new(100, 100, 100, 1e-8, 1e-8, true)
    }

    #[test]
    fn test_supersaturated_droplet_grows() {
        let mut state = supersaturated_state();
        let mut supers = vec![test_drop(10.0, 1e-3)];
        let mut rng = GbxRng::new(0, GbxIndex::new(0));

        let r_before = supers[0].radius;
        condensation()
            .run_step(0, &mut state, &mut supers, &mut rng)
            .unwrap();
        assert!(supers[0].radius > r_before);
    }

    #[test]
    fn test_subsaturated_droplet_shrinks() {
        let mut state = supersaturated_state();
        // 抽干水汽使其明显次饱和
        state.qvap *= 0.5;
        let mut supers = vec![test_drop(10.0, 1e-3)];
        let mut rng = GbxRng::new(0, GbxIndex::new(0));

        let r_before = supers[0].radius;
        condensation()
            .run_step(0, &mut state, &mut supers, &mut rng)
            .unwrap();
        assert!(supers[0].radius < r_before);
    }

    #[test]
    fn test_thermo_feedback_conserves_water() {
        let mut state = supersaturated_state();
        let qtot_before = state.qvap + state.qcond;
        let temp_before = state.temp;
        let mut supers = vec![test_drop(10.0, 1e-3)];
        let mut rng = GbxRng::new(0, GbxIndex::new(0));

        condensation()
            .run_step(0, &mut state, &mut supers, &mut rng)
            .unwrap();

        // qvap + qcond 守恒；凝结释放潜热使温度升高
        let qtot_after = state.qvap + state.qcond;
        assert!((qtot_after - qtot_before).abs() < 1e-12);
        assert!(state.qcond > 0.0);
        assert!(state.temp > temp_before);
    }

    #[test]
    fn test_no_feedback_when_disabled() {
        let mut state = supersaturated_state();
        let state_before = state.clone();
        let mut supers = vec![test_drop(10.0, 1e-3)];
        let mut rng = GbxRng::new(0, GbxIndex::new(0));

        let no_couple = Condensation::new(100, 100, 100, 1e-8, 1e-8, false);
        no_couple
            .run_step(0, &mut state, &mut supers, &mut rng)
            .unwrap();
        assert_eq!(state, state_before);
    }

    #[test]
    fn test_invalid_temperature_fatal() {
        let mut state = supersaturated_state();
        state.temp = -1.0;
        let mut supers = vec![test_drop(10.0, 1e-3)];
        let mut rng = GbxRng::new(0, GbxIndex::new(0));

        let err = condensation().run_step(0, &mut state, &mut supers, &mut rng);
        assert!(matches!(
            err.unwrap_err(),
            PhysicsError::InvalidState { .. }
        ));
    }

    #[test]
    fn test_implicit_euler_fixed_point_at_equilibrium() {
        // 初始猜测即为平衡解时应立即收敛
        let implicit = ImplicitEuler::new(50, 1e-3, 1e-8, 1e-8);
        let r = implicit
            .solve(SdId::default(), 1.0, 1e-4, 1e-2, 1.0, 1.0, 10.0)
            .unwrap();
        assert!(r > 0.0);
    }

    #[test]
    fn test_nonconvergence_reports_drop() {
        // maxiters = 0 时必然不收敛
        let implicit = ImplicitEuler::new(0, 1e-3, 1e-16, 1e-16);
        let err = implicit.solve(SdId::default(), 1.05, 1e-4, 1e-2, 1.0, 1.0, 10.0);
        assert!(matches!(
            err.unwrap_err(),
            PhysicsError::NonConvergence { .. }
        ));
    }
}

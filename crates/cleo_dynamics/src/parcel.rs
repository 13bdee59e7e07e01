// crates/cleo_dynamics/src/parcel.rs

//! 绝热气块动力学
//!
//! 每个网格盒四个变量 (p, T, qv, qc) 的气块 ODE：
//! 气压随规定的正弦上升气流 `w = wmax·sin(t/tauhalf)` 按
//! 静力学廓线演化，温度绝热响应，qv/qc 由求解器保持
//! （SDM 的改变经重初始化回馈）。
//!
//! 积分器为嵌入式 Runge–Kutta–Fehlberg(4,5)，步长按
//! rtol/atol 误差范数自适应。规定气流的气块 ODE 非刚性，
//! 显式自适应方法足以替代原 BDF 封装；两向耦合的关键
//! 不变量——增量重初始化纪律——保持不变：每次推进之前
//! 必须通过 [`ParcelDynamics::receive_from_gridboxes`] 把
//! SDM 引起的 T/qv/qc 跳变写入状态向量。

use std::f64::consts::PI;

use log::{debug, info};

use cleo_domain::Gridbox;
use cleo_foundation::constants::{dimless as dlc, dimmed as dc};
use cleo_foundation::timesteps::step2dimlesstime;
use cleo_physics::thermodynamics::{
    moist_specific_heat, saturation_pressure, vapour_pressure_to_mass_mixing_ratio,
};

use crate::contract::CoupledDynamics;
use crate::error::{DynamicsError, DynamicsResult};

/// 每个网格盒的 ODE 变量数 (p, T, qv, qc)
const NVARS: usize = 4;

/// 自适应推进的最大内部步数
const MAX_STEPS: usize = 100_000;

/// 气块动力学参数
#[derive(Debug, Clone)]
pub struct ParcelParams {
    /// 初始压强 [Pa]
    pub p_init: f64,
    /// 初始温度 [K]
    pub temp_init: f64,
    /// 初始相对湿度 [%]
    pub relh_init: f64,
    /// 初始凝结水混合比
    pub qc_init: f64,
    /// 正弦上升气流振幅 [m/s]
    pub w_avg: f64,
    /// 正弦半周期 [s]
    pub t_half: f64,
    /// 相对容差
    pub rtol: f64,
    /// 绝对容差
    pub atol: f64,
    /// 是否演化热力学
    pub do_thermo: bool,
}

/// 绝热气块 ODE 动力学提供者
#[derive(Debug)]
pub struct ParcelDynamics {
    /// 耦合时间步（模型步）
    interval: u64,
    /// 无量纲上升气流振幅 wmax = (π/2)·W_AVG/W0
    wmax: f64,
    /// 无量纲正弦时标 tauhalf = (T_HALF/TIME0)/π
    tauhalf: f64,
    /// 相对容差
    rtol: f64,
    /// 绝对容差
    atol: f64,
    /// 是否演化热力学
    do_thermo: bool,
    /// 状态向量（每盒 NVARS 个变量）
    y: Vec<f64>,
    /// 当前无量纲时间
    t: f64,
    /// 上次发送给网格盒的状态（增量检测基准）
    last_sent: Vec<f64>,
}

impl ParcelDynamics {
    /// 由参数构造，所有网格盒取相同初始气块状态
    pub fn new(couplstep: u64, ngbxs: usize, params: &ParcelParams) -> DynamicsResult<Self> {
        let press_i = params.p_init / dlc::P0;
        let temp_i = params.temp_init / dlc::TEMP0;
        let psat = saturation_pressure(temp_i)?;
        let vapp = psat * params.relh_init / 100.0;
        let qvap_i = vapour_pressure_to_mass_mixing_ratio(vapp, press_i);

        let mut y = Vec::with_capacity(NVARS * ngbxs);
        for _ in 0..ngbxs {
            y.extend_from_slice(&[press_i, temp_i, qvap_i, params.qc_init]);
        }

        Ok(Self {
            interval: couplstep,
            wmax: (PI / 2.0) * params.w_avg / dlc::W0,
            tauhalf: (params.t_half / dlc::TIME0) / PI,
            rtol: params.rtol,
            atol: params.atol,
            do_thermo: params.do_thermo,
            last_sent: y.clone(),
            y,
            t: 0.0,
        })
    }

    /// 求解器当前内部时间（无量纲）
    #[inline]
    pub fn time(&self) -> f64 {
        self.t
    }

    /// dp/dt（无量纲）
    ///
    /// 正弦垂直速度廓线下的静力学气压倾向：
    /// `z = wmax·tauhalf·(1 − cos(t/tauhalf))`，特征廓线
    /// `(1 − Γz/T_g)^γ`，γ = G/(R_dry·Γ) − 1。
    fn dp_dt(&self, t: f64) -> f64 {
        const ZG: f64 = 0.0; // 地面高度（无量纲）
        const TEMPG: f64 = 273.15 / dlc::TEMP0; // 地面温度
        const PG: f64 = 100_000.0 / dlc::P0; // 地面气压
        const LPSRATE: f64 = 0.0062 / dlc::TEMP0 * dlc::W0 * dlc::TIME0; // 湿绝热递减率
        const GAMMA: f64 = dc::G / (dc::RGAS_DRY * 0.0062) - 1.0;
        const DP_DT_CONST: f64 =
            -dlc::W0 * dlc::TIME0 * dc::G / (dc::RGAS_DRY * dlc::TEMP0) * PG / TEMPG;

        let w = self.wmax * (t / self.tauhalf).sin();
        let z = self.wmax * self.tauhalf * (1.0 - (t / self.tauhalf).cos());

        let profile = (1.0 - LPSRATE / TEMPG * (z - ZG)).powf(GAMMA);

        DP_DT_CONST * profile * w
    }

    /// dT/dt：绝热过程仅由气压变化驱动的温度倾向
    fn dtemp_dt_adia(y: &[f64], k: usize, pdot: f64) -> f64 {
        let p = y[k];
        let temp = y[k + 1];
        let qv = y[k + 2];
        let qc = y[k + 3];

        // 干空气密度 p_dry/T
        let rho_d = dlc::MR_RATIO / (dlc::MR_RATIO + qv) * p / temp;
        let cp_m = moist_specific_heat(qv, qc);

        dlc::RGAS_DRY / (rho_d * cp_m) * pdot
    }

    /// ODE 右端项
    fn rhs(&self, t: f64, y: &[f64], ydot: &mut [f64]) {
        for k in (0..y.len()).step_by(NVARS) {
            if self.do_thermo {
                let pdot = self.dp_dt(t);
                ydot[k] = pdot;
                ydot[k + 1] = Self::dtemp_dt_adia(y, k, pdot);
            } else {
                ydot[k] = 0.0;
                ydot[k + 1] = 0.0;
            }
            ydot[k + 2] = 0.0;
            ydot[k + 3] = 0.0;
        }
    }

    /// 嵌入式 RKF45 自适应推进 [t0, t1]
    fn integrate(&mut self, t0: f64, t1: f64) -> DynamicsResult<()> {
        if t1 <= t0 {
            return Ok(());
        }

        let n = self.y.len();
        let mut t = t0;
        let mut h = (t1 - t0) / 10.0;
        let mut k = vec![vec![0.0; n]; 6];
        let mut ytmp = vec![0.0; n];

        for _ in 0..MAX_STEPS {
            if t >= t1 {
                self.t = t1;
                return Ok(());
            }
            h = h.min(t1 - t);

            // 六级 Fehlberg 系数
            self.rhs(t, &self.y, &mut k[0]);

            for i in 0..n {
                ytmp[i] = self.y[i] + h * (1.0 / 4.0) * k[0][i];
            }
            self.rhs(t + h / 4.0, &ytmp, &mut k[1]);

            for i in 0..n {
                ytmp[i] = self.y[i] + h * (3.0 / 32.0 * k[0][i] + 9.0 / 32.0 * k[1][i]);
            }
            self.rhs(t + 3.0 * h / 8.0, &ytmp, &mut k[2]);

            for i in 0..n {
                ytmp[i] = self.y[i]
                    + h * (1932.0 / 2197.0 * k[0][i] - 7200.0 / 2197.0 * k[1][i]
                        + 7296.0 / 2197.0 * k[2][i]);
            }
            self.rhs(t + 12.0 * h / 13.0, &ytmp, &mut k[3]);

            for i in 0..n {
                ytmp[i] = self.y[i]
                    + h * (439.0 / 216.0 * k[0][i] - 8.0 * k[1][i] + 3680.0 / 513.0 * k[2][i]
                        - 845.0 / 4104.0 * k[3][i]);
            }
            self.rhs(t + h, &ytmp, &mut k[4]);

            for i in 0..n {
                ytmp[i] = self.y[i]
                    + h * (-8.0 / 27.0 * k[0][i] + 2.0 * k[1][i] - 3544.0 / 2565.0 * k[2][i]
                        + 1859.0 / 4104.0 * k[3][i]
                        - 11.0 / 40.0 * k[4][i]);
            }
            self.rhs(t + h / 2.0, &ytmp, &mut k[5]);

            // 四阶解与五阶解之差 → 误差范数
            let mut err_sq = 0.0;
            let mut y4 = vec![0.0; n];
            for i in 0..n {
                y4[i] = self.y[i]
                    + h * (25.0 / 216.0 * k[0][i] + 1408.0 / 2565.0 * k[2][i]
                        + 2197.0 / 4104.0 * k[3][i]
                        - 1.0 / 5.0 * k[4][i]);
                let y5 = self.y[i]
                    + h * (16.0 / 135.0 * k[0][i] + 6656.0 / 12825.0 * k[2][i]
                        + 28561.0 / 56430.0 * k[3][i]
                        - 9.0 / 50.0 * k[4][i]
                        + 2.0 / 55.0 * k[5][i]);
                let scale = self.atol + self.rtol * self.y[i].abs();
                let e = (y5 - y4[i]) / scale;
                err_sq += e * e;
            }
            let err = (err_sq / n as f64).sqrt();

            if err <= 1.0 {
                // 接受步
                t += h;
                self.y = y4;
            }

            // PI 风格步长控制
            let factor = if err > 0.0 {
                (0.9 * err.powf(-0.2)).clamp(0.2, 5.0)
            } else {
                5.0
            };
            h *= factor;

            if h < 1e-14 {
                return Err(DynamicsError::solver(format!(
                    "步长塌缩至 {:.3e} (t = {:.6})",
                    h, t
                )));
            }
        }

        Err(DynamicsError::solver(format!(
            "自适应推进超过 {} 步仍未到达 t = {:.6}",
            MAX_STEPS, t1
        )))
    }
}

impl CoupledDynamics for ParcelDynamics {
    fn couplstep(&self) -> u64 {
        self.interval
    }

    fn prepare_to_timestep(&mut self) -> DynamicsResult<()> {
        info!(
            "气块动力学就绪: {} 个网格盒, wmax = {:.4}, tauhalf = {:.4}",
            self.y.len() / NVARS,
            self.wmax,
            self.tauhalf
        );
        Ok(())
    }

    fn run_step(&mut self, t_mdl: u64, t_next: u64) -> DynamicsResult<()> {
        let t0 = step2dimlesstime(t_mdl);
        let t1 = step2dimlesstime(t_next);
        debug!("气块 ODE 推进 [{:.6}, {:.6}]", t0, t1);
        self.integrate(t0, t1)
    }

    fn send_to_gridboxes(&mut self, gbxs: &mut [Gridbox]) -> DynamicsResult<()> {
        for (g, gbx) in gbxs.iter_mut().enumerate() {
            let k = g * NVARS;
            gbx.state.press = self.y[k];
            gbx.state.temp = self.y[k + 1];
            gbx.state.qvap = self.y[k + 2];
            gbx.state.qcond = self.y[k + 3];
        }
        self.last_sent.copy_from_slice(&self.y);
        Ok(())
    }

    /// SDM 微物理后的回读：以增量重初始化状态向量
    ///
    /// 读取每盒 T/qv/qc 相对上次发送值的差并加到求解器状态，
    /// 保证下一次推进建立在不连续之后的状态上。
    fn receive_from_gridboxes(&mut self, gbxs: &[Gridbox]) -> DynamicsResult<()> {
        for (g, gbx) in gbxs.iter().enumerate() {
            let k = g * NVARS;
            self.y[k + 1] += gbx.state.temp - self.last_sent[k + 1];
            self.y[k + 2] += gbx.state.qvap - self.last_sent[k + 2];
            self.y[k + 3] += gbx.state.qcond - self.last_sent[k + 3];
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
    use cleo_domain::State;
    use cleo_foundation::GbxIndex;

    fn params() -> ParcelParams {
        ParcelParams {
            p_init: 100_000.0,
            temp_init: 273.15,
            relh_init: 60.0,
            qc_init: 0.0,
            w_avg: 1.0,
            t_half: 150.0,
            rtol: 1e-6,
            atol: 1e-6,
            do_thermo: true,
        }
    }

    fn gridboxes(n: usize) -> Vec<Gridbox> {
        (0..n)
            .map(|k| {
                Gridbox::new(
                    GbxIndex::from_usize(k),
                    State::new(1.0, 0.0, 1.0, 0.0, 0.0),
                    0,
                )
            })
            .collect()
    }

    #[test]
    fn test_initial_conditions_dimensionless() {
        let dynamics = ParcelDynamics::new(100, 2, &params()).unwrap();
        // p = P_INIT/P0 = 1, T = TEMP_INIT/TEMP0 = 1
        assert!((dynamics.y[0] - 1.0).abs() < 1e-12);
        assert!((dynamics.y[1] - 1.0).abs() < 1e-12);
        assert!(dynamics.y[2] > 0.0); // qvap 由相对湿度导出
        assert!(dynamics.y[3].abs() < 1e-15);
        // 两个盒初值相同
        assert_eq!(dynamics.y.len(), 8);
        assert!((dynamics.y[0] - dynamics.y[4]).abs() < 1e-15);
    }

    #[test]
    fn test_no_thermo_freezes_state() {
        let mut p = params();
        p.do_thermo = false;
        let mut dynamics = ParcelDynamics::new(100, 1, &p).unwrap();
        let y0 = dynamics.y.clone();

        dynamics.run_step(0, 10_000).unwrap();
        for (a, b) in dynamics.y.iter().zip(&y0) {
            assert!((a - b).abs() < 1e-15);
        }
    }

    #[test]
    fn test_ascent_lowers_pressure_and_temperature() {
        let mut dynamics = ParcelDynamics::new(100, 1, &params()).unwrap();
        // 推进 50 s (5000 tick): 上升气流为正, 气压与温度下降
        dynamics.run_step(0, 5_000).unwrap();
        assert!((dynamics.time() - step2dimlesstime(5_000)).abs() < 1e-12);
        assert!(dynamics.y[0] < 1.0);
        assert!(dynamics.y[1] < 1.0);
        // qv, qc 由求解器保持不变
        let qv0 = {
            let fresh = ParcelDynamics::new(100, 1, &params()).unwrap();
            fresh.y[2]
        };
        assert!((dynamics.y[2] - qv0).abs() < 1e-15);
    }

    #[test]
    fn test_send_then_receive_roundtrip_delta() {
        let mut dynamics = ParcelDynamics::new(100, 1, &params()).unwrap();
        let mut gbxs = gridboxes(1);

        dynamics.send_to_gridboxes(&mut gbxs).unwrap();
        let t_sent = gbxs[0].state.temp;

        // SDM 凝结造成不连续
        gbxs[0].state.temp += 0.002;
        gbxs[0].state.qvap -= 0.001;
        gbxs[0].state.qcond += 0.001;

        dynamics.receive_from_gridboxes(&gbxs).unwrap();
        assert!((dynamics.y[1] - (t_sent + 0.002)).abs() < 1e-12);
        assert!((dynamics.y[3] - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_receive_without_delta_is_identity() {
        let mut dynamics = ParcelDynamics::new(100, 2, &params()).unwrap();
        let mut gbxs = gridboxes(2);

        dynamics.send_to_gridboxes(&mut gbxs).unwrap();
        let y_before = dynamics.y.clone();
        dynamics.receive_from_gridboxes(&gbxs).unwrap();
        for (a, b) in dynamics.y.iter().zip(&y_before) {
            assert!((a - b).abs() < 1e-15);
        }
    }

    #[test]
    fn test_gridboxes_evolve_identically() {
        let mut dynamics = ParcelDynamics::new(100, 3, &params()).unwrap();
        dynamics.run_step(0, 2_000).unwrap();
        for g in 1..3 {
            let k = g * NVARS;
            assert!((dynamics.y[k] - dynamics.y[0]).abs() < 1e-12);
            assert!((dynamics.y[k + 1] - dynamics.y[1]).abs() < 1e-12);
        }
    }
}

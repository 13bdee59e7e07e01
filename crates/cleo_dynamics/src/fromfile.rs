// crates/cleo_dynamics/src/fromfile.rs

//! fromfile 动力学提供者
//!
//! 从磁盘读取预先计算的热力学时间序列（已无量纲化），
//! 按 t_mdl 索引。体心场形状为 `[nsteps, ngbxs]`；面上风速
//! 为 C 网格布局：z 面 `(n3+1, n1, n2)`、x 面 `(n3, n1+1, n2)`、
//! y 面 `(n3, n1, n2+1)`，z 最内层展平。
//!
//! 单向耦合：`receive_from_gridboxes` 为空操作。

use log::info;
use ndarray::Array2;

use cleo_domain::Gridbox;
use cleo_foundation::CleoError;

use crate::contract::CoupledDynamics;
use crate::error::{DynamicsError, DynamicsResult};

/// 按时间索引的文件场动力学
#[derive(Debug)]
pub struct FromFileDynamics {
    /// 耦合时间步（模型步）
    interval: u64,
    /// 各方向网格盒数 (n3, n1, n2)
    ndims: [usize; 3],
    /// 当前时间槽
    pos: usize,
    /// 压强 [nsteps, ngbxs]
    press: Array2<f64>,
    /// 温度 [nsteps, ngbxs]
    temp: Array2<f64>,
    /// 水汽混合比 [nsteps, ngbxs]
    qvap: Array2<f64>,
    /// 凝结水混合比 [nsteps, ngbxs]
    qcond: Array2<f64>,
    /// z 面垂直风速 [nsteps, (n3+1)·n1·n2]
    wvel: Option<Array2<f64>>,
    /// x 面 u 风速 [nsteps, n3·(n1+1)·n2]
    uvel: Option<Array2<f64>>,
    /// y 面 v 风速 [nsteps, n3·n1·(n2+1)]
    vvel: Option<Array2<f64>>,
}

impl FromFileDynamics {
    /// 由已读入的（无量纲）场数组构造
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        couplstep: u64,
        ndims: [usize; 3],
        press: Array2<f64>,
        temp: Array2<f64>,
        qvap: Array2<f64>,
        qcond: Array2<f64>,
        wvel: Option<Array2<f64>>,
        uvel: Option<Array2<f64>>,
        vvel: Option<Array2<f64>>,
    ) -> DynamicsResult<Self> {
        let (n3, n1, n2) = (ndims[0], ndims[1], ndims[2]);
        let ngbxs = n3 * n1 * n2;
        let nsteps = press.nrows();

        for (name, arr, ncols) in [
            ("press", &press, ngbxs),
            ("temp", &temp, ngbxs),
            ("qvap", &qvap, ngbxs),
            ("qcond", &qcond, ngbxs),
        ] {
            CleoError::check_size(name, ncols, arr.ncols()).map_err(DynamicsError::from)?;
            CleoError::check_size(name, nsteps, arr.nrows()).map_err(DynamicsError::from)?;
        }
        if let Some(w) = &wvel {
            CleoError::check_size("wvel", (n3 + 1) * n1 * n2, w.ncols())
                .map_err(DynamicsError::from)?;
        }
        if let Some(u) = &uvel {
            CleoError::check_size("uvel", n3 * (n1 + 1) * n2, u.ncols())
                .map_err(DynamicsError::from)?;
        }
        if let Some(v) = &vvel {
            CleoError::check_size("vvel", n3 * n1 * (n2 + 1), v.ncols())
                .map_err(DynamicsError::from)?;
        }

        Ok(Self {
            interval: couplstep,
            ndims,
            pos: 0,
            press,
            temp,
            qvap,
            qcond,
            wvel,
            uvel,
            vvel,
        })
    }

    /// 网格盒展平索引 → (k3, k1, k2)
    fn unflatten(&self, k: usize) -> (usize, usize, usize) {
        let n3 = self.ndims[0];
        let n1 = self.ndims[1];
        (k % n3, (k / n3) % n1, k / (n3 * n1))
    }
}

impl CoupledDynamics for FromFileDynamics {
    fn couplstep(&self) -> u64 {
        self.interval
    }

    fn prepare_to_timestep(&mut self) -> DynamicsResult<()> {
        info!(
            "fromfile 动力学就绪: {} 个时间槽, ndims = {:?}",
            self.press.nrows(),
            self.ndims
        );
        Ok(())
    }

    fn run_step(&mut self, _t_mdl: u64, t_next: u64) -> DynamicsResult<()> {
        // 推进到覆盖 t_next 的时间槽
        self.pos = (t_next / self.interval) as usize;
        Ok(())
    }

    fn send_to_gridboxes(&mut self, gbxs: &mut [Gridbox]) -> DynamicsResult<()> {
        let nsteps = self.press.nrows();
        if self.pos >= nsteps {
            return Err(DynamicsError::SeriesExhausted {
                requested: self.pos,
                available: nsteps,
            });
        }

        let (n3, n1, _n2) = (self.ndims[0], self.ndims[1], self.ndims[2]);
        for (k, gbx) in gbxs.iter_mut().enumerate() {
            gbx.state.press = self.press[[self.pos, k]];
            gbx.state.temp = self.temp[[self.pos, k]];
            gbx.state.qvap = self.qvap[[self.pos, k]];
            gbx.state.qcond = self.qcond[[self.pos, k]];

            let (k3, k1, k2) = self.unflatten(k);
            if let Some(w) = &self.wvel {
                let lower = k3 + (n3 + 1) * (k1 + n1 * k2);
                gbx.state.wvel = (w[[self.pos, lower]], w[[self.pos, lower + 1]]);
            }
            if let Some(u) = &self.uvel {
                let lower = k3 + n3 * (k1 + (n1 + 1) * k2);
                let upper = k3 + n3 * ((k1 + 1) + (n1 + 1) * k2);
                gbx.state.uvel = (u[[self.pos, lower]], u[[self.pos, upper]]);
            }
            if let Some(v) = &self.vvel {
                let lower = k3 + n3 * (k1 + n1 * k2);
                let upper = k3 + n3 * (k1 + n1 * (k2 + 1));
                gbx.state.vvel = (v[[self.pos, lower]], v[[self.pos, upper]]);
            }
        }
        Ok(())
    }

    fn receive_from_gridboxes(&mut self, _gbxs: &[Gridbox]) -> DynamicsResult<()> {
        // 单向耦合
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
    use ndarray::arr2;

    fn gridboxes(ngbxs: usize) -> Vec<Gridbox> {
        (0..ngbxs)
            .map(|k| {
                Gridbox::new(
                    GbxIndex::from_usize(k),
                    State::new(1.0, 0.0, 1.0, 0.0, 0.0),
                    0,
                )
            })
            .collect()
    }

    fn dynamics_2gbx() -> FromFileDynamics {
        // 1×... ndims (2,1,1): ngbxs=2, 3 个时间槽
        FromFileDynamics::new(
            100,
            [2, 1, 1],
            arr2(&[[1.0, 1.1], [2.0, 2.1], [3.0, 3.1]]),
            arr2(&[[0.9, 0.9], [0.95, 0.95], [1.0, 1.0]]),
            arr2(&[[0.01, 0.01], [0.02, 0.02], [0.03, 0.03]]),
            arr2(&[[0.0, 0.0], [0.0, 0.0], [0.0, 0.0]]),
            // z 面: (n3+1)·n1·n2 = 3 个面
            Some(arr2(&[[0.5, 1.0, 1.5], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]])),
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_send_reads_current_slot() {
        let mut dynamics = dynamics_2gbx();
        let mut gbxs = gridboxes(2);

        dynamics.send_to_gridboxes(&mut gbxs).unwrap();
        assert!((gbxs[0].state.press - 1.0).abs() < 1e-12);
        assert!((gbxs[1].state.press - 1.1).abs() < 1e-12);
        // gbx0 的 z 面 = (面0, 面1); gbx1 = (面1, 面2)
        assert!((gbxs[0].state.wvel.0 - 0.5).abs() < 1e-12);
        assert!((gbxs[0].state.wvel.1 - 1.0).abs() < 1e-12);
        assert!((gbxs[1].state.wvel.0 - 1.0).abs() < 1e-12);
        assert!((gbxs[1].state.wvel.1 - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_run_step_advances_slot() {
        let mut dynamics = dynamics_2gbx();
        let mut gbxs = gridboxes(2);

        dynamics.run_step(0, 100).unwrap();
        dynamics.send_to_gridboxes(&mut gbxs).unwrap();
        assert!((gbxs[0].state.press - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_series_exhaustion_is_error() {
        let mut dynamics = dynamics_2gbx();
        let mut gbxs = gridboxes(2);

        dynamics.run_step(0, 1000).unwrap(); // 槽 10 > 可用 3
        let err = dynamics.send_to_gridboxes(&mut gbxs);
        assert!(matches!(
            err.unwrap_err(),
            DynamicsError::SeriesExhausted { .. }
        ));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = FromFileDynamics::new(
            100,
            [2, 1, 1],
            arr2(&[[1.0]]), // ngbxs=2 但只有 1 列
            arr2(&[[1.0]]),
            arr2(&[[0.0]]),
            arr2(&[[0.0]]),
            None,
            None,
            None,
        );
        assert!(err.is_err());
    }
}

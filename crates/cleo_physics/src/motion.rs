// crates/cleo_physics/src/motion.rs

//! 液滴运动与重新归箱
//!
//! 坐标更新采用预估-校正法（Grabowski et al. 2018）：
//! 垂直方向组合液滴沉降末速与网格盒 z 面风速，水平方向由
//! 面上风速在盒内线性插值平流。
//!
//! 更新后按轴序 (3, 1, 2) 依次分类坐标并迁移网格盒索引：
//! 每轴跨越至多一个网格盒；违反即为 CFL 违例，属致命错误，
//! 引擎绝不静默二次归箱。
//!
//! 域边界策略：z 上边界反射（液滴弹回顶层盒），z 下边界流失
//! （降水离域，索引置哨兵值）；水平方向默认周期回绕。

use glam::DVec3;

use cleo_domain::maps::{Axis, CartesianMaps};
use cleo_domain::{State, Superdrop};
use cleo_foundation::timesteps::{next_multiple, on_multiple, step2dimlesstime};
use cleo_foundation::GbxIndex;

use crate::error::{PhysicsError, PhysicsResult};
use crate::terminalvelocity::TerminalVelocity;

/// 面值在盒内按坐标线性插值
#[inline]
fn interpolate_face(face: (f64, f64), bounds: (f64, f64), coord: f64) -> f64 {
    let frac = (coord - bounds.0) / (bounds.1 - bounds.0);
    face.0 + (face.1 - face.0) * frac
}

/// 预估-校正运动
#[derive(Debug, Clone)]
pub struct PredCorrMotion<TV> {
    /// 运动时间步（模型步）
    interval: u64,
    /// 对应的无量纲时长
    delt: f64,
    /// 沉降末速公式
    terminalv: TV,
}

impl<TV: TerminalVelocity> PredCorrMotion<TV> {
    /// 创建运动更新器
    pub fn new(interval: u64, terminalv: TV) -> Self {
        Self {
            interval,
            delt: step2dimlesstime(interval),
            terminalv,
        }
    }

    /// 运动时间步
    #[inline]
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// 当前时刻是否到期
    #[inline]
    pub fn on_step(&self, t: u64) -> bool {
        on_multiple(t, self.interval)
    }

    /// 下一次到期时刻
    #[inline]
    pub fn next_step(&self, t: u64) -> u64 {
        next_multiple(t, self.interval)
    }

    /// 预估-校正更新液滴坐标并做 CFL 检查
    ///
    /// 液滴已在域外时为空操作。
    pub fn update_superdrop_coords(
        &self,
        maps: &CartesianMaps,
        state: &State,
        drop: &mut Superdrop,
    ) -> PhysicsResult<()> {
        let gbxindex = drop.gbxindex();
        if gbxindex.is_out_of_domain() {
            return Ok(());
        }

        let bounds3 = maps.coord3bounds(gbxindex);
        let bounds1 = maps.coord1bounds(gbxindex);
        let bounds2 = maps.coord2bounds(gbxindex);
        let terminal = self.terminalv.terminal_velocity(drop);

        // 预估速度（当前坐标处）
        let vel3 = interpolate_face(state.wvel, bounds3, drop.coord3()) - terminal;
        let vel1 = interpolate_face(state.uvel, bounds1, drop.coord1());
        let vel2 = interpolate_face(state.vvel, bounds2, drop.coord2());

        // 校正速度（预估坐标处）
        let corrvel3 =
            interpolate_face(state.wvel, bounds3, drop.coord3() + vel3 * self.delt) - terminal;
        let corrvel1 =
            interpolate_face(state.uvel, bounds1, drop.coord1() + vel1 * self.delt);
        let corrvel2 =
            interpolate_face(state.vvel, bounds2, drop.coord2() + vel2 * self.delt);

        // 预估-校正位移
        let half_delt = self.delt / 2.0;
        let delta = DVec3::new(
            (vel1 + corrvel1) * half_delt,
            (vel2 + corrvel2) * half_delt,
            (vel3 + corrvel3) * half_delt,
        );

        self.check_cfl(maps, gbxindex, drop, delta)?;

        drop.coords += delta;
        Ok(())
    }

    /// CFL 判据：每轴位移不得超过该轴网格步长
    fn check_cfl(
        &self,
        maps: &CartesianMaps,
        gbxindex: GbxIndex,
        drop: &Superdrop,
        delta: DVec3,
    ) -> PhysicsResult<()> {
        for (axis, name, d) in [
            (Axis::Coord3, "coord3", delta.z),
            (Axis::Coord1, "coord1", delta.x),
            (Axis::Coord2, "coord2", delta.y),
        ] {
            let (lower, upper) = maps.bounds(axis, gbxindex);
            let gridstep = upper - lower;
            if d.abs() > gridstep {
                return Err(PhysicsError::CflViolation {
                    gbxindex,
                    drop_id: drop.id(),
                    axis: name,
                    delta: d,
                    gridstep,
                });
            }
        }
        Ok(())
    }

    /// 按轴序 (3, 1, 2) 重新归箱
    ///
    /// 每轴分类: 域外→不变; coord < lower→后向; coord ≥ upper→前向;
    /// 否则不变。每轴处理后断言包含不变量。
    pub fn update_superdrop_gbxindex(
        &self,
        maps: &CartesianMaps,
        drop: &mut Superdrop,
    ) -> PhysicsResult<()> {
        rebin_axis3(maps, drop)?;
        rebin_horizontal(maps, Axis::Coord1, "coord1", drop)?;
        rebin_horizontal(maps, Axis::Coord2, "coord2", drop)?;
        Ok(())
    }

    /// 运动步：坐标更新 + 重新归箱
    pub fn move_superdrop(
        &self,
        maps: &CartesianMaps,
        state: &State,
        drop: &mut Superdrop,
    ) -> PhysicsResult<()> {
        self.update_superdrop_coords(maps, state, drop)?;
        self.update_superdrop_gbxindex(maps, drop)
    }
}

/// z 轴归箱：上边界反射，下边界流失（降水）
fn rebin_axis3(maps: &CartesianMaps, drop: &mut Superdrop) -> PhysicsResult<()> {
    let idx = drop.gbxindex();
    if idx.is_out_of_domain() {
        return Ok(());
    }

    let (lower, upper) = maps.coord3bounds(idx);
    let coord = drop.coord3();

    let newidx = if coord < lower {
        if maps.at_lower_edge(Axis::Coord3, idx) {
            // 域底流失: 坐标保持, 索引置哨兵
            GbxIndex::OUT_OF_DOMAIN
        } else {
            maps.backward(Axis::Coord3, idx)
        }
    } else if coord >= upper {
        if maps.at_upper_edge(Axis::Coord3, idx) {
            // 域顶反射回顶层盒内（上界不含，贴边时收回盒内）
            let reflected = (2.0 * upper - coord).min(upper - (upper - lower) * 1e-12);
            drop.coords.z = reflected;
            idx
        } else {
            maps.forward(Axis::Coord3, idx)
        }
    } else {
        idx
    };

    drop.set_gbxindex(newidx);
    assert_containment(maps, Axis::Coord3, "coord3", drop)
}

/// 水平轴归箱：周期回绕（或有限域流失）
fn rebin_horizontal(
    maps: &CartesianMaps,
    axis: Axis,
    name: &'static str,
    drop: &mut Superdrop,
) -> PhysicsResult<()> {
    let idx = drop.gbxindex();
    if idx.is_out_of_domain() {
        return Ok(());
    }

    let (lower, upper) = maps.bounds(axis, idx);
    let coord = match axis {
        Axis::Coord1 => drop.coord1(),
        Axis::Coord2 => drop.coord2(),
        Axis::Coord3 => unreachable!(),
    };

    let newidx = if coord < lower {
        let nbr = maps.backward(axis, idx);
        if maps.at_lower_edge(axis, idx) && nbr.is_in_domain() {
            // 周期回绕: coord → coord + 域长
            // lim1 = 后向邻居上界(域顶), lim2 = 当前盒下界(域底)
            let lim1 = maps.bounds(axis, nbr).1;
            let wrapped = coord + lim1 - lower;
            set_axis_coord(drop, axis, wrapped);
        }
        nbr
    } else if coord >= upper {
        let nbr = maps.forward(axis, idx);
        if maps.at_upper_edge(axis, idx) && nbr.is_in_domain() {
            // 周期回绕: coord → coord − 域长
            // lim1 = 前向邻居下界(域底), lim2 = 当前盒上界(域顶)
            let lim1 = maps.bounds(axis, nbr).0;
            let wrapped = coord + lim1 - upper;
            set_axis_coord(drop, axis, wrapped);
        }
        nbr
    } else {
        idx
    };

    drop.set_gbxindex(newidx);
    assert_containment(maps, axis, name, drop)
}

/// 写回某轴坐标
#[inline]
fn set_axis_coord(drop: &mut Superdrop, axis: Axis, value: f64) {
    match axis {
        Axis::Coord1 => drop.coords.x = value,
        Axis::Coord2 => drop.coords.y = value,
        Axis::Coord3 => drop.coords.z = value,
    }
}

/// 包含不变量：索引为哨兵，或 lower ≤ coord < upper
///
/// 违反说明运动步跨越了多于一个网格盒（CFL 违例），致命。
fn assert_containment(
    maps: &CartesianMaps,
    axis: Axis,
    name: &'static str,
    drop: &Superdrop,
) -> PhysicsResult<()> {
    let idx = drop.gbxindex();
    if idx.is_out_of_domain() {
        return Ok(());
    }
    let coord = match axis {
        Axis::Coord3 => drop.coord3(),
        Axis::Coord1 => drop.coord1(),
        Axis::Coord2 => drop.coord2(),
    };
    if maps.contains(axis, idx, coord) {
        Ok(())
    } else {
        Err(PhysicsError::RebinExceeded {
            gbxindex: idx,
            drop_id: drop.id(),
            axis: name,
        })
    }
}

// ============================================================================
// 测试
// ============================================================================

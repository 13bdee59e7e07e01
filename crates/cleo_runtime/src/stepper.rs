// crates/cleo_runtime/src/stepper.rs

//! SDM 步进器
//!
//! 持有网格映射、微物理组合、运动更新器、网格盒数组与
//! 液滴 Arena，负责在单个时间步内以网格盒级并行执行
//! 微物理与运动两个阶段。阶段内无跨网格盒通信：运动虽
//! 跨网格盒，但写操作推迟到阶段末的排序/压实统一完成。

use log::debug;
use rayon::prelude::*;

use cleo_domain::{CartesianMaps, Gridbox, SuperdropArena};
use cleo_foundation::{CleoError, CleoResult};
use cleo_physics::{MicrophysicalProcess, PredCorrMotion, TerminalVelocity};

use crate::error::{RuntimeError, RuntimeResult};

/// SDM 步进器
pub struct SdmStepper<P, TV> {
    maps: CartesianMaps,
    microphys: P,
    motion: PredCorrMotion<TV>,
    gbxs: Vec<Gridbox>,
    arena: SuperdropArena,
}

impl<P, TV> SdmStepper<P, TV>
where
    P: MicrophysicalProcess,
    TV: TerminalVelocity,
{
    /// 组装步进器，校验网格盒数量一致
    pub fn new(
        maps: CartesianMaps,
        microphys: P,
        motion: PredCorrMotion<TV>,
        gbxs: Vec<Gridbox>,
        arena: SuperdropArena,
    ) -> CleoResult<Self> {
        CleoError::check_size("gridboxes", maps.ngbxs(), gbxs.len())?;
        CleoError::check_size("arena.ngbxs", maps.ngbxs(), arena.ngbxs())?;
        Ok(Self {
            maps,
            microphys,
            motion,
            gbxs,
            arena,
        })
    }

    /// 网格盒数组
    pub fn gbxs(&self) -> &[Gridbox] {
        &self.gbxs
    }

    /// 可变网格盒数组（耦合写回用）
    pub fn gbxs_mut(&mut self) -> &mut [Gridbox] {
        &mut self.gbxs
    }

    /// 液滴 Arena
    pub fn arena(&self) -> &SuperdropArena {
        &self.arena
    }

    /// 网格映射
    pub fn maps(&self) -> &CartesianMaps {
        &self.maps
    }

    /// 微物理是否到期
    pub fn microphys_on_step(&self, t: u64) -> bool {
        self.microphys.on_step(t)
    }

    /// 微物理下一次到期时刻
    pub fn microphys_next_step(&self, t: u64) -> u64 {
        self.microphys.next_step(t)
    }

    /// 运动是否到期
    pub fn motion_on_step(&self, t: u64) -> bool {
        self.motion.on_step(t)
    }

    /// 运动下一次到期时刻
    pub fn motion_next_step(&self, t: u64) -> u64 {
        self.motion.next_step(t)
    }

    /// 微物理阶段：每个网格盒在自己的切片上运行碰撞与凝结
    pub fn microphysics_step(&mut self, t: u64) -> RuntimeResult<()> {
        debug!("t = {}: 微物理阶段", t);
        let microphys = &self.microphys;
        let slices = self.arena.gbx_slices_mut();

        self.gbxs
            .par_iter_mut()
            .zip(slices)
            .try_for_each(|(gbx, slice)| {
                microphys.run_step(t, &mut gbx.state, slice, &mut gbx.rng)
            })
            .map_err(|source| RuntimeError::physics(t, source))
    }

    /// 运动阶段：更新坐标、迁移网格盒索引，再排序/压实
    pub fn motion_step(&mut self, t: u64) -> RuntimeResult<()> {
        debug!("t = {}: 运动阶段", t);
        let maps = &self.maps;
        let motion = &self.motion;
        let slices = self.arena.gbx_slices_mut();

        self.gbxs
            .par_iter()
            .zip(slices)
            .try_for_each(|(gbx, slice)| {
                for drop in slice.iter_mut() {
                    motion.move_superdrop(maps, &gbx.state, drop)?;
                }
                Ok(())
            })
            .map_err(|source| RuntimeError::physics(t, source))?;

        // 排序/压实建立下一次微物理的 happens-before 边
        self.arena
            .sort_and_partition()
            .map_err(RuntimeError::from)
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cleo_domain::{InitGbxsData, InitSupersData, SoluteProperties};
    use cleo_foundation::{GbxIndex, SdIdGenerator};
    use cleo_physics::{NullProcess, NullTerminalVelocity};
    use std::sync::Arc;

    fn build_stepper(
        wvel: f64,
    ) -> SdmStepper<NullProcess, NullTerminalVelocity> {
        let maps = CartesianMaps::uniform(
            [2, 1, 1],
            (0.0, 2.0),
            (0.0, 1.0),
            (0.0, 1.0),
            true,
        )
        .unwrap();

        let mut gbxs_data = InitGbxsData::uniform(2, 1.0, 1.0, 0.01, 0.0);
        for w in gbxs_data.wvel.iter_mut() {
            *w = (wvel, wvel);
        }
        let gbxs = gbxs_data.into_gridboxes(&maps, 0).unwrap();

        let ids = SdIdGenerator::new();
        let supers = InitSupersData {
            sdgbxindex: vec![0, 0, 1],
            xi: vec![1, 1, 1],
            radius: vec![10.0; 3],
            msol: vec![0.0; 3],
            coord3: vec![0.95, 0.5, 1.5],
            coord1: vec![0.5; 3],
            coord2: vec![0.5; 3],
        };
        let arena = supers
            .into_arena(3, &maps, Arc::new(SoluteProperties::default()), &ids)
            .unwrap();

        SdmStepper::new(
            maps,
            NullProcess,
            PredCorrMotion::new(100, NullTerminalVelocity),
            gbxs,
            arena,
        )
        .unwrap()
    }

    #[test]
    fn test_motion_step_rebins_and_preserves_partition() {
        // 上升风 100: Δz = 0.1, 第一滴 0.95 → 1.05 迁往盒 1
        let mut stepper = build_stepper(100.0);
        stepper.motion_step(0).unwrap();

        assert_eq!(stepper.arena().supers_in(GbxIndex::new(0)).len(), 1);
        assert_eq!(stepper.arena().supers_in(GbxIndex::new(1)).len(), 2);
        // 划分不变量
        assert_eq!(
            stepper.arena().n_in_domain() + stepper.arena().n_out_of_domain(),
            3
        );
    }

    #[test]
    fn test_containment_invariant_after_motion() {
        let mut stepper = build_stepper(100.0);
        stepper.motion_step(0).unwrap();

        for drop in stepper.arena().iter_in_domain() {
            let idx = drop.gbxindex();
            let (lo3, up3) = stepper.maps().coord3bounds(idx);
            assert!(lo3 <= drop.coord3() && drop.coord3() < up3);
        }
    }

    #[test]
    fn test_mismatched_sizes_rejected() {
        let maps = CartesianMaps::uniform(
            [2, 1, 1],
            (0.0, 2.0),
            (0.0, 1.0),
            (0.0, 1.0),
            true,
        )
        .unwrap();
        let gbxs = InitGbxsData::uniform(1, 1.0, 1.0, 0.0, 0.0) // 数量不符
            .into_gridboxes(
                &CartesianMaps::uniform(
                    [1, 1, 1],
                    (0.0, 1.0),
                    (0.0, 1.0),
                    (0.0, 1.0),
                    true,
                )
                .unwrap(),
                0,
            )
            .unwrap();
        let arena = SuperdropArena::new(Vec::new(), 2).unwrap();

        let result = SdmStepper::new(
            maps,
            NullProcess,
            PredCorrMotion::new(100, NullTerminalVelocity),
            gbxs,
            arena,
        );
        assert!(result.is_err());
    }
}

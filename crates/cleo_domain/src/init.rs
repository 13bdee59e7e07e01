// crates/cleo_domain/src/init.rs

//! 初始条件构造
//!
//! 由调用方提供的向量构造超级液滴 Arena 与网格盒数组。
//! 向量长度与声明尺寸不符、初始液滴不在其声明网格盒内等
//! 均为启动期致命错误（InitError 语义），在此处验证。

use std::sync::Arc;

use log::info;

use cleo_foundation::{CleoError, CleoResult, GbxIndex, SdIdGenerator};

use crate::arena::SuperdropArena;
use crate::gridbox::Gridbox;
use crate::maps::{Axis, CartesianMaps};
use crate::state::State;
use crate::superdrop::{SoluteProperties, Superdrop};

// ============================================================================
// 超级液滴初始数据
// ============================================================================

/// 初始超级液滴属性向量（全部长度须等于 totnsupers）
#[derive(Debug, Clone, Default)]
pub struct InitSupersData {
    /// 初始所属网格盒索引
    pub sdgbxindex: Vec<u32>,
    /// 倍率 ξ
    pub xi: Vec<u64>,
    /// 湿半径
    pub radius: Vec<f64>,
    /// 溶质质量
    pub msol: Vec<f64>,
    /// 垂直坐标
    pub coord3: Vec<f64>,
    /// 水平坐标 1
    pub coord1: Vec<f64>,
    /// 水平坐标 2
    pub coord2: Vec<f64>,
}

impl InitSupersData {
    /// 构造 Arena
    ///
    /// 验证：向量长度等于 `totnsupers`；ξ ≥ 1；半径为正；
    /// 溶质质量非负；每个液滴坐标落在其声明网格盒边界内。
    pub fn into_arena(
        self,
        totnsupers: usize,
        maps: &CartesianMaps,
        solute: Arc<SoluteProperties>,
        ids: &SdIdGenerator,
    ) -> CleoResult<SuperdropArena> {
        CleoError::check_size("initsupers.sdgbxindex", totnsupers, self.sdgbxindex.len())?;
        CleoError::check_size("initsupers.xi", totnsupers, self.xi.len())?;
        CleoError::check_size("initsupers.radius", totnsupers, self.radius.len())?;
        CleoError::check_size("initsupers.msol", totnsupers, self.msol.len())?;
        CleoError::check_size("initsupers.coord3", totnsupers, self.coord3.len())?;
        CleoError::check_size("initsupers.coord1", totnsupers, self.coord1.len())?;
        CleoError::check_size("initsupers.coord2", totnsupers, self.coord2.len())?;

        let ngbxs = maps.ngbxs();
        let mut drops = Vec::with_capacity(totnsupers);
        for k in 0..totnsupers {
            if self.xi[k] == 0 {
                return Err(CleoError::invalid_input(format!(
                    "初始液滴 {} 的倍率 ξ 必须 ≥ 1",
                    k
                )));
            }
            if !(self.radius[k] > 0.0) {
                return Err(CleoError::invalid_input(format!(
                    "初始液滴 {} 的半径必须为正, 实际 {}",
                    k, self.radius[k]
                )));
            }
            if self.msol[k] < 0.0 {
                return Err(CleoError::invalid_input(format!(
                    "初始液滴 {} 的溶质质量不能为负",
                    k
                )));
            }
            CleoError::check_index("gridbox", self.sdgbxindex[k] as usize, ngbxs)?;

            let gbx = GbxIndex::new(self.sdgbxindex[k]);
            let in_bounds = maps.contains(Axis::Coord3, gbx, self.coord3[k])
                && maps.contains(Axis::Coord1, gbx, self.coord1[k])
                && maps.contains(Axis::Coord2, gbx, self.coord2[k]);
            if !in_bounds {
                return Err(CleoError::invalid_input(format!(
                    "初始液滴 {} 不在其声明的网格盒 {} 边界内",
                    k, gbx
                )));
            }

            drops.push(Superdrop::new(
                ids.next_id(),
                gbx,
                self.xi[k],
                self.radius[k],
                self.msol[k],
                self.coord3[k],
                self.coord1[k],
                self.coord2[k],
                Arc::clone(&solute),
            ));
        }

        info!("已创建 {} 个超级液滴", drops.len());
        SuperdropArena::new(drops, ngbxs)
    }
}

// ============================================================================
// 网格盒初始数据
// ============================================================================

/// 初始网格盒热力学场向量（全部长度须等于 ngbxs）
#[derive(Debug, Clone, Default)]
pub struct InitGbxsData {
    /// 压强
    pub press: Vec<f64>,
    /// 温度
    pub temp: Vec<f64>,
    /// 水汽质量混合比
    pub qvap: Vec<f64>,
    /// 凝结水质量混合比
    pub qcond: Vec<f64>,
    /// z 面垂直风速 {下, 上}
    pub wvel: Vec<(f64, f64)>,
    /// x 面 u 风速 {下, 上}
    pub uvel: Vec<(f64, f64)>,
    /// y 面 v 风速 {下, 上}
    pub vvel: Vec<(f64, f64)>,
}

impl InitGbxsData {
    /// 全域均一的静止初始场
    pub fn uniform(ngbxs: usize, press: f64, temp: f64, qvap: f64, qcond: f64) -> Self {
        Self {
            press: vec![press; ngbxs],
            temp: vec![temp; ngbxs],
            qvap: vec![qvap; ngbxs],
            qcond: vec![qcond; ngbxs],
            wvel: vec![(0.0, 0.0); ngbxs],
            uvel: vec![(0.0, 0.0); ngbxs],
            vvel: vec![(0.0, 0.0); ngbxs],
        }
    }

    /// 构造网格盒数组
    pub fn into_gridboxes(
        self,
        maps: &CartesianMaps,
        run_seed: u64,
    ) -> CleoResult<Vec<Gridbox>> {
        let ngbxs = maps.ngbxs();
        CleoError::check_size("initgbxs.press", ngbxs, self.press.len())?;
        CleoError::check_size("initgbxs.temp", ngbxs, self.temp.len())?;
        CleoError::check_size("initgbxs.qvap", ngbxs, self.qvap.len())?;
        CleoError::check_size("initgbxs.qcond", ngbxs, self.qcond.len())?;
        CleoError::check_size("initgbxs.wvel", ngbxs, self.wvel.len())?;
        CleoError::check_size("initgbxs.uvel", ngbxs, self.uvel.len())?;
        CleoError::check_size("initgbxs.vvel", ngbxs, self.vvel.len())?;

        let mut gbxs = Vec::with_capacity(ngbxs);
        for k in 0..ngbxs {
            if !(self.temp[k] > 0.0) {
                return Err(CleoError::invalid_input(format!(
                    "网格盒 {} 的初始温度必须为正, 实际 {}",
                    k, self.temp[k]
                )));
            }
            let idx = GbxIndex::from_usize(k);
            let mut state = State::new(
                maps.gbxvolume(idx),
                self.press[k],
                self.temp[k],
                self.qvap[k],
                self.qcond[k],
            );
            state.wvel = self.wvel[k];
            state.uvel = self.uvel[k];
            state.vvel = self.vvel[k];
            gbxs.push(Gridbox::new(idx, state, run_seed));
        }

        info!("已创建 {} 个网格盒", gbxs.len());
        Ok(gbxs)
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn maps() -> CartesianMaps {
        CartesianMaps::uniform([2, 1, 1], (0.0, 2.0), (0.0, 1.0), (0.0, 1.0), true).unwrap()
    }

    fn supers_data(n: usize) -> InitSupersData {
        InitSupersData {
            sdgbxindex: vec![0; n],
            xi: vec![1; n],
            radius: vec![1.0; n],
            msol: vec![0.0; n],
            coord3: vec![0.5; n],
            coord1: vec![0.5; n],
            coord2: vec![0.5; n],
        }
    }

    #[test]
    fn test_build_arena() {
        let ids = SdIdGenerator::new();
        let arena = supers_data(4)
            .into_arena(4, &maps(), Arc::new(SoluteProperties::default()), &ids)
            .unwrap();
        assert_eq!(arena.len(), 4);
        assert_eq!(arena.n_in_domain(), 4);
    }

    #[test]
    fn test_short_vector_rejected() {
        let ids = SdIdGenerator::new();
        let mut data = supers_data(4);
        data.radius.pop();
        let err = data.into_arena(4, &maps(), Arc::new(SoluteProperties::default()), &ids);
        assert!(matches!(err.unwrap_err(), CleoError::SizeMismatch { .. }));
    }

    #[test]
    fn test_drop_outside_declared_gridbox_rejected() {
        let ids = SdIdGenerator::new();
        let mut data = supers_data(1);
        data.coord3[0] = 1.5; // 网格盒 0 的 z 边界是 [0, 1)
        let err = data.into_arena(1, &maps(), Arc::new(SoluteProperties::default()), &ids);
        assert!(err.is_err());
    }

    #[test]
    fn test_zero_xi_rejected() {
        let ids = SdIdGenerator::new();
        let mut data = supers_data(1);
        data.xi[0] = 0;
        let err = data.into_arena(1, &maps(), Arc::new(SoluteProperties::default()), &ids);
        assert!(err.is_err());
    }

    #[test]
    fn test_build_gridboxes() {
        let gbxs = InitGbxsData::uniform(2, 1.0, 1.05, 0.01, 0.0)
            .into_gridboxes(&maps(), 7)
            .unwrap();
        assert_eq!(gbxs.len(), 2);
        assert!((gbxs[1].state.volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_nonpositive_temperature_rejected() {
        let mut data = InitGbxsData::uniform(2, 1.0, 1.0, 0.0, 0.0);
        data.temp[1] = 0.0;
        assert!(data.into_gridboxes(&maps(), 7).is_err());
    }
}

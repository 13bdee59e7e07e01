// crates/cleo_domain/src/maps.rs

//! 笛卡尔网格拓扑映射
//!
//! 网格盒按行主序 (n3, n1, n2) 展平，axis 3（垂直 z）为最内层：
//! `idx = k3 + n3·(k1 + n1·k2)`。
//!
//! 对每个有效索引与每条轴提供 `(lower, upper)` 边界
//! （下界含、上界不含）以及前向/后向邻居查询。
//! 域边缘判定为纯算术规则：轴 a 上索引位于下边缘当且仅当
//! `(idx / stride_a) % ndim_a == 0`。
//!
//! 边界策略：z 方向有限域（上下边缘无邻居），
//! x/y 方向默认周期（可经配置关闭）。

use cleo_foundation::{CleoError, CleoResult, GbxIndex};

/// 网格轴（编号沿用 (3, 1, 2) 约定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// 垂直 z
    Coord3,
    /// 水平 x
    Coord1,
    /// 水平 y
    Coord2,
}

/// 笛卡尔网格盒映射
#[derive(Debug, Clone)]
pub struct CartesianMaps {
    /// 各方向网格盒数 (n3, n1, n2)
    ndims: [usize; 3],
    /// 每个网格盒的 z 边界
    bounds3: Vec<(f64, f64)>,
    /// 每个网格盒的 x 边界
    bounds1: Vec<(f64, f64)>,
    /// 每个网格盒的 y 边界
    bounds2: Vec<(f64, f64)>,
    /// 水平方向是否为周期边界
    periodic_horizontal: bool,
}

impl CartesianMaps {
    /// 由逐网格盒边界向量构造映射
    pub fn new(
        ndims: [usize; 3],
        bounds3: Vec<(f64, f64)>,
        bounds1: Vec<(f64, f64)>,
        bounds2: Vec<(f64, f64)>,
        periodic_horizontal: bool,
    ) -> CleoResult<Self> {
        let ngbxs = ndims[0] * ndims[1] * ndims[2];
        if ngbxs == 0 {
            return Err(CleoError::invalid_input("网格盒总数不能为零"));
        }
        CleoError::check_size("bounds3", ngbxs, bounds3.len())?;
        CleoError::check_size("bounds1", ngbxs, bounds1.len())?;
        CleoError::check_size("bounds2", ngbxs, bounds2.len())?;

        for bounds in [&bounds3, &bounds1, &bounds2] {
            for &(lower, upper) in bounds.iter() {
                if !(lower < upper) {
                    return Err(CleoError::invalid_input(format!(
                        "网格盒边界必须满足 lower < upper, 实际 ({}, {})",
                        lower, upper
                    )));
                }
            }
        }

        Ok(Self {
            ndims,
            bounds3,
            bounds1,
            bounds2,
            periodic_horizontal,
        })
    }

    /// 构造等距网格
    ///
    /// `zlims`/`xlims`/`ylims` 为整个域在各轴上的 (min, max)。
    pub fn uniform(
        ndims: [usize; 3],
        zlims: (f64, f64),
        xlims: (f64, f64),
        ylims: (f64, f64),
        periodic_horizontal: bool,
    ) -> CleoResult<Self> {
        let (n3, n1, n2) = (ndims[0], ndims[1], ndims[2]);
        let ngbxs = n3 * n1 * n2;
        if ngbxs == 0 {
            return Err(CleoError::invalid_input("网格盒总数不能为零"));
        }

        let dz = (zlims.1 - zlims.0) / n3 as f64;
        let dx = (xlims.1 - xlims.0) / n1 as f64;
        let dy = (ylims.1 - ylims.0) / n2 as f64;

        let mut bounds3 = Vec::with_capacity(ngbxs);
        let mut bounds1 = Vec::with_capacity(ngbxs);
        let mut bounds2 = Vec::with_capacity(ngbxs);
        for idx in 0..ngbxs {
            let k3 = idx % n3;
            let k1 = (idx / n3) % n1;
            let k2 = idx / (n3 * n1);
            bounds3.push((zlims.0 + k3 as f64 * dz, zlims.0 + (k3 + 1) as f64 * dz));
            bounds1.push((xlims.0 + k1 as f64 * dx, xlims.0 + (k1 + 1) as f64 * dx));
            bounds2.push((ylims.0 + k2 as f64 * dy, ylims.0 + (k2 + 1) as f64 * dy));
        }

        Self::new(ndims, bounds3, bounds1, bounds2, periodic_horizontal)
    }

    /// 各方向网格盒数 (n3, n1, n2)
    #[inline]
    pub fn ndims(&self) -> [usize; 3] {
        self.ndims
    }

    /// 网格盒总数
    #[inline]
    pub fn ngbxs(&self) -> usize {
        self.ndims[0] * self.ndims[1] * self.ndims[2]
    }

    /// 水平方向是否周期
    #[inline]
    pub fn periodic_horizontal(&self) -> bool {
        self.periodic_horizontal
    }

    fn stride_ndim(&self, axis: Axis) -> (u32, u32) {
        let (n3, n1, n2) = (
            self.ndims[0] as u32,
            self.ndims[1] as u32,
            self.ndims[2] as u32,
        );
        match axis {
            Axis::Coord3 => (1, n3),
            Axis::Coord1 => (n3, n1),
            Axis::Coord2 => (n3 * n1, n2),
        }
    }

    /// 网格盒在轴 `axis` 上的 (lower, upper) 边界
    pub fn bounds(&self, axis: Axis, idx: GbxIndex) -> (f64, f64) {
        let i = idx.as_usize();
        match axis {
            Axis::Coord3 => self.bounds3[i],
            Axis::Coord1 => self.bounds1[i],
            Axis::Coord2 => self.bounds2[i],
        }
    }

    /// z 边界
    #[inline]
    pub fn coord3bounds(&self, idx: GbxIndex) -> (f64, f64) {
        self.bounds(Axis::Coord3, idx)
    }

    /// x 边界
    #[inline]
    pub fn coord1bounds(&self, idx: GbxIndex) -> (f64, f64) {
        self.bounds(Axis::Coord1, idx)
    }

    /// y 边界
    #[inline]
    pub fn coord2bounds(&self, idx: GbxIndex) -> (f64, f64) {
        self.bounds(Axis::Coord2, idx)
    }

    /// 索引是否位于轴向下边缘
    pub fn at_lower_edge(&self, axis: Axis, idx: GbxIndex) -> bool {
        let (stride, ndim) = self.stride_ndim(axis);
        (idx.get() / stride) % ndim == 0
    }

    /// 索引是否位于轴向上边缘
    pub fn at_upper_edge(&self, axis: Axis, idx: GbxIndex) -> bool {
        let (stride, ndim) = self.stride_ndim(axis);
        (idx.get() / stride + 1) % ndim == 0
    }

    fn is_periodic(&self, axis: Axis) -> bool {
        match axis {
            Axis::Coord3 => false, // z 方向恒为有限域
            Axis::Coord1 | Axis::Coord2 => self.periodic_horizontal,
        }
    }

    /// 后向（坐标减小方向）邻居索引，跨出有限域时返回域外哨兵
    pub fn backward(&self, axis: Axis, idx: GbxIndex) -> GbxIndex {
        let (stride, ndim) = self.stride_ndim(axis);
        if self.at_lower_edge(axis, idx) {
            if self.is_periodic(axis) {
                GbxIndex::new(idx.get() + (ndim - 1) * stride)
            } else {
                GbxIndex::OUT_OF_DOMAIN
            }
        } else {
            GbxIndex::new(idx.get() - stride)
        }
    }

    /// 前向（坐标增大方向）邻居索引，跨出有限域时返回域外哨兵
    pub fn forward(&self, axis: Axis, idx: GbxIndex) -> GbxIndex {
        let (stride, ndim) = self.stride_ndim(axis);
        if self.at_upper_edge(axis, idx) {
            if self.is_periodic(axis) {
                GbxIndex::new(idx.get() - (ndim - 1) * stride)
            } else {
                GbxIndex::OUT_OF_DOMAIN
            }
        } else {
            GbxIndex::new(idx.get() + stride)
        }
    }

    /// 网格盒体积（无量纲, COORD0³）
    pub fn gbxvolume(&self, idx: GbxIndex) -> f64 {
        let i = idx.as_usize();
        let (z0, z1) = self.bounds3[i];
        let (x0, x1) = self.bounds1[i];
        let (y0, y1) = self.bounds2[i];
        (z1 - z0) * (x1 - x0) * (y1 - y0)
    }

    /// 网格盒水平面积（无量纲, COORD0²）
    pub fn gbxarea(&self, idx: GbxIndex) -> f64 {
        let i = idx.as_usize();
        let (x0, x1) = self.bounds1[i];
        let (y0, y1) = self.bounds2[i];
        (x1 - x0) * (y1 - y0)
    }

    /// 坐标是否落在网格盒 `idx` 轴向边界内（下界含、上界不含）
    pub fn contains(&self, axis: Axis, idx: GbxIndex, coord: f64) -> bool {
        let (lower, upper) = self.bounds(axis, idx);
        lower <= coord && coord < upper
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn maps222() -> CartesianMaps {
        CartesianMaps::uniform(
            [2, 2, 2],
            (0.0, 2.0),
            (0.0, 2.0),
            (0.0, 2.0),
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_uniform_bounds() {
        let maps = maps222();
        assert_eq!(maps.ngbxs(), 8);

        // idx = k3 + n3*(k1 + n1*k2); idx=0 → 原点角落
        let b3 = maps.coord3bounds(GbxIndex::new(0));
        assert!((b3.0 - 0.0).abs() < 1e-12 && (b3.1 - 1.0).abs() < 1e-12);

        // idx=1 → k3=1
        let b3 = maps.coord3bounds(GbxIndex::new(1));
        assert!((b3.0 - 1.0).abs() < 1e-12 && (b3.1 - 2.0).abs() < 1e-12);

        // idx=2 → k1=1
        let b1 = maps.coord1bounds(GbxIndex::new(2));
        assert!((b1.0 - 1.0).abs() < 1e-12);

        // idx=4 → k2=1
        let b2 = maps.coord2bounds(GbxIndex::new(4));
        assert!((b2.0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_edge_predicates() {
        let maps = maps222();
        let idx0 = GbxIndex::new(0);
        assert!(maps.at_lower_edge(Axis::Coord3, idx0));
        assert!(!maps.at_upper_edge(Axis::Coord3, idx0));

        let idx1 = GbxIndex::new(1);
        assert!(!maps.at_lower_edge(Axis::Coord3, idx1));
        assert!(maps.at_upper_edge(Axis::Coord3, idx1));
    }

    #[test]
    fn test_finite_z_neighbours() {
        let maps = maps222();
        // z 下边缘无后向邻居
        assert!(maps.backward(Axis::Coord3, GbxIndex::new(0)).is_out_of_domain());
        // z 上边缘无前向邻居
        assert!(maps.forward(Axis::Coord3, GbxIndex::new(1)).is_out_of_domain());
        // 域内正常步进
        assert_eq!(maps.forward(Axis::Coord3, GbxIndex::new(0)), GbxIndex::new(1));
        assert_eq!(maps.backward(Axis::Coord3, GbxIndex::new(1)), GbxIndex::new(0));
    }

    #[test]
    fn test_periodic_horizontal_neighbours() {
        let maps = maps222();
        // x 方向周期回绕: stride1 = n3 = 2
        assert_eq!(maps.backward(Axis::Coord1, GbxIndex::new(0)), GbxIndex::new(2));
        assert_eq!(maps.forward(Axis::Coord1, GbxIndex::new(2)), GbxIndex::new(0));
        // y 方向周期回绕: stride2 = n3*n1 = 4
        assert_eq!(maps.backward(Axis::Coord2, GbxIndex::new(1)), GbxIndex::new(5));
        assert_eq!(maps.forward(Axis::Coord2, GbxIndex::new(5)), GbxIndex::new(1));
    }

    #[test]
    fn test_finite_horizontal_when_disabled() {
        let maps = CartesianMaps::uniform(
            [1, 2, 1],
            (0.0, 1.0),
            (0.0, 2.0),
            (0.0, 1.0),
            false,
        )
        .unwrap();
        assert!(maps.backward(Axis::Coord1, GbxIndex::new(0)).is_out_of_domain());
        assert!(maps.forward(Axis::Coord1, GbxIndex::new(1)).is_out_of_domain());
    }

    #[test]
    fn test_volume_and_area() {
        let maps = CartesianMaps::uniform(
            [2, 1, 1],
            (0.0, 1.0),
            (0.0, 3.0),
            (0.0, 4.0),
            true,
        )
        .unwrap();
        let idx = GbxIndex::new(0);
        assert!((maps.gbxvolume(idx) - 0.5 * 3.0 * 4.0).abs() < 1e-12);
        assert!((maps.gbxarea(idx) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_contains_half_open() {
        let maps = maps222();
        let idx = GbxIndex::new(0);
        assert!(maps.contains(Axis::Coord3, idx, 0.0));
        assert!(maps.contains(Axis::Coord3, idx, 0.999));
        assert!(!maps.contains(Axis::Coord3, idx, 1.0));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let err = CartesianMaps::new(
            [2, 1, 1],
            vec![(0.0, 1.0)],
            vec![(0.0, 1.0); 2],
            vec![(0.0, 1.0); 2],
            true,
        );
        assert!(err.is_err());
    }
}

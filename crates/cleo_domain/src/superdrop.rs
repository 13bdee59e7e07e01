// crates/cleo_domain/src/superdrop.rs

//! 超级液滴
//!
//! 一个超级液滴以倍率 ξ 代表 ξ 个完全相同的真实液滴。
//! 其属性分为不可变身份（64 位单调 [`SdId`]）与可变属性：
//! 倍率 ξ、湿半径 r（以 R0 为单位）、溶解溶质质量 m_sol、
//! 三维空间坐标（coord3 = 垂直）以及所属网格盒索引。
//!
//! 所有液滴共享同一份不可变的 [`SoluteProperties`]
//! （通过 `Arc` 持有，无逐液滴堆分配）。
//!
//! 引用的公式编号 [X.YY] 出自 Lohmann, Luond & Mahrt,
//! "An Introduction To Clouds From The Microscale to Climate" 第一版。

use std::f64::consts::PI;
use std::sync::Arc;

use glam::DVec3;

use cleo_foundation::constants::dimless as dlc;
use cleo_foundation::{CleoError, CleoResult, GbxIndex, SdId};

// ============================================================================
// 溶质属性
// ============================================================================

/// 液滴内溶质的共享不可变属性（全部无量纲）
#[derive(Debug, Clone, PartialEq)]
pub struct SoluteProperties {
    /// 液态水密度
    pub rho_l: f64,
    /// 溶质密度
    pub rho_sol: f64,
    /// 溶质摩尔质量
    pub mrsol: f64,
    /// 离解度（范特霍夫因子）
    pub ionic: f64,
}

impl Default for SoluteProperties {
    fn default() -> Self {
        Self {
            rho_l: dlc::RHO_L,
            rho_sol: dlc::RHO_SOL,
            mrsol: dlc::MR_SOL,
            ionic: dlc::IONIC,
        }
    }
}

// ============================================================================
// 超级液滴
// ============================================================================

/// 超级液滴
///
/// 坐标存于 [`DVec3`]，映射约定：`x` ↔ coord1，`y` ↔ coord2，
/// `z` ↔ coord3（垂直方向）。坐标以 COORD0 无量纲化。
#[derive(Debug, Clone)]
pub struct Superdrop {
    /// 倍率 ξ（存活时 ≥ 1；ξ = 0 标记待移除）
    pub xi: u64,
    /// 湿半径（以 R0 为单位，恒正）
    pub radius: f64,
    /// 溶解的溶质质量（非负，无量纲）
    pub msol: f64,
    /// 空间坐标 (coord1, coord2, coord3)
    pub coords: DVec3,
    /// 所属网格盒索引（域外哨兵值表示已离开域）
    gbxindex: GbxIndex,
    /// 不可变身份
    id: SdId,
    /// 共享溶质属性
    solute: Arc<SoluteProperties>,
}

impl Superdrop {
    /// 构造超级液滴
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: SdId,
        gbxindex: GbxIndex,
        xi: u64,
        radius: f64,
        msol: f64,
        coord3: f64,
        coord1: f64,
        coord2: f64,
        solute: Arc<SoluteProperties>,
    ) -> Self {
        Self {
            xi,
            radius,
            msol,
            coords: DVec3::new(coord1, coord2, coord3),
            gbxindex,
            id,
            solute,
        }
    }

    /// 液滴身份
    #[inline]
    pub fn id(&self) -> SdId {
        self.id
    }

    /// 所属网格盒索引
    #[inline]
    pub fn gbxindex(&self) -> GbxIndex {
        self.gbxindex
    }

    /// 更新所属网格盒索引（由运动/重新归箱调用）
    #[inline]
    pub fn set_gbxindex(&mut self, idx: GbxIndex) {
        self.gbxindex = idx;
    }

    /// 垂直坐标 coord3
    #[inline]
    pub fn coord3(&self) -> f64 {
        self.coords.z
    }

    /// 水平坐标 coord1
    #[inline]
    pub fn coord1(&self) -> f64 {
        self.coords.x
    }

    /// 水平坐标 coord2
    #[inline]
    pub fn coord2(&self) -> f64 {
        self.coords.y
    }

    /// ξ = 0 的液滴已被并合吞并，等待压实移除
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.xi == 0
    }

    /// 溶质属性
    #[inline]
    pub fn solute(&self) -> &SoluteProperties {
        &self.solute
    }

    /// 球形液滴体积（由半径计算）
    #[inline]
    pub fn vol(&self) -> f64 {
        4.0 / 3.0 * PI * self.radius.powi(3)
    }

    /// 半径立方（并合的守恒量 Σ ξ·r³ 的单滴贡献）
    #[inline]
    pub fn rcubed(&self) -> f64 {
        self.radius.powi(3)
    }

    /// 干半径：液滴完全由溶质构成时的半径
    #[inline]
    pub fn dry_radius(&self) -> f64 {
        (3.0 * self.msol / (4.0 * PI * self.solute.rho_sol)).cbrt()
    }

    /// 液滴总质量（水 + 溶质，无量纲）
    pub fn mass(&self) -> f64 {
        let sol = self.msol * (1.0 - self.solute.rho_l / self.solute.rho_sol);
        4.0 / 3.0 * PI * self.solute.rho_l * self.radius.powi(3) + sol
    }

    /// 拉乌尔因子中的 a 值（溶质对径向增长的影响，eqn [6.24] 无量纲版）
    #[inline]
    pub fn akohler_factor(&self, temp: f64) -> f64 {
        const AKOH: f64 = 3.3e-7 / (dlc::TEMP0 * dlc::R0);
        AKOH / temp
    }

    /// 开尔文因子中的 b 值（曲率对径向增长的影响，eqn [6.22] 无量纲版）
    #[inline]
    pub fn bkohler_factor(&self) -> f64 {
        const BKOH: f64 = 4.3e-6 * dlc::RHO0 / dlc::MR0;
        BKOH * self.msol * self.solute.ionic / self.solute.mrsol
    }

    /// 更新半径至 `newradius`（但不小于干半径），返回半径变化量
    ///
    /// 液滴蒸发收缩到干半径后不再缩小。
    pub fn change_radius(&mut self, newradius: f64) -> f64 {
        let oldradius = self.radius;
        self.radius = self.dry_radius().max(newradius);
        self.radius - oldradius
    }

    /// 给定过饱和比求平衡湿半径
    ///
    /// 对三次多项式 (S−1)z³ − a·z² + b（eqn [7.28] 的平衡条件）
    /// 执行 Newton–Raphson 迭代。超出 `maxiters` 次仍未收敛时报错。
    pub fn equilibrium_wetradius(
        &self,
        s_ratio: f64,
        temp: f64,
        maxiters: usize,
    ) -> CleoResult<f64> {
        const RTOL: f64 = 1e-8;
        const ATOL: f64 = 1e-8;

        let akoh = self.akohler_factor(temp);
        let bkoh = self.bkohler_factor();
        let polynomial =
            |z: f64| (s_ratio - 1.0) * z.powi(3) - akoh * z.powi(2) + bkoh;

        let mut ziter = self.radius;
        let mut ode = polynomial(ziter);
        for _ in 0..maxiters {
            let deriv = 3.0 * (s_ratio - 1.0) * ziter.powi(2) - 2.0 * akoh * ziter;
            ziter -= ode / deriv;

            let new_ode = polynomial(ziter);
            // 标准局部误差判据: |迭代差| < RTOL·|值| + ATOL
            if (new_ode - ode).abs() < RTOL * new_ode.abs() + ATOL {
                return Ok(ziter);
            }
            ode = new_ode;
        }

        Err(CleoError::invalid_input(format!(
            "平衡湿半径的 Newton-Raphson 迭代在 {} 次内未收敛 ({})",
            maxiters, self.id
        )))
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_with(xi: u64, radius: f64, msol: f64) -> Superdrop {
        Superdrop::new(
            SdId::default(),
            GbxIndex::new(0),
            xi,
            radius,
            msol,
            0.5,
            0.0,
            0.0,
            Arc::new(SoluteProperties::default()),
        )
    }

    #[test]
    fn test_volume_of_unit_radius() {
        let drop = drop_with(1, 1.0, 0.0);
        assert!((drop.vol() - 4.0 / 3.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_dry_radius_zero_solute() {
        let drop = drop_with(1, 1.0, 0.0);
        assert!(drop.dry_radius().abs() < 1e-12);
    }

    #[test]
    fn test_change_radius_clamps_at_dry_radius() {
        let mut drop = drop_with(1, 1.0, 1e-3);
        let rdry = drop.dry_radius();
        assert!(rdry > 0.0);

        // 试图收缩到干半径以下
        let delta = drop.change_radius(rdry / 10.0);
        assert!((drop.radius - rdry).abs() < 1e-15);
        assert!(delta < 0.0);
    }

    #[test]
    fn test_change_radius_growth() {
        let mut drop = drop_with(1, 1.0, 0.0);
        let delta = drop.change_radius(2.0);
        assert!((delta - 1.0).abs() < 1e-12);
        assert!((drop.radius - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_mass_positive_and_grows_with_radius() {
        let small = drop_with(1, 10.0, 1e-4);
        let big = drop_with(1, 20.0, 1e-4);
        assert!(small.mass() > 0.0);
        assert!(big.mass() > small.mass());
    }

    #[test]
    fn test_kohler_factors_positive() {
        let drop = drop_with(1, 1.0, 1e-3);
        assert!(drop.akohler_factor(1.0) > 0.0);
        assert!(drop.bkohler_factor() > 0.0);
    }

    #[test]
    fn test_equilibrium_wetradius_subsaturated() {
        // 次饱和下平衡湿半径存在且为正
        let drop = drop_with(1, 1.0, 1e-3);
        let r = drop.equilibrium_wetradius(0.95, 1.0, 100).unwrap();
        assert!(r > 0.0);
    }

    #[test]
    fn test_dead_flag() {
        let mut drop = drop_with(1, 1.0, 0.0);
        assert!(!drop.is_dead());
        drop.xi = 0;
        assert!(drop.is_dead());
    }

    #[test]
    fn test_coord_mapping() {
        let drop = Superdrop::new(
            SdId::default(),
            GbxIndex::new(0),
            1,
            1.0,
            0.0,
            3.0, // coord3
            1.0, // coord1
            2.0, // coord2
            Arc::new(SoluteProperties::default()),
        );
        assert!((drop.coord3() - 3.0).abs() < 1e-15);
        assert!((drop.coord1() - 1.0).abs() < 1e-15);
        assert!((drop.coord2() - 2.0).abs() < 1e-15);
    }
}

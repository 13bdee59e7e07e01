// crates/cleo_physics/src/collisions/kernels.rs

//! 碰撞相互作用核
//!
//! 每个核给出一对真实液滴单位时间单位体积的碰撞率系数
//! K(A,B)，换算成 Shima 2009 式 3 的概率
//! `prob_jk = K(A,B)·Δt/V`：
//!
//! - [`GolovinProb`]: Golovin 1963 体积和核
//! - [`HydrodynamicProb`]: 几何截面 × 效率 × 末速差的
//!   流体动力（重力）核，效率因子可插拔
//! - [`LongKernelEff`]: Long 核的碰撞效率（Simmel et al. 2002 式 12/13）
//! - [`LowListCoalEff`]/[`LowListBreakupEff`]: 由碰撞动能与表面能
//!   导出的 Low & List 1982 并合效率及 McFarquhar 2004 破碎效率

use std::f64::consts::PI;

use cleo_domain::Superdrop;
use cleo_foundation::constants::{dimless as dlc, dimmed as dc};

use crate::collisions::PairProbability;
use crate::terminalvelocity::{SimmelTerminalVelocity, TerminalVelocity};

// ============================================================================
// Golovin 核
// ============================================================================

/// Golovin 1963（体积和）并合核
#[derive(Debug, Clone, Copy)]
pub struct GolovinProb {
    prob_const: f64,
}

impl GolovinProb {
    /// 创建 Golovin 核，`K = 1.5e3·R0³·(V_A + V_B)`
    pub fn new() -> Self {
        Self {
            prob_const: 1.5e3 * dlc::R0.powi(3),
        }
    }
}

impl Default for GolovinProb {
    fn default() -> Self {
        Self::new()
    }
}

impl PairProbability for GolovinProb {
    fn prob(&self, d1: &Superdrop, d2: &Superdrop, delt: f64, volume: f64) -> f64 {
        let golovins_kernel = self.prob_const * (d1.vol() + d2.vol());
        golovins_kernel * delt / volume
    }
}

// ============================================================================
// 流体动力核
// ============================================================================

/// 核效率因子（碰撞效率 × 并合/破碎效率）
pub trait KernelEfficiency: Send + Sync {
    /// 一对液滴的效率因子
    fn efficiency(&self, d1: &Superdrop, d2: &Superdrop) -> f64;
}

/// 流体动力（重力）碰撞核
///
/// `K = π·R0²·W0·(r_A + r_B)²·eff(A,B)·|v_t(A) − v_t(B)|`
/// （Simmel et al. 2002 式 11 的形式）。
#[derive(Debug, Clone, Copy)]
pub struct HydrodynamicProb<E, TV> {
    prob_const: f64,
    eff: E,
    terminalv: TV,
}

impl<E, TV> HydrodynamicProb<E, TV>
where
    E: KernelEfficiency,
    TV: TerminalVelocity,
{
    /// 由效率因子与末速公式组装流体动力核
    pub fn new(eff: E, terminalv: TV) -> Self {
        Self {
            prob_const: PI * dlc::R0.powi(2) * dlc::W0,
            eff,
            terminalv,
        }
    }
}

impl<E, TV> PairProbability for HydrodynamicProb<E, TV>
where
    E: KernelEfficiency,
    TV: TerminalVelocity,
{
    fn prob(&self, d1: &Superdrop, d2: &Superdrop, delt: f64, volume: f64) -> f64 {
        let sumrsqrd = (d1.radius + d2.radius).powi(2);
        let vdiff =
            (self.terminalv.terminal_velocity(d1) - self.terminalv.terminal_velocity(d2)).abs();
        let hydro_kernel = self.prob_const * sumrsqrd * self.eff.efficiency(d1, d2) * vdiff;

        hydro_kernel * delt / volume
    }
}

// ============================================================================
// Long 碰撞效率
// ============================================================================

/// Long 流体动力核的碰撞-并合效率（Simmel et al. 2002 式 12/13）
///
/// `colleff = 1`（较大滴半径 ≥ 50 μm/R0 时），否则
/// `colleff = max(A1·big²·(1 − A2/small), 0.001)`；
/// 通常假定 `coaleff = 1`，即 eff = colleff。
#[derive(Debug, Clone, Copy)]
pub struct LongKernelEff {
    /// 并合效率因子（默认 1）
    pub coaleff: f64,
}

impl Default for LongKernelEff {
    fn default() -> Self {
        Self { coaleff: 1.0 }
    }
}

impl KernelEfficiency for LongKernelEff {
    fn efficiency(&self, d1: &Superdrop, d2: &Superdrop) -> f64 {
        const RLIM: f64 = 5e-5 / dlc::R0; // 50 μm 阈值
        const COLLEFF_LIM: f64 = 0.001; // 效率下限
        const A1: f64 = 4.5e4 * dlc::R0 * dlc::R0;
        const A2: f64 = 3e-4 / dlc::R0;

        let (small, big) = if d1.radius < d2.radius {
            (d1.radius, d2.radius)
        } else {
            (d2.radius, d1.radius)
        };

        let colleff = if big < RLIM {
            (A1 * big.powi(2) * (1.0 - A2 / small)).max(COLLEFF_LIM)
        } else {
            1.0
        };

        colleff * self.coaleff
    }
}

// ============================================================================
// 碰撞动能与表面能 (Low & List 1982)
// ============================================================================

/// 一对液滴碰撞的动能与表面能计算
#[derive(Debug, Clone, Copy)]
pub struct CollisionKinetics<TV> {
    terminalv: TV,
    /// 表面张力能常数（σ = 7.28e-2 J/m²）
    surfconst: f64,
}

impl<TV: TerminalVelocity> CollisionKinetics<TV> {
    /// 创建计算器
    pub fn new(terminalv: TV) -> Self {
        Self {
            terminalv,
            surfconst: 4.0 * 7.28e-2 * PI * dlc::R0 * dlc::R0,
        }
    }

    /// 碰撞动能 cke/π（Low & List 1982(a) 式 3.1）[J]
    pub fn collision_kinetic_energy(&self, d1: &Superdrop, d2: &Superdrop) -> f64 {
        let ckeconst =
            dlc::R0.powi(3) * 2.0 / 3.0 * dc::RHO_L * PI * dlc::W0 * dlc::W0;

        let r1_r2 = d1.radius / d2.radius;
        let rratio = d1.radius.powi(3) / (1.0 + r1_r2.powi(3));

        let vdiff =
            self.terminalv.terminal_velocity(d1) - self.terminalv.terminal_velocity(d2);

        ckeconst * rratio * vdiff * vdiff
    }

    /// 两滴表面能之和/π（Low & List 1982(a) 式 4.2）[J]
    pub fn total_surfenergy(&self, d1: &Superdrop, d2: &Superdrop) -> f64 {
        let r2sum = d1.radius * d1.radius + d2.radius * d2.radius;
        self.surfconst * r2sum
    }

    /// 并合后等效球形液滴的表面能/π（式 4.3）[J]
    pub fn coal_surfenergy(&self, d1: &Superdrop, d2: &Superdrop) -> f64 {
        let r3sum = d1.radius.powi(3) + d2.radius.powi(3);
        self.surfconst * r3sum.powf(2.0 / 3.0)
    }
}

// ============================================================================
// Low & List 并合/破碎效率
// ============================================================================

/// Low & List 1982 并合效率 × Long 碰撞效率
#[derive(Debug, Clone, Copy)]
pub struct LowListCoalEff<TV> {
    kinetics: CollisionKinetics<TV>,
    colleff: LongKernelEff,
}

impl<TV: TerminalVelocity> LowListCoalEff<TV> {
    /// 由末速公式组装
    pub fn new(terminalv: TV) -> Self {
        Self {
            kinetics: CollisionKinetics::new(terminalv),
            colleff: LongKernelEff::default(),
        }
    }

    /// Long 碰撞效率部分
    pub fn colleff(&self, d1: &Superdrop, d2: &Superdrop) -> f64 {
        self.colleff.efficiency(d1, d2)
    }

    /// 并合效率 coaleff（Low & List 1982(a) 式 4.5/4.6）
    ///
    /// 破碎效率为 `1 − coaleff`。
    pub fn coaleff(&self, d1: &Superdrop, d2: &Superdrop) -> f64 {
        const ACONST: f64 = 0.778;
        const ENERGYLIM: f64 = 5e-6; // 总能量/π 上限 [J]

        let surf_t = self.kinetics.total_surfenergy(d1, d2);
        let surf_c = self.kinetics.coal_surfenergy(d1, d2);
        let etot = surf_t - surf_c + self.kinetics.collision_kinetic_energy(d1, d2);

        if etot < ENERGYLIM {
            ACONST * Self::sizeratio_factor(d1.radius, d2.radius)
                * Self::exponential(etot, surf_c)
        } else {
            0.0
        }
    }

    /// 式 4.5 的指数项
    fn exponential(etot: f64, surf_c: f64) -> f64 {
        const BCONST: f64 = -2.62e6; // [J⁻²]
        const SIGMA: f64 = 7.28e-2; // [J/m²]
        (BCONST * SIGMA * etot * etot / surf_c).exp()
    }

    /// 式 4.5 的尺寸比因子 α⁻²，α = 1 + Ds/Dl
    fn sizeratio_factor(r1: f64, r2: f64) -> f64 {
        let (rsmall, rbig) = if r1 < r2 { (r1, r2) } else { (r2, r1) };
        let alpha = 1.0 + rsmall / rbig;
        1.0 / (alpha * alpha)
    }
}

impl<TV: TerminalVelocity> KernelEfficiency for LowListCoalEff<TV> {
    fn efficiency(&self, d1: &Superdrop, d2: &Superdrop) -> f64 {
        self.coaleff(d1, d2) * self.colleff(d1, d2)
    }
}

/// Low & List 破碎效率 × Long 碰撞效率
///
/// `bueff = 1 − coaleff`（McFarquhar 2004 式 28），再除以 100。
#[derive(Debug, Clone, Copy)]
pub struct LowListBreakupEff<TV> {
    coal: LowListCoalEff<TV>,
}

impl<TV: TerminalVelocity> LowListBreakupEff<TV> {
    /// 由末速公式组装
    pub fn new(terminalv: TV) -> Self {
        Self {
            coal: LowListCoalEff::new(terminalv),
        }
    }
}

impl<TV: TerminalVelocity> KernelEfficiency for LowListBreakupEff<TV> {
    fn efficiency(&self, d1: &Superdrop, d2: &Superdrop) -> f64 {
        let bueff = 1.0 - self.coal.coaleff(d1, d2);
        bueff * self.coal.colleff(d1, d2) / 100.0
    }
}

// ============================================================================
// 组装函数与运行期分发
// ============================================================================

/// Golovin 并合概率
pub fn golovin_prob() -> GolovinProb {
    GolovinProb::new()
}

/// Long 流体动力核并合概率（Simmel 末速）
pub fn long_hydro_prob() -> HydrodynamicProb<LongKernelEff, SimmelTerminalVelocity> {
    HydrodynamicProb::new(LongKernelEff::default(), SimmelTerminalVelocity)
}

/// Low & List 并合概率（Simmel 末速）
pub fn lowlist_coal_prob(
) -> HydrodynamicProb<LowListCoalEff<SimmelTerminalVelocity>, SimmelTerminalVelocity> {
    HydrodynamicProb::new(
        LowListCoalEff::new(SimmelTerminalVelocity),
        SimmelTerminalVelocity,
    )
}

/// Low & List 破碎概率（Simmel 末速）
pub fn lowlist_breakup_prob(
) -> HydrodynamicProb<LowListBreakupEff<SimmelTerminalVelocity>, SimmelTerminalVelocity> {
    HydrodynamicProb::new(
        LowListBreakupEff::new(SimmelTerminalVelocity),
        SimmelTerminalVelocity,
    )
}

/// 运行期选择的碰撞核（枚举分发）
#[derive(Debug, Clone, Copy)]
pub enum CollisionProb {
    /// Golovin 体积和核
    Golovin(GolovinProb),
    /// Long 流体动力核
    Long(HydrodynamicProb<LongKernelEff, SimmelTerminalVelocity>),
    /// Low & List 并合效率核
    LowListCoal(
        HydrodynamicProb<LowListCoalEff<SimmelTerminalVelocity>, SimmelTerminalVelocity>,
    ),
}

impl PairProbability for CollisionProb {
    fn prob(&self, d1: &Superdrop, d2: &Superdrop, delt: f64, volume: f64) -> f64 {
        match self {
            Self::Golovin(p) => p.prob(d1, d2, delt, volume),
            Self::Long(p) => p.prob(d1, d2, delt, volume),
            Self::LowListCoal(p) => p.prob(d1, d2, delt, volume),
        }
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cleo_domain::SoluteProperties;
    use cleo_foundation::{GbxIndex, SdId};
    use std::sync::Arc;

    fn drop_of_radius(radius: f64) -> Superdrop {
        Superdrop::new(
            SdId::default(),
            GbxIndex::new(0),
            1,
            radius,
            0.0,
            0.5,
            0.5,
            0.5,
            Arc::new(SoluteProperties::default()),
        )
    }

    #[test]
    fn test_golovin_proportional_to_volume_sum() {
        let p = golovin_prob();
        let a = drop_of_radius(10.0);
        let b = drop_of_radius(10.0);
        let big = drop_of_radius(20.0);

        let small_pair = p.prob(&a, &b, 1.0, 1.0);
        let big_pair = p.prob(&a, &big, 1.0, 1.0);
        assert!(small_pair > 0.0);
        // vol(20) = 8·vol(10) → (1+8)/2 = 4.5 倍
        assert!((big_pair / small_pair - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_golovin_scales_with_delt_over_volume() {
        let p = golovin_prob();
        let a = drop_of_radius(10.0);
        let b = drop_of_radius(20.0);
        let base = p.prob(&a, &b, 1.0, 1.0);
        assert!((p.prob(&a, &b, 2.0, 1.0) - 2.0 * base).abs() < 1e-15);
        assert!((p.prob(&a, &b, 1.0, 4.0) - base / 4.0).abs() < 1e-15);
    }

    #[test]
    fn test_hydro_prob_zero_for_identical_drops() {
        // 末速差为零 → 概率为零
        let p = long_hydro_prob();
        let a = drop_of_radius(30.0);
        let b = drop_of_radius(30.0);
        assert!(p.prob(&a, &b, 1.0, 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_long_efficiency_unity_above_50um() {
        let eff = LongKernelEff::default();
        let big = drop_of_radius(60.0); // > 50 μm/R0
        let small = drop_of_radius(10.0);
        assert!((eff.efficiency(&big, &small) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_long_efficiency_below_50um() {
        let eff = LongKernelEff::default();
        let big = drop_of_radius(30.0);
        let small = drop_of_radius(10.0);
        let e = eff.efficiency(&big, &small);
        // A1·big²·(1−A2/small) = 4.5e4·(30e-6)²·(1−300/10)... < 0 → 下限 0.001
        assert!(e >= 0.001);
        assert!(e < 1.0);
    }

    #[test]
    fn test_lowlist_coaleff_in_unit_interval() {
        let eff = LowListCoalEff::new(SimmelTerminalVelocity);
        let a = drop_of_radius(100.0);
        let b = drop_of_radius(40.0);
        let coal = eff.coaleff(&a, &b);
        assert!((0.0..=1.0).contains(&coal));
    }

    #[test]
    fn test_lowlist_breakup_complements_coalescence() {
        let coal = LowListCoalEff::new(SimmelTerminalVelocity);
        let bu = LowListBreakupEff::new(SimmelTerminalVelocity);
        let a = drop_of_radius(500.0);
        let b = drop_of_radius(300.0);

        let ce = coal.coaleff(&a, &b);
        let be = bu.efficiency(&a, &b);
        // bueff = (1−coaleff)·colleff/100
        let expect = (1.0 - ce) * coal.colleff(&a, &b) / 100.0;
        assert!((be - expect).abs() < 1e-15);
    }

    #[test]
    fn test_enum_dispatch_matches_concrete() {
        let a = drop_of_radius(30.0);
        let b = drop_of_radius(10.0);
        let concrete = long_hydro_prob().prob(&a, &b, 1.0, 1.0);
        let dispatched = CollisionProb::Long(long_hydro_prob()).prob(&a, &b, 1.0, 1.0);
        assert!((concrete - dispatched).abs() < 1e-15);
    }
}

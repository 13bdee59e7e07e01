// crates/cleo_physics/src/collisions/breakup.rs

//! 碰撞-破碎
//!
//! 采用期望碎片数模型：一次真实液滴碰撞破碎平均产生
//! `nfrags ≥ 1` 个碎片，液滴对的总水量 Σ ξ·r³ 与总溶质
//! Σ ξ·m_sol 在重新分配中守恒。γ 因子限定为 0 或 1
//! （每对每步至多一次破碎事件），与并合的 γ 规则不同。

use cleo_domain::Superdrop;

use crate::collisions::PairEnactment;
use crate::error::PhysicsResult;

/// 破碎作用
#[derive(Debug, Clone, Copy)]
pub struct Breakup {
    /// 一次真实碰撞破碎的期望碎片数（≥ 1，保证最大碎片
    /// 质量不超过两滴质量之和）
    nfrags: f64,
}

impl Breakup {
    /// 创建破碎作用；`nfrags` 下限截断为 1
    pub fn new(nfrags: f64) -> Self {
        Self {
            nfrags: nfrags.max(1.0),
        }
    }

    /// γ ∈ {0, 1}：缩放概率的小数部分做一次伯努利试验
    fn breakup_gamma(prob: f64, phi: f64) -> u64 {
        if phi < prob - prob.floor() {
            1
        } else {
            0
        }
    }

    /// 对液滴对实施破碎
    fn breakup_pair(&self, drop1: &mut Superdrop, drop2: &mut Superdrop) {
        if drop1.xi == drop2.xi {
            self.twin_breakup(drop1, drop2);
        } else {
            self.different_breakup(drop1, drop2);
        }
    }

    /// ξ1 = ξ2：破碎产生（非全同的）孪生液滴
    ///
    /// 两滴合并后的水量重新分配到 round(nfrags·ξ) 个碎片。
    fn twin_breakup(&self, drop1: &mut Superdrop, drop2: &mut Superdrop) {
        let old_xi = drop2.xi; // = drop1.xi
        let total_xi = ((self.nfrags * old_xi as f64).round() as u64).max(2);
        let new_xi = total_xi / 2;
        let sumr3 = drop1.radius.powi(3) + drop2.radius.powi(3);
        let new_r = (old_xi as f64 / total_xi as f64 * sumr3).cbrt();
        let new_msol = old_xi as f64 * (drop1.msol + drop2.msol) / total_xi as f64;

        drop1.xi = new_xi;
        drop2.xi = total_xi - new_xi;

        drop1.radius = new_r;
        drop2.radius = new_r;

        drop1.msol = new_msol;
        drop2.msol = new_msol;
    }

    /// ξ1 > ξ2：drop1 倍率减少，drop2 破碎成 round(nfrags·ξ2) 份
    fn different_breakup(&self, drop1: &mut Superdrop, drop2: &mut Superdrop) {
        drop1.xi -= drop2.xi;

        let old_xi = drop2.xi;
        let new_xi = ((self.nfrags * old_xi as f64).round() as u64).max(1);
        let sumr3 = drop1.radius.powi(3) + drop2.radius.powi(3);

        drop2.xi = new_xi;
        drop2.radius = (sumr3 * old_xi as f64 / new_xi as f64).cbrt();
        drop2.msol = old_xi as f64 * (drop1.msol + drop2.msol) / new_xi as f64;
    }
}

impl PairEnactment for Breakup {
    fn enact(
        &self,
        drop1: &mut Superdrop,
        drop2: &mut Superdrop,
        prob: f64,
        phi: f64,
    ) -> PhysicsResult<()> {
        if Self::breakup_gamma(prob, phi) == 1 {
            self.breakup_pair(drop1, drop2);
        }
        Ok(())
    }
}

// ============================================================================
// 测试
// ============================================================================

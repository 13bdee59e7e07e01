// crates/cleo_physics/src/collisions/coalescence.rs

//! 碰撞-并合
//!
//! 按 Shima et al. 2009 §5.1.3(5) 更新液滴对的倍率、半径与
//! 溶质质量。γ 因子由缩放概率的 Monte-Carlo 试验得到并截断到
//! ⌊ξ1/ξ2⌋。并合严格保持 Σ ξ·r³ 与 Σ ξ·m_sol，Σξ 不增。

use cleo_domain::Superdrop;

use crate::collisions::{monte_carlo_gamma, PairEnactment};
use crate::error::{PhysicsError, PhysicsResult};

/// 并合作用
#[derive(Debug, Clone, Copy, Default)]
pub struct Coalescence;

impl Coalescence {
    /// 对液滴对实施 γ 次并合
    fn coalesce_pair(
        &self,
        drop1: &mut Superdrop,
        drop2: &mut Superdrop,
        gamma: u64,
    ) -> PhysicsResult<()> {
        let xi1 = drop1.xi;
        let xi2 = drop2.xi;

        if xi1 == gamma * xi2 {
            Self::twin_coalescence(drop1, drop2, gamma);
            Ok(())
        } else if xi1 > gamma * xi2 {
            Self::different_coalescence(drop1, drop2, gamma);
            Ok(())
        } else {
            Err(PhysicsError::CollisionBookkeeping {
                message: format!(
                    "并合出现未定义分支: ξ1={} < γ·ξ2={}·{}",
                    xi1, gamma, xi2
                ),
            })
        }
    }

    /// ξ1 = γ·ξ2：并合产生等倍率孪生液滴
    /// (Shima 2009 §5.1.3(5) 选项 (b))
    ///
    /// ξ2 为奇数时余下的 1 份归 drop2；ξ2 = 1 时 drop1 的倍率
    /// 变为 0，等待压实移除。
    fn twin_coalescence(drop1: &mut Superdrop, drop2: &mut Superdrop, gamma: u64) {
        let new_xi = drop2.xi / 2;
        let new_msol = drop2.msol + gamma as f64 * drop1.msol;
        let new_rcubed = drop2.radius.powi(3) + gamma as f64 * drop1.radius.powi(3);
        let new_r = new_rcubed.cbrt();

        drop1.xi = new_xi;
        drop2.xi -= new_xi;

        drop1.radius = new_r;
        drop2.radius = new_r;

        drop1.msol = new_msol;
        drop2.msol = new_msol;
    }

    /// ξ1 > γ·ξ2：drop2 吞并 γ 份 drop1，drop1 倍率减少
    /// (Shima 2009 §5.1.3(5) 选项 (a))
    fn different_coalescence(drop1: &mut Superdrop, drop2: &mut Superdrop, gamma: u64) {
        drop1.xi -= gamma * drop2.xi;

        let new_rcubed = drop2.radius.powi(3) + gamma as f64 * drop1.radius.powi(3);
        drop2.radius = new_rcubed.cbrt();
        drop2.msol += gamma as f64 * drop1.msol;
    }
}

impl PairEnactment for Coalescence {
    fn enact(
        &self,
        drop1: &mut Superdrop,
        drop2: &mut Superdrop,
        prob: f64,
        phi: f64,
    ) -> PhysicsResult<()> {
        let gamma = monte_carlo_gamma(prob, phi, drop1.xi, drop2.xi);
        if gamma != 0 {
            self.coalesce_pair(drop1, drop2, gamma)?;
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
    use cleo_foundation::{GbxIndex, SdId};
    use std::sync::Arc;

    fn drop_with(xi: u64, radius: f64, msol: f64) -> Superdrop {
        Superdrop::new(
            SdId::default(),
            GbxIndex::new(0),
            xi,
            radius,
            msol,
            0.5,
            0.5,
            0.5,
            Arc::new(SoluteProperties::default()),
        )
    }

    fn xi_rcubed(drops: &[&Superdrop]) -> f64 {
        drops.iter().map(|d| d.xi as f64 * d.radius.powi(3)).sum()
    }

    #[test]
    fn test_unit_pair_coalescence() {
        // ξ_A = ξ_B = 1, γ = 1: 一滴死亡，幸存者 r³ = 2·r³
        let mut d1 = drop_with(1, 50.0, 1e-3);
        let mut d2 = drop_with(1, 50.0, 1e-3);

        Coalescence.enact(&mut d1, &mut d2, 1.0, 0.5).unwrap();

        assert_eq!(d1.xi, 0); // 死亡
        assert_eq!(d2.xi, 1);
        assert!((d2.radius.powi(3) - 2.0 * 50.0_f64.powi(3)).abs() < 1e-6);
        assert!((d2.msol - 2e-3).abs() < 1e-12);
    }

    #[test]
    fn test_different_multiplicity_coalescence() {
        let mut d1 = drop_with(10, 1.0, 1e-3);
        let mut d2 = drop_with(3, 2.0, 2e-3);
        let before = xi_rcubed(&[&d1, &d2]);
        let xi_before = d1.xi + d2.xi;

        // γ = 1 (prob=0.9, phi=0.1)
        Coalescence.enact(&mut d1, &mut d2, 0.9, 0.1).unwrap();

        assert_eq!(d1.xi, 7);
        assert_eq!(d2.xi, 3);
        // Σ ξ·r³ 守恒; Σξ 不增
        assert!((xi_rcubed(&[&d1, &d2]) - before).abs() < 1e-9);
        assert!(d1.xi + d2.xi <= xi_before);
    }

    #[test]
    fn test_twin_coalescence_splits_evenly() {
        // ξ1 = γ·ξ2 (γ=1): 产生等属性孪生液滴
        let mut d1 = drop_with(4, 1.0, 1e-3);
        let mut d2 = drop_with(4, 2.0, 2e-3);
        let before = xi_rcubed(&[&d1, &d2]);

        Coalescence.enact(&mut d1, &mut d2, 0.9, 0.1).unwrap();

        assert_eq!(d1.xi, 2);
        assert_eq!(d2.xi, 2);
        assert!((d1.radius - d2.radius).abs() < 1e-12);
        assert!((d1.msol - d2.msol).abs() < 1e-15);
        assert!((xi_rcubed(&[&d1, &d2]) - before).abs() < 1e-9);
    }

    #[test]
    fn test_twin_coalescence_odd_multiplicity() {
        // ξ 为奇数时 ⌊ξ/2⌋ 与 ⌈ξ/2⌉ 拆分
        let mut d1 = drop_with(5, 1.0, 0.0);
        let mut d2 = drop_with(5, 1.0, 0.0);

        Coalescence.enact(&mut d1, &mut d2, 0.9, 0.1).unwrap();

        assert_eq!(d1.xi, 2);
        assert_eq!(d2.xi, 3);
    }

    #[test]
    fn test_gamma_zero_no_change() {
        let mut d1 = drop_with(10, 1.0, 1e-3);
        let mut d2 = drop_with(3, 2.0, 2e-3);
        let r1 = d1.radius;

        // phi ≥ prob: γ = 0
        Coalescence.enact(&mut d1, &mut d2, 0.3, 0.9).unwrap();
        assert_eq!(d1.xi, 10);
        assert!((d1.radius - r1).abs() < 1e-15);
    }

    #[test]
    fn test_multi_gamma_coalescence() {
        // P = 2.0: γ = 2
        let mut d1 = drop_with(10, 1.0, 0.0);
        let mut d2 = drop_with(2, 1.0, 0.0);
        let before = xi_rcubed(&[&d1, &d2]);

        Coalescence.enact(&mut d1, &mut d2, 2.0, 0.5).unwrap();

        assert_eq!(d1.xi, 6); // 10 - 2·2
        assert!((xi_rcubed(&[&d1, &d2]) - before).abs() < 1e-9);
    }
}

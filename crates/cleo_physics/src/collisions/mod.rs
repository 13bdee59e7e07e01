// crates/cleo_physics/src/collisions/mod.rs

//! 碰撞配对过程
//!
//! Shima et al. 2009 的 Monte-Carlo 碰撞方案：每个微物理步
//! 对网格盒内液滴均匀洗牌后按相邻元素配对，对每对液滴以
//! 缩放概率
//!
//! `P = max(ξ_A, ξ_B) · scale_p · K(A,B) · Δt / V_box`
//!
//! 做一次独立试验，其中 `scale_p = n(n−1)/2 / ⌊n/2⌋` 把 N²
//! 问题压缩成 N/2 次试验。相互作用核 K 与碰撞后的作用
//! （并合或破碎）分别由 [`PairProbability`] 与 [`PairEnactment`]
//! 注入，编译期单态化组合。

pub mod breakup;
pub mod coalescence;
pub mod kernels;

use cleo_domain::{State, Superdrop};
use cleo_foundation::constants::dimless as dlc;
use cleo_foundation::timesteps::step2dimlesstime;
use cleo_foundation::GbxRng;

use crate::error::PhysicsResult;
use crate::process::MicrophysicalProcess;

/// 一对液滴的碰撞概率（Shima 2009 式 3 的 `prob_jk`）
pub trait PairProbability: Send + Sync {
    /// `prob_jk = K(d1, d2) · delt / volume`
    ///
    /// `delt` 为无量纲时间间隔，`volume` 为真实体积 [m³]。
    fn prob(&self, d1: &Superdrop, d2: &Superdrop, delt: f64, volume: f64) -> f64;
}

/// 碰撞发生后对液滴对的作用（并合、破碎）
pub trait PairEnactment: Send + Sync {
    /// 依据缩放概率 `prob` 与随机数 `phi ∈ [0,1)` 作用于液滴对
    ///
    /// 约定 `d1.xi ≥ d2.xi`。
    fn enact(&self, d1: &mut Superdrop, d2: &mut Superdrop, prob: f64, phi: f64)
        -> PhysicsResult<()>;
}

/// 碰撞微物理过程
#[derive(Debug, Clone)]
pub struct DoCollisions<P, E> {
    /// 过程时间步（模型步）
    interval: u64,
    /// 对应的无量纲时长
    delt: f64,
    /// 配对概率
    prob: P,
    /// 碰撞作用
    enact: E,
}

impl<P, E> DoCollisions<P, E>
where
    P: PairProbability,
    E: PairEnactment,
{
    /// 创建碰撞过程
    pub fn new(interval: u64, prob: P, enact: E) -> Self {
        Self {
            interval,
            delt: step2dimlesstime(interval),
            prob,
            enact,
        }
    }

    /// 在一个网格盒内执行一次碰撞事件
    fn collide_superdrops(
        &self,
        supers: &mut [Superdrop],
        volume: f64,
        rng: &mut GbxRng,
    ) -> PhysicsResult<()> {
        let nsupers = supers.len();
        if nsupers < 2 {
            return Ok(());
        }

        // 均匀洗牌以生成随机液滴对
        rng.shuffle(supers);

        let nhalf = nsupers / 2;
        let scale_p = (nsupers * (nsupers - 1)) as f64 / (2.0 * nhalf as f64);

        // 相邻配对 (0,1), (2,3), ...; 末尾落单液滴忽略
        for pair in supers.chunks_exact_mut(2) {
            let (head, tail) = pair.split_at_mut(1);
            let (drop_a, drop_b) = (&mut head[0], &mut tail[0]);

            // 令 drop1.xi ≥ drop2.xi
            let (drop1, drop2) = if drop_a.xi >= drop_b.xi {
                (drop_a, drop_b)
            } else {
                (drop_b, drop_a)
            };

            // 死液滴 (ξ=0) 等待下个运动步压实, 不再参与配对
            if drop2.xi == 0 {
                continue;
            }

            let prob_jk = self.prob.prob(drop1, drop2, self.delt, volume);
            let prob = scale_p * drop1.xi.max(drop2.xi) as f64 * prob_jk;
            let phi = rng.uniform();

            self.enact.enact(drop1, drop2, prob, phi)?;
        }

        Ok(())
    }
}

impl<P, E> MicrophysicalProcess for DoCollisions<P, E>
where
    P: PairProbability,
    E: PairEnactment,
{
    fn interval(&self) -> u64 {
        self.interval
    }

    fn run_step(
        &self,
        _t: u64,
        state: &mut State,
        supers: &mut [Superdrop],
        rng: &mut GbxRng,
    ) -> PhysicsResult<()> {
        // 碰撞发生的真实体积 [m³]
        let volume = state.volume() * dlc::COORD0.powi(3);
        self.collide_superdrops(supers, volume, rng)
    }
}

/// Monte-Carlo γ 因子（Shima 2009 §5.1.3）
///
/// P ≥ 1 时 γ = ⌊P⌋ + (φ < P−⌊P⌋)，否则 γ = (φ < P)；
/// 随后截断到 ⌊ξ1/ξ2⌋。
pub(crate) fn monte_carlo_gamma(prob: f64, phi: f64, xi1: u64, xi2: u64) -> u64 {
    let gamma = if phi < prob - prob.floor() {
        prob.floor() as u64 + 1
    } else {
        prob.floor() as u64
    };

    let maxgamma = xi1 / xi2;
    gamma.min(maxgamma)
}

// ============================================================================
// 测试
// ============================================================================

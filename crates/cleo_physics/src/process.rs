// crates/cleo_physics/src/process.rs

//! 微物理过程组合
//!
//! 每个微物理过程实现统一形状：常数时间步 `interval`、
//! `on_step(t)` 判定与逐网格盒的 `run_step` 动作。
//! 过程以幺半群方式串联：`A ⊕ B` 在任一过程到期的时间步上
//! 先跑 A 再跑 B；[`NullProcess`] 是单位元。

use cleo_domain::{State, Superdrop};
use cleo_foundation::timesteps::{next_multiple, on_multiple};
use cleo_foundation::GbxRng;

use crate::error::PhysicsResult;

/// 微物理过程
///
/// `Send + Sync` 约束允许网格盒级并行循环共享过程实例。
pub trait MicrophysicalProcess: Send + Sync {
    /// 过程的常数时间步（模型步）
    fn interval(&self) -> u64;

    /// 当前时刻是否到期
    fn on_step(&self, t: u64) -> bool {
        on_multiple(t, self.interval())
    }

    /// 下一次到期时刻
    fn next_step(&self, t: u64) -> u64 {
        next_multiple(t, self.interval())
    }

    /// 在单个网格盒上执行过程
    ///
    /// `supers` 是该网格盒当前绑定液滴的可变切片，
    /// `rng` 是该网格盒的私有随机数流。
    fn run_step(
        &self,
        t: u64,
        state: &mut State,
        supers: &mut [Superdrop],
        rng: &mut GbxRng,
    ) -> PhysicsResult<()>;
}

/// 过程串联 `A ⊕ B`
#[derive(Debug, Clone)]
pub struct CombinedProcess<A, B> {
    a: A,
    b: B,
}

impl<A, B> CombinedProcess<A, B> {
    /// 组合两个过程
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A, B> MicrophysicalProcess for CombinedProcess<A, B>
where
    A: MicrophysicalProcess,
    B: MicrophysicalProcess,
{
    fn interval(&self) -> u64 {
        gcd(self.a.interval(), self.b.interval())
    }

    fn on_step(&self, t: u64) -> bool {
        self.a.on_step(t) || self.b.on_step(t)
    }

    fn next_step(&self, t: u64) -> u64 {
        self.a.next_step(t).min(self.b.next_step(t))
    }

    fn run_step(
        &self,
        t: u64,
        state: &mut State,
        supers: &mut [Superdrop],
        rng: &mut GbxRng,
    ) -> PhysicsResult<()> {
        if self.a.on_step(t) {
            self.a.run_step(t, state, supers, rng)?;
        }
        if self.b.on_step(t) {
            self.b.run_step(t, state, supers, rng)?;
        }
        Ok(())
    }
}

/// 空过程（组合的单位元）
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProcess;

impl MicrophysicalProcess for NullProcess {
    fn interval(&self) -> u64 {
        u64::MAX
    }

    fn on_step(&self, _t: u64) -> bool {
        false
    }

    fn next_step(&self, _t: u64) -> u64 {
        u64::MAX
    }

    fn run_step(
        &self,
        _t: u64,
        _state: &mut State,
        _supers: &mut [Superdrop],
        _rng: &mut GbxRng,
    ) -> PhysicsResult<()> {
        Ok(())
    }
}

impl MicrophysicalProcess for Box<dyn MicrophysicalProcess> {
    fn interval(&self) -> u64 {
        self.as_ref().interval()
    }

    fn on_step(&self, t: u64) -> bool {
        self.as_ref().on_step(t)
    }

    fn next_step(&self, t: u64) -> u64 {
        self.as_ref().next_step(t)
    }

    fn run_step(
        &self,
        t: u64,
        state: &mut State,
        supers: &mut [Superdrop],
        rng: &mut GbxRng,
    ) -> PhysicsResult<()> {
        self.as_ref().run_step(t, state, supers, rng)
    }
}

/// 最大公约数（组合过程的基础时间步）
fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

// ============================================================================
// 测试
// ============================================================================

// crates/cleo_foundation/src/rng.rs

//! 逐网格盒确定性随机数流
//!
//! 洗牌与 Monte-Carlo 碰撞需要均匀随机数。为了在网格盒级并行下
//! 保持可复现性，每个网格盒持有独立的随机数流 [`GbxRng`]，
//! 其种子由 `(run_seed, gbxindex)` 确定性混合得到，
//! 与并行执行顺序无关。

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::index::GbxIndex;

/// 网格盒私有的均匀随机数发生器
#[derive(Debug)]
pub struct GbxRng {
    rng: StdRng,
}

impl GbxRng {
    /// 由运行种子与网格盒索引确定性地派生随机数流
    pub fn new(run_seed: u64, gbxindex: GbxIndex) -> Self {
        let seed = splitmix64(run_seed ^ (gbxindex.get() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// 均匀随机数 phi ∈ [0, 1)
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Fisher–Yates 均匀洗牌
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.rng);
    }
}

/// SplitMix64 种子混合
///
/// 保证相邻 gbxindex 派生出的种子互不相关。
#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

// crates/cleo_domain/src/arena.rs

//! 超级液滴 Arena
//!
//! 所有超级液滴存放于单个连续容器。每次运动步结束后按
//! 网格盒索引排序（域外哨兵桶落在末尾），逐网格盒访问通过
//! 一次线性扫描得到的 `[begin, end)` 偏移实现；死液滴 (ξ=0)
//! 的压实在同一排序过程中完成。
//!
//! # 不变量
//!
//! - Arena 构成划分：遍历所有网格盒切片恰好访问每个域内液滴一次
//! - `supers_in(i)` 返回的视图在下一次改变 Arena 的运动/微物理步
//!   之前保持稳定

use cleo_foundation::{CleoError, CleoResult, GbxIndex};

use crate::superdrop::Superdrop;

/// 超级液滴 Arena（含逐网格盒分区）
#[derive(Debug)]
pub struct SuperdropArena {
    /// 液滴存储，按网格盒索引升序排列（域外在尾部）
    drops: Vec<Superdrop>,
    /// 每个网格盒的 `[begin, end)` 偏移
    refs: Vec<(usize, usize)>,
    /// 域内液滴数（`drops[..n_in_domain]` 均有有效网格盒索引）
    n_in_domain: usize,
    /// 历史累计被压实移除的死液滴数
    n_removed: u64,
}

impl SuperdropArena {
    /// 由液滴向量构造 Arena 并完成首次排序/分区
    pub fn new(drops: Vec<Superdrop>, ngbxs: usize) -> CleoResult<Self> {
        let mut arena = Self {
            drops,
            refs: vec![(0, 0); ngbxs],
            n_in_domain: 0,
            n_removed: 0,
        };
        arena.sort_and_partition()?;
        Ok(arena)
    }

    /// 网格盒数量
    #[inline]
    pub fn ngbxs(&self) -> usize {
        self.refs.len()
    }

    /// Arena 内液滴总数（含域外液滴，不含已移除）
    #[inline]
    pub fn len(&self) -> usize {
        self.drops.len()
    }

    /// Arena 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    /// 域内液滴数
    #[inline]
    pub fn n_in_domain(&self) -> usize {
        self.n_in_domain
    }

    /// 域外液滴数
    #[inline]
    pub fn n_out_of_domain(&self) -> usize {
        self.drops.len() - self.n_in_domain
    }

    /// 历史累计移除的死液滴数
    #[inline]
    pub fn n_removed(&self) -> u64 {
        self.n_removed
    }

    /// 排序 + 压实 + 重建分区
    ///
    /// 1. 移除 ξ=0 的死液滴（并合吞并产物）
    /// 2. 按网格盒索引升序排序（域外哨兵值最大，自然沉底）
    /// 3. 线性扫描重建每个网格盒的 `[begin, end)` 偏移
    ///
    /// 在运动步结束后调用，为下一次微物理步建立 happens-before 边。
    pub fn sort_and_partition(&mut self) -> CleoResult<()> {
        let before = self.drops.len();
        self.drops.retain(|d| !d.is_dead());
        self.n_removed += (before - self.drops.len()) as u64;

        self.drops
            .sort_unstable_by_key(|d| d.gbxindex().get());

        let ngbxs = self.refs.len();
        for r in self.refs.iter_mut() {
            *r = (0, 0);
        }

        let mut pos = 0;
        while pos < self.drops.len() {
            let idx = self.drops[pos].gbxindex();
            if idx.is_out_of_domain() {
                break;
            }
            let gbx = idx.as_usize();
            CleoError::check_index("gridbox", gbx, ngbxs)?;

            let begin = pos;
            while pos < self.drops.len() && self.drops[pos].gbxindex() == idx {
                pos += 1;
            }
            self.refs[gbx] = (begin, pos);
        }
        self.n_in_domain = pos;

        Ok(())
    }

    /// 网格盒 `idx` 当前绑定的存活液滴视图
    pub fn supers_in(&self, idx: GbxIndex) -> &[Superdrop] {
        let (begin, end) = self.refs[idx.as_usize()];
        &self.drops[begin..end]
    }

    /// 网格盒 `idx` 的可变液滴视图
    pub fn supers_in_mut(&mut self, idx: GbxIndex) -> &mut [Superdrop] {
        let (begin, end) = self.refs[idx.as_usize()];
        &mut self.drops[begin..end]
    }

    /// 按网格盒顺序拆出互不重叠的可变切片（用于网格盒级并行）
    ///
    /// 依赖排序后分区恰好平铺 `[0, n_in_domain)` 的事实。
    pub fn gbx_slices_mut(&mut self) -> Vec<&mut [Superdrop]> {
        let n = self.n_in_domain;
        let mut out = Vec::with_capacity(self.refs.len());
        let mut rest: &mut [Superdrop] = &mut self.drops[..n];
        for &(begin, end) in &self.refs {
            let len = end - begin;
            let (slice, tail) = std::mem::take(&mut rest).split_at_mut(len);
            out.push(slice);
            rest = tail;
        }
        debug_assert!(rest.is_empty());
        out
    }

    /// 遍历所有液滴（含域外）
    pub fn iter(&self) -> impl Iterator<Item = &Superdrop> {
        self.drops.iter()
    }

    /// 遍历域内液滴
    pub fn iter_in_domain(&self) -> impl Iterator<Item = &Superdrop> {
        self.drops[..self.n_in_domain].iter()
    }

    /// 可变遍历域内液滴
    pub fn iter_in_domain_mut(&mut self) -> impl Iterator<Item = &mut Superdrop> {
        self.drops[..self.n_in_domain].iter_mut()
    }

    /// 域内液滴的倍率总和 Σξ
    pub fn total_xi(&self) -> u64 {
        self.iter_in_domain().map(|d| d.xi).sum()
    }

    /// 域内液滴的 Σ ξ·r³（并合过程的守恒量）
    pub fn total_xi_rcubed(&self) -> f64 {
        self.iter_in_domain()
            .map(|d| d.xi as f64 * d.rcubed())
            .sum()
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::superdrop::SoluteProperties;
    use cleo_foundation::{SdIdGenerator, SdId};
    use std::sync::Arc;

    fn make_drop(
        ids: &SdIdGenerator,
        gbx: GbxIndex,
        xi: u64,
        solute: &Arc<SoluteProperties>,
    ) -> Superdrop {
        Superdrop::new(
            ids.next_id(),
            gbx,
            xi,
            1.0,
            0.0,
            0.5,
            0.5,
            0.5,
            Arc::clone(solute),
        )
    }

    fn arena_with(gbxs: &[u32], ngbxs: usize) -> SuperdropArena {
        let ids = SdIdGenerator::new();
        let solute = Arc::new(SoluteProperties::default());
        let drops = gbxs
            .iter()
            .map(|&g| {
                let idx = if g == u32::MAX {
                    GbxIndex::OUT_OF_DOMAIN
                } else {
                    GbxIndex::new(g)
                };
                make_drop(&ids, idx, 1, &solute)
            })
            .collect();
        SuperdropArena::new(drops, ngbxs).unwrap()
    }

    #[test]
    fn test_partition_visits_each_drop_once() {
        let arena = arena_with(&[2, 0, 1, 0, 2, 1, 0], 3);
        let mut visited = 0;
        for g in 0..3 {
            visited += arena.supers_in(GbxIndex::new(g)).len();
        }
        assert_eq!(visited, 7);
        assert_eq!(arena.n_in_domain(), 7);
    }

    #[test]
    fn test_slices_grouped_by_gbx() {
        let arena = arena_with(&[2, 0, 1, 0], 3);
        assert_eq!(arena.supers_in(GbxIndex::new(0)).len(), 2);
        assert_eq!(arena.supers_in(GbxIndex::new(1)).len(), 1);
        assert_eq!(arena.supers_in(GbxIndex::new(2)).len(), 1);
        for g in 0..3 {
            let idx = GbxIndex::new(g);
            for drop in arena.supers_in(idx) {
                assert_eq!(drop.gbxindex(), idx);
            }
        }
    }

    #[test]
    fn test_out_of_domain_bucket_at_end() {
        let arena = arena_with(&[1, u32::MAX, 0, u32::MAX], 2);
        assert_eq!(arena.n_in_domain(), 2);
        assert_eq!(arena.n_out_of_domain(), 2);
        // 域外液滴不出现在任何网格盒切片
        let total: usize = (0..2)
            .map(|g| arena.supers_in(GbxIndex::new(g)).len())
            .sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_dead_drops_compacted() {
        let ids = SdIdGenerator::new();
        let solute = Arc::new(SoluteProperties::default());
        let mut drops = vec![
            make_drop(&ids, GbxIndex::new(0), 5, &solute),
            make_drop(&ids, GbxIndex::new(0), 0, &solute), // 死液滴
            make_drop(&ids, GbxIndex::new(1), 3, &solute),
        ];
        drops[1].xi = 0;
        let arena = SuperdropArena::new(drops, 2).unwrap();

        assert_eq!(arena.len(), 2);
        assert_eq!(arena.n_removed(), 1);
        assert_eq!(arena.total_xi(), 8);
    }

    #[test]
    fn test_empty_gridbox_slice() {
        let arena = arena_with(&[0, 0], 3);
        assert!(arena.supers_in(GbxIndex::new(2)).is_empty());
    }

    #[test]
    fn test_gbx_slices_mut_tile_in_domain() {
        let mut arena = arena_with(&[2, 0, 1, 0, u32::MAX], 3);
        let slices = arena.gbx_slices_mut();
        assert_eq!(slices.len(), 3);
        let total: usize = slices.iter().map(|s| s.len()).sum();
        assert_eq!(total, 4);
        assert_eq!(slices[0].len(), 2);
        assert_eq!(slices[1].len(), 1);
        assert_eq!(slices[2].len(), 1);
    }

    #[test]
    fn test_resort_after_index_change() {
        let mut arena = arena_with(&[0, 0, 1], 2);
        // 模拟运动：一个液滴迁往网格盒 1
        arena.supers_in_mut(GbxIndex::new(0))[0].set_gbxindex(GbxIndex::new(1));
        arena.sort_and_partition().unwrap();

        assert_eq!(arena.supers_in(GbxIndex::new(0)).len(), 1);
        assert_eq!(arena.supers_in(GbxIndex::new(1)).len(), 2);
    }

    #[test]
    fn test_invalid_gbxindex_rejected() {
        let ids = SdIdGenerator::new();
        let solute = Arc::new(SoluteProperties::default());
        let drops = vec![make_drop(&ids, GbxIndex::new(9), 1, &solute)];
        assert!(SuperdropArena::new(drops, 2).is_err());
    }

    #[test]
    fn test_conserved_moments() {
        let ids = SdIdGenerator::new();
        let solute = Arc::new(SoluteProperties::default());
        let mut d1 = make_drop(&ids, GbxIndex::new(0), 2, &solute);
        d1.radius = 2.0;
        let d2 = make_drop(&ids, GbxIndex::new(0), 3, &solute);
        let arena = SuperdropArena::new(vec![d1, d2], 1).unwrap();

        assert_eq!(arena.total_xi(), 5);
        assert!((arena.total_xi_rcubed() - (2.0 * 8.0 + 3.0 * 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_ids_unused_in_sort_are_preserved() {
        let arena = arena_with(&[1, 0], 2);
        let ids: Vec<SdId> = arena.iter().map(|d| d.id()).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }
}

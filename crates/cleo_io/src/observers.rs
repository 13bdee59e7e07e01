// crates/cleo_io/src/observers.rs

//! 观测器管线
//!
//! 观测器实现 `before_timestepping` / `at_start_step` /
//! `after_timestepping`，多个观测器可结合律组合。
//! 写 Zarr 的观测器：
//!
//! - [`TimeObserver`]: 观测时刻坐标（1-D）
//! - [`GbxIndexObserver`]: 网格盒索引坐标（1-D，仅写一次）
//! - [`StateObserver`]: 热力学场 press/temp/qvap/qcond（2-D）
//! - [`NsupersObserver`]: 每盒超级液滴数（2-D）
//! - [`MassMomentsObserver`]: 真实液滴质量分布 0/1/2 阶矩（2-D）
//! - [`SupersAttrsObserver`]: 液滴属性锯齿状数组 + raggedcount

use log::info;

use cleo_domain::{Gridbox, SuperdropArena};
use cleo_foundation::constants::dimless as dlc;
use cleo_foundation::timesteps::{next_multiple, on_multiple, step2dimlesstime};

use crate::error::IoResult;
use crate::zarr::{Array1d, Array2d, FsStore};

/// 观测器
pub trait Observer {
    /// 当前时刻是否观测
    fn on_step(&self, t: u64) -> bool;

    /// 下一次观测时刻
    fn next_step(&self, t: u64) -> u64;

    /// 时间步进开始前调用一次
    fn before_timestepping(&mut self, gbxs: &[Gridbox]) -> IoResult<()> {
        let _ = gbxs;
        Ok(())
    }

    /// 在到期时间步开始时快照状态
    fn at_start_step(&mut self, t: u64, gbxs: &[Gridbox], arena: &SuperdropArena)
        -> IoResult<()>;

    /// 时间步进结束后收尾（冲刷残余分块等）
    fn after_timestepping(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl Observer for Box<dyn Observer> {
    fn on_step(&self, t: u64) -> bool {
        self.as_ref().on_step(t)
    }

    fn next_step(&self, t: u64) -> u64 {
        self.as_ref().next_step(t)
    }

    fn before_timestepping(&mut self, gbxs: &[Gridbox]) -> IoResult<()> {
        self.as_mut().before_timestepping(gbxs)
    }

    fn at_start_step(
        &mut self,
        t: u64,
        gbxs: &[Gridbox],
        arena: &SuperdropArena,
    ) -> IoResult<()> {
        self.as_mut().at_start_step(t, gbxs, arena)
    }

    fn after_timestepping(&mut self) -> IoResult<()> {
        self.as_mut().after_timestepping()
    }
}

/// 空观测器（组合的单位元）
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn on_step(&self, _t: u64) -> bool {
        false
    }

    fn next_step(&self, _t: u64) -> u64 {
        u64::MAX
    }

    fn at_start_step(
        &mut self,
        _t: u64,
        _gbxs: &[Gridbox],
        _arena: &SuperdropArena,
    ) -> IoResult<()> {
        Ok(())
    }
}

/// 观测器组合（结合律）
#[derive(Debug)]
pub struct CombinedObserver<A, B> {
    a: A,
    b: B,
}

impl<A, B> CombinedObserver<A, B> {
    /// 组合两个观测器
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A: Observer, B: Observer> Observer for CombinedObserver<A, B> {
    fn on_step(&self, t: u64) -> bool {
        self.a.on_step(t) || self.b.on_step(t)
    }

    fn next_step(&self, t: u64) -> u64 {
        self.a.next_step(t).min(self.b.next_step(t))
    }

    fn before_timestepping(&mut self, gbxs: &[Gridbox]) -> IoResult<()> {
        self.a.before_timestepping(gbxs)?;
        self.b.before_timestepping(gbxs)
    }

    fn at_start_step(
        &mut self,
        t: u64,
        gbxs: &[Gridbox],
        arena: &SuperdropArena,
    ) -> IoResult<()> {
        if self.a.on_step(t) {
            self.a.at_start_step(t, gbxs, arena)?;
        }
        if self.b.on_step(t) {
            self.b.at_start_step(t, gbxs, arena)?;
        }
        Ok(())
    }

    fn after_timestepping(&mut self) -> IoResult<()> {
        self.a.after_timestepping()?;
        self.b.after_timestepping()
    }
}

// ============================================================================
// 时间坐标观测器
// ============================================================================

/// 观测时刻坐标数组（无量纲时间，scale_factor = TIME0 [s]）
#[derive(Debug)]
pub struct TimeObserver {
    interval: u64,
    time: Array1d<f64>,
}

impl TimeObserver {
    /// 创建时间观测器
    pub fn new(interval: u64, store: &FsStore, maxchunk: usize) -> Self {
        Self {
            interval,
            time: Array1d::new(store.clone(), "time", maxchunk, "s", dlc::TIME0, "time"),
        }
    }
}

impl Observer for TimeObserver {
    fn on_step(&self, t: u64) -> bool {
        on_multiple(t, self.interval)
    }

    fn next_step(&self, t: u64) -> u64 {
        next_multiple(t, self.interval)
    }

    fn at_start_step(
        &mut self,
        t: u64,
        _gbxs: &[Gridbox],
        _arena: &SuperdropArena,
    ) -> IoResult<()> {
        self.time.push(step2dimlesstime(t))
    }

    fn after_timestepping(&mut self) -> IoResult<()> {
        self.time.finalise()
    }
}

// ============================================================================
// 网格盒索引坐标观测器
// ============================================================================

/// 网格盒索引坐标数组（仅在时间步进前写一次）
#[derive(Debug)]
pub struct GbxIndexObserver {
    gbxindex: Array1d<u32>,
}

impl GbxIndexObserver {
    /// 创建网格盒索引观测器
    pub fn new(store: &FsStore, maxchunk: usize) -> Self {
        Self {
            gbxindex: Array1d::new(
                store.clone(),
                "gbxindex",
                maxchunk,
                " ",
                1.0,
                "gbxindex",
            ),
        }
    }
}

impl Observer for GbxIndexObserver {
    fn on_step(&self, _t: u64) -> bool {
        false
    }

    fn next_step(&self, _t: u64) -> u64 {
        u64::MAX
    }

    fn before_timestepping(&mut self, gbxs: &[Gridbox]) -> IoResult<()> {
        for gbx in gbxs {
            self.gbxindex.push(gbx.index().get())?;
        }
        Ok(())
    }

    fn at_start_step(
        &mut self,
        _t: u64,
        _gbxs: &[Gridbox],
        _arena: &SuperdropArena,
    ) -> IoResult<()> {
        Ok(())
    }

    fn after_timestepping(&mut self) -> IoResult<()> {
        self.gbxindex.finalise()
    }
}

// ============================================================================
// 热力学状态观测器
// ============================================================================

/// 网格盒热力学场观测器（press/temp/qvap/qcond, 2-D）
#[derive(Debug)]
pub struct StateObserver {
    interval: u64,
    press: Array2d<f64>,
    temp: Array2d<f64>,
    qvap: Array2d<f64>,
    qcond: Array2d<f64>,
}

impl StateObserver {
    /// 创建状态观测器
    pub fn new(interval: u64, store: &FsStore, maxchunk: usize, ngbxs: usize) -> Self {
        let arr = |name: &str, units: &str, scale: f64| {
            Array2d::new(store.clone(), name, maxchunk, units, scale, "gbxindex", ngbxs)
        };
        Self {
            interval,
            press: arr("press", "Pa", dlc::P0),
            temp: arr("temp", "K", dlc::TEMP0),
            qvap: arr("qvap", " ", 1.0),
            qcond: arr("qcond", " ", 1.0),
        }
    }
}

impl Observer for StateObserver {
    fn on_step(&self, t: u64) -> bool {
        on_multiple(t, self.interval)
    }

    fn next_step(&self, t: u64) -> u64 {
        next_multiple(t, self.interval)
    }

    fn at_start_step(
        &mut self,
        _t: u64,
        gbxs: &[Gridbox],
        _arena: &SuperdropArena,
    ) -> IoResult<()> {
        let press: Vec<f64> = gbxs.iter().map(|g| g.state.press).collect();
        let temp: Vec<f64> = gbxs.iter().map(|g| g.state.temp).collect();
        let qvap: Vec<f64> = gbxs.iter().map(|g| g.state.qvap).collect();
        let qcond: Vec<f64> = gbxs.iter().map(|g| g.state.qcond).collect();

        self.press.push_row(&press)?;
        self.temp.push_row(&temp)?;
        self.qvap.push_row(&qvap)?;
        self.qcond.push_row(&qcond)
    }

    fn after_timestepping(&mut self) -> IoResult<()> {
        self.press.finalise()?;
        self.temp.finalise()?;
        self.qvap.finalise()?;
        self.qcond.finalise()
    }
}

// ============================================================================
// 液滴数观测器
// ============================================================================

/// 每盒超级液滴数观测器（2-D, `<u8`）
#[derive(Debug)]
pub struct NsupersObserver {
    interval: u64,
    nsupers: Array2d<u64>,
}

impl NsupersObserver {
    /// 创建液滴数观测器
    pub fn new(interval: u64, store: &FsStore, maxchunk: usize, ngbxs: usize) -> Self {
        Self {
            interval,
            nsupers: Array2d::new(
                store.clone(),
                "nsupers",
                maxchunk,
                " ",
                1.0,
                "gbxindex",
                ngbxs,
            ),
        }
    }
}

impl Observer for NsupersObserver {
    fn on_step(&self, t: u64) -> bool {
        on_multiple(t, self.interval)
    }

    fn next_step(&self, t: u64) -> u64 {
        next_multiple(t, self.interval)
    }

    fn at_start_step(
        &mut self,
        _t: u64,
        gbxs: &[Gridbox],
        arena: &SuperdropArena,
    ) -> IoResult<()> {
        let counts: Vec<u64> = gbxs
            .iter()
            .map(|g| arena.supers_in(g.index()).len() as u64)
            .collect();
        self.nsupers.push_row(&counts)
    }

    fn after_timestepping(&mut self) -> IoResult<()> {
        self.nsupers.finalise()
    }
}

// ============================================================================
// 质量矩观测器
// ============================================================================

/// 真实液滴质量分布矩观测器
///
/// 0 阶矩 Σξ（真实液滴数）、1 阶矩 Σξ·m、2 阶矩 Σξ·m²。
#[derive(Debug)]
pub struct MassMomentsObserver {
    interval: u64,
    mom0: Array2d<u64>,
    mom1: Array2d<f64>,
    mom2: Array2d<f64>,
}

impl MassMomentsObserver {
    /// 创建质量矩观测器
    pub fn new(interval: u64, store: &FsStore, maxchunk: usize, ngbxs: usize) -> Self {
        Self {
            interval,
            mom0: Array2d::new(
                store.clone(),
                "massmom0",
                maxchunk,
                " ",
                1.0,
                "gbxindex",
                ngbxs,
            ),
            mom1: Array2d::new(
                store.clone(),
                "massmom1",
                maxchunk,
                "kg",
                dlc::MASS0,
                "gbxindex",
                ngbxs,
            ),
            mom2: Array2d::new(
                store.clone(),
                "massmom2",
                maxchunk,
                "kg^2",
                dlc::MASS0 * dlc::MASS0,
                "gbxindex",
                ngbxs,
            ),
        }
    }
}

impl Observer for MassMomentsObserver {
    fn on_step(&self, t: u64) -> bool {
        on_multiple(t, self.interval)
    }

    fn next_step(&self, t: u64) -> u64 {
        next_multiple(t, self.interval)
    }

    fn at_start_step(
        &mut self,
        _t: u64,
        gbxs: &[Gridbox],
        arena: &SuperdropArena,
    ) -> IoResult<()> {
        let mut mom0 = Vec::with_capacity(gbxs.len());
        let mut mom1 = Vec::with_capacity(gbxs.len());
        let mut mom2 = Vec::with_capacity(gbxs.len());

        for gbx in gbxs {
            let mut m0: u64 = 0;
            let mut m1 = 0.0;
            let mut m2 = 0.0;
            for drop in arena.supers_in(gbx.index()) {
                let mass = drop.mass();
                m0 += drop.xi;
                m1 += drop.xi as f64 * mass;
                m2 += drop.xi as f64 * mass * mass;
            }
            mom0.push(m0);
            mom1.push(m1);
            mom2.push(m2);
        }

        self.mom0.push_row(&mom0)?;
        self.mom1.push_row(&mom1)?;
        self.mom2.push_row(&mom2)
    }

    fn after_timestepping(&mut self) -> IoResult<()> {
        self.mom0.finalise()?;
        self.mom1.finalise()?;
        self.mom2.finalise()
    }
}

// ============================================================================
// 液滴属性锯齿状观测器
// ============================================================================

/// 超级液滴属性观测器（锯齿状 1-D 数组 + raggedcount）
///
/// 每个观测事件把全部域内存活液滴的属性串接进 1-D 数组，
/// 并把写入的液滴数追加到配套的 raggedcount（`<u8`）。
#[derive(Debug)]
pub struct SupersAttrsObserver {
    interval: u64,
    sdindex: Array1d<u64>,
    sdgbxindex: Array1d<u32>,
    xi: Array1d<u64>,
    radius: Array1d<f64>,
    msol: Array1d<f64>,
    coord3: Array1d<f64>,
    coord1: Array1d<f64>,
    coord2: Array1d<f64>,
    raggedcount: Array1d<u64>,
}

impl SupersAttrsObserver {
    /// 创建液滴属性观测器
    pub fn new(interval: u64, store: &FsStore, maxchunk: usize) -> Self {
        let arr_f64 = |name: &str, units: &str, scale: f64| {
            Array1d::new(store.clone(), name, maxchunk, units, scale, "sdindex")
        };
        Self {
            interval,
            sdindex: Array1d::new(store.clone(), "sdindex", maxchunk, " ", 1.0, "sdindex"),
            sdgbxindex: Array1d::new(
                store.clone(),
                "sdgbxindex",
                maxchunk,
                " ",
                1.0,
                "sdindex",
            ),
            xi: Array1d::new(store.clone(), "xi", maxchunk, " ", 1.0, "sdindex"),
            radius: arr_f64("radius", "m", dlc::R0),
            msol: arr_f64("msol", "kg", dlc::MASS0),
            coord3: arr_f64("coord3", "m", dlc::COORD0),
            coord1: arr_f64("coord1", "m", dlc::COORD0),
            coord2: arr_f64("coord2", "m", dlc::COORD0),
            raggedcount: Array1d::new(
                store.clone(),
                "raggedcount",
                maxchunk,
                " ",
                1.0,
                "time",
            )
            .with_sample_dimension("superdroplets"),
        }
    }
}

impl Observer for SupersAttrsObserver {
    fn on_step(&self, t: u64) -> bool {
        on_multiple(t, self.interval)
    }

    fn next_step(&self, t: u64) -> u64 {
        next_multiple(t, self.interval)
    }

    fn before_timestepping(&mut self, _gbxs: &[Gridbox]) -> IoResult<()> {
        info!("观测器包含液滴属性锯齿状输出");
        Ok(())
    }

    fn at_start_step(
        &mut self,
        _t: u64,
        gbxs: &[Gridbox],
        arena: &SuperdropArena,
    ) -> IoResult<()> {
        let mut count: u64 = 0;
        for gbx in gbxs {
            for drop in arena.supers_in(gbx.index()) {
                self.sdindex.push(drop.id().get())?;
                self.sdgbxindex.push(drop.gbxindex().get())?;
                self.xi.push(drop.xi)?;
                self.radius.push(drop.radius)?;
                self.msol.push(drop.msol)?;
                self.coord3.push(drop.coord3())?;
                self.coord1.push(drop.coord1())?;
                self.coord2.push(drop.coord2())?;
                count += 1;
            }
        }
        self.raggedcount.push(count)
    }

    fn after_timestepping(&mut self) -> IoResult<()> {
        self.sdindex.finalise()?;
        self.sdgbxindex.finalise()?;
        self.xi.finalise()?;
        self.radius.finalise()?;
        self.msol.finalise()?;
        self.coord3.finalise()?;
        self.coord1.finalise()?;
        self.coord2.finalise()?;
        self.raggedcount.finalise()
    }
}

// ============================================================================
// 测试
// ============================================================================

// crates/cleo_foundation/src/timesteps.rs

//! 模型步与时间转换
//!
//! 模型内部以整数"模型步" (model tick) 推进时间：
//! 1 tick = TIME0 / 100000 的无量纲时间（即 0.01 s 真实时间）。
//! 所有子系统的时间步（condstep, collstep, motionstep, couplstep,
//! obsstep, t_end）均为 tick 的整数倍。

use crate::constants::dimless::TIME0;

/// 每个特征时间尺度 TIME0 对应的模型步数
pub const STEPS_PER_TIMESCALE: u64 = 100_000;

/// 模型步 → 无量纲时间
#[inline]
pub fn step2dimlesstime(step: u64) -> f64 {
    step as f64 / STEPS_PER_TIMESCALE as f64
}

/// 模型步 → 真实时间 [s]
#[inline]
pub fn step2realtime(step: u64) -> f64 {
    step2dimlesstime(step) * TIME0
}

/// 真实时间 [s] → 模型步（四舍五入）
#[inline]
pub fn realtime2step(time: f64) -> u64 {
    (time / TIME0 * STEPS_PER_TIMESCALE as f64).round() as u64
}

/// 下一个 interval 整数倍时刻
///
/// 给定当前时刻 `t` 与周期 `interval`，返回下一次触发时刻。
#[inline]
pub fn next_multiple(t: u64, interval: u64) -> u64 {
    (t / interval + 1) * interval
}

/// 当前时刻是否为 interval 的整数倍
#[inline]
pub fn on_multiple(t: u64, interval: u64) -> bool {
    t % interval == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_is_ten_milliseconds() {
        // 1 tick = TIME0/100000 = 0.01 s
        assert!((step2realtime(1) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_roundtrip() {
        let step = realtime2step(2.5);
        assert_eq!(step, 250);
        assert!((step2realtime(step) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_dimlesstime() {
        // 100000 tick = 1 个 TIME0
        assert!((step2dimlesstime(STEPS_PER_TIMESCALE) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_next_multiple() {
        assert_eq!(next_multiple(0, 5), 5);
        assert_eq!(next_multiple(4, 5), 5);
        assert_eq!(next_multiple(5, 5), 10);
    }

    #[test]
    fn test_on_multiple() {
        assert!(on_multiple(0, 7));
        assert!(on_multiple(14, 7));
        assert!(!on_multiple(15, 7));
    }
}

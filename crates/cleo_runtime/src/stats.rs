// crates/cleo_runtime/src/stats.rs

//! 运行统计
//!
//! 记录时间步进前后的墙钟时间与若干事件计数，
//! 运行结束时输出摘要。

use std::time::{Duration, Instant};

use log::info;

/// 运行统计
#[derive(Debug)]
pub struct RunStats {
    created: Instant,
    t_start: Option<Instant>,
    t_end: Option<Instant>,
    /// 外层循环步数
    pub steps: u64,
    /// 观测事件数
    pub observations: u64,
    /// 耦合事件数
    pub couplings: u64,
}

impl RunStats {
    /// 创建统计记录
    pub fn new() -> Self {
        Self {
            created: Instant::now(),
            t_start: None,
            t_end: None,
            steps: 0,
            observations: 0,
            couplings: 0,
        }
    }

    /// 标记时间步进开始
    pub fn pre_timestepping(&mut self) {
        self.t_start = Some(Instant::now());
    }

    /// 标记时间步进结束
    pub fn post_timestepping(&mut self) {
        self.t_end = Some(Instant::now());
    }

    /// 初始化耗时
    pub fn init_wall(&self) -> Duration {
        self.t_start
            .map(|s| s - self.created)
            .unwrap_or_default()
    }

    /// 时间步进耗时
    pub fn timestepping_wall(&self) -> Duration {
        match (self.t_start, self.t_end) {
            (Some(s), Some(e)) => e - s,
            _ => Duration::default(),
        }
    }

    /// 输出摘要
    pub fn summary(&self) {
        info!(
            "运行结束: {} 步, {} 次观测, {} 次耦合; 初始化 {:.3}s, 步进 {:.3}s",
            self.steps,
            self.observations,
            self.couplings,
            self.init_wall().as_secs_f64(),
            self.timestepping_wall().as_secs_f64(),
        );
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

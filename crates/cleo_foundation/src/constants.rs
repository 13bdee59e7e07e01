// crates/cleo_foundation/src/constants.rs

//! SDM 常数表
//!
//! 分为两个命名空间：
//!
//! - [`dimmed`]: 有量纲常数（SI 单位）
//! - [`dimless`]: 特征尺度与无量纲化后的常数
//!
//! 模型内部所有量均按特征尺度无量纲化：长度除以 `R0`（液滴半径尺度）
//! 或 `COORD0`（坐标尺度），压强除以 `P0`，温度除以 `TEMP0`，
//! 时间除以 `TIME0`，垂直速度除以 `W0`。

/// 有量纲常数（SI 单位）
pub mod dimmed {
    /// 重力加速度 [m/s²]
    pub const G: f64 = 9.80665;
    /// 普适气体常数 [J/mol/K]
    pub const RGAS_UNIV: f64 = 8.314462618;
    /// 水的摩尔质量 [kg/mol]
    pub const MR_WATER: f64 = 0.01801528;
    /// 干空气摩尔质量 [kg/mol]
    pub const MR_DRY: f64 = 0.028966216;
    /// 干空气比气体常数 [J/kg/K]
    pub const RGAS_DRY: f64 = RGAS_UNIV / MR_DRY;
    /// 水汽比气体常数 [J/kg/K]
    pub const RGAS_V: f64 = RGAS_UNIV / MR_WATER;

    /// 水的汽化潜热 [J/kg] (IAPWS97, 273.15K)
    pub const LATENT_V: f64 = 2_500_930.0;
    /// 干空气定压比热 [J/kg/K]
    pub const CP_DRY: f64 = 1004.64;
    /// 水汽定压比热 [J/kg/K] (IAPWS97, 273.15K)
    pub const CP_V: f64 = 1865.01;
    /// 液态水比热 [J/kg/K]
    pub const C_L: f64 = 4192.664;

    /// 干空气密度 [kg/m³] (300K)
    pub const RHO_DRY: f64 = 1.177;
    /// 液态水密度 [kg/m³] (300K)
    pub const RHO_L: f64 = 1000.0;
    /// 空气动力粘度 [Pa·s] (300K)
    pub const DYNVISC: f64 = 18.45e-6;

    /// 干气溶胶（溶质）密度 [kg/m³] (NaCl)
    pub const RHO_SOL: f64 = 2077.0;
    /// 溶质摩尔质量 [kg/mol] (NaCl)
    pub const MR_SOL: f64 = 0.058443;
    /// 离解度（范特霍夫因子）[无量纲]
    pub const IONIC: f64 = 2.0;
}

/// 特征尺度与无量纲常数
pub mod dimless {
    use super::dimmed as dc;

    /// 特征速度尺度 [m/s]
    pub const W0: f64 = 1.0;
    /// 特征时间尺度 [s]
    pub const TIME0: f64 = 1000.0;
    /// 坐标尺度 [m]
    pub const COORD0: f64 = TIME0 * W0;

    /// 比热尺度 [J/kg/K]
    pub const CP0: f64 = dc::CP_DRY;
    /// 摩尔质量尺度 [kg/mol]
    pub const MR0: f64 = dc::MR_DRY;
    /// 液滴半径尺度 [m]
    pub const R0: f64 = 1e-6;

    /// 压强尺度 [Pa]
    pub const P0: f64 = 100_000.0;
    /// 温度尺度 [K]
    pub const TEMP0: f64 = 273.15;
    /// 密度尺度 [kg/m³]
    pub const RHO0: f64 = P0 / (CP0 * TEMP0);
    /// 凝结-扩散因子尺度
    pub const F0: f64 = TIME0 / (RHO0 * R0 * R0);

    /// 水/干空气摩尔质量比
    pub const MR_RATIO: f64 = dc::MR_WATER / dc::MR_DRY;
    /// 无量纲干空气比热
    pub const CP_DRY: f64 = dc::CP_DRY / CP0;
    /// 无量纲水汽比热
    pub const CP_V: f64 = dc::CP_V / CP0;
    /// 无量纲液态水比热
    pub const C_L: f64 = dc::C_L / CP0;
    /// 无量纲汽化潜热
    pub const LATENT_V: f64 = dc::LATENT_V / (TEMP0 * CP0);
    /// 无量纲干空气气体常数
    pub const RGAS_DRY: f64 = dc::RGAS_DRY / CP0;
    /// 无量纲水汽气体常数
    pub const RGAS_V: f64 = dc::RGAS_V / CP0;
    /// 无量纲干空气密度
    pub const RHO_DRY: f64 = dc::RHO_DRY / RHO0;
    /// 无量纲液态水密度
    pub const RHO_L: f64 = dc::RHO_L / RHO0;
    /// 无量纲溶质密度
    pub const RHO_SOL: f64 = dc::RHO_SOL / RHO0;
    /// 无量纲溶质摩尔质量
    pub const MR_SOL: f64 = dc::MR_SOL / MR0;
    /// 离解度（范特霍夫因子）
    pub const IONIC: f64 = dc::IONIC;

    /// 质量尺度 [kg]（半径尺度立方乘密度尺度）
    pub const MASS0: f64 = R0 * R0 * R0 * RHO0;
}

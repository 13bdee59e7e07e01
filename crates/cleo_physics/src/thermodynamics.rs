// crates/cleo_physics/src/thermodynamics.rs

//! 热力学关系式
//!
//! 饱和水汽压、质量混合比、过饱和比与湿空气比热。
//! 全部输入输出为无量纲量；内部按需换算回 SI 单位。

use cleo_foundation::constants::dimless as dlc;

use crate::error::{PhysicsError, PhysicsResult};

/// 饱和水汽压（Murray/Tetens 形式，无量纲）
///
/// `psat(T) = P_ref · exp(A(T−T_ref)/(T−B)) / P0`，
/// 常数 A=17.4146, B=33.639, T_ref=273.16 K, P_ref=611.655 Pa
/// (Murray 1967)。
///
/// # Errors
///
/// 真实温度 T ≤ 0K 时返回 [`PhysicsError::InvalidState`]。
pub fn saturation_pressure(temp: f64) -> PhysicsResult<f64> {
    const A: f64 = 17.4146;
    const B: f64 = 33.639;
    const TREF: f64 = 273.16; // 水的三相点温度 [K]
    const PREF: f64 = 611.655; // 水的三相点压强 [Pa]

    let t = temp * dlc::TEMP0; // 真实温度 [K]
    if t <= 0.0 {
        return Err(PhysicsError::InvalidState {
            message: format!("psat 要求 T > 0K, 实际 T = {}K", t),
        });
    }

    Ok(PREF * (A * (t - TREF) / (t - B)).exp() / dlc::P0)
}

/// 饱和水汽压（Murphy & Koop 2005 形式，无量纲）
///
/// 精度更高的替代公式，来自 typhon.physics.thermodynamics。
pub fn saturation_pressure_murphy_koop(temp: f64) -> PhysicsResult<f64> {
    let t = temp * dlc::TEMP0; // 真实温度 [K]
    if t <= 0.0 {
        return Err(PhysicsError::InvalidState {
            message: format!("psat 要求 T > 0K, 实际 T = {}K", t),
        });
    }

    let lnpsat = 54.842763 - 6763.22 / t - 4.21 * t.ln() + 0.000367 * t
        + (0.0415 * (t - 218.8)).tanh()
            * (53.878 - 1331.22 / t - 9.44523 * t.ln() + 0.014025 * t);

    Ok(lnpsat.exp() / dlc::P0)
}

/// 由水汽分压求质量混合比 qv = m_v/m_dry
#[inline]
pub fn vapour_pressure_to_mass_mixing_ratio(press_vapour: f64, press: f64) -> f64 {
    dlc::MR_RATIO * press_vapour / (press - press_vapour)
}

/// 过饱和比 s_ratio = p_vapour / psat（即相对湿度）
#[inline]
pub fn supersaturation_ratio(press: f64, qvap: f64, psat: f64) -> f64 {
    (press * qvap) / ((dlc::MR_RATIO + qvap) * psat)
}

/// 湿空气（干空气 + 水汽 + 液态水）的无量纲定压比热
#[inline]
pub fn moist_specific_heat(qvap: f64, qcond: f64) -> f64 {
    dlc::CP_DRY + dlc::CP_V * qvap + dlc::C_L * qcond
}

// ============================================================================
// 测试
// ============================================================================

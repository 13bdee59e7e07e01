// crates/cleo_config/src/config.rs

//! 配置结构
//!
//! 与 YAML 配置文件一一对应的 serde 结构。所有物理量使用
//! 有量纲的输入单位（Pa, K, s, m/s），载入后由各子系统按
//! 特征尺度无量纲化；时间步一律为整数模型步 (tick)。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// ============================================================================
// 顶层配置
// ============================================================================

/// CLEO 运行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 无量纲常数描述文件路径（拷贝进 setup 日志）
    pub constants_filename: PathBuf,

    /// 组合 config+constants 记录的输出路径
    pub setup_filename: PathBuf,

    /// 输入文件
    pub inputfiles: InputFilesConfig,

    /// 输出数据
    pub outputdata: OutputDataConfig,

    /// 域尺寸
    pub domain: DomainConfig,

    /// 时间步表（整数模型步）
    pub timesteps: TimestepsConfig,

    /// 凝结求解参数
    #[serde(default)]
    pub condensation: CondensationConfig,

    /// 碰撞参数
    #[serde(default)]
    pub collisions: CollisionsConfig,

    /// 耦合动力学提供者选择
    #[serde(default)]
    pub dynamics: DynamicsKind,

    /// 气块 (parcel) 动力学参数（dynamics = cvode 时使用）
    #[serde(default)]
    pub cvodedynamics: ParcelDynamicsConfig,

    /// fromfile 动力学输入路径（dynamics = fromfile 时使用）
    #[serde(default)]
    pub fromfiledynamics: FromFileDynamicsConfig,

    /// 域边界策略
    #[serde(default)]
    pub boundaries: BoundariesConfig,

    /// 随机数运行种子
    #[serde(default = "default_run_seed")]
    pub run_seed: u64,
}

fn default_run_seed() -> u64 {
    0
}

/// 输入文件路径
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputFilesConfig {
    /// 初始超级液滴属性二进制文件
    pub initsupers_filename: PathBuf,
    /// 网格盒拓扑二进制文件（ndims 与各轴边界）
    pub grid_filename: PathBuf,
    /// 可选的运行统计输出路径
    #[serde(default)]
    pub stats_filename: Option<PathBuf>,
}

/// 输出数据配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDataConfig {
    /// Zarr 存储根目录
    pub zarrbasedir: PathBuf,
    /// 数组分块元素数上限
    #[serde(default = "default_maxchunk")]
    pub maxchunk: usize,
}

fn default_maxchunk() -> usize {
    1_048_576
}

/// 域尺寸配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// 空间维数 (0, 1, 2 或 3)
    pub nspacedims: u8,
    /// 网格盒总数
    pub ngbxs: usize,
    /// 超级液滴总数
    pub totnsupers: usize,
}

/// 时间步表（整数模型步；1 tick = 0.01 s 真实时间）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestepsConfig {
    /// 凝结步
    pub condstep: u64,
    /// 碰撞步
    pub collstep: u64,
    /// 运动步
    pub motionstep: u64,
    /// 耦合步
    pub couplstep: u64,
    /// 观测步
    pub obsstep: u64,
    /// 终止时刻
    pub t_end: u64,
}

/// 凝结求解参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondensationConfig {
    /// Newton–Raphson 相对容差
    #[serde(default = "default_cond_rtol")]
    pub rtol: f64,
    /// Newton–Raphson 绝对容差
    #[serde(default = "default_cond_atol")]
    pub atol: f64,
    /// 隐式欧拉子步（模型步；默认等于 condstep）
    #[serde(default)]
    pub subtimestep: Option<u64>,
    /// Newton–Raphson 最大迭代次数
    #[serde(default = "default_cond_maxiters")]
    pub maxiters: usize,
    /// 凝结是否反馈网格盒热力学状态
    #[serde(default = "default_true")]
    pub do_alter_thermo: bool,
}

fn default_cond_rtol() -> f64 {
    1e-6
}
fn default_cond_atol() -> f64 {
    1e-6
}
fn default_cond_maxiters() -> usize {
    50
}
fn default_true() -> bool {
    true
}

impl Default for CondensationConfig {
    fn default() -> Self {
        Self {
            rtol: default_cond_rtol(),
            atol: default_cond_atol(),
            subtimestep: None,
            maxiters: default_cond_maxiters(),
            do_alter_thermo: default_true(),
        }
    }
}

/// 碰撞相互作用核选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollisionKernelKind {
    /// Golovin 1963 体积和核
    Golovin,
    /// Long 流体动力核（Simmel et al. 2002 形式）
    #[default]
    Long,
    /// Low & List 1982 并合效率扩展
    LowList,
}

/// 碰撞参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionsConfig {
    /// 相互作用核
    #[serde(default)]
    pub kernel: CollisionKernelKind,
    /// 是否启用碰撞破碎
    #[serde(default)]
    pub do_breakup: bool,
    /// 一次真实碰撞破碎的期望碎片数 (≥ 1)
    #[serde(default = "default_nfrags")]
    pub nfrags: f64,
}

fn default_nfrags() -> f64 {
    5.0
}

impl Default for CollisionsConfig {
    fn default() -> Self {
        Self {
            kernel: CollisionKernelKind::default(),
            do_breakup: false,
            nfrags: default_nfrags(),
        }
    }
}

/// 耦合动力学提供者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DynamicsKind {
    /// 全空操作
    #[default]
    Null,
    /// 从磁盘读取预先计算的时间序列
    FromFile,
    /// 耦合绝热气块 ODE 求解器
    Cvode,
}

/// 气块动力学参数（原 CVODE 封装的初始条件与容差）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelDynamicsConfig {
    /// 初始压强 [Pa]
    #[serde(rename = "P_INIT", default = "default_p_init")]
    pub p_init: f64,
    /// 初始温度 [K]
    #[serde(rename = "TEMP_INIT", default = "default_temp_init")]
    pub temp_init: f64,
    /// 初始相对湿度 [%]
    #[serde(default = "default_relh_init")]
    pub relh_init: f64,
    /// 初始凝结水质量混合比
    #[serde(default)]
    pub qc_init: f64,
    /// 正弦上升气流振幅 [m/s]
    #[serde(rename = "W_AVG", default = "default_w_avg")]
    pub w_avg: f64,
    /// 上升气流正弦半周期 [s]
    #[serde(rename = "T_HALF", default = "default_t_half")]
    pub t_half: f64,
    /// ODE 相对容差
    #[serde(default = "default_cvode_rtol")]
    pub cvode_rtol: f64,
    /// ODE 绝对容差
    #[serde(default = "default_cvode_atol")]
    pub cvode_atol: f64,
    /// 是否演化热力学（false 时右端项为零）
    #[serde(rename = "doThermo", default = "default_true")]
    pub do_thermo: bool,
}

fn default_p_init() -> f64 {
    100_000.0
}
fn default_temp_init() -> f64 {
    273.15
}
fn default_relh_init() -> f64 {
    60.0
}
fn default_w_avg() -> f64 {
    1.0
}
fn default_t_half() -> f64 {
    150.0
}
fn default_cvode_rtol() -> f64 {
    1e-6
}
fn default_cvode_atol() -> f64 {
    1e-6
}

impl Default for ParcelDynamicsConfig {
    fn default() -> Self {
        Self {
            p_init: default_p_init(),
            temp_init: default_temp_init(),
            relh_init: default_relh_init(),
            qc_init: 0.0,
            w_avg: default_w_avg(),
            t_half: default_t_half(),
            cvode_rtol: default_cvode_rtol(),
            cvode_atol: default_cvode_atol(),
            do_thermo: default_true(),
        }
    }
}

/// fromfile 动力学输入路径（每个变量一个二进制时间序列文件）
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FromFileDynamicsConfig {
    /// 压强场
    #[serde(default)]
    pub press_filename: Option<PathBuf>,
    /// 温度场
    #[serde(default)]
    pub temp_filename: Option<PathBuf>,
    /// 水汽场
    #[serde(default)]
    pub qvap_filename: Option<PathBuf>,
    /// 凝结水场
    #[serde(default)]
    pub qcond_filename: Option<PathBuf>,
    /// z 面垂直风速场 (nspacedims ≥ 1)
    #[serde(default)]
    pub wvel_filename: Option<PathBuf>,
    /// x 面 u 风速场 (nspacedims ≥ 2)
    #[serde(default)]
    pub uvel_filename: Option<PathBuf>,
    /// y 面 v 风速场 (nspacedims == 3)
    #[serde(default)]
    pub vvel_filename: Option<PathBuf>,
}

/// 域边界策略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundariesConfig {
    /// 水平方向 (coord1, coord2) 是否周期
    #[serde(default = "default_true")]
    pub periodic_horizontal: bool,
}

impl Default for BoundariesConfig {
    fn default() -> Self {
        Self {
            periodic_horizontal: default_true(),
        }
    }
}

// ============================================================================
// 载入与验证
// ============================================================================

impl Config {
    /// 从 YAML 文件载入配置
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// 从 YAML 字符串载入配置
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 启动期验证
    ///
    /// 任意一项失败即在初始化之前中止运行。
    pub fn validate(&self) -> ConfigResult<()> {
        if self.domain.nspacedims > 3 {
            return Err(ConfigError::invalid(
                "domain.nspacedims",
                format!("必须为 0..=3, 实际 {}", self.domain.nspacedims),
            ));
        }
        if self.domain.ngbxs == 0 {
            return Err(ConfigError::invalid("domain.ngbxs", "必须为正"));
        }
        if self.domain.totnsupers == 0 {
            return Err(ConfigError::invalid("domain.totnsupers", "必须为正"));
        }

        let ts = &self.timesteps;
        for (key, val) in [
            ("timesteps.condstep", ts.condstep),
            ("timesteps.collstep", ts.collstep),
            ("timesteps.motionstep", ts.motionstep),
            ("timesteps.couplstep", ts.couplstep),
            ("timesteps.obsstep", ts.obsstep),
            ("timesteps.t_end", ts.t_end),
        ] {
            if val == 0 {
                return Err(ConfigError::invalid(key, "模型步必须为正整数"));
            }
        }

        if self.outputdata.maxchunk == 0 {
            return Err(ConfigError::invalid("outputdata.maxchunk", "必须为正"));
        }
        if !(self.condensation.rtol > 0.0) || !(self.condensation.atol > 0.0) {
            return Err(ConfigError::invalid("condensation", "容差必须为正"));
        }
        if self.condensation.maxiters == 0 {
            return Err(ConfigError::invalid("condensation.maxiters", "必须为正"));
        }
        if self.collisions.nfrags < 1.0 {
            return Err(ConfigError::invalid(
                "collisions.nfrags",
                "期望碎片数必须 ≥ 1",
            ));
        }

        if self.dynamics == DynamicsKind::FromFile {
            let ff = &self.fromfiledynamics;
            for (key, path) in [
                ("fromfiledynamics.press_filename", &ff.press_filename),
                ("fromfiledynamics.temp_filename", &ff.temp_filename),
                ("fromfiledynamics.qvap_filename", &ff.qvap_filename),
                ("fromfiledynamics.qcond_filename", &ff.qcond_filename),
            ] {
                if path.is_none() {
                    return Err(ConfigError::invalid(key, "fromfile 动力学缺少输入路径"));
                }
            }
        }

        if self.dynamics == DynamicsKind::Cvode {
            let pd = &self.cvodedynamics;
            if !(pd.temp_init > 0.0) {
                return Err(ConfigError::invalid("cvodedynamics.TEMP_INIT", "必须为正"));
            }
            if !(pd.p_init > 0.0) {
                return Err(ConfigError::invalid("cvodedynamics.P_INIT", "必须为正"));
            }
        }

        Ok(())
    }

    /// 凝结子步（未配置时等于 condstep）
    pub fn condensation_subtimestep(&self) -> u64 {
        self.condensation
            .subtimestep
            .unwrap_or(self.timesteps.condstep)
    }
}

// ============================================================================
// 测试
// ============================================================================

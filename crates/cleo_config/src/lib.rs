// crates/cleo_config/src/lib.rs

//! CLEO 配置层
//!
//! YAML 配置文件的解析（serde + serde_yaml）与启动期验证。
//! 配置错误与初始化错误在进入时间步进之前中止运行。

pub mod config;
pub mod error;

pub use config::{
    BoundariesConfig, CollisionKernelKind, CollisionsConfig, CondensationConfig, Config,
    DomainConfig, DynamicsKind, FromFileDynamicsConfig, InputFilesConfig, OutputDataConfig,
    ParcelDynamicsConfig, TimestepsConfig,
};
pub use error::{ConfigError, ConfigResult};

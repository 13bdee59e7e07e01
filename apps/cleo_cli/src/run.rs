// apps/cleo_cli/src/run.rs

//! 运行装配
//!
//! 把配置装配成 SDM 引擎并步进至 t_end：读入网格与初始液滴、
//! 组合微物理过程与碰撞核、选择耦合动力学提供者、搭建观测
//! 管线。本层只做装配与错误上下文，不含任何物理。

use std::fs;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use cleo_config::{CollisionKernelKind, Config, DynamicsKind as ConfigDynamics};
use cleo_domain::{InitGbxsData, SoluteProperties};
use cleo_dynamics::parcel::ParcelParams;
use cleo_dynamics::{
    CoupledDynamics, DynamicsKind, FromFileDynamics, NullDynamics, ParcelDynamics,
};
use cleo_foundation::constants::dimless as dlc;
use cleo_foundation::SdIdGenerator;
use cleo_io::input::{read_gridfile, read_initsupers, read_thermo_series};
use cleo_io::setup::write_setup_log;
use cleo_io::{
    CombinedObserver, FsStore, GbxIndexObserver, MassMomentsObserver, NsupersObserver, Observer,
    StateObserver, SupersAttrsObserver, TimeObserver,
};
use cleo_physics::thermodynamics::{saturation_pressure, vapour_pressure_to_mass_mixing_ratio};
use cleo_physics::{
    golovin_prob, long_hydro_prob, lowlist_breakup_prob, lowlist_coal_prob, Breakup, Coalescence,
    CollisionProb, CombinedProcess, Condensation, DoCollisions, MicrophysicalProcess,
    PredCorrMotion, SimmelTerminalVelocity,
};
use cleo_runtime::{run_cleo, SdmStepper};

/// 装配并运行
pub fn execute(config: &Config) -> anyhow::Result<()> {
    // setup 记录
    let config_text = serde_yaml::to_string(config)?;
    write_setup_log(
        &config.setup_filename,
        &config_text,
        &config.constants_filename,
    )
    .context("写 setup 记录失败")?;

    // 网格
    let griddata = read_gridfile(&config.inputfiles.grid_filename)
        .context("读取网格边界文件失败")?;
    let maps = griddata
        .into_maps(config.boundaries.periodic_horizontal)
        .context("构造网格映射失败")?;
    anyhow::ensure!(
        maps.ngbxs() == config.domain.ngbxs,
        "网格文件的网格盒数 {} 与配置 domain.ngbxs = {} 不符",
        maps.ngbxs(),
        config.domain.ngbxs
    );

    // 初始液滴
    let ids = SdIdGenerator::new();
    let supers_data = read_initsupers(&config.inputfiles.initsupers_filename)
        .context("读取初始液滴文件失败")?;
    let arena = supers_data
        .into_arena(
            config.domain.totnsupers,
            &maps,
            Arc::new(SoluteProperties::default()),
            &ids,
        )
        .context("构造液滴 Arena 失败")?;

    // 网格盒初始状态（由气块初值导出, fromfile 模式在首个耦合前覆盖）
    let pd = &config.cvodedynamics;
    let press_i = pd.p_init / dlc::P0;
    let temp_i = pd.temp_init / dlc::TEMP0;
    let psat = saturation_pressure(temp_i).context("初始温度无效")?;
    let qvap_i =
        vapour_pressure_to_mass_mixing_ratio(psat * pd.relh_init / 100.0, press_i);
    let mut gbxs = InitGbxsData::uniform(maps.ngbxs(), press_i, temp_i, qvap_i, pd.qc_init)
        .into_gridboxes(&maps, config.run_seed)
        .context("构造网格盒失败")?;

    // 耦合动力学
    let couplstep = config.timesteps.couplstep;
    let mut coupldyn = match config.dynamics {
        ConfigDynamics::Null => DynamicsKind::Null(NullDynamics::new(couplstep)),
        ConfigDynamics::Cvode => {
            let params = ParcelParams {
                p_init: pd.p_init,
                temp_init: pd.temp_init,
                relh_init: pd.relh_init,
                qc_init: pd.qc_init,
                w_avg: pd.w_avg,
                t_half: pd.t_half,
                rtol: pd.cvode_rtol,
                atol: pd.cvode_atol,
                do_thermo: pd.do_thermo,
            };
            DynamicsKind::Parcel(
                ParcelDynamics::new(couplstep, maps.ngbxs(), &params)
                    .context("构造气块动力学失败")?,
            )
        }
        ConfigDynamics::FromFile => {
            DynamicsKind::FromFile(build_fromfile(config, maps.ndims(), couplstep)?)
        }
    };

    // 时间步进前把动力学初值写入网格盒
    coupldyn
        .send_to_gridboxes(&mut gbxs)
        .context("初始耦合发送失败")?;

    // 微物理组合与运动
    let microphys = build_microphysics(config);
    let motion = PredCorrMotion::new(config.timesteps.motionstep, SimmelTerminalVelocity);

    let mut stepper = SdmStepper::new(maps, microphys, motion, gbxs, arena)
        .context("装配 SDM 步进器失败")?;

    // 观测管线
    let store =
        FsStore::new(&config.outputdata.zarrbasedir).context("创建 Zarr 存储失败")?;
    let mut obs = build_observers(config, &store);

    info!(
        "装配完成: {} 网格盒, {} 超级液滴, t_end = {}",
        config.domain.ngbxs, config.domain.totnsupers, config.timesteps.t_end
    );

    // 步进
    let stats = run_cleo(
        &mut stepper,
        &mut coupldyn,
        &mut obs,
        config.timesteps.t_end,
    )?;

    // 可选的统计输出
    if let Some(stats_path) = &config.inputfiles.stats_filename {
        let text = format!(
            "steps: {}\nobservations: {}\ncouplings: {}\ninit_wall_s: {:.6}\ntimestepping_wall_s: {:.6}\n",
            stats.steps,
            stats.observations,
            stats.couplings,
            stats.init_wall().as_secs_f64(),
            stats.timestepping_wall().as_secs_f64(),
        );
        fs::write(stats_path, text).context("写统计文件失败")?;
    }

    Ok(())
}

/// 由配置组合微物理过程（凝结 ⊕ 碰撞-并合 [⊕ 碰撞-破碎]）
fn build_microphysics(config: &Config) -> Box<dyn MicrophysicalProcess> {
    let condensation = Condensation::new(
        config.timesteps.condstep,
        config.condensation_subtimestep(),
        config.condensation.maxiters,
        config.condensation.rtol,
        config.condensation.atol,
        config.condensation.do_alter_thermo,
    );

    let kernel = match config.collisions.kernel {
        CollisionKernelKind::Golovin => CollisionProb::Golovin(golovin_prob()),
        CollisionKernelKind::Long => CollisionProb::Long(long_hydro_prob()),
        CollisionKernelKind::LowList => CollisionProb::LowListCoal(lowlist_coal_prob()),
    };
    let coalescence = DoCollisions::new(config.timesteps.collstep, kernel, Coalescence);

    let base = CombinedProcess::new(condensation, coalescence);
    if config.collisions.do_breakup {
        let breakup = DoCollisions::new(
            config.timesteps.collstep,
            lowlist_breakup_prob(),
            Breakup::new(config.collisions.nfrags),
        );
        Box::new(CombinedProcess::new(base, breakup))
    } else {
        Box::new(base)
    }
}

/// 读入 fromfile 动力学的时间序列
fn build_fromfile(
    config: &Config,
    ndims: [usize; 3],
    couplstep: u64,
) -> anyhow::Result<FromFileDynamics> {
    let ff = &config.fromfiledynamics;
    let read = |path: &Option<std::path::PathBuf>, name: &str, scale: f64| {
        let path = path
            .as_ref()
            .with_context(|| format!("fromfiledynamics 缺少 {}", name))?;
        read_thermo_series(path, scale)
            .with_context(|| format!("读取 {} 时间序列失败", name))
    };

    let press = read(&ff.press_filename, "press", dlc::P0)?;
    let temp = read(&ff.temp_filename, "temp", dlc::TEMP0)?;
    let qvap = read(&ff.qvap_filename, "qvap", 1.0)?;
    let qcond = read(&ff.qcond_filename, "qcond", 1.0)?;

    let nspacedims = config.domain.nspacedims;
    let wvel = if nspacedims >= 1 && ff.wvel_filename.is_some() {
        Some(read(&ff.wvel_filename, "wvel", dlc::W0)?)
    } else {
        None
    };
    let uvel = if nspacedims >= 2 && ff.uvel_filename.is_some() {
        Some(read(&ff.uvel_filename, "uvel", dlc::W0)?)
    } else {
        None
    };
    let vvel = if nspacedims >= 3 && ff.vvel_filename.is_some() {
        Some(read(&ff.vvel_filename, "vvel", dlc::W0)?)
    } else {
        None
    };

    Ok(FromFileDynamics::new(
        couplstep, ndims, press, temp, qvap, qcond, wvel, uvel, vvel,
    )?)
}

/// 组合全部观测器
fn build_observers(config: &Config, store: &FsStore) -> impl Observer {
    let obsstep = config.timesteps.obsstep;
    let maxchunk = config.outputdata.maxchunk;
    let ngbxs = config.domain.ngbxs;

    CombinedObserver::new(
        GbxIndexObserver::new(store, maxchunk),
        CombinedObserver::new(
            TimeObserver::new(obsstep, store, maxchunk),
            CombinedObserver::new(
                StateObserver::new(obsstep, store, maxchunk, ngbxs),
                CombinedObserver::new(
                    NsupersObserver::new(obsstep, store, maxchunk, ngbxs),
                    CombinedObserver::new(
                        MassMomentsObserver::new(obsstep, store, maxchunk, ngbxs),
                        SupersAttrsObserver::new(obsstep, store, maxchunk),
                    ),
                ),
            ),
        ),
    )
}

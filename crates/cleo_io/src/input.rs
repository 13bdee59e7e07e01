// crates/cleo_io/src/input.rs

//! 二进制输入文件
//!
//! 小端二进制格式，载入时按特征尺度无量纲化：
//!
//! - **网格边界文件**（魔数 `CLGB`）: u32 版本, u64 n3/n1/n2,
//!   随后每盒 6×f64 (z0,z1,x0,x1,y0,y1)，单位米
//! - **初始液滴文件**（魔数 `CLSD`）: u32 版本, u64 nsupers,
//!   随后依次为 sdgbxindex u32×n, xi u64×n, radius f64×n [m],
//!   msol f64×n [kg], coord3/coord1/coord2 f64×n [m]
//! - **热力学时间序列文件**（魔数 `CLTH`）: u32 版本,
//!   u64 nsteps, u64 ncols, 随后 nsteps×ncols f64（调用方给定
//!   缩放因子）
//!
//! 写入函数供测试与输入生成工具使用。

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ndarray::Array2;

use cleo_domain::{CartesianMaps, InitSupersData};
use cleo_foundation::constants::dimless as dlc;
use cleo_foundation::{CleoError, CleoResult};

use crate::error::{IoError, IoResult};

const GRID_MAGIC: &[u8; 4] = b"CLGB";
const SUPERS_MAGIC: &[u8; 4] = b"CLSD";
const THERMO_MAGIC: &[u8; 4] = b"CLTH";
const FORMAT_VERSION: u32 = 1;

// ============================================================================
// 底层读写
// ============================================================================

fn read_exact_buf<R: Read>(reader: &mut R, buf: &mut [u8], path: &Path) -> IoResult<()> {
    reader
        .read_exact(buf)
        .map_err(|_| IoError::parse(path, "文件在预期长度之前结束"))
}

fn read_u32<R: Read>(reader: &mut R, path: &Path) -> IoResult<u32> {
    let mut buf = [0u8; 4];
    read_exact_buf(reader, &mut buf, path)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R, path: &Path) -> IoResult<u64> {
    let mut buf = [0u8; 8];
    read_exact_buf(reader, &mut buf, path)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_f64<R: Read>(reader: &mut R, path: &Path) -> IoResult<f64> {
    let mut buf = [0u8; 8];
    read_exact_buf(reader, &mut buf, path)?;
    Ok(f64::from_le_bytes(buf))
}

fn check_header<R: Read>(reader: &mut R, magic: &[u8; 4], path: &Path) -> IoResult<()> {
    let mut buf = [0u8; 4];
    read_exact_buf(reader, &mut buf, path)?;
    if &buf != magic {
        return Err(IoError::parse(
            path,
            format!("魔数不符: 期望 {:?}, 实际 {:?}", magic, buf),
        ));
    }
    let version = read_u32(reader, path)?;
    if version != FORMAT_VERSION {
        return Err(IoError::parse(
            path,
            format!("版本不支持: {}", version),
        ));
    }
    Ok(())
}

// ============================================================================
// 网格边界文件
// ============================================================================

/// 网格边界文件内容（已无量纲化）
#[derive(Debug, Clone)]
pub struct GridfileData {
    /// 各方向网格盒数 (n3, n1, n2)
    pub ndims: [usize; 3],
    /// 每盒 z 边界
    pub bounds3: Vec<(f64, f64)>,
    /// 每盒 x 边界
    pub bounds1: Vec<(f64, f64)>,
    /// 每盒 y 边界
    pub bounds2: Vec<(f64, f64)>,
}

impl GridfileData {
    /// 构造笛卡尔网格映射
    pub fn into_maps(self, periodic_horizontal: bool) -> CleoResult<CartesianMaps> {
        CartesianMaps::new(
            self.ndims,
            self.bounds3,
            self.bounds1,
            self.bounds2,
            periodic_horizontal,
        )
    }
}

/// 读取网格边界文件（坐标以米存储，载入除以 COORD0）
pub fn read_gridfile(path: impl AsRef<Path>) -> IoResult<GridfileData> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    check_header(&mut reader, GRID_MAGIC, path)?;

    let n3 = read_u64(&mut reader, path)? as usize;
    let n1 = read_u64(&mut reader, path)? as usize;
    let n2 = read_u64(&mut reader, path)? as usize;
    let ngbxs = n3 * n1 * n2;
    if ngbxs == 0 {
        return Err(IoError::parse(path, "网格盒总数为零"));
    }

    let mut bounds3 = Vec::with_capacity(ngbxs);
    let mut bounds1 = Vec::with_capacity(ngbxs);
    let mut bounds2 = Vec::with_capacity(ngbxs);
    for _ in 0..ngbxs {
        let z0 = read_f64(&mut reader, path)? / dlc::COORD0;
        let z1 = read_f64(&mut reader, path)? / dlc::COORD0;
        let x0 = read_f64(&mut reader, path)? / dlc::COORD0;
        let x1 = read_f64(&mut reader, path)? / dlc::COORD0;
        let y0 = read_f64(&mut reader, path)? / dlc::COORD0;
        let y1 = read_f64(&mut reader, path)? / dlc::COORD0;
        bounds3.push((z0, z1));
        bounds1.push((x0, x1));
        bounds2.push((y0, y1));
    }

    Ok(GridfileData {
        ndims: [n3, n1, n2],
        bounds3,
        bounds1,
        bounds2,
    })
}

/// 写入网格边界文件（输入坐标单位为米）
pub fn write_gridfile(
    path: impl AsRef<Path>,
    ndims: [usize; 3],
    bounds_m: &[(f64, f64, f64, f64, f64, f64)],
) -> IoResult<()> {
    let ngbxs = ndims[0] * ndims[1] * ndims[2];
    CleoError::check_size("gridfile.bounds", ngbxs, bounds_m.len())?;

    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    writer.write_all(GRID_MAGIC)?;
    writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
    for n in ndims {
        writer.write_all(&(n as u64).to_le_bytes())?;
    }
    for &(z0, z1, x0, x1, y0, y1) in bounds_m {
        for v in [z0, z1, x0, x1, y0, y1] {
            writer.write_all(&v.to_le_bytes())?;
        }
    }
    writer.flush()?;
    Ok(())
}

// ============================================================================
// 初始液滴文件
// ============================================================================

/// 读取初始液滴文件并无量纲化
pub fn read_initsupers(path: impl AsRef<Path>) -> IoResult<InitSupersData> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    check_header(&mut reader, SUPERS_MAGIC, path)?;

    let n = read_u64(&mut reader, path)? as usize;
    let mut data = InitSupersData::default();

    for _ in 0..n {
        data.sdgbxindex.push(read_u32(&mut reader, path)?);
    }
    for _ in 0..n {
        data.xi.push(read_u64(&mut reader, path)?);
    }
    for _ in 0..n {
        data.radius.push(read_f64(&mut reader, path)? / dlc::R0);
    }
    for _ in 0..n {
        data.msol.push(read_f64(&mut reader, path)? / dlc::MASS0);
    }
    for _ in 0..n {
        data.coord3.push(read_f64(&mut reader, path)? / dlc::COORD0);
    }
    for _ in 0..n {
        data.coord1.push(read_f64(&mut reader, path)? / dlc::COORD0);
    }
    for _ in 0..n {
        data.coord2.push(read_f64(&mut reader, path)? / dlc::COORD0);
    }

    Ok(data)
}

/// 初始液滴文件的有量纲属性（写入用）
#[derive(Debug, Clone, Default)]
pub struct InitSupersFile {
    /// 所属网格盒索引
    pub sdgbxindex: Vec<u32>,
    /// 倍率
    pub xi: Vec<u64>,
    /// 半径 [m]
    pub radius_m: Vec<f64>,
    /// 溶质质量 [kg]
    pub msol_kg: Vec<f64>,
    /// 垂直坐标 [m]
    pub coord3_m: Vec<f64>,
    /// 水平坐标 1 [m]
    pub coord1_m: Vec<f64>,
    /// 水平坐标 2 [m]
    pub coord2_m: Vec<f64>,
}

/// 写入初始液滴文件
pub fn write_initsupers(path: impl AsRef<Path>, data: &InitSupersFile) -> IoResult<()> {
    let n = data.sdgbxindex.len();
    for (name, len) in [
        ("initsupers.xi", data.xi.len()),
        ("initsupers.radius", data.radius_m.len()),
        ("initsupers.msol", data.msol_kg.len()),
        ("initsupers.coord3", data.coord3_m.len()),
        ("initsupers.coord1", data.coord1_m.len()),
        ("initsupers.coord2", data.coord2_m.len()),
    ] {
        CleoError::check_size(name, n, len)?;
    }

    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    writer.write_all(SUPERS_MAGIC)?;
    writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
    writer.write_all(&(n as u64).to_le_bytes())?;

    for &v in &data.sdgbxindex {
        writer.write_all(&v.to_le_bytes())?;
    }
    for &v in &data.xi {
        writer.write_all(&v.to_le_bytes())?;
    }
    for vec in [
        &data.radius_m,
        &data.msol_kg,
        &data.coord3_m,
        &data.coord1_m,
        &data.coord2_m,
    ] {
        for &v in vec.iter() {
            writer.write_all(&v.to_le_bytes())?;
        }
    }
    writer.flush()?;
    Ok(())
}

// ============================================================================
// 热力学时间序列文件
// ============================================================================

/// 读取热力学时间序列并除以 `scale` 无量纲化
///
/// 返回形状 `[nsteps, ncols]` 的数组。
pub fn read_thermo_series(path: impl AsRef<Path>, scale: f64) -> IoResult<Array2<f64>> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    check_header(&mut reader, THERMO_MAGIC, path)?;

    let nsteps = read_u64(&mut reader, path)? as usize;
    let ncols = read_u64(&mut reader, path)? as usize;

    let mut values = Vec::with_capacity(nsteps * ncols);
    for _ in 0..nsteps * ncols {
        values.push(read_f64(&mut reader, path)? / scale);
    }

    Array2::from_shape_vec((nsteps, ncols), values)
        .map_err(|e| IoError::parse(path, format!("形状重建失败: {}", e)))
}

/// 写入热力学时间序列（有量纲值）
pub fn write_thermo_series(path: impl AsRef<Path>, data: &Array2<f64>) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    writer.write_all(THERMO_MAGIC)?;
    writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
    writer.write_all(&(data.nrows() as u64).to_le_bytes())?;
    writer.write_all(&(data.ncols() as u64).to_le_bytes())?;
    for &v in data.iter() {
        writer.write_all(&v.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

// ============================================================================
// 测试
// ============================================================================

// crates/cleo_io/src/setup.rs

//! setup 日志
//!
//! 启动时把配置记录与常数描述文件的内容合并写入
//! `setup_filename`，作为本次运行的可追溯记录。

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;
use log::info;

use crate::error::IoResult;

/// 写 setup 日志（config 文本 + constants 文件内容）
pub fn write_setup_log(
    setup_path: impl AsRef<Path>,
    config_text: &str,
    constants_path: impl AsRef<Path>,
) -> IoResult<()> {
    let setup_path = setup_path.as_ref();
    if let Some(parent) = setup_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let constants_text = fs::read_to_string(constants_path.as_ref()).unwrap_or_else(|_| {
        format!(
            "(常数文件 {} 不可读)\n",
            constants_path.as_ref().display()
        )
    });

    let mut writer = BufWriter::new(File::create(setup_path)?);
    writeln!(writer, "// CLEO setup 记录")?;
    writeln!(writer, "// 生成时间: {}", Local::now().to_rfc3339())?;
    writeln!(writer)?;
    writeln!(writer, "// ---------- 配置 ----------")?;
    writer.write_all(config_text.as_bytes())?;
    writeln!(writer)?;
    writeln!(writer, "// ---------- 常数 ----------")?;
    writer.write_all(constants_text.as_bytes())?;
    writer.flush()?;

    info!("setup 记录已写入 {}", setup_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_log_combines_files() {
        let dir = tempfile::tempdir().unwrap();
        let constants = dir.path().join("constants.txt");
        fs::write(&constants, "R0 = 1e-6\n").unwrap();

        let setup = dir.path().join("out/setup.txt");
        write_setup_log(&setup, "ngbxs: 8\n", &constants).unwrap();

        let text = fs::read_to_string(&setup).unwrap();
        assert!(text.contains("ngbxs: 8"));
        assert!(text.contains("R0 = 1e-6"));
    }

    #[test]
    fn test_missing_constants_noted() {
        let dir = tempfile::tempdir().unwrap();
        let setup = dir.path().join("setup.txt");
        write_setup_log(&setup, "a: 1\n", dir.path().join("nope.txt")).unwrap();

        let text = fs::read_to_string(&setup).unwrap();
        assert!(text.contains("不可读"));
    }
}

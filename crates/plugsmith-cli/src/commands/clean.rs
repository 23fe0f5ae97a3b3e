//! Clean command - remove objects and the built library

use anyhow::Result;
use plugsmith_build::{BuildContext, Builder, ToolchainConfig};
use std::path::PathBuf;
use tracing::info;

/// Run the clean command
///
/// The toolchain is irrelevant here, so a broken config file does not stop
/// a clean.
pub fn run(project_dir: Option<PathBuf>) -> Result<()> {
    let project_dir = project_dir.unwrap_or_else(|| PathBuf::from("."));
    let context = BuildContext::new(project_dir, ToolchainConfig::default())?;
    let builder = Builder::new(context);

    let report = builder.clean()?;
    info!(
        "removed {} object files{}",
        report.objects_removed,
        if report.output_removed {
            format!(" and {}", builder.context().output_path().display())
        } else {
            String::new()
        }
    );
    Ok(())
}

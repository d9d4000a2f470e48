//! JSON出力

use super::ReportSink;
use crate::error::Result;
use std::path::{Path, PathBuf};
use trm_rank_common::ComparisonReport;

pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl ReportSink for JsonSink {
    fn write_reports(&mut self, reports: &[ComparisonReport]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(reports)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), reports = reports.len(), "JSON保存");
        Ok(())
    }
}

/// 保存済みJSONを読み込む
pub fn load_reports(path: &Path) -> Result<Vec<ComparisonReport>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

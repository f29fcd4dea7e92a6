use crate::config::import_config::{ImportConfig, StoreKind};
use crate::core::upload::StagedUpload;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "member-import")]
#[command(about = "Bulk import association members from CSV or Excel files")]
pub struct CliConfig {
    /// Member list to import (.csv, .xls or .xlsx)
    #[arg(short, long, required_unless_present = "template")]
    pub file: Option<PathBuf>,

    /// Path to TOML import configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Membership API base URL; switches the store to HTTP
    #[arg(long)]
    pub store_endpoint: Option<String>,

    /// Directory for the report bundle
    #[arg(long)]
    pub output_path: Option<String>,

    /// Validate and check duplicates without creating memberships
    #[arg(long)]
    pub dry_run: bool,

    /// Skip writing the report bundle
    #[arg(long)]
    pub no_report: bool,

    /// Delete the input file once the import finishes (staged uploads)
    #[arg(long)]
    pub remove_input: bool,

    /// Write an empty member list template to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 載入 TOML（若有指定）並套用命令列覆蓋
    pub fn resolve_config(&self) -> Result<ImportConfig> {
        let mut config = match &self.config {
            Some(path) => ImportConfig::from_file(path)?,
            None => ImportConfig::default(),
        };

        if let Some(endpoint) = &self.store_endpoint {
            config.store.r#type = StoreKind::Http;
            config.store.endpoint = Some(endpoint.clone());
        }

        if let Some(output_path) = &self.output_path {
            config.report.output_path = output_path.clone();
        }

        if self.no_report {
            config.report.enabled = false;
        }

        Ok(config)
    }

    /// `--remove-input` 時輸入檔視為暫存檔，guard 被 drop 就刪除
    pub fn staged_upload(&self) -> Option<StagedUpload> {
        let file = self.file.as_ref()?;
        Some(if self.remove_input {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            StagedUpload::temporary(file, name)
        } else {
            StagedUpload::retained(file)
        })
    }
}

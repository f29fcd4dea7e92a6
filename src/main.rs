use anyhow::Context;
use clap::Parser;
use member_import::config::import_config::StoreKind;
use member_import::core::fields::template_headers;
use member_import::domain::ports::MembershipStore;
use member_import::utils::error::ErrorSeverity;
use member_import::utils::{logger, validation, validation::Validate};
use member_import::{
    CliConfig, DryRunStore, HttpMembershipStore, ImportConfig, ImportEngine, ImportPipeline,
    ImportResponse, InMemoryMembershipStore, LocalStorage,
};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Some(template) = &cli.template {
        write_template(template)?;
        println!("📝 Template written to {}", template.display());
        return Ok(());
    }

    tracing::info!("Starting member-import CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 先建立 guard，設定錯誤時暫存檔也會被刪除
    let upload = cli.staged_upload().context("--file is required")?;

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            drop(upload);
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        drop(upload);
        std::process::exit(1);
    }

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no memberships will be created");
    }

    let store = build_store(&config, cli.dry_run)?;
    let storage = LocalStorage::new(config.output_path());
    let pipeline = ImportPipeline::new(storage, store, config, upload);
    let engine = ImportEngine::new(pipeline);

    let result = engine.run().await;
    // 先釋放 Pipeline（含暫存檔），process::exit 不會執行 Drop
    drop(engine);

    match result {
        Ok(run) => {
            if let Some(path) = &run.report_path {
                eprintln!("📁 Report saved to: {}", path);
            }
            let response = ImportResponse::from_outcome(run.outcome);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Err(e) => {
            tracing::error!(
                "❌ Import failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn build_store(
    config: &ImportConfig,
    dry_run: bool,
) -> member_import::Result<Box<dyn MembershipStore>> {
    let store: Box<dyn MembershipStore> = match config.store.r#type {
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory store; memberships only live for this run");
            Box::new(InMemoryMembershipStore::new())
        }
        StoreKind::Http => Box::new(HttpMembershipStore::from_config(&config.store)?),
    };

    Ok(if dry_run {
        Box::new(DryRunStore::new(store))
    } else {
        store
    })
}

fn write_template(path: &Path) -> anyhow::Result<()> {
    validation::validate_file_extension("template", &path.to_string_lossy(), &["csv"])?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create template at {}", path.display()))?;
    writer.write_record(template_headers())?;
    writer.flush()?;
    Ok(())
}

use crate::core::{ImportOutcome, Pipeline};
use crate::utils::error::Result;

/// 一次匯入的結果：逐列結果與報表位置（若有寫出）
#[derive(Debug, Clone)]
pub struct ImportRun {
    pub outcome: ImportOutcome,
    pub report_path: Option<String>,
}

pub struct ImportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ImportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<ImportRun> {
        tracing::info!("🚀 Starting member import");

        let rows = self.pipeline.extract().await?;
        tracing::info!("📄 Extracted {} data rows", rows.len());

        let outcome = self.pipeline.transform(rows).await?;
        tracing::info!(
            "✅ {} imported, ❌ {} failed, {} total",
            outcome.success.len(),
            outcome.failed.len(),
            outcome.total
        );

        let report_path = self.pipeline.load(&outcome).await?;
        if let Some(path) = &report_path {
            tracing::info!("📁 Report saved to: {}", path);
        }

        Ok(ImportRun {
            outcome,
            report_path,
        })
    }
}

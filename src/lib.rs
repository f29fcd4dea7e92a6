pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::import_config::ImportConfig;
pub use config::LocalStorage;

pub use adapters::{DryRunStore, HttpMembershipStore, InMemoryMembershipStore};
pub use crate::core::{
    engine::{ImportEngine, ImportRun},
    pipeline::ImportPipeline,
    processor::{BulkImportProcessor, ProcessorSettings},
    upload::StagedUpload,
};
pub use domain::model::{ImportOutcome, ImportResponse};
pub use utils::error::{ImportError, Result, RowError, StoreError};

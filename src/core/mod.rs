pub mod engine;
pub mod fields;
pub mod member;
pub mod parser;
pub mod pipeline;
pub mod processor;
pub mod report;
pub mod upload;
pub mod validity;

pub use crate::domain::model::{ImportOutcome, SheetRow};
pub use crate::domain::ports::{MembershipStore, Pipeline, Storage};
pub use crate::utils::error::Result;

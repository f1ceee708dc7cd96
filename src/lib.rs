pub mod config;
pub mod core;
pub mod domain;
pub mod prompts;
pub mod utils;

pub use config::{api::ApiConfig, cli::LocalStorage, CliConfig};
pub use core::{
    compliance::ComplianceChecker,
    etl::EtlEngine,
    reference::{ReferenceKind, ReferencePipeline},
};
pub use utils::error::{MrlError, Result};

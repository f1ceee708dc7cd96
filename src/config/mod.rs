pub mod api;
pub mod cli;

use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "mrl-check")]
#[command(about = "EU pesticide MRL reference cache and compliance checker")]
pub struct CliConfig {
    /// Optional TOML file overriding the EU API endpoints
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Directory holding the reference cache files
    #[arg(long, global = true, default_value = ".")]
    pub cache_dir: String,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Download the EU product and active-substance reference data and
    /// write the local cache files
    BuildCache,

    /// Check a measured residue value against the applicable EU MRL
    Check {
        /// Product name (free text, matched against the cache)
        #[arg(long)]
        product: String,

        /// Active substance name (free text, matched against the cache)
        #[arg(long)]
        substance: String,

        /// Measured MRL value from the laboratory report
        #[arg(long)]
        mrl: f64,
    },

    /// Render each page of a lab-report PDF as a base64 PNG image
    ConvertPdf {
        /// Path to the PDF file
        path: String,

        /// Write the JSON array of images to this file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// List every applicable MRL rule currently in force for a product
    ListMrls {
        /// Product name (free text, matched against the cache)
        #[arg(long)]
        product: String,
    },
}

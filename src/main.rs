use clap::Parser;
use mrl_check::config::Command;
use mrl_check::core::{fetch, imaging, mrl};
use mrl_check::utils::{logger, validation, validation::Validate};
use mrl_check::{
    ApiConfig, CliConfig, ComplianceChecker, EtlEngine, LocalStorage, MrlError, ReferenceKind,
    ReferencePipeline,
};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting mrl-check CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let api_config = match &cli.config {
        Some(path) => ApiConfig::from_file(path)?,
        None => ApiConfig::default(),
    };

    if let Err(e) = api_config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let storage = LocalStorage::new(cli.cache_dir.clone());

    if let Err(e) = run(cli.command, api_config, storage).await {
        tracing::error!("{}", e);
        eprintln!("{}", e);

        let exit_code = match e {
            MrlError::NotFound { .. } => 2,
            _ => 1,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(command: Command, config: ApiConfig, storage: LocalStorage) -> mrl_check::Result<()> {
    match command {
        Command::BuildCache => {
            for kind in [ReferenceKind::Products, ReferenceKind::Substances] {
                let pipeline = ReferencePipeline::new(storage.clone(), config.clone(), kind)?;
                let output = EtlEngine::new(pipeline).run().await?;
                println!("Cache file written: {}", output);
            }
        }

        Command::Check {
            product,
            substance,
            mrl,
        } => {
            validation::validate_non_empty_string("product", &product)?;
            validation::validate_non_empty_string("substance", &substance)?;

            let checker = ComplianceChecker::new(storage, config)?;
            match checker.check(&product, &substance, mrl).await? {
                Some(report) => {
                    println!("MRL value from EU database: {}", report.reference);
                    println!("MRL value from report: {}", report.measured);
                    println!();
                    println!("{}", "=".repeat(50));
                    println!("COMPLIANCE RESULT:");
                    println!("{}", "=".repeat(50));
                    println!("{}", report.verdict);
                }
                None => {
                    println!(
                        "No MRL data found for product '{}' and substance '{}'.",
                        product, substance
                    );
                }
            }
        }

        Command::ConvertPdf { path, output } => {
            let images = imaging::pdf_to_base64_images(Path::new(&path)).await?;
            let json = serde_json::to_string(&images)?;

            match output {
                Some(file) => {
                    std::fs::write(&file, json)?;
                    println!("Wrote {} page image(s) to {}", images.len(), file);
                }
                None => println!("{}", json),
            }
        }

        Command::ListMrls { product } => {
            validation::validate_non_empty_string("product", &product)?;

            let checker = ComplianceChecker::new(storage, config.clone())?;
            let product_id = checker.resolve_product(&product).await?;

            let client = fetch::build_client(&config)?;
            let rules = mrl::product_mrls(&client, &config, &product_id).await?;

            if rules.is_empty() {
                println!("No applicable MRL rules found for product '{}'.", product);
            }
            for rule in &rules {
                let name = rule
                    .get_str("pesticide_residue_name")
                    .unwrap_or("unknown substance");
                let value = rule.get_str("mrl_value").unwrap_or("-");
                println!("{}: {}", name, value);
            }
        }
    }

    Ok(())
}

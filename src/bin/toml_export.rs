use brake_export::config::toml_config::{SourceType, TomlConfig};
use brake_export::domain::ports::ExportSettings;
use brake_export::utils::{logger, validation::Validate};
use brake_export::{CsvExporter, ExportEngine, ExportOutcome, LocalDirSink};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-export")]
#[command(about = "CSV export driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "export-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the base file name from config
    #[arg(long)]
    filename: Option<String>,

    /// Dry run - show what would be exported without fetching or writing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_with_level(config.log_level(), args.verbose);
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(filename) = &args.filename {
        config.export.filename = filename.clone();
        tracing::info!("🔧 File name overridden to: {}", filename);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(());
    }

    let source = config.record_source()?;
    let exporter = CsvExporter::from_settings(LocalDirSink::new(config.output_path()), &config);
    let engine = ExportEngine::new(source, exporter, config.file_name());

    match engine.run().await {
        Ok(ExportOutcome::Delivered { location, rows, .. }) => {
            println!("✅ Export completed successfully!");
            println!("📁 {} rows saved to: {}", rows, location);
        }
        Ok(ExportOutcome::Skipped) => {
            println!("⚠️ Source returned no records; nothing was written");
        }
        Err(e) => {
            tracing::error!(
                "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  File: {}.csv", config.file_name());
    println!("  Output: {}", config.output_path());
    match config.source.r#type {
        SourceType::File => {
            println!("  Source: file {}", config.source.path.as_deref().unwrap_or("-"));
        }
        SourceType::Api => {
            println!(
                "  Source: {} (limit {}, offset {})",
                config.source.endpoint.as_deref().unwrap_or("-"),
                config.page_limit(),
                config.page_offset()
            );
            if let Some(headers) = &config.source.headers {
                println!("  Headers: {} custom headers", headers.len());
            }
        }
    }
    println!("  Header quoting: {:?}", config.header_quoting());
    println!("  Record policy: {:?}", config.record_policy());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

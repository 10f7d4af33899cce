use brake_export::config::cli::{CheckArgs, Command, ExportArgs, TemplateArgs};
use brake_export::core::importer;
use brake_export::domain::ports::{DownloadSink, ExportSettings, RecordSource};
use brake_export::utils::{logger, validation::Validate};
use brake_export::{
    ApiSource, CliConfig, CsvExporter, ExportEngine, ExportError, ExportOptions, ExportOutcome,
    JsonFileSource, LocalDirSink, StdoutSink,
};
use clap::Parser;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    let result = match &config.command {
        Command::Export(args) => run_export(args).await,
        Command::Template(args) => run_template(args).await,
        Command::Check(args) => run_check(args),
    };

    match result {
        Ok(()) => {}
        Err(e) => {
            tracing::error!(
                "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}

async fn run_export(args: &ExportArgs) -> Result<(), ExportError> {
    args.validate()?;

    let source: Box<dyn RecordSource> = match (&args.input, &args.endpoint) {
        (_, Some(endpoint)) => Box::new(ApiSource::new(endpoint.clone())?.page(args.limit, args.offset)),
        (Some(input), None) => Box::new(JsonFileSource::new(input)),
        (None, None) => {
            return Err(ExportError::MissingConfigError {
                field: "input or endpoint".to_string(),
            })
        }
    };

    if args.stdout {
        let exporter = CsvExporter::from_settings(StdoutSink, args);
        report(ExportEngine::new(source, exporter, args.file_name()).run().await?);
    } else {
        let exporter = CsvExporter::from_settings(LocalDirSink::new(args.output_path()), args);
        report(ExportEngine::new(source, exporter, args.file_name()).run().await?);
    }
    Ok(())
}

async fn run_template(args: &TemplateArgs) -> Result<(), ExportError> {
    args.validate()?;

    let options = ExportOptions {
        header_quoting: args.header_quoting,
        ..ExportOptions::default()
    };
    if args.stdout {
        write_template(CsvExporter::with_options(StdoutSink, options), args).await
    } else {
        let sink = LocalDirSink::new(args.output_path.clone());
        write_template(CsvExporter::with_options(sink, options), args).await
    }
}

async fn write_template<S: DownloadSink>(
    exporter: CsvExporter<S>,
    args: &TemplateArgs,
) -> Result<(), ExportError> {
    report(exporter.export_template(&args.headers, &args.filename).await?);
    Ok(())
}

fn run_check(args: &CheckArgs) -> Result<(), ExportError> {
    args.validate()?;

    let file = std::fs::File::open(&args.file)?;
    let records = importer::import_csv(file, &args.headers)?;
    println!(
        "✅ {} has every required column ({} rows)",
        args.file,
        records.len()
    );
    Ok(())
}

fn report(outcome: ExportOutcome) {
    match outcome {
        ExportOutcome::Delivered {
            file_name,
            location,
            rows,
        } => {
            // stdout 模式下 CSV 已寫入 stdout，摘要改走 stderr
            eprintln!("✅ {} ({} rows) saved to: {}", file_name, rows, location);
        }
        ExportOutcome::Skipped => {
            eprintln!("⚠️ No data to export");
        }
    }
}

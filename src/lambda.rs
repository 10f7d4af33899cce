use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;
use brake_export::adapters::source::records_from_json;
use brake_export::config::LambdaConfig;
use brake_export::utils::{logger, validation::Validate};
use brake_export::{CsvExporter, ExportOptions, ExportOutcome, RecordPolicy, S3Sink};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct Request {
    pub filename: String,
    /// Array of records, or the dashboard's `{"data": [...]}` envelope.
    pub records: serde_json::Value,
    #[serde(default)]
    pub strict: bool,
}

#[derive(Serialize)]
pub struct Response {
    pub message: String,
    pub location: Option<String>,
    pub rows: usize,
}

async fn function_handler(
    event: LambdaEvent<Request>,
    exporter: &CsvExporter<S3Sink>,
) -> Result<Response, Error> {
    let request = event.payload;
    tracing::info!("Export requested for '{}'", request.filename);

    brake_export::utils::validation::validate_file_name("filename", &request.filename)?;
    let records = records_from_json(request.records)?;

    let exporter_for_request;
    let exporter = if request.strict {
        exporter_for_request = CsvExporter::with_options(
            exporter.sink().clone(),
            ExportOptions {
                record_policy: RecordPolicy::Strict,
                ..*exporter.options()
            },
        );
        &exporter_for_request
    } else {
        exporter
    };

    let response = match exporter.export(&records, &request.filename).await? {
        ExportOutcome::Delivered { location, rows, .. } => Response {
            message: "Export completed successfully".to_string(),
            location: Some(location),
            rows,
        },
        ExportOutcome::Skipped => Response {
            message: "No data to export".to_string(),
            location: None,
            rows: 0,
        },
    };

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let lambda_config = LambdaConfig::from_env()?;
    lambda_config.validate()?;

    // 創建AWS配置和S3客戶端
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_config = aws_sdk_s3::config::Builder::from(&config)
        .region(Region::new(lambda_config.s3_region.clone()))
        .force_path_style(true)
        .build();
    let s3_client = S3Client::from_conf(s3_config);

    let sink = S3Sink::new(s3_client, lambda_config.s3_bucket, lambda_config.s3_prefix);
    let exporter = CsvExporter::new(sink);

    run(service_fn(|event| function_handler(event, &exporter))).await
}

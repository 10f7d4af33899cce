use crate::domain::model::{HeaderQuoting, RecordPolicy};
use crate::domain::ports::ExportSettings;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_name, validate_non_empty_string, validate_path, validate_range, validate_url,
    Validate,
};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "brake-export")]
#[command(about = "Export brake production dashboard tables as CSV files")]
pub struct CliConfig {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Export records from a JSON file or a dashboard API route
    Export(ExportArgs),
    /// Write an empty CSV template with the given columns
    Template(TemplateArgs),
    /// Check that a CSV file carries every template column
    Check(CheckArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Base file name, without the .csv extension
    #[arg(long)]
    pub filename: String,

    /// JSON file holding the records ('-' for stdin)
    #[arg(long, conflicts_with = "endpoint", required_unless_present = "endpoint")]
    pub input: Option<String>,

    /// Dashboard API route, e.g. http://localhost:3006/api/production
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long, default_value_t = 500)]
    pub limit: usize,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    #[arg(long, default_value = "./exports")]
    pub output_path: String,

    /// Write the CSV to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    #[arg(long, value_enum, default_value_t = HeaderQuoting::AsNeeded)]
    pub header_quoting: HeaderQuoting,

    /// Fail when a record's fields differ from the first record's
    #[arg(long)]
    pub strict: bool,
}

impl ExportSettings for ExportArgs {
    fn file_name(&self) -> &str {
        &self.filename
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn header_quoting(&self) -> HeaderQuoting {
        self.header_quoting
    }

    fn record_policy(&self) -> RecordPolicy {
        if self.strict {
            RecordPolicy::Strict
        } else {
            RecordPolicy::Lenient
        }
    }
}

impl Validate for ExportArgs {
    fn validate(&self) -> Result<()> {
        validate_file_name("filename", &self.filename)?;
        if let Some(input) = &self.input {
            validate_path("input", input)?;
        }
        if let Some(endpoint) = &self.endpoint {
            validate_url("endpoint", endpoint)?;
            validate_range("limit", self.limit, 1, 10_000)?;
        }
        if !self.stdout {
            validate_path("output_path", &self.output_path)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
pub struct TemplateArgs {
    /// Column names, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub headers: Vec<String>,

    #[arg(long, default_value = "template")]
    pub filename: String,

    #[arg(long, default_value = "./exports")]
    pub output_path: String,

    #[arg(long)]
    pub stdout: bool,

    #[arg(long, value_enum, default_value_t = HeaderQuoting::AsNeeded)]
    pub header_quoting: HeaderQuoting,
}

impl Validate for TemplateArgs {
    fn validate(&self) -> Result<()> {
        validate_file_name("filename", &self.filename)?;
        for header in &self.headers {
            validate_non_empty_string("headers", header)?;
        }
        if !self.stdout {
            validate_path("output_path", &self.output_path)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// CSV file to check
    #[arg(long)]
    pub file: String,

    /// Required column names, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub headers: Vec<String>,
}

impl Validate for CheckArgs {
    fn validate(&self) -> Result<()> {
        validate_path("file", &self.file)
    }
}

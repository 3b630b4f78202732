//! CSV file source.

use super::{load_table, DataSource, LOAD_TABLE};
use crate::analyzers::inference::InferenceConfig;
use crate::core::Dataset;
use crate::error::{DqmError, Result};
use async_trait::async_trait;
use datafusion::prelude::{CsvReadOptions, SessionContext};
use std::path::Path;
use tracing::{info, instrument};

/// Options for reading delimited files.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the file starts with a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Maximum records read for Arrow schema inference
    pub schema_infer_max_records: usize,
    /// Settings for inferring the dataset column types
    pub inference: InferenceConfig,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            schema_infer_max_records: 1000,
            inference: InferenceConfig::default(),
        }
    }
}

/// A delimited text file.
///
/// The file extension is taken from the path, so `.tsv` and `.txt` files work
/// as long as the delimiter is set accordingly.
///
/// ```rust,no_run
/// use dqm_guard::sources::{CsvOptions, CsvSource, DataSource};
///
/// # async fn example() -> dqm_guard::error::Result<()> {
/// let options = CsvOptions {
///     delimiter: b'\t',
///     ..Default::default()
/// };
/// let dataset = CsvSource::with_options("collections.tsv", options)?.load().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: String,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a CSV source with default options.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        Self::with_options(path, CsvOptions::default())
    }

    /// Creates a CSV source with custom options.
    pub fn with_options(path: impl Into<String>, options: CsvOptions) -> Result<Self> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(DqmError::Configuration(
                "A file path must be provided".to_string(),
            ));
        }
        Ok(Self { path, options })
    }

    /// Returns the file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Registers the file as `table_name` in `ctx`.
    #[instrument(skip(self, ctx), fields(
        table.name = %table_name,
        source.type = "csv",
        csv.delimiter = %self.options.delimiter as char,
        csv.has_header = self.options.has_header
    ))]
    pub async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        info!(
            table.name = %table_name,
            source.path = %self.path,
            "Registering CSV data source"
        );

        let extension = Path::new(&self.path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(&extension);

        ctx.register_csv(table_name, &self.path, options).await?;
        Ok(())
    }
}

#[async_trait]
impl DataSource for CsvSource {
    async fn load(&self) -> Result<Dataset> {
        let ctx = SessionContext::new();
        self.register(&ctx, LOAD_TABLE).await?;
        load_table(&ctx, LOAD_TABLE, &self.options.inference).await
    }

    fn description(&self) -> String {
        format!("CSV file: {}", self.path)
    }
}

//! JSON and NDJSON file source.

use super::{load_table, DataSource, LOAD_TABLE};
use crate::analyzers::inference::InferenceConfig;
use crate::core::{Dataset, Row};
use crate::error::{DqmError, ErrorContext, Result};
use async_trait::async_trait;
use datafusion::prelude::{NdJsonReadOptions, SessionContext};
use std::path::Path;
use tracing::{info, instrument};

/// Layout of a JSON file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonFormatType {
    /// One JSON object per line
    NdJson,
    /// A single array of objects
    Json,
}

impl JsonFormatType {
    /// Detects the layout from the file extension.
    ///
    /// `.ndjson` and `.jsonl` are line-delimited; everything else is treated as
    /// an array document.
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_lowercase();
        if lower.ends_with(".ndjson") || lower.ends_with(".jsonl") {
            Self::NdJson
        } else {
            Self::Json
        }
    }
}

/// Options for reading JSON files.
#[derive(Debug, Clone)]
pub struct JsonOptions {
    /// File layout
    pub format: JsonFormatType,
    /// Maximum records read for Arrow schema inference (NDJSON only)
    pub schema_infer_max_records: usize,
    /// Settings for inferring the dataset column types
    pub inference: InferenceConfig,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            format: JsonFormatType::NdJson,
            schema_infer_max_records: 1000,
            inference: InferenceConfig::default(),
        }
    }
}

/// A JSON file of row objects.
///
/// Line-delimited files are read through DataFusion. Array documents are
/// deserialized directly, which keeps the key order of every object.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: String,
    options: JsonOptions,
}

impl JsonSource {
    /// Creates a JSON source, detecting the layout from the extension.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let format = JsonFormatType::from_path(&path);
        Self::with_options(
            path,
            JsonOptions {
                format,
                ..Default::default()
            },
        )
    }

    /// Creates a JSON source with custom options.
    pub fn with_options(path: impl Into<String>, options: JsonOptions) -> Result<Self> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(DqmError::Configuration(
                "A file path must be provided".to_string(),
            ));
        }
        Ok(Self { path, options })
    }

    /// Returns the file layout.
    pub fn format(&self) -> JsonFormatType {
        self.options.format
    }

    /// Registers a line-delimited file as `table_name` in `ctx`.
    ///
    /// Array documents cannot be registered and return a configuration error.
    #[instrument(skip(self, ctx), fields(table.name = %table_name, source.type = "json"))]
    pub async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        if self.options.format != JsonFormatType::NdJson {
            return Err(DqmError::Configuration(format!(
                "Only line-delimited JSON can be registered as a table: {}",
                self.path
            )));
        }

        info!(table.name = %table_name, source.path = %self.path, "Registering NDJSON data source");

        let extension = Path::new(&self.path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let mut options = NdJsonReadOptions::default().file_extension(&extension);
        options.schema_infer_max_records = self.options.schema_infer_max_records;

        ctx.register_json(table_name, &self.path, options).await?;
        Ok(())
    }

    async fn load_document(&self) -> Result<Dataset> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| {
                DqmError::data_source_with_source("JSON", format!("Could not read {}", self.path), Box::new(e))
            })?;
        let rows: Vec<Row> = serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON array in {}", self.path))?;
        Ok(Dataset::from_rows_with_config(rows, &self.options.inference))
    }
}

#[async_trait]
impl DataSource for JsonSource {
    async fn load(&self) -> Result<Dataset> {
        match self.options.format {
            JsonFormatType::NdJson => {
                let ctx = SessionContext::new();
                self.register(&ctx, LOAD_TABLE).await?;
                load_table(&ctx, LOAD_TABLE, &self.options.inference).await
            }
            JsonFormatType::Json => self.load_document().await,
        }
    }

    fn description(&self) -> String {
        format!("JSON file: {}", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(JsonFormatType::from_path("rows.ndjson"), JsonFormatType::NdJson);
        assert_eq!(JsonFormatType::from_path("rows.JSONL"), JsonFormatType::NdJson);
        assert_eq!(JsonFormatType::from_path("rows.json"), JsonFormatType::Json);
        assert_eq!(JsonSource::new("a.jsonl").unwrap().format(), JsonFormatType::NdJson);
    }

    #[tokio::test]
    async fn test_array_document_cannot_be_registered() {
        let source = JsonSource::new("rows.json").unwrap();
        let err = source
            .register(&SessionContext::new(), "rows")
            .await
            .unwrap_err();
        assert!(matches!(err, DqmError::Configuration(_)));
    }
}

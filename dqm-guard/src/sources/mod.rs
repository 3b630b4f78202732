//! Loaders that turn files into [`Dataset`]s.
//!
//! Delimited and line-delimited JSON files are read through a DataFusion
//! [`SessionContext`]; the collected Arrow batches are then converted cell by
//! cell into [`CellValue`]s and column types are inferred from the values.
//!
//! ```rust,no_run
//! use dqm_guard::sources::{CsvSource, DataSource};
//!
//! # async fn example() -> dqm_guard::error::Result<()> {
//! let dataset = CsvSource::new("collections.csv")?.load().await?;
//! println!("{} rows", dataset.len());
//! # Ok(())
//! # }
//! ```

use crate::analyzers::inference::{ColumnTypeInference, InferenceConfig};
use crate::core::{CellValue, Column, Dataset, Row};
use crate::error::Result;
use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use std::fmt::Debug;
use tracing::{debug, instrument};

mod csv;
mod json;

pub use self::csv::{CsvOptions, CsvSource};
pub use self::json::{JsonFormatType, JsonOptions, JsonSource};

/// Table name used when a source is loaded on its own.
pub(crate) const LOAD_TABLE: &str = "dqm_input";

/// A file-backed data source.
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Reads the whole source into memory.
    async fn load(&self) -> Result<Dataset>;

    /// Returns a human-readable description of this data source.
    fn description(&self) -> String;
}

/// Collects a table registered in `ctx` and converts it into a [`Dataset`].
///
/// Works with any table provider, not only the sources in this module.
#[instrument(skip(ctx, inference))]
pub async fn load_table(
    ctx: &SessionContext,
    table_name: &str,
    inference: &InferenceConfig,
) -> Result<Dataset> {
    let batches = ctx.table(table_name).await?.collect().await?;
    batches_to_dataset(&batches, inference)
}

/// Converts Arrow record batches into a [`Dataset`].
///
/// Nulls become [`CellValue::Null`], integer and float columns become
/// numbers, booleans stay booleans and everything else is rendered as text.
/// Column order follows the schema of the first batch; column types are
/// inferred from the converted values, not taken from the Arrow schema.
#[instrument(skip(batches, inference), fields(batches = batches.len()))]
pub fn batches_to_dataset(batches: &[RecordBatch], inference: &InferenceConfig) -> Result<Dataset> {
    let Some(first) = batches.first() else {
        return Ok(Dataset::default());
    };
    let schema = first.schema();
    let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

    let mut rows: Vec<Row> = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());
    for batch in batches {
        let columns = batch
            .columns()
            .iter()
            .map(CellColumn::try_new)
            .collect::<Result<Vec<_>>>()?;

        for index in 0..batch.num_rows() {
            let mut row = Row::new();
            for (name, column) in names.iter().zip(&columns) {
                row.insert(name.clone(), column.value(index)?);
            }
            rows.push(row);
        }
    }

    let inference = ColumnTypeInference::new(inference.clone());
    let columns = names
        .into_iter()
        .map(|name| {
            let column_type = inference.infer(&rows, &name);
            Column::new(name, column_type)
        })
        .collect();

    debug!(rows = rows.len(), "Converted record batches");
    Ok(Dataset::new(columns, rows))
}

/// An Arrow column viewed as cells.
enum CellColumn {
    Number(Float64Array),
    Bool(BooleanArray),
    Display(ArrayRef),
}

impl CellColumn {
    fn try_new(array: &ArrayRef) -> Result<Self> {
        let data_type = array.data_type();
        if data_type.is_numeric() {
            let numbers = cast(array, &DataType::Float64)?;
            if let Some(numbers) = numbers.as_any().downcast_ref::<Float64Array>() {
                return Ok(Self::Number(numbers.clone()));
            }
        }
        if let Some(flags) = array.as_any().downcast_ref::<BooleanArray>() {
            return Ok(Self::Bool(flags.clone()));
        }
        Ok(Self::Display(array.clone()))
    }

    fn value(&self, index: usize) -> Result<CellValue> {
        let value = match self {
            Self::Number(array) if array.is_null(index) => CellValue::Null,
            Self::Number(array) => CellValue::Number(array.value(index)),
            Self::Bool(array) if array.is_null(index) => CellValue::Null,
            Self::Bool(array) => CellValue::Bool(array.value(index)),
            Self::Display(array) if array.is_null(index) => CellValue::Null,
            Self::Display(array) => CellValue::Text(array_value_to_string(array, index)?),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ColumnType;
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("RID", DataType::Utf8, true),
            Field::new("Area", DataType::Int64, true),
            Field::new("Irrigated", DataType::Boolean, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![Some("R1"), None])),
                Arc::new(Int64Array::from(vec![Some(12), None])),
                Arc::new(BooleanArray::from(vec![Some(true), Some(false)])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_batches_to_dataset() {
        let dataset = batches_to_dataset(&[batch()], &InferenceConfig::default()).unwrap();

        assert_eq!(dataset.column_names(), vec!["RID", "Area", "Irrigated"]);
        assert_eq!(dataset.column("Area").unwrap().column_type, ColumnType::Number);
        assert_eq!(dataset.column("RID").unwrap().column_type, ColumnType::String);

        let first = &dataset.rows()[0];
        assert_eq!(first.get("RID"), Some(&CellValue::from("R1")));
        assert_eq!(first.get("Area"), Some(&CellValue::Number(12.0)));
        assert_eq!(first.get("Irrigated"), Some(&CellValue::Bool(true)));

        let second = &dataset.rows()[1];
        assert_eq!(second.get("RID"), Some(&CellValue::Null));
        assert_eq!(second.get("Area"), Some(&CellValue::Null));
    }

    #[test]
    fn test_no_batches() {
        let dataset = batches_to_dataset(&[], &InferenceConfig::default()).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.columns().is_empty());
    }
}

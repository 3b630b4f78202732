//! Sample datasets and rule tables shared by unit tests, integration tests
//! and benchmarks.
//!
//! The collection sheet follows the headers of
//! [`MANDATORY_HEADERS`](crate::rules::catalog::MANDATORY_HEADERS) so the
//! built-in catalog applies to it.

use crate::core::{Dataset, Row};
use crate::error::Result;
use crate::rules::catalog::{
    AGRICULTURE_AREA, SOWING_1_AREA, SOWING_2_ACR, SOWING_2_AREA, SOWING_3_AREA,
};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::prelude::*;
use std::sync::Arc;

/// Four rows with a `value` and a `target` column.
///
/// `value > target` holds for rows 1 and 3; `sum(value)` is 100 and
/// `sum(target)` is 90.
pub fn comparison_dataset() -> Dataset {
    Dataset::from_rows(vec![
        Row::new().with("value", 10).with("target", 5),
        Row::new().with("value", 20).with("target", 25),
        Row::new().with("value", 30).with("target", 15),
        Row::new().with("value", 40).with("target", 45),
    ])
}

#[allow(clippy::too_many_arguments)]
fn collection_row(
    rid: &str,
    village: &str,
    agri: f64,
    sowing_1: f64,
    sowing_1_pct: f64,
    sowing_2: f64,
    sowing_2_pct: f64,
    acr: &str,
) -> Row {
    Row::new()
        .with("RID", rid)
        .with("Village", village)
        .with(AGRICULTURE_AREA, agri)
        .with(SOWING_1_AREA, sowing_1)
        .with("Sowing 1 Percentage", sowing_1_pct)
        .with(SOWING_2_AREA, sowing_2)
        .with("Sowing 2 Percentage", sowing_2_pct)
        .with(SOWING_2_ACR, acr)
        .with(SOWING_3_AREA, 0)
        .with("Sowing 3 Percentage", 0)
}

/// A small crop collection sheet checked by the built-in catalog.
///
/// | Row | Outcome |
/// |---|---|
/// | 1 | passes |
/// | 2 | Sowing 1 % above 100 |
/// | 3 | Sowing 2 area smaller than Sowing 1 area |
/// | 4 | Sowing 2 is zero but an ACR is present |
/// | 5 | Sowing 1 % above 100 and the latest sowing area (Sowing 1) above the agriculture area |
/// | 6 | duplicate of row 1, passes |
pub fn collection_sheet() -> Dataset {
    let first = collection_row("R1", "Alpha", 100.0, 40.0, 40.0, 60.0, 60.0, "Maize");
    Dataset::from_rows(vec![
        first.clone(),
        collection_row("R2", "Beta", 50.0, 30.0, 120.0, 35.0, 70.0, "Paddy"),
        collection_row("R3", "Gamma", 80.0, 50.0, 62.5, 20.0, 25.0, "Wheat"),
        collection_row("R4", "Delta", 60.0, 30.0, 50.0, 0.0, 0.0, "Gram"),
        collection_row("R5", "Epsilon", 40.0, 45.0, 112.5, 0.0, 0.0, ""),
        first,
    ])
}

/// Plot-level rows where the agriculture area repeats for every plot of an
/// entity.
///
/// Entity `R1` has agriculture area 40 and crop areas 30 and 15; entity `R2`
/// has agriculture area 25 and crop areas 20 and 5.
pub fn grouped_dataset() -> Dataset {
    Dataset::from_rows(vec![
        Row::new().with("RID", "R1").with("Agri", 40).with("Crop", 30),
        Row::new().with("RID", "R1").with("Agri", 40).with("Crop", 15),
        Row::new().with("RID", "R2").with("Agri", 25).with("Crop", 20),
        Row::new().with("RID", "R2").with("Agri", 25).with("Crop", 5),
    ])
}

fn rule_row(fields: &[(&str, &str)]) -> Row {
    Row::from_pairs(fields.iter().map(|(k, v)| (*k, *v)))
}

/// A rule table with two row rules and one grouped aggregate rule.
pub fn qc_rule_table() -> Vec<Row> {
    vec![
        rule_row(&[
            ("QC_Check_Name", "Sowing 1 % Max"),
            ("Level", "Row"),
            ("Target_Column", "Sowing 1 Percentage"),
            ("Condition", "'<="),
            ("Compare_Against", "100"),
        ]),
        rule_row(&[
            ("QC_Check_Name", "Sowing 2 After Sowing 1"),
            ("Level", "Row"),
            ("Target_Column", SOWING_2_AREA),
            ("Condition", ">="),
            ("Compare_Against", SOWING_1_AREA),
            ("Is_Compare_Column", "TRUE"),
        ]),
        rule_row(&[
            ("QC_Check_Name", "Total Agri Area"),
            ("Level", "Agg"),
            ("Target_Column", AGRICULTURE_AREA),
            ("Condition", "lte"),
            ("Compare_Against", "300"),
            ("Aggregation", "Sum"),
            ("Group_By", "RID"),
        ]),
    ]
}

/// A record batch with the first collection columns and one null area.
pub fn collection_batch() -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("RID", DataType::Utf8, false),
        Field::new(AGRICULTURE_AREA, DataType::Float64, true),
        Field::new(SOWING_1_AREA, DataType::Float64, true),
        Field::new("Sowing 1 Percentage", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec!["R1", "R2", "R3"])),
            Arc::new(Float64Array::from(vec![Some(100.0), Some(50.0), None])),
            Arc::new(Float64Array::from(vec![Some(40.0), Some(30.0), Some(10.0)])),
            Arc::new(Float64Array::from(vec![Some(40.0), Some(120.0), None])),
        ],
    )?;
    Ok(batch)
}

/// Creates a context with [`collection_batch`] registered as `collections`.
pub async fn create_collections_context() -> Result<SessionContext> {
    let ctx = SessionContext::new();
    let batch = collection_batch()?;
    let table = MemTable::try_new(batch.schema(), vec![vec![batch]])?;
    ctx.register_table("collections", Arc::new(table))?;
    Ok(ctx)
}

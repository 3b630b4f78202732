//! Integration tests for data sources.

use dqm_guard::analyzers::inference::InferenceConfig;
use dqm_guard::core::{CellValue, ColumnType};
use dqm_guard::engine::RuleEngine;
use dqm_guard::error::DqmError;
use dqm_guard::rules::catalog::standard_rules;
use dqm_guard::sources::{
    load_table, CsvOptions, CsvSource, DataSource, JsonFormatType, JsonSource,
};
use datafusion::prelude::SessionContext;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

const COLLECTION_CSV: &str = "\
RID,Village,Total Agriculture Area (ha),Sowing 1 Area (ha),Sowing 1 Percentage,Sowing2 Area (ha),Sowing 2 Percentage,Sowing 2 ACR
R1,Alpha,100,40,40,60,60,Maize
R2,Beta,50,30,120,35,70,Paddy
R3,Gamma,80,50,62.5,20,25,Wheat
R4,Delta,60,30,50,0,0,Gram
R5,Epsilon,40,45,112.5,0,0,
R1,Alpha,100,40,40,60,60,Maize
";

fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_csv_source_loads_collection_sheet() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "collections.csv", COLLECTION_CSV);

    let dataset = CsvSource::new(path).unwrap().load().await.unwrap();

    assert_eq!(dataset.len(), 6);
    assert_eq!(dataset.column_names()[0], "RID");
    assert_eq!(
        dataset.column("Sowing 1 Percentage").unwrap().column_type,
        ColumnType::Number
    );
    assert_eq!(dataset.column("Village").unwrap().column_type, ColumnType::String);
    assert_eq!(
        dataset.rows()[2].get("Sowing 1 Percentage"),
        Some(&CellValue::Number(62.5))
    );
    assert!(dataset.rows()[4].get("Sowing 2 ACR").unwrap().is_blank());
}

#[tokio::test]
async fn test_csv_to_catalog_pipeline() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "collections.csv", COLLECTION_CSV);
    let dataset = CsvSource::new(path).unwrap().load().await.unwrap();

    let result = RuleEngine::default().execute(&dataset, &standard_rules());

    assert_eq!(result.summary.passed, 2);
    assert_eq!(result.summary.failed, 4);
    assert_eq!(result.summary.pass_percentage_label(), "33.3");
    assert_eq!(result.results[5].duplicate_of, Some(1));
}

#[tokio::test]
async fn test_tab_delimited_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "areas.tsv", "RID\tArea\nR1\t12\nR2\t7.5\n");

    let options = CsvOptions {
        delimiter: b'\t',
        ..Default::default()
    };
    let dataset = CsvSource::with_options(path, options)
        .unwrap()
        .load()
        .await
        .unwrap();

    assert_eq!(dataset.column_names(), vec!["RID", "Area"]);
    assert_eq!(dataset.rows()[1].get("Area"), Some(&CellValue::Number(7.5)));
}

#[tokio::test]
async fn test_ndjson_source() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "plots.ndjson",
        "{\"RID\": \"R1\", \"Agri\": 40, \"Crop\": 30}\n\
         {\"RID\": \"R1\", \"Agri\": 40, \"Crop\": 15}\n\
         {\"RID\": \"R2\", \"Agri\": 25, \"Crop\": null}\n",
    );

    let source = JsonSource::new(path).unwrap();
    assert_eq!(source.format(), JsonFormatType::NdJson);

    let dataset = source.load().await.unwrap();
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.column("Agri").unwrap().column_type, ColumnType::Number);
    assert_eq!(dataset.rows()[2].get("Crop"), Some(&CellValue::Null));
}

#[tokio::test]
async fn test_json_array_keeps_key_order() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "plots.json",
        r##"[
            {"RID": "R1", "Village": "Alpha", "Area": 12.5, "Irrigated": true},
            {"RID": "R2", "Village": "Beta", "Area": "#N/A", "Irrigated": false}
        ]"##,
    );

    let source = JsonSource::new(path).unwrap();
    assert_eq!(source.format(), JsonFormatType::Json);

    let dataset = source.load().await.unwrap();
    assert_eq!(dataset.column_names(), vec!["RID", "Village", "Area", "Irrigated"]);
    assert_eq!(dataset.rows()[0].get("Irrigated"), Some(&CellValue::Bool(true)));
    assert!(dataset.rows()[1].get("Area").unwrap().is_blank());
}

#[tokio::test]
async fn test_malformed_json_array() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "broken.json", "[{\"RID\": ");

    let err = JsonSource::new(path).unwrap().load().await.unwrap_err();
    assert!(err.to_string().contains("Invalid JSON array"), "{err}");
}

#[tokio::test]
async fn test_missing_file() {
    let err = JsonSource::new("/nonexistent/plots.json")
        .unwrap()
        .load()
        .await
        .unwrap_err();
    assert!(matches!(err, DqmError::DataSource { .. }), "{err:?}");
}

#[tokio::test]
async fn test_register_and_load_table() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "collections.csv", COLLECTION_CSV);

    let ctx = SessionContext::new();
    CsvSource::new(path)
        .unwrap()
        .register(&ctx, "collections")
        .await
        .unwrap();

    let dataset = load_table(&ctx, "collections", &InferenceConfig::default())
        .await
        .unwrap();
    assert_eq!(dataset.len(), 6);
}

#[cfg(feature = "test-utils")]
mod fixtures {
    use dqm_guard::analyzers::inference::InferenceConfig;
    use dqm_guard::core::CellValue;
    use dqm_guard::sources::load_table;
    use dqm_guard::test_fixtures::create_collections_context;

    #[tokio::test]
    async fn test_load_registered_memory_table() {
        let ctx = create_collections_context().await.unwrap();
        let dataset = load_table(&ctx, "collections", &InferenceConfig::default())
            .await
            .unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(
            dataset.rows()[2].get("Total Agriculture Area (ha)"),
            Some(&CellValue::Null)
        );
    }
}

//! Integration tests for rule-table import, the built-in catalog and row
//! exports over the collection sheet fixture.

#[cfg(feature = "test-utils")]
mod tests {
    use dqm_guard::core::{EngineConfig, HeaderMode};
    use dqm_guard::engine::RuleEngine;
    use dqm_guard::formatters::{DqmReport, ReportFormatter, RowReportFormatter};
    use dqm_guard::rules::catalog::{standard_rules, MANDATORY_HEADERS};
    use dqm_guard::rules::table::{parse_rule_table, RuleTableImporter, TABLE_RULE_ID_BASE};
    use dqm_guard::rules::{GroupMode, RuleKind};
    use dqm_guard::test_fixtures::{collection_sheet, qc_rule_table};

    #[test]
    fn test_rule_table_import() {
        let rules = parse_rule_table(&qc_rule_table()).unwrap();

        let ids: Vec<u64> = rules.iter().map(|rule| rule.id).collect();
        assert_eq!(
            ids,
            vec![TABLE_RULE_ID_BASE, TABLE_RULE_ID_BASE + 1, TABLE_RULE_ID_BASE + 2]
        );

        let aggregate = rules.get(TABLE_RULE_ID_BASE + 2).unwrap();
        match &aggregate.kind {
            RuleKind::Aggregate(body) => {
                assert_eq!(body.group_by.as_deref(), Some("RID"));
                assert_eq!(body.group_mode, GroupMode::Representative);
            }
            RuleKind::Row(_) => panic!("expected an aggregate rule"),
        }
        assert_eq!(aggregate.display_name(), "Total Agri Area");
    }

    #[test]
    fn test_rule_table_execution() {
        let dataset = collection_sheet();
        let rules = parse_rule_table(&qc_rule_table()).unwrap();

        let result = RuleEngine::default().execute(&dataset, &rules);

        assert_eq!(result.summary.failed, 4);
        assert_eq!(
            result.summary.impacted_rows.iter().copied().collect::<Vec<_>>(),
            vec![2, 3, 4, 5]
        );
        assert_eq!(
            result.failure_strings(2),
            vec!["Sowing 1 Percentage lte 100".to_string()]
        );
        assert_eq!(result.failure_strings(5).len(), 2);
        assert_eq!(
            result.global_errors,
            vec![
                "FAIL [Global]: SUM(Total Agriculture Area (ha)) is 330.00, expected lte 300 (300.00)"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_strict_import_rejects_bad_rows() {
        let mut table = qc_rule_table();
        table.push(
            dqm_guard::core::Row::new()
                .with("QC_Check_Name", "Broken")
                .with("Level", "Sheet")
                .with("Target_Column", "RID"),
        );

        assert_eq!(RuleTableImporter::new().import(&table).unwrap().len(), 3);
        assert!(RuleTableImporter::new().strict(true).import(&table).is_err());
    }

    #[test]
    fn test_catalog_on_collection_sheet() {
        let dataset = collection_sheet();
        let result = RuleEngine::default().execute(&dataset, &standard_rules());

        assert_eq!(result.summary.passed, 2);
        assert_eq!(result.summary.failed, 4);
        assert_eq!(result.summary.pass_percentage_label(), "33.3");
        assert_eq!(result.summary.quality_score_label(), "3.3");

        assert!(result.results[0].passed);
        assert_eq!(
            result.failure_strings(2),
            vec!["Sowing 1 % outside [0, 100]".to_string()]
        );
        assert_eq!(
            result.failure_strings(3),
            vec!["Sowing 2 < Sowing 1".to_string()]
        );
        assert!(result.failure_strings(4)[0].starts_with("Sowing 2/ACR Mismatch"));
        assert_eq!(
            result.failure_strings(5),
            vec![
                "Sowing 1 % outside [0, 100]".to_string(),
                "Agri Area < Latest Sowing Area".to_string()
            ]
        );

        assert!(result.results[5].passed);
        assert_eq!(result.results[5].duplicate_of, Some(1));
    }

    #[test]
    fn test_catalog_strict_policy() {
        let dataset = collection_sheet();
        let result = RuleEngine::new(EngineConfig::strict()).execute(&dataset, &standard_rules());

        assert_eq!(result.summary.failed, 6);
        assert_eq!(
            result.failure_strings(1)[0],
            "Column 'Crop  Area Percentage K025' not found"
        );
    }

    #[test]
    fn test_collection_sheet_headers() {
        let sheet = collection_sheet();
        let names = sheet.column_names();
        assert!(sheet.validate_headers(&names, HeaderMode::Strict).valid);

        let mut reordered = names.clone();
        reordered.reverse();
        assert!(!sheet.validate_headers(&reordered, HeaderMode::Strict).valid);
        assert!(sheet.validate_headers(&reordered, HeaderMode::Flexible).valid);

        let catalog = sheet.validate_headers(&MANDATORY_HEADERS, HeaderMode::Flexible);
        assert!(!catalog.valid);
        assert!(catalog
            .mismatches
            .iter()
            .any(|m| m.expected == "Crop  Area Percentage K025"));
        assert!(catalog.into_result().is_err());
    }

    #[test]
    fn test_row_report_export() {
        let dataset = collection_sheet();
        let result = RuleEngine::default().execute(&dataset, &standard_rules());
        let report = DqmReport::new(&result).with_dataset(&dataset);

        let csv = RowReportFormatter::new().format(&report).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 7);
        assert!(lines[0].ends_with("_QC_STATUS,_FAILURE_MESSAGE,_DUPLICATE_OF"));
        assert!(lines[1].contains(",PASS,"));
        assert!(lines[5].contains("Sowing 1 % outside [0, 100]; Agri Area < Latest Sowing Area"));
        assert!(lines[6].ends_with(",PASS,,1"));
    }
}

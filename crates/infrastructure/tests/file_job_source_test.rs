#[cfg(test)]
mod file_job_source_tests {
    use std::fs;

    use chrono::Duration;
    use cronslot_domain::JobSource;
    use cronslot_errors::PlannerError;
    use cronslot_infrastructure::FileJobSource;
    use tempfile::TempDir;

    const TOML_CATALOG: &str = r#"
[[functions]]
func_name = "payment_reconcile"
schedule = "0 9 * * *"
avg_runtime = "1 hours"

[[dags]]
dag_id = "flight_ingest"
schedule = "30 */2 * * *"
avg_runtime = "00:45:00"

[[jobs]]
job_name = "nightly_report"
schedule = "0 2 * * *"
avg_runtime = "20 mins"
category = "reporting"
priority = 3

[[jobs]]
job_name = "legacy_export"
schedule = "0 4 * * *"
avg_runtime = "2 mons"

[priorities]
payment_reconcile = 1
"#;

    #[test]
    fn test_load_toml_catalog() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.toml");
        fs::write(&path, TOML_CATALOG).unwrap();

        let catalog = FileJobSource::new(&path).load_catalog().unwrap();
        let names: Vec<&str> = catalog.jobs().iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, ["payment_reconcile", "flight_ingest", "nightly_report"]);

        let payment = catalog.get("payment_reconcile").unwrap();
        assert_eq!(payment.category, "payment");
        assert_eq!(payment.priority, 1);
        assert_eq!(payment.average_runtime, Duration::hours(1));

        let flight = catalog.get("flight_ingest").unwrap();
        assert_eq!(flight.category, "flight");
        assert_eq!(flight.priority, 5);
        assert_eq!(flight.average_runtime, Duration::minutes(45));

        let report = catalog.get("nightly_report").unwrap();
        assert_eq!(report.category, "reporting");
        assert_eq!(report.priority, 3);

        assert_eq!(catalog.rejected().len(), 1);
        assert_eq!(catalog.rejected()[0].job_name, "legacy_export");
    }

    #[test]
    fn test_load_json_catalog() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.json");
        fs::write(
            &path,
            r#"{"jobs": [{"job_name": "bus_timetable", "schedule": "*/15 * * * *", "avg_runtime": "5 mins"}]}"#,
        )
        .unwrap();

        let catalog = FileJobSource::new(&path).load_catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.jobs()[0].category, "bus");
    }

    #[test]
    fn test_missing_column_is_catalog_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.toml");
        fs::write(&path, "[[jobs]]\njob_name = \"hotel_sync\"\navg_runtime = \"5 mins\"\n").unwrap();

        let err = FileJobSource::new(&path).load_catalog().unwrap_err();
        assert!(matches!(err, PlannerError::Catalog(_)));
        assert!(!err.is_job_scoped());
        assert!(err.to_string().contains("schedule"));
    }

    #[test]
    fn test_missing_file_is_catalog_error() {
        let dir = TempDir::new().unwrap();
        let source = FileJobSource::new(dir.path().join("absent.toml"));
        assert!(matches!(source.load_catalog(), Err(PlannerError::Catalog(_))));
    }

    #[test]
    fn test_empty_document_is_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.toml");
        fs::write(&path, "").unwrap();
        let catalog = FileJobSource::new(&path).load_catalog().unwrap();
        assert!(catalog.is_empty());
    }
}

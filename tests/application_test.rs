#[cfg(test)]
mod application_tests {
    use std::fs;
    use std::path::Path;

    use cronslot::Application;
    use cronslot_config::AppConfig;
    use cronslot_testing_utils::{jan1, CatalogBuilder, JobBuilder, MockJobSource, MockScheduleSink};
    use serde_json::Value;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
[[jobs]]
job_name = "payment_settlement"
schedule = "0 9 * * *"
avg_runtime = "3 hours"
priority = 1

[[jobs]]
job_name = "bus_refresh"
schedule = "0 10 * * *"
avg_runtime = "10 mins"

[[jobs]]
job_name = "train_refresh"
schedule = "0 11 * * *"
avg_runtime = "600 secs"

[[jobs]]
job_name = "broken_rule"
schedule = "0 0 31 2 *"
avg_runtime = "1 mins"
"#;

    fn config_for(dir: &Path) -> AppConfig {
        let toml_str = format!(
            r#"
[planner]
max_runs_per_day = 2
min_hours_gap = 0.5
runtime_min = 10
runtime_max = 10

[range]
start = "2024-01-01"
end = "+1d"

[io]
catalog_path = "{catalog}"
output_dir = "{output}"
"#,
            catalog = dir.join("jobs.toml").display(),
            output = dir.join("out").display(),
        );
        AppConfig::from_toml(&toml_str).unwrap()
    }

    #[test]
    fn test_plan_writes_schedules_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("jobs.toml"), CATALOG).unwrap();
        let app = Application::new(config_for(dir.path()));

        let report = app.plan(jan1(0, 0)).unwrap();
        assert_eq!(report.free_intervals.len(), 2);
        assert_eq!(report.rejected_jobs.len(), 1);

        let content = fs::read_to_string(app.file_sink().schedules_path()).unwrap();
        let rows: Value = serde_json::from_str(&content).unwrap();
        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["crontab_schedule_utc"], "0 0-9/4 * * *");
        assert_eq!(rows[1]["crontab_schedule_utc"], "10 10 * * *");
        assert_eq!(rows[1]["num_unassigned"], 1);
        assert_eq!(rows[1]["overlap"]["payment_settlement"], 1);
    }

    #[test]
    fn test_lookup_writes_window_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("jobs.toml"), CATALOG).unwrap();
        let mut config = config_for(dir.path());
        config.window.start_hour = 9;
        config.window.end_hour = 11;
        config.range.utc_offset = "+1:00".to_string();
        let app = Application::new(config);

        let report = app.lookup(jan1(0, 0)).unwrap();
        // 本地时间 09:00-11:00 对应 UTC 08:00-10:00
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].job_name, "payment_settlement");
        assert_eq!(report.rows[0].occurrences, ["2024-01-01 10:00"]);

        let path = dir.path().join("out").join("jobs_between_9and11.json");
        assert!(path.exists());
    }

    #[test]
    fn test_plan_with_mock_ports() {
        let dir = TempDir::new().unwrap();
        let catalog = CatalogBuilder::new()
            .with_job(
                JobBuilder::new()
                    .with_name("hotel_rates")
                    .with_schedule("0 12 * * *")
                    .with_runtime_minutes(30)
                    .build(),
            )
            .build();
        let source = MockJobSource::new(catalog);
        let sink = MockScheduleSink::new();
        let app = Application::new(config_for(dir.path()));

        let report = app.run_plan(&source, &sink, jan1(0, 0)).unwrap();
        assert_eq!(sink.schedules(), report.schedules);
        assert_eq!(report.schedules.len(), 1);
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_catalog_failure_aborts_batch() {
        let dir = TempDir::new().unwrap();
        let source = MockJobSource::failing("缺少 schedule 列");
        let sink = MockScheduleSink::new();
        let app = Application::new(config_for(dir.path()));

        let err = app.run_plan(&source, &sink, jan1(0, 0)).unwrap_err();
        assert!(format!("{err:#}").contains("缺少 schedule 列"));
        assert!(sink.schedules().is_empty());
    }

    #[test]
    fn test_invalid_offset_is_hard_failure() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(dir.path());
        config.range.utc_offset = "+25:00".to_string();
        let app = Application::new(config);

        let source = MockJobSource::new(CatalogBuilder::new().build());
        let sink = MockScheduleSink::new();
        assert!(app.run_lookup(&source, &sink, jan1(0, 0)).is_err());
        assert!(sink.lookups().is_empty());
    }

    #[test]
    fn test_fit_writes_candidate_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("jobs.toml"), CATALOG).unwrap();
        let app = Application::new(config_for(dir.path()));
        let candidate = JobBuilder::new()
            .with_name("bus_cleanup")
            .with_schedule("0/30 8-11 * * *")
            .with_runtime_minutes(30)
            .build();

        let report = app.fit(&candidate, jan1(0, 0)).unwrap();
        assert_eq!(report.runs["payment_settlement"], [jan1(8, 0), jan1(8, 30)]);
        assert_eq!(report.runs["bus_refresh"].len(), 4);
        assert_eq!(report.rejected_jobs.len(), 1);

        let path = dir.path().join("out").join("fit_bus_cleanup.json");
        let rows: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(rows[0]["job_name"], "bus_refresh");
        assert_eq!(rows[0]["datetimes"][0], "2024-01-01 08:00");
    }

    #[test]
    fn test_fit_with_mock_ports() {
        let dir = TempDir::new().unwrap();
        let catalog = CatalogBuilder::new().with("hotel_rates", "0 9 * * *", 60).build();
        let source = MockJobSource::new(catalog);
        let sink = MockScheduleSink::new();
        let app = Application::new(config_for(dir.path()));
        let candidate = JobBuilder::new()
            .with_name("new_job")
            .with_schedule("0 8 * * *")
            .with_runtime_minutes(90)
            .build();

        let report = app.run_fit(&candidate, &source, &sink, jan1(0, 0)).unwrap();
        assert!(report.runs["hotel_rates"].is_empty());

        let fits = sink.fits();
        assert_eq!(fits.len(), 1);
        assert_eq!(fits[0].0, "new_job");
        assert!(fits[0].1[0].occurrences.is_empty());
    }
}

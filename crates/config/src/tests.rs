#[cfg(test)]
mod config_loading_tests {
    use crate::{AppConfig, LogLevel};

    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> String {
        let path = dir.path().join("cronslot.toml");
        fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[planner]
max_runs_per_day = 2
min_hours_gap = 0.5

[range]
start = "2024-01-01"
end = "+7d"
utc_offset = "+5:30"

[io]
catalog_path = "demos/jobs.toml"
"#,
        );

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.planner.max_runs_per_day, 2);
        assert_eq!(config.planner.min_hours_gap, 0.5);
        // 文件中没有的键保留默认值
        assert_eq!(config.planner.runtime_max, 15);
        assert_eq!(config.window.end_hour, 24);
        assert_eq!(config.range.end, "+7d");
        assert_eq!(config.io.catalog_path, "demos/jobs.toml");
        assert_eq!(config.observability.log_level, LogLevel::Info);

        let offset = config.range.offset().unwrap();
        assert_eq!(offset.minutes(), 330);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[planner]\noccurrence_cap = 50\n");

        std::env::set_var("CRONSLOT__PLANNER__OCCURRENCE_CAP", "777");
        let config = AppConfig::load(Some(&path));
        std::env::remove_var("CRONSLOT__PLANNER__OCCURRENCE_CAP");

        assert_eq!(config.unwrap().planner.occurrence_cap, 777);
    }

    #[test]
    fn test_invalid_file_values_fail_validation() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[planner]\nruntime_min = 0\nmin_hours_gap = 0.0\n");
        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("cannot both be 0"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[planner\nmax_runs_per_day = ");
        assert!(AppConfig::load(Some(&path)).is_err());
    }
}

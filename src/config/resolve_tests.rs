use super::*;

fn base() -> InstanceConfig {
    InstanceConfig {
        url_root: Some("https://gitlab.example.com/".to_string()),
        token: Some("glpat-secret".to_string()),
        stats_year: Some(2023),
        ..InstanceConfig::default()
    }
}

fn ranged(from: &str, to: &str) -> InstanceConfig {
    InstanceConfig {
        stats_year: None,
        stats_from: Some(from.to_string()),
        stats_to: Some(to.to_string()),
        ..base()
    }
}

#[test]
fn stats_year_resolves_to_calendar_year() {
    let config = RunConfig::resolve("main", &base(), None).unwrap();
    assert_eq!(config.period, StatsPeriod::Year(2023));
    assert_eq!(
        config.window.start(),
        parse_timestamp("2023-01-01T00:00:00Z").unwrap()
    );
    assert_eq!(
        config.window.end(),
        parse_timestamp("2023-12-31T23:59:59Z").unwrap()
    );
}

#[test]
fn non_positive_stats_year_uses_explicit_range() {
    let raw = InstanceConfig {
        stats_year: Some(0),
        ..ranged("2024-01-01T00:00:00Z", "2024-06-30T23:59:59Z")
    };
    let config = RunConfig::resolve("main", &raw, None).unwrap();
    assert_eq!(
        config.period,
        StatsPeriod::Range {
            from: "2024-01-01T00:00:00Z".to_string(),
            to: "2024-06-30T23:59:59Z".to_string(),
        }
    );
}

#[test]
fn date_only_bounds_cover_whole_days() {
    let config = RunConfig::resolve("main", &ranged("2024-01-01", "2024-01-31"), None).unwrap();
    assert_eq!(
        config.window.start(),
        parse_timestamp("2024-01-01T00:00:00Z").unwrap()
    );
    assert_eq!(
        config.window.end(),
        parse_timestamp("2024-01-31T23:59:59Z").unwrap()
    );
}

#[test]
fn inverted_range_is_config_error() {
    let err = RunConfig::resolve(
        "main",
        &ranged("2024-12-31T00:00:00Z", "2024-01-01T00:00:00Z"),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, GitlabStatsError::Config(_)));
    assert!(err.to_string().contains("must not be after"));
}

#[test]
fn malformed_range_bound_is_config_error() {
    let err = RunConfig::resolve("main", &ranged("soon", "2024-01-01"), None).unwrap_err();
    assert!(matches!(err, GitlabStatsError::Config(_)));
    assert!(err.to_string().contains("stats_from"));
}

#[test]
fn missing_period_is_config_error() {
    let raw = InstanceConfig {
        stats_year: None,
        ..base()
    };
    let err = RunConfig::resolve("main", &raw, None).unwrap_err();
    assert!(err.to_string().contains("stats_from"));
}

#[test]
fn missing_url_is_config_error() {
    let raw = InstanceConfig {
        url_root: None,
        ..base()
    };
    let err = RunConfig::resolve("main", &raw, None).unwrap_err();
    assert!(err.to_string().contains("url_root"));
}

#[test]
fn non_http_url_is_rejected() {
    let raw = InstanceConfig {
        url_root: Some("gitlab.example.com".to_string()),
        ..base()
    };
    assert!(RunConfig::resolve("main", &raw, None).is_err());
}

#[test]
fn token_falls_back_to_environment() {
    let raw = InstanceConfig {
        token: None,
        ..base()
    };
    let config = RunConfig::resolve("main", &raw, Some("from-env".to_string())).unwrap();
    assert_eq!(config.token, "from-env");
}

#[test]
fn configured_token_wins_over_environment() {
    let config = RunConfig::resolve("main", &base(), Some("from-env".to_string())).unwrap();
    assert_eq!(config.token, "glpat-secret");
}

#[test]
fn missing_token_everywhere_is_config_error() {
    let raw = InstanceConfig {
        token: Some("  ".to_string()),
        ..base()
    };
    assert!(RunConfig::resolve("main", &raw, None).is_err());
}

#[test]
fn defaults_are_applied() {
    let config = RunConfig::resolve("main", &base(), None).unwrap();
    assert_eq!(config.url_root, "https://gitlab.example.com");
    assert_eq!(config.include_path, "");
    assert_eq!(config.exclude_path, "");
    assert!(config.commit_stats_exclude_groups.is_empty());
    assert_eq!(config.resume_from_project_id, 0);
    assert_eq!(config.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    assert_eq!(
        config.request_timeout,
        Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
    );
    assert_eq!(config.retry.max_retries, DEFAULT_MAX_RETRIES);
}

#[test]
fn resume_cursor_switches_to_append() {
    let fresh = RunConfig::resolve("main", &base(), None).unwrap();
    assert!(!fresh.is_resume());
    assert_eq!(fresh.write_mode(), WriteMode::Truncate);

    let raw = InstanceConfig {
        from_project_id: Some(42),
        ..base()
    };
    let resumed = RunConfig::resolve("main", &raw, None).unwrap();
    assert!(resumed.is_resume());
    assert_eq!(resumed.write_mode(), WriteMode::Append);
}

#[test]
fn output_file_name_for_year() {
    let config = RunConfig::resolve("gitlab-com", &base(), None).unwrap();
    assert_eq!(config.output_file_name(), "gitlab-stats-gitlab-com-2023.csv");
    assert_eq!(
        config.output_path(),
        PathBuf::from("out").join("gitlab-stats-gitlab-com-2023.csv")
    );
}

#[test]
fn output_file_name_for_range() {
    let config = RunConfig::resolve("internal", &ranged("2024-01-01", "2024-03-31"), None).unwrap();
    assert_eq!(
        config.output_file_name(),
        "gitlab-stats-internal-from-2024-01-01-to-2024-03-31.csv"
    );
}

#[test]
fn line_stats_exclusion_checks_group_then_project() {
    let raw = InstanceConfig {
        commit_stats_exclude_groups: Some(vec!["acme/mirrors".to_string()]),
        commit_stats_exclude_projects: Some(vec!["acme/web/generated".to_string()]),
        ..base()
    };
    let config = RunConfig::resolve("main", &raw, None).unwrap();

    assert_eq!(
        config.line_stats_exclusion("acme/mirrors/linux", "acme/mirrors"),
        Some(LineStatsExclusion::Group("acme/mirrors".to_string()))
    );
    assert_eq!(
        config.line_stats_exclusion("acme/web/generated", "acme/web"),
        Some(LineStatsExclusion::Project("acme/web/generated".to_string()))
    );
    assert_eq!(config.line_stats_exclusion("acme/web/app", "acme/web"), None);
}

#[test]
fn group_exclusion_is_exact_match() {
    let raw = InstanceConfig {
        commit_stats_exclude_groups: Some(vec!["acme".to_string()]),
        ..base()
    };
    let config = RunConfig::resolve("main", &raw, None).unwrap();
    assert_eq!(config.line_stats_exclusion("acme/web/app", "acme/web"), None);
}

#[test]
fn is_http_url_detects_schemes() {
    assert!(is_http_url("https://gitlab.com"));
    assert!(is_http_url("http://localhost:8080"));
    assert!(!is_http_url("ftp://gitlab.com"));
    assert!(!is_http_url(""));
}

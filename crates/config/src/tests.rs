use std::io::Write;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_empty_input_yields_defaults() {
	let config = Config::parse("").unwrap();
	assert_eq!(config, Config::default());
	assert_eq!(config.refresh_interval(), Duration::from_millis(1000));
	assert_eq!(config.debounce_interval(), Duration::from_millis(300));
	assert_eq!(config.request_timeout(), Duration::from_secs(30));
	assert_eq!(config.service.endpoint, "http://localhost:5000/check");
	assert!(config.enabled);
}

#[test]
fn test_full_document() {
	let config = Config::parse(
		r#"
		refresh_ms = 500
		callback_refresh_ms = 250
		enabled = false
		content_kinds = ["markdown", "text"]

		[service]
		endpoint = "https://grammar.example.com/check"
		timeout_ms = 5000
		offset_encoding = "utf16"
		"#,
	)
	.unwrap();

	assert_eq!(config.refresh_ms, 500);
	assert_eq!(config.callback_refresh_ms, 250);
	assert!(!config.enabled);
	assert_eq!(config.content_kinds, vec!["markdown".to_string(), "text".to_string()]);
	assert_eq!(config.service.endpoint, "https://grammar.example.com/check");
	assert_eq!(config.service.timeout_ms, 5000);
	assert_eq!(config.service.offset_encoding, OffsetEncoding::Utf16);
}

#[test]
fn test_partial_service_table_keeps_defaults() {
	let config = Config::parse("[service]\noffset_encoding = \"utf8\"\n").unwrap();
	assert_eq!(config.service.offset_encoding, OffsetEncoding::Utf8);
	assert_eq!(config.service.endpoint, DEFAULT_ENDPOINT);
	assert_eq!(config.refresh_ms, DEFAULT_REFRESH_MS);
}

#[test]
fn test_unknown_key_is_rejected() {
	let err = Config::parse("refresh = 10").unwrap_err();
	assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
}

#[test]
fn test_unknown_encoding_is_rejected() {
	let err = Config::parse("[service]\noffset_encoding = \"ucs2\"\n").unwrap_err();
	assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
}

#[test]
fn test_zero_intervals_are_invalid() {
	let err = Config::parse("refresh_ms = 0").unwrap_err();
	assert!(matches!(err, ConfigError::Invalid { field: "refresh_ms", .. }), "got {err:?}");

	let err = Config::parse("callback_refresh_ms = 0").unwrap_err();
	assert!(
		matches!(err, ConfigError::Invalid { field: "callback_refresh_ms", .. }),
		"got {err:?}"
	);

	let err = Config::parse("[service]\ntimeout_ms = 0\n").unwrap_err();
	assert!(
		matches!(err, ConfigError::Invalid { field: "service.timeout_ms", .. }),
		"got {err:?}"
	);
}

#[test]
fn test_empty_content_kinds_is_invalid() {
	let err = Config::parse("content_kinds = []").unwrap_err();
	assert!(matches!(err, ConfigError::Invalid { field: "content_kinds", .. }), "got {err:?}");
}

#[test]
fn test_endpoint_must_be_http_url() {
	let err = Config::parse("[service]\nendpoint = \"not a url\"\n").unwrap_err();
	assert!(matches!(err, ConfigError::Invalid { field: "service.endpoint", .. }), "got {err:?}");

	let err = Config::parse("[service]\nendpoint = \"file:///tmp/check\"\n").unwrap_err();
	assert!(matches!(err, ConfigError::Invalid { field: "service.endpoint", .. }), "got {err:?}");
}

#[test]
fn test_load_from_file() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	writeln!(file, "callback_refresh_ms = 120").unwrap();

	let config = Config::load(file.path()).unwrap();
	assert_eq!(config.callback_refresh_ms, 120);
}

#[test]
fn test_load_missing_file_is_io_error() {
	let dir = tempfile::tempdir().unwrap();
	let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
	assert!(matches!(err, ConfigError::Io { .. }), "got {err:?}");
}

#[test]
fn test_load_or_default_tolerates_missing_file() {
	let dir = tempfile::tempdir().unwrap();
	let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
	assert_eq!(config, Config::default());
}

#[test]
fn test_load_or_default_reports_broken_file() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	writeln!(file, "refresh_ms = \"fast\"").unwrap();

	assert!(Config::load_or_default(file.path()).is_err());
}

#[test]
fn test_default_path_ends_with_config_toml() {
	if let Some(path) = Config::default_path() {
		assert!(path.ends_with("proofmark/config.toml"));
	}
}

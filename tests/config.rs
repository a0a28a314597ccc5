use pizzaria_caixa::config::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECONDS, Settings, config_path, load_settings,
    save_settings,
};
use pizzaria_caixa::format::Locale;
use std::fs;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[test]
fn save_and_load_settings_work_and_permissions_are_locked_down() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("conf").join("config.json");
    let settings = Settings {
        base_url: Some("http://caixa.local:9000".to_string()),
        locale: Some(Locale::EnUs),
        timeout_seconds: Some(5),
    };
    save_settings(&p, &settings).unwrap();
    let loaded = load_settings(&p).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.timeout(), Duration::from_secs(5));

    let raw = fs::read_to_string(&p).unwrap();
    assert!(raw.contains(r#""locale": "en-us""#));

    #[cfg(unix)]
    {
        let mode = fs::metadata(&p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}

#[test]
fn missing_or_empty_file_means_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("config.json");
    let s = load_settings(&p).unwrap();
    assert_eq!(s, Settings::default());
    assert_eq!(s.base_url(), DEFAULT_BASE_URL);
    assert_eq!(s.locale(), Locale::PtBr);
    assert_eq!(s.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECONDS));

    fs::write(&p, "\n").unwrap();
    assert_eq!(load_settings(&p).unwrap(), Settings::default());
}

#[test]
fn unset_fields_are_not_written() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("config.json");
    save_settings(
        &p,
        &Settings {
            timeout_seconds: Some(10),
            ..Default::default()
        },
    )
    .unwrap();
    let raw = fs::read_to_string(&p).unwrap();
    assert!(!raw.contains("base_url"));
    assert!(!raw.contains("locale"));
}

#[test]
fn malformed_file_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("config.json");
    fs::write(&p, "{ not json").unwrap();
    let err = load_settings(&p).unwrap_err().to_string();
    assert!(err.contains("invalid settings file"));
}

#[test]
fn config_path_has_expected_suffix() {
    let p = config_path();
    let s = p.to_string_lossy();
    assert!(
        s.ends_with("/.config/pizzaria-caixa/config.json")
            || s.ends_with("\\.config\\pizzaria-caixa\\config.json")
    );
}

use mindcare_portal::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic, time::Duration};

const CONFIG_VARS: [&str; 7] = [
    "APP_ENV",
    "API_BASE_PATH",
    "BACKEND_ORIGIN",
    "MOCK_ENABLED",
    "MOCK_SERVER_ADDR",
    "MOCK_TOKEN_SECRET",
    "REQUEST_TIMEOUT_SECS",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with a clean config environment and restores the previous values afterward.
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_local_defaults() {
    let config = run_with_env(AppConfig::load);

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_path, "/api");
    assert_eq!(config.backend_origin, "http://localhost:1235");
    assert!(config.mock_enabled);
    assert_eq!(config.mock_server_addr, "0.0.0.0:1235");
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.api_root(), "http://localhost:1235/api");
}

#[test]
#[serial]
fn test_local_overrides_are_normalized() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("API_BASE_PATH", "gateway/");
            env::set_var("BACKEND_ORIGIN", "http://backend:8080/");
            env::set_var("MOCK_ENABLED", "off");
            env::set_var("REQUEST_TIMEOUT_SECS", "5");
        }
        AppConfig::load()
    });

    assert_eq!(config.api_base_path, "/gateway");
    assert_eq!(config.backend_origin, "http://backend:8080");
    assert!(!config.mock_enabled);
    assert_eq!(config.request_timeout, Duration::from_secs(5));
    assert_eq!(config.api_root(), "http://backend:8080/gateway");
}

#[test]
#[serial]
fn test_invalid_timeout_falls_back_to_default() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("REQUEST_TIMEOUT_SECS", "soon");
        }
        AppConfig::load()
    });

    assert_eq!(config.request_timeout, Duration::from_secs(30));
}

#[test]
#[serial]
fn test_production_requires_backend_origin() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
            }
            AppConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without BACKEND_ORIGIN"
    );
}

#[test]
#[serial]
fn test_production_never_enables_mock() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("BACKEND_ORIGIN", "https://mindcare.example.com");
            env::set_var("MOCK_ENABLED", "true");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    assert!(!config.mock_enabled);
    assert_eq!(config.api_root(), "https://mindcare.example.com/api");
}

#[test]
fn test_default_is_test_safe() {
    let config = AppConfig::default();

    assert_eq!(config.env, Env::Local);
    assert!(config.mock_enabled);
    assert_eq!(config.mock_server_addr, "127.0.0.1:0");
}

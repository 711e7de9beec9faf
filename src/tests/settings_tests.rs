// src/tests/settings_tests.rs

use crate::errors::ConfigError;
use crate::settings::{Settings, DEFAULT_SEARCH_URL};
use std::collections::HashMap;
use std::time::Duration;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn load(vars: &HashMap<String, String>) -> Result<Settings, ConfigError> {
    Settings::from_lookup(|name| vars.get(name).cloned())
}

const BASE: [(&str, &str); 4] = [
    ("MSE_EMAIL", "etudiant@example.fr"),
    ("MSE_PASSWORD", "secret"),
    ("TELEGRAM_BOT_TOKEN", "123:abc"),
    ("MY_TELEGRAM_ID", "100"),
];

#[test]
fn all_missing_variables_are_listed() {
    let err = load(&env(&[("MSE_PASSWORD", "secret")])).unwrap_err();

    match &err {
        ConfigError::MissingVariables(names) => assert_eq!(
            names,
            &vec!["MSE_EMAIL", "TELEGRAM_BOT_TOKEN", "MY_TELEGRAM_ID"]
        ),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        err.to_string(),
        "missing required environment variables: MSE_EMAIL, TELEGRAM_BOT_TOKEN, MY_TELEGRAM_ID"
    );
}

#[test]
fn blank_values_count_as_missing() {
    let mut vars = env(&BASE);
    vars.insert("MSE_PASSWORD".into(), "  ".into());

    assert!(matches!(
        load(&vars),
        Err(ConfigError::MissingVariables(names)) if names == vec!["MSE_PASSWORD"]
    ));
}

#[test]
fn defaults_with_single_recipient() {
    let settings = load(&env(&BASE)).unwrap();

    assert_eq!(settings.poll_interval, Duration::from_secs(600));
    assert_eq!(settings.navigation_delay, Duration::from_secs(2));
    assert!(!settings.notify_when_no_results);
    assert_eq!(settings.recipients.len(), 1);
    assert_eq!(settings.recipients[0].label, "Me");
    assert_eq!(settings.recipients[0].telegram_id, "100");
    assert_eq!(settings.recipients[0].search_url.as_str(), DEFAULT_SEARCH_URL);
}

#[test]
fn recipients_from_json() {
    let mut vars = env(&BASE[..3]);
    vars.insert(
        "RECIPIENTS_JSON".into(),
        r#"[
            {"label": "Alice", "telegram_id": "100",
             "search_url": "https://trouverunlogement.lescrous.fr/tools/36/search?bounds=1_2_3_4",
             "ignored_ids": [42, 7]},
            {"conf_title": "Bob", "telegram_id": "200",
             "search_url": "https://trouverunlogement.lescrous.fr/tools/36/search?bounds=5_6_7_8"}
        ]"#
        .into(),
    );

    let settings = load(&vars).unwrap();

    assert_eq!(settings.recipients.len(), 2);
    assert!(settings.recipients[0].ignored_ids.contains(&42));
    assert_eq!(settings.recipients[1].label, "Bob");
    assert!(settings.recipients[1].ignored_ids.is_empty());
}

#[test]
fn recipients_from_file() {
    let path = std::env::temp_dir().join(format!("recipients_{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"[{"label": "Alice", "telegram_id": "100",
             "search_url": "https://trouverunlogement.lescrous.fr/tools/36/search?bounds=1_2_3_4"}]"#,
    )
    .unwrap();

    let mut vars = env(&BASE[..3]);
    vars.insert("RECIPIENTS_FILE".into(), path.display().to_string());
    let settings = load(&vars).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(settings.recipients[0].label, "Alice");
}

#[test]
fn unreadable_recipients_file_is_reported() {
    let mut vars = env(&BASE[..3]);
    vars.insert("RECIPIENTS_FILE".into(), "/nonexistent/recipients.json".into());

    assert!(matches!(load(&vars), Err(ConfigError::RecipientsFile { .. })));
}

#[test]
fn invalid_optional_values_are_rejected() {
    let mut vars = env(&BASE);
    vars.insert("POLL_INTERVAL_SECS".into(), "ten minutes".into());
    assert!(matches!(load(&vars), Err(ConfigError::Invalid { name, .. }) if name == "POLL_INTERVAL_SECS"));

    let mut vars = env(&BASE);
    vars.insert("NOTIFY_WHEN_NO_RESULTS".into(), "maybe".into());
    assert!(matches!(load(&vars), Err(ConfigError::Invalid { .. })));
}

#[test]
fn optional_values_are_read() {
    let mut vars = env(&BASE);
    vars.insert("POLL_INTERVAL_SECS".into(), "60".into());
    vars.insert("NOTIFY_WHEN_NO_RESULTS".into(), "Yes".into());
    let settings = load(&vars).unwrap();

    assert_eq!(settings.poll_interval, Duration::from_secs(60));
    assert!(settings.notify_when_no_results);
}

#[test]
fn numeric_chat_ids_are_accepted() {
    let mut vars = env(&BASE[..3]);
    vars.insert(
        "RECIPIENTS_JSON".into(),
        r#"[
            {"label": "Alice", "telegram_id": 123456789,
             "search_url": "https://trouverunlogement.lescrous.fr/tools/36/search?bounds=1_2_3_4"},
            {"label": "Groupe", "telegram_id": -1001234567890,
             "search_url": "https://trouverunlogement.lescrous.fr/tools/36/search?bounds=1_2_3_4"},
            {"label": "Bob", "telegram_id": "200",
             "search_url": "https://trouverunlogement.lescrous.fr/tools/36/search?bounds=1_2_3_4"}
        ]"#
        .into(),
    );

    let settings = load(&vars).unwrap();
    let ids: Vec<_> = settings.recipients.iter().map(|r| r.telegram_id.as_str()).collect();

    assert_eq!(ids, vec!["123456789", "-1001234567890", "200"]);
}

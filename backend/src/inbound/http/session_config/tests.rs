//! Unit tests for session settings parsing.

use std::collections::HashMap;

use mockable::MockEnv;
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

use super::*;

fn key_file(len: usize) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp key file");
    std::fs::write(file.path(), vec![b'k'; len]).expect("write key");
    file
}

fn env_with(vars: &[(&str, &str)]) -> MockEnv {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |name| vars.get(name).cloned());
    env
}

#[fixture]
fn release_key() -> NamedTempFile {
    key_file(SESSION_KEY_MIN_LEN)
}

fn release_env(key: &NamedTempFile, overrides: &[(&'static str, &'static str)]) -> MockEnv {
    let path = key.path().to_string_lossy().into_owned();
    let mut vars: HashMap<&str, String> = HashMap::from([
        (KEY_FILE_ENV, path),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ]);
    for (name, value) in overrides {
        vars.insert(*name, (*value).to_owned());
    }
    let pairs: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (*k, v.as_str())).collect();
    env_with(&pairs)
}

#[rstest]
fn release_accepts_complete_configuration(release_key: NamedTempFile) {
    let settings = session_settings_from_env(&release_env(&release_key, &[]), BuildMode::Release)
        .expect("valid settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
    assert_eq!(settings.key_fingerprint().len(), 16);
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_rejects_missing_toggle(#[case] missing: &'static str) {
    let key = key_file(SESSION_KEY_MIN_LEN);
    let path = key.path().to_string_lossy().into_owned();
    let vars: Vec<(&str, &str)> = [
        (KEY_FILE_ENV, path.as_str()),
        (COOKIE_SECURE_ENV, "1"),
        (SAMESITE_ENV, "Lax"),
        (ALLOW_EPHEMERAL_ENV, "0"),
    ]
    .into_iter()
    .filter(|(name, _)| *name != missing)
    .collect();

    let error = session_settings_from_env(&env_with(&vars), BuildMode::Release)
        .err()
        .expect("missing toggle fails");
    assert!(matches!(error, SessionConfigError::MissingEnv { name } if name == missing));
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(SAMESITE_ENV, "sideways")]
#[case(ALLOW_EPHEMERAL_ENV, "")]
fn release_rejects_malformed_toggle(
    release_key: NamedTempFile,
    #[case] name: &'static str,
    #[case] value: &'static str,
) {
    let error = session_settings_from_env(&release_env(&release_key, &[(name, value)]), BuildMode::Release)
        .err()
        .expect("malformed toggle fails");
    assert!(matches!(error, SessionConfigError::InvalidEnv { name: got, .. } if got == name));
}

#[rstest]
fn release_rejects_samesite_none_without_secure(release_key: NamedTempFile) {
    let env = release_env(
        &release_key,
        &[(COOKIE_SECURE_ENV, "0"), (SAMESITE_ENV, "None")],
    );
    let error = session_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("insecure none fails");
    assert!(matches!(error, SessionConfigError::InsecureSameSiteNone));
}

#[rstest]
fn release_rejects_ephemeral_keys(release_key: NamedTempFile) {
    let env = release_env(&release_key, &[(ALLOW_EPHEMERAL_ENV, "yes")]);
    let error = session_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("ephemeral fails");
    assert!(matches!(error, SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_rejects_short_key() {
    let short = key_file(SESSION_KEY_MIN_LEN - 1);
    let error = session_settings_from_env(&release_env(&short, &[]), BuildMode::Release)
        .err()
        .expect("short key fails");
    assert!(matches!(
        error,
        SessionConfigError::KeyTooShort { length, .. } if length == SESSION_KEY_MIN_LEN - 1
    ));
}

#[rstest]
fn release_rejects_unreadable_key() {
    let env = env_with(&[
        (KEY_FILE_ENV, "/nonexistent/anitrack/session_key"),
        (COOKIE_SECURE_ENV, "1"),
        (SAMESITE_ENV, "Strict"),
        (ALLOW_EPHEMERAL_ENV, "0"),
    ]);
    let error = session_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("unreadable key fails");
    assert!(matches!(error, SessionConfigError::KeyRead { .. }));
}

#[rstest]
fn debug_defaults_everything() {
    let env = env_with(&[(KEY_FILE_ENV, "/nonexistent/anitrack/session_key")]);
    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("lenient");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
#[case("TRUE", Some(true))]
#[case(" n ", Some(false))]
#[case("2", None)]
fn parses_boolean_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
    assert_eq!(parse_bool(raw), expected);
}

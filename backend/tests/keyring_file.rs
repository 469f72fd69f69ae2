//! Keyring loading from a key file on disk.

use std::collections::HashMap;

use mockable::MockEnv;
use rocktags::config::{KEY_FILE_ENV, KEYS_ENV, KeyringConfigError, keyring_from_env};
use rocktags::test_support::cap_fs::temp_file;
use rstest::rstest;

fn env_with(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

#[rstest]
#[case::lines("cat1=alpha\n\ncat2=beta==\n")]
#[case::semicolons("cat1=alpha; cat2=beta==;")]
fn key_file_formats_are_equivalent(#[case] contents: &str) {
    let (_dir, path) = temp_file("keys", contents.as_bytes()).expect("write key file");
    let env = env_with(HashMap::from([(KEY_FILE_ENV, path.display().to_string())]));

    let keyring = keyring_from_env(&env).expect("keyring loads");

    assert_eq!(keyring.names().collect::<Vec<_>>(), vec!["cat1", "cat2"]);
    assert_eq!(keyring.get("cat2").map(|k| k.expose()), Some("beta=="));
}

#[rstest]
fn malformed_key_file_is_rejected_without_echoing_keys() {
    let (_dir, path) = temp_file("keys", b"cat1=alpha\nnot-an-entry\n").expect("write key file");
    let env = env_with(HashMap::from([(KEY_FILE_ENV, path.display().to_string())]));

    let error = keyring_from_env(&env).expect_err("malformed file");

    assert!(matches!(error, KeyringConfigError::Parse { .. }));
    assert!(!error.to_string().contains("alpha"));
}

#[rstest]
fn inline_keys_shadow_the_file() {
    let (_dir, path) = temp_file("keys", b"cat1=from-file\n").expect("write key file");
    let env = env_with(HashMap::from([
        (KEYS_ENV, "cat9=inline".to_owned()),
        (KEY_FILE_ENV, path.display().to_string()),
    ]));

    let keyring = keyring_from_env(&env).expect("keyring loads");

    assert!(keyring.contains("cat9"));
    assert!(!keyring.contains("cat1"));
}

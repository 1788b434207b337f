// tests/registry_config.rs
use epubs_cache::config::categories::load_registry_from;
use std::fs;
use std::path::Path;

#[test]
fn shipped_categories_file_loads_in_order() {
    let r = load_registry_from(Path::new("config/categories.toml")).expect("shipped config");
    let keys: Vec<&str> = r.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "MAJCOM_ACC_ALL",
            "MAJCOM_AETC_ALL",
            "MAJCOM_AMC_ALL",
            "MAJCOM_PACAF_ALL"
        ]
    );
    assert!(r.iter().all(|c| c.url.starts_with("https://")));
}

#[test]
fn json_registry_with_non_majcom_entry() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("cats.json");
    fs::write(
        &p,
        r#"[
            {"key":"MAJCOM_ACC_ALL","url":"https://epubs.test/acc"},
            {"key":"DEPARTMENTAL_AF_ALL","url":"https://epubs.test/daf","label":"Departmental"}
        ]"#,
    )
    .unwrap();
    let r = load_registry_from(&p).unwrap();
    assert_eq!(r.len(), 2);
    assert_eq!(r.select_for_tick(60_000).unwrap().key, "DEPARTMENTAL_AF_ALL");
}

#[test]
fn duplicate_keys_are_rejected_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("dups.toml");
    fs::write(
        &p,
        r#"
[[categories]]
key = "A"
url = "https://a.example/"

[[categories]]
key = " A "
url = "https://a2.example/"
"#,
    )
    .unwrap();
    let err = load_registry_from(&p).unwrap_err().to_string();
    assert!(err.contains("duplicate"), "{err}");
    assert!(err.contains("dups.toml"), "{err}");
}

// src/config/categories.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::registry::{Category, Registry};

pub const ENV_CATEGORIES_PATH: &str = "EPUBS_CATEGORIES_PATH";

/// The shipped `config/categories.toml`, compiled in as the last fallback.
const BUILTIN_CATEGORIES: &str = include_str!("../../config/categories.toml");

/// Registry used when no categories file is found at runtime. Same entries, same
/// order as the shipped file.
pub fn builtin_registry() -> Result<Registry> {
    let cats = parse_toml(BUILTIN_CATEGORIES).context("parsing built-in categories")?;
    Registry::new(cats).map_err(|e| anyhow!("built-in categories: {e}"))
}

/// Load a registry from an explicit path. Supports TOML or JSON formats.
pub fn load_registry_from(path: &Path) -> Result<Registry> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading categories from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cats = parse_categories(&content, ext.as_str())
        .with_context(|| format!("parsing categories in {}", path.display()))?;
    Registry::new(cats).map_err(|e| anyhow!("{}: {e}", path.display()))
}

/// Load the registry using env var + fallbacks:
/// 1) $EPUBS_CATEGORIES_PATH
/// 2) config/categories.toml
/// 3) config/categories.json
/// 4) the built-in copy of config/categories.toml
pub fn load_registry_default() -> Result<Registry> {
    if let Ok(p) = std::env::var(ENV_CATEGORIES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_registry_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CATEGORIES_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/categories.toml");
    if toml_p.exists() {
        return load_registry_from(&toml_p);
    }
    let json_p = PathBuf::from("config/categories.json");
    if json_p.exists() {
        return load_registry_from(&json_p);
    }
    builtin_registry()
}

fn parse_categories(s: &str, hint_ext: &str) -> Result<Vec<Category>> {
    let try_toml = hint_ext == "toml" || s.contains("[[categories]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported categories format"))
}

fn parse_toml(s: &str) -> Result<Vec<Category>> {
    #[derive(serde::Deserialize)]
    struct TomlCats {
        categories: Vec<Category>,
    }
    let v: TomlCats = toml::from_str(s)?;
    Ok(clean_list(v.categories))
}

fn parse_json(s: &str) -> Result<Vec<Category>> {
    let v: Vec<Category> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

/// Trim fields in place. Order is preserved; blanks and duplicates are left
/// for `Registry::new` to reject so the error names the offending entry.
fn clean_list(items: Vec<Category>) -> Vec<Category> {
    items
        .into_iter()
        .map(|c| Category {
            key: c.key.trim().to_string(),
            url: c.url.trim().to_string(),
            label: c
                .label
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn toml_and_json_keep_order_and_trim() {
        let toml = r#"
[[categories]]
key = " MAJCOM_B_ALL "
url = "https://b.example/"

[[categories]]
key = "MAJCOM_A_ALL"
url = " https://a.example/ "
label = "Alpha"
"#;
        let cats = parse_toml(toml).unwrap();
        assert_eq!(cats[0].key, "MAJCOM_B_ALL");
        assert_eq!(cats[1].url, "https://a.example/");
        assert_eq!(cats[1].label.as_deref(), Some("Alpha"));

        let json = r#"[{"key":"X","url":"https://x.example/","label":"  "}]"#;
        let cats = parse_json(json).unwrap();
        assert_eq!(cats, vec![Category::new("X", "https://x.example/")]);
    }

    #[test]
    fn builtin_matches_shipped_file() {
        let shipped = load_registry_from(Path::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/config/categories.toml"
        )))
        .unwrap();
        assert_eq!(builtin_registry().unwrap(), shipped);
        assert!(!shipped.is_empty());
    }

    #[test]
    fn file_with_unstorable_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("cats.toml");
        fs::write(
            &p,
            r#"
[[categories]]
key = "MAJCOM_ACC_ALL"
url = "https://acc.example/"

[[categories]]
key = "DEPARTMENTAL.AF"
url = "https://daf.example/"
"#,
        )
        .unwrap();
        let err = load_registry_from(&p).unwrap_err().to_string();
        assert!(err.contains("DEPARTMENTAL.AF"), "{err}");
        assert!(err.contains("cats.toml"), "{err}");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_categories("not a registry", "txt").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_CATEGORIES_PATH);

        // Nothing on disk → built-in registry
        let r = load_registry_default().unwrap();
        assert_eq!(r, builtin_registry().unwrap());

        // Env wins
        let p_json = tmp.path().join("cats.json");
        fs::write(&p_json, r#"[{"key":"ONLY","url":"https://only.example/"}]"#).unwrap();
        env::set_var(ENV_CATEGORIES_PATH, p_json.display().to_string());
        let r = load_registry_default().unwrap();
        assert_eq!(r.len(), 1);
        assert!(r.contains("ONLY"));

        env::set_var(ENV_CATEGORIES_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(load_registry_default().is_err());
        env::remove_var(ENV_CATEGORIES_PATH);

        env::set_current_dir(&old).unwrap();
    }
}

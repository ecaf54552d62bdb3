use std::collections::HashMap;

use crate::parse::EnvFile;

/// Build the raw (uncoerced) override layer: `.env` entries first, then
/// process environment variables on top.
///
/// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
pub fn overlay(
    file: Option<&EnvFile>,
    vars: impl IntoIterator<Item = (String, String)>,
) -> HashMap<String, String> {
    let mut raw: HashMap<String, String> = file
        .map(|f| f.entries().iter().cloned().collect())
        .unwrap_or_default();

    for (key, value) in vars {
        raw.insert(key, value);
    }

    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn file_only() {
        let file = parse("VC_TIMEOUT=30\n");
        let raw = overlay(Some(&file), vec![]);
        assert_eq!(raw["VC_TIMEOUT"], "30");
    }

    #[test]
    fn env_overrides_file() {
        let file = parse("VC_TIMEOUT=30\nBOT_PREFIX=!\n");
        let raw = overlay(Some(&file), vars(&[("VC_TIMEOUT", "90")]));
        assert_eq!(raw["VC_TIMEOUT"], "90");
        assert_eq!(raw["BOT_PREFIX"], "!");
    }

    #[test]
    fn no_file() {
        let raw = overlay(None, vars(&[("A", "1")]));
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn empty_env_value_still_overrides() {
        let file = parse("BOT_PREFIX=!\n");
        let raw = overlay(Some(&file), vars(&[("BOT_PREFIX", "")]));
        assert_eq!(raw["BOT_PREFIX"], "");
    }
}

#[cfg(test)]
mod tests {
    use super::super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, None);
        assert_eq!(config.grid.page_size, 30);
        assert!(config.preferences.path.ends_with("hermes/preferences.json"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = Config::from_toml(
            r#"
            [api]
            timeout_secs = 15

            [grid]
            page_size = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, default_base_url());
        assert_eq!(config.api.timeout_secs, Some(15));
        assert_eq!(config.grid.page_size, 50);
        assert_eq!(config.server.bind, "0.0.0.0:3000");
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let config = Config::from_toml("[grid]\npage_size = 0\n").unwrap();
        assert_eq!(config.grid.page_size, 1);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(matches!(Config::from_toml("[api\nbase_url ="), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (API_BASE_URL_ENV, " https://api.example.org "),
            (BIND_ENV, ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.api.base_url, "https://api.example.org");
        assert_eq!(config.server.bind, default_bind());
    }
}

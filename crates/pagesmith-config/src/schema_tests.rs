use super::*;

#[test]
fn test_provider_kind_wire_names() {
    assert_eq!(ProviderKind::OpenAi.as_str(), "openai");
    let config: LlmConfig = toml::from_str("provider = \"anthropic\"").unwrap();
    assert_eq!(config.provider, ProviderKind::Anthropic);
}

#[test]
fn test_provider_kind_from_str() {
    assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
    assert_eq!(" custom ".parse::<ProviderKind>().unwrap(), ProviderKind::Custom);
    let err = "cohere".parse::<ProviderKind>().unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedProvider(name) if name == "cohere"));
}

#[test]
fn test_is_complete() {
    assert!(!LlmConfig::default().is_complete());
    assert!(!LlmConfig::new(ProviderKind::OpenAi, "sk-1", "  ").is_complete());
    assert!(LlmConfig::new(ProviderKind::OpenAi, "sk-1", "gpt-4").is_complete());
}

#[test]
fn test_debug_redacts_api_key() {
    let config = LlmConfig::new(ProviderKind::OpenAi, "sk-secret", "gpt-4");
    let debug = format!("{:?}", config);
    assert!(!debug.contains("sk-secret"));
    assert!(debug.contains("has_api_key: true"));
}

#[test]
fn test_with_base_url_empty_is_absent() {
    let config = LlmConfig::new(ProviderKind::Custom, "k", "m").with_base_url("   ");
    assert!(config.base_url.is_none());
}

#[test]
fn test_merged_overrides_only_patched_fields() {
    let base = LlmConfig::new(ProviderKind::OpenAi, "sk-1", "gpt-4")
        .with_base_url("https://proxy.local/v1");
    let patch = ConfigPatch {
        model: Some("gpt-4o".to_string()),
        ..Default::default()
    };
    let merged = base.merged(&patch);
    assert_eq!(merged.model, "gpt-4o");
    assert_eq!(merged.api_key, "sk-1");
    assert_eq!(merged.base_url.as_deref(), Some("https://proxy.local/v1"));
}

#[test]
fn test_merged_empty_base_url_clears() {
    let base = LlmConfig::new(ProviderKind::Custom, "k", "m").with_base_url("http://x/v1");
    let patch = ConfigPatch {
        base_url: Some(String::new()),
        ..Default::default()
    };
    assert!(base.merged(&patch).base_url.is_none());
}

#[test]
fn test_patch_is_empty() {
    assert!(ConfigPatch::default().is_empty());
    let patch = ConfigPatch {
        provider: Some(ProviderKind::Anthropic),
        ..Default::default()
    };
    assert!(!patch.is_empty());
}

#[test]
fn test_store_file_uses_well_known_key() {
    let file = StoreFile {
        llm_config: Some(LlmConfig::new(ProviderKind::Anthropic, "k", "claude")),
    };
    let text = toml::to_string(&file).unwrap();
    assert!(text.contains("[llmConfig]"));
    assert!(text.contains("provider = \"anthropic\""));
    assert!(!text.contains("base_url"));
}

#[test]
fn test_store_file_accepts_camel_case_keys() {
    let text = r#"
        [llmConfig]
        provider = "custom"
        apiKey = "k"
        model = "local"
        baseUrl = "http://localhost:8080/v1"
    "#;
    let file: StoreFile = toml::from_str(text).unwrap();
    let config = file.llm_config.unwrap();
    assert_eq!(config.api_key, "k");
    assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));
}

#[test]
fn test_patch_from_config_replaces_everything() {
    let current = LlmConfig::new(ProviderKind::Custom, "old", "local")
        .with_base_url("http://localhost:8080/v1");
    let next = LlmConfig::new(ProviderKind::OpenAi, "new", "gpt-4");

    let merged = current.merged(&ConfigPatch::from(&next));
    assert_eq!(merged, next);
    assert!(merged.base_url.is_none());
}

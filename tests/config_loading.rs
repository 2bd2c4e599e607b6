//! Integration tests for config loading across all file formats.

use webhook_gateway::config::model::Config;
use webhook_gateway::config::sources::parse_config_str;
use webhook_gateway::config::validation::validate;

fn load_example(name: &str) -> String {
    let path = format!("example/{name}");
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

#[cfg(feature = "yaml")]
#[test]
fn yaml_example_loads_and_validates() {
    let content = load_example("gateway.yaml");
    let config = parse_config_str("yaml", &content, "gateway.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.destinations.len(), 2);
    assert_eq!(config.forwarding.timeout, 25_000);
}

#[cfg(feature = "yaml")]
#[test]
fn yaml_full_example_loads_and_validates() {
    let content = load_example("full.yaml");
    let config = parse_config_str("yaml", &content, "full.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.forwarding.credential_header, "x-make-apikey");
    assert_eq!(config.fanout.timeout, Some(10_000));
    let marker = config.responses.raw_marker.unwrap();
    assert_eq!(marker.field, "success");
    assert_eq!(marker.value, serde_json::json!(true));
}

#[cfg(feature = "json")]
#[test]
fn json_example_loads_and_validates() {
    let content = load_example("gateway.json");
    let config = parse_config_str("json", &content, "gateway.json").unwrap();
    validate(&config).unwrap();
    assert!(!config.destinations.is_empty());
}

#[cfg(feature = "toml")]
#[test]
fn toml_example_loads_and_validates() {
    let content = load_example("gateway.toml");
    let config = parse_config_str("toml", &content, "gateway.toml").unwrap();
    validate(&config).unwrap();
    assert!(!config.destinations.is_empty());
}

#[cfg(all(feature = "yaml", feature = "json", feature = "toml"))]
#[test]
fn all_formats_produce_equivalent_configs() {
    let yaml_config =
        parse_config_str("yaml", &load_example("gateway.yaml"), "yaml").unwrap();
    let json_config =
        parse_config_str("json", &load_example("gateway.json"), "json").unwrap();
    let toml_config =
        parse_config_str("toml", &load_example("gateway.toml"), "toml").unwrap();

    assert_eq!(yaml_config.destinations, json_config.destinations);
    assert_eq!(yaml_config.destinations, toml_config.destinations);
    assert_eq!(yaml_config.forwarding.timeout, json_config.forwarding.timeout);
    assert_eq!(yaml_config.forwarding.timeout, toml_config.forwarding.timeout);
}

#[test]
fn unsupported_format_returns_error() {
    let result = parse_config_str("xml", "{}", "test.xml");
    assert!(result.is_err());
}

#[test]
fn empty_allow_list_fails_validation() {
    let config: Config = serde_json::from_str(r#"{"destinations": []}"#).unwrap();
    assert!(validate(&config).is_err());
}

#[test]
fn unknown_sections_are_refused() {
    let result = serde_json::from_str::<Config>(r#"{"routes": [{"path": "/a"}]}"#);
    assert!(result.is_err());
}

/// Unit tests for the declarative parameter schema and argument coercion
use ladder_core::config::RuntimeDefaults;
use ladder_core::tools::{ParamSpec, ToolDescriptor};
use serde_json::json;

fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new("unit:schema", "schema test tool")
        .param(ParamSpec::string("name", "a name"))
        .param(
            ParamSpec::integer("count", "how many")
                .with_default(json!(5))
                .bounds(1, 20),
        )
        .param(ParamSpec::boolean("flag", "a flag").optional())
        .param(ParamSpec::string_list("tags", "some tags").optional())
        .param(ParamSpec::string("handle", "user handle").default_handle())
}

fn no_defaults() -> RuntimeDefaults {
    RuntimeDefaults::default()
}

#[test]
fn missing_required_parameter_is_rejected() {
    let err = descriptor()
        .validate(&json!({}), &no_defaults())
        .unwrap_err();
    assert!(err.to_string().contains("name"));
}

#[test]
fn string_input_coerces_to_integer() {
    let args = descriptor()
        .validate(&json!({"name": "x", "count": "7"}), &no_defaults())
        .unwrap();
    assert_eq!(args.integer("count"), Some(7));
}

#[test]
fn string_input_coerces_to_boolean() {
    let args = descriptor()
        .validate(&json!({"name": "x", "flag": "true"}), &no_defaults())
        .unwrap();
    assert_eq!(args.boolean("flag"), Some(true));

    let err = descriptor()
        .validate(&json!({"name": "x", "flag": "maybe"}), &no_defaults())
        .unwrap_err();
    assert!(err.to_string().contains("flag"));
}

#[test]
fn numeric_bounds_are_inclusive() {
    for ok in [1, 20] {
        let args = descriptor()
            .validate(&json!({"name": "x", "count": ok}), &no_defaults())
            .unwrap();
        assert_eq!(args.integer("count"), Some(ok));
    }
    for bad in [0, 21] {
        let err = descriptor()
            .validate(&json!({"name": "x", "count": bad}), &no_defaults())
            .unwrap_err();
        assert!(err.to_string().contains("between 1 and 20"));
    }
}

#[test]
fn literal_default_is_substituted() {
    let args = descriptor()
        .validate(&json!({"name": "x"}), &no_defaults())
        .unwrap();
    assert_eq!(args.integer("count"), Some(5));
}

#[test]
fn default_substitution_matches_explicit_value() {
    let defaulted = descriptor()
        .validate(&json!({"name": "x"}), &no_defaults())
        .unwrap();
    let explicit = descriptor()
        .validate(&json!({"name": "x", "count": 5}), &no_defaults())
        .unwrap();
    assert_eq!(defaulted.integer("count"), explicit.integer("count"));
}

#[test]
fn configured_default_handle_fills_identity_parameter() {
    let defaults = RuntimeDefaults {
        default_handle: Some("tourist".into()),
    };
    let args = descriptor().validate(&json!({"name": "x"}), &defaults).unwrap();
    assert_eq!(args.str("handle"), Some("tourist"));
}

#[test]
fn identity_parameter_stays_absent_without_configured_default() {
    let args = descriptor()
        .validate(&json!({"name": "x"}), &no_defaults())
        .unwrap();
    assert!(!args.contains("handle"));
}

#[test]
fn unknown_parameters_are_ignored() {
    let args = descriptor()
        .validate(&json!({"name": "x", "bogus": 42}), &no_defaults())
        .unwrap();
    assert!(!args.contains("bogus"));
}

#[test]
fn comma_separated_string_coerces_to_list() {
    let args = descriptor()
        .validate(&json!({"name": "x", "tags": "dp, graphs,math"}), &no_defaults())
        .unwrap();
    assert_eq!(
        args.string_list("tags"),
        Some(vec!["dp".to_string(), "graphs".to_string(), "math".to_string()])
    );
}

#[test]
fn non_object_arguments_are_rejected() {
    let err = descriptor()
        .validate(&json!([1, 2, 3]), &no_defaults())
        .unwrap_err();
    assert!(err.to_string().contains("object"));
}

#[test]
fn input_schema_reflects_declared_parameters() {
    let schema = descriptor().input_schema();
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["count"]["default"], 5);
    assert_eq!(schema["properties"]["count"]["minimum"], 1);
    assert_eq!(schema["properties"]["tags"]["type"], "array");

    let required: Vec<&str> = schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(required, vec!["name"]);
}

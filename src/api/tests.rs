use super::*;

fn secret_ref() -> ResourceRef {
    ResourceRef {
        kind: ResourceKind::Secret,
        name: String::from("db-credentials"),
        namespace: String::from("prod"),
    }
}

fn config_ref() -> ResourceRef {
    ResourceRef {
        kind: ResourceKind::Config,
        name: String::from("feature-flags"),
        namespace: String::from("prod"),
    }
}

#[test]
fn test_decode_secret_query() {
    let body = r#"{
        "data": {
            "secret": {
                "name": "db-credentials",
                "namespace": "prod",
                "stringData": { "USER": "admin", "PASSWORD": "hunter2" }
            }
        }
    }"#;

    let data: BTreeMap<String, Value> = decode_response(200, body).unwrap();
    let snapshot = snapshot_from_data(&secret_ref(), data).unwrap();

    assert_eq!(snapshot.resource, secret_ref());
    assert_eq!(snapshot.data.len(), 2);
    assert_eq!(snapshot.data["USER"], "admin");
    assert_eq!(snapshot.data["PASSWORD"], "hunter2");
}

#[test]
fn test_decode_config_query_with_null_data() {
    let body = r#"{ "data": { "config": { "name": "feature-flags", "data": null } } }"#;

    let data: BTreeMap<String, Value> = decode_response(200, body).unwrap();
    let snapshot = snapshot_from_data(&config_ref(), data).unwrap();

    assert!(snapshot.data.is_empty());
}

#[test]
fn test_missing_resource_is_not_found() {
    let body = r#"{ "data": { "secret": null } }"#;

    let data: BTreeMap<String, Value> = decode_response(200, body).unwrap();
    let err = snapshot_from_data(&secret_ref(), data).unwrap_err();

    assert_eq!(err.to_string(), "secret prod/db-credentials not found");
}

#[test]
fn test_graphql_errors_are_joined() {
    let body = r#"{
        "data": null,
        "errors": [ { "message": "forbidden" }, { "message": "namespace is locked" } ]
    }"#;

    let err = decode_response::<BTreeMap<String, Value>>(200, body).unwrap_err();
    assert_eq!(
        err.to_string(),
        "server rejected request: forbidden; namespace is locked"
    );
}

#[test]
fn test_graphql_errors_on_error_status() {
    let body = r#"{ "errors": [ { "message": "unauthenticated" } ] }"#;

    let err = decode_response::<BTreeMap<String, Value>>(401, body).unwrap_err();
    assert!(err.to_string().contains("unauthenticated"));
}

#[test]
fn test_non_json_error_status() {
    let err = decode_response::<BTreeMap<String, Value>>(502, "bad gateway\n").unwrap_err();
    assert_eq!(err.to_string(), "server returned status 502: bad gateway");
}

#[test]
fn test_response_without_data() {
    let err = decode_response::<BTreeMap<String, Value>>(200, "{}").unwrap_err();
    assert!(err.to_string().contains("no data"));
}

#[test]
fn test_update_variables_use_kind_specific_argument() {
    let data = BTreeMap::from([(String::from("A"), String::from("1"))]);
    let author = Author {
        name: String::from("Test User"),
        email: Some(String::from("test@example.com")),
    };

    let secret = update_variables(&secret_ref(), &data, &author);
    assert_eq!(
        secret,
        json!({
            "name": "db-credentials",
            "namespace": "prod",
            "stringData": { "A": "1" },
            "author": { "name": "Test User", "email": "test@example.com" }
        })
    );

    let config = update_variables(&config_ref(), &data, &author);
    assert_eq!(config["data"], json!({ "A": "1" }));
    assert!(config.get("stringData").is_none());
}

#[test]
fn test_operations_name_their_fields() {
    for kind in [ResourceKind::Secret, ResourceKind::Config] {
        let ops = operations(kind);
        assert!(ops.query.contains(ops.query_field));
        assert!(ops.mutation.contains(ops.mutation_field));
        assert!(ops.mutation.contains(&format!("${}", ops.data_argument)));
    }
}

use knit_json::{QueryErrorKind, QueryPath, array_get, from_str, object_get, query};
use knit_testhelpers::{IPanic, test};
use knit_value::{Value, value};

fn doc() -> Value {
    from_str(r#"["Hello","World",null,{"okay":true,"pi":3.1415,"leet":1337}]"#).unwrap()
}

#[test]
fn selects_nested_values() {
    let doc = doc();
    assert_eq!(query(&doc, ".[3].okay").unwrap(), Value::Bool(true));
    assert_eq!(query(&doc, ".[3].leet").unwrap(), Value::Integer(1337));
    assert_eq!(query(&doc, ".[3].\"pi\"").unwrap(), Value::Real(3.1415));
    assert_eq!(query(&doc, ".[0]").unwrap(), Value::from("Hello"));
}

#[test]
fn absent_targets_are_null_not_errors() {
    let doc = doc();
    assert!(query(&doc, ".[4]").unwrap().is_null());
    assert!(query(&doc, ".[3].missing").unwrap().is_null());
    assert!(query(&doc, ".[2]").unwrap().is_null());
}

#[test]
fn wrong_shapes_are_errors() {
    let doc = doc();
    let mismatch = |path: &str| match query(&doc, path).unwrap_err().kind {
        QueryErrorKind::TypeMismatch { step, found, .. } => (step, found),
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(mismatch(".okay"), (0, "array"));
    assert_eq!(mismatch(".[3].[0]"), (1, "object"));
    assert_eq!(mismatch(".[0].len"), (1, "string"));
    // a null from a missing step cannot be navigated further
    assert_eq!(mismatch(".[9].x"), (1, "null"));
}

#[test]
fn empty_path_copies_root() {
    let doc = doc();
    assert_eq!(query(&doc, "").unwrap(), doc);
    assert_eq!(query(&doc, ".").unwrap(), doc);
}

#[test]
fn result_is_independent() {
    let doc = doc();
    let mut picked = query(&doc, ".[3]").unwrap();
    if let Some(object) = picked.as_object_mut() {
        object.push("extra", 1);
    }
    assert_eq!(doc.at(3).and_then(Value::as_object).map(|o| o.len()), Some(3));
}

#[test]
fn quoted_keys_may_contain_dots() {
    let doc = value!({"a.b": {"c": 1}, "a": {"b": 2}});
    assert_eq!(query(&doc, r#"."a.b".c"#).unwrap(), Value::Integer(1));
    assert_eq!(query(&doc, ".a.b").unwrap(), Value::Integer(2));
}

#[test]
fn compiled_paths_are_reusable() {
    let path: QueryPath = ".[1]".parse().unwrap();
    assert_eq!(path.resolve(&value!([1, 2])).unwrap(), Value::Integer(2));
    assert_eq!(path.resolve(&value!(["x", "y"])).unwrap(), Value::from("y"));
    assert_eq!(path.resolve_ref(&value!([])).unwrap(), &Value::Null);
}

#[test]
fn direct_getters() {
    let doc = doc();
    assert_eq!(array_get(&doc, 1).unwrap(), Value::from("World"));
    assert!(array_get(&doc, 99).unwrap().is_null());
    assert!(object_get(&doc, "x").is_err());

    let inner = doc.at(3).unwrap();
    assert_eq!(object_get(inner, "okay").unwrap(), Value::Bool(true));
    assert!(object_get(inner, "nope").unwrap().is_null());
    assert!(array_get(inner, 0).is_err());
}

#[test]
fn oversized_index_is_null() -> Result<(), IPanic> {
    let doc = from_str(r#"["a"]"#)?;
    assert!(query(&doc, ".[99999999999999999999999]")?.is_null());
    assert!(array_get(&doc, usize::MAX)?.is_null());
    Ok(())
}

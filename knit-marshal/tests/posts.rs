use core::any::Any;

use knit_marshal::{MarshalErrorKind, Object, Registry, Result, Value, aggregate, field};
use knit_testhelpers::test;

aggregate! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct User as ["user_t"] {
        pub uid: required("long long") i64,
        pub username: required("string") String,
        pub email: required("string") String,
    }
}

aggregate! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Post as ["post_t", "post"] {
        pub name: required("string") String,
        pub content: required("string") String,
        pub views: optional("long") i64,
        pub user: required("user_t") User,
    }
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_type::<User>().unwrap();
    registry.register_type::<Post>().unwrap();
    registry
}

fn ann() -> User {
    User {
        uid: 1,
        username: "ann".into(),
        email: "ann@example.org".into(),
    }
}

#[test]
fn post_round_trips() {
    let registry = registry();
    let post = Post {
        name: "hello".into(),
        content: "first \"post\"\n".into(),
        views: Some(Box::new(12)),
        user: ann(),
    };
    let text = registry.to_string(&post).unwrap();
    assert_eq!(
        text,
        r#"{"name":"hello","content":"first \"post\"\n","views":12,"user":{"uid":1,"username":"ann","email":"ann@example.org"}}"#
    );
    let back: Post = registry.from_str(&text).unwrap().unwrap();
    assert_eq!(back, post);
}

#[test]
fn either_alias_reaches_the_same_entry() {
    let registry = registry();
    let text = r#"{"name":"n","content":"c","views":null,"user":{"uid":2,"username":"bo","email":"b@o"}}"#;
    let a = registry.unmarshal("post_t", text).unwrap().unwrap();
    let b = registry.unmarshal("post", text).unwrap().unwrap();
    assert_eq!(a.downcast_ref::<Post>(), b.downcast_ref::<Post>());
    assert!(a.downcast_ref::<Post>().unwrap().views.is_none());
    registry.destroy("post", a).unwrap();
    registry.destroy("post_t", b).unwrap();
}

#[test]
fn missing_nested_field_reports_its_path() {
    let registry = registry();
    let text = r#"{"name":"n","content":"c","user":{"uid":null,"username":"bo","email":"b@o"}}"#;
    let err = registry.from_str::<Post>(text).unwrap_err();
    insta::assert_snapshot!(err, @"at .user.uid: required field of type `long long` is null or missing");
}

#[test]
fn posts_marshal_as_an_array() {
    let registry = registry();
    let first = Post {
        name: "a".into(),
        content: "x".into(),
        views: None,
        user: ann(),
    };
    let items = [Some(&first as &dyn Any), None];
    assert_eq!(
        registry.marshal_array("post_t", &items).unwrap(),
        r#"[{"name":"a","content":"x","views":null,"user":{"uid":1,"username":"ann","email":"ann@example.org"}},null]"#
    );
}

/// Registered with raw functions; elements go back through the registry as `string`.
#[derive(Debug)]
struct Tags(Vec<String>);

fn marshal_tags(registry: &Registry, value: &dyn Any) -> Result<Value> {
    let Some(tags) = value.downcast_ref::<Tags>() else {
        return Ok(Value::Null);
    };
    tags.0
        .iter()
        .map(|tag| registry.marshal_value("string", Some(tag as &dyn Any)))
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

fn unmarshal_tags(registry: &Registry, value: &Value) -> Result<Box<dyn Any>> {
    let mut tags = Vec::new();
    for item in value.as_array().unwrap_or_default() {
        if let Some(tag) = registry.unmarshal_value("string", item)? {
            if let Ok(tag) = tag.downcast::<String>() {
                tags.push(*tag);
            }
        }
    }
    Ok(Box::new(Tags(tags)))
}

fn destroy_tags(_: &Registry, value: Box<dyn Any>) -> Result<()> {
    drop(value);
    Ok(())
}

aggregate! {
    #[derive(Debug)]
    struct Tagged as ["tagged_t"] {
        tags: required("tags") Tags,
    }
}

#[test]
fn raw_entries_nest_inside_aggregates() {
    let mut registry = Registry::new();
    registry
        .register(&["tags"], marshal_tags, unmarshal_tags, destroy_tags)
        .unwrap();
    registry.register_type::<Tagged>().unwrap();

    let tagged: Tagged = registry
        .from_str(r#"{"tags":["a",null,"b"]}"#)
        .unwrap()
        .unwrap();
    assert_eq!(tagged.tags.0, ["a", "b"]);
    assert_eq!(registry.to_string(&tagged).unwrap(), r#"{"tags":["a","b"]}"#);

    let err = registry.from_str::<Tagged>(r#"{"tags":[1]}"#).unwrap_err();
    assert!(matches!(err.kind, MarshalErrorKind::TypeMismatch { .. }));
    assert_eq!(err.path_string(), ".tags");

    let mut out = Object::new();
    field::marshal_required(&registry, &mut out, "t", "tags", &Tags(vec!["z".into()])).unwrap();
    assert_eq!(out.get("t"), Some(&Value::array([Value::from("z")])));
}

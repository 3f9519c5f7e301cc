use core::any::Any;

use knit_marshal::{MarshalErrorKind, Registry, aggregate};
use knit_testhelpers::test;

aggregate! {
    #[derive(Debug, PartialEq)]
    pub struct Inner as ["struct_t"] {
        pub int_value as "intValue": required("int") i32,
    }
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_type::<Inner>().unwrap();
    registry
}

fn as_any<T: Any>(items: &[T]) -> Vec<Option<&dyn Any>> {
    items.iter().map(|item| Some(item as &dyn Any)).collect()
}

#[test]
fn scalar_arrays_marshal() {
    let registry = registry();
    let ints = [1i32, 2, 3, 4];
    assert_eq!(registry.marshal_array("int", &as_any(&ints)).unwrap(), "[1,2,3,4]");

    let longs: Vec<i64> = (0..6).collect();
    assert_eq!(
        registry.marshal_array("long", &as_any(&longs)).unwrap(),
        "[0,1,2,3,4,5]"
    );

    assert_eq!(registry.marshal_array("int", &[]).unwrap(), "[]");
}

#[test]
fn aggregate_arrays_marshal() {
    let registry = registry();
    let items = [Inner { int_value: 42 }, Inner { int_value: 1337 }];
    assert_eq!(
        registry.marshal_array("struct_t", &as_any(&items)).unwrap(),
        r#"[{"intValue":42},{"intValue":1337}]"#
    );
}

#[test]
fn absent_elements_are_null_both_ways() {
    let registry = registry();
    let (one, three) = (1i32, 3i32);
    let items = [Some(&one as &dyn Any), None, Some(&three as &dyn Any)];
    assert_eq!(registry.marshal_array("int", &items).unwrap(), "[1,null,3]");

    let back = registry.unmarshal_array("int", "[1,null,3]").unwrap();
    let back: Vec<Option<i32>> = back
        .iter()
        .map(|item| item.as_ref().and_then(|b| b.downcast_ref::<i32>().copied()))
        .collect();
    assert_eq!(back, [Some(1), None, Some(3)]);
}

#[test]
fn aggregate_arrays_unmarshal() {
    let registry = registry();
    let items = registry
        .unmarshal_array("struct_t", r#"[{"intValue":42},{"intValue":1337}]"#)
        .unwrap();
    let values: Vec<i32> = items
        .iter()
        .flatten()
        .filter_map(|b| b.downcast_ref::<Inner>())
        .map(|inner| inner.int_value)
        .collect();
    assert_eq!(values, [42, 1337]);
    registry.destroy_array("struct_t", items).unwrap();
}

#[test]
fn null_document_is_an_empty_array() {
    let registry = registry();
    assert!(registry.unmarshal_array("int", "null").unwrap().is_empty());
    assert!(registry.unmarshal_array("int", " [ ] ").unwrap().is_empty());
}

#[test]
fn non_array_document_is_rejected() {
    let registry = registry();
    let err = registry.unmarshal_array("int", "{}").unwrap_err();
    assert!(matches!(
        err.kind,
        MarshalErrorKind::TypeMismatch {
            expected: "an array",
            got: "object",
            ..
        }
    ));
}

#[test]
fn element_errors_carry_their_index() {
    let registry = registry();
    let err = registry
        .unmarshal_array("struct_t", r#"[{"intValue":1},{"intValue":null}]"#)
        .unwrap_err();
    assert_eq!(err.path_string(), "[1].intValue");

    let items = [1i32, 2];
    let mut refs = as_any(&items);
    refs.push(Some(&"three" as &dyn Any));
    let err = registry.marshal_array("int", &refs).unwrap_err();
    assert_eq!(err.path_string(), "[2]");
    assert!(matches!(err.kind, MarshalErrorKind::HostTypeMismatch { .. }));
}

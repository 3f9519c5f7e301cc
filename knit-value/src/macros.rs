/// Builds a [`Value`](crate::Value) from JSON-like syntax.
///
/// Keys must be string literals. Nested arrays and objects are written
/// inline; any other expression is converted with `Value::from`.
///
/// ```
/// use knit_value::{Value, value};
///
/// let v = value!({
///     "name": "knit",
///     "tags": ["json", null],
///     "depth": 3,
/// });
/// assert_eq!(v.get("depth"), Some(&Value::Integer(3)));
/// assert!(v.get("tags").and_then(|t| t.at(1)).is_some_and(Value::is_null));
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(::std::vec![ $( $crate::value!($elem) ),* ])
    };

    ({ $($key:literal : $val:tt),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut object = $crate::Object::new();
        $( object.push($key, $crate::value!($val)); )*
        $crate::Value::Object(object)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Object, Value};

    #[test]
    fn literals_and_nesting() {
        assert_eq!(value!(null), Value::Null);
        assert_eq!(value!(true), Value::Bool(true));
        assert_eq!(value!([]), Value::Array(Vec::new()));
        assert_eq!(value!({}), Value::Object(Object::new()));

        let v = value!({"a": [1, {"b": "c"}], "d": 2.5});
        assert_eq!(v.get("a").and_then(|a| a.at(0)), Some(&Value::Integer(1)));
        assert_eq!(
            v.get("a").and_then(|a| a.at(1)).and_then(|o| o.get("b")),
            Some(&Value::from("c"))
        );
        assert_eq!(v.get("d"), Some(&Value::Real(2.5)));
    }

    #[test]
    fn negative_numbers_need_parens() {
        let v = value!([(-1), (-2.5)]);
        assert_eq!(v.at(0), Some(&Value::Integer(-1)));
        assert_eq!(v.at(1), Some(&Value::Real(-2.5)));
    }
}

use knit_json::{encoded_len, from_str, to_string, to_writer_std};
use knit_testhelpers::{IPanic, test};
use knit_value::{Value, value};

fn sample() -> Value {
    value!({
        "name": "knit",
        "escapes": "a\"b\\c/d\n\t",
        "int": (-9223372036854775807i64),
        "real": 3.141592,
        "small": 0.000001,
        "whole": 2.0,
        "flags": [true, false, null],
        "nested": {"empty_list": [], "empty_object": {}, "unicode": "日本語"},
    })
}

#[test]
fn escaping_quote_and_backslash() {
    assert_eq!(to_string(&Value::from("a\"b\\c")), r#""a\"b\\c""#);
}

#[test]
fn parse_of_serialize_is_identity() {
    let v = sample();
    let text = to_string(&v);
    assert_eq!(text.len(), encoded_len(&v));
    assert_eq!(from_str(&text).unwrap(), v);
}

#[test]
fn output_is_valid_json_for_other_parsers() {
    let text = to_string(&sample());
    let oracle: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(oracle["name"], "knit");
    assert_eq!(oracle["escapes"], "a\"b\\c/d\n\t");
    assert_eq!(oracle["real"], 3.141592);
    assert_eq!(oracle["whole"], 2.0);
    assert_eq!(oracle["nested"]["unicode"], "日本語");
    assert!(oracle["flags"][2].is_null());
}

#[test]
fn serialized_text_is_stable_across_a_round_trip() {
    let text = r#"{"i":1,"p":null,"r":[1.5,-0.25,100.0],"s":"x\/y"}"#;
    let parsed = from_str(text).unwrap();
    assert_eq!(to_string(&parsed), text);
}

#[test]
fn clone_serializes_identically() {
    let original = sample();
    let clone = original.clone();
    assert_eq!(to_string(&clone), to_string(&original));
    drop(clone);
    assert_eq!(original.get("name").and_then(Value::as_str), Some("knit"));
}

#[test]
fn reals_never_use_exponents() {
    for r in [1e21, 1.5e-9, -1e100, 123456789.125] {
        let text = to_string(&Value::Real(r));
        assert!(!text.contains(['e', 'E']), "{text}");
        assert_eq!(from_str(&text).unwrap(), Value::Real(r));
    }
}

#[test]
fn writer_receives_same_bytes() {
    let v = sample();
    let mut out = Vec::new();
    to_writer_std(&mut out, &v).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), to_string(&v));
}

#[test]
fn unescaped_control_bytes_survive_a_round_trip() -> Result<(), IPanic> {
    for s in ["a\u{1}b", "\u{0}", "x\u{1f}y\u{7}", "tab\tand\u{b}vt"] {
        let v = Value::from(s);
        let text = to_string(&v);
        assert_eq!(text.len(), encoded_len(&v));
        assert_eq!(from_str(&text)?, v, "{text:?}");
    }
    Ok(())
}

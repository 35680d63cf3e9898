// These are separated so as not to confuse some test code that greps output.rs for strings that
// look like field names.

use crate::error::{Error, ErrorKind, MultiError};
use crate::output::{envelope_err, envelope_multi, envelope_ok, format_csv_value, write_json};
use crate::output::{Array, Object, Value};

#[test]
pub fn test_json() {
    let mut a = Array::new();
    let mut o = Object::new();
    o.push_o("o", Object::new());
    o.push_a("a", Array::new());
    o.push_s("s", r#"hello, "sir""#.to_string());
    o.push_u("u", 123);
    o.push_i("i", -12);
    o.push_d("t", 42.35, 2);
    o.push_d("p", 120.5, 2);
    o.push_d("bw", 0.117, 3);
    o.push_n("n");
    a.push_o(o);
    a.push_s(r#"stri\ng"#.to_string());
    let expect = concat!(
        r#"[{"o":{},"a":[],"s":"hello, \"sir\"","u":123,"i":-12,"t":42.35,"p":120.50,"bw":0.117,"n":null},"stri\\ng"]"#,
        "\n",
    );
    let mut output = Vec::new();
    write_json(&mut output, &Value::A(a));
    let got = String::from_utf8_lossy(&output);
    assert!(expect == got);
}

#[test]
pub fn test_csv() {
    let mut o = Object::new();
    o.push_u("device", 0);
    o.push_s("bdf", "0000:23:04.0".to_string());
    o.push_d("temp", 42.0, 2);
    o.push_n("power");
    o.push_s("name", "a,b".to_string());
    assert!(
        format_csv_value(&Value::O(o)) == r#"device=0,bdf=0000:23:04.0,temp=42.00,power=,"name=a,b""#
    );
}

#[test]
pub fn test_nonfinite_is_null() {
    let mut o = Object::new();
    o.push_d("x", f64::NAN, 2);
    o.push_d("y", f64::INFINITY, 3);
    let mut output = Vec::new();
    write_json(&mut output, &Value::O(o));
    assert!(String::from_utf8_lossy(&output) == "{\"x\":null,\"y\":null}\n");
}

#[test]
pub fn test_envelopes() {
    let ok = envelope_ok(Value::U(4));
    assert!(ok.get("message") == Some(&Value::S("success".to_string())));
    assert!(ok.get("data") == Some(&Value::U(4)));

    let e = Error::invalid("sclk", "unsupported frequency '777' MHz");
    let err = envelope_err(&e);
    assert!(err.get("message") == Some(&Value::S("sclk: unsupported frequency '777' MHz".to_string())));
    assert!(err.get("data") == Some(&Value::N()));

    let mut m = MultiError::new();
    m.push("dvInd", Error::invalid("dvInd", "negative device index -1"));
    m.push("perfLevel", Error::invalid("performance level", "unknown value 'FOO'"));
    let env = envelope_multi(&m);
    match env.get("data") {
        Some(Value::A(a)) => assert!(a.len() == 2),
        _ => panic!("expected array"),
    }
    assert!(m.kind() == ErrorKind::InvalidArgument);
    assert!(m.kind().http_status() == 400);
}

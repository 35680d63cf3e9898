// A nested data structure of arrays, objects, and scalar values that records are rendered into and
// that can subsequently be serialized as JSON or CSV.
//
// Readings with a fixed number of decimals (temperatures, power, clocks, throughput) are carried
// as Value::D so that both serializations print exactly that many decimals.

use crate::error::{Error, MultiError};
use crate::util;

use std::io;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    A(Array),
    O(Object),
    S(String),
    U(u64),
    I(i64),
    D(f64, usize), // Value and number of decimals
    B(bool),
    N(), // null
}

#[derive(Debug, Clone, PartialEq)]
struct Field {
    tag: String,
    value: Value,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    fields: Vec<Field>,
}

impl Object {
    pub fn new() -> Object {
        Object { fields: vec![] }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.tag == key).map(|f| &f.value)
    }

    pub fn push(&mut self, tag: &str, value: Value) {
        self.fields.push(Field {
            tag: tag.to_string(),
            value,
        })
    }

    pub fn push_o(&mut self, tag: &str, o: Object) {
        self.push(tag, Value::O(o));
    }

    pub fn push_a(&mut self, tag: &str, a: Array) {
        self.push(tag, Value::A(a));
    }

    pub fn push_s(&mut self, tag: &str, s: String) {
        self.push(tag, Value::S(s));
    }

    pub fn push_u(&mut self, tag: &str, u: u64) {
        self.push(tag, Value::U(u));
    }

    pub fn push_i(&mut self, tag: &str, i: i64) {
        self.push(tag, Value::I(i));
    }

    pub fn push_d(&mut self, tag: &str, f: f64, places: usize) {
        self.push(tag, Value::D(f, places));
    }

    pub fn push_n(&mut self, tag: &str) {
        self.push(tag, Value::N());
    }

    // Optional readings: the value if present, else null.
    pub fn push_opt_d(&mut self, tag: &str, f: Option<f64>, places: usize) {
        match f {
            Some(f) => self.push_d(tag, f, places),
            None => self.push_n(tag),
        }
    }

    pub fn push_opt_u(&mut self, tag: &str, u: Option<u64>) {
        match u {
            Some(u) => self.push_u(tag, u),
            None => self.push_n(tag),
        }
    }

    pub fn push_opt_i(&mut self, tag: &str, i: Option<i64>) {
        match i {
            Some(i) => self.push_i(tag, i),
            None => self.push_n(tag),
        }
    }

    pub fn push_opt_s(&mut self, tag: &str, s: Option<String>) {
        match s {
            Some(s) => self.push_s(tag, s),
            None => self.push_n(tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array {
    elements: Vec<Value>,
}

impl Array {
    pub fn new() -> Array {
        Array { elements: vec![] }
    }

    pub fn push(&mut self, value: Value) {
        self.elements.push(value)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn at(&self, i: usize) -> &Value {
        &self.elements[i]
    }

    pub fn push_o(&mut self, o: Object) {
        self.push(Value::O(o));
    }

    pub fn push_a(&mut self, a: Array) {
        self.push(Value::A(a));
    }

    pub fn push_s(&mut self, s: String) {
        self.push(Value::S(s));
    }

    pub fn push_u(&mut self, u: u64) {
        self.push(Value::U(u));
    }

    pub fn push_i(&mut self, i: i64) {
        self.push(Value::I(i));
    }

    pub fn push_n(&mut self) {
        self.push(Value::N());
    }
}

fn format_scalar(v: &Value) -> String {
    match v {
        Value::U(u) => u.to_string(),
        Value::I(i) => i.to_string(),
        Value::D(f, places) => format!("{f:.places$}"),
        Value::B(b) => b.to_string(),
        _ => String::new(),
    }
}

// Output goes to stdout or a test buffer; a failed write has nowhere to be reported.
fn emit(writer: &mut dyn io::Write, line: String) {
    let _ = writer.write_all(line.as_bytes());
    let _ = writer.write_all(b"\n");
}

// JSON, one document per line.  Non-finite numbers have no JSON form and become null.

pub fn write_json(writer: &mut dyn io::Write, v: &Value) {
    emit(writer, format_json_value(v));
}

pub fn format_json_value(v: &Value) -> String {
    match v {
        Value::A(a) => {
            let elts = a.elements.iter().map(format_json_value).collect::<Vec<String>>();
            format!("[{}]", elts.join(","))
        }
        Value::O(o) => {
            let fields = o
                .fields
                .iter()
                .map(|f| format!("\"{}\":{}", util::json_quote(&f.tag), format_json_value(&f.value)))
                .collect::<Vec<String>>();
            format!("{{{}}}", fields.join(","))
        }
        Value::S(s) => format!("\"{}\"", util::json_quote(s)),
        Value::N() => "null".to_string(),
        Value::D(f, _) if !f.is_finite() => "null".to_string(),
        _ => format_scalar(v),
    }
}

// CSV, one record per line.  An object is a list of TAG=VALUE fields and an array a list of
// values, both comma-separated; null is empty.  A field or value holding a comma or a quote is
// quoted by util::csv_quote.  Nested records quote badly, the JSON form suits them better.

pub fn write_csv(writer: &mut dyn io::Write, v: &Value) {
    emit(writer, format_csv_value(v));
}

pub fn format_csv_value(v: &Value) -> String {
    match v {
        Value::A(a) => a
            .elements
            .iter()
            .map(|elt| util::csv_quote(&format_csv_value(elt)))
            .collect::<Vec<String>>()
            .join(","),
        Value::O(o) => o
            .fields
            .iter()
            .map(|f| util::csv_quote(&format!("{}={}", f.tag, format_csv_value(&f.value))))
            .collect::<Vec<String>>()
            .join(","),
        Value::S(s) => s.clone(),
        Value::N() => String::new(),
        Value::D(f, _) if !f.is_finite() => String::new(),
        _ => format_scalar(v),
    }
}

// The {message, data} envelope used for every response document.

pub fn envelope_ok(data: Value) -> Object {
    let mut envelope = Object::new();
    envelope.push_s("message", "success".to_string());
    envelope.push("data", data);
    envelope
}

pub fn envelope_err(e: &Error) -> Object {
    let mut envelope = Object::new();
    envelope.push_s("message", e.message.clone());
    envelope.push_n("data");
    envelope
}

// A failed compound operation lists what failed under "data".
pub fn envelope_multi(e: &MultiError) -> Object {
    let mut failures = Array::new();
    for (what, err) in &e.errors {
        let mut f = Object::new();
        f.push_s("field", what.clone());
        f.push_s("kind", err.kind.name().to_string());
        f.push_s("message", err.message.clone());
        failures.push_o(f);
    }
    let mut envelope = Object::new();
    envelope.push_s("message", e.to_string());
    envelope.push_a("data", failures);
    envelope
}

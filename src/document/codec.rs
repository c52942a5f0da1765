//! Structural walk over a JSON document that rewrites only sensitive
//! string leaves.
//!
//! Arrays are mapped element-wise and objects property-wise, keeping key
//! and element order.  When a property is classified sensitive and its
//! value is a string, the walk stops there and the transform decides the
//! new value.  Every other node is rebuilt unchanged.

use std::convert::Infallible;

use serde_json::{Map, Value};

use super::fields::is_sensitive;

/// Rebuild `doc`, replacing each sensitive string with `f(key, value)`.
pub fn transform<F>(doc: &Value, mut f: F) -> Value
where
    F: FnMut(&str, &str) -> String,
{
    let result: Result<Value, Infallible> =
        walk(doc, None, &mut |key: &str, value: &str| Ok(f(key, value)));
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Like [`transform`], but stops at the first error returned by `f`.
pub fn try_transform<E, F>(doc: &Value, mut f: F) -> Result<Value, E>
where
    F: FnMut(&str, &str) -> Result<String, E>,
{
    walk(doc, None, &mut f)
}

/// Returns `true` if `pred` holds for any sensitive string in `doc`.
///
/// Stops at the first match.
pub fn any_sensitive<F>(doc: &Value, mut pred: F) -> bool
where
    F: FnMut(&str, &str) -> bool,
{
    visit(doc, None, &mut pred)
}

// Array elements inherit the key that owns the array, so
// `smtpSettings: [{ "pass": ... }]` is classified like the object form.
fn walk<E, F>(node: &Value, parent: Option<&str>, f: &mut F) -> Result<Value, E>
where
    F: FnMut(&str, &str) -> Result<String, E>,
{
    match node {
        Value::Array(items) => items
            .iter()
            .map(|item| walk(item, parent, f))
            .collect::<Result<Vec<_>, E>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                let rebuilt = match value {
                    Value::String(s) if is_sensitive(parent, key) => {
                        Value::String(f(key.as_str(), s.as_str())?)
                    }
                    _ => walk(value, Some(key.as_str()), f)?,
                };
                out.insert(key.clone(), rebuilt);
            }
            Ok(Value::Object(out))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(node.clone()),
    }
}

fn visit<F>(node: &Value, parent: Option<&str>, pred: &mut F) -> bool
where
    F: FnMut(&str, &str) -> bool,
{
    match node {
        Value::Array(items) => items.iter().any(|item| visit(item, parent, pred)),
        Value::Object(map) => map.iter().any(|(key, value)| match value {
            Value::String(s) if is_sensitive(parent, key) => pred(key.as_str(), s.as_str()),
            _ => visit(value, Some(key.as_str()), pred),
        }),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mark(_: &str, value: &str) -> String {
        format!("<{value}>")
    }

    #[test]
    fn only_sensitive_strings_change() {
        let doc = json!({
            "username": "admin",
            "password": "secret123",
            "age": 42,
            "active": true,
            "token": null
        });

        let out = transform(&doc, mark);
        assert_eq!(
            out,
            json!({
                "username": "admin",
                "password": "<secret123>",
                "age": 42,
                "active": true,
                "token": null
            })
        );
    }

    #[test]
    fn nested_structure_and_order_are_preserved() {
        let doc = json!({
            "zeta": 1,
            "teams": [
                { "name": "a", "members": [{ "password": "p1" }, { "password": "p2" }] },
                { "name": "b", "members": [] }
            ],
            "alpha": { "token": "t", "meta": [1, "two", 3.5, false, null] }
        });

        let out = transform(&doc, mark);

        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "teams", "alpha"]);
        assert_eq!(out["teams"][0]["members"][0]["password"], "<p1>");
        assert_eq!(out["teams"][0]["members"][1]["password"], "<p2>");
        assert_eq!(out["teams"][1]["name"], "b");
        assert_eq!(out["alpha"]["token"], "<t>");
        assert_eq!(out["alpha"]["meta"], json!([1, "two", 3.5, false, null]));
    }

    #[test]
    fn smtp_pass_is_transformed_but_plain_pass_is_not() {
        let doc = json!({
            "pass": "visible",
            "smtpSettings": { "host": "mail.example.com", "user": "bot", "pass": "hidden" }
        });

        let out = transform(&doc, mark);
        assert_eq!(out["pass"], "visible");
        assert_eq!(out["smtpSettings"]["pass"], "<hidden>");
        assert_eq!(out["smtpSettings"]["host"], "mail.example.com");
        assert_eq!(out["smtpSettings"]["user"], "bot");
    }

    #[test]
    fn non_string_sensitive_values_are_walked() {
        let doc = json!({ "password": { "password": "inner" } });
        let out = transform(&doc, mark);
        assert_eq!(out, json!({ "password": { "password": "<inner>" } }));
    }

    #[test]
    fn transform_receives_the_property_name() {
        let doc = json!({ "token": "t", "smtpSettings": { "pass": "p" } });
        let mut seen = Vec::new();
        transform(&doc, |key, value| {
            seen.push(key.to_string());
            value.to_string()
        });
        assert_eq!(seen, ["token", "pass"]);
    }

    #[test]
    fn scalar_documents_pass_through() {
        assert_eq!(transform(&json!("password"), mark), json!("password"));
        assert_eq!(transform(&json!(null), mark), json!(null));
    }

    #[test]
    fn try_transform_stops_on_error() {
        let doc = json!([{ "password": "a" }, { "password": "b" }]);
        let mut calls = 0;
        let result: Result<Value, &str> = try_transform(&doc, |_, _| {
            calls += 1;
            Err("boom")
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 1);
    }

    #[test]
    fn any_sensitive_short_circuits() {
        let doc = json!([{ "password": "a" }, { "password": "b" }, { "token": "c" }]);
        let mut calls = 0;
        let found = any_sensitive(&doc, |_, value| {
            calls += 1;
            value == "b"
        });
        assert!(found);
        assert_eq!(calls, 2);
    }
}

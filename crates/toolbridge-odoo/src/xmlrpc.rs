//! Minimal XML-RPC codec covering the subset the Odoo external API speaks:
//! `int`/`i4`, `boolean`, `string`, `double`, `nil`, `array` and `struct`
//! values, mapped to and from `serde_json::Value`. Requests are serialized
//! as `methodCall` documents; responses parse from `methodResponse`, with
//! `<fault>` surfacing as [`OdooError::Fault`].

use crate::error::{OdooError, OdooResult};
use serde_json::{Map, Value};

/// Serialize a `methodCall` document with one `<param>` per value.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?><methodCall><methodName>");
    escape_into(method, &mut out);
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        encode_value(param, &mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn encode_value(value: &Value, out: &mut String) {
    out.push_str("<value>");
    match value {
        Value::Null => out.push_str("<nil/>"),
        Value::Bool(b) => {
            out.push_str("<boolean>");
            out.push(if *b { '1' } else { '0' });
            out.push_str("</boolean>");
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                out.push_str("<int>");
                out.push_str(&i.to_string());
                out.push_str("</int>");
            } else {
                out.push_str("<double>");
                out.push_str(&n.as_f64().unwrap_or_default().to_string());
                out.push_str("</double>");
            }
        }
        Value::String(s) => {
            out.push_str("<string>");
            escape_into(s, out);
            out.push_str("</string>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                encode_value(item, out);
            }
            out.push_str("</data></array>");
        }
        Value::Object(map) => {
            out.push_str("<struct>");
            for (name, item) in map {
                out.push_str("<member><name>");
                escape_into(name, out);
                out.push_str("</name>");
                encode_value(item, out);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        if let Some(tail) = rest.strip_prefix("&amp;") {
            out.push('&');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&lt;") {
            out.push('<');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&gt;") {
            out.push('>');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&quot;") {
            out.push('"');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&apos;") {
            out.push('\'');
            rest = tail;
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Parse a `methodResponse` document into the returned value, or the fault
/// it carries.
pub fn parse_response(xml: &str) -> OdooResult<Value> {
    let mut cur = Cursor::new(xml);
    cur.skip_prolog();
    cur.expect_open("methodResponse")?;
    if cur.try_open("params") {
        cur.expect_open("param")?;
        let value = parse_value(&mut cur)?;
        cur.expect_close("param")?;
        cur.expect_close("params")?;
        cur.expect_close("methodResponse")?;
        Ok(value)
    } else if cur.try_open("fault") {
        let fault = parse_value(&mut cur)?;
        cur.expect_close("fault")?;
        cur.expect_close("methodResponse")?;
        let code = fault.pointer("/faultCode").and_then(Value::as_i64).unwrap_or(0);
        let message = fault
            .pointer("/faultString")
            .and_then(Value::as_str)
            .unwrap_or("unknown fault")
            .to_string();
        Err(OdooError::Fault { code, message })
    } else {
        Err(OdooError::Malformed("expected <params> or <fault>".to_string()))
    }
}

fn parse_value(cur: &mut Cursor) -> OdooResult<Value> {
    cur.expect_open("value")?;
    let leading = cur.text();
    // An untyped <value>text</value> is a string per the XML-RPC spec;
    // otherwise whitespace between tags is ignorable.
    if cur.starts_with("</value>") {
        cur.expect_close("value")?;
        return Ok(Value::String(unescape(leading)));
    }

    let value = if cur.try_tag("<nil/>") {
        Value::Null
    } else if cur.try_open("int") {
        let text = cur.text();
        cur.expect_close("int")?;
        Value::from(parse_int(text)?)
    } else if cur.try_open("i4") {
        let text = cur.text();
        cur.expect_close("i4")?;
        Value::from(parse_int(text)?)
    } else if cur.try_open("boolean") {
        let text = cur.text();
        cur.expect_close("boolean")?;
        Value::Bool(text.trim() == "1")
    } else if cur.try_open("double") {
        let text = cur.text();
        cur.expect_close("double")?;
        let parsed: f64 = text
            .trim()
            .parse()
            .map_err(|_| OdooError::Malformed(format!("bad double '{}'", text.trim())))?;
        Value::from(parsed)
    } else if cur.try_open("string") {
        let text = cur.text();
        cur.expect_close("string")?;
        Value::String(unescape(text))
    } else if cur.try_open("array") {
        cur.expect_open("data")?;
        let mut items = Vec::new();
        loop {
            cur.skip_ws();
            if cur.starts_with("</data>") {
                break;
            }
            items.push(parse_value(cur)?);
        }
        cur.expect_close("data")?;
        cur.expect_close("array")?;
        Value::Array(items)
    } else if cur.try_open("struct") {
        let mut map = Map::new();
        loop {
            if !cur.try_open("member") {
                break;
            }
            cur.expect_open("name")?;
            let name = unescape(cur.text());
            cur.expect_close("name")?;
            let member = parse_value(cur)?;
            cur.expect_close("member")?;
            map.insert(name, member);
        }
        cur.expect_close("struct")?;
        Value::Object(map)
    } else {
        return Err(OdooError::Malformed(format!(
            "unsupported value type near '{}'",
            cur.peek()
        )));
    };

    cur.expect_close("value")?;
    Ok(value)
}

fn parse_int(text: &str) -> OdooResult<i64> {
    text.trim()
        .parse()
        .map_err(|_| OdooError::Malformed(format!("bad integer '{}'", text.trim())))
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(xml: &'a str) -> Self {
        Self { rest: xml }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn skip_prolog(&mut self) {
        self.skip_ws();
        if let Some(after) = self.rest.strip_prefix("<?") {
            if let Some(end) = after.find("?>") {
                self.rest = &after[end + 2..];
            }
        }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.rest.starts_with(prefix)
    }

    fn try_tag(&mut self, tag: &str) -> bool {
        self.skip_ws();
        match self.rest.strip_prefix(tag) {
            Some(after) => {
                self.rest = after;
                true
            }
            None => false,
        }
    }

    fn try_open(&mut self, name: &str) -> bool {
        self.try_tag(&format!("<{}>", name))
    }

    fn expect_open(&mut self, name: &str) -> OdooResult<()> {
        if self.try_open(name) {
            Ok(())
        } else {
            Err(OdooError::Malformed(format!("expected <{}> near '{}'", name, self.peek())))
        }
    }

    fn expect_close(&mut self, name: &str) -> OdooResult<()> {
        if self.try_tag(&format!("</{}>", name)) {
            Ok(())
        } else {
            Err(OdooError::Malformed(format!("expected </{}> near '{}'", name, self.peek())))
        }
    }

    /// Raw text up to the next tag.
    fn text(&mut self) -> &'a str {
        let end = self.rest.find('<').unwrap_or(self.rest.len());
        let (text, rest) = self.rest.split_at(end);
        self.rest = rest;
        text
    }

    fn peek(&self) -> &str {
        let end = self.rest.char_indices().nth(30).map_or(self.rest.len(), |(i, _)| i);
        &self.rest[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_scalars_arrays_and_structs() {
        let body = encode_call(
            "execute_kw",
            &[json!("odoo"), json!(2), json!(true), json!([1, null]), json!({ "limit": 5 })],
        );

        assert!(body.starts_with("<?xml version=\"1.0\"?><methodCall>"));
        assert!(body.contains("<methodName>execute_kw</methodName>"));
        assert!(body.contains("<value><string>odoo</string></value>"));
        assert!(body.contains("<value><int>2</int></value>"));
        assert!(body.contains("<value><boolean>1</boolean></value>"));
        assert!(body.contains(
            "<array><data><value><int>1</int></value><value><nil/></value></data></array>"
        ));
        assert!(body.contains(
            "<struct><member><name>limit</name><value><int>5</int></value></member></struct>"
        ));
    }

    #[test]
    fn encodes_doubles() {
        let body = encode_call("noop", &[json!(1.5)]);
        assert!(body.contains("<value><double>1.5</double></value>"));
    }

    #[test]
    fn escapes_markup_in_strings() {
        let body = encode_call("noop", &[json!("a & b < c > d")]);
        assert!(body.contains("<string>a &amp; b &lt; c &gt; d</string>"));
    }

    #[test]
    fn parses_scalar_response() {
        let value = parse_response(
            "<?xml version='1.0'?>\n<methodResponse>\n<params>\n<param>\n\
             <value><int>2</int></value>\n</param>\n</params>\n</methodResponse>\n",
        )
        .unwrap();
        assert_eq!(value, json!(2));
    }

    #[test]
    fn parses_nested_arrays_and_structs() {
        let value = parse_response(
            "<?xml version='1.0'?><methodResponse><params><param><value><array><data>\
             <value><struct>\
             <member><name>id</name><value><int>7</int></value></member>\
             <member><name>name</name><value><string>Deco &amp; Co</string></value></member>\
             <member><name>active</name><value><boolean>1</boolean></value></member>\
             <member><name>parent_id</name><value><boolean>0</boolean></value></member>\
             <member><name>credit</name><value><double>12.5</double></value></member>\
             <member><name>ref</name><value><nil/></value></member>\
             </struct></value>\
             </data></array></value></param></params></methodResponse>",
        )
        .unwrap();

        assert_eq!(
            value,
            json!([{
                "id": 7,
                "name": "Deco & Co",
                "active": true,
                "parent_id": false,
                "credit": 12.5,
                "ref": null,
            }])
        );
    }

    #[test]
    fn parses_untyped_value_as_string() {
        let value = parse_response(
            "<methodResponse><params><param><value>plain</value></param></params></methodResponse>",
        )
        .unwrap();
        assert_eq!(value, json!("plain"));
    }

    #[test]
    fn parses_i4_and_empty_strings() {
        let value = parse_response(
            "<methodResponse><params><param><value><array><data>\
             <value><i4>-3</i4></value><value><string></string></value>\
             </data></array></value></param></params></methodResponse>",
        )
        .unwrap();
        assert_eq!(value, json!([-3, ""]));
    }

    #[test]
    fn faults_become_errors_with_the_fault_string() {
        let err = parse_response(
            "<?xml version='1.0'?><methodResponse><fault><value><struct>\
             <member><name>faultCode</name><value><int>1</int></value></member>\
             <member><name>faultString</name><value><string>Traceback: Invalid field \
             &quot;colour&quot; on model</string></value></member>\
             </struct></value></fault></methodResponse>",
        )
        .unwrap_err();

        match err {
            OdooError::Fault { code, message } => {
                assert_eq!(code, 1);
                assert!(message.contains("Invalid field \"colour\""));
            }
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn rejects_documents_without_params_or_fault() {
        let err = parse_response("<methodResponse><oops/></methodResponse>").unwrap_err();
        assert!(matches!(err, OdooError::Malformed(_)));
    }
}

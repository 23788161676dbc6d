//! Human-readable rendering of values.
//!
//! Tags render as `#a.b.c`, structures as `{x=1, #t, 3}`.

use grain_value::{Structure, Value};

use super::Program;

impl Program {
    pub fn render(&self, value: &Value) -> String {
        let mut out = String::new();
        self.render_into(value, &mut out);
        out
    }

    fn render_into(&self, value: &Value, out: &mut String) {
        match value {
            Value::Void => out.push_str("void"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(n) => out.push_str(&n.to_string()),
            Value::Float(x) => out.push_str(&format!("{x:?}")),
            Value::Str(s) => out.push_str(&format!("{:?}", s.as_str())),
            Value::Tag(t) => out.push_str(&self.render_tag(*t)),
            Value::Function(f) => {
                out.push('&');
                out.push_str(self.name(f.name));
            }
            Value::Structure(s) => self.render_structure(s, out),
            Value::Resource(_) => out.push_str("<resource>"),
            Value::Skip => out.push_str("skip"),
            Value::Break(None) => out.push_str("break"),
            Value::Break(Some(v)) => {
                out.push_str("break(");
                self.render_into(v, out);
                out.push(')');
            }
        }
    }

    fn render_structure(&self, s: &Structure, out: &mut String) {
        out.push('{');
        for (i, field) in s.fields().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let mut labelled = false;
            if let Some(name) = field.name {
                out.push_str(self.name(name));
                labelled = true;
            }
            if let Some(tag) = field.tag {
                if labelled {
                    out.push(' ');
                }
                out.push_str(&self.render_tag(tag));
                labelled = true;
            }
            if labelled {
                out.push('=');
            }
            self.render_into(&field.value, out);
        }
        out.push('}');
    }
}

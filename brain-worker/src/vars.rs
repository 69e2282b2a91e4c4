//! Template-variable substitution for command/http-mode jobs.
//!
//! Neither the wire envelope's `vars` field nor SPEC_FULL.md define a
//! templating syntax, only that the field exists (§6). This picks the
//! smallest thing that could work: `{{key}}` replaced by `vars[key]`
//! rendered as a plain string (numbers/bools via their `Display`,
//! strings unquoted, anything else left untouched). No loops,
//! conditionals, or nested lookups.

pub fn render(template: &str, vars: Option<&serde_json::Value>) -> String {
    let Some(vars) = vars.and_then(|v| v.as_object()) else {
        return template.to_string();
    };
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(end) = rest[start..].find("}}") else {
            out.push_str(rest);
            return out;
        };
        let end = start + end;
        out.push_str(&rest[..start]);
        let key = rest[start + 2..end].trim();
        match vars.get(key) {
            Some(serde_json::Value::String(s)) => out.push_str(s),
            Some(other) => out.push_str(&other.to_string()),
            None => out.push_str(&rest[start..end + 2]),
        }
        rest = &rest[end + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_keys() {
        let vars = serde_json::json!({"name": "world", "count": 3});
        assert_eq!(render("hello {{name}}, {{count}} times", Some(&vars)), "hello world, 3 times");
    }

    #[test]
    fn leaves_unknown_keys_untouched() {
        let vars = serde_json::json!({"name": "world"});
        assert_eq!(render("hello {{missing}}", Some(&vars)), "hello {{missing}}");
    }

    #[test]
    fn passes_through_with_no_vars() {
        assert_eq!(render("hello {{name}}", None), "hello {{name}}");
    }
}

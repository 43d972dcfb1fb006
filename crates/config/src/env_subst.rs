/// Replace `${ENV_VAR}` placeholders in the raw config text.
///
/// Unresolvable or malformed placeholders are left as-is.
#[must_use]
pub fn substitute_env(input: &str) -> String {
    substitute_with(input, |name| std::env::var(name).ok())
}

fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    },
                }
                rest = &after[end + 1..];
            },
            _ => {
                // No closing brace (or empty name): emit literally.
                out.push_str("${");
                rest = after;
            },
        }
    }

    out.push_str(rest);
    out
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "BELLBOT_TOKEN" => Some("123:ABC".to_string()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_var() {
        assert_eq!(
            substitute_with("token = \"${BELLBOT_TOKEN}\"", lookup),
            "token = \"123:ABC\""
        );
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(substitute_with("${NOPE_XYZ}", lookup), "${NOPE_XYZ}");
    }

    #[test]
    fn leaves_malformed_placeholder() {
        assert_eq!(substitute_with("${unclosed", lookup), "${unclosed");
        assert_eq!(substitute_with("a ${} b", lookup), "a ${} b");
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(substitute_with("no placeholders", lookup), "no placeholders");
    }
}

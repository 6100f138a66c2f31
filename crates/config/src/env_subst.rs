/// Replace `${ENV_VAR}` placeholders in config string values.
///
/// Unresolvable or malformed placeholders are left as-is.
pub fn substitute_env(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) => result.push_str(&value),
                    // Unresolved placeholders pass through untouched.
                    Err(_) => result.push_str(&rest[start..start + end + 3]),
                }
                rest = &after[end + 1..];
            },
            _ => {
                // No closing brace or empty name: emit literally.
                result.push_str(&rest[start..]);
                return result;
            },
        }
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_known_var() {
        unsafe { std::env::set_var("PLAZA_TEST_VAR", "hello") };
        assert_eq!(substitute_env("key=${PLAZA_TEST_VAR}"), "key=hello");
        unsafe { std::env::remove_var("PLAZA_TEST_VAR") };
    }

    #[test]
    fn test_leaves_unknown_var() {
        assert_eq!(
            substitute_env("${PLAZA_NONEXISTENT_XYZ}"),
            "${PLAZA_NONEXISTENT_XYZ}"
        );
    }

    #[test]
    fn test_unterminated_placeholder_is_literal() {
        assert_eq!(substitute_env("key=${OOPS"), "key=${OOPS");
        assert_eq!(substitute_env("key=${}"), "key=${}");
    }

    #[test]
    fn test_no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}

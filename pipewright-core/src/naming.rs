//! Field-name case conversion for JSON (camelCase) and filter/mask (snake_case) paths.

/// Convert `createTime` to `create_time`. Snake-case input is returned unchanged.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert `create_time` to `createTime`. Camel-case input is returned unchanged.
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(to_snake_case("createTime"), "create_time");
        assert_eq!(to_snake_case("create_time"), "create_time");
        assert_eq!(to_snake_case("qTitle"), "q_title");
        assert_eq!(to_camel_case("update_time"), "updateTime");
        assert_eq!(to_camel_case("integration_id"), "integrationId");
        assert_eq!(to_camel_case("rawRecipe"), "rawRecipe");
    }
}

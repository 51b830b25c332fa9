/// Identifier conversions shared by the generators

use std::collections::HashSet;

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while",
    "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try", "typeof", "unsized",
    "virtual", "yield",
];

/// Split an identifier into lowercase-insensitive words
///
/// Handles snake_case, SCREAMING_CASE, camelCase and PascalCase, keeping
/// digit runs attached to the preceding word.
fn words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            let mut result = first.to_uppercase().collect::<String>();
            result.push_str(&chars.as_str().to_lowercase());
            result
        }
    }
}

/// `PART_TIME` → `PartTime`, `studentId` → `StudentId`
pub fn to_pascal_case(s: &str) -> String {
    words(s).iter().map(|w| capitalize(w)).collect()
}

/// `OrderItem` → `order_item`
pub fn to_snake_case(s: &str) -> String {
    words(s).iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("_")
}

/// Escape a Rust identifier that collides with a keyword
pub fn rust_ident(name: &str) -> String {
    match name {
        // Raw identifiers are not allowed for these
        "self" | "Self" | "super" | "crate" => format!("{}_", name),
        _ if RUST_KEYWORDS.contains(&name) => format!("r#{}", name),
        _ => name.to_string(),
    }
}

/// snake_case field name safe to use as a Rust identifier
pub fn rust_field_name(name: &str) -> String {
    let snake = to_snake_case(name);
    let snake = if snake.is_empty() { "field".to_string() } else { snake };
    if snake.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{}", snake);
    }
    rust_ident(&snake)
}

/// PascalCase member names for enum values, unique and usable as identifiers
pub fn enum_member_names<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|value| {
            let member = to_pascal_case(value);
            let member = if member.is_empty() || member.starts_with(|c: char| c.is_ascii_digit()) {
                format!("_{}", member)
            } else {
                member
            };
            dedupe(&mut seen, member)
        })
        .collect()
}

/// Append a numeric suffix until `candidate` is not in `seen`
pub fn dedupe(seen: &mut HashSet<String>, candidate: String) -> String {
    let mut name = candidate.clone();
    let mut n = 2;
    while !seen.insert(name.clone()) {
        name = format!("{}{}", candidate, n);
        n += 1;
    }
    name
}

/// Whether a name is a valid GraphQL name (`/[_A-Za-z][_0-9A-Za-z]*/`)
pub fn is_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => chars.all(|c| c == '_' || c.is_ascii_alphanumeric()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("PART_TIME"), "PartTime");
        assert_eq!(to_pascal_case("FEMALE"), "Female");
        assert_eq!(to_pascal_case("studentId"), "StudentId");
        assert_eq!(to_pascal_case("tt_swap"), "TtSwap");
        assert_eq!(to_pascal_case("GRADE_10"), "Grade10");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Customer"), "customer");
        assert_eq!(to_snake_case("OrderItem"), "order_item");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("HTTPStatus"), "http_status");
        assert_eq!(to_snake_case("swm_substitutionLookup"), "swm_substitution_lookup");
    }

    #[test]
    fn test_rust_ident_escapes_keywords() {
        assert_eq!(rust_ident("type"), "r#type");
        assert_eq!(rust_ident("self"), "self_");
        assert_eq!(rust_ident("name"), "name");
        assert_eq!(rust_field_name("type"), "r#type");
        assert_eq!(rust_field_name("dateOfBirth"), "date_of_birth");
    }

    #[test]
    fn test_enum_member_names_are_unique() {
        assert_eq!(
            enum_member_names(["A_B", "AB", "ab", "1ST"]),
            vec!["AB", "Ab", "Ab2", "_1St"]
        );
        assert_eq!(enum_member_names(["PART_TIME", "FULL_TIME"]), vec!["PartTime", "FullTime"]);
    }

    #[test]
    fn test_is_graphql_name() {
        assert!(is_graphql_name("BigDecimal"));
        assert!(is_graphql_name("_private"));
        assert!(!is_graphql_name("9lives"));
        assert!(!is_graphql_name("Big-Decimal"));
        assert!(!is_graphql_name(""));
    }
}

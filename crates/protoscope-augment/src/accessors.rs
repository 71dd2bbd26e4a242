//! The generator's accessor naming conventions.

use protoscope_hir::Type;

/// `isFlag` for primitive booleans, `getName` otherwise.
pub fn getter_name(field_name: &str, ty: &Type) -> String {
    if ty.is_primitive_boolean() {
        format!("is{}", capitalize(field_name))
    } else {
        format!("get{}", capitalize(field_name))
    }
}

pub fn setter_name(field_name: &str) -> String {
    format!("set{}", capitalize(field_name))
}

/// Property name behind an accessor (`getCount` → `count`), if `name` follows
/// the convention.
pub fn property_name(name: &str) -> Option<String> {
    let rest = ["get", "set", "is"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))?;
    if rest.chars().next().is_some_and(char::is_uppercase) {
        Some(decapitalize(rest))
    } else {
        None
    }
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

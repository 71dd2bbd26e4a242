//! The generator's naming conventions, mapping a prototype's qualified name
//! to the qualified name of the type generated from it.

use crate::descriptor::{non_blank, GenerationStrategy, PrototypeDescriptor};

const PROTOTYPE_SUFFIX: &str = "Prototype";
const ENTITY_SUFFIX: &str = "Entity";
const PROTOTYPE_SEGMENT: &str = ".prototype.";
const IMPLEMENTATION_SUFFIX: &str = "Impl";

/// Computes the generated counterpart of `name`.
///
/// `desc` is the prototype's resolved configuration, if any. An explicit
/// name together with an explicit package is returned as-is; otherwise the
/// name is relocated, nested types are hoisted one package level, the
/// `Prototype` (then `Entity`) suffix is stripped, `.prototype.` segments
/// collapse, and implementation-strategy prototypes gain an `Impl` suffix.
pub fn generated_name(desc: Option<&PrototypeDescriptor>, name: &str, is_nested: bool) -> String {
    let mut name = name.to_string();
    let mut implementation = false;

    if let Some(desc) = desc {
        let (class_name, package) = if desc.strategy == GenerationStrategy::Implementation {
            implementation = true;
            (non_blank(&desc.class_name), non_blank(&desc.class_package))
        } else {
            (non_blank(&desc.interface_name), non_blank(&desc.interface_package))
        };

        match (class_name, package) {
            (Some(class_name), Some(package)) => return format!("{package}.{class_name}"),
            (Some(class_name), None) => {
                name = format!("{}{}", package_prefix(&name), class_name);
                implementation = false;
            }
            (None, Some(package)) => {
                name = format!("{package}.{}", simple_name(&name));
            }
            (None, None) => {}
        }
    }

    if is_nested {
        if let Some((outer, simple)) = name.rsplit_once('.') {
            if let Some((package, _)) = outer.rsplit_once('.') {
                name = format!("{package}.{simple}");
            }
        }
    }

    if let Some(stripped) = name.strip_suffix(PROTOTYPE_SUFFIX) {
        let stripped = stripped.strip_suffix(ENTITY_SUFFIX).unwrap_or(stripped);
        name = stripped.to_string();
    }
    name = name.replace(PROTOTYPE_SEGMENT, ".");

    if implementation {
        name.push_str(IMPLEMENTATION_SUFFIX);
    }
    name
}

/// Everything up to and including the last `.`.
fn package_prefix(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[..=idx],
        None => "",
    }
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

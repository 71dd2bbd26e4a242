//! Prototype/generated-artifact resolution for the binis code generator.
//!
//! A [`Registry`] owns every cache for one workspace. Queries run through a
//! short-lived [`Session`] that pairs the registry with the host's
//! [`Database`](protoscope_hir::Database) and carries the per-request
//! recursion guards:
//!
//! ```ignore
//! let registry = Registry::open(&config);
//! let mut lookup = registry.session(&db);
//! if let Some(desc) = lookup.prototype_data("com.x.FooPrototype")? {
//!     let generated = lookup.generated_name("com.x.FooPrototype", false)?;
//! }
//! ```
//!
//! Every public entry point returns `Result<_, Cancelled>`: cancellation is
//! the only failure that reaches the caller. Other failures are logged and
//! answered with "nothing known yet".

mod attributes;
mod chain;
mod descriptor;
mod discovery;
mod enricher;
mod error;
mod generated;
mod naming;
mod registry;
mod session;
mod validation;

pub use chain::{find_root, STARTERS};
pub use descriptor::{CustomValue, GenerationStrategy, PrototypeDescriptor, ENUM_KEY, PROTOTYPE_KEY};
pub use enricher::{
    AugmentTargetType, AugmentType, ElementFilter, ElementPredicate, ElementSource,
    EnricherDescriptor, MessageTemplate, CODE_AUGMENT,
};
pub use error::{LookupError, LookupResult};
pub use naming::generated_name;
pub use registry::{Registry, RegistryConfig};
pub use session::{LookupContext, Session};
pub use validation::{ValidationDescriptor, VALIDATION_ROOTS};

/// Root generation templates; every other template derives from one of them.
pub const CODE_PROTOTYPE: &str = "net.binis.codegen.annotation.CodePrototype";
pub const ENUM_PROTOTYPE: &str = "net.binis.codegen.annotation.EnumPrototype";
pub const ROOT_TEMPLATES: [&str; 2] = [CODE_PROTOTYPE, ENUM_PROTOTYPE];

/// Meta-annotation marking an annotation type as a template definition.
pub const TEMPLATE_MARKER: &str = "net.binis.codegen.annotation.CodePrototypeTemplate";

/// Annotations that are never templates; seeds the negative cache.
pub const KNOWN_NON_TEMPLATES: [&str; 10] = [
    "java.lang.annotation.Target",
    "java.lang.annotation.Retention",
    "java.lang.annotation.Documented",
    "java.lang.annotation.Inherited",
    "java.lang.annotation.Repeatable",
    "java.lang.annotation.Native",
    "java.util.Collections",
    "java.util.Map",
    "java.util.Set",
    "java.util.List",
];

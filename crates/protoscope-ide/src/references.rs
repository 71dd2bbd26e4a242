//! String literals naming a type: the generated marker's `value` and the
//! generator's `@Default` annotation.

use protoscope_core::{Cancelled, DeclId, FileId, QueryResult, Span};
use protoscope_hir::{AnnotationSite, AttributeValue, Database};

use crate::{contain, CodegenIde};

pub const DEFAULT_ANNOTATION: &str = "net.binis.codegen.annotation.Default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralReference {
    /// Range of the literal's text, quotes excluded.
    pub span: Span,
    pub name: String,
    pub target: DeclId,
}

impl CodegenIde {
    pub fn literal_references(
        &self,
        db: &dyn Database,
        file: FileId,
    ) -> Result<Vec<LiteralReference>, Cancelled> {
        let result = literal_references(db, &self.registry().config().generated_markers, file);
        contain("literal_references", result)
    }
}

fn literal_references(
    db: &dyn Database,
    markers: &[String],
    file: FileId,
) -> QueryResult<Vec<LiteralReference>> {
    let mut references = Vec::new();
    for id in db.declarations_in_file(file)? {
        let decl = db.declaration(id)?;
        for site in AnnotationSite::all(id, decl) {
            let Some(annotation) = site.annotation(decl) else {
                continue;
            };
            let is_marker = markers.iter().any(|marker| annotation.matches(marker));
            let is_default = annotation.matches(DEFAULT_ANNOTATION);
            if !is_marker && !is_default {
                continue;
            }

            for attr in &annotation.attributes {
                if !is_default && attr.name != "value" {
                    continue;
                }
                let (AttributeValue::String(value), Some(span)) = (&attr.value, attr.span) else {
                    continue;
                };
                if let Some(target) = db.find_declaration(value)? {
                    references.push(LiteralReference {
                        span: Span::new(span.start + 1, span.start + 1 + value.len()),
                        name: value.clone(),
                        target,
                    });
                }
            }
        }
    }
    Ok(references)
}

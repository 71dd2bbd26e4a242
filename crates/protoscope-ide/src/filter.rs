//! Suppression of host diagnostics the generated code makes moot.

use protoscope_core::{Cancelled, Diagnostic, FileId, QueryError, QueryResult};
use protoscope_hir::Database;
use protoscope_lookup::Session;

use crate::{declaration_at, CodegenIde};

/// The host's complaint about the `extends` clause that annotation
/// inheritance relies on.
pub const ANNOTATION_EXTENDS_ERROR: &str = "@interface may not have extends list";

impl CodegenIde {
    /// Whether the host should still show `diagnostic`, reported in `file`.
    ///
    /// Hidden are messages an enricher declares it suppresses for the
    /// elements its filter selects, and the `extends` error on annotation
    /// types. Everything is shown when the answer is unknown.
    pub fn accept_diagnostic(
        &self,
        db: &dyn Database,
        file: FileId,
        diagnostic: &Diagnostic,
    ) -> Result<bool, Cancelled> {
        match db.file(file) {
            Ok(data) if data.is_java_source() => {}
            Ok(_) => return Ok(true),
            Err(QueryError::Cancelled) => return Err(Cancelled),
            Err(_) => return Ok(true),
        }
        if !self.is_codegen_used(db) {
            return Ok(true);
        }

        let mut lookup = self.session(db);
        match accepts(&mut lookup, file, diagnostic) {
            Ok(accepted) => Ok(accepted),
            Err(QueryError::Cancelled) => Err(Cancelled),
            Err(err) => {
                tracing::trace!(?file, err = %err, "diagnostic filter skipped");
                Ok(true)
            }
        }
    }
}

fn accepts(lookup: &mut Session<'_>, file: FileId, diagnostic: &Diagnostic) -> QueryResult<bool> {
    let Some(span) = diagnostic.span else {
        return Ok(true);
    };
    let db = lookup.db();
    let Some(id) = declaration_at(db, file, span.start)? else {
        return Ok(true);
    };
    let decl = db.declaration(id)?;

    if let Some(desc) = lookup.prototype_data_of(id)? {
        for enricher in &desc.enrichers {
            let (Some(template), Some(filter)) = (&enricher.params_suppresses, &enricher.filter)
            else {
                continue;
            };
            let suppressed = filter.apply(decl).iter().any(|param| {
                diagnostic.message == template.render(&param.name, &param.ty.canonical_text())
            });
            if suppressed {
                tracing::trace!(
                    enricher = %enricher.class_name,
                    message = %diagnostic.message,
                    "suppressed host diagnostic"
                );
                return Ok(false);
            }
        }
    }

    Ok(!(decl.is_annotation_type() && diagnostic.message == ANNOTATION_EXTENDS_ERROR))
}

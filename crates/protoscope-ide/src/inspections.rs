//! Inspections over a file: direct use of prototypes, misplaced enrichers
//! and prototypes, and validation-annotation misuse.

use protoscope_core::{Cancelled, Diagnostic, FileId, QueryResult, QuickFix, TextEdit};
use protoscope_hir::{simple_name, AnnotationSite, Database, DeclKind};
use protoscope_lookup::{GenerationStrategy, Session};

use crate::{contain, CodegenIde};

pub const PROTOTYPE_USED_CODE: &str = "prototype-used";
pub const ENRICHER_TARGET_CODE: &str = "enricher-target";
pub const STRATEGY_TARGET_CODE: &str = "prototype-strategy-target";

impl CodegenIde {
    /// Every inspection this crate runs, in a stable order.
    pub fn diagnostics(&self, db: &dyn Database, file: FileId) -> Result<Vec<Diagnostic>, Cancelled> {
        let mut diagnostics = self.prototype_usage_diagnostics(db, file)?;
        diagnostics.extend(self.enricher_diagnostics(db, file)?);
        diagnostics.extend(self.validation_diagnostics(db, file)?);
        Ok(diagnostics)
    }

    /// Warns about references to a prototype from code that is not itself a
    /// prototype; such code should use the generated type.
    pub fn prototype_usage_diagnostics(
        &self,
        db: &dyn Database,
        file: FileId,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        if !self.features().prototype_usage_inspection {
            return Ok(Vec::new());
        }
        let mut lookup = self.session(db);
        let result = prototype_usages(&mut lookup, file);
        contain("prototype_usage_diagnostics", result)
    }

    /// Enrichers applied to a declaration kind they do not support, and
    /// interface-only prototypes declared as something else.
    pub fn enricher_diagnostics(
        &self,
        db: &dyn Database,
        file: FileId,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        let mut lookup = self.session(db);
        let result = misplaced_prototypes(&mut lookup, file);
        contain("enricher_diagnostics", result)
    }

    pub fn validation_diagnostics(
        &self,
        db: &dyn Database,
        file: FileId,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        let mut lookup = self.session(db);
        let result = validation_problems(&mut lookup, file);
        contain("validation_diagnostics", result)
    }
}

fn prototype_usages(lookup: &mut Session<'_>, file: FileId) -> QueryResult<Vec<Diagnostic>> {
    let db = lookup.db();
    for id in db.declarations_in_file(file)? {
        lookup.register_declaration(id)?;
    }

    let mut diagnostics = Vec::new();
    for reference in &db.file(file)?.references {
        let Some(enclosing) = reference.enclosing else {
            continue;
        };
        // Anonymous and local classes are never checked.
        if db.declaration(enclosing)?.qualified_name.is_none()
            || lookup.is_prototype_decl(enclosing)?
        {
            continue;
        }
        let name = reference.qualified_name.as_str();
        if !lookup.is_prototype(name)? {
            continue;
        }

        let generated = lookup.generated_name_of(name)?;
        let mut diagnostic = Diagnostic::warning(
            PROTOTYPE_USED_CODE,
            format!(
                "Prototype '{}' is used directly, use the generated '{}' instead",
                simple_name(name),
                simple_name(&generated)
            ),
            Some(reference.span),
        );
        if lookup.find_declaration(&generated)?.is_some() {
            diagnostic = diagnostic.with_fix(QuickFix {
                title: format!("Replace with '{generated}'"),
                edits: vec![TextEdit::new(file, reference.span, generated.clone())],
            });
        }
        diagnostics.push(diagnostic);
    }
    Ok(diagnostics)
}

fn misplaced_prototypes(lookup: &mut Session<'_>, file: FileId) -> QueryResult<Vec<Diagnostic>> {
    let db = lookup.db();
    let mut diagnostics = Vec::new();
    for id in db.declarations_in_file(file)? {
        let Some(desc) = lookup.prototype_data_of(id)? else {
            continue;
        };
        let decl = db.declaration(id)?;
        let span = decl.name_span.or(decl.span);

        for enricher in &desc.enrichers {
            if enricher.applies_to(decl.kind) {
                continue;
            }
            diagnostics.push(Diagnostic::new(
                enricher.severity,
                ENRICHER_TARGET_CODE,
                format!(
                    "Enricher '{}' can't be applied to {}. Allowed targets: {}",
                    enricher.display_name(),
                    kind_description(decl.kind),
                    enricher.target_descriptions().join(", ")
                ),
                span,
            ));
        }

        let interface_only = desc.strategy == GenerationStrategy::Prototype || desc.is_enum();
        if interface_only && decl.kind != DeclKind::Interface {
            let annotation = desc.prototype_annotation().map_or("prototype", simple_name);
            diagnostics.push(Diagnostic::error(
                STRATEGY_TARGET_CODE,
                format!("@{annotation} can only be applied to interfaces"),
                span,
            ));
        }
    }
    Ok(diagnostics)
}

fn validation_problems(lookup: &mut Session<'_>, file: FileId) -> QueryResult<Vec<Diagnostic>> {
    let db = lookup.db();
    let mut diagnostics = Vec::new();
    for id in db.declarations_in_file(file)? {
        let decl = db.declaration(id)?;
        for site in AnnotationSite::all(id, decl) {
            diagnostics.extend(lookup.check_for_validation_errors(&site)?);
        }
    }
    Ok(diagnostics)
}

fn kind_description(kind: DeclKind) -> &'static str {
    match kind {
        DeclKind::Class => "class",
        DeclKind::Interface => "interface",
        DeclKind::Enum => "enum",
        DeclKind::AnnotationType => "annotation",
        DeclKind::Record => "record",
    }
}

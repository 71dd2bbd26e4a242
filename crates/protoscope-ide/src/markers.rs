use protoscope_core::{Cancelled, DeclId, FileId, ModuleId, QueryResult, Span};
use protoscope_hir::Database;
use protoscope_lookup::Session;

use crate::{contain, CodegenIde};

pub const GENERATE_FILES: &str = "Generate files";

/// A gutter action on a prototype; activating it should rebuild `module`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMarker {
    pub decl: DeclId,
    pub span: Option<Span>,
    pub tooltip: &'static str,
    pub module: Option<ModuleId>,
}

impl CodegenIde {
    pub fn line_markers(&self, db: &dyn Database, file: FileId) -> Result<Vec<LineMarker>, Cancelled> {
        let mut lookup = self.session(db);
        let result = prototype_markers(&mut lookup, file);
        contain("line_markers", result)
    }
}

fn prototype_markers(lookup: &mut Session<'_>, file: FileId) -> QueryResult<Vec<LineMarker>> {
    let db = lookup.db();
    let module = db.file(file)?.module;
    let mut markers = Vec::new();
    for id in db.declarations_in_file(file)? {
        if !lookup.is_prototype_decl(id)? {
            continue;
        }
        let decl = db.declaration(id)?;
        markers.push(LineMarker {
            decl: id,
            span: decl.name_span.or(decl.span),
            tooltip: GENERATE_FILES,
            module,
        });
    }
    Ok(markers)
}

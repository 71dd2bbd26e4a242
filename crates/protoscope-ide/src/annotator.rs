//! Highlights and tooltips linking prototypes with their generated types.

use protoscope_core::{Cancelled, DeclId, FileId, QueryResult, Span};
use protoscope_hir::{Database, ExprKind};
use protoscope_lookup::{find_root, Session};

use crate::{contain, navigation_target, CodegenIde};

/// Calls highlighted as keywords inside a fluent chain.
pub const HIGHLIGHT_METHODS: &[&str] = &[
    "create", "find", "with", "done", "by", "and", "or", "in", "order", "asc", "desc", "where",
    "merge", "as", "sum", "min", "max", "count", "avg", "distinct", "group", "_add", "_if",
    "save", "delete", "join", "joinFetch", "leftJoin", "leftJoinFetch", "ensure", "reference",
    "references", "get", "list", "top", "page", "paginated", "paged", "tuple", "tuples",
    "prepare", "projection", "flush", "lock", "hint", "filter", "exists", "notExists", "remove",
    "run", "transaction", "size", "contains", "notContains", "containsAll", "containsOne",
    "containsNone", "isEmpty", "isNotEmpty",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    ClassName,
    Keyword,
}

/// An informational decoration; the tooltip is HTML with `#navigation/`
/// links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub span: Span,
    pub kind: HighlightKind,
    pub tooltip: Option<String>,
}

impl Highlight {
    fn new(span: Span, kind: HighlightKind, tooltip: Option<String>) -> Self {
        Self {
            span,
            kind,
            tooltip,
        }
    }
}

impl CodegenIde {
    /// Decorations for `file`: prototype and generated declaration names,
    /// references to either, and query keywords of fluent chains.
    pub fn annotate(&self, db: &dyn Database, file: FileId) -> Result<Vec<Highlight>, Cancelled> {
        let mut lookup = self.session(db);
        let result = self.annotate_file(&mut lookup, file);
        contain("annotate", result)
    }

    fn annotate_file(&self, lookup: &mut Session<'_>, file: FileId) -> QueryResult<Vec<Highlight>> {
        let db = lookup.db();
        let data = db.file(file)?;
        let mut highlights = Vec::new();

        for id in db.declarations_in_file(file)? {
            let decl = db.declaration(id)?;
            let (Some(name), Some(span)) = (decl.qualified_name.as_deref(), decl.name_span) else {
                continue;
            };
            if lookup.is_prototype_decl(id)? {
                let tooltip = generates(lookup, name)?;
                highlights.push(Highlight::new(span, HighlightKind::ClassName, Some(tooltip)));
            } else if lookup.is_generated(name)? {
                if let Some(origin) = lookup.prototype_class(name)? {
                    let tooltip = generated_by(db, origin)?;
                    highlights.push(Highlight::new(span, HighlightKind::ClassName, Some(tooltip)));
                }
            }
        }

        for reference in &data.references {
            let name = reference.qualified_name.as_str();
            if lookup.is_generated(name)? {
                if let Some(origin) = lookup.prototype_class(name)? {
                    let tooltip = generated_by(db, origin)?;
                    highlights.push(Highlight::new(
                        reference.span,
                        HighlightKind::Keyword,
                        Some(tooltip),
                    ));
                }
            } else if lookup.is_prototype(name)? {
                let tooltip = generates(lookup, name)?;
                highlights.push(Highlight::new(reference.span, HighlightKind::Keyword, Some(tooltip)));
            }
        }

        if self.features().fluent_highlighting {
            for (id, expr) in data.exprs.iter() {
                let ExprKind::MethodCall {
                    name, name_span, ..
                } = &expr.kind
                else {
                    continue;
                };
                if HIGHLIGHT_METHODS.contains(&name.as_str()) && find_root(&data.exprs, id).is_some() {
                    highlights.push(Highlight::new(*name_span, HighlightKind::Keyword, None));
                }
            }
        }

        Ok(highlights)
    }
}

fn generates(lookup: &mut Session<'_>, prototype: &str) -> QueryResult<String> {
    let generated = lookup.generated_name_of(prototype)?;
    let target = match lookup.find_declaration(&generated)? {
        Some(id) => navigation_target(lookup.db(), id)?,
        None => "unknown".to_string(),
    };
    Ok(format!(
        "Generates <a href=\"#navigation/{target}\">{generated}</a>"
    ))
}

fn generated_by(db: &dyn Database, prototype: DeclId) -> QueryResult<String> {
    let decl = db.declaration(prototype)?;
    let name = decl.qualified_name.as_deref().unwrap_or(&decl.name);
    Ok(format!(
        "Generated by <a href=\"#navigation/{}\">{name}</a>",
        navigation_target(db, prototype)?
    ))
}

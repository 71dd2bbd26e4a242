//! A minimal expression tree, enough to follow fluent call chains.

use protoscope_core::{ExprId, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    MethodCall {
        name: String,
        /// The qualifier (`a` in `a.b()`).
        receiver: Option<ExprId>,
        args: Vec<ExprId>,
        /// Range of the method name token.
        name_span: Span,
    },
    Lambda {
        params: Vec<String>,
        body: ExprId,
    },
    Name(String),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprData {
    pub kind: ExprKind,
    pub parent: Option<ExprId>,
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct ExprArena {
    exprs: Vec<ExprData>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ExprId) -> Option<&ExprData> {
        self.exprs.get(id.to_raw() as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &ExprData)> {
        self.exprs
            .iter()
            .enumerate()
            .map(|(idx, data)| (ExprId::new(idx as u32), data))
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::new(self.exprs.len() as u32);
        let children: Vec<ExprId> = match &kind {
            ExprKind::MethodCall { receiver, args, .. } => {
                receiver.iter().chain(args.iter()).copied().collect()
            }
            ExprKind::Lambda { body, .. } => vec![*body],
            ExprKind::Name(_) | ExprKind::Literal(_) => Vec::new(),
        };
        self.exprs.push(ExprData {
            kind,
            parent: None,
            span,
        });
        for child in children {
            if let Some(data) = self.exprs.get_mut(child.to_raw() as usize) {
                data.parent = Some(id);
            }
        }
        id
    }

    /// Allocates `receiver.name(args)`; the name range is derived from the
    /// end of the receiver (or the call start) so fixtures stay terse.
    pub fn call(
        &mut self,
        receiver: Option<ExprId>,
        name: &str,
        args: Vec<ExprId>,
        span: Span,
    ) -> ExprId {
        let name_start = receiver
            .and_then(|r| self.get(r))
            .map(|r| r.span.end + 1)
            .unwrap_or(span.start);
        let name_span = Span::new(name_start, name_start + name.len());
        self.alloc(
            ExprKind::MethodCall {
                name: name.to_string(),
                receiver,
                args,
                name_span,
            },
            span,
        )
    }

    pub fn lambda(&mut self, params: &[&str], body: ExprId, span: Span) -> ExprId {
        self.alloc(
            ExprKind::Lambda {
                params: params.iter().map(|p| p.to_string()).collect(),
                body,
            },
            span,
        )
    }

    pub fn name(&mut self, name: &str, span: Span) -> ExprId {
        self.alloc(ExprKind::Name(name.to_string()), span)
    }

    pub fn literal(&mut self, text: &str, span: Span) -> ExprId {
        self.alloc(ExprKind::Literal(text.to_string()), span)
    }

    fn ancestors(&self, id: ExprId) -> impl Iterator<Item = (ExprId, &ExprData)> {
        std::iter::successors(self.get(id).and_then(|d| d.parent), move |id| {
            self.get(*id).and_then(|d| d.parent)
        })
        .filter_map(move |id| self.get(id).map(|data| (id, data)))
    }

    /// The nearest lambda strictly enclosing `id`.
    pub fn enclosing_lambda(&self, id: ExprId) -> Option<ExprId> {
        self.ancestors(id)
            .find(|(_, data)| matches!(data.kind, ExprKind::Lambda { .. }))
            .map(|(id, _)| id)
    }

    /// The nearest method call strictly enclosing `id`.
    pub fn enclosing_call(&self, id: ExprId) -> Option<ExprId> {
        self.ancestors(id)
            .find(|(_, data)| matches!(data.kind, ExprKind::MethodCall { .. }))
            .map(|(id, _)| id)
    }
}

//! Script-text rendering for syntax nodes.
//!
//! Renders nodes back to DSL source. Nested operator applications are
//! always parenthesized, so the output reparses to the same tree without
//! needing a precedence table.
//!
//! [`Display`] renders the whole tree. [`Syntax::elided`] and
//! [`CallNode::elided`] stop after a fixed number of levels and print `...`
//! in place of anything deeper, so the text (and the recursion producing
//! it) stays bounded for arbitrarily deep trees.

use std::fmt::{self, Display, Write};

use crate::node::{BlockNode, CallNode, IdKind, ParamClass, Syntax, ValueNode};

/// Placeholder for subtrees cut off by [`Elided`].
const ELLIPSIS: &str = "...";

/// A depth-limited rendering of a node.
#[derive(Clone, Copy, Debug)]
pub struct Elided<'a> {
    target: Target<'a>,
    max_depth: usize,
}

#[derive(Clone, Copy, Debug)]
enum Target<'a> {
    Syntax(&'a Syntax),
    Call(&'a CallNode),
}

impl Syntax {
    /// Renders at most `max_depth` levels of this tree.
    #[must_use]
    pub fn elided(&self, max_depth: usize) -> Elided<'_> {
        Elided {
            target: Target::Syntax(self),
            max_depth,
        }
    }
}

impl CallNode {
    /// Renders at most `max_depth` levels of this call.
    #[must_use]
    pub fn elided(&self, max_depth: usize) -> Elided<'_> {
        Elided {
            target: Target::Call(self),
            max_depth,
        }
    }
}

impl Display for Elided<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let limit = Some(self.max_depth);
        match self.target {
            Target::Syntax(node) => write_syntax(f, node, limit),
            Target::Call(call) => write_call(f, call, limit),
        }
    }
}

impl Display for ValueNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IdKind::String => {
                f.write_char('"')?;
                for c in self.id.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        c => f.write_char(c)?,
                    }
                }
                f.write_char('"')
            }
            IdKind::Identifier | IdKind::Number | IdKind::Other => f.write_str(&self.id),
        }
    }
}

impl Display for CallNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, self, None)
    }
}

impl Display for BlockNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_body(f, &self.statements, None)
    }
}

impl Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_syntax(f, self, None)
    }
}

// `limit` is the number of levels still allowed; `None` is unbounded.

fn deeper(limit: Option<usize>) -> Option<usize> {
    limit.map(|n| n.saturating_sub(1))
}

fn write_syntax(f: &mut fmt::Formatter<'_>, node: &Syntax, limit: Option<usize>) -> fmt::Result {
    match node {
        Syntax::Value(v) => v.fmt(f),
        Syntax::Call(c) => write_call(f, c, limit),
        Syntax::Block(_) if limit == Some(0) => f.write_str(ELLIPSIS),
        Syntax::Block(b) => write_body(f, &b.statements, limit),
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, call: &CallNode, limit: Option<usize>) -> fmt::Result {
    if limit == Some(0) {
        return f.write_str(ELLIPSIS);
    }
    let inner = deeper(limit);

    if let Some(head) = &call.head {
        write_call(f, head, inner)?;
        return write_body(f, &call.params, limit);
    }

    let name = call.id().unwrap_or("");
    match (call.class, call.params.as_slice()) {
        (ParamClass::Operator, [operand]) => {
            f.write_str(name)?;
            write_operand(f, operand, inner)
        }
        (ParamClass::Operator, [left, right]) => {
            write_operand(f, left, inner)?;
            write!(f, " {name} ")?;
            write_operand(f, right, inner)
        }
        (ParamClass::Statement, params) => {
            f.write_str(name)?;
            write_body(f, params, limit)
        }
        (_, params) => {
            write!(f, "{name}(")?;
            for (i, p) in params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_syntax(f, p, inner)?;
            }
            f.write_char(')')
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Syntax, limit: Option<usize>) -> fmt::Result {
    match operand {
        Syntax::Call(c) if c.is_operator() && limit != Some(0) => {
            f.write_char('(')?;
            write_call(f, c, limit)?;
            f.write_char(')')
        }
        other => write_syntax(f, other, limit),
    }
}

/// Writes `{ s1; s2; }` with statements one level below `limit`.
fn write_body(f: &mut fmt::Formatter<'_>, statements: &[Syntax], limit: Option<usize>) -> fmt::Result {
    if statements.is_empty() {
        return f.write_str("{}");
    }
    let inner = deeper(limit);
    f.write_str("{ ")?;
    for s in statements {
        write_syntax(f, s, inner)?;
        f.write_str("; ")?;
    }
    f.write_char('}')
}

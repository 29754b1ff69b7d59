//! Syntax tree node types.
//!
//! The shape follows the DSL's own grammar: everything is either a value
//! leaf, a call (which also covers operators and declarations), or a block
//! of statements. Declarations such as `main(){ ... }` are "high-order"
//! calls whose head is itself a call.

/// How a leaf's text was lexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// A bare identifier like `$a` or `echo`.
    Identifier,
    /// A numeric literal like `42`, `0x1f` or `2.5`.
    Number,
    /// A quoted string literal.
    String,
    /// Anything else the lexer produced.
    Other,
}

/// How a call's parameters were written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamClass {
    /// `name(a, b)`
    Parentheses,
    /// Infix or prefix operator: `a + b`, `-a`
    Operator,
    /// `head{ s1; s2; }`
    Statement,
}

/// A value leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueNode {
    /// The leaf's text as written (without quotes for strings).
    pub id: String,
    /// How the text was lexed.
    pub kind: IdKind,
    /// 1-based source line (0 when unknown).
    pub line: u32,
}

impl ValueNode {
    /// Creates a leaf with an unknown line.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: IdKind) -> Self {
        Self {
            id: id.into(),
            kind,
            line: 0,
        }
    }

    /// Returns true if this leaf is an identifier.
    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.kind == IdKind::Identifier
    }

    /// Returns true if this leaf is a numeric literal.
    #[must_use]
    pub fn is_number(&self) -> bool {
        self.kind == IdKind::Number
    }
}

/// A call node.
///
/// For an ordinary call `name` is set and `head` is empty. A high-order call
/// such as `main(){ ... }` or `if(c){ ... }` has no name of its own; its
/// `head` is the lower-order call (`main()`, `if(c)`) and its `params` are
/// the body statements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallNode {
    /// The callee or operator token. `None` for `(expr)` groups and
    /// high-order calls.
    pub name: Option<ValueNode>,
    /// The lower-order call heading a high-order call.
    pub head: Option<Box<CallNode>>,
    /// Arguments, operands, or body statements.
    pub params: Vec<Syntax>,
    /// How the parameters were written.
    pub class: ParamClass,
    /// 1-based source line (0 when unknown).
    pub line: u32,
}

impl CallNode {
    /// Returns the callee or operator text, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.name.as_ref().map(|n| n.id.as_str())
    }

    /// Returns true if this call is headed by another call.
    #[must_use]
    pub fn is_high_order(&self) -> bool {
        self.head.is_some()
    }

    /// Returns the lower-order head of a high-order call.
    #[must_use]
    pub fn lower_order(&self) -> Option<&CallNode> {
        self.head.as_deref()
    }

    /// Returns true if this call is an operator application.
    #[must_use]
    pub fn is_operator(&self) -> bool {
        self.class == ParamClass::Operator
    }

    /// Returns true if the parameters are a statement body.
    #[must_use]
    pub fn has_statements(&self) -> bool {
        self.class == ParamClass::Statement
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Returns the parameter at `index`.
    #[must_use]
    pub fn param(&self, index: usize) -> Option<&Syntax> {
        self.params.get(index)
    }

    /// Returns the text of the parameter at `index`.
    #[must_use]
    pub fn param_id(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(Syntax::id)
    }
}

/// A statement sequence, `{ s1; s2; }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockNode {
    /// The statements in source order.
    pub statements: Vec<Syntax>,
    /// 1-based source line (0 when unknown).
    pub line: u32,
}

/// A syntax tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Syntax {
    /// A value leaf.
    Value(ValueNode),
    /// A call, operator application, or declaration.
    Call(CallNode),
    /// A statement sequence.
    Block(BlockNode),
}

impl Syntax {
    /// Returns the node's identifier text.
    ///
    /// Leaves return their text, calls their callee (empty for groups and
    /// high-order calls), blocks the empty string.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Value(v) => &v.id,
            Self::Call(c) => c.id().unwrap_or(""),
            Self::Block(_) => "",
        }
    }

    /// Returns the 1-based source line (0 when unknown).
    #[must_use]
    pub const fn line(&self) -> u32 {
        match self {
            Self::Value(v) => v.line,
            Self::Call(c) => c.line,
            Self::Block(b) => b.line,
        }
    }

    /// Returns the leaf, or None if not a value.
    #[must_use]
    pub const fn as_value(&self) -> Option<&ValueNode> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the call, or None if not a call.
    #[must_use]
    pub const fn as_call(&self) -> Option<&CallNode> {
        match self {
            Self::Call(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the child nodes in order.
    #[must_use]
    pub fn params(&self) -> &[Syntax] {
        match self {
            Self::Value(_) => &[],
            Self::Call(c) => &c.params,
            Self::Block(b) => &b.statements,
        }
    }

    /// Sets the source line on this node (not its children).
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        match &mut self {
            Self::Value(v) => v.line = line,
            Self::Call(c) => {
                c.line = line;
                if let Some(name) = &mut c.name {
                    name.line = line;
                }
            }
            Self::Block(b) => b.line = line,
        }
        self
    }
}

/// Constructors used by parsers and tests.
impl Syntax {
    /// Creates an identifier leaf.
    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Value(ValueNode::new(name, IdKind::Identifier))
    }

    /// Creates a numeric literal leaf from its source text.
    #[must_use]
    pub fn number(text: impl Into<String>) -> Self {
        Self::Value(ValueNode::new(text, IdKind::Number))
    }

    /// Creates an integer literal leaf.
    #[must_use]
    pub fn int(n: i64) -> Self {
        Self::number(n.to_string())
    }

    /// Creates a string literal leaf.
    #[must_use]
    pub fn string(text: impl Into<String>) -> Self {
        Self::Value(ValueNode::new(text, IdKind::String))
    }

    /// Creates an ordinary call `name(args)`.
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Syntax>) -> Self {
        Self::Call(CallNode {
            name: Some(ValueNode::new(name, IdKind::Identifier)),
            head: None,
            params: args,
            class: ParamClass::Parentheses,
            line: 0,
        })
    }

    /// Creates an operator application; one operand for prefix forms.
    #[must_use]
    pub fn op(token: impl Into<String>, operands: Vec<Syntax>) -> Self {
        Self::Call(CallNode {
            name: Some(ValueNode::new(token, IdKind::Other)),
            head: None,
            params: operands,
            class: ParamClass::Operator,
            line: 0,
        })
    }

    /// Creates a binary operator application.
    #[must_use]
    pub fn binary(token: impl Into<String>, left: Syntax, right: Syntax) -> Self {
        Self::op(token, vec![left, right])
    }

    /// Creates a prefix operator application.
    #[must_use]
    pub fn unary(token: impl Into<String>, operand: Syntax) -> Self {
        Self::op(token, vec![operand])
    }

    /// Creates an assignment `target = value`.
    #[must_use]
    pub fn assign(target: Syntax, value: Syntax) -> Self {
        Self::binary("=", target, value)
    }

    /// Creates a parenthesized group `(expr)`.
    #[must_use]
    pub fn group(inner: Syntax) -> Self {
        Self::Call(CallNode {
            name: None,
            head: None,
            params: vec![inner],
            class: ParamClass::Parentheses,
            line: 0,
        })
    }

    /// Creates a high-order call `head{ body }`.
    ///
    /// A non-call head is wrapped as a parameterless call.
    #[must_use]
    pub fn high_order(head: Syntax, body: Vec<Syntax>) -> Self {
        let head = match head {
            Self::Call(c) => c,
            other => CallNode {
                name: Some(ValueNode::new(other.id(), IdKind::Identifier)),
                head: None,
                params: Vec::new(),
                class: ParamClass::Parentheses,
                line: other.line(),
            },
        };
        let line = head.line;
        Self::Call(CallNode {
            name: None,
            head: Some(Box::new(head)),
            params: body,
            class: ParamClass::Statement,
            line,
        })
    }

    /// Creates a procedure declaration `name(params){ body }`.
    #[must_use]
    pub fn procedure(name: impl Into<String>, params: &[&str], body: Vec<Syntax>) -> Self {
        let params = params.iter().map(|p| Self::ident(*p)).collect();
        Self::high_order(Self::call(name, params), body)
    }

    /// Creates a statement block `{ statements }`.
    #[must_use]
    pub fn block(statements: Vec<Syntax>) -> Self {
        Self::Block(BlockNode {
            statements,
            line: 0,
        })
    }
}

// Parsers can produce arbitrarily deep trees; children are moved onto a
// heap worklist so dropping never recurses.

impl Drop for CallNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.params);
        if let Some(head) = self.head.take() {
            pending.push(Syntax::Call(*head));
        }
        drain(pending);
    }
}

impl Drop for BlockNode {
    fn drop(&mut self) {
        drain(std::mem::take(&mut self.statements));
    }
}

/// Drops `pending` and all descendants without recursion.
fn drain(mut pending: Vec<Syntax>) {
    while let Some(node) = pending.pop() {
        match node {
            Syntax::Value(_) => {}
            Syntax::Call(mut call) => {
                pending.append(&mut call.params);
                if let Some(head) = call.head.take() {
                    pending.push(Syntax::Call(*head));
                }
            }
            Syntax::Block(mut block) => pending.append(&mut block.statements),
        }
    }
}

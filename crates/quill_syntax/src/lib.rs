//! Syntax tree contract for Quill.
//!
//! Source text is parsed elsewhere; this crate defines the tree the parser
//! hands over and the compiler consumes:
//! - [`Syntax`] - A node: value leaf, call, or statement block
//! - [`ValueNode`] - A leaf with its [`IdKind`]
//! - [`CallNode`] - A call, operator, or `name(params){ body }` declaration
//! - [`BlockNode`] - A statement sequence
//!
//! Every node renders back to script text through [`std::fmt::Display`],
//! which the compiler uses when reporting diagnostics.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod node;
mod render;

pub use node::{BlockNode, CallNode, IdKind, ParamClass, Syntax, ValueNode};
pub use render::Elided;

//! Name interning for variables and procedures.
//!
//! Every name is mapped to a dense integer id the first time it is seen, so
//! the VM can index flat tables instead of hashing strings in its hot loop.
//! Variables and procedures live in two independent namespaces: the same
//! text may be interned in both and the resulting ids are unrelated.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Interned variable identifier.
///
/// Variables are names like `$a` or `count` read by `VAR` and written by
/// `VARSET`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) u32);

impl VarId {
    /// Returns the raw index of this variable.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Creates an id from a raw index (as decoded from an instruction operand).
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Debug for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarId({})", self.0)
    }
}

/// Interned procedure identifier.
///
/// Native callbacks and compiled procedures share this namespace, so a call
/// site only needs the name to resolve its target.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ProcId(pub(crate) u32);

impl ProcId {
    /// Returns the raw index of this procedure.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Creates an id from a raw index (as decoded from an instruction operand).
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Debug for ProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcId({})", self.0)
    }
}

/// One id namespace: names in first-seen order plus the reverse map.
#[derive(Clone, Debug, Default)]
struct Names {
    names: Vec<Arc<str>>,
    index: HashMap<Arc<str>, u32>,
}

impl Names {
    fn intern(&mut self, s: &str) -> u32 {
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }

        let idx = u32::try_from(self.names.len()).expect("too many interned names");
        let arc: Arc<str> = s.into();
        self.names.push(arc.clone());
        self.index.insert(arc, idx);
        idx
    }

    fn lookup(&self, s: &str) -> Option<u32> {
        self.index.get(s).copied()
    }

    fn name(&self, idx: u32) -> Option<&str> {
        self.names.get(idx as usize).map(AsRef::as_ref)
    }
}

/// Interner for variable and procedure names.
///
/// Ids are assigned densely from zero in first-seen order, so interning the
/// same names in the same order always reproduces the same ids.
/// It is not thread-safe; use external synchronization if needed.
#[derive(Clone, Debug, Default)]
pub struct Interner {
    vars: Names,
    procs: Names,
}

impl Interner {
    /// Creates an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a variable name, returning its [`VarId`].
    ///
    /// # Panics
    ///
    /// Panics if the number of interned variables exceeds `u32::MAX`.
    pub fn intern_var(&mut self, name: &str) -> VarId {
        VarId(self.vars.intern(name))
    }

    /// Interns a procedure or native name, returning its [`ProcId`].
    ///
    /// # Panics
    ///
    /// Panics if the number of interned procedures exceeds `u32::MAX`.
    pub fn intern_proc(&mut self, name: &str) -> ProcId {
        ProcId(self.procs.intern(name))
    }

    /// Looks up a variable without interning it.
    #[must_use]
    pub fn lookup_var(&self, name: &str) -> Option<VarId> {
        self.vars.lookup(name).map(VarId)
    }

    /// Looks up a procedure without interning it.
    #[must_use]
    pub fn lookup_proc(&self, name: &str) -> Option<ProcId> {
        self.procs.lookup(name).map(ProcId)
    }

    /// Gets the name of a variable.
    #[must_use]
    pub fn var_name(&self, id: VarId) -> Option<&str> {
        self.vars.name(id.0)
    }

    /// Gets the name of a procedure.
    #[must_use]
    pub fn proc_name(&self, id: ProcId) -> Option<&str> {
        self.procs.name(id.0)
    }

    /// Returns the number of interned variables.
    #[must_use]
    pub fn var_count(&self) -> usize {
        self.vars.names.len()
    }

    /// Returns the number of interned procedures.
    #[must_use]
    pub fn proc_count(&self) -> usize {
        self.procs.names.len()
    }
}

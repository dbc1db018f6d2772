use std::fmt;
use std::sync::Arc;

/// Name of a value type in the subject's API surface.
///
/// The engine compares types purely by name and never inspects their
/// structure; whatever analysed the subject is responsible for handing out
/// consistent names. The name is shared, so clones are cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDesc(Arc<str>);

impl TypeDesc {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeDesc {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Reference to the return value of the statement at a position in the
/// owning sequence.
///
/// A statement may only reference strictly earlier positions, so every
/// sequence stays a valid dependency order. Insertions and removals shift
/// these references; they are plain indices, never pointers into the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarRef(pub usize);

impl VarRef {
    pub fn position(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "var_{}", self.0)
    }
}

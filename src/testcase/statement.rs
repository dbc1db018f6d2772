use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::config::PrimitivesConfig;
use crate::testcase::variable::{TypeDesc, VarRef};

/// A literal value embedded directly in a test case.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    None,
}

impl ConstantValue {
    /// Draws a fresh random constant for a primitive type name, if the name
    /// denotes one.
    pub fn random_for_type<R: Rng>(
        ty: &TypeDesc,
        primitives: &PrimitivesConfig,
        rng: &mut R,
    ) -> Option<Self> {
        let max = primitives.max_int;
        match ty.name() {
            "int" => Some(Self::Int(rng.gen_range(-max..=max))),
            "float" => Some(Self::Float(rng.gen_range(-(max as f64)..=max as f64))),
            "bool" => Some(Self::Bool(rng.gen())),
            "str" => {
                let len = rng.gen_range(0..=primitives.string_length);
                let s: String = (0..len)
                    .map(|_| rng.sample(Alphanumeric) as char)
                    .collect();
                Some(Self::Str(s))
            }
            _ => None,
        }
    }
}

/// A callable piece of the subject's API surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallTarget {
    /// Owning type for methods and constructors; absent for free functions.
    pub owner: Option<TypeDesc>,
    pub name: String,
    pub param_types: Vec<TypeDesc>,
    /// Type of the produced value, if the call produces one.
    pub return_type: Option<TypeDesc>,
    /// Whether calling this target exercises the software under test, as
    /// opposed to merely constructing input data for it.
    pub under_test: bool,
}

impl CallTarget {
    pub fn function(
        name: impl Into<String>,
        param_types: Vec<TypeDesc>,
        return_type: Option<TypeDesc>,
        under_test: bool,
    ) -> Self {
        Self {
            owner: None,
            name: name.into(),
            param_types,
            return_type,
            under_test,
        }
    }

    pub fn method(
        owner: TypeDesc,
        name: impl Into<String>,
        param_types: Vec<TypeDesc>,
        return_type: Option<TypeDesc>,
        under_test: bool,
    ) -> Self {
        Self {
            owner: Some(owner),
            name: name.into(),
            param_types,
            return_type,
            under_test,
        }
    }
}

/// The closed set of statement shapes a test case is built from.
///
/// Each variant records the types of the values it consumes, so a statement
/// can be re-homed into another sequence by rebinding its references to
/// compatible values there.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// A literal value.
    Constant(ConstantValue),
    /// Call of a function, method or constructor. Arguments line up with
    /// `target.param_types`.
    Call { target: CallTarget, args: Vec<VarRef> },
    /// Read of a field on an earlier value.
    FieldAccess {
        source: VarRef,
        source_type: TypeDesc,
        field: String,
    },
    /// Store of an earlier value into a field of another.
    Assignment {
        lhs: VarRef,
        lhs_type: TypeDesc,
        field: String,
        rhs: VarRef,
        rhs_type: TypeDesc,
    },
    /// Homogeneous collection built from earlier values.
    Collection {
        element_type: TypeDesc,
        elements: Vec<VarRef>,
    },
}

/// One operation in a test case, together with the type of the value it
/// produces. The produced value is referenced by later statements via the
/// position this statement occupies in its sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub ret_type: Option<TypeDesc>,
}

impl Statement {
    pub fn constant(value: ConstantValue, ty: TypeDesc) -> Self {
        Self {
            kind: StatementKind::Constant(value),
            ret_type: Some(ty),
        }
    }

    pub fn call(target: CallTarget, args: Vec<VarRef>) -> Self {
        let ret_type = target.return_type.clone();
        Self {
            kind: StatementKind::Call { target, args },
            ret_type,
        }
    }

    pub fn field_access(
        source: VarRef,
        source_type: TypeDesc,
        field: impl Into<String>,
        ret_type: TypeDesc,
    ) -> Self {
        Self {
            kind: StatementKind::FieldAccess {
                source,
                source_type,
                field: field.into(),
            },
            ret_type: Some(ret_type),
        }
    }

    pub fn assignment(
        lhs: VarRef,
        lhs_type: TypeDesc,
        field: impl Into<String>,
        rhs: VarRef,
        rhs_type: TypeDesc,
    ) -> Self {
        Self {
            kind: StatementKind::Assignment {
                lhs,
                lhs_type,
                field: field.into(),
                rhs,
                rhs_type,
            },
            ret_type: None,
        }
    }

    pub fn collection(element_type: TypeDesc, elements: Vec<VarRef>, ret_type: TypeDesc) -> Self {
        Self {
            kind: StatementKind::Collection {
                element_type,
                elements,
            },
            ret_type: Some(ret_type),
        }
    }

    /// The positions this statement reads from, in argument order.
    pub fn inputs(&self) -> Vec<VarRef> {
        self.typed_inputs().into_iter().map(|(var, _)| var).collect()
    }

    /// The positions this statement reads from, paired with the type each
    /// position is expected to produce.
    pub fn typed_inputs(&self) -> Vec<(VarRef, TypeDesc)> {
        match &self.kind {
            StatementKind::Constant(_) => Vec::new(),
            StatementKind::Call { target, args } => args
                .iter()
                .copied()
                .zip(target.param_types.iter().cloned())
                .collect(),
            StatementKind::FieldAccess {
                source, source_type, ..
            } => vec![(*source, source_type.clone())],
            StatementKind::Assignment {
                lhs,
                lhs_type,
                rhs,
                rhs_type,
                ..
            } => vec![(*lhs, lhs_type.clone()), (*rhs, rhs_type.clone())],
            StatementKind::Collection {
                element_type,
                elements,
            } => elements
                .iter()
                .map(|var| (*var, element_type.clone()))
                .collect(),
        }
    }

    /// Whether any input references `position`.
    pub fn references(&self, position: usize) -> bool {
        self.inputs().iter().any(|var| var.position() == position)
    }

    /// Applies `f` to every input reference in place.
    pub fn map_inputs(&mut self, f: impl Fn(VarRef) -> VarRef) {
        match &mut self.kind {
            StatementKind::Constant(_) => {}
            StatementKind::Call { args, .. } => {
                for arg in args {
                    *arg = f(*arg);
                }
            }
            StatementKind::FieldAccess { source, .. } => *source = f(*source),
            StatementKind::Assignment { lhs, rhs, .. } => {
                *lhs = f(*lhs);
                *rhs = f(*rhs);
            }
            StatementKind::Collection { elements, .. } => {
                for element in elements {
                    *element = f(*element);
                }
            }
        }
    }

    /// Redirects every input that references `from` to `to` instead.
    pub fn rebind(&mut self, from: VarRef, to: VarRef) {
        self.map_inputs(|var| if var == from { to } else { var });
    }

    /// The call target, if this statement is a call.
    pub fn call_target(&self) -> Option<&CallTarget> {
        match &self.kind {
            StatementKind::Call { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Mutates the statement's own payload without touching its references.
    ///
    /// Constants are nudged by a bounded delta, strings are edited one
    /// character at a time, collections shrink by one element. Calls, field
    /// accesses and assignments have no internal payload to vary; swapping
    /// their target is the test factory's job. Returns whether anything
    /// changed.
    pub fn mutate_payload<R: Rng>(&mut self, primitives: &PrimitivesConfig, rng: &mut R) -> bool {
        match &mut self.kind {
            StatementKind::Constant(value) => match value {
                ConstantValue::Int(v) => {
                    let delta = rng.gen_range(1..=primitives.max_delta);
                    if rng.gen() {
                        *v = v.saturating_add(delta);
                    } else {
                        *v = v.saturating_sub(delta);
                    }
                    true
                }
                ConstantValue::Float(v) => {
                    let bound = primitives.max_delta as f64;
                    *v += rng.gen_range(-bound..=bound);
                    true
                }
                ConstantValue::Bool(v) => {
                    *v = !*v;
                    true
                }
                ConstantValue::Str(s) => mutate_string(s, primitives.string_length, rng),
                ConstantValue::None => false,
            },
            StatementKind::Collection { elements, .. } => {
                if elements.is_empty() {
                    false
                } else {
                    let victim = rng.gen_range(0..elements.len());
                    elements.remove(victim);
                    true
                }
            }
            _ => false,
        }
    }
}

/// Applies one random edit to `s`: insert, delete or replace a character.
/// Returns false when no edit is applicable, e.g. an empty string that is
/// already at the length cap.
fn mutate_string<R: Rng>(s: &mut String, max_length: usize, rng: &mut R) -> bool {
    let chars: Vec<char> = s.chars().collect();
    let can_grow = chars.len() < max_length;
    let can_shrink = !chars.is_empty();
    if !can_grow && !can_shrink {
        return false;
    }

    let op = rng.gen_range(0..3);
    let mut chars = chars;
    match op {
        0 if can_grow => {
            let at = rng.gen_range(0..=chars.len());
            chars.insert(at, rng.sample(Alphanumeric) as char);
        }
        1 if can_shrink => {
            let at = rng.gen_range(0..chars.len());
            chars.remove(at);
        }
        _ if can_shrink => {
            let at = rng.gen_range(0..chars.len());
            chars[at] = rng.sample(Alphanumeric) as char;
        }
        _ => {
            let at = rng.gen_range(0..=chars.len());
            chars.insert(at, rng.sample(Alphanumeric) as char);
        }
    }
    *s = chars.into_iter().collect();
    true
}

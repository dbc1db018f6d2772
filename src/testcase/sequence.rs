use std::collections::BTreeSet;

use crate::error::{EvotestError, Result};
use crate::testcase::statement::{CallTarget, Statement};
use crate::testcase::variable::{TypeDesc, VarRef};

/// An ordered sequence of statements forming one candidate test.
///
/// Statements live in a position arena: a statement's value is addressed by
/// the index it occupies, and inputs may only point at strictly earlier
/// positions. Every mutating operation below preserves that ordering, so a
/// sequence can always be executed front to back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestCase {
    statements: Vec<Statement>,
}

impl TestCase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn get(&self, position: usize) -> Result<&Statement> {
        self.statements
            .get(position)
            .ok_or(EvotestError::InvalidPosition {
                position,
                size: self.statements.len(),
            })
    }

    pub fn get_mut(&mut self, position: usize) -> Result<&mut Statement> {
        let size = self.statements.len();
        self.statements
            .get_mut(position)
            .ok_or(EvotestError::InvalidPosition { position, size })
    }

    /// Appends a statement and returns the reference to its value.
    pub fn add_statement(&mut self, statement: Statement) -> Result<VarRef> {
        let position = self.statements.len();
        self.check_inputs(&statement, position)?;
        self.statements.push(statement);
        Ok(VarRef(position))
    }

    /// Inserts a statement at `position`, shifting later statements and all
    /// references into them one slot down the sequence.
    pub fn insert_statement(&mut self, position: usize, statement: Statement) -> Result<VarRef> {
        if position > self.statements.len() {
            return Err(EvotestError::InvalidPosition {
                position,
                size: self.statements.len(),
            });
        }
        self.check_inputs(&statement, position)?;
        for later in &mut self.statements[position..] {
            later.map_inputs(|var| {
                if var.position() >= position {
                    VarRef(var.position() + 1)
                } else {
                    var
                }
            });
        }
        self.statements.insert(position, statement);
        Ok(VarRef(position))
    }

    /// Removes the statement at `position`. Fails if any later statement
    /// still references its value; use [`TestCase::remove_gracefully`] to
    /// rebind or cascade instead.
    pub fn remove(&mut self, position: usize) -> Result<Statement> {
        if position >= self.statements.len() {
            return Err(EvotestError::InvalidPosition {
                position,
                size: self.statements.len(),
            });
        }
        if let Some(&dependent) = self.dependents_of(position).first() {
            return Err(EvotestError::Construction(format!(
                "cannot remove statement {position}: statement {dependent} still references it"
            )));
        }
        Ok(self.remove_unchecked(position))
    }

    /// Removes the statement at `position` without leaving dangling
    /// references.
    ///
    /// Later statements that read the removed value are rebound to the
    /// nearest earlier value of the same type where one exists; statements
    /// that cannot be rebound are removed as well, cascading through their
    /// own dependents. Always removes at least the addressed statement.
    pub fn remove_gracefully(&mut self, position: usize) -> Result<bool> {
        if position >= self.statements.len() {
            return Err(EvotestError::InvalidPosition {
                position,
                size: self.statements.len(),
            });
        }

        let mut doomed: BTreeSet<usize> = BTreeSet::new();
        doomed.insert(position);

        for pos in (position + 1)..self.statements.len() {
            let offending: Vec<(VarRef, TypeDesc)> = self.statements[pos]
                .typed_inputs()
                .into_iter()
                .filter(|(var, _)| doomed.contains(&var.position()))
                .collect();
            if offending.is_empty() {
                continue;
            }

            let mut rebinds: Vec<(VarRef, VarRef)> = Vec::new();
            let mut rescued = true;
            for (var, wanted) in &offending {
                let substitute = (0..pos)
                    .rev()
                    .filter(|candidate| !doomed.contains(candidate))
                    .find(|&candidate| {
                        self.statements[candidate].ret_type.as_ref() == Some(wanted)
                    });
                match substitute {
                    Some(candidate) => rebinds.push((*var, VarRef(candidate))),
                    None => {
                        rescued = false;
                        break;
                    }
                }
            }

            if rescued {
                for (from, to) in rebinds {
                    self.statements[pos].rebind(from, to);
                }
            } else {
                doomed.insert(pos);
            }
        }

        for &pos in doomed.iter().rev() {
            self.remove_unchecked(pos);
        }
        Ok(true)
    }

    /// Truncates the sequence to `position + 1` statements. A position at or
    /// past the end leaves the sequence unchanged.
    pub fn chop(&mut self, position: usize) {
        self.statements.truncate(position.saturating_add(1));
    }

    /// Positions strictly before `before` whose value has the given type.
    pub fn variables_of_type(&self, ty: &TypeDesc, before: usize) -> Vec<VarRef> {
        self.statements
            .iter()
            .take(before.min(self.statements.len()))
            .enumerate()
            .filter(|(_, stmt)| stmt.ret_type.as_ref() == Some(ty))
            .map(|(pos, _)| VarRef(pos))
            .collect()
    }

    /// Positions of statements that directly read the value at `position`.
    pub fn dependents_of(&self, position: usize) -> Vec<usize> {
        self.statements
            .iter()
            .enumerate()
            .skip(position + 1)
            .filter(|(_, stmt)| stmt.references(position))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Whether any statement calls a target matching the predicate.
    pub fn has_call_on<F>(&self, predicate: F) -> bool
    where
        F: Fn(&CallTarget) -> bool,
    {
        self.statements
            .iter()
            .filter_map(Statement::call_target)
            .any(predicate)
    }

    /// Whether any statement calls into the software under test.
    pub fn has_call_under_test(&self) -> bool {
        self.has_call_on(|target| target.under_test)
    }

    fn check_inputs(&self, statement: &Statement, position: usize) -> Result<()> {
        for var in statement.inputs() {
            if var.position() >= position {
                return Err(EvotestError::ForwardReference {
                    position,
                    input: var.position(),
                });
            }
        }
        Ok(())
    }

    fn remove_unchecked(&mut self, position: usize) -> Statement {
        let removed = self.statements.remove(position);
        for later in &mut self.statements[position..] {
            later.map_inputs(|var| {
                if var.position() > position {
                    VarRef(var.position() - 1)
                } else {
                    var
                }
            });
        }
        removed
    }
}

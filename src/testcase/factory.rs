use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::PrimitivesConfig;
use crate::error::{EvotestError, Result};
use crate::testcase::cluster::TestCluster;
use crate::testcase::sequence::TestCase;
use crate::testcase::statement::{CallTarget, ConstantValue, Statement};
use crate::testcase::variable::{TypeDesc, VarRef};

/// Chance of picking an under-test target over an arbitrary one when
/// inserting a fresh statement.
const UNDER_TEST_BIAS: f64 = 0.5;
/// Chance of reusing an existing value of the wanted type instead of
/// constructing a new one.
const REUSE_PROBABILITY: f64 = 0.5;

/// The mutation operators' view of test construction.
///
/// Chromosomes drive the search but never build statements themselves; they
/// delegate here so that construction policy (which targets, which values,
/// how dependencies get satisfied) stays in one place.
pub trait TestFactory {
    /// Inserts one randomly constructed statement at a position in
    /// `0..=max_position`, creating any missing dependencies before it.
    /// Returns the position of the inserted statement.
    fn insert_random_statement(
        &self,
        test: &mut TestCase,
        max_position: usize,
        rng: &mut StdRng,
    ) -> Result<usize>;

    /// Swaps the call at `position` for a different target with the same
    /// return type whose arguments can be served by values already in scope.
    /// Returns whether a swap happened.
    fn change_random_call(
        &self,
        test: &mut TestCase,
        position: usize,
        rng: &mut StdRng,
    ) -> Result<bool>;

    /// Clones `statement` onto the end of `test`, rebinding each input to
    /// the nearest value of the required type already present there.
    fn append_statement(&self, test: &mut TestCase, statement: &Statement) -> Result<()>;

    /// Removes the statement at `position`, rebinding dependents where
    /// possible and cascading where not.
    fn delete_statement_gracefully(&self, test: &mut TestCase, position: usize) -> Result<bool> {
        test.remove_gracefully(position)
    }

    /// Whether `test` still exercises the software under test at all.
    fn has_call_on_sut(&self, test: &TestCase) -> bool {
        test.has_call_under_test()
    }
}

/// [`TestFactory`] backed by a [`TestCluster`].
///
/// Dependency construction is bounded: a missing argument is served by an
/// existing value, a fresh primitive constant, or one generator call whose
/// own arguments must already be satisfiable without further generators.
pub struct ClusterTestFactory {
    cluster: Arc<TestCluster>,
    primitives: PrimitivesConfig,
}

impl ClusterTestFactory {
    pub fn new(cluster: Arc<TestCluster>, primitives: PrimitivesConfig) -> Self {
        Self {
            cluster,
            primitives,
        }
    }

    fn pick_target(&self, rng: &mut StdRng) -> Result<CallTarget> {
        if self.cluster.is_empty() {
            return Err(EvotestError::Construction(
                "test cluster has no callable targets".into(),
            ));
        }
        let under_test: Vec<&CallTarget> = self.cluster.targets_under_test().collect();
        let pool: Vec<&CallTarget> = if !under_test.is_empty() && rng.gen_bool(UNDER_TEST_BIAS) {
            under_test
        } else {
            self.cluster.targets().iter().collect()
        };
        Ok(pool[rng.gen_range(0..pool.len())].clone())
    }

    /// Obtains a reference to a value of type `ty` usable at `*insert_at`,
    /// inserting helper statements (and advancing `insert_at`) as needed.
    fn provide_value(
        &self,
        test: &mut TestCase,
        ty: &TypeDesc,
        insert_at: &mut usize,
        rng: &mut StdRng,
        allow_generators: bool,
    ) -> Result<VarRef> {
        let existing = test.variables_of_type(ty, *insert_at);
        if !existing.is_empty() && rng.gen_bool(REUSE_PROBABILITY) {
            return Ok(existing[rng.gen_range(0..existing.len())]);
        }
        match self.create_value(test, ty, insert_at, rng, allow_generators) {
            Ok(var) => Ok(var),
            Err(err) => {
                // Construction failed; settle for reuse when possible.
                let existing = test.variables_of_type(ty, *insert_at);
                if existing.is_empty() {
                    Err(err)
                } else {
                    Ok(existing[rng.gen_range(0..existing.len())])
                }
            }
        }
    }

    fn create_value(
        &self,
        test: &mut TestCase,
        ty: &TypeDesc,
        insert_at: &mut usize,
        rng: &mut StdRng,
        allow_generators: bool,
    ) -> Result<VarRef> {
        if let Some(value) = ConstantValue::random_for_type(ty, &self.primitives, rng) {
            let var = test.insert_statement(*insert_at, Statement::constant(value, ty.clone()))?;
            *insert_at += 1;
            return Ok(var);
        }
        if !allow_generators {
            return Err(EvotestError::Construction(format!(
                "cannot construct a value of type {ty} here"
            )));
        }
        let generators = self.cluster.generators_for(ty);
        if generators.is_empty() {
            return Err(EvotestError::Construction(format!(
                "no target in the cluster produces a value of type {ty}"
            )));
        }
        let generator = generators[rng.gen_range(0..generators.len())].clone();
        let mut args = Vec::with_capacity(generator.param_types.len());
        for param_ty in &generator.param_types {
            args.push(self.provide_value(test, param_ty, insert_at, rng, false)?);
        }
        let var = test.insert_statement(*insert_at, Statement::call(generator, args))?;
        *insert_at += 1;
        Ok(var)
    }

    fn insert_call_at(
        &self,
        test: &mut TestCase,
        target: CallTarget,
        position: usize,
        rng: &mut StdRng,
    ) -> Result<usize> {
        let mut insert_at = position;
        let mut args = Vec::with_capacity(target.param_types.len());
        for param_ty in &target.param_types {
            args.push(self.provide_value(test, param_ty, &mut insert_at, rng, true)?);
        }
        test.insert_statement(insert_at, Statement::call(target, args))?;
        Ok(insert_at)
    }
}

impl TestFactory for ClusterTestFactory {
    fn insert_random_statement(
        &self,
        test: &mut TestCase,
        max_position: usize,
        rng: &mut StdRng,
    ) -> Result<usize> {
        let backup = test.clone();
        let position = rng.gen_range(0..=max_position.min(test.size()));
        let target = self.pick_target(rng)?;
        match self.insert_call_at(test, target, position, rng) {
            Ok(inserted) => Ok(inserted),
            Err(err) => {
                // Leave no half-built dependencies behind.
                *test = backup;
                Err(err)
            }
        }
    }

    fn change_random_call(
        &self,
        test: &mut TestCase,
        position: usize,
        rng: &mut StdRng,
    ) -> Result<bool> {
        let current = match test.get(position)?.call_target() {
            Some(target) => target.clone(),
            None => return Ok(false),
        };
        let candidates: Vec<CallTarget> = self
            .cluster
            .targets()
            .iter()
            .filter(|target| **target != current)
            .filter(|target| target.return_type == current.return_type)
            .filter(|target| {
                target
                    .param_types
                    .iter()
                    .all(|ty| !test.variables_of_type(ty, position).is_empty())
            })
            .cloned()
            .collect();
        if candidates.is_empty() {
            return Ok(false);
        }
        let replacement = candidates[rng.gen_range(0..candidates.len())].clone();
        let args: Vec<VarRef> = replacement
            .param_types
            .iter()
            .map(|ty| {
                let vars = test.variables_of_type(ty, position);
                vars[rng.gen_range(0..vars.len())]
            })
            .collect();
        *test.get_mut(position)? = Statement::call(replacement, args);
        Ok(true)
    }

    fn append_statement(&self, test: &mut TestCase, statement: &Statement) -> Result<()> {
        let horizon = test.size();
        let mut mapping: Vec<(VarRef, VarRef)> = Vec::new();
        for (var, wanted) in statement.typed_inputs() {
            let candidates = test.variables_of_type(&wanted, horizon);
            let substitute = match candidates.last() {
                Some(var) => *var,
                None => {
                    return Err(EvotestError::Construction(format!(
                        "no value of type {wanted} to rebind {var} onto"
                    )))
                }
            };
            mapping.push((var, substitute));
        }
        let mut adjusted = statement.clone();
        adjusted.map_inputs(|var| {
            mapping
                .iter()
                .find(|(from, _)| *from == var)
                .map_or(var, |(_, to)| *to)
        });
        test.add_statement(adjusted)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn int_ty() -> TypeDesc {
        TypeDesc::new("int")
    }

    fn counter_ty() -> TypeDesc {
        TypeDesc::new("Counter")
    }

    fn counter_cluster() -> Arc<TestCluster> {
        Arc::new(TestCluster::new(vec![
            CallTarget::function("make_counter", vec![], Some(counter_ty()), false),
            CallTarget::method(
                counter_ty(),
                "increment",
                vec![counter_ty(), int_ty()],
                Some(int_ty()),
                true,
            ),
            CallTarget::method(
                counter_ty(),
                "decrement",
                vec![counter_ty(), int_ty()],
                Some(int_ty()),
                true,
            ),
        ]))
    }

    fn factory() -> ClusterTestFactory {
        ClusterTestFactory::new(counter_cluster(), PrimitivesConfig::default())
    }

    fn assert_well_formed(test: &TestCase) {
        for (pos, stmt) in test.statements().iter().enumerate() {
            for var in stmt.inputs() {
                assert!(var.position() < pos, "forward reference at {pos}");
            }
        }
    }

    #[test]
    fn test_insert_builds_dependencies_before_the_call() {
        let factory = factory();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let mut test = TestCase::new();
            let position = factory
                .insert_random_statement(&mut test, 0, &mut rng)
                .unwrap();
            assert!(position < test.size());
            assert!(test.get(position).unwrap().call_target().is_some());
            assert_well_formed(&test);
        }
    }

    #[test]
    fn test_insert_reports_position_of_the_call_not_its_helpers() {
        let factory = factory();
        let mut rng = StdRng::seed_from_u64(5);
        let mut test = TestCase::new();
        let position = factory
            .insert_random_statement(&mut test, 0, &mut rng)
            .unwrap();
        // Helpers, if any, sit strictly before the reported position.
        assert_eq!(position, test.size() - 1);
    }

    #[test]
    fn test_insert_restores_test_on_failure() {
        let cluster = Arc::new(TestCluster::new(vec![CallTarget::function(
            "consume",
            vec![TypeDesc::new("Window")],
            None,
            true,
        )]));
        let factory = ClusterTestFactory::new(cluster, PrimitivesConfig::default());
        let mut rng = StdRng::seed_from_u64(3);
        let mut test = TestCase::new();
        let result = factory.insert_random_statement(&mut test, 0, &mut rng);
        assert!(matches!(result, Err(EvotestError::Construction(_))));
        assert!(test.is_empty());
    }

    #[test]
    fn test_insert_fails_on_empty_cluster() {
        let factory =
            ClusterTestFactory::new(Arc::new(TestCluster::default()), PrimitivesConfig::default());
        let mut rng = StdRng::seed_from_u64(3);
        let mut test = TestCase::new();
        assert!(factory
            .insert_random_statement(&mut test, 0, &mut rng)
            .is_err());
    }

    #[test]
    fn test_change_call_swaps_to_compatible_target() {
        let factory = factory();
        let mut rng = StdRng::seed_from_u64(3);
        let mut test = TestCase::new();
        let counter = test
            .add_statement(Statement::call(
                CallTarget::function("make_counter", vec![], Some(counter_ty()), false),
                vec![],
            ))
            .unwrap();
        let amount = test
            .add_statement(Statement::constant(ConstantValue::Int(5), int_ty()))
            .unwrap();
        let call = test
            .add_statement(Statement::call(
                CallTarget::method(
                    counter_ty(),
                    "increment",
                    vec![counter_ty(), int_ty()],
                    Some(int_ty()),
                    true,
                ),
                vec![counter, amount],
            ))
            .unwrap();

        let changed = factory
            .change_random_call(&mut test, call.position(), &mut rng)
            .unwrap();
        assert!(changed);
        let target = test.get(call.position()).unwrap().call_target().unwrap();
        assert_eq!(target.name, "decrement");
        assert_well_formed(&test);
    }

    #[test]
    fn test_change_call_leaves_non_calls_alone() {
        let factory = factory();
        let mut rng = StdRng::seed_from_u64(3);
        let mut test = TestCase::new();
        test.add_statement(Statement::constant(ConstantValue::Int(5), int_ty()))
            .unwrap();
        assert!(!factory.change_random_call(&mut test, 0, &mut rng).unwrap());
    }

    #[test]
    fn test_change_call_reports_no_candidates() {
        // A cluster where increment has no same-return-type sibling.
        let cluster = Arc::new(TestCluster::new(vec![
            CallTarget::function("make_counter", vec![], Some(counter_ty()), false),
            CallTarget::method(
                counter_ty(),
                "increment",
                vec![counter_ty(), int_ty()],
                Some(int_ty()),
                true,
            ),
        ]));
        let factory = ClusterTestFactory::new(cluster, PrimitivesConfig::default());
        let mut rng = StdRng::seed_from_u64(3);
        let mut test = TestCase::new();
        let counter = test
            .add_statement(Statement::call(
                CallTarget::function("make_counter", vec![], Some(counter_ty()), false),
                vec![],
            ))
            .unwrap();
        let amount = test
            .add_statement(Statement::constant(ConstantValue::Int(5), int_ty()))
            .unwrap();
        let call = test
            .add_statement(Statement::call(
                CallTarget::method(
                    counter_ty(),
                    "increment",
                    vec![counter_ty(), int_ty()],
                    Some(int_ty()),
                    true,
                ),
                vec![counter, amount],
            ))
            .unwrap();
        assert!(!factory
            .change_random_call(&mut test, call.position(), &mut rng)
            .unwrap());
    }

    #[test]
    fn test_append_rebinds_to_nearest_destination_values() {
        let factory = factory();
        let source_stmt = Statement::call(
            CallTarget::method(
                counter_ty(),
                "increment",
                vec![counter_ty(), int_ty()],
                Some(int_ty()),
                true,
            ),
            vec![VarRef(0), VarRef(1)],
        );

        let mut dest = TestCase::new();
        dest.add_statement(Statement::call(
            CallTarget::function("make_counter", vec![], Some(counter_ty()), false),
            vec![],
        ))
        .unwrap();
        dest.add_statement(Statement::constant(ConstantValue::Int(1), int_ty()))
            .unwrap();
        dest.add_statement(Statement::constant(ConstantValue::Int(2), int_ty()))
            .unwrap();

        factory.append_statement(&mut dest, &source_stmt).unwrap();
        assert_eq!(dest.size(), 4);
        // Counter from position 0, int from the nearest int at position 2.
        assert_eq!(dest.get(3).unwrap().inputs(), vec![VarRef(0), VarRef(2)]);
    }

    #[test]
    fn test_append_fails_without_compatible_values() {
        let factory = factory();
        let source_stmt = Statement::call(
            CallTarget::method(
                counter_ty(),
                "increment",
                vec![counter_ty(), int_ty()],
                Some(int_ty()),
                true,
            ),
            vec![VarRef(0), VarRef(1)],
        );
        let mut dest = TestCase::new();
        dest.add_statement(Statement::constant(ConstantValue::Int(1), int_ty()))
            .unwrap();
        assert!(matches!(
            factory.append_statement(&mut dest, &source_stmt),
            Err(EvotestError::Construction(_))
        ));
        assert_eq!(dest.size(), 1);
    }
}

mod common;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use evotest::config::{PrimitivesConfig, SearchConfig};
use evotest::engines::search::{
    Chromosome, ChromosomeFactory, TestCaseChromosome, TestCaseChromosomeFactory,
};
use evotest::testcase::{
    CallTarget, ClusterTestFactory, ConstantValue, ExecutionResult, Statement, TestCase,
    TestCaseExecutor, TestCluster, TestFactory,
};

fn op(name: &str) -> CallTarget {
    CallTarget::function(name, vec![], None, true)
}

/// Five distinct operations, all under test and all without parameters, so
/// every sequence position is independent of every other.
fn ops_factory() -> Arc<dyn TestFactory> {
    let cluster = TestCluster::new(vec![op("op0"), op("op1"), op("op2"), op("op3"), op("op4")]);
    Arc::new(ClusterTestFactory::new(
        Arc::new(cluster),
        PrimitivesConfig::default(),
    ))
}

fn chromosome_of(names: &[&str], factory: &Arc<dyn TestFactory>) -> TestCaseChromosome {
    let mut test = TestCase::new();
    for name in names {
        test.add_statement(Statement::call(op(name), vec![])).unwrap();
    }
    TestCaseChromosome::new(test, Arc::clone(factory))
}

fn call_names(test: &TestCase) -> Vec<String> {
    test.statements()
        .iter()
        .filter_map(|statement| statement.call_target())
        .map(|target| target.name.clone())
        .collect()
}

fn assert_well_formed(test: &TestCase) {
    for (position, statement) in test.statements().iter().enumerate() {
        for input in statement.inputs() {
            assert!(
                input.position() < position,
                "statement {position} references {input} ahead of it"
            );
        }
    }
}

/// A search configuration where exactly the given mutation sub-operators
/// can fire.
fn operator_probabilities(delete: f64, change: f64, insert: f64) -> SearchConfig {
    let mut search = common::small_config("whole_suite", 0).search;
    search.test_delete_probability = delete;
    search.test_change_probability = change;
    search.test_insert_probability = insert;
    search
}

fn target(cluster: &evotest::testcase::TestCluster, name: &str) -> CallTarget {
    cluster
        .targets()
        .iter()
        .find(|target| target.name == name)
        .unwrap()
        .clone()
}

/// make_stack, a constant, push, pop. The canonical well-formed fixture.
fn stack_test(cluster: &evotest::testcase::TestCluster) -> TestCase {
    let mut test = TestCase::new();
    let stack = test
        .add_statement(Statement::call(target(cluster, "make_stack"), vec![]))
        .unwrap();
    let amount = test
        .add_statement(Statement::constant(ConstantValue::Int(5), common::int_ty()))
        .unwrap();
    test.add_statement(Statement::call(target(cluster, "push"), vec![stack, amount]))
        .unwrap();
    test.add_statement(Statement::call(target(cluster, "pop"), vec![stack]))
        .unwrap();
    test
}

#[test]
fn test_clone_mutates_independently() {
    let factory = ops_factory();
    let search = common::small_config("whole_suite", 0).search;
    let primitives = PrimitivesConfig::default();
    let mut rng = StdRng::seed_from_u64(7);

    let mut original = chromosome_of(&["op0", "op1", "op2", "op3", "op4"], &factory);
    let snapshot = original.clone();

    for _ in 0..20 {
        original.mutate(&search, &primitives, &mut rng);
    }

    assert_eq!(
        call_names(snapshot.test_case()),
        vec!["op0", "op1", "op2", "op3", "op4"]
    );
    assert_eq!(snapshot.num_mutations(), 0);
}

#[test]
fn test_exception_caps_the_mutatable_region() {
    let factory = ops_factory();
    let chromosome = {
        let mut chromosome = chromosome_of(&["op0", "op1", "op2", "op3", "op4"], &factory);
        let mut result = ExecutionResult::new();
        result.report_new_thrown_exception(2, "boom");
        chromosome.set_last_execution_result(Arc::new(result));
        chromosome
    };
    assert_eq!(chromosome.last_mutatable_statement(), Some(2));
    assert!(chromosome.is_failing());
}

#[test]
fn test_deletion_never_touches_statements_after_the_exception() {
    let factory = ops_factory();
    let search = operator_probabilities(1.0, 0.0, 0.0);
    let primitives = PrimitivesConfig::default();

    for seed in 0..100 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut chromosome = chromosome_of(&["op0", "op1", "op2", "op3", "op4"], &factory);
        let mut result = ExecutionResult::new();
        result.report_new_thrown_exception(2, "boom");
        chromosome.set_last_execution_result(Arc::new(result));

        chromosome.mutate(&search, &primitives, &mut rng);

        let names = call_names(chromosome.test_case());
        assert!(names.len() >= 2, "tail statements were deleted");
        assert_eq!(&names[names.len() - 2..], &["op3", "op4"]);
    }
}

#[test]
fn test_change_never_touches_statements_after_the_exception() {
    let factory = ops_factory();
    let search = operator_probabilities(0.0, 1.0, 0.0);
    let primitives = PrimitivesConfig::default();

    for seed in 0..100 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut chromosome = chromosome_of(&["op0", "op1", "op2", "op3", "op4"], &factory);
        let mut result = ExecutionResult::new();
        result.report_new_thrown_exception(2, "boom");
        chromosome.set_last_execution_result(Arc::new(result));

        chromosome.mutate(&search, &primitives, &mut rng);

        let names = call_names(chromosome.test_case());
        assert_eq!(names.len(), 5);
        assert_eq!(&names[3..], &["op3", "op4"]);
    }
}

#[test]
fn test_deletion_removes_one_statement_on_average() {
    let factory = ops_factory();
    let mut search = operator_probabilities(1.0, 0.0, 0.0);
    search.chromosome_length = 40;
    let primitives = PrimitivesConfig::default();
    let mut rng = StdRng::seed_from_u64(97);

    let names: Vec<&str> = (0..10).map(|i| ["op0", "op1", "op2", "op3", "op4"][i % 5]).collect();
    let trials = 300;
    let mut removed = 0i64;
    for _ in 0..trials {
        let mut chromosome = chromosome_of(&names, &factory);
        chromosome.mutate(&search, &primitives, &mut rng);
        removed += 10 - chromosome.size() as i64;
    }

    // Ten positions, each deleted with probability 1/10.
    let average = removed as f64 / trials as f64;
    assert!(
        (0.7..=1.3).contains(&average),
        "average removals per round was {average}"
    );
}

#[test]
fn test_insertion_respects_the_length_cap() {
    let factory = ops_factory();
    let mut search = operator_probabilities(0.0, 0.0, 1.0);
    search.chromosome_length = 5;
    let primitives = PrimitivesConfig::default();
    let mut rng = StdRng::seed_from_u64(11);

    let mut chromosome = chromosome_of(&["op0"], &factory);
    for _ in 0..100 {
        chromosome.mutate(&search, &primitives, &mut rng);
        assert!(chromosome.size() <= 5, "grew to {}", chromosome.size());
    }
    assert_eq!(chromosome.size(), 5);
}

#[test]
fn test_mutation_keeps_a_call_on_the_subject() {
    let cluster = common::stack_cluster();
    let factory: Arc<dyn TestFactory> = Arc::new(ClusterTestFactory::new(
        Arc::clone(&cluster),
        PrimitivesConfig::default(),
    ));
    let search = common::small_config("whole_suite", 0).search;
    let primitives = PrimitivesConfig::default();
    let mut rng = StdRng::seed_from_u64(23);

    let mut chromosome = TestCaseChromosome::new(stack_test(&cluster), Arc::clone(&factory));
    for round in 0..50 {
        chromosome.mutate(&search, &primitives, &mut rng);
        assert!(
            chromosome.test_case().has_call_under_test(),
            "round {round} left the test without a call on the subject"
        );
        assert_well_formed(chromosome.test_case());
    }
}

#[test]
fn test_crossover_combines_prefix_and_rebound_tail() {
    let cluster = common::stack_cluster();
    let factory: Arc<dyn TestFactory> = Arc::new(ClusterTestFactory::new(
        Arc::clone(&cluster),
        PrimitivesConfig::default(),
    ));
    let search = common::small_config("whole_suite", 0).search;

    let mut left = TestCaseChromosome::new(stack_test(&cluster), Arc::clone(&factory));
    left.set_fitness(2.0);
    let right = TestCaseChromosome::new(stack_test(&cluster), Arc::clone(&factory));

    left.cross_over(&right, 1, 1, &search).unwrap();

    assert_eq!(left.size(), 4);
    assert_eq!(call_names(left.test_case()), vec!["make_stack", "push", "pop"]);
    assert_well_formed(left.test_case());
    assert!(left.has_changed());
    assert_eq!(left.fitness(), None);
}

#[test]
fn test_crossover_rejects_oversized_offspring() {
    let cluster = common::stack_cluster();
    let factory: Arc<dyn TestFactory> = Arc::new(ClusterTestFactory::new(
        Arc::clone(&cluster),
        PrimitivesConfig::default(),
    ));
    let mut search = common::small_config("whole_suite", 0).search;
    search.chromosome_length = 4;

    let mut left = TestCaseChromosome::new(stack_test(&cluster), Arc::clone(&factory));
    left.set_fitness(2.0);
    let right = TestCaseChromosome::new(stack_test(&cluster), Arc::clone(&factory));

    // Prefix of two plus a rebound tail of three would overshoot the cap.
    left.cross_over(&right, 2, 1, &search).unwrap();

    assert_eq!(left.size(), 4);
    assert_eq!(
        call_names(left.test_case()),
        vec!["make_stack", "push", "pop"]
    );
    assert!(!left.has_changed());
    assert_eq!(left.fitness(), Some(2.0));
}

#[test]
fn test_crossover_failure_leaves_the_chromosome_untouched() {
    let cluster = common::stack_cluster();
    let factory: Arc<dyn TestFactory> = Arc::new(ClusterTestFactory::new(
        Arc::clone(&cluster),
        PrimitivesConfig::default(),
    ));
    let search = common::small_config("whole_suite", 0).search;

    let mut lone = {
        let mut test = TestCase::new();
        test.add_statement(Statement::constant(ConstantValue::Int(7), common::int_ty()))
            .unwrap();
        TestCaseChromosome::new(test, Arc::clone(&factory))
    };
    lone.set_fitness(1.0);
    let right = TestCaseChromosome::new(stack_test(&cluster), Arc::clone(&factory));

    // The tail needs a Stack value the prefix cannot provide.
    assert!(lone.cross_over(&right, 1, 1, &search).is_err());
    assert_eq!(lone.size(), 1);
    assert_eq!(lone.fitness(), Some(1.0));
}

#[test]
fn test_factory_builds_well_formed_random_tests() {
    let cluster = common::stack_cluster();
    let factory: Arc<dyn TestFactory> = Arc::new(ClusterTestFactory::new(
        Arc::clone(&cluster),
        PrimitivesConfig::default(),
    ));
    let chromosome_factory =
        TestCaseChromosomeFactory::new(factory, common::small_config("whole_suite", 0).search);
    let mut rng = StdRng::seed_from_u64(41);

    for _ in 0..30 {
        let chromosome = chromosome_factory.get_chromosome(&mut rng);
        assert!(chromosome.size() > 0);
        assert!(chromosome.has_changed());
        assert_eq!(chromosome.fitness(), None);
        assert_well_formed(chromosome.test_case());
        assert!(call_names(chromosome.test_case())
            .iter()
            .any(|name| name == "make_stack" || name == "push" || name == "pop" || name == "clear"));
    }
}

#[test]
fn test_stack_executor_reports_pop_on_empty() {
    let cluster = common::stack_cluster();
    let mut test = TestCase::new();
    let stack = test
        .add_statement(Statement::call(target(&cluster, "make_stack"), vec![]))
        .unwrap();
    test.add_statement(Statement::call(target(&cluster, "pop"), vec![stack]))
        .unwrap();

    let mut executor = common::StackExecutor::new();
    let result = executor.execute(&test);

    assert!(result.has_test_exceptions());
    assert_eq!(result.first_position_of_thrown_exception(), Some(1));
    assert_eq!(result.metric("reached::pop"), Some(1.0));
    assert_eq!(result.metric("reached::push"), None);
}

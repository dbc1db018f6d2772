use crate::testcase::statement::CallTarget;
use crate::testcase::variable::TypeDesc;

/// The analysed API surface of the subject: everything the factory may call.
///
/// Targets marked `under_test` are the point of the exercise; the rest are
/// generators that exist to construct input values. The cluster is immutable
/// once built and is shared between the factory and the strategies.
#[derive(Debug, Clone, Default)]
pub struct TestCluster {
    targets: Vec<CallTarget>,
}

impl TestCluster {
    pub fn new(targets: Vec<CallTarget>) -> Self {
        Self { targets }
    }

    pub fn targets(&self) -> &[CallTarget] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets_under_test(&self) -> impl Iterator<Item = &CallTarget> {
        self.targets.iter().filter(|target| target.under_test)
    }

    pub fn num_targets_under_test(&self) -> usize {
        self.targets_under_test().count()
    }

    /// Targets whose call produces a value of the given type.
    pub fn generators_for(&self, ty: &TypeDesc) -> Vec<&CallTarget> {
        self.targets
            .iter()
            .filter(|target| target.return_type.as_ref() == Some(ty))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> TestCluster {
        let counter = TypeDesc::new("Counter");
        TestCluster::new(vec![
            CallTarget::function("make_counter", vec![], Some(counter.clone()), false),
            CallTarget::method(
                counter.clone(),
                "increment",
                vec![counter.clone(), TypeDesc::new("int")],
                Some(TypeDesc::new("int")),
                true,
            ),
            CallTarget::method(counter.clone(), "reset", vec![counter], None, true),
        ])
    }

    #[test]
    fn test_under_test_subset() {
        let cluster = cluster();
        assert_eq!(cluster.num_targets_under_test(), 2);
        assert!(cluster
            .targets_under_test()
            .all(|target| target.under_test));
    }

    #[test]
    fn test_generators_match_return_type() {
        let cluster = cluster();
        let generators = cluster.generators_for(&TypeDesc::new("Counter"));
        assert_eq!(generators.len(), 1);
        assert_eq!(generators[0].name, "make_counter");
        assert!(cluster.generators_for(&TypeDesc::new("str")).is_empty());
    }
}

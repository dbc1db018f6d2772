use rand::rngs::StdRng;
use rand::Rng;

use crate::config::SearchConfig;
use crate::engines::search::chromosome::Chromosome;

/// Crossover operator over two same-kind chromosomes, applied in place.
pub trait CrossoverFunction<C: Chromosome> {
    fn cross_over(&self, parent1: &mut C, parent2: &mut C, config: &SearchConfig, rng: &mut StdRng);
}

/// Single-point relative crossover.
///
/// Draws one split fraction and maps it onto both parents relative to their
/// sizes, so parents of different lengths still exchange comparable
/// portions. The derived split points always leave both sides of each
/// parent non-empty. Parents with fewer than two elements are left alone,
/// and a construction failure during the exchange leaves the affected
/// parent unchanged.
#[derive(Debug, Default)]
pub struct SinglePointRelativeCrossover;

impl<C: Chromosome> CrossoverFunction<C> for SinglePointRelativeCrossover {
    fn cross_over(
        &self,
        parent1: &mut C,
        parent2: &mut C,
        config: &SearchConfig,
        rng: &mut StdRng,
    ) {
        if parent1.size() < 2 || parent2.size() < 2 {
            return;
        }

        let split = rng.gen::<f64>();
        let position1 = ((parent1.size() - 1) as f64 * split).floor() as usize + 1;
        let position2 = ((parent2.size() - 1) as f64 * split).floor() as usize + 1;

        let clone1 = parent1.clone();
        let clone2 = parent2.clone();
        if let Err(err) = parent1.cross_over(&clone2, position1, position2, config) {
            log::debug!("crossover left half failed: {err}");
        }
        if let Err(err) = parent2.cross_over(&clone1, position2, position1, config) {
            log::debug!("crossover right half failed: {err}");
        }
    }
}

use rand::rngs::StdRng;
use rand::Rng;

use crate::engines::search::chromosome::Chromosome;

/// Picks parents out of a population sorted best-first.
///
/// Whether "best" means highest or lowest fitness is the orchestrator's
/// decision; it configures the flag, and the strategies consult it when
/// sorting.
pub trait SelectionFunction<C: Chromosome> {
    fn maximize(&self) -> bool;

    fn set_maximize(&mut self, maximize: bool);

    /// Index of one selected individual in a best-first population.
    fn get_index(&self, population: &[C], rng: &mut StdRng) -> usize;

    fn select<'a>(&self, population: &'a [C], count: usize, rng: &mut StdRng) -> Vec<&'a C> {
        (0..count)
            .map(|_| &population[self.get_index(population, rng)])
            .collect()
    }
}

/// Rank selection with a configurable bias.
///
/// Selection probability depends only on an individual's rank, never on the
/// raw fitness magnitude, so one stray extreme value cannot dominate the
/// draw. The bias must lie in (1, 2]; larger values favour the top ranks
/// more strongly.
pub struct RankSelection {
    bias: f64,
    maximize: bool,
}

impl RankSelection {
    pub fn new(bias: f64) -> Self {
        Self {
            bias,
            maximize: true,
        }
    }
}

impl<C: Chromosome> SelectionFunction<C> for RankSelection {
    fn maximize(&self) -> bool {
        self.maximize
    }

    fn set_maximize(&mut self, maximize: bool) {
        self.maximize = maximize;
    }

    fn get_index(&self, population: &[C], rng: &mut StdRng) -> usize {
        debug_assert!(!population.is_empty(), "selection from empty population");
        let bias = self.bias;
        let u = rng.gen::<f64>();
        let n = population.len() as f64;
        let index =
            n * ((bias - (bias * bias - 4.0 * (bias - 1.0) * u).sqrt()) / (2.0 * (bias - 1.0)));
        (index as usize).min(population.len().saturating_sub(1))
    }
}

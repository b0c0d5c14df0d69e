use crate::memory::*;

/// Enum with possible abort strategies.
/// These strategies decide whether the driver stops before the requested amount of rounds.
///
/// The default, [`AbortStrategy::FixedRounds`], never stops early: exactly as many rounds as
/// requested are run. The other strategies are opt-in early exits based on the round error.
#[derive(Clone, Copy, Debug)]
pub enum AbortStrategy<T: Primitive> {
	/// Run every requested round, regardless of the error development.
	FixedRounds,
	/// Stop directly after the first round whose improvement is not `> threshold`.
	/// ## Fields:
	/// - **threshold**: Minimum error decrease that still counts as an improvement
	NoImprovement { threshold: T },
	/// Stop once **x** consecutive rounds did not improve the error by more than **threshold**.
	/// ## Fields:
	/// - **x**: Amount of consecutive rounds without improvement after which the run stops
	/// - **threshold**: Minimum error decrease that still counts as an improvement
	/// - **abort_on_negative**: Stop immediately when the error grows (**true**), or count it as
	/// a round without improvement (**false**).
	NoImprovementForXIterations { x: usize, threshold: T, abort_on_negative: bool }
}
impl<T: Primitive> Default for AbortStrategy<T> {
	fn default() -> Self { AbortStrategy::FixedRounds }
}
impl<T: Primitive> AbortStrategy<T> {
	pub(crate) fn create_logic(&self) -> Box<dyn AbortStrategyLogic<T>> {
		match *self {
			AbortStrategy::FixedRounds => Box::new(FixedRoundsLogic),
			AbortStrategy::NoImprovement { threshold } => Box::new(NoImprovementLogic {
				threshold,
				prev_error: T::infinity()
			}),
			AbortStrategy::NoImprovementForXIterations { x, threshold, abort_on_negative } => Box::new(NoImprovementForXIterationsLogic {
				x, threshold, abort_on_negative,
				prev_error: T::infinity(),
				no_improvement_counter: 0
			})
		}
	}
}

pub(crate) trait AbortStrategyLogic<T: Primitive> {
	/// Called once per finished round with that round's total squared error.
	/// ## Returns
	/// - **true** if the run should continue
	/// - **false** if the run should stop after this round
	fn next(&mut self, error: T) -> bool;
}


pub(crate) struct FixedRoundsLogic;
impl<T: Primitive> AbortStrategyLogic<T> for FixedRoundsLogic {
	fn next(&mut self, _: T) -> bool { true }
}


pub(crate) struct NoImprovementLogic<T: Primitive> {
	threshold: T,
	prev_error: T
}
impl<T: Primitive> AbortStrategyLogic<T> for NoImprovementLogic<T> {
	fn next(&mut self, error: T) -> bool {
		let improvement = self.prev_error - error;
		self.prev_error = error;
		improvement > self.threshold
	}
}


pub(crate) struct NoImprovementForXIterationsLogic<T: Primitive> {
	x: usize,
	threshold: T,
	abort_on_negative: bool,
	prev_error: T,
	no_improvement_counter: usize
}
impl<T: Primitive> AbortStrategyLogic<T> for NoImprovementForXIterationsLogic<T> {
	fn next(&mut self, error: T) -> bool {
		let improvement = self.prev_error - error;
		self.prev_error = error;
		if self.abort_on_negative && improvement < T::zero() {
			return false;
		}
		if improvement > self.threshold {
			self.no_improvement_counter = 0;
		} else {
			self.no_improvement_counter += 1;
		}
		self.no_improvement_counter < self.x
	}
}

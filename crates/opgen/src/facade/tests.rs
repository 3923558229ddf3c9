use super::*;
use crate::randtask::{RandomTaskGenerator, RandomTaskParams};
use crate::regression::RegressionOperator;
use crate::task::{Fact, OperatorId, PartialAssignment, State, Task};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

fn random_task(seed: u64, conditional_effect_prob: f64) -> Task {
    let params = RandomTaskParams {
        num_variables: 6,
        num_operators: 50,
        conditional_effect_prob,
        ..RandomTaskParams::default()
    };
    RandomTaskGenerator::generate_single(&params, seed).unwrap()
}

fn random_state(task: &Task, rng: &mut StdRng) -> State {
    PartialAssignment::unassigned(task.num_variables())
        .complete(task, false, rng)
        .unwrap()
}

#[test]
fn successor_generator_matches_brute_force() {
    let task = random_task(11, 0.2);
    let gen = SuccessorGenerator::new(&task);
    assert_eq!(gen.task_id(), task.id());
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let state = random_state(&task, &mut rng);
        let mut got = gen.generate_applicable_ops(&state);
        got.sort_unstable();
        let expected: Vec<OperatorId> = task
            .operators()
            .iter()
            .filter(|op| op.is_applicable(&state))
            .map(|op| op.id)
            .collect();
        assert_eq!(got, expected);
        assert_eq!(
            gen.generate_min_applicable_op(state.as_partial(), true),
            expected.first().copied()
        );
    }
}

#[test]
fn into_variant_appends() {
    let task = random_task(3, 0.0);
    let gen = SuccessorGenerator::new(&task);
    let state = task.initial_state();
    let mut buf = vec![OperatorId(usize::MAX)];
    gen.generate_applicable_ops_into(&state, &mut buf);
    assert_eq!(buf[0], OperatorId(usize::MAX));
    assert_eq!(&buf[1..], gen.generate_applicable_ops(&state).as_slice());
}

#[test]
fn predecessor_results_are_applicable_and_achieving() {
    let task = random_task(21, 0.3);
    let gen = PredecessorGenerator::from_task(&task);
    let mut rng = StdRng::seed_from_u64(9);
    for round in 0..50 {
        let state = random_state(&task, &mut rng);
        // Free every third variable, shifted per round.
        let mut p = state.as_partial().clone();
        for var in (round % 3..task.num_variables()).step_by(3) {
            p = p.with_value(var, None);
        }
        let mut got = gen.generate_applicable_ops(&p);
        got.sort_unstable();
        let expected: Vec<OperatorId> = gen
            .regression_task()
            .operators()
            .iter()
            .filter(|rop| rop.is_applicable(&p))
            .map(RegressionOperator::id)
            .collect();
        assert_eq!(got, expected);
    }
}

#[test]
fn goal_query_filters_non_achieving_operators() {
    let task = random_task(4, 0.0);
    let gen = PredecessorGenerator::from_task(&task);
    let goal = task.goal_assignment();
    for id in gen.generate_applicable_ops(&goal) {
        assert!(gen.operator(id).achieves_subgoal(&goal));
    }
    let empty = PartialAssignment::unassigned(task.num_variables());
    assert!(gen.generate_applicable_ops(&empty).is_empty());
}

#[test]
fn cache_reuses_and_rebuilds_per_task() {
    let cache = GeneratorCache::new();
    let task = random_task(8, 0.0);
    let a = cache.successor_generator(&task);
    let b = cache.successor_generator(&task.clone());
    assert!(Arc::ptr_eq(&a, &b));

    let other = task.with_goal(vec![Fact::new(0, 1)]).unwrap();
    let c = cache.successor_generator(&other);
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(c.task_id(), other.id());
    // The replaced generator stays usable for its holder.
    assert_eq!(
        a.generate_applicable_ops(&task.initial_state()),
        c.generate_applicable_ops(&task.initial_state())
    );

    let p1 = cache.predecessor_generator(&other);
    let p2 = cache.predecessor_generator(&other);
    assert!(Arc::ptr_eq(&p1, &p2));
    assert_eq!(p1.task_id(), other.id());
}

#[test]
fn slot_builds_once_per_task() {
    let slot: PerTaskSlot<usize> = PerTaskSlot::new();
    let task = random_task(1, 0.0);
    let mut builds = 0;
    for _ in 0..3 {
        let value = slot.get_or_build(task.id(), || {
            builds += 1;
            42
        });
        assert_eq!(*value, 42);
    }
    assert_eq!(builds, 1);
    assert_eq!(slot.current_task(), Some(task.id()));
    slot.clear();
    assert!(slot.get(task.id()).is_none());
}

#[test]
fn queries_run_concurrently() {
    let task = random_task(13, 0.0);
    let cache = GeneratorCache::new();
    let gen = cache.successor_generator(&task);
    let expected = gen.generate_applicable_ops(&task.initial_state());
    std::thread::scope(|scope| {
        for _ in 0..4 {
            let gen = Arc::clone(&gen);
            let task = &task;
            let expected = &expected;
            scope.spawn(move || {
                for _ in 0..100 {
                    assert_eq!(&gen.generate_applicable_ops(&task.initial_state()), expected);
                }
            });
        }
    });
}

proptest! {
    /// Regressing a forward step finds a predecessor consistent with the
    /// original state, conditional effects included.
    #[test]
    fn regression_undoes_forward_steps(task_seed in 0u64..500, state_seed in 0u64..500) {
        let task = random_task(task_seed, 0.4);
        let successors = SuccessorGenerator::new(&task);
        let predecessors = PredecessorGenerator::from_task(&task);
        let mut rng = StdRng::seed_from_u64(state_seed);
        let state = random_state(&task, &mut rng);
        for id in successors.generate_applicable_ops(&state) {
            let next = state.successor(task.operator(id));
            let p = next.as_partial();
            prop_assert!(predecessors.generate_applicable_ops(p).contains(&id));
            let rop = predecessors.operator(id);
            let pred = rop.predecessor(p);
            for &var in rop.original_effect_vars() {
                prop_assert!(pred.get(var).map_or(true, |v| v == state.get(var)));
            }
            prop_assert!(pred.is_consistent_with(&state));
        }
    }
}

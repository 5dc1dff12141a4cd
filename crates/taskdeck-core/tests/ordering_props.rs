#![allow(missing_docs, clippy::expect_used)]

use proptest::prelude::*;
use taskdeck_core::{Task, TaskId, TaskList, compute_order};

fn build(flags: &[bool]) -> Vec<Task> {
    flags
        .iter()
        .enumerate()
        .map(|(idx, &completed)| {
            let id = TaskId::new(format!("t{idx}")).expect("valid id");
            Task::new(id, format!("task {idx}"), completed, "2025-01-01 00:00:00")
        })
        .collect()
}

fn tasks_with_move() -> impl Strategy<Value = (Vec<Task>, usize, usize)> {
    prop::collection::vec(any::<bool>(), 1..24)
        .prop_flat_map(|flags| {
            let len = flags.len();
            (Just(flags), 0..len, 0..len)
        })
        .prop_map(|(flags, from, to)| (build(&flags), from, to))
}

fn sorted_ids(tasks: &[Task]) -> Vec<String> {
    let mut ids: Vec<String> = tasks.iter().map(|t| t.id.to_string()).collect();
    ids.sort();
    ids
}

fn assert_partitioned(tasks: &[Task], input: &[Task]) -> Result<(), TestCaseError> {
    prop_assert!(tasks.windows(2).all(|pair| pair[0].completed <= pair[1].completed));
    for group in [false, true] {
        let expected: Vec<&TaskId> = input
            .iter()
            .filter(|t| t.completed == group)
            .map(|t| &t.id)
            .collect();
        let actual: Vec<&TaskId> = tasks
            .iter()
            .filter(|t| t.completed == group)
            .map(|t| &t.id)
            .collect();
        prop_assert_eq!(expected, actual);
    }
    Ok(())
}

proptest! {
    #[test]
    fn compute_order_is_a_permutation((tasks, from, to) in tasks_with_move()) {
        let order = compute_order(&tasks, &tasks[from].id, &tasks[to].id);
        prop_assert_eq!(order.len(), tasks.len());
        prop_assert_eq!(sorted_ids(&order), sorted_ids(&tasks));
        prop_assert_eq!(&order[to].id, &tasks[from].id);
    }

    #[test]
    fn server_lists_are_partitioned_stably(flags in prop::collection::vec(any::<bool>(), 0..32)) {
        let input = build(&flags);
        let list = TaskList::from_server(input.clone());
        assert_partitioned(list.as_slice(), &input)?;
    }

    #[test]
    fn reorders_are_partitioned_stably((tasks, from, to) in tasks_with_move()) {
        let list = TaskList::from_server(tasks);
        let order = compute_order(list.as_slice(), &list.as_slice()[from].id, &list.as_slice()[to].id);
        let ids: Vec<TaskId> = order.iter().map(|task| task.id.clone()).collect();
        let reordered = list.reordered(&ids).expect("drag result is a permutation");
        assert_partitioned(reordered.as_slice(), &order)?;
    }
}

//! Property-based tests for the task query functions.
//!
//! Uses proptest to verify:
//! 1. Sorting never reorders or alters the input sequence.
//! 2. Sorting is a permutation that is descending and stable on ties.
//! 3. Filters keep exactly the matching tasks, in input order.
//! 4. The combined view equals sorting the filtered tasks.

use chrono::{DateTime, Duration, Utc};
use eisenhower_core::query::{
    Filter, SortBy, filter_tasks, get_filtered_and_sorted_tasks, sort_tasks,
};
use eisenhower_core::task::{Priority, Task, TaskId};
use proptest::prelude::*;

// --- Strategies ---

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

fn arb_filter() -> impl Strategy<Value = Filter> {
    prop_oneof![Just(Filter::All), Just(Filter::Active), Just(Filter::Completed)]
}

fn arb_sort() -> impl Strategy<Value = SortBy> {
    prop_oneof![Just(SortBy::Priority), Just(SortBy::Created), Just(SortBy::Updated)]
}

/// Tasks with small timestamp offsets so ties are common. Ids are the index,
/// which lets stability be checked through input position.
fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    let row = (arb_priority(), any::<bool>(), 0i64..5, 0i64..5);
    prop::collection::vec(row, 0..40).prop_map(|rows| {
        let base = DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000);
        rows.into_iter()
            .enumerate()
            .map(|(i, (priority, completed, created, extra))| {
                let created_at = base + Duration::seconds(created);
                Task {
                    id: TaskId::from_string(i.to_string()),
                    title: format!("task {i}"),
                    priority,
                    completed,
                    created_at,
                    updated_at: created_at + Duration::seconds(extra),
                }
            })
            .collect()
    })
}

fn position(task: &Task) -> usize {
    task.id.as_str().parse().unwrap_or(usize::MAX)
}

// --- Properties ---

proptest! {
    #[test]
    fn sort_leaves_input_untouched(tasks in arb_tasks(), sort in arb_sort()) {
        let before = tasks.clone();
        let _ = sort_tasks(&tasks, sort);
        prop_assert_eq!(tasks, before);
    }

    #[test]
    fn sort_is_a_permutation(tasks in arb_tasks(), sort in arb_sort()) {
        let sorted = sort_tasks(&tasks, sort);
        prop_assert_eq!(sorted.len(), tasks.len());
        let mut ids: Vec<usize> = sorted.iter().map(|t| position(t)).collect();
        ids.sort_unstable();
        prop_assert_eq!(ids, (0..tasks.len()).collect::<Vec<_>>());
    }

    #[test]
    fn sort_is_descending_and_stable(tasks in arb_tasks(), sort in arb_sort()) {
        let sorted = sort_tasks(&tasks, sort);
        for pair in sorted.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let key = |t: &Task| match sort {
                SortBy::Priority => i64::from(t.priority.level()),
                SortBy::Created => t.created_at.timestamp_millis(),
                SortBy::Updated => t.updated_at.timestamp_millis(),
            };
            prop_assert!(key(a) >= key(b));
            if key(a) == key(b) {
                prop_assert!(position(a) < position(b));
            }
        }
    }

    #[test]
    fn filter_keeps_exactly_matching_tasks(tasks in arb_tasks(), filter in arb_filter()) {
        let kept = filter_tasks(&tasks, filter);
        let expected: Vec<&Task> = tasks
            .iter()
            .filter(|t| match filter {
                Filter::All => true,
                Filter::Active => !t.completed,
                Filter::Completed => t.completed,
            })
            .collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn active_and_completed_partition_all(tasks in arb_tasks()) {
        let active = filter_tasks(&tasks, Filter::Active).len();
        let completed = filter_tasks(&tasks, Filter::Completed).len();
        prop_assert_eq!(active + completed, filter_tasks(&tasks, Filter::All).len());
    }

    #[test]
    fn combined_view_is_sort_of_filter(
        tasks in arb_tasks(),
        filter in arb_filter(),
        sort in arb_sort(),
    ) {
        let combined = get_filtered_and_sorted_tasks(&tasks, filter, sort);
        let composed = sort_tasks(filter_tasks(&tasks, filter), sort);
        prop_assert_eq!(combined, composed);
    }
}

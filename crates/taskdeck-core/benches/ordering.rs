#![allow(missing_docs, clippy::expect_used)]

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use taskdeck_core::{Task, TaskId, TaskList, compute_order};

fn build_tasks(count: usize) -> Vec<Task> {
    (0..count)
        .map(|idx| {
            let id = TaskId::new(format!("task-{idx}")).expect("valid id");
            Task::new(id, format!("bench {idx}"), idx % 3 == 0, "2025-01-01 00:00:00")
        })
        .collect()
}

fn from_server_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("task_list_from_server");
    for &count in &[16usize, 128, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || build_tasks(count),
                |tasks| {
                    black_box(TaskList::from_server(tasks));
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn compute_order_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_order");
    for &count in &[16usize, 128, 1024] {
        let tasks = build_tasks(count);
        let first = tasks[0].id.clone();
        let last = tasks[count - 1].id.clone();
        group.bench_with_input(BenchmarkId::from_parameter(count), &tasks, |b, tasks| {
            b.iter(|| black_box(compute_order(tasks, &first, &last)));
        });
    }
    group.finish();
}

criterion_group!(benches, from_server_benchmark, compute_order_benchmark);
criterion_main!(benches);

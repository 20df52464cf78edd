#![allow(missing_docs)]

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use taskflow_core::{Calendar, ListId, Priority, Task, TaskId, group_by_date, sort_for_list};
use time::{Duration, OffsetDateTime};

fn build_tasks(count: usize, now: OffsetDateTime) -> Vec<Task> {
    let priorities = [Priority::Unset, Priority::Low, Priority::Medium, Priority::High];
    (0..count)
        .map(|idx| {
            let offset = i64::try_from(idx % 21).unwrap_or(0) - 7;
            Task {
                id: TaskId(idx as u64 + 1),
                title: format!("task {idx}"),
                description: String::new(),
                priority: priorities[idx % priorities.len()],
                due_date: (idx % 5 != 0).then(|| now + Duration::days(offset)),
                completed: idx % 7 == 0,
                completed_at: (idx % 7 == 0).then_some(now),
                list_id: ListId((idx % 3) as u64 + 1),
                order: u32::try_from(idx + 1).unwrap_or(u32::MAX),
                created_at: now - Duration::minutes(i64::try_from(idx).unwrap_or(0)),
            }
        })
        .collect()
}

fn grouping_benchmark(c: &mut Criterion) {
    let now = OffsetDateTime::now_utc();
    let calendar = Calendar::at(now);
    let mut group = c.benchmark_group("task_views");

    for &count in &[100usize, 1_000, 10_000] {
        let tasks = build_tasks(count, now);
        group.bench_with_input(BenchmarkId::new("group_by_date", count), &tasks, |b, tasks| {
            b.iter_batched(
                || tasks.clone(),
                |tasks| black_box(group_by_date(tasks, &calendar)),
                BatchSize::SmallInput,
            );
        });
        group.bench_with_input(BenchmarkId::new("sort_for_list", count), &tasks, |b, tasks| {
            b.iter_batched(
                || tasks.clone(),
                |mut tasks| {
                    sort_for_list(&mut tasks);
                    black_box(tasks)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, grouping_benchmark);
criterion_main!(benches);

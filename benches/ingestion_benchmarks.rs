use automation_monitor::{
    AutomationMonitor, EventInput, EventKind, EventStatus, MonitorConfig, PerformanceSample,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn completed(automation_id: &str) -> EventInput {
    EventInput::new(automation_id, EventKind::Completed, EventStatus::Success, "completed")
        .with_duration(250)
}

fn benchmark_record_event(c: &mut Criterion) {
    let monitor = AutomationMonitor::new(MonitorConfig::default());
    c.bench_function("record_event_single_automation", |b| {
        b.iter(|| monitor.record_event(black_box(completed("sync-a"))))
    });
}

fn benchmark_record_event_many_automations(c: &mut Criterion) {
    let monitor = AutomationMonitor::new(MonitorConfig::default());
    let ids: Vec<String> = (0..100).map(|i| format!("automation-{i}")).collect();
    let mut next = 0usize;
    c.bench_function("record_event_100_automations", |b| {
        b.iter(|| {
            next = (next + 1) % ids.len();
            monitor.record_event(black_box(completed(&ids[next])))
        })
    });
}

fn benchmark_record_performance_data(c: &mut Criterion) {
    let monitor = AutomationMonitor::new(MonitorConfig::default());
    c.bench_function("record_performance_data", |b| {
        b.iter(|| {
            monitor.record_performance_data(black_box(
                PerformanceSample::new("sync-a", 250)
                    .with_memory_usage(128.0)
                    .with_cpu_usage(35.0),
            ))
        })
    });
}

fn benchmark_dashboard_data(c: &mut Criterion) {
    let monitor = AutomationMonitor::new(MonitorConfig::default());
    for i in 0..100 {
        let id = format!("automation-{i}");
        for _ in 0..20 {
            monitor.record_event(completed(&id));
        }
        for _ in 0..3 {
            monitor.record_event(EventInput::new(
                id.as_str(),
                EventKind::Failed,
                EventStatus::Failure,
                "failed",
            ));
        }
    }
    c.bench_function("dashboard_data_100_automations", |b| {
        b.iter(|| black_box(monitor.dashboard_data()))
    });
}

criterion_group!(
    benches,
    benchmark_record_event,
    benchmark_record_event_many_automations,
    benchmark_record_performance_data,
    benchmark_dashboard_data
);
criterion_main!(benches);

mod tests {
    use embassy_time::{Duration, Instant};
    use trilight_controller::scheduler::{Iterations, RegisterError, Scheduler, Task};

    fn mark_a(log: &mut Vec<u8>, _now: Instant) {
        log.push(b'a');
    }

    fn mark_b(log: &mut Vec<u8>, _now: Instant) {
        log.push(b'b');
    }

    fn mark_c(log: &mut Vec<u8>, _now: Instant) {
        log.push(b'c');
    }

    fn task(period_ms: u64, budget: Iterations) -> Task<Vec<u8>> {
        Task::new(Duration::from_millis(period_ms), budget, mark_a)
    }

    #[test]
    fn test_poll_runs_only_enabled_tasks() {
        let mut log = Vec::new();
        let mut scheduler = Scheduler::<Vec<u8>, 2>::new();
        let a = scheduler
            .register(Task::new(
                Duration::from_millis(100),
                Iterations::Unbounded,
                mark_a,
            ))
            .unwrap();
        let b = scheduler
            .register(Task::new(
                Duration::from_millis(100),
                Iterations::Unbounded,
                mark_b,
            ))
            .unwrap();

        scheduler.poll(&mut log, Instant::from_millis(0));
        assert_eq!(log, b"");

        scheduler.enable(a);
        scheduler.poll(&mut log, Instant::from_millis(0));
        assert_eq!(log, b"a");

        scheduler.poll(&mut log, Instant::from_millis(100));
        assert_eq!(log, b"aa");

        scheduler.enable(b);
        scheduler.poll(&mut log, Instant::from_millis(200));
        assert_eq!(log, b"aaab");
        assert_eq!(scheduler.is_enabled(a), true);
        assert_eq!(scheduler.is_enabled(b), true);
    }

    #[test]
    fn test_task_runs_once_per_period() {
        let mut log = Vec::new();
        let mut scheduler = Scheduler::<Vec<u8>, 1>::new();
        let id = scheduler.register(task(100, Iterations::Unbounded)).unwrap();
        scheduler.enable(id);

        scheduler.poll(&mut log, Instant::from_millis(0));
        scheduler.poll(&mut log, Instant::from_millis(50));
        scheduler.poll(&mut log, Instant::from_millis(99));
        assert_eq!(log.len(), 1);

        scheduler.poll(&mut log, Instant::from_millis(100));
        assert_eq!(log.len(), 2);

        // a late run re-anchors the next due time, no catch-up
        scheduler.poll(&mut log, Instant::from_millis(305));
        assert_eq!(log.len(), 3);
        scheduler.poll(&mut log, Instant::from_millis(400));
        assert_eq!(log.len(), 3);
        scheduler.poll(&mut log, Instant::from_millis(405));
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_registration_order_is_execution_order() {
        let mut log = Vec::new();
        let mut scheduler = Scheduler::<Vec<u8>, 3>::new();
        let a = scheduler
            .register(Task::new(
                Duration::from_millis(10),
                Iterations::Unbounded,
                mark_a,
            ))
            .unwrap();
        let b = scheduler
            .register(Task::new(
                Duration::from_millis(10),
                Iterations::Unbounded,
                mark_b,
            ))
            .unwrap();
        let c = scheduler
            .register(Task::new(
                Duration::from_millis(10),
                Iterations::Unbounded,
                mark_c,
            ))
            .unwrap();
        scheduler.enable(c);
        scheduler.enable(a);
        scheduler.enable(b);

        scheduler.poll(&mut log, Instant::from_millis(0));
        assert_eq!(log, b"abc");
    }

    #[test]
    fn test_from_tasks_ids_follow_array_order() {
        let mut log = Vec::new();
        let (mut scheduler, [a, b]) = Scheduler::from_tasks([
            Task::new(Duration::from_millis(10), Iterations::Unbounded, mark_a),
            Task::new(Duration::from_millis(10), Iterations::Unbounded, mark_b),
        ]);
        scheduler.enable(b);
        scheduler.poll(&mut log, Instant::from_millis(0));
        assert_eq!(log, b"b");

        scheduler.enable(a);
        scheduler.poll(&mut log, Instant::from_millis(10));
        assert_eq!(log, b"bab");
    }

    #[test]
    fn test_finite_budget_disables_after_last_run() {
        let mut log = Vec::new();
        let mut scheduler = Scheduler::<Vec<u8>, 1>::new();
        let id = scheduler.register(task(100, Iterations::Finite(3))).unwrap();
        scheduler.enable(id);

        scheduler.poll(&mut log, Instant::from_millis(0));
        scheduler.poll(&mut log, Instant::from_millis(100));
        assert_eq!(scheduler.is_enabled(id), true);

        // the exhausting invocation still runs
        scheduler.poll(&mut log, Instant::from_millis(200));
        assert_eq!(log.len(), 3);
        assert_eq!(scheduler.is_enabled(id), false);

        scheduler.poll(&mut log, Instant::from_millis(300));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_enable_after_exhaustion_corrects_gate_without_running() {
        let mut log = Vec::new();
        let mut scheduler = Scheduler::<Vec<u8>, 1>::new();
        let id = scheduler.register(task(100, Iterations::Finite(1))).unwrap();
        scheduler.enable(id);
        scheduler.poll(&mut log, Instant::from_millis(0));
        assert_eq!(log.len(), 1);
        assert_eq!(scheduler.is_enabled(id), false);

        scheduler.enable(id);
        assert_eq!(scheduler.is_enabled(id), true);
        scheduler.poll(&mut log, Instant::from_millis(100));
        assert_eq!(log.len(), 1);
        assert_eq!(scheduler.is_enabled(id), false);
    }

    #[test]
    fn test_restart_restores_budget_and_defers_first_run() {
        let mut log = Vec::new();
        let mut scheduler = Scheduler::<Vec<u8>, 1>::new();
        let id = scheduler.register(task(100, Iterations::Finite(2))).unwrap();
        scheduler.enable(id);
        scheduler.poll(&mut log, Instant::from_millis(0));
        scheduler.poll(&mut log, Instant::from_millis(100));
        assert_eq!(log.len(), 2);
        assert_eq!(scheduler.is_enabled(id), false);

        scheduler.restart(id, Instant::from_millis(400));
        assert_eq!(scheduler.is_enabled(id), true);

        // first run lands one full period after the restart instant
        scheduler.poll(&mut log, Instant::from_millis(400));
        scheduler.poll(&mut log, Instant::from_millis(499));
        assert_eq!(log.len(), 2);
        scheduler.poll(&mut log, Instant::from_millis(500));
        assert_eq!(log.len(), 3);
        scheduler.poll(&mut log, Instant::from_millis(600));
        assert_eq!(log.len(), 4);
        assert_eq!(scheduler.is_enabled(id), false);
    }

    #[test]
    fn test_enable_keeps_original_phase() {
        let mut log = Vec::new();
        let mut scheduler = Scheduler::<Vec<u8>, 1>::new();
        let id = scheduler.register(task(100, Iterations::Unbounded)).unwrap();
        scheduler.enable(id);
        scheduler.poll(&mut log, Instant::from_millis(0));
        assert_eq!(log.len(), 1);

        scheduler.disable(id);
        scheduler.poll(&mut log, Instant::from_millis(100));
        scheduler.poll(&mut log, Instant::from_millis(200));
        assert_eq!(log.len(), 1);

        // last_run is still 0, so the task is overdue the moment the gate opens
        scheduler.enable(id);
        scheduler.poll(&mut log, Instant::from_millis(250));
        assert_eq!(log.len(), 2);
        scheduler.poll(&mut log, Instant::from_millis(300));
        assert_eq!(log.len(), 2);
        scheduler.poll(&mut log, Instant::from_millis(350));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_disabled_periods_do_not_charge_budget() {
        let mut log = Vec::new();
        let mut scheduler = Scheduler::<Vec<u8>, 1>::new();
        let id = scheduler.register(task(100, Iterations::Finite(2))).unwrap();
        scheduler.enable(id);
        scheduler.poll(&mut log, Instant::from_millis(0));
        assert_eq!(log.len(), 1);

        scheduler.disable(id);
        scheduler.poll(&mut log, Instant::from_millis(100));
        scheduler.poll(&mut log, Instant::from_millis(200));
        assert_eq!(log.len(), 1);

        scheduler.enable(id);
        scheduler.poll(&mut log, Instant::from_millis(300));
        assert_eq!(log.len(), 2);
        assert_eq!(scheduler.is_enabled(id), false);
    }

    #[test]
    fn test_register_fails_once_full() {
        let mut scheduler = Scheduler::<Vec<u8>, 1>::new();
        assert!(scheduler.register(task(100, Iterations::Unbounded)).is_ok());
        assert_eq!(
            scheduler.register(task(100, Iterations::Unbounded)).unwrap_err(),
            RegisterError
        );
    }
}

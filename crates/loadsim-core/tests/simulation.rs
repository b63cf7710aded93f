//! End-to-end engine scenarios through the public API only.

use loadsim_core::{
    AssignOutcome, BalancerError, LoadBalancer, ProcessorConfig, ProcessorState,
};

fn assign_expect(lb: &mut LoadBalancer, workload: f64, expect: usize) {
    let task = lb.create_task(workload, 0).unwrap();
    match lb.assign_task(task) {
        AssignOutcome::Assigned(idx) => assert_eq!(idx, expect),
        AssignOutcome::Rejected(task) => panic!("task {} unexpectedly rejected", task.id),
    }
}

#[test]
fn two_processor_assignment_trace() {
    let mut lb = LoadBalancer::new(2, ProcessorConfig::default()).unwrap();

    // Tie on idle processors goes to index 0, then least-loaded wins.
    assign_expect(&mut lb, 0.5, 0);
    assign_expect(&mut lb, 0.4, 1);
    assign_expect(&mut lb, 0.3, 1);

    assert_eq!(lb.processor_loads(), vec![0.5, 0.7]);
    assert_eq!(lb.total_tasks(), 3);
}

#[test]
fn invalid_construction_and_workloads_fail_fast() {
    assert!(matches!(
        LoadBalancer::new(0, ProcessorConfig::default()),
        Err(BalancerError::InvalidConfiguration(_))
    ));

    let bad = ProcessorConfig {
        processing_speed: 0.0,
        ..Default::default()
    };
    assert!(LoadBalancer::new(2, bad).is_err());

    let mut lb = LoadBalancer::new(2, ProcessorConfig::default()).unwrap();
    assert!(matches!(
        lb.create_task(-1.0, 0),
        Err(BalancerError::InvalidWorkload(_))
    ));
}

#[test]
fn saturated_pool_rejects_without_side_effects() {
    let config = ProcessorConfig {
        queue_size_limit: 1,
        ..Default::default()
    };
    let mut lb = LoadBalancer::new(1, config).unwrap();
    assign_expect(&mut lb, 0.5, 0);

    let task = lb.create_task(0.5, 0).unwrap();
    let AssignOutcome::Rejected(returned) = lb.assign_task(task) else {
        panic!("expected rejection from a saturated pool");
    };
    assert_eq!(returned.assigned_processor, None);
    assert_eq!(lb.processor_loads(), vec![0.5]);

    // The pool opens up again once a tick drains the queue.
    lb.advance_tick();
    assign_expect(&mut lb, 0.5, 0);
}

#[test]
fn long_run_keeps_histories_bounded_and_counters_consistent() {
    let mut lb = LoadBalancer::new(3, ProcessorConfig::default()).unwrap();

    // Deterministic arrival pattern: one task every other tick.
    for tick in 0..150u64 {
        if tick % 2 == 0 {
            let task = lb.create_task(0.2, 0).unwrap();
            assert!(matches!(lb.assign_task(task), AssignOutcome::Assigned(_)));
        }
        if tick % 10 == 0 {
            lb.rebalance();
        }
        lb.advance_tick();
    }

    for p in lb.processors() {
        assert_eq!(p.load_history.len(), 100);
        assert_eq!(p.queue_length_history.len(), 100);
        assert!(p.queue.len() <= p.config.queue_size_limit);
    }

    let queued: u64 = lb.processors().iter().map(|p| p.queue.len() as u64).sum();
    let stats = lb.statistics();
    assert_eq!(stats.total_tasks, 75);
    assert_eq!(stats.completed_tasks + queued, stats.total_tasks);
    assert!(stats.elapsed_secs >= 0.0);
}

#[test]
fn completed_tasks_come_back_stamped_in_fifo_order() {
    let mut lb = LoadBalancer::new(1, ProcessorConfig::default()).unwrap();

    let first = lb.create_task(0.1, 0).unwrap();
    let second = lb.create_task(0.1, 9).unwrap();
    let (first_id, second_id) = (first.id, second.id);
    lb.assign_task(first);
    lb.assign_task(second);

    let finished = lb.advance_tick();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].id, first_id);
    assert!(finished[0].is_completed());

    let finished = lb.advance_tick();
    assert_eq!(finished[0].id, second_id);

    // Both completions recorded, load untouched by completion, so the
    // processor still classifies as busy even with an empty queue.
    assert_eq!(lb.completed_tasks(), 2);
    assert_eq!(lb.processor_loads(), vec![0.2]);
    assert_eq!(lb.processors()[0].state, ProcessorState::Busy);
}

use super::*;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn sequence_fires_in_order_on_the_interval() {
    let mut schedule = StepSchedule::new();
    let started = Instant::now();
    schedule.schedule_sequence(Duration::from_millis(800), ["floor-1", "floor-2", "floor-3"]);
    assert_eq!(schedule.pending(), 3);

    let mut fired = Vec::new();
    while let Some(step) = schedule.next_step().await {
        fired.push((step, started.elapsed().as_millis()));
    }

    let steps: Vec<&str> = fired.iter().map(|(step, _)| *step).collect();
    assert_eq!(steps, vec!["floor-1", "floor-2", "floor-3"]);
    for ((_, elapsed), expected) in fired.iter().zip([800u128, 1600, 2400]) {
        assert!(
            (expected..expected + 5).contains(elapsed),
            "fired at {elapsed}ms, expected about {expected}ms"
        );
    }
    assert_eq!(schedule.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_all_stops_remaining_steps() {
    let mut schedule = StepSchedule::new();
    schedule.schedule_sequence(Duration::from_millis(500), [1, 2, 3]);

    assert_eq!(schedule.next_step().await, Some(1));
    schedule.cancel_all();

    assert_eq!(schedule.pending(), 0);
    assert_eq!(schedule.next_step().await, None);
}

#[tokio::test(start_paused = true)]
async fn fired_but_unconsumed_step_is_discarded_after_cancel() {
    let mut schedule = StepSchedule::new();
    schedule.schedule(Duration::from_millis(10), "stale");
    tokio::time::sleep(Duration::from_millis(20)).await;

    schedule.cancel_all();
    assert_eq!(schedule.try_next_step(), None);

    schedule.schedule(Duration::from_millis(10), "fresh");
    assert_eq!(schedule.next_step().await, Some("fresh"));
}

#[tokio::test]
async fn empty_schedule_yields_none() {
    let mut schedule: StepSchedule<()> = StepSchedule::default();
    assert_eq!(schedule.next_step().await, None);
    assert_eq!(schedule.try_next_step(), None);
}

//! Playback driven by the tokio clock, as the visualizer runs it.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use algoviz_playback::{
    run_until_idle, Clock, PlaybackConfig, PlaybackController, PlaybackRegistry, PlaybackStatus,
    SchedulerKind, TokioClock,
};
use tokio::task::LocalSet;

fn config(kind: SchedulerKind, speed_ms: u64) -> PlaybackConfig {
    PlaybackConfig::default()
        .with_scheduler(kind)
        .with_speed_ms(speed_ms)
        .with_frame_interval(Duration::from_millis(16))
}

#[tokio::test(start_paused = true)]
async fn both_strategies_deliver_every_step_in_order() {
    for kind in [SchedulerKind::Timer, SchedulerKind::Frame] {
        let config = config(kind, 100);
        let clock = Rc::new(TokioClock::new());
        let scheduler = config.build_scheduler(clock.clone());
        let registry = Rc::new(PlaybackRegistry::new());
        let controller =
            PlaybackController::new((0..6).collect::<Vec<u32>>(), scheduler.clone(), registry, &config)
                .unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        controller.on_step(move |_, step| {
            log.borrow_mut().push(*step);
            Ok(())
        });

        controller.start().unwrap();
        run_until_idle(scheduler.as_ref()).await;

        assert_eq!(*seen.borrow(), vec![1, 2, 3, 4, 5], "{} scheduler", kind);
        assert_eq!(controller.status(), PlaybackStatus::Complete);
        // Five advances of at least 100 ms each
        assert!(clock.now() >= Duration::from_millis(500));
    }
}

#[tokio::test(start_paused = true)]
async fn pause_all_stops_concurrent_playbacks() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let config = config(SchedulerKind::Timer, 50);
            let scheduler = config.build_scheduler(Rc::new(TokioClock::new()));
            let registry = Rc::new(PlaybackRegistry::new());

            let a = PlaybackController::new(vec![0u8; 20], scheduler.clone(), registry.clone(), &config)
                .unwrap();
            let b = PlaybackController::new(vec![0u8; 20], scheduler.clone(), registry.clone(), &config)
                .unwrap();
            a.start().unwrap();
            b.start().unwrap();

            let driver = {
                let scheduler = scheduler.clone();
                tokio::task::spawn_local(async move { run_until_idle(scheduler.as_ref()).await })
            };

            tokio::time::sleep(Duration::from_millis(175)).await;
            assert_eq!(registry.pause_all(), 2);

            // With nothing pending the driver finishes on its own
            driver.await.unwrap();
            assert_eq!(a.status(), PlaybackStatus::Paused);
            assert_eq!(b.status(), PlaybackStatus::Paused);
            assert_eq!(a.cursor(), 3);
            assert_eq!(b.cursor(), 3);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn watch_subscribers_follow_playback() {
    let config = config(SchedulerKind::Timer, 20);
    let scheduler = config.build_scheduler(Rc::new(TokioClock::new()));
    let controller = PlaybackController::new(
        vec!['a', 'b', 'c'],
        scheduler.clone(),
        Rc::new(PlaybackRegistry::new()),
        &config,
    )
    .unwrap();
    let mut rx = controller.subscribe();

    controller.start().unwrap();
    run_until_idle(scheduler.as_ref()).await;

    rx.changed().await.unwrap();
    let snapshot = *rx.borrow();
    assert_eq!(snapshot.status, PlaybackStatus::Complete);
    assert_eq!(snapshot.cursor, 2);
    assert_eq!(controller.current_step(), 'c');
}

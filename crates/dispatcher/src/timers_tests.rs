use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use super::*;

fn manager_with(name: &str, millis: u64) -> (TimerManager, mpsc::Receiver<String>) {
    let (tx, rx) = mpsc::channel(8);
    let mut durations = HashMap::new();
    durations.insert(name.to_owned(), Duration::from_millis(millis));
    (TimerManager::new(durations, tx), rx)
}

#[tokio::test]
async fn unknown_timer_name_is_rejected() {
    let (manager, _rx) = manager_with("immediate_state", 10);
    assert!(!manager.start("no_such_timer"));
}

#[tokio::test]
async fn fired_timer_sends_timeout_trigger() {
    let (manager, mut rx) = manager_with("immediate_state", 10);
    assert!(manager.start("immediate_state"));

    let trigger = timeout(Duration::from_secs(1), rx.recv()).await.expect("did not hang").expect("channel open");
    assert_eq!(trigger, "immediate_state_timeout");
}

#[tokio::test]
async fn stopping_a_timer_prevents_it_from_firing() {
    let (manager, mut rx) = manager_with("immediate_release", 50);
    assert!(manager.start("immediate_release"));
    manager.stop("immediate_release");

    let result = timeout(Duration::from_millis(150), rx.recv()).await;
    assert!(result.is_err(), "timer fired after being stopped");
}

#[tokio::test]
async fn restarting_a_timer_cancels_the_previous_instance() {
    let (manager, mut rx) = manager_with("immediate_state", 30);
    assert!(manager.start("immediate_state"));
    assert!(manager.start("immediate_state"));

    let first = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
    assert_eq!(first, "immediate_state_timeout");
    // Only the second instance should ever fire.
    let second = timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(second.is_err());
}

#[test]
fn seconds_until_next_hour_is_within_bounds() {
    let seconds = seconds_until_next_hour();
    assert!(seconds >= 0.0 && seconds <= 3600.0);
}

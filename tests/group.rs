use embassy_button_events::{
    group::{ButtonGroup, ButtonTimer, EventGroup, TimerCommand},
    trigger::{bit_mask, Trigger},
};
use embassy_time::{Duration, Instant};

#[test]
fn test_event_bits_are_merged_until_taken() {
    let events = EventGroup::new();
    assert_eq!(events.peek(), 0);

    events.set(bit_mask(Trigger::PressEdge, 0));
    events.set(bit_mask(Trigger::PressEdge, 0));
    events.set(bit_mask(Trigger::DebounceExpired, 3));
    assert_eq!(events.peek(), 0b001 | 0b010 << 9);

    assert_eq!(events.take(), 0b001 | 0b010 << 9);
    assert_eq!(events.take(), 0);
}

#[test]
fn test_bits_above_event_word_are_ignored() {
    let events = EventGroup::new();
    events.set(0xFF00_0000);
    assert_eq!(events.peek(), 0);

    events.set(0xFF00_0004);
    assert_eq!(events.take(), 0b100);
}

#[tokio::test]
async fn test_wait_returns_bits_already_set() {
    let events = EventGroup::new();
    events.set(bit_mask(Trigger::RepeatExpired, 7));
    events.set(bit_mask(Trigger::PressEdge, 1));

    let bits = events.wait().await;
    assert_eq!(bits, 0b100 << 21 | 0b001 << 3);
    assert_eq!(events.peek(), 0);
}

#[tokio::test]
async fn test_wait_wakes_on_set() {
    let events = EventGroup::new();

    let (bits, ()) = tokio::join!(events.wait(), async {
        embassy_time::Timer::after(Duration::from_millis(5)).await;
        events.set(bit_mask(Trigger::DebounceExpired, 2));
    });
    assert_eq!(bits, 0b010 << 6);
}

#[test]
fn test_timer_keeps_latest_command() {
    let timer = ButtonTimer::new();
    assert_eq!(timer.try_take_command(), None);

    let before = Instant::now();
    timer.start_once(Duration::from_millis(50)).unwrap();
    timer.start_once(Duration::from_millis(500)).unwrap();
    match timer.try_take_command() {
        Some(TimerCommand::Start(deadline)) => {
            assert!(deadline >= before + Duration::from_millis(500));
        }
        other => panic!("unexpected command {:?}", other),
    }
    assert_eq!(timer.try_take_command(), None);

    // 启动后立即停止
    timer.start_once(Duration::from_millis(50)).unwrap();
    timer.stop();
    assert_eq!(timer.try_take_command(), Some(TimerCommand::Stop));
    assert_eq!(TimerCommand::Stop.deadline(), None);
}

#[tokio::test]
async fn test_timer_next_command() {
    let timer = ButtonTimer::new();
    let (command, ()) = tokio::join!(timer.next_command(), async { timer.stop() });
    assert_eq!(command, TimerCommand::Stop);
}

#[test]
fn test_slots_are_indexed_within_group() {
    let group = ButtonGroup::new();
    assert!(group.slot(3).level());

    group.slot(3).store_level(false);
    assert!(!group.slot(3).level());
    // 全局编号 11 落在组内第 3 个槽位
    assert!(!group.slot(11).level());
    assert!(group.slot(4).level());
}

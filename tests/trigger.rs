use embassy_button_events::trigger::{
    bit_mask, decode, group_index, Event, Trigger, BUTTONS_PER_GROUP, EVENT_BITS_MASK,
};

const TRIGGERS: [Trigger; 3] = [
    Trigger::PressEdge,
    Trigger::DebounceExpired,
    Trigger::RepeatExpired,
];

fn event(trigger: Trigger, group_index: usize, button: usize) -> Event {
    Event {
        trigger,
        group_index,
        button,
    }
}

#[test]
fn test_default_event() {
    let event = Event::default();
    assert_eq!(event.trigger, Trigger::NoEvent);
    assert_eq!(event.group_index, 0);
    assert_eq!(event.button, 0);
}

#[test]
fn test_bit_mask() {
    // 无事件
    assert_eq!(bit_mask(Trigger::NoEvent, 0), 0);
    assert_eq!(bit_mask(Trigger::NoEvent, 5), 0);

    // 按下
    assert_eq!(bit_mask(Trigger::PressEdge, 1), 0b001 << 3);
    assert_eq!(bit_mask(Trigger::PressEdge, 2), 0b001 << 6);
    assert_eq!(bit_mask(Trigger::PressEdge, 8), 0b001);
    assert_eq!(bit_mask(Trigger::PressEdge, 15), 0b001 << 21);

    // 消抖到期
    assert_eq!(bit_mask(Trigger::DebounceExpired, 0), 0b010);
    assert_eq!(bit_mask(Trigger::DebounceExpired, 4), 0b010 << 12);
    assert_eq!(bit_mask(Trigger::DebounceExpired, 6), 0b010 << 18);

    // 连发到期
    assert_eq!(bit_mask(Trigger::RepeatExpired, 0), 0b100);
    assert_eq!(bit_mask(Trigger::RepeatExpired, 2), 0b100 << 6);
}

#[test]
fn test_group_index() {
    assert_eq!(BUTTONS_PER_GROUP, 8);
    assert_eq!(group_index(0), 0);
    assert_eq!(group_index(1), 0);
    assert_eq!(group_index(7), 0);
    assert_eq!(group_index(8), 1);
    assert_eq!(group_index(15), 1);
    assert_eq!(group_index(16), 2);
}

#[test]
fn test_decode_single_button() {
    let events: Vec<_> = decode(0b010, 0).collect();
    assert_eq!(events, [event(Trigger::DebounceExpired, 0, 0)]);

    let events: Vec<_> = decode(0b101, 0).collect();
    assert_eq!(
        events,
        [
            event(Trigger::PressEdge, 0, 0),
            event(Trigger::RepeatExpired, 0, 0),
        ]
    );
}

#[test]
fn test_decode_multiple_buttons() {
    let events: Vec<_> = decode(0b1100, 0).collect();
    assert_eq!(
        events,
        [
            event(Trigger::RepeatExpired, 0, 0),
            event(Trigger::PressEdge, 0, 1),
        ]
    );

    let events: Vec<_> = decode(0b11101, 0).collect();
    assert_eq!(
        events,
        [
            event(Trigger::PressEdge, 0, 0),
            event(Trigger::RepeatExpired, 0, 0),
            event(Trigger::DebounceExpired, 0, 1),
            event(Trigger::PressEdge, 0, 1),
        ]
    );
}

#[test]
fn test_decode_second_group() {
    let events: Vec<_> = decode(0b010, 1).collect();
    assert_eq!(events, [event(Trigger::DebounceExpired, 1, 8)]);
}

#[test]
fn test_decode_one_event_per_button_in_order() {
    let mut button = 0;
    for event in decode(0b1001001001, 0) {
        assert_eq!(event.trigger, Trigger::PressEdge);
        assert_eq!(event.group_index, 0);
        assert_eq!(event.button, button);
        button += 1;
    }
    // 应该产生四个事件
    assert_eq!(button, 4);
}

#[test]
fn test_decode_ignores_high_bits() {
    assert_eq!(decode(0xFF00_0000, 0).count(), 0);
    assert_eq!(EVENT_BITS_MASK, 0x00FF_FFFF);

    let events: Vec<_> = decode(0xFF00_0000 | 0b100 << 21, 2).collect();
    assert_eq!(events, [event(Trigger::RepeatExpired, 2, 23)]);
}

#[test]
fn test_decode_empty() {
    for group in 0..6 {
        assert_eq!(decode(0, group).next(), None);
    }
}

#[test]
fn test_decoder_is_restartable() {
    let decoder = decode(0b010_000_001, 0);
    assert_eq!(decoder.len(), 2);

    let first: Vec<_> = decoder.clone().collect();
    let second: Vec<_> = decoder.collect();
    assert_eq!(first, second);
    assert_eq!(
        first,
        [
            event(Trigger::PressEdge, 0, 0),
            event(Trigger::DebounceExpired, 0, 2),
        ]
    );
}

#[test]
fn test_mask_decodes_back_to_same_event() {
    for button in 0..48 {
        for trigger in TRIGGERS {
            let group = group_index(button);
            let events: Vec<_> = decode(bit_mask(trigger, button), group).collect();
            assert_eq!(events, [event(trigger, group, button)]);
        }
    }
}

#[test]
fn test_coalesced_buttons_decode_in_ascending_order() {
    // 同一事件字里多个按钮在消费者醒来前先后置位
    let bits = bit_mask(Trigger::DebounceExpired, 7)
        | bit_mask(Trigger::PressEdge, 3)
        | bit_mask(Trigger::RepeatExpired, 0)
        | bit_mask(Trigger::PressEdge, 5);
    let buttons: Vec<_> = decode(bits, 0).map(|event| event.button).collect();
    assert_eq!(buttons, [0, 3, 5, 7]);
}

#[test]
fn test_debounce_expiry_is_decoded_before_edge_of_same_button() {
    // 采样之后紧接着出现的跳变和消抖到期落在同一个事件字里
    let bits = bit_mask(Trigger::PressEdge, 4)
        | bit_mask(Trigger::DebounceExpired, 4)
        | bit_mask(Trigger::RepeatExpired, 4);
    let triggers: Vec<_> = decode(bits, 0).map(|event| event.trigger).collect();
    assert_eq!(
        triggers,
        [
            Trigger::DebounceExpired,
            Trigger::PressEdge,
            Trigger::RepeatExpired,
        ]
    );
    assert_eq!(decode(bits, 0).len(), 3);
}

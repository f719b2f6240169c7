use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    pubsub::{PubSubChannel, Publisher, Subscriber},
};
use embassy_time::Instant;

use crate::button::{ButtonRecord, EventKind, TimerAction};
use crate::error::Error;
use crate::group::ButtonGroup;
use crate::trigger::{decode, group_index, BUTTONS_PER_GROUP};

/// 发送给订阅者的按钮事件。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    /// 按钮的槽位号。
    pub button: usize,
    /// 注册按钮时给定的名字。
    pub name: &'static str,
    /// 事件产生的时间。
    pub timestamp: Instant,
    pub kind: EventKind,
}

pub type EventChannel<const CAP: usize, const SUBS: usize, const PUBS: usize> =
    PubSubChannel<CriticalSectionRawMutex, ButtonEvent, CAP, SUBS, PUBS>;
pub type EventPublisher<'a, const CAP: usize, const SUBS: usize, const PUBS: usize> =
    Publisher<'a, CriticalSectionRawMutex, ButtonEvent, CAP, SUBS, PUBS>;
pub type EventSubscriber<'a, const CAP: usize, const SUBS: usize, const PUBS: usize> =
    Subscriber<'a, CriticalSectionRawMutex, ButtonEvent, CAP, SUBS, PUBS>;

/// 单个事件组的分发循环。
///
/// 组内所有按钮状态只由它修改，因此状态本身不需要加锁。
/// 由 [`ButtonManager::dispatcher`](crate::manager::ButtonManager::dispatcher) 创建。
pub struct Dispatcher<'a, const CAP: usize, const SUBS: usize, const PUBS: usize> {
    group: &'a ButtonGroup,
    group_index: usize,
    buttons: [Option<ButtonRecord>; BUTTONS_PER_GROUP],
    publisher: EventPublisher<'a, CAP, SUBS, PUBS>,
}

impl<'a, const CAP: usize, const SUBS: usize, const PUBS: usize> Dispatcher<'a, CAP, SUBS, PUBS> {
    pub(crate) fn new(
        group: &'a ButtonGroup,
        group_index: usize,
        buttons: [Option<ButtonRecord>; BUTTONS_PER_GROUP],
        publisher: EventPublisher<'a, CAP, SUBS, PUBS>,
    ) -> Self {
        Self {
            group,
            group_index,
            buttons,
            publisher,
        }
    }

    pub fn group_index(&self) -> usize {
        self.group_index
    }

    /// 按全局槽位号查看按钮记录。按钮不属于本组或未注册时返回 `None`。
    pub fn button(&self, button_index: usize) -> Option<&ButtonRecord> {
        if group_index(button_index) != self.group_index {
            return None;
        }
        self.buttons[button_index % BUTTONS_PER_GROUP].as_ref()
    }

    /// 运行分发循环。
    ///
    /// 正常情况下永不返回；只有遇到致命错误（时钟倒退、定时器无法启动）
    /// 时才停止并返回该错误。
    pub async fn run(mut self) -> Error {
        info!("button dispatcher for group {} started", self.group_index);
        loop {
            let bits = self.group.events().wait().await;
            if let Err(error) = self.process(bits).await {
                error!(
                    "button dispatcher for group {} stopped: {}",
                    self.group_index, error
                );
                return error;
            }
        }
    }

    /// 处理一次唤醒取到的事件字。
    pub async fn process(&mut self, bits: u32) -> Result<(), Error> {
        trace!("group {}: event bits {:#x}", self.group_index, bits);

        for event in decode(bits, self.group_index) {
            let slot = self.group.slot(event.button);
            let Some(record) = self.buttons[event.button % BUTTONS_PER_GROUP].as_mut() else {
                warn!(
                    "group {}: {:?} for unbound button {}",
                    self.group_index, event.trigger, event.button
                );
                continue;
            };

            let now = Instant::now();
            let reaction = record.handle(event.trigger, slot.level(), now)?;
            match reaction.timer {
                TimerAction::None => {}
                TimerAction::StartDebounce(delay) => slot.debounce.start_once(delay)?,
                TimerAction::StartHold(delay) => slot.hold.start_once(delay)?,
                TimerAction::StopHold => slot.hold.stop(),
            }

            let name = record.name();
            for kind in reaction.events {
                debug!("button {} ({}): {:?}", event.button, name, kind);
                self.publisher
                    .publish(ButtonEvent {
                        button: event.button,
                        name,
                        timestamp: now,
                        kind,
                    })
                    .await;
            }
        }
        Ok(())
    }
}

/// 一组事件类型。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKinds(u8);

impl EventKinds {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b1_1111);

    pub const fn of(kind: EventKind) -> Self {
        Self(kind_bit(kind))
    }

    pub const fn with(self, kind: EventKind) -> Self {
        Self(self.0 | kind_bit(kind))
    }

    pub const fn contains(self, kind: EventKind) -> bool {
        self.0 & kind_bit(kind) != 0
    }
}

impl Default for EventKinds {
    fn default() -> Self {
        Self::ALL
    }
}

const fn kind_bit(kind: EventKind) -> u8 {
    1 << kind as u8
}

/// 带过滤条件的事件订阅者。
///
/// 默认接收所有按钮的所有事件。
pub struct Listener<'a, const CAP: usize, const SUBS: usize, const PUBS: usize> {
    subscriber: EventSubscriber<'a, CAP, SUBS, PUBS>,
    button: Option<usize>,
    kinds: EventKinds,
}

impl<'a, const CAP: usize, const SUBS: usize, const PUBS: usize> Listener<'a, CAP, SUBS, PUBS> {
    pub fn new(subscriber: EventSubscriber<'a, CAP, SUBS, PUBS>) -> Self {
        Self {
            subscriber,
            button: None,
            kinds: EventKinds::ALL,
        }
    }

    /// 只接收指定槽位号按钮的事件。
    pub fn button(mut self, button_index: usize) -> Self {
        self.button = Some(button_index);
        self
    }

    /// 只接收指定类型的事件。
    pub fn kinds(mut self, kinds: EventKinds) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn accepts(&self, event: &ButtonEvent) -> bool {
        self.button.map_or(true, |button| button == event.button) && self.kinds.contains(event.kind)
    }

    /// 等待下一个符合条件的事件。
    pub async fn next_event(&mut self) -> ButtonEvent {
        loop {
            let event = self.subscriber.next_message_pure().await;
            if self.accepts(&event) {
                return event;
            }
        }
    }

    /// 取出已到达的下一个符合条件的事件，不等待。
    pub fn try_next_event(&mut self) -> Option<ButtonEvent> {
        while let Some(event) = self.subscriber.try_next_message_pure() {
            if self.accepts(&event) {
                return Some(event);
            }
        }
        None
    }
}

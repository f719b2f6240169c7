use core::iter::FusedIterator;

/// 单个事件字可用的位数（硬件事件组的宽度上限）。
pub const EVENT_BIT_COUNT: usize = 24;

/// 除 [`Trigger::NoEvent`] 外的触发类型数量，也是每个按钮占用的位数。
pub const TRIGGER_COUNT: usize = 3;

/// 一个事件字能表示的按钮数量。
pub const BUTTONS_PER_GROUP: usize = EVENT_BIT_COUNT / TRIGGER_COUNT;

const _: () = assert!(BUTTONS_PER_GROUP == 8, "event bit groups are incorrect");

/// 事件字中有效位的掩码，高于第 23 位的内容一律忽略。
pub const EVENT_BITS_MASK: u32 = (1 << EVENT_BIT_COUNT) - 1;

/// 属于单个按钮的一组触发源。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Trigger {
    /// 无事件。
    #[default]
    NoEvent = 0b000,
    /// 引脚上出现了电平跳变（消抖前），来自中断侧。
    PressEdge = 0b001,
    /// 消抖定时器到期，引脚电平可以信任。
    DebounceExpired = 0b010,
    /// 按住/连发定时器到期。
    RepeatExpired = 0b100,
}

impl Trigger {
    /// 该触发在按钮窗口内的原始位值。
    pub const fn bits(self) -> u32 {
        self as u32
    }

}

/// 同一按钮窗口内的处理顺序。
///
/// 消抖到期排在跳变之前：采样之后才到达的跳变必须重新启动消抖，
/// 而不能被当作消抖期间的抖动合并掉。
const WINDOW_ORDER: [Trigger; TRIGGER_COUNT] = [
    Trigger::DebounceExpired,
    Trigger::PressEdge,
    Trigger::RepeatExpired,
];

/// 计算某个按钮上某种触发对应的位掩码。
///
/// 纯计算，无锁、无分配，可在中断上下文中调用。
pub const fn bit_mask(trigger: Trigger, button_index: usize) -> u32 {
    let shift = (button_index % BUTTONS_PER_GROUP) * TRIGGER_COUNT;
    trigger.bits() << shift
}

/// 计算按钮所属的事件组编号。
///
/// 例如每组 8 个按钮时，按钮 7 属于第 0 组，按钮 8 属于第 1 组。
pub const fn group_index(button_index: usize) -> usize {
    button_index / BUTTONS_PER_GROUP
}

/// 从事件字中解出的单个事件。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Event {
    /// 产生事件的触发源。
    pub trigger: Trigger,
    /// 事件所属的事件组。
    pub group_index: usize,
    /// 发生事件的按钮（全局编号，而不是组内编号）。
    pub button: usize,
}

/// 把一个事件字解码为事件序列。
///
/// 只看低 24 位。每个置位的触发位产生一个 [`Event`]，按钮编号升序输出，
/// 同一按钮内依次为 `DebounceExpired`、`PressEdge`、`RepeatExpired`。
/// 全零的事件字得到空序列。
pub fn decode(bits: u32, group_index: usize) -> Decoder {
    Decoder {
        bits: bits & EVENT_BITS_MASK,
        group: group_index,
    }
}

/// [`decode`] 返回的惰性迭代器。
///
/// 克隆一份即可从同一快照重新开始解码。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoder {
    bits: u32,
    group: usize,
}

impl Iterator for Decoder {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.bits == 0 {
            return None;
        }
        let window = self.bits.trailing_zeros() as usize / TRIGGER_COUNT;
        let shift = window * TRIGGER_COUNT;
        let trigger = WINDOW_ORDER
            .into_iter()
            .find(|trigger| self.bits & (trigger.bits() << shift) != 0)?;
        self.bits &= !(trigger.bits() << shift);

        Some(Event {
            trigger,
            group_index: self.group,
            button: self.group * BUTTONS_PER_GROUP + window,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bits.count_ones() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Decoder {}

impl FusedIterator for Decoder {}

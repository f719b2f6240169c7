use core::cell::Cell;

use embassy_sync::{
    blocking_mutex::{raw::CriticalSectionRawMutex, Mutex},
    signal::Signal,
};
use embassy_time::{Duration, Instant};

use crate::error::Error;
use crate::trigger::{BUTTONS_PER_GROUP, EVENT_BITS_MASK};

/// 24 位的事件位通道。
///
/// 任意上下文都可以置位；等待方被唤醒时一次性取走并清零所有已置位的位。
/// 两次等待之间对同一位的多次置位会合并成一次。
pub struct EventGroup {
    bits: Mutex<CriticalSectionRawMutex, Cell<u32>>,
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl EventGroup {
    pub const fn new() -> Self {
        Self {
            bits: Mutex::new(Cell::new(0)),
            signal: Signal::new(),
        }
    }

    /// 置位。非阻塞、无分配，可以在中断中调用。高于第 23 位的内容被忽略。
    pub fn set(&self, mask: u32) {
        let mask = mask & EVENT_BITS_MASK;
        if mask == 0 {
            return;
        }
        self.bits.lock(|bits| bits.set(bits.get() | mask));
        self.signal.signal(());
    }

    /// 取走并清零当前所有位，不等待。
    pub fn take(&self) -> u32 {
        self.bits.lock(|bits| bits.replace(0))
    }

    /// 读取当前位但不清零。
    pub fn peek(&self) -> u32 {
        self.bits.lock(Cell::get)
    }

    /// 等待任意一位被置位，返回并清零所有已置位的位。
    pub async fn wait(&self) -> u32 {
        loop {
            let bits = self.take();
            if bits != 0 {
                return bits;
            }
            self.signal.wait().await;
        }
    }
}

impl Default for EventGroup {
    fn default() -> Self {
        Self::new()
    }
}

/// 发给定时器任务的命令。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// 在指定时刻到期一次。
    Start(Instant),
    Stop,
}

impl TimerCommand {
    /// 命令生效后的截止时间，停止命令返回 `None`。
    pub fn deadline(self) -> Option<Instant> {
        match self {
            TimerCommand::Start(at) => Some(at),
            TimerCommand::Stop => None,
        }
    }
}

/// 单次定时器句柄。
///
/// 命令只保留最新的一条：已启动时再次启动会以新的截止时间重新计时，
/// 启动后立即停止则什么也不会发生。定时器的实际等待在
/// [`ButtonDriver::run`](crate::gpio::ButtonDriver::run) 中进行。
pub struct ButtonTimer {
    command: Signal<CriticalSectionRawMutex, TimerCommand>,
}

impl ButtonTimer {
    pub const fn new() -> Self {
        Self {
            command: Signal::new(),
        }
    }

    /// 在 `delay` 之后到期一次。
    pub fn start_once(&self, delay: Duration) -> Result<(), Error> {
        let deadline = Instant::now().checked_add(delay).ok_or(Error::TimerArm)?;
        self.command.signal(TimerCommand::Start(deadline));
        Ok(())
    }

    pub fn stop(&self) {
        self.command.signal(TimerCommand::Stop);
    }

    /// 等待下一条命令。
    pub async fn next_command(&self) -> TimerCommand {
        self.command.wait().await
    }

    /// 取出尚未处理的命令（如果有）。
    pub fn try_take_command(&self) -> Option<TimerCommand> {
        self.command.try_take()
    }
}

impl Default for ButtonTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// 单个按钮在组内的共享资源。
pub struct ButtonSlot {
    /// 消抖定时器。
    pub debounce: ButtonTimer,
    /// 按住/连发定时器。
    pub hold: ButtonTimer,
    level: Mutex<CriticalSectionRawMutex, Cell<bool>>,
}

impl ButtonSlot {
    pub const fn new() -> Self {
        Self {
            debounce: ButtonTimer::new(),
            hold: ButtonTimer::new(),
            level: Mutex::new(Cell::new(true)),
        }
    }

    /// 记录消抖到期时采样到的原始电平（`true` 为高电平）。
    pub fn store_level(&self, high: bool) {
        self.level.lock(|level| level.set(high));
    }

    /// 最近一次采样到的原始电平。
    pub fn level(&self) -> bool {
        self.level.lock(Cell::get)
    }
}

impl Default for ButtonSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// 一个事件组：一个事件字加上其中 8 个按钮的共享资源。
///
/// 通常声明为 `static`：
///
/// ```
/// use embassy_button_events::group::ButtonGroup;
///
/// static GROUPS: [ButtonGroup; 2] = [ButtonGroup::new(), ButtonGroup::new()];
/// ```
pub struct ButtonGroup {
    events: EventGroup,
    slots: [ButtonSlot; BUTTONS_PER_GROUP],
}

impl ButtonGroup {
    pub const fn new() -> Self {
        Self {
            events: EventGroup::new(),
            slots: [const { ButtonSlot::new() }; BUTTONS_PER_GROUP],
        }
    }

    pub fn events(&self) -> &EventGroup {
        &self.events
    }

    /// 按全局按钮编号取出其所在槽位的共享资源。
    pub fn slot(&self, button_index: usize) -> &ButtonSlot {
        &self.slots[button_index % BUTTONS_PER_GROUP]
    }
}

impl Default for ButtonGroup {
    fn default() -> Self {
        Self::new()
    }
}

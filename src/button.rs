use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::config::ButtonConfig;
use crate::error::Error;
use crate::trigger::Trigger;

/// 按钮经过消抖确认后的逻辑状态。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Pressed,
    NotPressed,
}

/// 状态机所处的阶段。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 尚未确认过任何电平，也没有进行中的消抖。
    Idle,
    /// 检测到跳变，消抖定时器已启动，电平尚不可信。
    DebouncePending,
    /// 确认按下，按住定时器已启动。
    Pressed,
    /// 确认释放。
    NotPressed,
}

/// 发送给订阅者的语义事件类型。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// 确认释放。
    Up,
    /// 确认按下。
    Down,
    /// 释放时按压时长超过短按阈值。
    ShortPress,
    /// 释放时按压时长超过长按阈值。
    LongPress,
    /// 持续按住，按 `hold_repeat` 周期重复产生。
    Held,
}

/// 处理一个触发后需要执行的定时器操作。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    None,
    /// 启动消抖定时器。
    StartDebounce(Duration),
    /// 启动（或重新启动）按住/连发定时器。
    StartHold(Duration),
    /// 停止按住/连发定时器。
    StopHold,
}

/// 状态机对单个触发的反应。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub timer: TimerAction,
    /// 按顺序发布的事件，单个触发最多产生两个。
    pub events: Vec<EventKind, 2>,
}

impl Reaction {
    const fn new(timer: TimerAction) -> Self {
        Self {
            timer,
            events: Vec::new(),
        }
    }

    const fn ignored() -> Self {
        Self::new(TimerAction::None)
    }

    fn emit(mut self, kind: EventKind) -> Self {
        // 容量与单个触发的最大事件数一致，不会溢出
        let _ = self.events.push(kind);
        self
    }
}

/// 单个按钮的配置与可变状态。
///
/// 只由该按钮所在组的分发循环修改。
#[derive(Debug, Clone)]
pub struct ButtonRecord {
    name: &'static str,
    config: ButtonConfig,
    state: State,
    confirmed: bool,
    debounce_active: bool,
    transition_time: Instant,
}

impl ButtonRecord {
    pub const fn new(name: &'static str, config: ButtonConfig) -> Self {
        Self {
            name,
            config,
            state: State::NotPressed,
            confirmed: false,
            debounce_active: false,
            transition_time: Instant::from_ticks(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    /// 最近一次确认的逻辑状态。
    pub fn state(&self) -> State {
        self.state
    }

    /// 最近一次确认按下的时间。
    pub fn last_transition(&self) -> Instant {
        self.transition_time
    }

    pub fn is_debouncing(&self) -> bool {
        self.debounce_active
    }

    pub fn phase(&self) -> Phase {
        if self.debounce_active {
            return Phase::DebouncePending;
        }
        match (self.confirmed, self.state) {
            (false, _) => Phase::Idle,
            (true, State::Pressed) => Phase::Pressed,
            (true, State::NotPressed) => Phase::NotPressed,
        }
    }

    /// 处理一个触发。
    ///
    /// `level_high` 是消抖定时器到期时采样到的原始引脚电平，
    /// 只在 [`Trigger::DebounceExpired`] 时使用。
    pub fn handle(
        &mut self,
        trigger: Trigger,
        level_high: bool,
        now: Instant,
    ) -> Result<Reaction, Error> {
        match trigger {
            Trigger::NoEvent => Ok(Reaction::ignored()),
            Trigger::PressEdge => Ok(self.on_press_edge()),
            Trigger::DebounceExpired => self.on_debounce_expired(level_high, now),
            Trigger::RepeatExpired => Ok(self.on_repeat_expired()),
        }
    }

    fn on_press_edge(&mut self) -> Reaction {
        // 消抖期间的跳变全部合并，绝不启动第二个消抖定时器
        if self.debounce_active {
            return Reaction::ignored();
        }
        self.debounce_active = true;
        Reaction::new(TimerAction::StartDebounce(self.config.debounce))
    }

    fn on_debounce_expired(&mut self, level_high: bool, now: Instant) -> Result<Reaction, Error> {
        if now < self.transition_time {
            return Err(Error::ClockNonMonotonic);
        }
        self.debounce_active = false;

        let next = if self.config.active_level.is_active(level_high) {
            State::Pressed
        } else {
            State::NotPressed
        };
        let previous = self.state;
        self.state = next;
        self.confirmed = true;

        // 抖动后电平回到原状态：没有真正的状态切换
        if previous == next {
            return Ok(Reaction::ignored());
        }

        match next {
            State::Pressed => {
                self.transition_time = now;
                Ok(Reaction::new(TimerAction::StartHold(self.config.hold_press))
                    .emit(EventKind::Down))
            }
            State::NotPressed => {
                let reaction = Reaction::new(TimerAction::StopHold).emit(EventKind::Up);
                let elapsed = now
                    .checked_duration_since(self.transition_time)
                    .ok_or(Error::ClockNonMonotonic)?;
                Ok(match self.classify(elapsed) {
                    Some(kind) => reaction.emit(kind),
                    None => reaction,
                })
            }
        }
    }

    fn on_repeat_expired(&mut self) -> Reaction {
        // 与释放合并到同一次唤醒中的连发位已经过期
        if self.state != State::Pressed {
            return Reaction::ignored();
        }
        Reaction::new(TimerAction::StartHold(self.config.hold_repeat)).emit(EventKind::Held)
    }

    fn classify(&self, elapsed: Duration) -> Option<EventKind> {
        if elapsed > self.config.long_press {
            Some(EventKind::LongPress)
        } else if elapsed > self.config.short_press {
            Some(EventKind::ShortPress)
        } else {
            None
        }
    }
}

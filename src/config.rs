use embassy_time::Duration;

use crate::gpio::ActiveLevel;

/// 单个按钮的消抖与按压分类参数。
///
/// 所有时间都以 [`Duration`] 表示，内部以微秒精度比较。
/// 阈值比较均为严格大于：按压时长恰好等于某个阈值时不算达到该阈值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    /// 按钮按下时的有效电平。
    pub active_level: ActiveLevel,

    /// 消抖持续时间。
    ///
    /// 检测到第一次电平跳变后，要等这段时间过去才读取引脚电平；
    /// 期间的后续跳变都会被合并忽略。
    pub debounce: Duration,

    /// 短按的最短时长。
    ///
    /// 释放时按压时长超过此值（且未超过 `long_press`）才产生 `ShortPress`。
    pub short_press: Duration,

    /// 长按的最短时长。释放时按压时长超过此值产生 `LongPress`。
    pub long_press: Duration,

    /// 按下后多久开始产生第一个 `Held` 事件。
    pub hold_press: Duration,

    /// 持续按住时，重复产生 `Held` 事件的周期。
    pub hold_repeat: Duration,
}

impl ButtonConfig {
    /// 以毫秒为单位构造配置，有效电平为低电平。
    pub const fn from_millis(
        debounce_ms: u64,
        short_press_ms: u64,
        long_press_ms: u64,
        hold_press_ms: u64,
        hold_repeat_ms: u64,
    ) -> Self {
        Self {
            active_level: ActiveLevel::Low,
            debounce: Duration::from_millis(debounce_ms),
            short_press: Duration::from_millis(short_press_ms),
            long_press: Duration::from_millis(long_press_ms),
            hold_press: Duration::from_millis(hold_press_ms),
            hold_repeat: Duration::from_millis(hold_repeat_ms),
        }
    }

    /// 返回修改了有效电平的配置。
    pub const fn with_active_level(mut self, active_level: ActiveLevel) -> Self {
        self.active_level = active_level;
        self
    }
}

impl Default for ButtonConfig {
    /// 提供一套合理的默认配置。
    ///
    /// - 消抖: 50ms
    /// - 短按阈值: 100ms
    /// - 长按阈值: 3000ms
    /// - 按住触发: 5000ms
    /// - 按住连发周期: 500ms
    /// - 低电平有效（上拉输入）
    fn default() -> Self {
        Self::from_millis(50, 100, 3000, 5000, 500)
    }
}

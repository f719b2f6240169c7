use core::future::pending;

use embassy_futures::select::{select, select4, Either, Either4};
use embassy_time::{Instant, Timer};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

use crate::group::{ButtonGroup, ButtonSlot, EventGroup};
use crate::trigger::{bit_mask, Trigger};

/// 定义GPIO按钮的有效电平。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActiveLevel {
    /// 低电平有效（例如，使用上拉电阻，按下时引脚接地）。
    #[default]
    Low,
    /// 高电平有效（例如，使用下拉电阻，按下时引脚接VCC）。
    High,
}

impl ActiveLevel {
    /// 给定原始电平，判断按钮是否处于按下状态。
    pub const fn is_active(self, level_high: bool) -> bool {
        match self {
            ActiveLevel::Low => !level_high,
            ActiveLevel::High => level_high,
        }
    }
}

/// 【后台驱动器】拥有一个按钮的输入引脚，是事件位的生产方。
///
/// 它只做三件事，从不接触按钮状态：
/// - 引脚出现任意跳变时置 `PressEdge` 位；
/// - 消抖定时器到期时采样电平，再置 `DebounceExpired` 位；
/// - 按住定时器到期时置 `RepeatExpired` 位。
///
/// 定时器由分发循环通过 [`ButtonSlot`] 中的句柄启动和停止。
/// 引脚的上下拉和中断配置由应用在创建驱动前完成。
pub struct ButtonDriver<'a, P> {
    pin: P,
    index: usize,
    events: &'a EventGroup,
    slot: &'a ButtonSlot,
}

impl<'a, P> ButtonDriver<'a, P>
where
    P: InputPin + Wait,
{
    pub(crate) fn new(pin: P, index: usize, group: &'a ButtonGroup) -> Self {
        Self {
            pin,
            index,
            events: group.events(),
            slot: group.slot(index),
        }
    }

    /// 按钮的槽位号。
    pub fn index(&self) -> usize {
        self.index
    }

    /// 运行驱动循环。每个按钮需要把它 spawn 到一个后台任务中。
    pub async fn run(mut self) -> ! {
        let press_bit = bit_mask(Trigger::PressEdge, self.index);
        let debounce_bit = bit_mask(Trigger::DebounceExpired, self.index);
        let repeat_bit = bit_mask(Trigger::RepeatExpired, self.index);

        let mut debounce_at: Option<Instant> = None;
        let mut hold_at: Option<Instant> = None;

        loop {
            let fired = select4(
                self.pin.wait_for_any_edge(),
                select(
                    self.slot.debounce.next_command(),
                    self.slot.hold.next_command(),
                ),
                expire_at(debounce_at),
                expire_at(hold_at),
            )
            .await;

            match fired {
                Either4::First(Ok(())) => self.events.set(press_bit),
                Either4::First(Err(_)) => {
                    warn!("button {}: waiting for edge failed", self.index);
                }
                Either4::Second(Either::First(command)) => debounce_at = command.deadline(),
                Either4::Second(Either::Second(command)) => hold_at = command.deadline(),
                Either4::Third(()) => {
                    debounce_at = None;
                    match self.pin.is_high() {
                        Ok(high) => self.slot.store_level(high),
                        // 沿用上一次采样到的电平
                        Err(_) => warn!("button {}: reading level failed", self.index),
                    }
                    self.events.set(debounce_bit);
                }
                Either4::Fourth(()) => {
                    hold_at = None;
                    self.events.set(repeat_bit);
                }
            }
        }
    }
}

async fn expire_at(deadline: Option<Instant>) {
    match deadline {
        Some(at) => Timer::at(at).await,
        None => pending().await,
    }
}

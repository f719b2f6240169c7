/// 按钮库可能产生的错误。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// 注册表已满，无法再为新按钮分配槽位。
    CapacityExceeded,
    /// 同名按钮已经注册过。
    DuplicateButton,
    /// 单调时钟倒退：当前时间早于记录的状态切换时间。
    ///
    /// 这是时钟提供方违反约定，属于致命错误。
    ClockNonMonotonic,
    /// 定时器无法启动（截止时间超出时钟范围）。
    TimerArm,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::CapacityExceeded => write!(f, "button registry is full"),
            Error::DuplicateButton => write!(f, "button is already registered"),
            Error::ClockNonMonotonic => write!(f, "monotonic clock went backwards"),
            Error::TimerArm => write!(f, "failed to arm button timer"),
        }
    }
}

impl core::error::Error for Error {}

use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

use crate::button::ButtonRecord;
use crate::config::ButtonConfig;
use crate::dispatch::{Dispatcher, EventPublisher};
use crate::error::Error;
use crate::gpio::ButtonDriver;
use crate::group::ButtonGroup;
use crate::registry::{Binding, Registry};
use crate::trigger::{group_index, BUTTONS_PER_GROUP};

/// 支持的最大事件组数量。
pub const MAX_GROUPS: usize = 6;

/// 【初始化上下文】最多管理 `MAX` 个按钮的管理器。
///
/// 典型流程：
/// 1. 以 `static` 声明足够数量的 [`ButtonGroup`] 和一个 [`EventChannel`](crate::dispatch::EventChannel)；
/// 2. 用 [`ButtonManager::add_button`] 注册每个按钮，把返回的驱动 spawn 到后台任务；
/// 3. 为每个用到的事件组创建 [`Dispatcher`] 并 spawn。
///
/// 分发器拿到的是按钮记录的快照，之后的增删不会影响已创建的分发器。
pub struct ButtonManager<'a, const MAX: usize> {
    groups: &'a [ButtonGroup],
    registry: Registry<&'static str, MAX>,
    records: [Option<ButtonRecord>; MAX],
}

impl<'a, const MAX: usize> ButtonManager<'a, MAX> {
    /// 创建管理器。
    ///
    /// `groups` 必须足够容纳 `MAX` 个按钮（每组 8 个），且不超过 [`MAX_GROUPS`] 组。
    pub fn new(groups: &'a [ButtonGroup]) -> Self {
        assert!(
            groups.len() <= MAX_GROUPS,
            "No support for more than six event groups"
        );
        assert!(
            groups.len() * BUTTONS_PER_GROUP >= MAX,
            "Not enough event groups for the button capacity"
        );
        Self {
            groups,
            registry: Registry::new(),
            records: [const { None }; MAX],
        }
    }

    /// 注册一个按钮，返回它的后台驱动。
    ///
    /// 注册表已满时返回 [`Error::CapacityExceeded`]，名字重复时返回
    /// [`Error::DuplicateButton`]。
    pub fn add_button<P>(
        &mut self,
        name: &'static str,
        pin: P,
        config: ButtonConfig,
    ) -> Result<ButtonDriver<'a, P>, Error>
    where
        P: InputPin + Wait,
    {
        if self.registry.position(&name).is_some() {
            return Err(Error::DuplicateButton);
        }
        let binding = self.registry.add(name);
        if !binding.is_valid() {
            warn!("no free slot for button {}", name);
            return Err(Error::CapacityExceeded);
        }

        self.records[binding.button_index] = Some(ButtonRecord::new(name, config));
        info!(
            "button {} bound to slot {} in group {}",
            name, binding.button_index, binding.group_index
        );
        Ok(ButtonDriver::new(
            pin,
            binding.button_index,
            &self.groups[binding.group_index],
        ))
    }

    /// 注销按钮，释放它的槽位。
    pub fn remove_button(&mut self, name: &'static str) -> bool {
        match self.registry.position(&name) {
            Some(index) => {
                self.records[index] = None;
                self.registry.remove(&name)
            }
            None => false,
        }
    }

    /// 查询按钮的绑定。
    pub fn binding(&self, name: &'static str) -> Option<Binding> {
        self.registry.position(&name).map(|index| Binding {
            valid: true,
            button_index: index,
            group_index: group_index(index),
        })
    }

    pub fn button(&self, button_index: usize) -> Option<&ButtonRecord> {
        self.records.get(button_index).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.registry.is_full()
    }

    /// 容纳全部 `MAX` 个按钮需要的事件组数量。
    pub const fn group_count(&self) -> usize {
        MAX.div_ceil(BUTTONS_PER_GROUP)
    }

    /// 为指定事件组创建分发器。
    ///
    /// 分发器拿到的是该组当前按钮记录的快照。`group_index` 超出传入的
    /// 事件组数量时返回 `None`。
    pub fn dispatcher<const CAP: usize, const SUBS: usize, const PUBS: usize>(
        &self,
        group_index: usize,
        publisher: EventPublisher<'a, CAP, SUBS, PUBS>,
    ) -> Option<Dispatcher<'a, CAP, SUBS, PUBS>> {
        let group = self.groups.get(group_index)?;
        let mut buttons: [Option<ButtonRecord>; BUTTONS_PER_GROUP] =
            [const { None }; BUTTONS_PER_GROUP];
        let base = group_index * BUTTONS_PER_GROUP;
        for (index, record) in self.records.iter().enumerate().skip(base).take(BUTTONS_PER_GROUP) {
            buttons[index - base] = record.clone();
        }
        Some(Dispatcher::new(group, group_index, buttons, publisher))
    }
}

use core::ops::Index;

use crate::trigger::group_index;

/// 按钮与事件管理器之间的绑定关系。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// 绑定是否有效。为 `false` 表示注册表已满，此时下面两个字段无意义。
    pub valid: bool,
    /// 分配给按钮的槽位号。
    pub button_index: usize,
    /// 按钮所属的事件组。
    pub group_index: usize,
}

impl Binding {
    /// 注册表已满时返回的无效绑定。
    pub const fn invalid() -> Self {
        Self {
            valid: false,
            button_index: 0,
            group_index: 0,
        }
    }

    const fn at(button_index: usize) -> Self {
        Self {
            valid: true,
            button_index,
            group_index: group_index(button_index),
        }
    }

    pub const fn is_valid(&self) -> bool {
        self.valid
    }
}

/// 最多容纳 `N` 个条目的注册表，按首个空槽分配。
#[derive(Debug, Clone)]
pub struct Registry<T, const N: usize> {
    slots: [Option<T>; N],
}

impl<T, const N: usize> Registry<T, N> {
    pub const fn new() -> Self {
        Self {
            slots: [const { None }; N],
        }
    }

    /// 注册一个条目，返回它的绑定。
    ///
    /// 线性查找第一个空槽。注册表已满时返回无效绑定且不修改任何状态；
    /// 条目已存在时返回它原有的绑定，不会占用第二个槽位。
    pub fn add(&mut self, item: T) -> Binding
    where
        T: PartialEq,
    {
        if let Some(index) = self.position(&item) {
            return Binding::at(index);
        }
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(item);
                Binding::at(index)
            }
            None => Binding::invalid(),
        }
    }

    /// 移除一个已注册的条目，返回是否确实移除了。
    pub fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        match self.position(item) {
            Some(index) => {
                self.slots[index] = None;
                true
            }
            None => false,
        }
    }

    /// 查找条目所在的槽位。
    pub fn position(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.slots
            .iter()
            .position(|slot| slot.as_ref() == Some(item))
    }

    /// 按槽位号取出条目，槽位为空或越界时返回 `None`。
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// 依次遍历所有已占用的槽位。
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|item| (index, item)))
    }

    /// 已占用的槽位数。
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Default for Registry<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Index<usize> for Registry<T, N> {
    type Output = T;

    /// 直接按槽位号访问。调用者只应传入 [`Registry::add`] 返回过的槽位号。
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(item) => item,
            None => panic!("no entry bound to slot {}", index),
        }
    }
}

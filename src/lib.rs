//! 基于中断的按钮消抖与按压分类。

#![no_std]

mod fmt;

pub mod button;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gpio;
pub mod group;
pub mod manager;
pub mod registry;
pub mod trigger;

pub use button::{ButtonRecord, EventKind, Phase, State};
pub use config::*;
pub use dispatch::{ButtonEvent, Dispatcher, EventChannel, EventKinds, Listener};
pub use error::Error;
pub use gpio::{ActiveLevel, ButtonDriver};
pub use group::ButtonGroup;
pub use manager::{ButtonManager, MAX_GROUPS};

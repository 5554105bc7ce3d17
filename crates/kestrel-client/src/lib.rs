//! # Kestrel Client Engine
//!
//! 飞行器客户端核心引擎：属性读取与缓存、异步调度、事件路由
//! 与监听者扇出。
//!
//! ## 模块
//!
//! - `drone`: 对外的 [`Drone`] 外观（生命周期、读取、命令、注册）
//! - `dispatcher`: 单工作线程异步调度器
//! - `notifier`: 通知上下文抽象与事件循环实现
//! - `router`: 事件路由器（链路状态机、衍生事件）
//! - `listener`: 监听者注册表与事件定义
//! - `store`: 属性缓存与默认值路径
//! - `timer`: 飞行计时
//! - `builder`: 链式构造
//!
//! ## 线程模型
//!
//! 每个外观实例一条后台工作线程（全部阻塞远端调用在其上串行
//! 执行）加一个单线程通知上下文（全部回调与异步结果在其上投
//! 递）。应用线程可直接调用同步操作并阻塞等待。

pub mod builder;
pub mod dispatcher;
pub mod drone;
pub mod error;
pub mod listener;
pub mod notifier;
pub mod router;
pub mod store;
pub mod timer;

// 重新导出常用类型
pub use builder::DroneBuilder;
pub use dispatcher::AsyncDispatcher;
pub use drone::{ConnectionHandle, Drone, WAYPOINT_SPEED_PARAMETER};
pub use error::ClientError;
pub use listener::{DroneEvent, DroneListener, ListenerRegistry};
pub use notifier::{EventLoopContext, ImmediateContext, NotificationContext, Task};
pub use router::{
    COLLISION_DANGEROUS_SPEED_MPS, COLLISION_LOOKAHEAD_SECS, COLLISION_SAFE_ALTITUDE_M,
    EventRouter, LinkState,
};
pub use store::AttributeStore;
pub use timer::FlightTimer;

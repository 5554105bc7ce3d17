//! 事件路由器
//!
//! 接收通道的原生属性推送，更新衍生状态（飞行计时、碰撞评估），
//! 并把事件扇出到监听者注册表。路由器同时承载链路状态机：
//!
//! ```text
//! Idle ──start()──▶ Active ──通道死亡──▶ Interrupted
//!   ▲                  │                      │
//!   └────── stop() ────┴──────── stop() ──────┘
//! ```
//!
//! （Interrupted 状态下显式 `start()` 重新回到 Active。）
//!
//! # 并发纪律
//!
//! 缓存属性与计时器只在本路由器的互斥锁内变更：同一时刻至多
//! 一次共享衍生状态的变更在途。扇出任务在持锁期间按产生顺序投
//! 递到通知上下文（FIFO），因此监听者观察到的顺序与通道产生顺
//! 序一致，后到更新的通知不会插队。

use std::sync::Arc;

use kestrel_channel::ConnectionResult;
use kestrel_properties::{Altitude, AttributeEvent, AttributeValue, AttributeType, Speed};
use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::listener::{DroneEvent, ListenerRegistry};
use crate::notifier::NotificationContext;
use crate::store::AttributeStore;
use crate::timer::FlightTimer;

/// 碰撞前瞻时域（秒）
pub const COLLISION_LOOKAHEAD_SECS: f64 = 2.0;
/// 危险下降速度阈值（米/秒，向上为正）
pub const COLLISION_DANGEROUS_SPEED_MPS: f64 = -3.0;
/// 安全高度下限（米）：低于此高度不做碰撞告警
pub const COLLISION_SAFE_ALTITUDE_M: f64 = 1.0;

/// 链路状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// 无连接
    Idle,
    /// 已绑定，正在观察
    Active,
    /// 通道死亡（等待显式 stop/start 恢复）
    Interrupted,
}

/// 碰撞迫近判定
///
/// 三个条件须同时成立：前瞻时域内的预测高度为负、当前垂直速度
/// 低于危险下降阈值、当前高度仍在安全下限之上。第三条避免了
/// 贴地时数学上必然触发的误报。
fn collision_imminent(speed: &Speed, altitude: &Altitude) -> bool {
    let vertical_speed = speed.vertical_speed;
    let altitude_m = altitude.altitude;

    altitude_m + vertical_speed * COLLISION_LOOKAHEAD_SECS < 0.0
        && vertical_speed < COLLISION_DANGEROUS_SPEED_MPS
        && altitude_m > COLLISION_SAFE_ALTITUDE_M
}

/// 路由器内部状态（整体由一把锁保护）
struct RouterInner {
    link: LinkState,
    store: AttributeStore,
    timer: FlightTimer,
}

/// 事件路由器
pub struct EventRouter {
    inner: Mutex<RouterInner>,
    listeners: Arc<ListenerRegistry>,
    context: Arc<dyn NotificationContext>,
}

impl EventRouter {
    /// 创建处于 Idle 状态的路由器
    pub fn new(
        listeners: Arc<ListenerRegistry>,
        context: Arc<dyn NotificationContext>,
    ) -> Self {
        Self {
            inner: Mutex::new(RouterInner {
                link: LinkState::Idle,
                store: AttributeStore::new(),
                timer: FlightTimer::new(),
            }),
            listeners,
            context,
        }
    }

    /// 当前链路状态
    pub fn link_state(&self) -> LinkState {
        self.inner.lock().link
    }

    /// 是否处于 Active
    pub fn is_active(&self) -> bool {
        self.link_state() == LinkState::Active
    }

    /// 进入 Active：清缓存、计时器归零、开始观察
    pub fn activate(&self) {
        let mut inner = self.inner.lock();
        inner.link = LinkState::Active;
        inner.store.clear();
        inner.timer.reset();
        debug!("Event router active");
    }

    /// 回到 Idle（显式 stop）：计时器折算冻结，监听者集保留
    pub fn deactivate(&self) {
        let mut inner = self.inner.lock();
        inner.link = LinkState::Idle;
        inner.timer.stop();
        debug!("Event router idle");
    }

    /// 处理一次属性推送
    ///
    /// 持锁完成缓存更新与衍生状态重算，再按产生顺序投递扇出
    /// 任务。非 Active 状态下的推送直接丢弃。
    pub fn handle_attribute_update(&self, event: AttributeEvent, payload: Option<&[u8]>) {
        let mut inner = self.inner.lock();
        if inner.link != LinkState::Active {
            trace!("Dropping {event:?} while {:?}", inner.link);
            return;
        }

        if let Some(attribute) = event.attribute() {
            inner.store.update(attribute, payload);
        }

        let mut events: SmallVec<[DroneEvent; 2]> = SmallVec::new();
        match event {
            AttributeEvent::SpeedUpdated => {
                // 衍生事件先于本次的主事件投递
                let imminent =
                    collision_imminent(&inner.store.speed(), &inner.store.altitude());
                events.push(DroneEvent::GroundCollisionImminent { imminent });
            },
            AttributeEvent::StateUpdated => {
                let flying = inner.store.state().is_flying();
                inner.timer.on_state_update(flying);
            },
            _ => {},
        }
        events.push(DroneEvent::Attribute(event));

        // 持锁投递：与下一次更新的通知不会交错
        for event in events {
            self.fan_out(event);
        }
    }

    /// 处理远端推送的连接失败
    pub fn handle_connection_failed(&self, result: ConnectionResult) {
        let _inner = self.inner.lock();
        if self.listeners.is_empty() {
            return;
        }

        let registry = Arc::clone(&self.listeners);
        self.context.post(Box::new(move || {
            for listener in registry.snapshot().iter() {
                listener.on_connection_failed(&result);
            }
        }));
    }

    /// 上报通道死亡
    ///
    /// Active → Interrupted 并恰好通知一次；已中断或 Idle 时
    /// 吞掉重复上报（并发失败不产生通知风暴）。返回是否通知。
    pub fn report_interrupted(&self, reason: &str) -> bool {
        let mut inner = self.inner.lock();
        if inner.link != LinkState::Active {
            trace!("Suppressing duplicate interruption: {reason}");
            return false;
        }

        inner.link = LinkState::Interrupted;
        inner.timer.stop();
        warn!("Remote service interrupted: {reason}");

        if !self.listeners.is_empty() {
            let registry = Arc::clone(&self.listeners);
            let reason = reason.to_string();
            self.context.post(Box::new(move || {
                for listener in registry.snapshot().iter() {
                    listener.on_service_interrupted(&reason);
                }
            }));
        }
        true
    }

    /// 读取缓存属性（克隆）
    pub fn cached_attribute(&self, attribute: AttributeType) -> Option<AttributeValue> {
        self.inner.lock().store.cached(attribute).cloned()
    }

    // === 飞行计时转发 ===

    /// 累计飞行秒数（向下取整）
    pub fn flight_time_secs(&self) -> u64 {
        self.inner.lock().timer.flight_time_secs()
    }

    /// 累计飞行时长
    pub fn flight_time(&self) -> std::time::Duration {
        self.inner.lock().timer.elapsed()
    }

    /// 计时器归零
    pub fn reset_flight_timer(&self) {
        self.inner.lock().timer.reset();
    }

    /// 计时器折算冻结
    pub fn stop_flight_timer(&self) {
        self.inner.lock().timer.stop();
    }

    /// 扇出一个事件（空监听集直接跳过）
    fn fan_out(&self, event: DroneEvent) {
        if self.listeners.is_empty() {
            return;
        }

        let registry = Arc::clone(&self.listeners);
        self.context.post(Box::new(move || {
            for listener in registry.snapshot().iter() {
                listener.on_event(&event);
            }
        }));
    }
}

//! 监听者注册表与事件定义
//!
//! 监听集合可被任意线程随时增删，而事件扇出可能正在另一条线程
//! 上迭代同一集合。这里采用写时复制快照（`ArcSwap`）：扇出侧
//! 加载一份不可变快照迭代，增删侧 RCU 替换整个列表，两侧互不
//! 阻塞，也不会在迭代中途崩溃。
//!
//! 快照语义的代价是"在途周期"的二义性：一个刚被移除的监听者
//! 可能仍收到本周期的一次通知，或被跳过。两者都合法，但同一
//! 监听者绝不会被重复通知。

use std::sync::Arc;

use arc_swap::ArcSwap;
use kestrel_channel::ConnectionResult;
use kestrel_properties::AttributeEvent;

/// 投递给应用监听者的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DroneEvent {
    /// 远端推送的原生属性事件
    Attribute(AttributeEvent),
    /// 衍生事件：地面碰撞迫近评估（每次 SPEED 更新时重算）
    GroundCollisionImminent { imminent: bool },
}

/// 应用侧监听者能力集
///
/// 全部回调都在指定通知上下文上执行，按通道产生事件的顺序
/// 串行投递。回调内不要做长时间阻塞的工作。
pub trait DroneListener: Send + Sync {
    /// 属性事件或衍生事件
    fn on_event(&self, event: &DroneEvent);

    /// 飞行器链路建立失败
    fn on_connection_failed(&self, result: &ConnectionResult) {
        let _ = result;
    }

    /// 远端服务中断（通道死亡，每次死亡恰好通知一次）
    fn on_service_interrupted(&self, reason: &str) {
        let _ = reason;
    }
}

/// 线程安全的监听者注册表
///
/// 注册表的生命周期独立于连接生命周期：`stop()` 不清空它，
/// 注销永远由调用方发起。
pub struct ListenerRegistry {
    listeners: ArcSwap<Vec<Arc<dyn DroneListener>>>,
}

impl ListenerRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            listeners: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// 注册监听者
    ///
    /// 以 `Arc` 指针身份去重：重复注册同一实例是 no-op，
    /// 保证扇出时同一监听者至多通知一次。
    pub fn add(&self, listener: Arc<dyn DroneListener>) {
        self.listeners.rcu(|current| {
            if current.iter().any(|l| Arc::ptr_eq(l, &listener)) {
                Arc::clone(current)
            } else {
                let mut next = Vec::with_capacity(current.len() + 1);
                next.extend(current.iter().cloned());
                next.push(Arc::clone(&listener));
                Arc::new(next)
            }
        });
    }

    /// 注销监听者（按 `Arc` 指针身份；未注册时为 no-op）
    pub fn remove(&self, listener: &Arc<dyn DroneListener>) {
        self.listeners.rcu(|current| {
            Arc::new(
                current
                    .iter()
                    .filter(|l| !Arc::ptr_eq(l, listener))
                    .cloned()
                    .collect::<Vec<_>>(),
            )
        });
    }

    /// 取当前监听者快照
    ///
    /// 快照是不可变的：迭代期间的并发增删只影响后续快照。
    pub fn snapshot(&self) -> Arc<Vec<Arc<dyn DroneListener>>> {
        self.listeners.load_full()
    }

    /// 是否没有任何监听者
    pub fn is_empty(&self) -> bool {
        self.listeners.load().is_empty()
    }

    /// 监听者数量
    pub fn len(&self) -> usize {
        self.listeners.load().len()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

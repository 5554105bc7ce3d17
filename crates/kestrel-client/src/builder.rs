//! Builder 模式实现
//!
//! 提供链式构造 [`Drone`] 实例的便捷方式。

use std::sync::Arc;

use kestrel_channel::RemoteChannel;

use crate::drone::Drone;
use crate::notifier::{EventLoopContext, NotificationContext};

/// Drone Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use kestrel_channel::RemoteChannel;
/// use kestrel_client::DroneBuilder;
///
/// fn build(channel: Arc<dyn RemoteChannel>) {
///     // 默认配置：自带事件循环线程作为通知上下文
///     let drone = DroneBuilder::new(channel).build();
///     drone.start().unwrap();
/// }
/// ```
pub struct DroneBuilder {
    /// 远端通道（必选）
    channel: Arc<dyn RemoteChannel>,
    /// 通知上下文（可选，默认新建事件循环线程）
    context: Option<Arc<dyn NotificationContext>>,
}

impl DroneBuilder {
    /// 创建 Builder
    pub fn new(channel: Arc<dyn RemoteChannel>) -> Self {
        Self {
            channel,
            context: None,
        }
    }

    /// 指定通知上下文（嵌入应用已有的事件循环时使用）
    pub fn notification_context(mut self, context: Arc<dyn NotificationContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// 构建 Drone 实例
    ///
    /// 未指定通知上下文时创建一个 [`EventLoopContext`]（随外观
    /// 存续的专用通知线程）。
    pub fn build(self) -> Drone {
        let context = self
            .context
            .unwrap_or_else(|| Arc::new(EventLoopContext::new()));
        Drone::new(self.channel, context)
    }
}

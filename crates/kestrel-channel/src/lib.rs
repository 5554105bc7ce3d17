//! # Kestrel Channel Layer
//!
//! 远端通道抽象层，定义核心引擎对传输协作方的全部要求。
//!
//! ## 设计说明
//!
//! 核心引擎不关心传输细节（绑定握手、编组格式都由传输方实现），
//! 只依赖 [`RemoteChannel`] 合约：
//!
//! - 连接管理：`connect` / `disconnect`（幂等，可失败）
//! - 属性拉取：`fetch_attribute`（返回原始载荷，可能为空）
//! - 推送观察：`observe_updates` / `stop_observing`
//! - 存活探测：`is_ready`（底层管理进程就绪）与 `is_alive`
//!   （已绑定会话存活），用于区分"干净断开"与"通道死亡"
//! - 命令下发：`dispatch_command`（发后不理）
//!
//! 通道实现可以从任意线程回调 [`ChannelObserver`]，但同一观察者
//! 的回调必须串行（一次一个），且保持事件产生顺序。

use std::sync::Arc;

use bytes::Bytes;
use kestrel_properties::{AttributeEvent, AttributeType, Command};
use thiserror::Error;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockChannel;

/// 通道层统一错误类型
#[derive(Error, Debug, Clone)]
pub enum ChannelError {
    /// 远端服务不可达（调用失败或通道已死亡）
    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(String),
}

impl ChannelError {
    /// 构造 `RemoteUnavailable` 错误
    pub fn unavailable(reason: impl Into<String>) -> Self {
        ChannelError::RemoteUnavailable(reason.into())
    }
}

/// 连接方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionType {
    /// UDP 监听（地面站常用）
    Udp { port: u16 },
    /// TCP 直连
    Tcp { address: String, port: u16 },
    /// USB 数传
    Usb { baud_rate: u32 },
}

/// 飞行器连接参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParameter {
    /// 连接方式
    pub connection_type: ConnectionType,
}

impl ConnectionParameter {
    /// UDP 连接参数
    pub fn udp(port: u16) -> Self {
        Self {
            connection_type: ConnectionType::Udp { port },
        }
    }

    /// TCP 连接参数
    pub fn tcp(address: impl Into<String>, port: u16) -> Self {
        Self {
            connection_type: ConnectionType::Tcp {
                address: address.into(),
                port,
            },
        }
    }

    /// USB 连接参数
    pub fn usb(baud_rate: u32) -> Self {
        Self {
            connection_type: ConnectionType::Usb { baud_rate },
        }
    }
}

impl Default for ConnectionParameter {
    fn default() -> Self {
        // MAVLink 地面站默认端口
        Self::udp(14550)
    }
}

/// 连接失败详情
///
/// 由远端服务在飞行器链路建立失败时推送。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionResult {
    /// 错误码（远端定义）
    pub error_code: i32,
    /// 人类可读的错误描述
    pub error_message: String,
}

impl ConnectionResult {
    /// 创建连接失败详情
    pub fn new(error_code: i32, error_message: impl Into<String>) -> Self {
        Self {
            error_code,
            error_message: error_message.into(),
        }
    }
}

/// 通道推送观察者
///
/// 核心引擎在 `observe_updates` 时注册一次；通道实现负责把
/// 远端的推送串行地转给它。
///
/// # 回调约定
///
/// - 同一观察者的回调一次一个，保持产生顺序
/// - 回调内不得长时间阻塞（引擎会把重活转发到通知上下文）
pub trait ChannelObserver: Send + Sync {
    /// 属性更新：`payload` 是被刷新属性的新值编码（可能缺席）
    fn attribute_updated(&self, event: AttributeEvent, payload: Option<Bytes>);

    /// 飞行器链路建立失败
    fn connection_failed(&self, result: ConnectionResult);

    /// 通道死亡推送（可选能力；引擎也会主动用 `is_alive` 探测）
    fn channel_died(&self, reason: &str) {
        let _ = reason;
    }
}

/// 远端通道合约
///
/// 传输协作方实现本 trait；核心引擎只通过它访问远端服务。
/// 所有方法可从任意线程调用。
pub trait RemoteChannel: Send + Sync {
    /// 底层连接管理进程是否就绪
    ///
    /// 就绪是 `start()` 的前置条件；未就绪是致命前置违规，
    /// 引擎不会内部重试。
    fn is_ready(&self) -> bool {
        true
    }

    /// 请求远端建立飞行器链路（幂等）
    fn connect(&self, parameter: &ConnectionParameter) -> Result<(), ChannelError>;

    /// 请求远端断开飞行器链路（幂等）
    fn disconnect(&self) -> Result<(), ChannelError>;

    /// 拉取一个属性的当前值
    ///
    /// # 返回
    /// - `Ok(Some(payload))`: 远端有值，载荷为该属性的编码
    /// - `Ok(None)`: 远端无值（未知属性、未就绪、或属性不受支持）
    /// - `Err(RemoteUnavailable)`: 通道调用失败
    fn fetch_attribute(&self, attribute: AttributeType) -> Result<Option<Bytes>, ChannelError>;

    /// 注册推送观察者（重复注册以最后一次为准）
    fn observe_updates(&self, observer: Arc<dyn ChannelObserver>) -> Result<(), ChannelError>;

    /// 注销推送观察者（幂等）
    fn stop_observing(&self) -> Result<(), ChannelError>;

    /// 存活探测
    ///
    /// `false` 表示已绑定的会话死亡（而非干净断开）。探测本身
    /// 不得阻塞。
    fn is_alive(&self) -> bool;

    /// 下发命令（发后不理）
    fn dispatch_command(&self, command: &Command) -> Result<(), ChannelError>;
}

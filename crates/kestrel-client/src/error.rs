//! 客户端层错误类型定义

use kestrel_channel::ChannelError;
use kestrel_properties::AttributeType;
use thiserror::Error;

/// 客户端层错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// 通道调用失败
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// 外观未启动（或调度器已关闭）
    #[error("Facade not started")]
    NotStarted,

    /// 底层连接管理进程未就绪
    ///
    /// `start()` 的致命前置违规，引擎不会内部重试。
    #[error("Connection manager not ready")]
    NotReady,

    /// 属性无值且无默认值（目前只有 CAMERA）
    #[error("Attribute {0:?} not available")]
    NotSupported(AttributeType),
}

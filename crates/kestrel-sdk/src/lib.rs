//! # Kestrel SDK
//!
//! 飞行器客户端统一入口：重新导出属性层、通道合约与核心引擎，
//! 并提供日志初始化工具。
//!
//! ## 快速上手
//!
//! ```no_run
//! use std::sync::Arc;
//! use kestrel_sdk::channel::RemoteChannel;
//! use kestrel_sdk::client::DroneBuilder;
//!
//! fn run(channel: Arc<dyn RemoteChannel>) {
//!     kestrel_sdk::init_logging();
//!
//!     let drone = DroneBuilder::new(channel).build();
//!     drone.start().expect("remote service not ready");
//!
//!     if let Some(value) =
//!         drone.get_attribute(kestrel_sdk::properties::AttributeType::Battery)
//!     {
//!         println!("battery: {value:?}");
//!     }
//! }
//! ```

/// 属性数据层
pub mod properties {
    pub use kestrel_properties::*;
}

/// 通道合约层
pub mod channel {
    pub use kestrel_channel::*;
}

/// 核心引擎层
pub mod client {
    pub use kestrel_client::*;
}

// 顶层直接导出最常用的类型
pub use kestrel_channel::{ChannelError, ConnectionParameter, RemoteChannel};
pub use kestrel_client::{
    ClientError, Drone, DroneBuilder, DroneEvent, DroneListener, EventLoopContext,
    NotificationContext,
};
pub use kestrel_properties::{AttributeEvent, AttributeType, AttributeValue, Command};

use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

/// 初始化日志（`RUST_LOG` 可覆盖，默认 `info`）
///
/// 同时安装 `log` 桥接，捕获依赖里基于 `log` 宏的输出。
/// 重复调用是 no-op（首次安装生效）。
pub fn init_logging() {
    init_logging_with_filter("info");
}

/// 以指定默认过滤串初始化日志
///
/// `RUST_LOG` 设置时以环境变量为准。
pub fn init_logging_with_filter(default_filter: &str) {
    // log -> tracing 桥接；已安装过则保持原样
    let _ = LogTracer::init();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok() {
        tracing::debug!("Kestrel logging initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_channel::MockChannel;
    use std::sync::Arc;

    #[test]
    fn test_init_logging_is_reentrant() {
        init_logging();
        // 第二次调用不 panic
        init_logging_with_filter("debug");
    }

    #[test]
    fn test_umbrella_reexports_compose() {
        // 通过顶层导出完成一次最小组装
        let channel = Arc::new(MockChannel::new());
        let drone = DroneBuilder::new(channel).build();
        assert!(!drone.is_active());
    }
}

//! # Kestrel Properties
//!
//! 飞行器属性数据层定义（无 I/O 依赖）
//!
//! ## 模块
//!
//! - `attribute`: 属性类型标识与带标签联合值
//! - `coordinate`: 坐标类型
//! - `event`: 属性更新事件标识
//! - `command`: 命令集定义
//! - `property`: 具体属性结构体与规范默认值
//!
//! ## 设计说明
//!
//! 远端服务返回的属性载荷是 JSON 字节流。本层通过一张按
//! [`AttributeType`] 封闭分发的静态解码表把载荷还原为
//! [`AttributeValue`]，不存在任何运行时类型查找。解码失败与
//! "远端无值"走同一条默认值路径，由上层（facade）决定如何呈现。

pub mod attribute;
pub mod command;
pub mod coordinate;
pub mod event;
pub mod property;

// 重新导出常用类型
pub use attribute::{AttributeType, AttributeValue};
pub use command::Command;
pub use coordinate::{LatLong, LatLongAlt};
pub use event::AttributeEvent;
pub use property::*;

use thiserror::Error;

/// 属性层错误类型
#[derive(Error, Debug)]
pub enum PropertyError {
    /// 载荷无法按属性类型解码
    #[error("Malformed {attribute:?} payload: {reason}")]
    Decode {
        attribute: AttributeType,
        reason: String,
    },

    /// 未知的属性线路 ID
    #[error("Unknown attribute id: {0:#06x}")]
    UnknownAttributeId(u16),

    /// 未知的事件线路 ID
    #[error("Unknown event id: {0:#06x}")]
    UnknownEventId(u16),
}

//! 属性更新事件标识
//!
//! 远端服务通过推送通道上报 `(事件 ID, 可选载荷)`。事件 ID 是
//! 编译期封闭的 u16 集合；多数事件关联一个被刷新的属性类型
//! （载荷即该属性的新值），少数事件只是信号，不携带属性。

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::PropertyError;
use crate::attribute::AttributeType;

/// 属性更新事件（线路 ID：u16）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive,
)]
#[repr(u16)]
pub enum AttributeEvent {
    // === 核心状态 ===
    StateUpdated = 0x0100,
    StateArming = 0x0101,
    StateConnected = 0x0102,
    StateDisconnected = 0x0103,
    StateVehicleMode = 0x0104,

    // === 定位 ===
    GpsPositionUpdated = 0x0110,
    GpsFixUpdated = 0x0111,
    GpsCountUpdated = 0x0112,
    HomeUpdated = 0x0113,

    // === 运动 ===
    AltitudeUpdated = 0x0120,
    SpeedUpdated = 0x0121,
    AttitudeUpdated = 0x0122,

    // === 链路与电源 ===
    BatteryUpdated = 0x0130,
    SignalUpdated = 0x0131,

    // === 任务与参数 ===
    MissionUpdated = 0x0140,
    ParameterReceived = 0x0141,
    ParametersRefreshed = 0x0142,

    // === 其他 ===
    TypeUpdated = 0x0150,
    GuidedPointUpdated = 0x0151,
    FollowStateUpdated = 0x0152,
    CameraUpdated = 0x0153,
}

impl AttributeEvent {
    /// 从线路 ID 解析事件
    pub fn from_wire(id: u16) -> Result<Self, PropertyError> {
        Self::try_from(id).map_err(|_| PropertyError::UnknownEventId(id))
    }

    /// 该事件刷新的属性类型
    ///
    /// 返回 `None` 的事件是纯信号（如 `StateDisconnected`），
    /// 不携带属性载荷。
    pub fn attribute(&self) -> Option<AttributeType> {
        match self {
            AttributeEvent::StateUpdated
            | AttributeEvent::StateArming
            | AttributeEvent::StateConnected
            | AttributeEvent::StateVehicleMode => Some(AttributeType::State),

            AttributeEvent::GpsPositionUpdated
            | AttributeEvent::GpsFixUpdated
            | AttributeEvent::GpsCountUpdated => Some(AttributeType::Gps),
            AttributeEvent::HomeUpdated => Some(AttributeType::Home),

            AttributeEvent::AltitudeUpdated => Some(AttributeType::Altitude),
            AttributeEvent::SpeedUpdated => Some(AttributeType::Speed),
            AttributeEvent::AttitudeUpdated => Some(AttributeType::Attitude),

            AttributeEvent::BatteryUpdated => Some(AttributeType::Battery),
            AttributeEvent::SignalUpdated => Some(AttributeType::Signal),

            AttributeEvent::MissionUpdated => Some(AttributeType::Mission),
            AttributeEvent::ParameterReceived | AttributeEvent::ParametersRefreshed => {
                Some(AttributeType::Parameters)
            },

            AttributeEvent::TypeUpdated => Some(AttributeType::Type),
            AttributeEvent::GuidedPointUpdated => Some(AttributeType::GuidedState),
            AttributeEvent::FollowStateUpdated => Some(AttributeType::FollowState),
            AttributeEvent::CameraUpdated => Some(AttributeType::Camera),

            // 断开是纯信号：没有"新值"可言
            AttributeEvent::StateDisconnected => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_roundtrip() {
        let events = [
            AttributeEvent::StateUpdated,
            AttributeEvent::SpeedUpdated,
            AttributeEvent::ParametersRefreshed,
            AttributeEvent::CameraUpdated,
        ];
        for event in events {
            let id: u16 = event.into();
            assert_eq!(AttributeEvent::from_wire(id).unwrap(), event);
        }
    }

    #[test]
    fn test_unknown_event_id_rejected() {
        assert!(matches!(
            AttributeEvent::from_wire(0x7FFF).unwrap_err(),
            PropertyError::UnknownEventId(0x7FFF)
        ));
    }

    #[test]
    fn test_event_attribute_mapping() {
        assert_eq!(
            AttributeEvent::SpeedUpdated.attribute(),
            Some(AttributeType::Speed)
        );
        assert_eq!(
            AttributeEvent::StateUpdated.attribute(),
            Some(AttributeType::State)
        );
        // 断开事件是纯信号
        assert_eq!(AttributeEvent::StateDisconnected.attribute(), None);
    }
}

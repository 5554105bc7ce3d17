//! 属性类型标识与带标签联合值
//!
//! [`AttributeType`] 是编译期封闭的属性标识集合；[`AttributeValue`]
//! 是对应的带标签联合。两者之间的解码与默认值查找都走静态匹配表，
//! 每个变体绑定唯一的解码函数。

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::de::DeserializeOwned;

use crate::PropertyError;
use crate::property::*;

/// 属性类型标识（线路 ID：u16）
///
/// # 注意
///
/// 这是一个封闭集合：远端上报的 ID 不在表内时按
/// [`PropertyError::UnknownAttributeId`] 拒绝，不存在动态注册。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive,
)]
#[repr(u16)]
pub enum AttributeType {
    Altitude = 0x0001,
    Attitude = 0x0002,
    Battery = 0x0003,
    Camera = 0x0004,
    FollowState = 0x0005,
    Gps = 0x0006,
    GuidedState = 0x0007,
    Home = 0x0008,
    Mission = 0x0009,
    Parameters = 0x000A,
    Signal = 0x000B,
    Speed = 0x000C,
    State = 0x000D,
    Type = 0x000E,
}

impl AttributeType {
    /// 全部属性类型（按线路 ID 排序）
    pub const ALL: [AttributeType; 14] = [
        AttributeType::Altitude,
        AttributeType::Attitude,
        AttributeType::Battery,
        AttributeType::Camera,
        AttributeType::FollowState,
        AttributeType::Gps,
        AttributeType::GuidedState,
        AttributeType::Home,
        AttributeType::Mission,
        AttributeType::Parameters,
        AttributeType::Signal,
        AttributeType::Speed,
        AttributeType::State,
        AttributeType::Type,
    ];

    /// 从线路 ID 解析属性类型
    pub fn from_wire(id: u16) -> Result<Self, PropertyError> {
        Self::try_from(id).map_err(|_| PropertyError::UnknownAttributeId(id))
    }

    /// 解码该类型的属性载荷
    ///
    /// 每个变体绑定唯一的解码函数（静态分发表）。载荷是 JSON 字节流。
    ///
    /// # 错误
    /// - `PropertyError::Decode`: 载荷不是该类型的合法编码
    pub fn decode(&self, payload: &[u8]) -> Result<AttributeValue, PropertyError> {
        fn parse<T: DeserializeOwned>(
            attribute: AttributeType,
            payload: &[u8],
        ) -> Result<T, PropertyError> {
            serde_json::from_slice(payload).map_err(|e| PropertyError::Decode {
                attribute,
                reason: e.to_string(),
            })
        }

        let value = match self {
            AttributeType::Altitude => AttributeValue::Altitude(parse(*self, payload)?),
            AttributeType::Attitude => AttributeValue::Attitude(parse(*self, payload)?),
            AttributeType::Battery => AttributeValue::Battery(parse(*self, payload)?),
            AttributeType::Camera => AttributeValue::Camera(parse(*self, payload)?),
            AttributeType::FollowState => AttributeValue::FollowState(parse(*self, payload)?),
            AttributeType::Gps => AttributeValue::Gps(parse(*self, payload)?),
            AttributeType::GuidedState => AttributeValue::GuidedState(parse(*self, payload)?),
            AttributeType::Home => AttributeValue::Home(parse(*self, payload)?),
            AttributeType::Mission => AttributeValue::Mission(parse(*self, payload)?),
            AttributeType::Parameters => AttributeValue::Parameters(parse(*self, payload)?),
            AttributeType::Signal => AttributeValue::Signal(parse(*self, payload)?),
            AttributeType::Speed => AttributeValue::Speed(parse(*self, payload)?),
            AttributeType::State => AttributeValue::State(parse(*self, payload)?),
            AttributeType::Type => AttributeValue::VehicleType(parse(*self, payload)?),
        };
        Ok(value)
    }

    /// 该类型的规范默认值
    ///
    /// CAMERA 没有默认值：缺席是合法状态（"不支持/未安装"），
    /// 返回 `None`。其余类型总能给出一个默认实例。
    pub fn default_value(&self) -> Option<AttributeValue> {
        let value = match self {
            AttributeType::Altitude => AttributeValue::Altitude(Altitude::default()),
            AttributeType::Attitude => AttributeValue::Attitude(Attitude::default()),
            AttributeType::Battery => AttributeValue::Battery(Battery::default()),
            AttributeType::Camera => return None,
            AttributeType::FollowState => AttributeValue::FollowState(FollowState::default()),
            AttributeType::Gps => AttributeValue::Gps(Gps::default()),
            AttributeType::GuidedState => AttributeValue::GuidedState(GuidedState::default()),
            AttributeType::Home => AttributeValue::Home(Home::default()),
            AttributeType::Mission => AttributeValue::Mission(Mission::default()),
            AttributeType::Parameters => AttributeValue::Parameters(Parameters::default()),
            AttributeType::Signal => AttributeValue::Signal(Signal::default()),
            AttributeType::Speed => AttributeValue::Speed(Speed::default()),
            AttributeType::State => AttributeValue::State(State::default()),
            AttributeType::Type => AttributeValue::VehicleType(VehicleType::default()),
        };
        Some(value)
    }
}

/// 属性值（带标签联合）
///
/// 每个变体对应一个具体属性结构体。`as_*` 访问器用于在已知
/// 期望类型时取出内部引用。
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Altitude(Altitude),
    Attitude(Attitude),
    Battery(Battery),
    Camera(Camera),
    FollowState(FollowState),
    Gps(Gps),
    GuidedState(GuidedState),
    Home(Home),
    Mission(Mission),
    Parameters(Parameters),
    Signal(Signal),
    Speed(Speed),
    State(State),
    VehicleType(VehicleType),
}

impl AttributeValue {
    /// 该值所属的属性类型
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            AttributeValue::Altitude(_) => AttributeType::Altitude,
            AttributeValue::Attitude(_) => AttributeType::Attitude,
            AttributeValue::Battery(_) => AttributeType::Battery,
            AttributeValue::Camera(_) => AttributeType::Camera,
            AttributeValue::FollowState(_) => AttributeType::FollowState,
            AttributeValue::Gps(_) => AttributeType::Gps,
            AttributeValue::GuidedState(_) => AttributeType::GuidedState,
            AttributeValue::Home(_) => AttributeType::Home,
            AttributeValue::Mission(_) => AttributeType::Mission,
            AttributeValue::Parameters(_) => AttributeType::Parameters,
            AttributeValue::Signal(_) => AttributeType::Signal,
            AttributeValue::Speed(_) => AttributeType::Speed,
            AttributeValue::State(_) => AttributeType::State,
            AttributeValue::VehicleType(_) => AttributeType::Type,
        }
    }

    /// 取高度引用
    pub fn as_altitude(&self) -> Option<&Altitude> {
        match self {
            AttributeValue::Altitude(v) => Some(v),
            _ => None,
        }
    }

    /// 取速度引用
    pub fn as_speed(&self) -> Option<&Speed> {
        match self {
            AttributeValue::Speed(v) => Some(v),
            _ => None,
        }
    }

    /// 取核心状态引用
    pub fn as_state(&self) -> Option<&State> {
        match self {
            AttributeValue::State(v) => Some(v),
            _ => None,
        }
    }

    /// 取 GPS 引用
    pub fn as_gps(&self) -> Option<&Gps> {
        match self {
            AttributeValue::Gps(v) => Some(v),
            _ => None,
        }
    }

    /// 取参数表引用
    pub fn as_parameters(&self) -> Option<&Parameters> {
        match self {
            AttributeValue::Parameters(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_id_roundtrip() {
        for attribute in AttributeType::ALL {
            let id: u16 = attribute.into();
            assert_eq!(AttributeType::from_wire(id).unwrap(), attribute);
        }
    }

    #[test]
    fn test_unknown_wire_id_rejected() {
        let err = AttributeType::from_wire(0x7FFF).unwrap_err();
        assert!(matches!(err, PropertyError::UnknownAttributeId(0x7FFF)));
    }

    #[test]
    fn test_default_value_total_except_camera() {
        for attribute in AttributeType::ALL {
            let default = attribute.default_value();
            if attribute == AttributeType::Camera {
                assert!(default.is_none());
            } else {
                // 默认值的标签必须与查询类型一致
                assert_eq!(default.unwrap().attribute_type(), attribute);
            }
        }
    }

    #[test]
    fn test_decode_speed_payload() {
        let payload =
            br#"{"vertical_speed":-4.0,"ground_speed":12.5,"air_speed":13.0}"#;
        let value = AttributeType::Speed.decode(payload).unwrap();

        let speed = value.as_speed().unwrap();
        assert_eq!(speed.vertical_speed, -4.0);
        assert_eq!(speed.ground_speed, 12.5);
    }

    #[test]
    fn test_decode_garbled_payload_is_error() {
        let err = AttributeType::Speed.decode(b"\xff\xfe not json").unwrap_err();
        assert!(matches!(
            err,
            PropertyError::Decode {
                attribute: AttributeType::Speed,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_wrong_shape_is_error() {
        // 合法 JSON 但不是 State 的形状
        let err = AttributeType::State.decode(b"[1,2,3]").unwrap_err();
        assert!(matches!(err, PropertyError::Decode { .. }));
    }

    #[test]
    fn test_camera_payload_still_decodable() {
        // CAMERA 无默认值，但远端有相机时载荷照常解码
        let payload = br#"{"vendor":"GoPro","model":"Hero4"}"#;
        let value = AttributeType::Camera.decode(payload).unwrap();
        assert_eq!(value.attribute_type(), AttributeType::Camera);
    }
}

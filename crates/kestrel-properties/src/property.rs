//! 飞行器属性结构体
//!
//! 每个属性对应远端服务暴露的一类飞行器状态快照。所有属性
//! （除 [`Camera`] 外）都有一个"规范默认实例"（`Default`），
//! 在远端无值或载荷损坏时由上层返回给调用方。
//!
//! # 设计说明
//!
//! - 属性是纯数据快照，跨线程按值传递（`Clone`）
//! - serde 派生用于载荷解码，字段名即线路字段名
//! - 读取辅助方法（如 [`State::is_flying`]）只做字段组合，不做 I/O

use serde::{Deserialize, Serialize};

use crate::coordinate::{LatLong, LatLongAlt};

// ============================================================
// 模式与枚举
// ============================================================

/// 飞行模式
///
/// 封闭集合；远端上报未知模式时解码为 [`VehicleMode::Unknown`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VehicleMode {
    #[default]
    Unknown,
    Stabilize,
    Acro,
    AltHold,
    Auto,
    Guided,
    Loiter,
    Rtl,
    Circle,
    Land,
    PosHold,
    Brake,
}

/// 跟随模式类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FollowType {
    #[default]
    Leash,
    Lead,
    Left,
    Right,
    Circle,
    Above,
}

/// 跟随功能运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FollowStatus {
    /// 无效（未连接或不支持）
    #[default]
    Invalid,
    /// 已停用
    Disabled,
    /// 已启用，等待定位
    Enabled,
    /// 正在跟随
    Running,
}

/// GPS 定位质量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GpsFixType {
    #[default]
    NoFix,
    Fix2D,
    Fix3D,
}

/// 引导模式运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GuidedStatus {
    #[default]
    Uninitialized,
    Idle,
    Active,
}

/// 机体类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VehicleKind {
    #[default]
    Unknown,
    Copter,
    Plane,
    Rover,
}

// ============================================================
// 属性结构体
// ============================================================

/// 高度状态
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Altitude {
    /// 当前相对高度（米）
    pub altitude: f64,
    /// 目标高度（米）
    pub target_altitude: f64,
}

/// 姿态状态（角度与角速度）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attitude {
    /// 横滚角（度）
    pub roll: f64,
    /// 俯仰角（度）
    pub pitch: f64,
    /// 偏航角（度）
    pub yaw: f64,
    /// 横滚角速度（度/秒）
    pub roll_rate: f64,
    /// 俯仰角速度（度/秒）
    pub pitch_rate: f64,
    /// 偏航角速度（度/秒）
    pub yaw_rate: f64,
}

/// 电池状态
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Battery {
    /// 电压（伏）
    pub voltage: f64,
    /// 剩余电量（百分比 0-100）
    pub remaining: f64,
    /// 电流（安）
    pub current: f64,
}

/// 相机信息
///
/// CAMERA 属性没有规范默认值：远端未接相机时该属性整体缺席，
/// 上层以 `None` 表达"不支持"，而不是返回一个全零的假相机。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    /// 厂商名
    pub vendor: String,
    /// 型号
    pub model: String,
}

/// 跟随功能状态
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FollowState {
    /// 运行状态
    pub status: FollowStatus,
    /// 跟随模式
    pub follow_type: FollowType,
    /// 跟随半径（米）
    pub radius: f64,
}

/// GPS 状态
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gps {
    /// 当前定位（无定位时为 `None`）
    pub position: Option<LatLong>,
    /// 定位质量
    pub fix_type: GpsFixType,
    /// 可见卫星数
    pub satellite_count: u8,
}

impl Gps {
    /// 是否有有效定位
    pub fn has_fix(&self) -> bool {
        self.fix_type != GpsFixType::NoFix && self.position.is_some()
    }
}

/// 引导模式状态
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GuidedState {
    /// 运行状态
    pub status: GuidedStatus,
    /// 当前引导目标点
    pub coordinate: Option<LatLongAlt>,
}

/// 返航点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Home {
    /// 返航点坐标（未设置时为 `None`）
    pub coordinate: Option<LatLongAlt>,
}

/// 任务状态
///
/// 仅作为不透明容器携带：航点几何的构建与校验属于任务协作方，
/// 不在本层展开。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mission {
    /// 当前执行到的航点序号
    pub current_item: u16,
    /// 航点列表
    pub waypoints: Vec<LatLongAlt>,
}

impl Mission {
    /// 航点数量
    pub fn item_count(&self) -> usize {
        self.waypoints.len()
    }
}

/// 单个飞控参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// 参数名（如 "WPNAV_SPEED"）
    pub name: String,
    /// 参数值
    pub value: f64,
}

impl Parameter {
    /// 创建参数
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// 飞控参数表
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Parameters {
    /// 参数列表
    pub parameters: Vec<Parameter>,
}

impl Parameters {
    /// 按名称查找参数
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// 数传链路信号质量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Signal {
    /// 数据是否有效
    pub valid: bool,
    /// 本地接收信号强度
    pub rssi: f64,
    /// 远端接收信号强度
    pub remrssi: f64,
    /// 本地底噪
    pub noise: f64,
    /// 远端底噪
    pub remnoise: f64,
    /// 本地衰落余量
    pub fade_margin: f64,
    /// 远端衰落余量
    pub rem_fade_margin: f64,
}

/// 速度状态
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Speed {
    /// 垂直速度（米/秒，向上为正）
    pub vertical_speed: f64,
    /// 地速（米/秒）
    pub ground_speed: f64,
    /// 空速（米/秒）
    pub air_speed: f64,
}

/// 飞行器核心状态
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct State {
    /// 遥测链路是否连通
    pub connected: bool,
    /// 是否已解锁
    pub armed: bool,
    /// 是否在飞行中
    pub flying: bool,
    /// 当前飞行模式
    pub vehicle_mode: VehicleMode,
    /// 当前校准过程消息（无校准时为 `None`）
    pub calibration_message: Option<String>,
    /// 飞控上报的错误标识（无错误时为 `None`）
    pub autopilot_error: Option<String>,
}

impl State {
    /// 是否在飞行中
    pub fn is_flying(&self) -> bool {
        self.flying
    }

    /// 是否连通
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

/// 机体类型信息
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleType {
    /// 机体类别
    pub kind: VehicleKind,
    /// 固件版本字符串（未知时为 `None`）
    pub firmware_version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_default_is_grounded() {
        let state = State::default();
        assert!(!state.is_flying());
        assert!(!state.is_connected());
        assert!(!state.armed);
        assert_eq!(state.vehicle_mode, VehicleMode::Unknown);
    }

    #[test]
    fn test_gps_has_fix_requires_position_and_fix_type() {
        let mut gps = Gps::default();
        assert!(!gps.has_fix());

        // 只有 fix_type 没有坐标：仍然无定位
        gps.fix_type = GpsFixType::Fix3D;
        assert!(!gps.has_fix());

        gps.position = Some(LatLong::new(37.0, -122.0));
        assert!(gps.has_fix());
    }

    #[test]
    fn test_parameters_lookup() {
        let params = Parameters {
            parameters: vec![
                Parameter::new("WPNAV_SPEED", 500.0),
                Parameter::new("RTL_ALT", 1500.0),
            ],
        };

        assert_eq!(params.get("WPNAV_SPEED").map(|p| p.value), Some(500.0));
        assert!(params.get("MISSING").is_none());
    }

    #[test]
    fn test_mission_item_count() {
        let mission = Mission {
            current_item: 0,
            waypoints: vec![
                LatLongAlt::new(1.0, 2.0, 10.0),
                LatLongAlt::new(1.1, 2.1, 10.0),
            ],
        };
        assert_eq!(mission.item_count(), 2);
    }

    #[test]
    fn test_property_payload_roundtrip() {
        // 属性通过 JSON 载荷跨边界传递，字段必须稳定可逆
        let speed = Speed {
            vertical_speed: -4.0,
            ground_speed: 12.5,
            air_speed: 13.0,
        };
        let payload = serde_json::to_vec(&speed).unwrap();
        let decoded: Speed = serde_json::from_slice(&payload).unwrap();
        assert_eq!(decoded, speed);
    }
}

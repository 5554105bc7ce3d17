//! 命令集定义
//!
//! 面向远端服务的"发后不理"命令集合。命令语义由飞行器侧实现，
//! 本层只负责封闭枚举与按名分发。

use serde::{Deserialize, Serialize};

use crate::coordinate::LatLong;
use crate::property::{FollowType, Mission, Parameters, VehicleMode};

/// 飞行器命令（发后不理）
///
/// # 注意
///
/// 命令执行结果不通过返回值上报：下发失败走通道中断通知路径，
/// 飞行器侧拒绝执行则体现在后续的属性更新里。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// 解锁/上锁
    Arm { arm: bool },
    /// 切换飞行模式
    ChangeVehicleMode { mode: VehicleMode },
    /// 引导模式起飞到指定高度（米）
    GuidedTakeoff { altitude: f64 },
    /// 飞向引导点
    SendGuidedPoint { point: LatLong, force: bool },
    /// 调整引导模式目标高度（米）
    SetGuidedAltitude { altitude: f64 },
    /// 设置引导模式速度向量（米/秒）
    SetGuidedVelocity { x: f64, y: f64, z: f64 },
    /// 启用跟随模式
    EnableFollowMe { follow_type: FollowType },
    /// 停用跟随模式
    DisableFollowMe,
    /// 设置跟随半径（米）
    SetFollowMeRadius { radius: f64 },
    /// 触发相机快门
    TriggerCamera,
    /// 电磁挂载抓取/释放
    EpmCommand { release: bool },
    /// 重新拉取全部飞控参数
    RefreshParameters,
    /// 写入飞控参数
    WriteParameters { parameters: Parameters },
    /// 下发任务
    SetMission {
        mission: Mission,
        push_to_vehicle: bool,
    },
    /// 从飞行器读取已存储的航点
    LoadWaypoints,
    /// 开始磁罗盘校准（各点为 [x, y, z] 采样）
    StartMagnetometerCalibration { points: Vec<[f64; 3]> },
    /// 中止磁罗盘校准
    StopMagnetometerCalibration,
    /// 开始 IMU 校准
    StartImuCalibration,
    /// IMU 校准步骤确认
    SendImuCalibrationAck { step: u8 },
}

impl Command {
    /// 命令的稳定名称（用于日志与远端分发）
    pub fn name(&self) -> &'static str {
        match self {
            Command::Arm { .. } => "arm",
            Command::ChangeVehicleMode { .. } => "change_vehicle_mode",
            Command::GuidedTakeoff { .. } => "guided_takeoff",
            Command::SendGuidedPoint { .. } => "send_guided_point",
            Command::SetGuidedAltitude { .. } => "set_guided_altitude",
            Command::SetGuidedVelocity { .. } => "set_guided_velocity",
            Command::EnableFollowMe { .. } => "enable_follow_me",
            Command::DisableFollowMe => "disable_follow_me",
            Command::SetFollowMeRadius { .. } => "set_follow_me_radius",
            Command::TriggerCamera => "trigger_camera",
            Command::EpmCommand { .. } => "epm_command",
            Command::RefreshParameters => "refresh_parameters",
            Command::WriteParameters { .. } => "write_parameters",
            Command::SetMission { .. } => "set_mission",
            Command::LoadWaypoints => "load_waypoints",
            Command::StartMagnetometerCalibration { .. } => "start_magnetometer_calibration",
            Command::StopMagnetometerCalibration => "stop_magnetometer_calibration",
            Command::StartImuCalibration => "start_imu_calibration",
            Command::SendImuCalibrationAck { .. } => "send_imu_calibration_ack",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names_are_stable() {
        assert_eq!(Command::Arm { arm: true }.name(), "arm");
        assert_eq!(Command::TriggerCamera.name(), "trigger_camera");
        assert_eq!(
            Command::SendGuidedPoint {
                point: LatLong::new(1.0, 2.0),
                force: false,
            }
            .name(),
            "send_guided_point"
        );
    }

    #[test]
    fn test_command_serializable() {
        // 命令经序列化跨进程边界传递
        let cmd = Command::GuidedTakeoff { altitude: 20.0 };
        let encoded = serde_json::to_vec(&cmd).unwrap();
        let decoded: Command = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded, cmd);
    }
}

//! 坐标类型
//!
//! 提供 2D/3D 地理坐标的统一抽象，属性与命令共用。

use serde::{Deserialize, Serialize};

/// 2D 地理坐标（纬度/经度，单位：度）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLong {
    /// 纬度（度）
    pub latitude: f64,
    /// 经度（度）
    pub longitude: f64,
}

impl LatLong {
    /// 创建 2D 坐标
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// 附加高度，升级为 3D 坐标
    pub fn with_altitude(self, altitude: f64) -> LatLongAlt {
        LatLongAlt {
            latitude: self.latitude,
            longitude: self.longitude,
            altitude,
        }
    }
}

/// 3D 地理坐标（纬度/经度/相对高度）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLongAlt {
    /// 纬度（度）
    pub latitude: f64,
    /// 经度（度）
    pub longitude: f64,
    /// 相对起飞点高度（米）
    pub altitude: f64,
}

impl LatLongAlt {
    /// 创建 3D 坐标
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// 丢弃高度，得到 2D 坐标
    pub fn as_2d(&self) -> LatLong {
        LatLong::new(self.latitude, self.longitude)
    }
}

impl From<LatLongAlt> for LatLong {
    fn from(value: LatLongAlt) -> Self {
        value.as_2d()
    }
}

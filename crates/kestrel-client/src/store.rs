//! 属性存取
//!
//! [`AttributeStore`] 维护"属性类型 → 最新推送值"的缓存，并承载
//! 解码-否则-默认的单一路径：通道无载荷与载荷损坏走同一条默认值
//! 分支，调用方在这一层分不出"未设置"与"不可用"（刻意为之）。
//!
//! # 共享纪律
//!
//! 缓存只由事件路由器在其互斥锁内写入（一次一个更新）；其他
//! 组件通过路由器读取，不直接持有本类型。

use std::collections::HashMap;

use kestrel_properties::{Altitude, AttributeType, AttributeValue, Speed, State};
use tracing::debug;

/// 属性缓存与默认值查找
pub struct AttributeStore {
    cached: HashMap<AttributeType, AttributeValue>,
}

impl AttributeStore {
    /// 创建空缓存
    pub fn new() -> Self {
        Self {
            cached: HashMap::new(),
        }
    }

    /// 解码-否则-默认的单一路径
    ///
    /// - 载荷解码成功 → 解码值
    /// - 载荷缺席或解码失败 → 该类型的规范默认值
    /// - CAMERA（无默认值）→ `None`，表示"不支持/未安装"
    ///
    /// 损坏的载荷绝不以"看似成功的半成品"形式泄漏出去。
    pub fn decode_or_default(
        attribute: AttributeType,
        payload: Option<&[u8]>,
    ) -> Option<AttributeValue> {
        match payload {
            Some(bytes) => match attribute.decode(bytes) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("Falling back to default: {e}");
                    attribute.default_value()
                },
            },
            None => attribute.default_value(),
        }
    }

    /// 以推送载荷更新缓存
    ///
    /// 解码失败时缓存被替换为类型默认值（不保留旧值）；CAMERA
    /// 解码失败则从缓存移除，缺席即其合法状态。
    pub fn update(&mut self, attribute: AttributeType, payload: Option<&[u8]>) {
        match Self::decode_or_default(attribute, payload) {
            Some(value) => {
                self.cached.insert(attribute, value);
            },
            None => {
                self.cached.remove(&attribute);
            },
        }
    }

    /// 读取缓存值
    pub fn cached(&self, attribute: AttributeType) -> Option<&AttributeValue> {
        self.cached.get(&attribute)
    }

    /// 清空缓存（新会话开始时调用）
    pub fn clear(&mut self) {
        self.cached.clear();
    }

    // === 衍生计算用的类型化读取（总查找：缓存值或默认值） ===

    /// 最新推送的速度（未推送过则为默认值）
    pub fn speed(&self) -> Speed {
        self.cached(AttributeType::Speed)
            .and_then(|v| v.as_speed().copied())
            .unwrap_or_default()
    }

    /// 最新推送的高度（未推送过则为默认值）
    pub fn altitude(&self) -> Altitude {
        self.cached(AttributeType::Altitude)
            .and_then(|v| v.as_altitude().copied())
            .unwrap_or_default()
    }

    /// 最新推送的核心状态（未推送过则为默认值）
    pub fn state(&self) -> State {
        self.cached(AttributeType::State)
            .and_then(|v| v.as_state().cloned())
            .unwrap_or_default()
    }
}

impl Default for AttributeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speed_payload(vertical: f64) -> Vec<u8> {
        serde_json::to_vec(&Speed {
            vertical_speed: vertical,
            ground_speed: 0.0,
            air_speed: 0.0,
        })
        .unwrap()
    }

    #[test]
    fn test_decode_or_default_with_valid_payload() {
        let payload = speed_payload(-2.5);
        let value =
            AttributeStore::decode_or_default(AttributeType::Speed, Some(&payload)).unwrap();
        assert_eq!(value.as_speed().unwrap().vertical_speed, -2.5);
    }

    #[test]
    fn test_decode_or_default_missing_payload() {
        let value = AttributeStore::decode_or_default(AttributeType::Speed, None).unwrap();
        assert_eq!(*value.as_speed().unwrap(), Speed::default());
    }

    #[test]
    fn test_decode_or_default_garbled_payload() {
        // 损坏载荷与缺席载荷走同一条默认值路径
        let value =
            AttributeStore::decode_or_default(AttributeType::Speed, Some(b"garbage")).unwrap();
        assert_eq!(*value.as_speed().unwrap(), Speed::default());
    }

    #[test]
    fn test_decode_or_default_camera_has_no_default() {
        assert!(AttributeStore::decode_or_default(AttributeType::Camera, None).is_none());
        assert!(
            AttributeStore::decode_or_default(AttributeType::Camera, Some(b"garbage")).is_none()
        );
    }

    #[test]
    fn test_update_caches_latest_value() {
        let mut store = AttributeStore::new();
        store.update(AttributeType::Speed, Some(&speed_payload(-4.0)));
        assert_eq!(store.speed().vertical_speed, -4.0);

        store.update(AttributeType::Speed, Some(&speed_payload(-1.0)));
        assert_eq!(store.speed().vertical_speed, -1.0);
    }

    #[test]
    fn test_update_decode_failure_replaces_with_default() {
        let mut store = AttributeStore::new();
        store.update(AttributeType::Speed, Some(&speed_payload(-4.0)));

        // 坏载荷覆盖旧值：回落到默认值而不是保留陈旧数据
        store.update(AttributeType::Speed, Some(b"garbage"));
        assert_eq!(store.speed(), Speed::default());
    }

    #[test]
    fn test_update_camera_failure_removes_entry() {
        let mut store = AttributeStore::new();
        store.update(
            AttributeType::Camera,
            Some(br#"{"vendor":"GoPro","model":"Hero4"}"#),
        );
        assert!(store.cached(AttributeType::Camera).is_some());

        store.update(AttributeType::Camera, Some(b"garbage"));
        assert!(store.cached(AttributeType::Camera).is_none());
    }

    #[test]
    fn test_typed_lookup_is_total() {
        // 从未推送过的类型也能给出确定答案（默认值）
        let store = AttributeStore::new();
        assert_eq!(store.speed(), Speed::default());
        assert_eq!(store.altitude(), Altitude::default());
        assert!(!store.state().is_flying());
    }

    #[test]
    fn test_clear() {
        let mut store = AttributeStore::new();
        store.update(AttributeType::Speed, None);
        store.clear();
        assert!(store.cached(AttributeType::Speed).is_none());
    }
}

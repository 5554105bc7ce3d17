//! Mock 通道实现
//!
//! 无真实传输的 [`RemoteChannel`] 实现，用于单元测试与集成测试：
//!
//! - 属性载荷按类型脚本化（`set_attribute` / `remove_attribute`）
//! - 就绪/存活开关可随时切换（模拟管理进程未就绪、通道死亡）
//! - 下发的命令全部记录，测试侧可取出断言
//! - 持有注册的观察者，测试侧可主动推送更新
//!
//! # 线程安全
//!
//! 全部内部状态由一把 `parking_lot::Mutex` 保护；推送方法在
//! 调用观察者回调前先释放锁，避免与引擎的回调处理互相持锁。

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use kestrel_properties::{AttributeEvent, AttributeType, Command};
use parking_lot::Mutex;

use crate::{
    ChannelError, ChannelObserver, ConnectionParameter, ConnectionResult, RemoteChannel,
};

/// 可脚本化的 Mock 通道
pub struct MockChannel {
    /// 脚本化的属性载荷
    attributes: Mutex<HashMap<AttributeType, Bytes>>,
    /// 已注册的观察者（重复注册以最后一次为准）
    observer: Mutex<Option<Arc<dyn ChannelObserver>>>,
    /// 记录的连接参数
    connect_calls: Mutex<Vec<ConnectionParameter>>,
    /// 记录的命令
    commands: Mutex<Vec<Command>>,
    /// 管理进程就绪开关
    ready: AtomicBool,
    /// 会话存活开关
    alive: AtomicBool,
    /// 全部通道调用直接失败的开关
    fail_calls: AtomicBool,
    /// 属性拉取人工延迟（模拟慢往返）
    fetch_delay: Mutex<Option<Duration>>,
    /// 属性拉取计数
    fetch_count: AtomicU64,
    /// 观察者注册计数
    observe_count: AtomicU64,
    /// 断开调用计数
    disconnect_count: AtomicU64,
}

impl MockChannel {
    /// 创建就绪且存活的 Mock 通道
    pub fn new() -> Self {
        Self {
            attributes: Mutex::new(HashMap::new()),
            observer: Mutex::new(None),
            connect_calls: Mutex::new(Vec::new()),
            commands: Mutex::new(Vec::new()),
            ready: AtomicBool::new(true),
            alive: AtomicBool::new(true),
            fail_calls: AtomicBool::new(false),
            fetch_delay: Mutex::new(None),
            fetch_count: AtomicU64::new(0),
            observe_count: AtomicU64::new(0),
            disconnect_count: AtomicU64::new(0),
        }
    }

    // ============================================================
    // 脚本控制
    // ============================================================

    /// 设置属性载荷
    pub fn set_attribute(&self, attribute: AttributeType, payload: impl Into<Bytes>) {
        self.attributes.lock().insert(attribute, payload.into());
    }

    /// 移除属性载荷（之后拉取返回 `Ok(None)`）
    pub fn remove_attribute(&self, attribute: AttributeType) {
        self.attributes.lock().remove(&attribute);
    }

    /// 切换管理进程就绪状态
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// 切换会话存活状态
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }

    /// 切换"全部调用失败"开关（模拟远端调用抛错）
    pub fn set_fail_calls(&self, fail: bool) {
        self.fail_calls.store(fail, Ordering::SeqCst);
    }

    /// 设置属性拉取的人工延迟（模拟慢往返；`None` 取消）
    pub fn set_fetch_delay(&self, delay: Option<Duration>) {
        *self.fetch_delay.lock() = delay;
    }

    // ============================================================
    // 推送（模拟远端主动通知）
    // ============================================================

    /// 向已注册的观察者推送属性更新
    pub fn push_update(&self, event: AttributeEvent, payload: Option<Bytes>) {
        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            observer.attribute_updated(event, payload);
        }
    }

    /// 向已注册的观察者推送连接失败
    pub fn push_connection_failed(&self, result: ConnectionResult) {
        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            observer.connection_failed(result);
        }
    }

    /// 推送通道死亡（同时翻转存活开关）
    pub fn push_channel_died(&self, reason: &str) {
        self.alive.store(false, Ordering::SeqCst);
        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            observer.channel_died(reason);
        }
    }

    // ============================================================
    // 断言辅助
    // ============================================================

    /// 取出已记录的命令（清空记录）
    pub fn take_commands(&self) -> Vec<Command> {
        std::mem::take(&mut *self.commands.lock())
    }

    /// 取出已记录的连接参数（清空记录）
    pub fn take_connect_calls(&self) -> Vec<ConnectionParameter> {
        std::mem::take(&mut *self.connect_calls.lock())
    }

    /// 是否仍持有观察者
    pub fn has_observer(&self) -> bool {
        self.observer.lock().is_some()
    }

    /// 属性拉取次数
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// 观察者注册次数
    pub fn observe_count(&self) -> u64 {
        self.observe_count.load(Ordering::SeqCst)
    }

    /// 断开调用次数
    pub fn disconnect_count(&self) -> u64 {
        self.disconnect_count.load(Ordering::SeqCst)
    }

    /// 统一的失败闸门
    fn gate(&self) -> Result<(), ChannelError> {
        if self.fail_calls.load(Ordering::SeqCst) {
            Err(ChannelError::unavailable("mock channel failure"))
        } else {
            Ok(())
        }
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteChannel for MockChannel {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn connect(&self, parameter: &ConnectionParameter) -> Result<(), ChannelError> {
        self.gate()?;
        self.connect_calls.lock().push(parameter.clone());
        Ok(())
    }

    fn disconnect(&self) -> Result<(), ChannelError> {
        self.gate()?;
        self.disconnect_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn fetch_attribute(&self, attribute: AttributeType) -> Result<Option<Bytes>, ChannelError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        self.gate()?;
        Ok(self.attributes.lock().get(&attribute).cloned())
    }

    fn observe_updates(&self, observer: Arc<dyn ChannelObserver>) -> Result<(), ChannelError> {
        self.gate()?;
        self.observe_count.fetch_add(1, Ordering::SeqCst);
        *self.observer.lock() = Some(observer);
        Ok(())
    }

    fn stop_observing(&self) -> Result<(), ChannelError> {
        self.gate()?;
        *self.observer.lock() = None;
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn dispatch_command(&self, command: &Command) -> Result<(), ChannelError> {
        self.gate()?;
        self.commands.lock().push(command.clone());
        Ok(())
    }
}

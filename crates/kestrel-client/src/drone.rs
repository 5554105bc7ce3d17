//! Drone 外观
//!
//! 对外的编排层：组合通道、调度器、路由器与监听者注册表，提供
//! 生命周期、属性读取（同步/异步）、命令透传与监听注册 API。
//!
//! # 线程模型
//!
//! - 同步读取与命令在调用线程上阻塞完成远端往返
//! - 异步读取经单工作线程调度器执行，结果投递到通知上下文
//! - 通道推送经事件路由器串行处理后扇出到监听者
//!
//! 外观自身所有方法取 `&self`，可放入 `Arc` 跨线程共享。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use kestrel_channel::{
    ChannelError, ChannelObserver, ConnectionParameter, ConnectionResult, RemoteChannel,
};
use kestrel_properties::{
    AttributeEvent, AttributeType, AttributeValue, Command, FollowType, LatLong, Mission,
    Parameters, VehicleMode,
};
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::dispatcher::AsyncDispatcher;
use crate::error::ClientError;
use crate::listener::{DroneListener, ListenerRegistry};
use crate::notifier::NotificationContext;
use crate::router::{EventRouter, LinkState};
use crate::store::AttributeStore;

/// 航点巡航速度参数名
pub const WAYPOINT_SPEED_PARAMETER: &str = "WPNAV_SPEED";

/// 连接句柄
///
/// 外观绑定到存活远端服务的不透明凭证，由外观独占持有：
/// `stop()` 或检测到通道死亡后失效。纪元号用于在投递时刻辨认
/// 并丢弃过期的异步结果。
#[derive(Debug)]
pub struct ConnectionHandle {
    epoch: u64,
}

impl ConnectionHandle {
    fn new(epoch: u64) -> Self {
        Self { epoch }
    }
}

/// 外观互斥状态
struct FacadeState {
    handle: Option<ConnectionHandle>,
    connection_parameter: Option<ConnectionParameter>,
}

/// 把通道推送桥接到路由器的观察者
struct RouterSink {
    router: Arc<EventRouter>,
}

impl ChannelObserver for RouterSink {
    fn attribute_updated(&self, event: AttributeEvent, payload: Option<bytes::Bytes>) {
        self.router.handle_attribute_update(event, payload.as_deref());
    }

    fn connection_failed(&self, result: ConnectionResult) {
        self.router.handle_connection_failed(result);
    }

    fn channel_died(&self, reason: &str) {
        self.router.report_interrupted(reason);
    }
}

/// 统一的通道失败处理
///
/// 记录错误并探测存活：探测失败才算通道死亡，交由路由器做
/// 恰好一次的中断通知。
fn report_channel_error(
    channel: &Arc<dyn RemoteChannel>,
    router: &Arc<EventRouter>,
    error: &ChannelError,
) {
    error!("Channel call failed: {error}");
    if !channel.is_alive() {
        router.report_interrupted(&error.to_string());
    }
}

/// 拉取一个属性并套用解码-否则-默认路径
///
/// 通道调用失败同样落到默认值（与原地读取语义一致）；只有
/// 无默认值的属性（CAMERA）以 `NotSupported` 失败。
fn fetch_attribute_value(
    channel: &Arc<dyn RemoteChannel>,
    router: &Arc<EventRouter>,
    attribute: AttributeType,
) -> Result<AttributeValue, ClientError> {
    let payload = match channel.fetch_attribute(attribute) {
        Ok(payload) => payload,
        Err(e) => {
            report_channel_error(channel, router, &e);
            None
        },
    };

    AttributeStore::decode_or_default(attribute, payload.as_deref())
        .ok_or(ClientError::NotSupported(attribute))
}

/// 发后不理的命令下发
fn dispatch_fire_and_forget(
    channel: &Arc<dyn RemoteChannel>,
    router: &Arc<EventRouter>,
    command: &Command,
) {
    if !router.is_active() {
        debug!("Dropping command `{}` on inactive facade", command.name());
        return;
    }
    if !channel.is_alive() {
        // 命令下发前探测到死亡：走恰好一次的中断通知，不下发
        router.report_interrupted("liveness probe failed");
        return;
    }

    debug!("Dispatching command `{}`", command.name());
    if let Err(e) = channel.dispatch_command(command) {
        report_channel_error(channel, router, &e);
    }
}

/// 飞行器客户端外观
pub struct Drone {
    channel: Arc<dyn RemoteChannel>,
    listeners: Arc<ListenerRegistry>,
    router: Arc<EventRouter>,
    dispatcher: AsyncDispatcher,
    state: Mutex<FacadeState>,
    /// 连接纪元：每次 start/stop 递增，在途结果按提交时纪元校验
    epoch: Arc<AtomicU64>,
}

impl Drone {
    /// 组装外观（通常经由 [`DroneBuilder`](crate::builder::DroneBuilder)）
    pub fn new(channel: Arc<dyn RemoteChannel>, context: Arc<dyn NotificationContext>) -> Self {
        let listeners = Arc::new(ListenerRegistry::new());
        let router = Arc::new(EventRouter::new(listeners.clone(), context.clone()));

        Self {
            channel,
            listeners,
            router,
            dispatcher: AsyncDispatcher::new(context),
            state: Mutex::new(FacadeState {
                handle: None,
                connection_parameter: None,
            }),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    // ============================================================
    // 生命周期
    // ============================================================

    /// 启动外观
    ///
    /// 注册通道观察者、启动调度器、计时器归零。已处于 Active
    /// 的外观上重复调用是 no-op（恰好一条连接、恰好一次归零）。
    ///
    /// # 错误
    /// - `ClientError::NotReady`: 底层连接管理进程未就绪（致命
    ///   前置违规，不重试）
    /// - `ClientError::Channel`: 注册观察者失败
    pub fn start(&self) -> Result<(), ClientError> {
        if !self.channel.is_ready() {
            return Err(ClientError::NotReady);
        }

        let mut state = self.state.lock();
        if state.handle.is_some() && self.router.is_active() && self.channel.is_alive() {
            debug!("start() on active facade is a no-op");
            return Ok(());
        }

        self.channel.observe_updates(Arc::new(RouterSink {
            router: self.router.clone(),
        }))?;
        self.dispatcher.start();

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        state.handle = Some(ConnectionHandle::new(epoch));
        self.router.activate();

        info!("Drone facade started (epoch {epoch})");
        Ok(())
    }

    /// 停止外观
    ///
    /// 注销通道观察者、停止接收新作业并放弃工作线程（在途调用
    /// 任其完成，其结果按纪元丢弃）。监听者注册表**不**清空，
    /// 其生命周期独立于连接。未启动时为 no-op。
    pub fn stop(&self) {
        let mut state = self.state.lock();
        let Some(handle) = state.handle.take() else {
            return;
        };

        if let Err(e) = self.channel.stop_observing() {
            debug!("stop_observing failed during stop(): {e}");
        }
        self.dispatcher.shutdown();
        // 使一切在途异步结果过期
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.router.deactivate();

        info!("Drone facade stopped (epoch {})", handle.epoch);
    }

    /// 外观是否处于可用状态
    ///
    /// 句柄在手、路由器 Active、且存活探测通过。每次调用都
    /// 重新探测；探测发现通道死亡时就地转入 Interrupted 并做
    /// 恰好一次的中断通知（之后的调用只是快速失败）。
    pub fn is_active(&self) -> bool {
        if self.state.lock().handle.is_none() {
            return false;
        }
        if !self.channel.is_alive() {
            self.router.report_interrupted("liveness probe failed");
            return false;
        }
        self.router.is_active()
    }

    /// 当前链路状态（诊断用）
    pub fn link_state(&self) -> LinkState {
        self.router.link_state()
    }

    // ============================================================
    // 属性读取
    // ============================================================

    /// 同步读取一个属性（阻塞调用线程完成远端往返）
    ///
    /// 远端无值、载荷损坏、通道调用失败、外观未启动，全部落到
    /// 该类型的规范默认值。返回 `None` 仅发生在无默认值的类型
    /// （CAMERA，表示"不支持/未安装"）。
    pub fn get_attribute(&self, attribute: AttributeType) -> Option<AttributeValue> {
        if !self.is_active() {
            return attribute.default_value();
        }
        fetch_attribute_value(&self.channel, &self.router, attribute).ok()
    }

    /// 异步读取一个属性
    ///
    /// 不阻塞调用线程：入队即返回。提交成功后回调恰好调用一次
    /// （成功或失败），在通知上下文上执行；外观未启动时立即在
    /// 当前线程以 `NotStarted` 失败。`stop()` 之后才送达的过期
    /// 结果被丢弃。
    pub fn get_attribute_async<C>(&self, attribute: AttributeType, callback: C)
    where
        C: FnOnce(Result<AttributeValue, ClientError>) + Send + 'static,
    {
        if !self.is_active() {
            callback(Err(ClientError::NotStarted));
            return;
        }

        let channel = self.channel.clone();
        let router = self.router.clone();
        let epoch = self.epoch.clone();
        let submitted_epoch = epoch.load(Ordering::SeqCst);

        self.dispatcher.submit(
            move || fetch_attribute_value(&channel, &router, attribute),
            move |result| {
                if epoch.load(Ordering::SeqCst) != submitted_epoch {
                    debug!("Discarding stale async result for {attribute:?}");
                    return;
                }
                callback(result);
            },
        );
    }

    /// 读取航点巡航速度参数（`WPNAV_SPEED`，缺省 0.0）
    pub fn speed_parameter(&self) -> f64 {
        self.get_attribute(AttributeType::Parameters)
            .and_then(|value| {
                value
                    .as_parameters()
                    .and_then(|params| params.get(WAYPOINT_SPEED_PARAMETER))
                    .map(|param| param.value)
            })
            .unwrap_or(0.0)
    }

    // ============================================================
    // 飞行器链路
    // ============================================================

    /// 请求远端建立飞行器链路
    pub fn connect(&self, parameter: ConnectionParameter) {
        if !self.is_active() {
            debug!("connect() ignored on inactive facade");
            return;
        }
        match self.channel.connect(&parameter) {
            Ok(()) => {
                self.state.lock().connection_parameter = Some(parameter);
            },
            Err(e) => self.handle_channel_error(&e),
        }
    }

    /// 请求远端断开飞行器链路
    pub fn disconnect(&self) {
        if !self.is_active() {
            return;
        }
        match self.channel.disconnect() {
            Ok(()) => {
                self.state.lock().connection_parameter = None;
            },
            Err(e) => self.handle_channel_error(&e),
        }
    }

    /// 最近一次成功 `connect()` 的参数
    pub fn connection_parameter(&self) -> Option<ConnectionParameter> {
        self.state.lock().connection_parameter.clone()
    }

    /// 遥测链路是否连通（外观可用且 STATE 上报已连接）
    pub fn is_connected(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.get_attribute(AttributeType::State) {
            Some(AttributeValue::State(state)) => state.is_connected(),
            _ => false,
        }
    }

    // ============================================================
    // 飞行计时
    // ============================================================

    /// 累计飞行秒数（向下取整）
    pub fn get_flight_time(&self) -> u64 {
        self.router.flight_time_secs()
    }

    /// 飞行计时归零
    pub fn reset_flight_timer(&self) {
        self.router.reset_flight_timer();
    }

    /// 飞行计时折算冻结
    pub fn stop_flight_timer(&self) {
        self.router.stop_flight_timer();
    }

    // ============================================================
    // 监听注册
    // ============================================================

    /// 注册监听者（重复注册同一实例为 no-op）
    pub fn register_drone_listener(&self, listener: Arc<dyn DroneListener>) {
        self.listeners.add(listener);
    }

    /// 注销监听者
    pub fn unregister_drone_listener(&self, listener: &Arc<dyn DroneListener>) {
        self.listeners.remove(listener);
    }

    // ============================================================
    // 命令透传（发后不理）
    // ============================================================

    /// 下发一条命令
    ///
    /// 外观未启动时静默丢弃；下发失败不经返回值上报，通过
    /// `on_service_interrupted` 通知（若探测确认通道死亡）。
    pub fn send_command(&self, command: Command) {
        dispatch_fire_and_forget(&self.channel, &self.router, &command);
    }

    /// 解锁/上锁
    pub fn arm(&self, arm: bool) {
        self.send_command(Command::Arm { arm });
    }

    /// 切换飞行模式
    pub fn change_vehicle_mode(&self, mode: VehicleMode) {
        self.send_command(Command::ChangeVehicleMode { mode });
    }

    /// 引导模式起飞
    pub fn do_guided_takeoff(&self, altitude: f64) {
        self.send_command(Command::GuidedTakeoff { altitude });
    }

    /// 飞向引导点
    pub fn send_guided_point(&self, point: LatLong, force: bool) {
        self.send_command(Command::SendGuidedPoint { point, force });
    }

    /// 调整引导模式目标高度
    pub fn set_guided_altitude(&self, altitude: f64) {
        self.send_command(Command::SetGuidedAltitude { altitude });
    }

    /// 设置引导模式速度向量
    pub fn set_guided_velocity(&self, x: f64, y: f64, z: f64) {
        self.send_command(Command::SetGuidedVelocity { x, y, z });
    }

    /// 启用跟随模式
    pub fn enable_follow_me(&self, follow_type: FollowType) {
        self.send_command(Command::EnableFollowMe { follow_type });
    }

    /// 停用跟随模式
    pub fn disable_follow_me(&self) {
        self.send_command(Command::DisableFollowMe);
    }

    /// 设置跟随半径
    pub fn set_follow_me_radius(&self, radius: f64) {
        self.send_command(Command::SetFollowMeRadius { radius });
    }

    /// 触发相机快门
    pub fn trigger_camera(&self) {
        self.send_command(Command::TriggerCamera);
    }

    /// 电磁挂载抓取/释放
    pub fn epm_command(&self, release: bool) {
        self.send_command(Command::EpmCommand { release });
    }

    /// 重新拉取全部飞控参数
    pub fn refresh_parameters(&self) {
        self.send_command(Command::RefreshParameters);
    }

    /// 写入飞控参数
    pub fn write_parameters(&self, parameters: Parameters) {
        self.send_command(Command::WriteParameters { parameters });
    }

    /// 下发任务
    pub fn set_mission(&self, mission: Mission, push_to_vehicle: bool) {
        self.send_command(Command::SetMission {
            mission,
            push_to_vehicle,
        });
    }

    /// 从飞行器读取已存储的航点
    pub fn load_waypoints(&self) {
        self.send_command(Command::LoadWaypoints);
    }

    /// 开始磁罗盘校准
    pub fn start_magnetometer_calibration(&self, points: Vec<[f64; 3]>) {
        self.send_command(Command::StartMagnetometerCalibration { points });
    }

    /// 中止磁罗盘校准
    pub fn stop_magnetometer_calibration(&self) {
        self.send_command(Command::StopMagnetometerCalibration);
    }

    /// 开始 IMU 校准
    pub fn start_imu_calibration(&self) {
        self.send_command(Command::StartImuCalibration);
    }

    /// IMU 校准步骤确认
    pub fn send_imu_calibration_ack(&self, step: u8) {
        self.send_command(Command::SendImuCalibrationAck { step });
    }

    /// 在当前位置悬停
    ///
    /// 异步取一次 GPS，定位有效则强制下发引导点。走完整的
    /// 调度器 → 通知上下文 → 命令透传链路。
    pub fn pause_at_current_location(&self) {
        let channel = self.channel.clone();
        let router = self.router.clone();

        self.get_attribute_async(AttributeType::Gps, move |result| {
            if let Ok(value) = result
                && let Some(gps) = value.as_gps()
                && let Some(position) = gps.position
            {
                dispatch_fire_and_forget(
                    &channel,
                    &router,
                    &Command::SendGuidedPoint {
                        point: position,
                        force: true,
                    },
                );
            }
        });
    }

    /// 统一的通道失败处理（成员版本）
    fn handle_channel_error(&self, error: &ChannelError) {
        report_channel_error(&self.channel, &self.router, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::ImmediateContext;
    use kestrel_channel::MockChannel;
    use kestrel_properties::Speed;

    fn drone_on(mock: &Arc<MockChannel>) -> Drone {
        Drone::new(mock.clone(), Arc::new(ImmediateContext))
    }

    #[test]
    fn test_start_requires_ready_manager() {
        let mock = Arc::new(MockChannel::new());
        mock.set_ready(false);
        let drone = drone_on(&mock);

        assert!(matches!(drone.start(), Err(ClientError::NotReady)));
        assert!(!drone.is_active());
    }

    #[test]
    fn test_start_is_idempotent() {
        let mock = Arc::new(MockChannel::new());
        let drone = drone_on(&mock);

        drone.start().unwrap();
        drone.start().unwrap();

        // 恰好一次观察者注册
        assert_eq!(mock.observe_count(), 1);
        assert!(drone.is_active());
    }

    #[test]
    fn test_stop_unregisters_but_keeps_listeners() {
        let mock = Arc::new(MockChannel::new());
        let drone = drone_on(&mock);

        struct Quiet;
        impl DroneListener for Quiet {
            fn on_event(&self, _event: &crate::listener::DroneEvent) {}
        }
        let listener: Arc<dyn DroneListener> = Arc::new(Quiet);
        drone.register_drone_listener(listener.clone());

        drone.start().unwrap();
        drone.stop();

        assert!(!mock.has_observer());
        assert!(!drone.is_active());
        // 监听者注册表生命周期独立于连接
        assert_eq!(drone.listeners.len(), 1);
    }

    #[test]
    fn test_get_attribute_inactive_returns_default() {
        let mock = Arc::new(MockChannel::new());
        let drone = drone_on(&mock);

        let value = drone.get_attribute(AttributeType::Speed).unwrap();
        assert_eq!(*value.as_speed().unwrap(), Speed::default());
        // 未启动：不触发通道调用
        assert_eq!(mock.fetch_count(), 0);
    }

    #[test]
    fn test_get_attribute_camera_inactive_is_none() {
        let mock = Arc::new(MockChannel::new());
        let drone = drone_on(&mock);
        assert!(drone.get_attribute(AttributeType::Camera).is_none());
    }

    #[test]
    fn test_get_attribute_fetches_and_decodes() {
        let mock = Arc::new(MockChannel::new());
        mock.set_attribute(
            AttributeType::Speed,
            serde_json::to_vec(&Speed {
                vertical_speed: -1.5,
                ground_speed: 8.0,
                air_speed: 8.5,
            })
            .unwrap(),
        );
        let drone = drone_on(&mock);
        drone.start().unwrap();

        let value = drone.get_attribute(AttributeType::Speed).unwrap();
        assert_eq!(value.as_speed().unwrap().vertical_speed, -1.5);
    }

    #[test]
    fn test_commands_noop_when_inactive() {
        let mock = Arc::new(MockChannel::new());
        let drone = drone_on(&mock);

        drone.arm(true);
        drone.trigger_camera();
        assert!(mock.take_commands().is_empty());
    }

    #[test]
    fn test_command_passthrough_when_active() {
        let mock = Arc::new(MockChannel::new());
        let drone = drone_on(&mock);
        drone.start().unwrap();

        drone.arm(true);
        drone.change_vehicle_mode(VehicleMode::Guided);
        drone.do_guided_takeoff(20.0);

        let commands = mock.take_commands();
        assert_eq!(
            commands,
            vec![
                Command::Arm { arm: true },
                Command::ChangeVehicleMode {
                    mode: VehicleMode::Guided,
                },
                Command::GuidedTakeoff { altitude: 20.0 },
            ]
        );
    }

    #[test]
    fn test_connect_records_parameter() {
        let mock = Arc::new(MockChannel::new());
        let drone = drone_on(&mock);
        drone.start().unwrap();

        drone.connect(ConnectionParameter::udp(14550));
        assert_eq!(
            drone.connection_parameter(),
            Some(ConnectionParameter::udp(14550))
        );

        drone.disconnect();
        assert!(drone.connection_parameter().is_none());
        assert_eq!(mock.disconnect_count(), 1);
    }

    #[test]
    fn test_speed_parameter_lookup() {
        use kestrel_properties::{Parameter, Parameters};

        let mock = Arc::new(MockChannel::new());
        mock.set_attribute(
            AttributeType::Parameters,
            serde_json::to_vec(&Parameters {
                parameters: vec![Parameter::new(WAYPOINT_SPEED_PARAMETER, 550.0)],
            })
            .unwrap(),
        );
        let drone = drone_on(&mock);
        drone.start().unwrap();

        assert_eq!(drone.speed_parameter(), 550.0);
    }

    #[test]
    fn test_speed_parameter_defaults_to_zero() {
        let mock = Arc::new(MockChannel::new());
        let drone = drone_on(&mock);
        drone.start().unwrap();
        // 远端无参数表 → 默认空表 → 0.0
        assert_eq!(drone.speed_parameter(), 0.0);
    }
}

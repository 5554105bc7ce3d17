//! 飞行计时
//!
//! 由事件路由器随 STATE 更新驱动的单调计时器：飞行中按检查点
//! 折算累计时长，落地后冻结。累计值单调不减，读取不产生状态
//! 变化。
//!
//! 带 `_at` 后缀的变体接受显式时间点，供路由器传播同一个
//! `Instant` 以及测试注入合成时间。

use std::time::{Duration, Instant};

/// 飞行计时器状态
///
/// {累计时长, 最近检查点, 是否在飞}。只由事件路由器在其锁内
/// 变更。
#[derive(Debug, Clone)]
pub struct FlightTimer {
    /// 已折算的累计飞行时长
    accumulated: Duration,
    /// 最近一次检查点
    baseline: Instant,
    /// 最近一次 STATE 上报是否在飞
    flying: bool,
}

impl FlightTimer {
    /// 创建停表状态的计时器
    pub fn new() -> Self {
        Self {
            accumulated: Duration::ZERO,
            baseline: Instant::now(),
            flying: false,
        }
    }

    /// 归零并重新基线（`start()` 时调用）
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub(crate) fn reset_at(&mut self, now: Instant) {
        self.accumulated = Duration::ZERO;
        self.baseline = now;
        self.flying = false;
    }

    /// 处理一次 STATE 更新
    ///
    /// 在飞：把上个检查点以来的时长折入累计，基线移到现在，
    /// 继续累计；落地：折算后冻结。
    pub fn on_state_update(&mut self, flying: bool) {
        self.on_state_update_at(flying, Instant::now());
    }

    pub(crate) fn on_state_update_at(&mut self, flying: bool, now: Instant) {
        if self.flying {
            self.accumulated += now.saturating_duration_since(self.baseline);
        }
        self.baseline = now;
        self.flying = flying;
    }

    /// 折算并冻结（显式停表）
    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    pub(crate) fn stop_at(&mut self, now: Instant) {
        self.on_state_update_at(false, now);
    }

    /// 当前累计飞行时长（读取不变更状态）
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub(crate) fn elapsed_at(&self, now: Instant) -> Duration {
        if self.flying {
            self.accumulated + now.saturating_duration_since(self.baseline)
        } else {
            self.accumulated
        }
    }

    /// 累计飞行秒数（向下取整）
    pub fn flight_time_secs(&self) -> u64 {
        self.elapsed().as_secs()
    }

    /// 最近一次 STATE 上报是否在飞
    pub fn is_flying(&self) -> bool {
        self.flying
    }
}

impl Default for FlightTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_timer_reads_zero() {
        let timer = FlightTimer::new();
        assert_eq!(timer.elapsed(), Duration::ZERO);
        assert_eq!(timer.flight_time_secs(), 0);
        assert!(!timer.is_flying());
    }

    #[test]
    fn test_ten_seconds_of_flight() {
        // t=0 起飞，t=10s 落地：计 10 秒
        let t0 = Instant::now();
        let mut timer = FlightTimer::new();
        timer.reset_at(t0);

        timer.on_state_update_at(true, t0);
        timer.on_state_update_at(false, t0 + Duration::from_secs(10));

        assert_eq!(timer.flight_time_secs(), 10);
        // 冻结后不再增长
        assert_eq!(timer.elapsed_at(t0 + Duration::from_secs(60)), Duration::from_secs(10));
    }

    #[test]
    fn test_pre_flight_idle_time_excluded() {
        let t0 = Instant::now();
        let mut timer = FlightTimer::new();
        timer.reset_at(t0);

        // 地面待机 5 秒后才起飞
        timer.on_state_update_at(true, t0 + Duration::from_secs(5));
        timer.on_state_update_at(false, t0 + Duration::from_secs(8));

        assert_eq!(timer.flight_time_secs(), 3);
    }

    #[test]
    fn test_repeated_flying_updates_accumulate() {
        let t0 = Instant::now();
        let mut timer = FlightTimer::new();
        timer.reset_at(t0);

        // 飞行中每次 STATE 更新都是一个检查点：基线前移，累计保留
        timer.on_state_update_at(true, t0);
        timer.on_state_update_at(true, t0 + Duration::from_secs(4));
        timer.on_state_update_at(true, t0 + Duration::from_secs(7));

        assert_eq!(
            timer.elapsed_at(t0 + Duration::from_secs(9)),
            Duration::from_secs(9)
        );
    }

    #[test]
    fn test_truncates_to_whole_seconds() {
        let t0 = Instant::now();
        let mut timer = FlightTimer::new();
        timer.reset_at(t0);

        timer.on_state_update_at(true, t0);
        timer.stop_at(t0 + Duration::from_millis(10_900));

        // 10.9s 向下取整为 10
        assert_eq!(timer.flight_time_secs(), 10);
    }

    #[test]
    fn test_reset_clears_accumulated() {
        let t0 = Instant::now();
        let mut timer = FlightTimer::new();
        timer.reset_at(t0);
        timer.on_state_update_at(true, t0);
        timer.stop_at(t0 + Duration::from_secs(10));

        timer.reset_at(t0 + Duration::from_secs(20));
        assert_eq!(timer.elapsed_at(t0 + Duration::from_secs(30)), Duration::ZERO);
    }

    #[test]
    fn test_live_reading_while_flying() {
        let t0 = Instant::now();
        let mut timer = FlightTimer::new();
        timer.reset_at(t0);
        timer.on_state_update_at(true, t0);

        // 飞行中读取包含进行中的区段，且读取不改变状态
        assert_eq!(
            timer.elapsed_at(t0 + Duration::from_secs(6)),
            Duration::from_secs(6)
        );
        assert_eq!(
            timer.elapsed_at(t0 + Duration::from_secs(6)),
            Duration::from_secs(6)
        );
    }

    #[test]
    fn test_monotonic_accumulation() {
        let t0 = Instant::now();
        let mut timer = FlightTimer::new();
        timer.reset_at(t0);
        timer.on_state_update_at(true, t0);

        let mut previous = Duration::ZERO;
        for secs in 1..10 {
            let reading = timer.elapsed_at(t0 + Duration::from_secs(secs));
            assert!(reading >= previous);
            previous = reading;
        }
    }
}

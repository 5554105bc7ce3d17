//! 通知上下文
//!
//! 所有监听者回调与异步结果都必须投递到"指定通知上下文"，即
//! 一个单线程执行环境（对应 UI 线程或应用事件循环）。本模块
//! 定义该上下文的抽象，并提供两个实现：
//!
//! - [`EventLoopContext`]: 自带专用线程的 FIFO 事件循环（默认）
//! - [`ImmediateContext`]: 在调用线程上直接执行（要求调用方
//!   可重入；主要用于测试或嵌入已有事件循环）

use std::thread::spawn;

use crossbeam_channel::{Sender, unbounded};
use tracing::{trace, warn};

/// 投递到通知上下文的任务
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// 通知上下文抽象
///
/// # 约定
///
/// - `post` 不得阻塞调用线程
/// - 任务按投递顺序串行执行（单线程语义）
pub trait NotificationContext: Send + Sync {
    /// 投递一个任务
    fn post(&self, task: Task);
}

/// 自带线程的事件循环上下文
///
/// 创建时启动一个专用线程，按 FIFO 顺序执行投递的任务。
/// 句柄析构后队列关闭，线程排空剩余任务后自行退出（不 join，
/// 正在执行的任务不被打断）。
pub struct EventLoopContext {
    tx: Sender<Task>,
}

impl EventLoopContext {
    /// 创建事件循环上下文并启动其线程
    pub fn new() -> Self {
        let (tx, rx) = unbounded::<Task>();
        spawn(move || {
            while let Ok(task) = rx.recv() {
                task();
            }
            trace!("Notification loop exiting");
        });
        Self { tx }
    }
}

impl Default for EventLoopContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationContext for EventLoopContext {
    fn post(&self, task: Task) {
        // 发送失败意味着循环线程已退出；任务只能丢弃
        if self.tx.send(task).is_err() {
            warn!("Notification loop gone, dropping task");
        }
    }
}

/// 直接执行上下文
///
/// `post` 在调用线程上同步执行任务。仅当调用方自身就是
/// 单线程通知环境（可重入安全）时使用。
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateContext;

impl NotificationContext for ImmediateContext {
    fn post(&self, task: Task) {
        task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_event_loop_runs_tasks_in_order() {
        let context = EventLoopContext::new();
        let (done_tx, done_rx) = crossbeam_channel::unbounded::<usize>();

        for i in 0..16 {
            let done_tx = done_tx.clone();
            context.post(Box::new(move || {
                let _ = done_tx.send(i);
            }));
        }

        // FIFO：任务按投递顺序完成
        for expected in 0..16 {
            let got = done_rx
                .recv_timeout(Duration::from_secs(1))
                .expect("task not delivered");
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_event_loop_single_thread() {
        let context = EventLoopContext::new();
        let (done_tx, done_rx) = crossbeam_channel::bounded::<std::thread::ThreadId>(2);

        for _ in 0..2 {
            let done_tx = done_tx.clone();
            context.post(Box::new(move || {
                let _ = done_tx.send(std::thread::current().id());
            }));
        }

        let first = done_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        let second = done_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        // 全部任务在同一条线程上执行，且不是投递线程
        assert_eq!(first, second);
        assert_ne!(first, std::thread::current().id());
    }

    #[test]
    fn test_immediate_context_runs_inline() {
        let counter = Arc::new(AtomicUsize::new(0));
        let context = ImmediateContext;

        let counter_clone = counter.clone();
        context.post(Box::new(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        }));

        // 同步执行：post 返回时任务已完成
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_drains_pending_tasks() {
        let (done_tx, done_rx) = crossbeam_channel::unbounded::<u32>();

        {
            let context = EventLoopContext::new();
            for i in 0..4 {
                let done_tx = done_tx.clone();
                context.post(Box::new(move || {
                    let _ = done_tx.send(i);
                }));
            }
            // 句柄在任务执行前析构
        }

        // 循环线程先排空队列再退出
        for expected in 0..4 {
            assert_eq!(
                done_rx.recv_timeout(Duration::from_secs(1)).unwrap(),
                expected
            );
        }
    }
}

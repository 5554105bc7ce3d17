//! 异步调度器
//!
//! 所有阻塞的远端调用都通过一条单工作线程的后台执行道串行化：
//! 提交顺序即执行顺序（FIFO），任意时刻至多一个远端调用在途。
//! 这是刻意的简化：引擎保证的是远端调用的有序与互斥，不是
//! 吞吐量；一个被阻塞的操作会推迟其后提交的全部操作。
//!
//! 操作结果（成功或失败）一律投递到通知上下文，绝不在工作线程
//! 上回调，调用方的监听代码因此永远观察不到跨线程竞争。

use std::sync::Arc;
use std::thread::spawn;

use crossbeam_channel::{Sender, unbounded};
use parking_lot::Mutex;
use tracing::{debug, error, trace};

use crate::error::ClientError;
use crate::notifier::NotificationContext;

/// 工作线程执行的作业
type Job = Box<dyn FnOnce() + Send + 'static>;

/// 单工作线程异步调度器
///
/// # 生命周期
///
/// - `start()`: 启动工作线程（幂等）
/// - `shutdown()`: 停止接收新作业并放弃工作线程（不 join、
///   不打断在途调用；工作线程排空队列后自行退出
/// - 关闭后可再次 `start()`（对应外观的 stop/start 循环）
pub struct AsyncDispatcher {
    /// 通知上下文（结果投递目标）
    context: Arc<dyn NotificationContext>,
    /// 作业队列发送端；`None` 表示未启动或已关闭
    tx: Mutex<Option<Sender<Job>>>,
}

impl AsyncDispatcher {
    /// 创建调度器（未启动状态）
    pub fn new(context: Arc<dyn NotificationContext>) -> Self {
        Self {
            context,
            tx: Mutex::new(None),
        }
    }

    /// 启动工作线程（已启动时为 no-op）
    pub fn start(&self) {
        let mut guard = self.tx.lock();
        if guard.is_some() {
            return;
        }

        let (tx, rx) = unbounded::<Job>();
        spawn(move || {
            while let Ok(job) = rx.recv() {
                job();
            }
            trace!("Dispatcher worker exiting");
        });
        *guard = Some(tx);
    }

    /// 是否正在运行
    pub fn is_running(&self) -> bool {
        self.tx.lock().is_some()
    }

    /// 停止接收新作业
    ///
    /// 丢弃发送端；工作线程排空已入队的作业后因通道断开退出。
    /// 在途作业照常完成，其结果是否投递由上层的纪元检查决定。
    pub fn shutdown(&self) {
        if self.tx.lock().take().is_some() {
            debug!("Dispatcher shut down");
        }
    }

    /// 提交一个操作
    ///
    /// - 调度器在运行：`operation` 在工作线程上按 FIFO 执行，
    ///   完成后 `callback(result)` 投递到通知上下文
    /// - 调度器已关闭：`callback(Err(NotStarted))` 在当前线程
    ///   同步执行（不经过上下文），绝不静默丢弃
    ///
    /// 两条路径合计：提交一次，回调恰好一次。
    pub fn submit<T, F, C>(&self, operation: F, callback: C)
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, ClientError> + Send + 'static,
        C: FnOnce(Result<T, ClientError>) + Send + 'static,
    {
        let guard = self.tx.lock();
        let Some(tx) = guard.as_ref() else {
            drop(guard);
            callback(Err(ClientError::NotStarted));
            return;
        };

        let context = self.context.clone();
        let job: Job = Box::new(move || {
            let result = operation();
            context.post(Box::new(move || callback(result)));
        });

        // 发送端在手里时接收端必然存活；失败只会发生在工作线程
        // 异常死亡的极端情况下
        if tx.send(job).is_err() {
            error!("Dispatcher worker gone, operation dropped");
        }
    }
}

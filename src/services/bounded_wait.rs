//! 限时轮询 - 业务能力层
//!
//! 按固定间隔反复检查某个条件，直到条件成立或超时

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

/// 限时轮询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    /// 条件成立
    Found(T),
    /// 超时仍未成立
    TimedOut,
}

/// 轮询直到 `probe` 返回 `Some` 或超时
///
/// 至少检查一次；最后一次检查发生在截止时间当刻。
/// `probe` 返回的错误会立即中止轮询。
pub async fn poll_until<T, E, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<WaitOutcome<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(value) = probe().await? {
            return Ok(WaitOutcome::Found(value));
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(WaitOutcome::TimedOut);
        }
        sleep(interval.min(deadline - now)).await;
    }
}

//! 攻撃タスクから防衛タスクへ発射数を渡す有界FIFOキュー
//!
//! 満杯のときは送信側が、空のときは受信側がブロックします。

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};

use crate::models::SimError;

/// 送信側ハンドル
#[derive(Debug, Clone)]
pub struct LaunchCountSender {
    inner: mpsc::Sender<usize>,
}

/// 受信側ハンドル
#[derive(Debug)]
pub struct LaunchCountReceiver {
    inner: mpsc::Receiver<usize>,
}

/// 指定容量のキューを作成
pub fn attack_queue(capacity: usize) -> (LaunchCountSender, LaunchCountReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (LaunchCountSender { inner: tx }, LaunchCountReceiver { inner: rx })
}

impl LaunchCountSender {
    /// 空きができるまで待って送信
    pub async fn send(&self, count: usize) -> Result<(), SimError> {
        self.inner.send(count).await.map_err(|_| SimError::ChannelClosed)
    }

    /// 待たずに送信（満杯なら QueueFull）
    pub fn try_send(&self, count: usize) -> Result<(), SimError> {
        self.inner.try_send(count).map_err(|e| match e {
            TrySendError::Full(_) => SimError::QueueFull,
            TrySendError::Closed(_) => SimError::ChannelClosed,
        })
    }

    /// 指定時間まで待って送信
    pub async fn send_timeout(&self, count: usize, timeout: Duration) -> Result<(), SimError> {
        self.inner.send_timeout(count, timeout).await.map_err(|e| match e {
            SendTimeoutError::Timeout(_) => SimError::QueueTimeout,
            SendTimeoutError::Closed(_) => SimError::ChannelClosed,
        })
    }

    pub fn capacity(&self) -> usize {
        self.inner.max_capacity()
    }
}

impl LaunchCountReceiver {
    /// 値が届くまで待って受信（送信側がすべて破棄されると None）
    pub async fn recv(&mut self) -> Option<usize> {
        self.inner.recv().await
    }
}

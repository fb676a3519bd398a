// 流式透传 - 原样转发后端字节, 不做任何转换
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::proxy::mappers::error_classifier::classify_stream_error;
use crate::proxy::upstream::ByteStream;

/// 记录流是否被完整消费; 提前 drop 说明客户端断开, 上游连接随之关闭
struct RelayGuard {
    label: String,
    started: Instant,
    chunks: usize,
    finished: bool,
}

impl Drop for RelayGuard {
    fn drop(&mut self) {
        if !self.finished {
            info!(
                "[{}] Stream dropped after {} chunks ({}ms), cancelling upstream",
                self.label,
                self.chunks,
                self.started.elapsed().as_millis()
            );
        }
    }
}

/// 将后端字节流包装为响应体流
///
/// 首个字节转发后再出错无法改写状态码, 只能记录日志并中断连接
pub fn create_passthrough_stream(
    mut upstream: ByteStream,
    label: String,
) -> Pin<Box<dyn Stream<Item = Result<Bytes, String>> + Send>> {
    let stream = async_stream::stream! {
        let mut guard = RelayGuard {
            label,
            started: Instant::now(),
            chunks: 0,
            finished: false,
        };

        while let Some(item) = upstream.next().await {
            match item {
                Ok(bytes) => {
                    guard.chunks += 1;
                    debug!("[{}] Relaying chunk #{}: {} bytes", guard.label, guard.chunks, bytes.len());
                    yield Ok::<Bytes, String>(bytes);
                }
                Err(e) => {
                    let (kind, message) = classify_stream_error(&e);
                    error!(
                        "[{}] Upstream stream failed after {} chunks ({}): {}",
                        guard.label, guard.chunks, kind, e
                    );
                    guard.finished = true;
                    yield Err(format!("{}: {}", message, e));
                    return;
                }
            }
        }

        guard.finished = true;
        debug!(
            "[{}] Stream complete: {} chunks in {}ms",
            guard.label,
            guard.chunks,
            guard.started.elapsed().as_millis()
        );
    };

    Box::pin(stream)
}

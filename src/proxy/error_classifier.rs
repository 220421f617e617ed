// 错误分类模块 - 将底层传输错误转换为可读的消息
use reqwest::Error;

/// 分类上游传输错误
///
/// 返回值: (错误类型, 英文错误消息)
/// - 错误类型: 用于日志和响应中的 `kind` 字段
/// - 英文消息: 面向客户端的说明
pub fn classify_transport_error(error: &Error) -> (&'static str, &'static str) {
    if error.is_timeout() {
        ("timeout_error", "Backend request timed out")
    } else if error.is_connect() {
        ("connection_error", "Could not connect to backend")
    } else if error.is_decode() {
        ("decode_error", "Backend response could not be decoded")
    } else if error.is_body() {
        ("stream_error", "Backend body transfer was interrupted")
    } else if error.is_builder() || error.is_request() {
        ("request_error", "Backend request could not be sent")
    } else {
        ("unknown_error", "Unknown transport error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refused_connection_is_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = reqwest::Client::new()
            .get(format!("http://127.0.0.1:{}/", port))
            .send()
            .await
            .unwrap_err();

        assert_eq!(classify_transport_error(&err).0, "connection_error");
    }

    #[test]
    fn test_bad_url_is_request_error() {
        let err = reqwest::Client::new()
            .get("http://[::1")
            .build()
            .unwrap_err();

        assert_eq!(classify_transport_error(&err).0, "request_error");
    }
}

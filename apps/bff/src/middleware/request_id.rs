//! # Request ID 伝播ミドルウェア
//!
//! 受信リクエストの Request ID をプロバイダ呼び出しの `X-Request-Id` に引き継ぐ。
//!
//! 1. [`store_request_id`] が `SetRequestIdLayer` の設定した
//!    [`RequestId`](tower_http::request_id::RequestId) を task-local に保存する
//! 2. プロバイダクライアントが [`inject_request_id`] で reqwest の
//!    `RequestBuilder` にヘッダーを付与する
//!
//! クライアントのメソッドシグネチャに Request ID を通さずに済むよう task-local を使う。

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tally_shared::observability::REQUEST_ID_HEADER;
use tower_http::request_id::RequestId;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 現在のリクエストの Request ID を取得する
///
/// task-local スコープ外（テスト、起動時処理）では `None`。
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// Request ID を task-local に保存するミドルウェア
///
/// `SetRequestIdLayer` より内側に配置する。extensions に `RequestId` が無い場合は `"-"`。
pub async fn store_request_id(request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-")
        .to_string();

    REQUEST_ID.scope(request_id, next.run(request)).await
}

/// reqwest リクエストビルダーに `X-Request-Id` ヘッダーを付与する
///
/// task-local スコープ外ではビルダーをそのまま返す。
pub fn inject_request_id(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match current_request_id() {
        Some(id) => builder.header(REQUEST_ID_HEADER, id),
        None => builder,
    }
}

//! # エクストラクタ
//!
//! 拒否時に [`ApiError`] を返すエクストラクタ。axum 標準の拒否レスポンス
//! （プレーンテキスト・415/422）ではなく、他のエラーと同じ Problem Details で返す。

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON ボディのエクストラクタ
///
/// 解析できない JSON、フィールドの欠落・型違い、Content-Type の欠落は
/// すべて 400 `Invalid request body: <理由>` になる。
///
/// ```rust,ignore
/// async fn create(ValidatedJson(req): ValidatedJson<CreateItemRequest>) -> ... { }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "リクエストボディを拒否");
                Err(ApiError::invalid_request_body(rejection.body_text()))
            }
        }
    }
}

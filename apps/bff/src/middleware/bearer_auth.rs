//! # Bearer 認証ミドルウェア
//!
//! `Authorization: Bearer <token>` を認証プロバイダに問い合わせて検証し、
//! 解決したユーザーを [`VerifiedUser`] としてリクエスト extensions に格納する。
//!
//! 検証に失敗したリクエストは 401 で打ち切られ、後段のハンドラ
//! （およびデータ API の呼び出し）には到達しない。
//!
//! ## 使い方
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//!
//! let bearer_state = BearerAuthState {
//!     auth_provider: auth_provider.clone(),
//! };
//!
//! Router::new()
//!     .route("/items", get(list_items))
//!     .layer(from_fn_with_state(bearer_state, require_bearer))
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, request::Parts},
    middleware::Next,
    response::Response,
};
use tally_shared::event_log::error::kind;

use crate::{
    client::AuthProviderClient,
    error::{ApiError, extract_bearer_token, log_provider_error},
};

/// Bearer 認証ミドルウェアの状態
#[derive(Clone)]
pub struct BearerAuthState {
    pub auth_provider: Arc<dyn AuthProviderClient>,
}

/// 検証済みの呼び出し元
///
/// [`require_bearer`] の後段でのみ取得できる。
#[derive(Clone)]
pub struct VerifiedUser {
    /// プロバイダのユーザー ID
    pub id:           String,
    pub email:        Option<String>,
    /// 検証に使ったアクセストークン（データ API 呼び出しに転送する）
    pub access_token: String,
}

impl std::fmt::Debug for VerifiedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifiedUser")
            .field("id", &self.id)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl<S> FromRequestParts<S> for VerifiedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedUser>()
            .cloned()
            .ok_or_else(ApiError::not_authenticated)
    }
}

/// Bearer 認証ミドルウェア
///
/// - ヘッダーなし・形式不正: 401 `Not authenticated`
/// - プロバイダが拒否: 401 `Invalid or expired token: <理由>`
pub async fn require_bearer(
    State(state): State<BearerAuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let access_token = extract_bearer_token(request.headers())
        .ok_or_else(ApiError::not_authenticated)?
        .to_string();

    let user = match state.auth_provider.get_user(&access_token).await {
        Ok(user) => user,
        Err(e) => {
            log_provider_error("トークン検証", kind::AUTH_PROVIDER, &e);
            return Err(ApiError::invalid_token(e));
        }
    };

    tracing::debug!(user_id = %user.id, "Bearer トークンを検証しました");

    request.extensions_mut().insert(VerifiedUser {
        id: user.id,
        email: user.email,
        access_token,
    });

    Ok(next.run(request).await)
}

//! # 認証ハンドラ
//!
//! BFF のセッション・トークンライフサイクルのエンドポイントを提供する。
//!
//! ## エンドポイント
//!
//! - `POST /signup` - ユーザー登録
//! - `POST /signin` - サインイン（アクセストークンをボディ、リフレッシュトークンを Cookie で返す）
//! - `POST /signout` - サインアウト（Cookie をクリア）
//! - `POST /refresh` - Cookie のリフレッシュトークンでセッションを更新
//! - `POST /protected-route` - Bearer 検証済みの呼び出し元を返す
//!
//! ## セッション状態
//!
//! ```text
//! Anonymous ──signin──▶ Authenticated ──signout / トークン拒否──▶ Anonymous
//!                            │  ▲
//!                            └──┘ refresh（状態は変わらずトークンのみ更新）
//! ```
//!
//! BFF はセッションを保存しない。リフレッシュトークンはレスポンスボディに
//! 一切含めず、HttpOnly Cookie でのみ受け渡す。

mod refresh;
mod session;
mod sign_in;

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
pub use refresh::*;
use serde::{Deserialize, Serialize};
pub use session::*;
pub use sign_in::*;
use utoipa::ToSchema;

use crate::client::{AuthProviderClient, ProviderSession};

/// 認証ハンドラの共有状態
pub struct AuthState {
    pub auth_provider: Arc<dyn AuthProviderClient>,
}

// --- リクエスト/レスポンス型 ---

/// サインアップ・サインインリクエスト
#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub email:    String,
    pub password: String,
}

/// アクセストークンレスポンス（サインイン・リフレッシュ共通）
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access_token: String,
    /// 有効期間（秒）
    pub expires_in:   i64,
    /// 失効時刻（UNIX 秒）
    pub expires_at:   i64,
}

impl From<&ProviderSession> for AccessTokenResponse {
    fn from(session: &ProviderSession) -> Self {
        Self {
            access_token: session.access_token.clone(),
            expires_in:   session.expires_in,
            expires_at:   session.expires_at,
        }
    }
}

/// メッセージのみのレスポンス
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// 保護ルートのレスポンス
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProtectedRouteResponse {
    pub message: String,
    pub user_id: String,
}

// --- 共有定数 ---

/// リフレッシュトークンの Cookie 名
pub const REFRESH_TOKEN_COOKIE_NAME: &str = "refresh_token";

// --- Cookie ヘルパー ---

/// リフレッシュトークン Cookie を構築する
///
/// `Max-Age` は付けない（ブラウザセッション Cookie）。有効期限の管理はプロバイダが行う。
fn build_refresh_cookie(refresh_token: &str) -> Cookie<'static> {
    Cookie::build((REFRESH_TOKEN_COOKIE_NAME, refresh_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build()
}

/// リフレッシュトークン Cookie をクリアするための Cookie を構築する
fn build_clear_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_TOKEN_COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build()
}

// --- テストユーティリティ ---

//! # 認証プロバイダクライアント
//!
//! BFF から認証プロバイダ（Supabase Auth / GoTrue）への通信を担当する。
//!
//! ## エンドポイント
//!
//! - `POST /auth/v1/signup` - ユーザー登録
//! - `POST /auth/v1/token?grant_type=password` - パスワード認証
//! - `POST /auth/v1/token?grant_type=refresh_token` - セッション更新
//! - `POST /auth/v1/logout` - セッション失効
//! - `GET /auth/v1/user` - アクセストークンからユーザーを解決
//! - `GET /auth/v1/health` - 稼働確認

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tally_domain::credentials::Credentials;

use super::{
    endpoint::ProviderEndpoint,
    error::ProviderError,
    response::{handle_empty_response, handle_response},
};

// --- リクエスト/レスポンス型 ---

/// パスワード認証・登録リクエスト
#[derive(Serialize)]
struct PasswordRequest<'a> {
    email:    &'a str,
    password: &'a str,
}

/// セッション更新リクエスト
#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// プロバイダが返すユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id:    String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// プロバイダが発行したセッション
///
/// BFF はこれを保存しない。アクセストークンはボディで、
/// リフレッシュトークンは Cookie で呼び出し元へ渡すだけ。
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSession {
    pub access_token:  String,
    pub refresh_token: String,
    pub expires_in:    i64,
    pub expires_at:    i64,
}

impl std::fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// トークン発行系エンドポイントの結果
///
/// プロバイダは成功ステータスでもユーザーやセッションを欠いた応答を返しうる
/// （メール確認待ちなど）。呼び出し元は両方が揃っているかを確認する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub user:    Option<ProviderUser>,
    pub session: Option<ProviderSession>,
}

/// `/auth/v1/token` のレスポンスボディ
#[derive(Deserialize)]
struct TokenGrantBody {
    access_token:  Option<String>,
    refresh_token: Option<String>,
    expires_in:    Option<i64>,
    expires_at:    Option<i64>,
    user:          Option<ProviderUser>,
}

impl From<TokenGrantBody> for AuthResponse {
    fn from(body: TokenGrantBody) -> Self {
        let session = match (body.access_token, body.refresh_token, body.expires_in) {
            (Some(access_token), Some(refresh_token), Some(expires_in)) => {
                // 古い GoTrue は expires_at を返さないため発行時刻から補う
                let expires_at = body.expires_at.unwrap_or_else(|| {
                    time::OffsetDateTime::now_utc().unix_timestamp() + expires_in
                });
                Some(ProviderSession {
                    access_token,
                    refresh_token,
                    expires_in,
                    expires_at,
                })
            }
            _ => None,
        };

        Self {
            user: body.user,
            session,
        }
    }
}

/// 認証プロバイダクライアントトレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
#[async_trait]
pub trait AuthProviderClient: Send + Sync {
    /// ユーザーを登録する
    ///
    /// プロバイダのレスポンスは加工せずそのまま返す。
    async fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> Result<serde_json::Value, ProviderError>;

    /// メールアドレスとパスワードでセッションを発行する
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthResponse, ProviderError>;

    /// リフレッシュトークンでセッションを更新する
    ///
    /// 成功時は新しいリフレッシュトークンが発行され、古いものは使えなくなる。
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthResponse, ProviderError>;

    /// アクセストークンに紐づくセッションを失効させる
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;

    /// アクセストークンを検証し、ユーザーを解決する
    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError>;

    /// 稼働確認
    async fn check_health(&self) -> Result<(), ProviderError>;
}

/// Supabase Auth クライアント実装
#[derive(Debug, Clone)]
pub struct SupabaseAuthClient {
    endpoint: ProviderEndpoint,
}

impl SupabaseAuthClient {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl AuthProviderClient for SupabaseAuthClient {
    async fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> Result<serde_json::Value, ProviderError> {
        let request = PasswordRequest {
            email:    credentials.email().as_str(),
            password: credentials.password().as_str(),
        };

        let response = self
            .endpoint
            .request(Method::POST, "/auth/v1/signup", None)
            .json(&request)
            .send()
            .await?;

        handle_response(response).await
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthResponse, ProviderError> {
        let request = PasswordRequest {
            email:    credentials.email().as_str(),
            password: credentials.password().as_str(),
        };

        let response = self
            .endpoint
            .request(Method::POST, "/auth/v1/token?grant_type=password", None)
            .json(&request)
            .send()
            .await?;

        handle_response::<TokenGrantBody>(response)
            .await
            .map(AuthResponse::from)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthResponse, ProviderError> {
        let response = self
            .endpoint
            .request(
                Method::POST,
                "/auth/v1/token?grant_type=refresh_token",
                None,
            )
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        handle_response::<TokenGrantBody>(response)
            .await
            .map(AuthResponse::from)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let response = self
            .endpoint
            .request(Method::POST, "/auth/v1/logout", Some(access_token))
            .send()
            .await?;

        handle_empty_response(response).await
    }

    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError> {
        let response = self
            .endpoint
            .request(Method::GET, "/auth/v1/user", Some(access_token))
            .send()
            .await?;

        handle_response(response).await
    }

    async fn check_health(&self) -> Result<(), ProviderError> {
        let response = self
            .endpoint
            .request(Method::GET, "/auth/v1/health", None)
            .send()
            .await?;

        handle_empty_response(response).await
    }
}

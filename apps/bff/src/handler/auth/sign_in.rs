//! サインアップ・サインイン・サインアウトハンドラ

use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use axum_extra::extract::CookieJar;
use tally_domain::credentials::Credentials;
use tally_shared::{
    ErrorResponse,
    event_log::{error::kind, event},
    log_business_event,
};

use super::{
    AccessTokenResponse,
    AuthState,
    CredentialsRequest,
    MessageResponse,
    build_clear_cookie,
    build_refresh_cookie,
};
use crate::{
    client::ProviderError,
    error::{ApiError, extract_bearer_token, log_provider_error},
    middleware::ValidatedJson,
};

/// POST /signup
///
/// プロバイダにユーザーを登録し、プロバイダのレスポンスを返す。
/// メール確認の要否などはプロバイダの設定に従う。
///
/// 確認不要の設定ではプロバイダがセッションを返す。その場合リフレッシュトークンは
/// ボディから取り除き、サインインと同じ `refresh_token` Cookie に設定する。
#[utoipa::path(
   post,
   path = "/signup",
   tag = "auth",
   request_body = CredentialsRequest,
   responses(
      (status = 200, description = "登録成功（リフレッシュトークンを除いたプロバイダのレスポンス）",
         body = serde_json::Value,
         headers(("set-cookie" = String, description = "セッションが発行された場合のみ refresh_token Cookie"))),
      (status = 400, description = "リクエストボディの形状不正", body = ErrorResponse),
      (status = 401, description = "登録失敗、または認証情報の値が不正", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn signup(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> Result<(CookieJar, Json<serde_json::Value>), ApiError> {
    let credentials = parse_credentials(req)?;

    let mut body = match state.auth_provider.sign_up(&credentials).await {
        Ok(body) => body,
        Err(e) => {
            log_provider_error("サインアップ", kind::AUTH_PROVIDER, &e);
            return Err(ApiError::authentication_failed());
        }
    };

    log_business_event!(
        event.category = event::category::AUTH,
        event.action = event::action::SIGNUP,
        event.entity_type = event::entity_type::USER,
        event.result = event::result::SUCCESS,
        "サインアップ"
    );

    let jar = match take_refresh_token(&mut body) {
        Some(refresh_token) => jar.add(build_refresh_cookie(&refresh_token)),
        None => jar,
    };
    Ok((jar, Json(body)))
}

/// POST /signin
///
/// メール/パスワードでサインインする。
///
/// アクセストークンはボディで返し、リフレッシュトークンは
/// `refresh_token` Cookie（HttpOnly, Secure, SameSite=Strict）に設定する。
///
/// ## リクエストボディ
///
/// ```json
/// {
///   "email": "user@example.com",
///   "password": "password123"
/// }
/// ```
///
/// フィールドの欠落・型違いは 400、メールアドレスの形式不正や空のパスワードは
/// プロバイダを呼ばずに 401 を返す。
#[utoipa::path(
   post,
   path = "/signin",
   tag = "auth",
   request_body = CredentialsRequest,
   responses(
      (status = 200, description = "サインイン成功", body = AccessTokenResponse,
         headers(("set-cookie" = String, description = "refresh_token Cookie"))),
      (status = 400, description = "リクエストボディの形状不正", body = ErrorResponse),
      (status = 401, description = "認証失敗、または認証情報の値が不正", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn signin(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> Result<(CookieJar, Json<AccessTokenResponse>), ApiError> {
    let credentials =
        parse_credentials(req).inspect_err(|_| log_signin_failure("invalid_input"))?;

    let response = match state.auth_provider.sign_in_with_password(&credentials).await {
        Ok(response) => response,
        Err(e) => {
            log_signin_failure(failure_reason(&e));
            log_provider_error("サインイン", kind::AUTH_PROVIDER, &e);
            return Err(ApiError::authentication_failed());
        }
    };

    // 成功ステータスでもユーザー・セッションが欠けていれば認証失敗として扱う
    let (Some(user), Some(session)) = (response.user, response.session) else {
        log_signin_failure("incomplete_session");
        return Err(ApiError::authentication_failed());
    };

    log_business_event!(
        event.category = event::category::AUTH,
        event.action = event::action::SIGNIN_SUCCESS,
        event.entity_type = event::entity_type::SESSION,
        event.actor_id = %user.id,
        event.result = event::result::SUCCESS,
        "サインイン成功"
    );

    let jar = jar.add(build_refresh_cookie(&session.refresh_token));
    Ok((jar, Json(AccessTokenResponse::from(&session))))
}

/// POST /signout
///
/// `Authorization: Bearer` があればプロバイダ側のセッションを失効させ、
/// リフレッシュトークン Cookie をクリアする。
///
/// Bearer が無い場合は失効させるセッションが無いため、Cookie のクリアのみ行う。
#[utoipa::path(
   post,
   path = "/signout",
   tag = "auth",
   responses(
      (status = 200, description = "サインアウト成功", body = MessageResponse),
      (status = 401, description = "プロバイダでの失効に失敗", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn signout(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    let scope = match extract_bearer_token(&headers) {
        Some(access_token) => {
            if let Err(e) = state.auth_provider.sign_out(access_token).await {
                log_provider_error("サインアウト", kind::AUTH_PROVIDER, &e);
                return Err(ApiError::authentication_failed());
            }
            "provider"
        }
        None => "local",
    };

    log_business_event!(
        event.category = event::category::AUTH,
        event.action = event::action::SIGNOUT,
        event.entity_type = event::entity_type::SESSION,
        event.result = event::result::SUCCESS,
        event.reason = scope,
        "サインアウト"
    );

    let jar = jar.add(build_clear_cookie());
    Ok((
        jar,
        Json(MessageResponse {
            message: "signed out".to_string(),
        }),
    ))
}

/// 認証情報の値を検証する
///
/// 値として不正な認証情報はプロバイダに渡さず、認証失敗として扱う。
fn parse_credentials(req: CredentialsRequest) -> Result<Credentials, ApiError> {
    Credentials::new(req.email, req.password).map_err(|e| {
        tracing::debug!(reason = %e, "認証情報の値が不正");
        ApiError::authentication_failed()
    })
}

/// プロバイダのレスポンスからリフレッシュトークンを取り除いて返す
///
/// セッション形式（トップレベル）と `session` 配下のどちらにも対応する。
fn take_refresh_token(body: &mut serde_json::Value) -> Option<String> {
    let top_level = take_string(body, "refresh_token");
    let nested = body
        .get_mut("session")
        .and_then(|session| take_string(session, "refresh_token"));
    top_level.or(nested)
}

fn take_string(value: &mut serde_json::Value, key: &str) -> Option<String> {
    let removed = value.as_object_mut()?.remove(key)?;
    removed.as_str().map(str::to_string)
}

fn failure_reason(err: &ProviderError) -> &'static str {
    match err {
        ProviderError::InvalidCredentials => "invalid_credentials",
        e if e.is_server_side() => "provider_error",
        _ => "rejected",
    }
}

fn log_signin_failure(reason: &'static str) {
    log_business_event!(
        event.category = event::category::AUTH,
        event.action = event::action::SIGNIN_FAILURE,
        event.entity_type = event::entity_type::USER,
        event.result = event::result::FAILURE,
        event.reason = reason,
        "サインイン失敗"
    );
}

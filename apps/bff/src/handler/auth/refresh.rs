//! セッション更新ハンドラ

use std::sync::Arc;

use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use tally_shared::{
    ErrorResponse,
    event_log::{error::kind, event},
    log_business_event,
};

use super::{AccessTokenResponse, AuthState, REFRESH_TOKEN_COOKIE_NAME, build_refresh_cookie};
use crate::error::{ApiError, detail, log_provider_error};

/// POST /refresh
///
/// `refresh_token` Cookie でセッションを更新し、新しいアクセストークンを返す。
/// プロバイダはリフレッシュトークンをローテーションするため、Cookie も差し替える。
/// 古いリフレッシュトークンは以後使えない。
#[utoipa::path(
   post,
   path = "/refresh",
   tag = "auth",
   security(("refresh_cookie" = [])),
   responses(
      (status = 200, description = "更新成功", body = AccessTokenResponse,
         headers(("set-cookie" = String, description = "ローテーション後の refresh_token Cookie"))),
      (status = 401, description = "Cookie なし、または無効なリフレッシュトークン", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn refresh(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AccessTokenResponse>), ApiError> {
    let Some(refresh_token) = jar
        .get(REFRESH_TOKEN_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
    else {
        return Err(ApiError::Authentication(detail::NO_REFRESH_TOKEN.to_string()));
    };

    let session = match state.auth_provider.refresh_session(&refresh_token).await {
        Ok(response) => response.session,
        Err(e) => {
            log_provider_error("セッション更新", kind::AUTH_PROVIDER, &e);
            None
        }
    };

    let Some(session) = session else {
        log_business_event!(
            event.category = event::category::AUTH,
            event.action = event::action::REFRESH_FAILURE,
            event.entity_type = event::entity_type::SESSION,
            event.result = event::result::FAILURE,
            "セッション更新失敗"
        );
        return Err(ApiError::Authentication(
            detail::INVALID_REFRESH_TOKEN.to_string(),
        ));
    };

    log_business_event!(
        event.category = event::category::AUTH,
        event.action = event::action::REFRESH,
        event.entity_type = event::entity_type::SESSION,
        event.result = event::result::SUCCESS,
        "セッション更新"
    );

    let jar = jar.add(build_refresh_cookie(&session.refresh_token));
    Ok((jar, Json(AccessTokenResponse::from(&session))))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        response::Response,
    };
    use pretty_assertions::assert_eq;
    use tally_shared::ErrorResponse;
    use tower::ServiceExt;

    use super::super::test_utils::*;
    use crate::client::{AuthResponse, ProviderError};

    fn refresh_request(cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::POST).uri("/refresh");
        if let Some(cookie) = cookie {
            builder = builder.header("Cookie", cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn error_detail(response: Response) -> String {
        let error: ErrorResponse = serde_json::from_value(json_body(response).await).unwrap();
        error.detail
    }

    #[tokio::test]
    async fn test_refresh_成功時に新しいアクセストークンを返しcookieをローテーションする() {
        // Given
        let provider = Arc::new(StubAuthProvider::success());
        let sut = create_test_app(provider.clone());

        // When
        let response = sut
            .oneshot(refresh_request(Some("refresh_token=refresh-1")))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("refresh_token=refresh-2"), "{cookie}");
        assert!(cookie.contains("HttpOnly"), "{cookie}");
        assert!(cookie.contains("SameSite=Strict"), "{cookie}");

        let json = json_body(response).await;
        assert_eq!(json["access_token"], "access-2");
        assert_eq!(json["expires_in"], 3600);
        assert!(json.get("refresh_token").is_none());
        assert_eq!(
            *provider.refreshed_tokens.lock().unwrap(),
            vec!["refresh-1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_refresh_cookieなしでプロバイダを呼ばずに401() {
        // Given
        let provider = Arc::new(StubAuthProvider::success());
        let sut = create_test_app(provider.clone());

        // When
        let response = sut.oneshot(refresh_request(None)).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_detail(response).await, "No refresh token provided");
        assert!(provider.refreshed_tokens.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_空のcookieはcookieなしと同じ扱い() {
        // Given
        let sut = create_test_app(Arc::new(StubAuthProvider::success()));

        // When
        let response = sut
            .oneshot(refresh_request(Some("refresh_token=")))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_detail(response).await, "No refresh token provided");
    }

    #[tokio::test]
    async fn test_refresh_無効なリフレッシュトークンで401() {
        // Given
        let provider =
            StubAuthProvider::success().with_refresh(Err(ProviderError::InvalidCredentials));
        let sut = create_test_app(Arc::new(provider));

        // When
        let response = sut
            .oneshot(refresh_request(Some("refresh_token=revoked")))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get("set-cookie").is_none());
        assert_eq!(
            error_detail(response).await,
            "Invalid or expired refresh token"
        );
    }

    #[tokio::test]
    async fn test_refresh_セッションなしの成功応答も無効扱いで401() {
        // Given
        let provider = StubAuthProvider::success().with_refresh(Ok(AuthResponse {
            user:    Some(test_user()),
            session: None,
        }));
        let sut = create_test_app(Arc::new(provider));

        // When
        let response = sut
            .oneshot(refresh_request(Some("refresh_token=refresh-1")))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            error_detail(response).await,
            "Invalid or expired refresh token"
        );
    }
}

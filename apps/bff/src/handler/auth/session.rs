//! 保護ルートハンドラ

use axum::Json;
use tally_shared::ErrorResponse;

use super::ProtectedRouteResponse;
use crate::middleware::VerifiedUser;

/// POST /protected-route
///
/// Bearer 検証を通過した呼び出し元のユーザー ID を返す。
#[utoipa::path(
   post,
   path = "/protected-route",
   tag = "auth",
   security(("bearer_auth" = [])),
   responses(
      (status = 200, description = "アクセス許可", body = ProtectedRouteResponse),
      (status = 401, description = "未認証、または無効なトークン", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn protected_route(user: VerifiedUser) -> Json<ProtectedRouteResponse> {
    Json(ProtectedRouteResponse {
        message: "Access granted".to_string(),
        user_id: user.id,
    })
}

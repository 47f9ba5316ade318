//! # API レスポンスエンベロープ
//!
//! データ系 API の統一レスポンス形式 `{ "data": T }` を提供する。

use serde::{Deserialize, Serialize};

/// データ系 API の統一レスポンス型
///
/// 外部データストアから受け取った行を `{ "data": T }` 形式で返す。
/// 認証系 API（トークン発行）はこの型を使わず、フラットな JSON を返す。
///
/// ## 使用例
///
/// ```
/// use tally_shared::ApiResponse;
///
/// let response = ApiResponse::new(vec!["pen", "notebook"]);
/// assert_eq!(response.data.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// 新しい `ApiResponse` を作成する
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

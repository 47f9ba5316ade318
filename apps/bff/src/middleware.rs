//! # ミドルウェア
//!
//! BFF 用のミドルウェアとエクストラクタを提供する。
//!
//! - [`bearer_auth`]: Bearer トークンの検証（保護ルートの前段）
//! - [`cache_control`]: `Cache-Control: no-store` の付与
//! - [`extractor`]: `ApiError` を拒否型に持つエクストラクタ
//! - [`request_id`]: Request ID のプロバイダ呼び出しへの伝播

pub mod bearer_auth;
pub mod cache_control;
pub mod extractor;
pub mod request_id;

pub use bearer_auth::{BearerAuthState, VerifiedUser, require_bearer};
pub use cache_control::no_cache;
pub use extractor::ValidatedJson;

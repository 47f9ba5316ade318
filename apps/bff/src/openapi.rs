//! # OpenAPI 仕様定義
//!
//! utoipa を使用して BFF の OpenAPI 仕様を Rust の型から自動生成する。
//! `ApiDoc::openapi()` で OpenAPI ドキュメントを取得できる。

use utoipa::{
    Modify,
    OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::handler::{auth, health, item, ledger};

#[derive(OpenApi)]
#[openapi(
   info(
      title = "Tally API",
      version = "0.1.0",
      description = "Supabase の前段に立つ Tally の BFF API"
   ),
   paths(
      // health
      health::health_check,
      health::readiness_check,
      // auth
      auth::signup,
      auth::signin,
      auth::signout,
      auth::refresh,
      auth::protected_route,
      // items
      item::list_items,
      item::create_item,
      // transactions
      ledger::list_transactions,
      ledger::save_transaction,
      ledger::delete_transactions,
      // categories
      ledger::list_categories,
      ledger::list_spend_limits,
      ledger::save_spend_limit,
   ),
   components(schemas(
      tally_shared::ErrorResponse,
   )),
   tags(
      (name = "health", description = "ヘルスチェック"),
      (name = "auth", description = "認証"),
      (name = "items", description = "アイテム"),
      (name = "transactions", description = "取引"),
      (name = "categories", description = "カテゴリと支出上限"),
   ),
   modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// セキュリティスキーム定義
///
/// 保護ルートの Bearer 認証と、リフレッシュ用の Cookie を追加する。
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
        components.add_security_scheme(
            "refresh_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("refresh_token"))),
        );
    }
}

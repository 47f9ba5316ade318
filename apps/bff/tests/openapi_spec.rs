//! # OpenAPI 仕様テスト
//!
//! utoipa から生成される OpenAPI 仕様の整合性を検証する。

use tally_bff::openapi::ApiDoc;
use utoipa::OpenApi;

#[test]
fn test_openapi仕様がパニックせず生成される() {
   let doc = ApiDoc::openapi();
   // パニックしなければ成功
   let _yaml = doc.to_yaml().unwrap();
}

#[test]
fn test_全パスが含まれている() {
   let doc = ApiDoc::openapi();
   let mut paths: Vec<&str> = doc.paths.paths.keys().map(|k| k.as_str()).collect();
   paths.sort_unstable();

   // 11 パス（15 ハンドラ）
   assert_eq!(
      paths,
      vec![
         "/categories",
         "/category-spend-limits",
         "/health",
         "/health/ready",
         "/items",
         "/protected-route",
         "/refresh",
         "/signin",
         "/signout",
         "/signup",
         "/transactions",
      ]
   );
}

#[test]
fn test_itemsにgetとpostの両方が定義されている() {
   let doc = ApiDoc::openapi();
   let items = doc.paths.paths.get("/items").expect("/items が存在すること");

   assert!(items.get.is_some());
   assert!(items.post.is_some());
}

#[test]
fn test_transactionsに一覧と保存と削除が定義されている() {
   let doc = ApiDoc::openapi();
   let transactions = doc
      .paths
      .paths
      .get("/transactions")
      .expect("/transactions が存在すること");

   assert!(transactions.get.is_some());
   assert!(transactions.put.is_some());
   assert!(transactions.delete.is_some());
}

#[test]
fn test_セキュリティスキームが含まれている() {
   let doc = ApiDoc::openapi();
   let components = doc.components.as_ref().expect("components が存在すること");

   for name in ["bearer_auth", "refresh_cookie"] {
      assert!(
         components.security_schemes.contains_key(name),
         "{name} セキュリティスキームが存在すること"
      );
   }
}

#[test]
fn test_全タグが含まれている() {
   let doc = ApiDoc::openapi();
   let tags: Vec<&str> = doc
      .tags
      .as_ref()
      .expect("tags が存在すること")
      .iter()
      .map(|t| t.name.as_str())
      .collect();

   for tag in ["health", "auth", "items", "transactions", "categories"] {
      assert!(tags.contains(&tag), "{tag} タグが存在すること: {tags:?}");
   }
}

#[test]
fn test_problem_detailsスキーマが登録されている() {
   let doc = ApiDoc::openapi();
   let components = doc.components.as_ref().expect("components が存在すること");
   assert!(
      components.schemas.contains_key("ProblemDetails"),
      "ProblemDetails スキーマが存在すること: {:?}",
      components.schemas.keys().collect::<Vec<_>>()
   );
}

#[test]
fn test_リフレッシュトークンはレスポンススキーマに現れない() {
   let doc = ApiDoc::openapi();
   let json = serde_json::to_value(&doc).unwrap();

   let schema = &json["components"]["schemas"]["AccessTokenResponse"]["properties"];
   assert!(schema.get("refresh_token").is_none());
   assert!(schema.get("access_token").is_some());
}

//! # BFF アプリケーション構築
//!
//! State の初期化とルーター構築を担当する。
//! `main.rs` はクライアント生成とサーバー起動に集中する。
//!
//! プロバイダクライアントはトレイトオブジェクトで受け取るため、
//! 結合テストではインメモリの実装を注入できる。

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tally_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    client::{AuthProviderClient, ItemStoreClient, LedgerStoreClient},
    config::{BffConfig, ConfigError},
    handler::{
        AuthState,
        ItemState,
        LedgerState,
        ReadinessState,
        create_item,
        delete_transactions,
        health_check,
        list_categories,
        list_items,
        list_spend_limits,
        list_transactions,
        protected_route,
        readiness_check,
        refresh,
        save_spend_limit,
        save_transaction,
        signin,
        signout,
        signup,
    },
    middleware::{BearerAuthState, no_cache, request_id::store_request_id, require_bearer},
};

/// State の構築とルーター定義を行う
///
/// 許可オリジンがヘッダー値として不正な場合はエラーを返す。
pub fn build_router(
    config: &BffConfig,
    auth_provider: Arc<dyn AuthProviderClient>,
    item_store: Arc<dyn ItemStoreClient>,
    ledger_store: Arc<dyn LedgerStoreClient>,
) -> Result<Router, ConfigError> {
    let cors = cors_layer(&config.cors_allowed_origin)?;

    let auth_state = Arc::new(AuthState {
        auth_provider: auth_provider.clone(),
    });
    let item_state = Arc::new(ItemState {
        item_store: item_store.clone(),
    });
    let ledger_state = Arc::new(LedgerState { ledger_store });
    let readiness_state = Arc::new(ReadinessState {
        auth_provider: auth_provider.clone(),
        item_store,
    });
    let bearer_state = BearerAuthState { auth_provider };

    let app = Router::new()
        // ヘルスチェック
        .merge(
            Router::new()
                .route("/health", get(health_check))
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        // 認証 API（Bearer 不要、リフレッシュは Cookie で受け取る）
        .merge(
            Router::new()
                .route("/signup", post(signup))
                .route("/signin", post(signin))
                .route("/signout", post(signout))
                .route("/refresh", post(refresh))
                .with_state(auth_state),
        )
        // Bearer 必須 API
        // route_layer なので未定義パスは 401 ではなく 404 のまま
        .merge(
            Router::new()
                .route("/items", get(list_items).post(create_item))
                .with_state(item_state)
                .route(
                    "/transactions",
                    get(list_transactions)
                        .put(save_transaction)
                        .delete(delete_transactions),
                )
                .route("/categories", get(list_categories))
                .route(
                    "/category-spend-limits",
                    get(list_spend_limits).put(save_spend_limit),
                )
                .with_state(ledger_state)
                .route("/protected-route", post(protected_route))
                .route_layer(from_fn_with_state(bearer_state, require_bearer)),
        )
        // キャッシュ制御: トークンを含むレスポンスがブラウザにキャッシュされないようにする
        .layer(from_fn(no_cache))
        // Request ID レイヤー（レイヤー順序が重要: 下に書いたものが外側）
        // 1. SetRequestIdLayer: リクエスト受信時に UUID v7 を生成（またはクライアント提供値を使用）
        // 2. TraceLayer: カスタムスパンに request_id を含め、全ログに自動注入
        // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        // 4. store_request_id: task-local に保存し、BFF → プロバイダのヘッダー伝播に使用
        .layer(from_fn(store_request_id))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        // プリフライトは認証・ルーティングより前で応答する
        .layer(cors);

    Ok(app)
}

/// 単一オリジン向けの CORS レイヤーを構築する
///
/// 資格情報付きリクエストではワイルドカードが使えないため、
/// メソッドとヘッダーはプリフライトの要求をそのまま許可する。
fn cors_layer(allowed_origin: &str) -> Result<CorsLayer, ConfigError> {
    let origin = allowed_origin
        .parse::<HeaderValue>()
        .map_err(|_| ConfigError::Invalid {
            name:  "CORS_ALLOWED_ORIGIN",
            value: allowed_origin.to_string(),
        })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

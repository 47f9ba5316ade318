//! # Tally BFF (Backend for Frontend) サーバー
//!
//! フロントエンド専用の API サーバー。
//!
//! ## 役割
//!
//! BFF はフロントエンドと Supabase（認証 + データ API）の間に位置し、
//! 以下の責務を担う:
//!
//! - **セッション管理**: アクセストークンはボディ、リフレッシュトークンは HttpOnly Cookie で受け渡す
//! - **トークン検証**: 保護ルートの Bearer トークンを認証プロバイダで検証する
//! - **データ転送**: `items` コレクションと、呼び出し元が所有する取引・支出上限を
//!   呼び出し元のトークンで中継する
//!
//! ## アーキテクチャ
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │   Browser    │────▶│     BFF      │────▶│ Supabase Auth    │
//! │              │     │  port: 8000  │     │ (/auth/v1)       │
//! └──────────────┘     └──────────────┘     └──────────────────┘
//!                             │
//!                             ▼
//!                      ┌──────────────────┐
//!                      │ Supabase REST    │
//!                      │ (/rest/v1)       │
//!                      └──────────────────┘
//! ```
//!
//! ## 環境変数
//!
//! [`tally_bff::config`] を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（.env ファイルを使用）
//! cargo run -p tally-bff
//!
//! # 本番環境（環境変数を直接指定）
//! SUPABASE_PROJECT_URL=https://... SUPABASE_API_KEY=... cargo run -p tally-bff --release
//! ```

use std::sync::Arc;

use tally_bff::{
    app_builder::build_router,
    client::{ProviderEndpoint, SupabaseAuthClient, SupabaseItemStore, SupabaseLedgerStore},
    config::BffConfig,
};
use tally_shared::observability::TracingConfig;
use tokio::net::TcpListener;

/// BFF サーバーのエントリーポイント
///
/// 以下の順序で初期化を行う:
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. アプリケーション設定の読み込み
/// 4. プロバイダクライアントとルーターの構築
/// 5. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    // 本番環境では .env ファイルは使用せず、環境変数を直接設定する
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("bff");
    tally_shared::observability::init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "bff").entered();

    // 設定読み込み
    let config = BffConfig::from_env()?;
    let addr = config.bind_addr()?;

    tracing::info!(?config, "BFF サーバーを起動します: {}", addr);

    // 認証とデータ API は同じプロジェクト URL・API キーを共有する
    let endpoint = ProviderEndpoint::new(&config.supabase_url, &config.supabase_api_key);
    let auth_provider = Arc::new(SupabaseAuthClient::new(endpoint.clone()));
    let item_store = Arc::new(SupabaseItemStore::new(endpoint.clone()));
    let ledger_store = Arc::new(SupabaseLedgerStore::new(endpoint));

    let app = build_router(&config, auth_provider, item_store, ledger_store)?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("BFF サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

//! # 外部プロバイダクライアント
//!
//! BaaS プロバイダ（Supabase）との通信を担当する。
//!
//! - [`auth_provider`]: 認証 API（`/auth/v1`）
//! - [`item_store`]: データ API（`/rest/v1`）の共有アイテム
//! - [`ledger_store`]: データ API の取引・カテゴリ・支出上限
//!
//! いずれもトレイトで定義し、ハンドラは `Arc<dyn Trait>` として保持する。
//! テストではスタブやインメモリ実装に差し替える。

pub mod auth_provider;
mod endpoint;
pub mod error;
pub mod item_store;
pub mod ledger_store;
mod response;
mod row;

pub use auth_provider::{
    AuthProviderClient,
    AuthResponse,
    ProviderSession,
    ProviderUser,
    SupabaseAuthClient,
};
pub use endpoint::ProviderEndpoint;
pub use error::ProviderError;
pub use item_store::{ItemStoreClient, SupabaseItemStore};
pub use ledger_store::{LedgerStoreClient, SupabaseLedgerStore};
pub use row::StoreRow;

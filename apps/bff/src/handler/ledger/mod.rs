//! # 家計簿ハンドラ
//!
//! 呼び出し元ユーザーが所有する取引・支出上限と、共有のカテゴリを
//! 外部データストアへ転送する。
//!
//! ## エンドポイント
//!
//! - `GET /transactions` - 呼び出し元の取引一覧（日付順）
//! - `PUT /transactions` - 取引の作成・更新
//! - `DELETE /transactions` - 取引の一括削除（ボディは ID の配列）
//! - `GET /categories` - カテゴリ一覧
//! - `GET /category-spend-limits` - 呼び出し元の支出上限一覧
//! - `PUT /category-spend-limits` - 支出上限の作成・更新
//!
//! すべて Bearer 検証済みの呼び出し元のみが利用できる。書き込み行の
//! `user_id` はボディからは受け取らず、検証済みユーザーで埋める。

mod category;
mod transaction;

use std::sync::Arc;

pub use category::*;
use serde::Deserialize;
use tally_domain::{DomainError, item::Price};
pub use transaction::*;

use crate::client::LedgerStoreClient;

/// 家計簿ハンドラの共有状態
pub struct LedgerState {
    pub ledger_store: Arc<dyn LedgerStoreClient>,
}

/// 金額の入力
///
/// フォームからは文字列（`"1,250.00"`）、API からは数値（`1250`）で届くため両方を受け付ける。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MoneyInput {
    Text(String),
    Number(serde_json::Number),
}

impl MoneyInput {
    /// 必須の金額として解釈する
    pub fn into_price(self) -> Result<Price, DomainError> {
        match self {
            Self::Text(text) => Price::new(text),
            Self::Number(number) => Price::new(number.to_string()),
        }
    }

    /// 任意の金額として解釈する（未指定・空文字列は `None`）
    pub fn into_optional_price(input: Option<Self>) -> Result<Option<Price>, DomainError> {
        match input {
            None => Ok(None),
            Some(Self::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(money) => money.into_price().map(Some),
        }
    }
}


// --- テストユーティリティ ---

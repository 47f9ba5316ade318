//! # レシート
//!
//! 購入記録のデータ形状。HTTP ルートは持たず、フロントエンドと共有する
//! スキーマとしてのみ存在する。
//!
//! 金額はアイテムと同じく文字列表現の [`Price`] で保持し、
//! 集計は [`Decimal`] で行う。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    category::CategoryName,
    item::{ItemName, Price},
};

/// レシート明細の 1 行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name:        ItemName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price:       Price,
}

/// レシート
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub name:        String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date:        DateTime<Utc>,
    pub items:       Vec<LineItem>,
    pub total_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal:    Option<Price>,
    pub category:    CategoryName,
}

impl Receipt {
    /// 明細の価格合計
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(|item| item.price.amount()).sum()
    }

    /// 金額の整合性を判定する
    ///
    /// 小計がある場合、小計は明細合計と一致し、かつ総額を超えないこと。
    /// 小計がない場合は常に整合しているとみなす（税・手数料の内訳は不明のため）。
    pub fn is_consistent(&self) -> bool {
        match &self.subtotal {
            Some(subtotal) => {
                subtotal.amount() == self.items_total()
                    && subtotal.amount() <= self.total_price.amount()
            }
            None => true,
        }
    }
}

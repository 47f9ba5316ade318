//! # アイテム
//!
//! 外部データストアの `items` コレクションへ書き込むアイテムを定義する。
//!
//! ## 価格の表現
//!
//! 価格はワイヤ上では文字列として受け渡す。内部では [`Decimal`] として
//! 解釈できることを検証するが、転送時は受け取った文字列をそのまま使う
//! （`"1.50"` は `"1.50"` のまま保存される）。
//! 3 桁区切りのカンマ（`"1,000.00"`）も受け付け、解釈時のみ取り除く。

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// 価格文字列の形式（非負の十進数リテラル、3 桁区切りのカンマ可）
static PRICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+|\d{1,3}(,\d{3})+)(\.\d+)?$").expect("price pattern is valid")
});

define_validated_string! {
    /// アイテム名
    pub struct ItemName {
        label: "name",
    }
}

/// 価格（値オブジェクト）
///
/// 受け取った文字列表現と、そこから解釈した十進数の両方を保持する。
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price {
    raw:    String,
    amount: Decimal,
}

impl Price {
    /// 価格を作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - `123`・`123.45`・`1,234.50` の形式（符号・指数表記は不可）
    /// - [`Decimal`] の範囲に収まる
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();

        if raw.is_empty() {
            return Err(DomainError::Validation("price is required".to_string()));
        }

        if !PRICE_PATTERN.is_match(&raw) {
            return Err(DomainError::Validation(format!(
                "price must be a non-negative decimal number, got {raw:?}"
            )));
        }

        let amount = Decimal::from_str(&raw.replace(',', "")).map_err(|e| {
            DomainError::Validation(format!("price is out of range: {e}"))
        })?;

        Ok(Self { raw, amount })
    }

    /// ワイヤ上の文字列表現
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// 十進数としての金額
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Price").field(&self.raw).finish()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for Price {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for String {
    fn from(value: Price) -> Self {
        value.raw
    }
}

/// 新規アイテム（作成リクエストの検証済みペイロード）
///
/// シリアライズ結果がそのままデータストアへの挿入行になる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    name:        ItemName,
    description: String,
    price:       Price,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            name:        ItemName::new(name)?,
            description: description.into(),
            price:       Price::new(price)?,
        })
    }

    pub fn name(&self) -> &ItemName {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> &Price {
        &self.price
    }
}

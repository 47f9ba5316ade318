//! データストアの行

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// データストアの 1 行
///
/// 列構成はデータストア側のスキーマが決めるため、BFF は解釈せずに転送する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct StoreRow(pub serde_json::Value);

impl StoreRow {
    /// 指定した列の値を取得する
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }
}

//! # OpenAPI YAML 生成ツール
//!
//! BFF の Rust 型から OpenAPI 仕様を YAML 形式で標準出力に出力する。
//!
//! ## 使い方
//!
//! ```bash
//! cargo run --bin generate-openapi -p tally-bff > openapi/openapi.yaml
//! ```

use std::collections::BTreeSet;

use tally_bff::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let mut openapi = ApiDoc::openapi();
    let referenced = referenced_schemas(&serde_json::to_value(&openapi)?);

    // `ApiResponse<Vec<StoreRow>>` のようなジェネリック型を body に使うと、
    // インライン展開された型パラメータも components に登録される
    if let Some(components) = &mut openapi.components {
        components
            .schemas
            .retain(|name, _| referenced.contains(name.as_str()));
    }

    print!("{}", openapi.to_yaml()?);
    Ok(())
}

/// ドキュメント全体から `$ref` で参照されているスキーマ名を集める
fn referenced_schemas(document: &serde_json::Value) -> BTreeSet<String> {
    const PREFIX: &str = "#/components/schemas/";

    let mut names = BTreeSet::new();
    let mut stack = vec![document];
    while let Some(value) = stack.pop() {
        match value {
            serde_json::Value::Object(map) => {
                if let Some(name) = map
                    .get("$ref")
                    .and_then(|r| r.as_str())
                    .and_then(|r| r.strip_prefix(PREFIX))
                {
                    names.insert(name.to_string());
                }
                stack.extend(map.values());
            }
            serde_json::Value::Array(items) => stack.extend(items),
            _ => {}
        }
    }
    names
}

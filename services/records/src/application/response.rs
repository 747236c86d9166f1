/// API Gatewayプロキシ統合のレスポンス
///
/// ボディは常にJSON文字列。エラー時は`error`（種別）と`message`（詳細）を含む。
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// エラーレスポンスのボディ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// エラー種別（例: "malformed_input", "method_not_allowed"）
    pub error: String,
    /// 詳細なエラーメッセージ
    pub message: String,
}

/// Lambdaから返却するレスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiGatewayResponse {
    /// JSONボディのレスポンスを作成
    pub fn json(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            headers: Self::default_headers(),
            body: body.to_string(),
        }
    }

    /// 200 OKレスポンスを作成
    pub fn ok(body: &Value) -> Self {
        Self::json(200, body)
    }

    /// エラーレスポンスを作成
    pub fn error(status_code: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        let body = ErrorBody {
            error: error.into(),
            message: message.into(),
        };
        // ErrorBodyは文字列フィールドのみのため変換に失敗しない
        let body = serde_json::to_value(&body).unwrap_or(Value::Null);
        Self::json(status_code, &body)
    }

    /// ヘッダーを追加
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// ボディをJSONとしてパース
    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// 全レスポンス共通のヘッダー
    fn default_headers() -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        headers
    }
}

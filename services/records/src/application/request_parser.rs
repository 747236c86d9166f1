/// 呼び出しイベントパーサー
///
/// API Gatewayプロキシ統合のイベント（httpMethod, body, pathParameters）を
/// 検証し、RecordRequestに変換する。
use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{RecordId, RecordOperation, RecordRequest};

/// パスパラメータ中のレコードIDのキー
const ID_PATH_PARAMETER: &str = "id";

/// イベントパースエラー
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    /// イベントが想定した形のオブジェクトでない
    #[error("invalid invocation event")]
    InvalidEvent,

    /// httpMethodが欠落
    #[error("missing httpMethod")]
    MissingMethod,

    /// 未対応のメソッド
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// ボディが必要な操作でボディが欠落
    #[error("missing request body")]
    MissingBody,

    /// ボディがJSONとしてパースできない
    #[error("request body is not valid JSON")]
    InvalidJson,

    /// ボディがJSONオブジェクトでない
    #[error("request body must be a JSON object")]
    NotAnObject,

    /// パスパラメータのidが欠落または空
    #[error("missing record id in path parameters")]
    MissingId,

    /// 更新対象フィールドがボディに含まれない
    #[error("missing field in request body: {0}")]
    MissingField(String),
}

/// API Gatewayから渡されるイベントのうち、処理に必要な部分
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvocationEvent {
    #[serde(default)]
    http_method: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    is_base64_encoded: Option<bool>,
    #[serde(default)]
    path_parameters: Option<HashMap<String, String>>,
}

/// 呼び出しイベントパーサー
pub struct RequestParser;

impl RequestParser {
    /// イベントをパースしてRecordRequestに変換
    ///
    /// # 引数
    /// * `event` - API Gatewayプロキシ統合のイベントJSON
    /// * `updatable_field` - PUTで書き換えるフィールド名
    ///
    /// # 例
    /// ```
    /// use records::application::RequestParser;
    /// use records::domain::RecordRequest;
    ///
    /// let event = serde_json::json!({"httpMethod": "GET"});
    /// let request = RequestParser::parse(&event, "name").unwrap();
    /// assert_eq!(request, RecordRequest::Read);
    /// ```
    pub fn parse(event: &Value, updatable_field: &str) -> Result<RecordRequest, ParseError> {
        let event = InvocationEvent::deserialize(event).map_err(|_| ParseError::InvalidEvent)?;

        let method = event.http_method.as_deref().ok_or(ParseError::MissingMethod)?;
        let operation = RecordOperation::from_http_method(method)
            .ok_or_else(|| ParseError::UnsupportedMethod(method.to_string()))?;

        match operation {
            RecordOperation::Create => {
                let fields = Self::parse_body(&event)?;
                Ok(RecordRequest::Create { fields })
            }
            RecordOperation::Read => Ok(RecordRequest::Read),
            RecordOperation::Update => {
                let id = Self::parse_id(&event)?;
                let mut fields = Self::parse_body(&event)?;
                let value = fields
                    .remove(updatable_field)
                    .ok_or_else(|| ParseError::MissingField(updatable_field.to_string()))?;
                Ok(RecordRequest::Update {
                    id,
                    field: updatable_field.to_string(),
                    value,
                })
            }
            RecordOperation::Delete => {
                let id = Self::parse_id(&event)?;
                Ok(RecordRequest::Delete { id })
            }
        }
    }

    /// pathParameters.idを取得
    fn parse_id(event: &InvocationEvent) -> Result<RecordId, ParseError> {
        event
            .path_parameters
            .as_ref()
            .and_then(|params| params.get(ID_PATH_PARAMETER))
            .and_then(|raw| RecordId::parse(raw))
            .ok_or(ParseError::MissingId)
    }

    /// ボディをJSONオブジェクトとしてパース
    fn parse_body(event: &InvocationEvent) -> Result<Map<String, Value>, ParseError> {
        let body = event.body.as_deref().ok_or(ParseError::MissingBody)?;

        let value: Value = if event.is_base64_encoded.unwrap_or(false) {
            let bytes = BASE64.decode(body).map_err(|_| ParseError::InvalidJson)?;
            serde_json::from_slice(&bytes).map_err(|_| ParseError::InvalidJson)?
        } else {
            serde_json::from_str(body).map_err(|_| ParseError::InvalidJson)?
        };

        match value {
            Value::Object(fields) => Ok(fields),
            _ => Err(ParseError::NotAnObject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==================== 正常系 ====================

    #[test]
    fn test_parse_post_into_create() {
        let event = json!({
            "httpMethod": "POST",
            "body": "{\"name\":\"Alice\",\"age\":30}",
            "pathParameters": null
        });

        let request = RequestParser::parse(&event, "name").unwrap();

        match request {
            RecordRequest::Create { fields } => {
                assert_eq!(fields.get("name"), Some(&json!("Alice")));
                assert_eq!(fields.get("age"), Some(&json!(30)));
            }
            other => panic!("Createを期待: {:?}", other),
        }
    }

    #[test]
    fn test_parse_get_ignores_body_and_path() {
        let event = json!({
            "httpMethod": "GET",
            "body": "not json at all",
            "pathParameters": {"id": "abc"}
        });

        assert_eq!(RequestParser::parse(&event, "name").unwrap(), RecordRequest::Read);
    }

    #[test]
    fn test_parse_put_into_update() {
        let event = json!({
            "httpMethod": "PUT",
            "body": "{\"name\":\"Bob\",\"ignored\":1}",
            "pathParameters": {"id": "rec-1"}
        });

        let request = RequestParser::parse(&event, "name").unwrap();

        assert_eq!(
            request,
            RecordRequest::Update {
                id: RecordId::parse("rec-1").unwrap(),
                field: "name".to_string(),
                value: json!("Bob"),
            }
        );
    }

    #[test]
    fn test_parse_put_uses_configured_field() {
        let event = json!({
            "httpMethod": "PUT",
            "body": "{\"status\":\"done\"}",
            "pathParameters": {"id": "rec-1"}
        });

        match RequestParser::parse(&event, "status").unwrap() {
            RecordRequest::Update { field, value, .. } => {
                assert_eq!(field, "status");
                assert_eq!(value, json!("done"));
            }
            other => panic!("Updateを期待: {:?}", other),
        }
    }

    #[test]
    fn test_parse_delete_into_delete() {
        let event = json!({
            "httpMethod": "DELETE",
            "body": null,
            "pathParameters": {"id": "rec-1"}
        });

        assert_eq!(
            RequestParser::parse(&event, "name").unwrap(),
            RecordRequest::Delete {
                id: RecordId::parse("rec-1").unwrap()
            }
        );
    }

    #[test]
    fn test_parse_base64_encoded_body() {
        let event = json!({
            "httpMethod": "POST",
            "body": BASE64.encode("{\"name\":\"Alice\"}"),
            "isBase64Encoded": true
        });

        match RequestParser::parse(&event, "name").unwrap() {
            RecordRequest::Create { fields } => assert_eq!(fields.get("name"), Some(&json!("Alice"))),
            other => panic!("Createを期待: {:?}", other),
        }
    }

    #[test]
    fn test_parse_ignores_unrelated_event_fields() {
        let event = json!({
            "resource": "/resource",
            "path": "/resource",
            "httpMethod": "GET",
            "headers": {"Accept": "*/*"},
            "requestContext": {"requestId": "req-1", "stage": "prod"},
            "isBase64Encoded": false
        });

        assert_eq!(RequestParser::parse(&event, "name").unwrap(), RecordRequest::Read);
    }

    // ==================== 異常系 ====================

    #[test]
    fn test_parse_non_object_event() {
        assert_eq!(
            RequestParser::parse(&json!("GET"), "name").unwrap_err(),
            ParseError::InvalidEvent
        );
        assert_eq!(
            RequestParser::parse(&json!({"httpMethod": 42}), "name").unwrap_err(),
            ParseError::InvalidEvent
        );
    }

    #[test]
    fn test_parse_missing_method() {
        assert_eq!(
            RequestParser::parse(&json!({"body": "{}"}), "name").unwrap_err(),
            ParseError::MissingMethod
        );
    }

    #[test]
    fn test_parse_unsupported_method() {
        let event = json!({"httpMethod": "PATCH", "body": "{}"});
        assert_eq!(
            RequestParser::parse(&event, "name").unwrap_err(),
            ParseError::UnsupportedMethod("PATCH".to_string())
        );
    }

    #[test]
    fn test_parse_create_missing_body() {
        let event = json!({"httpMethod": "POST", "body": null});
        assert_eq!(RequestParser::parse(&event, "name").unwrap_err(), ParseError::MissingBody);
    }

    #[test]
    fn test_parse_create_invalid_json() {
        let event = json!({"httpMethod": "POST", "body": "{name: Alice"});
        assert_eq!(RequestParser::parse(&event, "name").unwrap_err(), ParseError::InvalidJson);
    }

    #[test]
    fn test_parse_create_invalid_base64() {
        let event = json!({"httpMethod": "POST", "body": "%%%", "isBase64Encoded": true});
        assert_eq!(RequestParser::parse(&event, "name").unwrap_err(), ParseError::InvalidJson);
    }

    #[test]
    fn test_parse_create_body_not_object() {
        for body in ["[1,2,3]", "\"Alice\"", "42", "null"] {
            let event = json!({"httpMethod": "POST", "body": body});
            assert_eq!(
                RequestParser::parse(&event, "name").unwrap_err(),
                ParseError::NotAnObject,
                "body {} should be rejected",
                body
            );
        }
    }

    #[test]
    fn test_parse_update_missing_id() {
        let without_params = json!({"httpMethod": "PUT", "body": "{\"name\":\"Bob\"}"});
        let without_id = json!({"httpMethod": "PUT", "body": "{\"name\":\"Bob\"}", "pathParameters": {}});
        let blank_id = json!({"httpMethod": "PUT", "body": "{\"name\":\"Bob\"}", "pathParameters": {"id": ""}});

        for event in [without_params, without_id, blank_id] {
            assert_eq!(RequestParser::parse(&event, "name").unwrap_err(), ParseError::MissingId);
        }
    }

    #[test]
    fn test_parse_update_missing_field() {
        let event = json!({
            "httpMethod": "PUT",
            "body": "{\"title\":\"Bob\"}",
            "pathParameters": {"id": "rec-1"}
        });
        assert_eq!(
            RequestParser::parse(&event, "name").unwrap_err(),
            ParseError::MissingField("name".to_string())
        );
    }

    #[test]
    fn test_parse_update_invalid_json() {
        let event = json!({
            "httpMethod": "PUT",
            "body": "oops",
            "pathParameters": {"id": "rec-1"}
        });
        assert_eq!(RequestParser::parse(&event, "name").unwrap_err(), ParseError::InvalidJson);
    }

    #[test]
    fn test_parse_delete_missing_id() {
        let event = json!({"httpMethod": "DELETE", "pathParameters": null});
        assert_eq!(RequestParser::parse(&event, "name").unwrap_err(), ParseError::MissingId);
    }

    #[test]
    fn test_parse_error_display() {
        assert_eq!(ParseError::InvalidJson.to_string(), "request body is not valid JSON");
        assert_eq!(
            ParseError::UnsupportedMethod("PATCH".to_string()).to_string(),
            "unsupported method: PATCH"
        );
        assert_eq!(
            ParseError::MissingField("name".to_string()).to_string(),
            "missing field in request body: name"
        );
    }
}

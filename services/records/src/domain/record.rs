/// レコード
///
/// フィールド名から任意のJSON値へのマップ。主キー以外のフィールドには
/// スキーマを適用せず、受け取ったまま保存する。
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::RecordId;

/// テーブルに保存される1件のレコード
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// 呼び出し元のフィールドに主キーを設定してレコードを作成
    ///
    /// フィールドに主キーと同名のキーが含まれていても、生成済みのIDで上書きする。
    pub fn with_primary_key(mut fields: Map<String, Value>, primary_key: &str, id: &RecordId) -> Self {
        fields.insert(primary_key.to_string(), Value::String(id.as_str().to_string()));
        Self(fields)
    }

    /// 主キーの値を取得（文字列でない場合は`None`）
    pub fn id(&self, primary_key: &str) -> Option<&str> {
        self.0.get(primary_key).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("オブジェクトではありません"),
        }
    }

    #[test]
    fn test_with_primary_key_merges_fields() {
        let id = RecordId::parse("rec-1").unwrap();
        let record = Record::with_primary_key(fields(json!({"name": "Alice", "age": 30})), "id", &id);

        assert_eq!(record.id("id"), Some("rec-1"));
        assert_eq!(record.get("name"), Some(&json!("Alice")));
        assert_eq!(record.get("age"), Some(&json!(30)));
        assert_eq!(record.fields().len(), 3);
    }

    #[test]
    fn test_with_primary_key_overwrites_caller_key() {
        let id = RecordId::parse("generated").unwrap();
        let record = Record::with_primary_key(fields(json!({"id": "forged", "name": "x"})), "id", &id);

        assert_eq!(record.id("id"), Some("generated"));
    }

    #[test]
    fn test_custom_primary_key_name() {
        let id = RecordId::parse("k").unwrap();
        let record = Record::with_primary_key(Map::new(), "itemId", &id);

        assert_eq!(record.id("itemId"), Some("k"));
        assert!(record.id("id").is_none());
    }

    #[test]
    fn test_serde_is_transparent() {
        let record: Record = serde_json::from_value(json!({"id": "a", "tags": ["x", "y"]})).unwrap();
        assert_eq!(record.get("tags"), Some(&json!(["x", "y"])));
        assert_eq!(record.clone().into_value(), json!({"id": "a", "tags": ["x", "y"]}));
        assert_eq!(serde_json::to_value(&record).unwrap(), json!({"id": "a", "tags": ["x", "y"]}));
    }

    #[test]
    fn test_set_replaces_single_field() {
        let mut record: Record = serde_json::from_value(json!({"id": "a", "name": "Alice", "age": 1})).unwrap();
        record.set("name", json!("Bob"));

        assert_eq!(record.into_value(), json!({"id": "a", "name": "Bob", "age": 1}));
    }
}

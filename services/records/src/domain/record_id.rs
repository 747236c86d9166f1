/// レコードID
///
/// 主キーに格納される値。作成時にサーバー側でUUID v4から生成し、
/// 呼び出し元から受け取ることはない。
use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// レコードの主キー値
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// 新しいランダムなIDを生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// パスパラメータなど外部から受け取ったIDを検証して作成
    ///
    /// 空文字列または空白のみの場合は`None`を返す。
    /// 既存レコードのIDはUUID形式とは限らないため、形式は検証しない。
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

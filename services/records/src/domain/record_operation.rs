/// Record operation classification based on the HTTP method token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOperation {
    /// POST: insert a new record under a generated key
    Create,

    /// GET: full-table enumeration
    Read,

    /// PUT: partial update of the mutable field
    Update,

    /// DELETE: unconditional removal by key
    Delete,
}

/// Value of the `Allow` header sent with 405 responses
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE";

impl RecordOperation {
    /// Classify an HTTP method token
    ///
    /// Matching is case-sensitive: API Gateway always sends upper-case tokens.
    pub fn from_http_method(method: &str) -> Option<Self> {
        match method {
            "POST" => Some(RecordOperation::Create),
            "GET" => Some(RecordOperation::Read),
            "PUT" => Some(RecordOperation::Update),
            "DELETE" => Some(RecordOperation::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordOperation::Create => "create",
            RecordOperation::Read => "read",
            RecordOperation::Update => "update",
            RecordOperation::Delete => "delete",
        }
    }
}

use crate::domain::model::{DisplayValue, RawPayload};
use crate::domain::ports::PayloadParser;
use crate::utils::error::ParseError;

pub const DEFAULT_PARSED_TEXT: &str = "parsed";

/// 忽略輸入，回傳固定字串
#[derive(Debug, Clone)]
pub struct ConstantParser {
    text: String,
}

impl ConstantParser {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for ConstantParser {
    fn default() -> Self {
        Self::new(DEFAULT_PARSED_TEXT)
    }
}

impl PayloadParser for ConstantParser {
    fn parse(&self, _raw: &RawPayload) -> Result<DisplayValue, ParseError> {
        DisplayValue::new(self.text.clone())
    }
}

/// UTF-8 文字，去除前後空白
#[derive(Debug, Clone, Default)]
pub struct TextParser;

impl PayloadParser for TextParser {
    fn parse(&self, raw: &RawPayload) -> Result<DisplayValue, ParseError> {
        let text = std::str::from_utf8(raw.as_bytes()).map_err(|e| ParseError::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        })?;
        DisplayValue::new(text.trim())
    }
}

/// 以 JSON pointer (RFC 6901) 取出欄位
#[derive(Debug, Clone)]
pub struct JsonFieldParser {
    pointer: String,
}

impl JsonFieldParser {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
        }
    }

    pub fn pointer(&self) -> &str {
        &self.pointer
    }
}

impl PayloadParser for JsonFieldParser {
    fn parse(&self, raw: &RawPayload) -> Result<DisplayValue, ParseError> {
        let json: serde_json::Value = serde_json::from_slice(raw.as_bytes())
            .map_err(|e| ParseError::InvalidJson(e.to_string()))?;

        let field = json
            .pointer(&self.pointer)
            .ok_or_else(|| ParseError::MissingField(self.pointer.clone()))?;

        // 字串直接顯示，其餘型別用 JSON 表示
        let text = match field {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => return Err(ParseError::MissingField(self.pointer.clone())),
            other => other.to_string(),
        };
        DisplayValue::new(text)
    }
}

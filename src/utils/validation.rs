use crate::utils::error::{AppError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> AppError {
    AppError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

/// key 必須是相對檔名，不可跳出 base_path
pub fn validate_store_key(field_name: &str, key: &str) -> Result<()> {
    validate_path(field_name, key)?;

    let path = std::path::Path::new(key);
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir));
    if escapes {
        return Err(invalid(
            field_name,
            key,
            "Key must be a relative path inside the store",
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_http_method(field_name: &str, method: &str) -> Result<()> {
    let valid_methods = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD"];
    if !valid_methods.contains(&method.to_ascii_uppercase().as_str()) {
        return Err(invalid(
            field_name,
            method,
            format!(
                "Unsupported method. Valid methods: {}",
                valid_methods.join(", ")
            ),
        ));
    }
    Ok(())
}

/// RFC 6901：空字串或以 `/` 開頭
pub fn validate_json_pointer(field_name: &str, pointer: &str) -> Result<()> {
    if !pointer.is_empty() && !pointer.starts_with('/') {
        return Err(invalid(
            field_name,
            pointer,
            "JSON pointer must be empty or start with '/'",
        ));
    }
    Ok(())
}

use crate::utils::error::{FetchError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(FetchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(FetchError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(FetchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(FetchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(FetchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Output artifact names are written inside the output directory and may not escape it.
pub fn validate_file_name(field_name: &str, name: &str) -> Result<()> {
    validate_path(field_name, name)?;

    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(FetchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "File name cannot contain path separators".to_string(),
        });
    }

    if !name.ends_with(".json") {
        return Err(FetchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Output files must use the .json extension".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FetchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_unique<'a, I>(field_name: &str, values: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(FetchError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.to_string(),
                reason: "Duplicate value".to_string(),
            });
        }
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
        return Err(FetchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("sources.ladder[0].url", "https://www.nrl.com/draw/").is_ok());
        assert!(validate_url("sources.ladder[0].url", "http://localhost:8080/x").is_ok());
        assert!(validate_url("sources.ladder[0].url", "").is_err());
        assert!(validate_url("sources.ladder[0].url", "not a url").is_err());
        assert!(validate_url("sources.ladder[0].url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("output.combined_file", "nrl_live_data.json").is_ok());
        assert!(validate_file_name("output.combined_file", "../ladder.json").is_err());
        assert!(validate_file_name("output.combined_file", "ladder.csv").is_err());
        assert!(validate_file_name("output.combined_file", "").is_err());
    }

    #[test]
    fn test_validate_unique() {
        assert!(validate_unique("ids", ["a", "b"]).is_ok());
        assert!(validate_unique("ids", ["a", "b", "a"]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("http.timeout_seconds", 10u64, 1, 300).is_ok());
        assert!(validate_range("http.timeout_seconds", 0u64, 1, 300).is_err());
        assert!(validate_range("http.timeout_seconds", 301u64, 1, 300).is_err());
    }
}

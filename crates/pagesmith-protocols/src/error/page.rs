//! Page access errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Page read failed: {0}")]
    Read(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Element not found: {0}")]
    ElementNotFound(i64),

    #[error("DOM mutation failed: {0}")]
    Mutation(String),

    #[error("Page connection error: {0}")]
    Connection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_error_read() {
        let err = PageError::Read("cookies denied".to_string());
        assert!(err.to_string().contains("cookies denied"));
    }

    #[test]
    fn test_page_error_invalid_selector() {
        let err = PageError::InvalidSelector("##".to_string());
        assert!(err.to_string().contains("Invalid selector"));
    }

    #[test]
    fn test_page_error_element_not_found() {
        let err = PageError::ElementNotFound(42);
        assert!(err.to_string().contains("42"));
    }
}

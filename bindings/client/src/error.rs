use std::time::Duration;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Errors produced while driving the browser.
///
/// All of these are fatal for the run that hit them. There is no retry layer; the runner
/// propagates the first failure and the process exits non-zero.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("browser connection failed: {0}")]
    Connection(String),

    #[error("navigation to {url} did not complete within {timeout:?}")]
    NavigationTimeout { url: String, timeout: Duration },

    #[error("page never became ready: {condition} (waited {timeout:?})")]
    ReadinessTimeout {
        condition: String,
        timeout: Duration,
    },

    #[error("extraction failed for {field}: {reason}")]
    Extraction { field: String, reason: String },

    #[error("validation failed for {field}: got {actual}, want {expected}")]
    ValidationMismatch {
        field: String,
        actual: String,
        expected: String,
    },

    #[error(transparent)]
    Cdp(#[from] chromiumoxide::error::CdpError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mismatch_message_names_the_field_and_both_values() {
        let err = ClientError::ValidationMismatch {
            field: "price".to_string(),
            actual: "199.99".to_string(),
            expected: "244.99".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "validation failed for price: got 199.99, want 244.99"
        );
    }

    #[test]
    fn diagnostics_fit_on_a_single_line() {
        let errors = vec![
            ClientError::Connection("refused".to_string()),
            ClientError::NavigationTimeout {
                url: "http://127.0.0.1:1234/campfire-commerce/".to_string(),
                timeout: Duration::from_secs(4),
            },
            ClientError::ReadinessTimeout {
                condition: "text in '#product-price'".to_string(),
                timeout: Duration::from_millis(100),
            },
            ClientError::Extraction {
                field: "price".to_string(),
                reason: "missing currency value".to_string(),
            },
        ];

        for err in errors {
            assert!(!err.to_string().contains('\n'), "multi-line: {err}");
        }
    }
}

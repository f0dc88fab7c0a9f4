pub type PixmarkResult<T> = Result<T, Failure>;

/// Fatal conditions. Each one stops processing and produces no output file.
///
/// Degraded conditions (unknown filter, missing font) are never reported
/// through this type; they are logged and processing continues.
#[derive(thiserror::Error, Debug)]
pub enum Failure {
    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("write error: {0}")]
    Write(String),
}

impl Failure {
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(Failure::fetch("x").to_string().starts_with("fetch error:"));
        assert!(Failure::decode("x").to_string().starts_with("decode error:"));
        assert!(Failure::write("x").to_string().starts_with("write error:"));
    }

    #[test]
    fn message_is_carried() {
        let err = Failure::fetch("HTTP 404 Not Found");
        assert_eq!(err.to_string(), "fetch error: HTTP 404 Not Found");
    }
}

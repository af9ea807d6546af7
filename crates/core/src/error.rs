use thiserror::Error;

/// Errors produced while compressing or decompressing a point cloud.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Parameters or points the codec cannot represent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A hybrid-coder offset could not be made to fit a signed byte.
    #[error("quantized offset {offset} does not fit [-128, 127] at depth {depth}")]
    QuantizationOverflow { depth: usize, offset: i64 },

    /// A decoder ran out of data before the traversal completed.
    #[error("{stream} stream exhausted before decoding finished")]
    DecodeStreamExhausted { stream: &'static str },

    /// The blob is structurally inconsistent.
    #[error("malformed blob: {0}")]
    MalformedBlob(String),

    /// The integer packer backend failed.
    #[error("integer packer failed: {0}")]
    Packer(String),
}

impl CodecError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedBlob(message.into())
    }

    pub fn exhausted(stream: &'static str) -> Self {
        Self::DecodeStreamExhausted { stream }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::CodecError;

    #[test]
    fn messages_name_the_failure() {
        let err = CodecError::exhausted("tree");
        assert_eq!(err.to_string(), "tree stream exhausted before decoding finished");

        let err = CodecError::QuantizationOverflow {
            depth: 3,
            offset: 200,
        };
        assert!(err.to_string().contains("200"));
        assert!(err.to_string().contains("depth 3"));
    }
}

use thiserror::Error;

use crate::source::SourceInfo;
use crate::types::Type;

/// Internal compiler errors. A correctly type-checked tree never produces
/// these; when one surfaces the compilation of that template is abandoned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("can't convert {from} to {to} at {info}")]
    IllegalConversion {
        from: String,
        to: Type,
        info: SourceInfo,
    },
    #[error("malformed tree at {info}: {message}")]
    MalformedTree { message: String, info: SourceInfo },
}

impl TreeError {
    pub fn malformed<S: Into<String>>(message: S, info: SourceInfo) -> Self {
        TreeError::MalformedTree {
            message: message.into(),
            info,
        }
    }

    pub fn info(&self) -> SourceInfo {
        match self {
            TreeError::IllegalConversion { info, .. } | TreeError::MalformedTree { info, .. } => {
                *info
            }
        }
    }
}

pub type TreeResult<T> = Result<T, TreeError>;

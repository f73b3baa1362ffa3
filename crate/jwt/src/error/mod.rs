use thiserror::Error;

pub mod result;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("algorithm not in allow-list: {0}")]
    AlgorithmMismatch(String),

    #[error("invalid claims JSON: {0}")]
    ClaimParse(String),

    #[error("{0}")]
    Default(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("token not valid before {0}")]
    NotBefore(i64),

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("OpenSSL Error: {0}")]
    OpenSsl(String),

    #[error("token expired at {0}")]
    TokenExpired(i64),
}

impl From<openssl::error::ErrorStack> for JwtError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::OpenSsl(format!("Error: {e}. Details: {e:?}"))
    }
}

/// Construct a [`JwtError::Default`] from a string.
#[macro_export]
macro_rules! jwt_error {
    ($msg:literal) => {
        $crate::error::JwtError::Default(::core::format_args!($msg).to_string())
    };
    ($err:expr $(,)?) => ({
        $crate::error::JwtError::Default($err.to_string())
    });
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::JwtError::Default(::core::format_args!($fmt, $($arg)*).to_string())
    };
}

/// Return early with an error.
#[macro_export]
macro_rules! jwt_bail {
    ($msg:literal) => {
        return ::core::result::Result::Err($crate::jwt_error!($msg))
    };
    ($err:expr $(,)?) => {
        return ::core::result::Result::Err($err)
    };
    ($fmt:expr, $($arg:tt)*) => {
        return ::core::result::Result::Err($crate::jwt_error!($fmt, $($arg)*))
    };
}

/// Return early with an error if a condition is not satisfied.
///
/// This macro is equivalent to `if !$cond { return Err(From::from($err)); }`.
#[macro_export]
macro_rules! jwt_ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($crate::jwt_error!($msg));
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return ::core::result::Result::Err($crate::jwt_error!($fmt, $($arg)*));
        }
    };
}

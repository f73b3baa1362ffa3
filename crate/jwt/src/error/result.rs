use crate::error::JwtError;

pub type JwtResult<R> = Result<R, JwtError>;

pub trait JwtResultHelper<T> {
    fn context(self, context: &str) -> JwtResult<T>;
}

impl<T, E> JwtResultHelper<T> for Result<T, E>
where
    E: std::error::Error,
{
    fn context(self, context: &str) -> JwtResult<T> {
        self.map_err(|e| JwtError::Default(format!("{context}: {e}")))
    }
}

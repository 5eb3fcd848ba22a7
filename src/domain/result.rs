//! Result type alias for the PDO client

use super::errors::I2b2Error;

/// Result type alias for client operations
///
/// # Examples
///
/// ```
/// use i2b2_pdo::domain::result::Result;
/// use i2b2_pdo::domain::errors::I2b2Error;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(I2b2Error::Configuration("missing proxy_url".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, I2b2Error>;

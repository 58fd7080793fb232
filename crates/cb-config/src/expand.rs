//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` references in `value`.
///
/// `field` names the config entry and is only used in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

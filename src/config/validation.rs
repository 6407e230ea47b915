use super::*;

impl SdclConfig {
    /// Get a value and check it with `validator`; `valid_values` describes
    /// what is accepted and ends up in the error hint.
    pub fn get_validated<T, F>(&self, path: &str, validator: F, valid_values: &str) -> Result<T>
    where
        T: TryFrom<Value, Error = SdclError>,
        F: FnOnce(&T) -> bool,
    {
        let typed_value: T = self.get(path)?;

        if !validator(&typed_value) {
            let pos = helpers::key_position(&self.document, path).unwrap_or_default();
            return Err(SdclError::TypeError {
                message: format!("Invalid value for `{}`", path),
                line: pos.line,
                column: pos.column,
                hint: Some(format!("Valid values are: {}", valid_values)),
                code: Some(450),
            });
        }

        Ok(typed_value)
    }

    /// Get a string and check it is one of `allowed_values` (case-insensitive).
    pub fn get_string_enum(&self, path: &str, allowed_values: &[&str]) -> Result<String> {
        let value: String = self.get(path)?;

        if !allowed_values.iter().any(|v| v.eq_ignore_ascii_case(&value)) {
            let pos = helpers::key_position(&self.document, path).unwrap_or_default();
            return Err(SdclError::TypeError {
                message: format!("Invalid value '{}' for `{}`", value, path),
                line: pos.line,
                column: pos.column,
                hint: Some(format!("Expected one of: {}", allowed_values.join(", "))),
                code: Some(451),
            });
        }

        Ok(value)
    }
}

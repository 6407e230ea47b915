use super::*;
use crate::error::ResolutionErrorKind;
use crate::lexer::Position;

impl SdclConfig {
    /// Get a typed value from the configuration using dot notation.
    ///
    /// Automatically handles both `snake_case` and `kebab-case` key names.
    ///
    /// # Examples
    /// ```
    /// # use sdcl::SdclConfig;
    /// let config = SdclConfig::from_str("server: { host: \"localhost\", port: 8080 }\ndebug: true\n").unwrap();
    /// let host: String = config.get("server.host").unwrap();
    /// let port: u16 = config.get("server.port").unwrap();
    /// let debug: bool = config.get("debug").unwrap();
    /// assert_eq!((host.as_str(), port, debug), ("localhost", 8080, true));
    /// ```
    ///
    /// # Errors
    /// Returns error if path doesn't exist or value can't be converted to type T.
    pub fn get<T>(&self, path: &str) -> Result<T>
    where
        T: TryFrom<Value, Error = SdclError>,
    {
        let value = self.get_value_flexible(path)?;
        T::try_from(value).map_err(|e| helpers::locate_type_error(e, path, &self.document))
    }

    /// Get an optional typed value - returns `None` if key doesn't exist.
    pub fn get_optional<T>(&self, path: &str) -> Result<Option<T>>
    where
        T: TryFrom<Value, Error = SdclError>,
    {
        match self.get_value_flexible(path) {
            Ok(value) => Ok(Some(
                T::try_from(value).map_err(|e| helpers::locate_type_error(e, path, &self.document))?,
            )),
            Err(e) if e.resolution_kind() == Some(ResolutionErrorKind::Unresolved) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get a value with a fallback default.
    ///
    /// # Examples
    /// ```
    /// # use sdcl::SdclConfig;
    /// let config = SdclConfig::from_str("name: \"demo\"\n").unwrap();
    /// assert_eq!(config.get_or("server.timeout", 30u64), 30);
    /// ```
    pub fn get_or<T>(&self, path: &str, default: T) -> T
    where
        T: TryFrom<Value, Error = SdclError>,
    {
        self.get(path).unwrap_or(default)
    }

    /// Typed value from the front matter block only.
    pub fn front_matter<T>(&self, key: &str) -> Result<T>
    where
        T: TryFrom<Value, Error = SdclError>,
    {
        let value = self
            .resolved
            .front_matter
            .get(key)
            .ok_or_else(|| not_found(&format!("front matter key '{}'", key)))?;
        T::try_from(Value::clone(value)).map_err(|e| helpers::locate_type_error(e, key, &self.document))
    }

    /// Tries the path as written, then `snake_case`/`kebab-case` spellings of
    /// each segment.
    fn get_value_flexible(&self, path: &str) -> Result<Value> {
        if let Ok(v) = self.get_value(path) {
            return Ok(v);
        }
        if path.trim().is_empty() {
            return self.get_value(path);
        }

        let segs: Vec<&str> = path.split('.').collect();

        fn variants(seg: &str) -> Vec<String> {
            let mut out = vec![seg.to_string(), seg.replace('-', "_"), seg.replace('_', "-")];
            out.sort();
            out.dedup();
            out
        }

        fn dfs(cfg: &SdclConfig, segs: &[&str], i: usize, cur: &mut Vec<String>) -> Option<Value> {
            if i == segs.len() {
                return cfg.get_value(&cur.join(".")).ok();
            }
            for v in variants(segs[i]) {
                cur.push(v);
                if let Some(val) = dfs(cfg, segs, i + 1, cur) {
                    return Some(val);
                }
                cur.pop();
            }
            None
        }

        dfs(self, &segs, 0, &mut Vec::new()).ok_or_else(|| not_found(&format!("path '{}'", path)))
    }

    /// Get the resolved `Value` at a dotted path. The empty path returns the
    /// whole document as an object.
    pub fn get_value(&self, path: &str) -> Result<Value> {
        if path.trim().is_empty() {
            return Ok(self.resolved.to_value());
        }
        self.resolved
            .lookup(path)
            .cloned()
            .ok_or_else(|| not_found(&format!("path '{}'", path)))
    }

    /// Get all keys at a given path level, in document order.
    ///
    /// # Examples
    /// ```
    /// # use sdcl::SdclConfig;
    /// let config = SdclConfig::from_str("server: { host: \"a\", port: 1 }\n").unwrap();
    /// assert_eq!(config.get_keys("server").unwrap(), vec!["host", "port"]);
    /// ```
    pub fn get_keys(&self, path: &str) -> Result<Vec<String>> {
        match self.get_value_flexible(path)? {
            Value::Object(items) => Ok(items.keys().cloned().collect()),
            other => Err(SdclError::TypeError {
                message: format!("Path '{}' is {}, not an object", path, other.type_name()),
                line: 0,
                column: 0,
                hint: Some("Only objects have keys".into()),
                code: Some(406),
            }),
        }
    }

    /// Check if a configuration path exists.
    pub fn has(&self, path: &str) -> bool {
        self.get_value_flexible(path).is_ok()
    }
}

fn not_found(what: &str) -> SdclError {
    SdclError::resolution(
        ResolutionErrorKind::Unresolved,
        format!("No value for {} in configuration", what),
        Position { offset: 0, line: 0, column: 0 },
        Some("Check that the path exists in your config file"),
    )
}

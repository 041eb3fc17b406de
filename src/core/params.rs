//! CitcomS input-file parameters.
//!
//! An input file is a list of `key=value` tokens with `#` comments. Values
//! are kept as raw text and converted on lookup, so a parameter only has to
//! be well-formed if it is actually used.

use crate::core::error::{CombineError, CombineResult};
use indexmap::IndexMap;
use std::path::Path;

/// Ordered table of default parameter values.
///
/// Passed explicitly into [`InputParameters::new`]; nothing reads it as
/// ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defaults {
    values: IndexMap<String, String>,
}

impl Defaults {
    /// Empty defaults table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults of a CitcomS run.
    ///
    /// `nproc_surf`, `datadir` and `datafile` have no default and must come
    /// from the input file.
    pub fn citcoms() -> Self {
        Self::new()
            .with("output_format", "ascii")
            .with("nprocx", 1)
            .with("nprocy", 1)
            .with("nprocz", 1)
            .with("nodex", 9)
            .with("nodey", 9)
            .with("nodez", 9)
    }

    /// Add or replace a default value.
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.values.insert(name.into(), value.to_string());
        self
    }

    /// Raw default for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of defaults.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parameters of a run: defaults overridden by the input file.
#[derive(Debug, Clone)]
pub struct InputParameters {
    values: IndexMap<String, String>,
}

impl InputParameters {
    /// Seed a parameter table with `defaults`.
    pub fn new(defaults: &Defaults) -> Self {
        Self {
            values: defaults.values.clone(),
        }
    }

    /// Load `path` on top of `defaults`.
    pub fn load(defaults: &Defaults, path: &Path) -> CombineResult<Self> {
        let mut params = Self::new(defaults);
        params.read(path)?;
        Ok(params)
    }

    /// Merge the assignments of an input file.
    pub fn read(&mut self, path: &Path) -> CombineResult<()> {
        let content = std::fs::read_to_string(path).map_err(|source| CombineError::InputRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.read_str(&content);
        tracing::debug!(path = %path.display(), parameters = self.values.len(), "input file read");
        Ok(())
    }

    /// Merge the assignments found in `content`.
    pub fn read_str(&mut self, content: &str) {
        for line in content.lines() {
            let line = match line.find('#') {
                Some(pos) => &line[..pos],
                None => line,
            };
            for token in line.split_whitespace() {
                if let Some((key, value)) = token.split_once('=') {
                    if !key.is_empty() {
                        self.values.insert(key.to_string(), value.to_string());
                    }
                }
            }
        }
    }

    /// Whether `name` has a value.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate over `(name, raw value)` pairs in first-assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn raw(&self, name: &str) -> CombineResult<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| CombineError::MissingParameter {
                name: name.to_string(),
            })
    }

    /// String value with one pair of surrounding quotes removed.
    pub fn get_str(&self, name: &str) -> CombineResult<String> {
        Ok(unquote(self.raw(name)?).to_string())
    }

    /// Integer value.
    pub fn get_int(&self, name: &str) -> CombineResult<i64> {
        let raw = self.raw(name)?;
        unquote(raw)
            .parse::<i64>()
            .map_err(|_| CombineError::type_mismatch(name, raw, "integer"))
    }

    /// Floating-point value.
    pub fn get_float(&self, name: &str) -> CombineResult<f64> {
        let raw = self.raw(name)?;
        unquote(raw)
            .parse::<f64>()
            .map_err(|_| CombineError::type_mismatch(name, raw, "float"))
    }

    /// Boolean value: `1/0`, `on/off`, `true/false` or `yes/no`.
    pub fn get_bool(&self, name: &str) -> CombineResult<bool> {
        let raw = self.raw(name)?;
        match unquote(raw).to_ascii_lowercase().as_str() {
            "1" | "on" | "true" | "yes" => Ok(true),
            "0" | "off" | "false" | "no" => Ok(false),
            _ => Err(CombineError::type_mismatch(name, raw, "boolean")),
        }
    }
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citcoms_defaults_leave_cap_count_unset() {
        let defaults = Defaults::citcoms();
        assert_eq!(defaults.get("output_format"), Some("ascii"));
        assert_eq!(defaults.get("nodez"), Some("9"));
        assert_eq!(defaults.get("nproc_surf"), None);
        assert_eq!(defaults.len(), 7);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let mut params = InputParameters::new(&Defaults::new());
        params.read_str(
            "# header comment\n\n  nodex=17   nodey=33 # trailing comment nodez=5\nnodez=65\n",
        );
        assert_eq!(params.get_int("nodex").unwrap(), 17);
        assert_eq!(params.get_int("nodey").unwrap(), 33);
        assert_eq!(params.get_int("nodez").unwrap(), 65);
    }

    #[test]
    fn tokens_without_key_are_ignored() {
        let mut params = InputParameters::new(&Defaults::new());
        params.read_str("solver cg\n=orphan\nnote=a=b\n");
        assert!(!params.contains("solver"));
        assert!(!params.contains(""));
        assert_eq!(params.get_str("note").unwrap(), "a=b");
    }

    #[test]
    fn later_assignments_override_earlier_ones() {
        let mut params = InputParameters::new(&Defaults::citcoms());
        params.read_str("nprocx=2\nnprocx=4\n");
        assert_eq!(params.get_int("nprocx").unwrap(), 4);
    }

    #[test]
    fn iteration_follows_first_assignment() {
        let mut params = InputParameters::new(&Defaults::new().with("nodex", 9));
        params.read_str("datafile=a nodex=17 datadir=b datafile=c");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(
            pairs,
            [("nodex", "17"), ("datafile", "c"), ("datadir", "b")]
        );
    }

    #[test]
    fn quotes_are_stripped_from_values() {
        let mut params = InputParameters::new(&Defaults::new());
        params.read_str("datafile=\"regional\" datadir='out' odd=\"x'\n");
        assert_eq!(params.get_str("datafile").unwrap(), "regional");
        assert_eq!(params.get_str("datadir").unwrap(), "out");
        assert_eq!(params.get_str("odd").unwrap(), "\"x'");
    }

    #[test]
    fn typed_lookups_report_mismatches() {
        let mut params = InputParameters::new(&Defaults::new());
        params.read_str("nodex=9.5 visc=1e21 stokes=on restart=maybe");
        assert!(matches!(
            params.get_int("nodex"),
            Err(CombineError::TypeMismatch { expected: "integer", .. })
        ));
        assert_eq!(params.get_float("visc").unwrap(), 1e21);
        assert!(params.get_bool("stokes").unwrap());
        assert!(matches!(
            params.get_bool("restart"),
            Err(CombineError::TypeMismatch { expected: "boolean", .. })
        ));
    }

    #[test]
    fn missing_parameter_is_an_error() {
        let params = InputParameters::new(&Defaults::citcoms());
        match params.get_int("nproc_surf") {
            Err(CombineError::MissingParameter { name }) => assert_eq!(name, "nproc_surf"),
            other => panic!("expected missing parameter, got {:?}", other),
        }
    }
}

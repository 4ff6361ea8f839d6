//! Python version normalization and the derived strings templates need

use std::fmt;

/// Newest Python minor release classifiers are generated up to when no
/// maximum version is configured
pub const LATEST_PYTHON_MINOR: u32 = 13;

/// Minimum version used when a config template is generated without one
pub const DEFAULT_MIN_PYTHON: PythonVersion = PythonVersion { major: 3, minor: 10 };

/// A Python `major.minor` version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
}

impl PythonVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse the version formats found in configs and on the command line:
    /// `3.10`, `3.10.4`, `3.10 final`, `py310`, `3` and `3,10`.
    pub fn parse(input: &str) -> Result<Self, String> {
        let cleaned = input.trim().to_ascii_lowercase();
        if cleaned.is_empty() {
            return Err("empty version string".to_string());
        }

        // Ruff style: py310
        if let Some(digits) = cleaned.strip_prefix("py") {
            if digits.len() >= 2 && digits.chars().all(|c| c.is_ascii_digit()) {
                let (major, minor) = digits.split_at(1);
                return Ok(Self::new(parse_number(major)?, parse_number(minor)?));
            }
            return Err(format!("invalid ruff-style version '{}'", input.trim()));
        }

        // Trailing words such as "final" are ignored
        let head = cleaned.split_whitespace().next().unwrap_or_default();
        let separator = if head.contains(',') { ',' } else { '.' };
        let mut parts = head.split(separator);

        let major = parse_number(parts.next().unwrap_or_default())?;
        let minor = match parts.next() {
            Some(minor) => parse_number(minor)?,
            None => 0,
        };
        if separator == ',' && parts.next().is_some() {
            return Err(format!("expected 'major,minor', got '{}'", input.trim()));
        }
        if minor > 99 {
            return Err(format!("invalid minor version {}", minor));
        }

        Ok(Self::new(major, minor))
    }

    /// `requires-python` specifier; the maximum is inclusive
    pub fn requires_python(&self, max: Option<PythonVersion>) -> String {
        match max {
            Some(max) => format!(">={},<{}.{}", self, max.major, max.minor + 1),
            None => format!(">={}", self),
        }
    }

    /// Trove classifiers for every supported minor version
    pub fn classifiers(&self, max: Option<PythonVersion>) -> Vec<String> {
        let last = max.map_or(LATEST_PYTHON_MINOR.max(self.minor), |m| m.minor);
        (self.minor..=last)
            .map(|minor| format!("Programming Language :: Python :: {}.{}", self.major, minor))
            .collect()
    }

    pub fn ruff_target(&self) -> String {
        format!("py{}{}", self.major, self.minor)
    }

    pub fn mypy_version(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn parse_number(s: &str) -> Result<u32, String> {
    s.trim()
        .parse::<u32>()
        .map_err(|_| format!("'{}' is not a version number", s.trim()))
}

/// Parse a version string into its `(major, minor)` pair
pub fn normalize_version(input: &str) -> Result<(u32, u32), String> {
    PythonVersion::parse(input).map(|v| (v.major, v.minor))
}

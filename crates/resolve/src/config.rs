use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolveConfig {
    #[serde(default)]
    pub schema: Schema,
    #[serde(default)]
    pub keys: KeyConfig,
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub dates: DateWindow,
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Names of the fields the engine treats specially.
///
/// Every field named here is reserved: it is never used as a
/// deduplication key, whatever its score.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default = "default_create_date")]
    pub create_date: String,
    #[serde(default = "default_update_date")]
    pub update_date: String,
    /// Extra date-typed fields to sanitize (e.g. a birth date). Not reserved.
    #[serde(default = "default_date_fields")]
    pub date_fields: Vec<String>,
    /// Extra fields excluded from key selection.
    #[serde(default)]
    pub reserved: Vec<String>,
}

fn default_id_field() -> String {
    "client_id".into()
}

fn default_create_date() -> String {
    "create_date".into()
}

fn default_update_date() -> String {
    "update_date".into()
}

fn default_date_fields() -> Vec<String> {
    vec!["client_bday".into()]
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            id_field: default_id_field(),
            create_date: default_create_date(),
            update_date: default_update_date(),
            date_fields: default_date_fields(),
            reserved: Vec::new(),
        }
    }
}

impl Schema {
    pub fn is_reserved(&self, field: &str) -> bool {
        field == self.id_field
            || field == self.create_date
            || field == self.update_date
            || self.reserved.iter().any(|r| r == field)
    }

    /// All date-typed fields, record dates first.
    pub fn all_date_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.create_date.as_str(), self.update_date.as_str()];
        for f in &self.date_fields {
            if !fields.contains(&f.as_str()) {
                fields.push(f.as_str());
            }
        }
        fields
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyConfig {
    /// A field becomes a key when its combined score is strictly above this.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Pinned key fields. Skips threshold selection when set.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

pub const DEFAULT_THRESHOLD: f64 = 20.0;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            fields: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Freshest record wins, older records fill its gaps.
    #[default]
    LatestWithFill,
    /// Column-wise first non-null, dates reduced to min/max.
    FirstValueAggregate,
}

impl std::fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LatestWithFill => write!(f, "latest_with_fill"),
            Self::FirstValueAggregate => write!(f, "first_value_aggregate"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    #[serde(default)]
    pub policy: MergePolicy,
    /// Exclude records with a null update date from the merge; groups with
    /// no dated member produce no golden record.
    #[serde(default)]
    pub drop_undated_groups: bool,
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Inclusive range of years a timestamp must fall in to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateWindow {
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    #[serde(default = "default_max_year")]
    pub max_year: i32,
}

fn default_min_year() -> i32 {
    1924
}

fn default_max_year() -> i32 {
    2024
}

impl Default for DateWindow {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            max_year: default_max_year(),
        }
    }
}

impl DateWindow {
    pub fn contains(&self, year: i32) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ResolveConfig {
    pub fn from_toml(input: &str) -> Result<Self, ResolveError> {
        let config: ResolveConfig =
            toml::from_str(input).map_err(|e| ResolveError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ResolveError> {
        let threshold = self.keys.threshold;
        if !threshold.is_finite() || !(0.0..100.0).contains(&threshold) {
            return Err(ResolveError::ConfigValidation(format!(
                "keys.threshold must be in [0, 100), got {threshold}"
            )));
        }

        if self.dates.min_year > self.dates.max_year {
            return Err(ResolveError::ConfigValidation(format!(
                "dates.min_year ({}) is after dates.max_year ({})",
                self.dates.min_year, self.dates.max_year
            )));
        }

        let schema = &self.schema;
        if schema.create_date == schema.update_date {
            return Err(ResolveError::ConfigValidation(format!(
                "schema.create_date and schema.update_date both name '{}'",
                schema.create_date
            )));
        }

        if let Some(ref fields) = self.keys.fields {
            if fields.is_empty() {
                return Err(ResolveError::ConfigValidation(
                    "keys.fields must name at least one field when set".into(),
                ));
            }
            for field in fields {
                if schema.is_reserved(field) {
                    return Err(ResolveError::ConfigValidation(format!(
                        "keys.fields: '{field}' is reserved and cannot be a key"
                    )));
                }
            }
            for (i, field) in fields.iter().enumerate() {
                if fields[..i].contains(field) {
                    return Err(ResolveError::ConfigValidation(format!(
                        "keys.fields: '{field}' listed twice"
                    )));
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[schema]
id_field = "customer_id"
create_date = "created"
update_date = "updated"
date_fields = ["birthday"]
reserved = ["source_system"]

[keys]
threshold = 22.5

[merge]
policy = "first_value_aggregate"
drop_undated_groups = true

[dates]
min_year = 1950
max_year = 2030
"#;

    #[test]
    fn parse_full() {
        let config = ResolveConfig::from_toml(FULL).unwrap();
        assert_eq!(config.schema.id_field, "customer_id");
        assert_eq!(config.schema.all_date_fields(), vec!["created", "updated", "birthday"]);
        assert!(config.schema.is_reserved("source_system"));
        assert!(config.schema.is_reserved("updated"));
        assert!(!config.schema.is_reserved("birthday"));
        assert_eq!(config.keys.threshold, 22.5);
        assert_eq!(config.merge.policy, MergePolicy::FirstValueAggregate);
        assert!(config.merge.drop_undated_groups);
        assert!(config.dates.contains(1950));
        assert!(!config.dates.contains(2031));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = ResolveConfig::from_toml("").unwrap();
        assert_eq!(config.schema.id_field, "client_id");
        assert_eq!(config.schema.create_date, "create_date");
        assert_eq!(config.schema.update_date, "update_date");
        assert_eq!(config.keys.threshold, DEFAULT_THRESHOLD);
        assert!(config.keys.fields.is_none());
        assert_eq!(config.merge.policy, MergePolicy::LatestWithFill);
        assert!(!config.merge.drop_undated_groups);
        assert_eq!(config.dates, DateWindow { min_year: 1924, max_year: 2024 });
    }

    #[test]
    fn reject_unknown_policy() {
        let err = ResolveConfig::from_toml("[merge]\npolicy = \"vote\"\n");
        assert!(matches!(err, Err(ResolveError::ConfigParse(_))));
    }

    #[test]
    fn reject_reserved_pinned_key() {
        let err = ResolveConfig::from_toml("[keys]\nfields = [\"phone\", \"update_date\"]\n")
            .unwrap_err();
        assert!(err.to_string().contains("'update_date' is reserved"));
    }

    #[test]
    fn reject_duplicate_pinned_key() {
        let err = ResolveConfig::from_toml("[keys]\nfields = [\"phone\", \"phone\"]\n")
            .unwrap_err();
        assert!(err.to_string().contains("listed twice"));
    }

    #[test]
    fn reject_bad_threshold() {
        let err = ResolveConfig::from_toml("[keys]\nthreshold = 100.0\n").unwrap_err();
        assert!(err.to_string().contains("keys.threshold"));
    }

    #[test]
    fn reject_inverted_date_window() {
        let err = ResolveConfig::from_toml("[dates]\nmin_year = 2000\nmax_year = 1990\n")
            .unwrap_err();
        assert!(err.to_string().contains("min_year"));
    }
}

use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{PortalError, Result};
use crate::models::District;
use crate::utils::constants::{
    CONFIG_FILE_NAME, DEFAULT_DATA_DIR, DEFAULT_FILE_EXTENSION, DEFAULT_MIN_DATE, ENV_PREFIX,
};

/// Where district files live and which dates may be queried.
///
/// Sources, later ones winning: built-in defaults, `pm25-portal.toml` in the
/// working directory (or an explicit file), then `PM25_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PortalConfig {
    #[validate(length(min = 1))]
    pub data_dir: String,

    #[validate(length(min = 1))]
    pub file_extension: String,

    pub min_date: NaiveDate,
}

impl PortalConfig {
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("data_dir", DEFAULT_DATA_DIR)?
            .set_default("file_extension", DEFAULT_FILE_EXTENSION)?
            .set_default("min_date", DEFAULT_MIN_DATE)?;

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(CONFIG_FILE_NAME).required(false)),
        };

        let config: PortalConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<String>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn data_dir(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// Backing file for a district: `<data_dir>/Cleaned_<District>.<ext>`
    pub fn district_path(&self, district: District) -> PathBuf {
        self.data_dir().join(district.file_name(&self.file_extension))
    }

    /// Query dates are limited to `[min_date, today]`
    pub fn validate_date(&self, date: NaiveDate, today: NaiveDate) -> Result<()> {
        if date < self.min_date || date > today {
            return Err(PortalError::DateOutOfRange {
                date,
                min: self.min_date,
                max: today,
            });
        }
        Ok(())
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            min_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
        }
    }
}

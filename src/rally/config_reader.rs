use crate::rally::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "eventName")]
    pub event_name: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    /// Seconds between two reads of the sheets, in watch mode.
    #[serde(rename = "pollInterval")]
    pub poll_interval: Option<u64>,
}

/// The kind of export a sheet is read from.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    Xlsx,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SheetSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// For workbooks. The first worksheet is used when not provided.
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
}

impl SheetSource {
    /// A source given on the command line: the provider follows the extension.
    pub fn from_path(path: &str) -> SheetSource {
        let provider = if path.to_lowercase().ends_with(".xlsx") {
            "xlsx"
        } else {
            "csv"
        };
        SheetSource {
            provider: provider.to_string(),
            file_path: path.to_string(),
            worksheet_name: None,
        }
    }

    pub fn provider(&self) -> RallyResult<Provider> {
        match self.provider.as_str() {
            "csv" | "" => Ok(Provider::Csv),
            "xlsx" | "excel" => Ok(Provider::Xlsx),
            _ => whatever!("unknown sheet provider: {}", self.provider),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SheetSources {
    pub stages: Option<SheetSource>,
    pub results: Option<SheetSource>,
    pub roster: Option<SheetSource>,
    pub schedule: Option<SheetSource>,
    pub event: Option<SheetSource>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct RallyOptions {
    pub stage: Option<u32>,
    #[serde(rename = "byCategory")]
    pub by_category: Option<bool>,
}

impl RallyOptions {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            stage: self.stage,
            by_category: self
                .by_category
                .unwrap_or(ReportOptions::DEFAULT_OPTIONS.by_category),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RallyConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    pub sheets: SheetSources,
    pub options: Option<RallyOptions>,
}

impl RallyConfig {
    pub fn empty() -> RallyConfig {
        RallyConfig {
            output_settings: None,
            sheets: SheetSources {
                stages: None,
                results: None,
                roster: None,
                schedule: None,
                event: None,
            },
            options: None,
        }
    }

    pub fn output_settings(&self) -> OutputSettings {
        self.output_settings.clone().unwrap_or_default()
    }

    pub fn options(&self) -> RallyOptions {
        self.options.clone().unwrap_or_default()
    }
}

pub fn read_config(path: &str) -> RallyResult<RallyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: RallyConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> RallyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

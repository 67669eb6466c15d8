use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::TestRunRecord;
use crate::state::State;

const NOT_CONFIGURED: i32 = -1;

fn not_configured() -> i32 {
    NOT_CONFIGURED
}

/// Warning and critical thresholds of a check, in seconds.
///
/// `-1` means the threshold is not configured, which is also the default for
/// a missing key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdSettings {
    #[serde(default = "not_configured")]
    pub warning_time: i32,
    #[serde(default = "not_configured")]
    pub critical_time: i32,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        ThresholdSettings {
            warning_time: NOT_CONFIGURED,
            critical_time: NOT_CONFIGURED,
        }
    }
}

fn threshold(field: &'static str, value: i32) -> Result<Option<u32>> {
    match value {
        NOT_CONFIGURED => Ok(None),
        v if v >= 0 => Ok(Some(v as u32)),
        v => Err(Error::InvalidThreshold { field, value: v }),
    }
}

impl ThresholdSettings {
    pub fn new(warning_time: i32, critical_time: i32) -> Self {
        ThresholdSettings {
            warning_time,
            critical_time,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let settings: ThresholdSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn warning(&self) -> Result<Option<u32>> {
        threshold("warning", self.warning_time)
    }

    pub fn critical(&self) -> Result<Option<u32>> {
        threshold("critical", self.critical_time)
    }

    /// Checks both values and that the warning threshold does not exceed the
    /// critical one.
    pub fn validate(&self) -> Result<()> {
        if let (Some(warning), Some(critical)) = (self.warning()?, self.critical()?) {
            if warning > critical {
                return Err(Error::ThresholdOrder { warning, critical });
            }
        }
        Ok(())
    }

    /// Copies both thresholds onto `record`. The record is left untouched if
    /// the settings are invalid.
    pub fn apply<E, S: State>(&self, record: &mut TestRunRecord<E, S>) -> Result<()> {
        self.validate()?;
        record.set_warning_time(self.warning()?);
        record.set_critical_time(self.critical()?);
        Ok(())
    }
}

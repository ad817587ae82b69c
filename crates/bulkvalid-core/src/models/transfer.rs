use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Antivirus verdict reported by the file transfer service.
///
/// Any verdict other than `Clean` or `NotScanned` is terminal: the file was
/// scanned and rejected, and re-polling will not change the outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AvStatus {
    NotScanned,
    Clean,
    Infected,
    Error,
}

impl AvStatus {
    pub fn is_clean(&self) -> bool {
        matches!(self, AvStatus::Clean)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AvStatus::NotScanned)
    }
}

impl Display for AvStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AvStatus::NotScanned => write!(f, "not-scanned"),
            AvStatus::Clean => write!(f, "clean"),
            AvStatus::Infected => write!(f, "infected"),
            AvStatus::Error => write!(f, "error"),
        }
    }
}

/// Metadata for an uploaded file held by the transfer service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDetails {
    pub id: String,
    pub name: String,
    pub av_status: AvStatus,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn av_status_deserializes_kebab_case() {
        let details: FileDetails = serde_json::from_str(
            r#"{"id":"f1","name":"data.csv","av_status":"not-scanned"}"#,
        )
        .unwrap();
        assert_eq!(details.av_status, AvStatus::NotScanned);
        assert!(details.av_status.is_pending());
        assert!(details.content_type.is_none());

        let details: FileDetails =
            serde_json::from_str(r#"{"id":"f1","name":"data.csv","av_status":"clean","size":42}"#)
                .unwrap();
        assert!(details.av_status.is_clean());
        assert_eq!(details.size, Some(42));
    }
}

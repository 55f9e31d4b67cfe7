//! Append-only processing history

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One completed batch, as appended to `processing-history.txt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingHistoryRecord {
    pub stage_name: String,
    /// Batch size requested for the run
    pub limit: usize,
    /// Local time the batch completed, second precision
    pub timestamp: NaiveDateTime,
    pub revision: String,
    pub elapsed_seconds: u64,
}

impl ProcessingHistoryRecord {
    /// Parse a `stage<TAB>limit<TAB>timestamp<TAB>revision<TAB>elapsed` line
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.trim_end_matches(['\r', '\n']).split('\t');
        let record = Self {
            stage_name: fields.next()?.to_string(),
            limit: fields.next()?.parse().ok()?,
            timestamp: NaiveDateTime::parse_from_str(fields.next()?, TIMESTAMP_FORMAT).ok()?,
            revision: fields.next()?.to_string(),
            elapsed_seconds: fields.next()?.parse().ok()?,
        };
        match fields.next() {
            Some(_) => None,
            None => Some(record),
        }
    }
}

impl fmt::Display for ProcessingHistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.stage_name,
            self.limit,
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.revision,
            self.elapsed_seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let line = "txt2tag\t500\t2024-03-01 12:30:05\tv0.3-4-gabc\t42";
        let record = ProcessingHistoryRecord::parse(line).unwrap();
        assert_eq!(record.stage_name, "txt2tag");
        assert_eq!(record.limit, 500);
        assert_eq!(record.revision, "v0.3-4-gabc");
        assert_eq!(record.elapsed_seconds, 42);
        assert_eq!(record.to_string(), line);
    }

    #[test]
    fn test_rejects_malformed_lines() {
        assert!(ProcessingHistoryRecord::parse("").is_none());
        assert!(ProcessingHistoryRecord::parse("a\tx\t2024-03-01 12:30:05\tr\t1").is_none());
        assert!(ProcessingHistoryRecord::parse("a\t1\tyesterday\tr\t1").is_none());
        assert!(ProcessingHistoryRecord::parse("a\t1\t2024-03-01 12:30:05\tr\t1\textra").is_none());
    }
}

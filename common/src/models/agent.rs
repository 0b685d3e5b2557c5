// common/src/models/agent.rs
use std::collections::HashMap;

/// Optional filters for the agents report. Empty values are never forwarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub branch_id: Option<String>,
    pub date_range: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl FilterCriteria {
    /// Pick the known filter keys out of a raw query map
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let pick = |key: &str| query.get(key).cloned();
        Self {
            branch_id: pick("branch_id"),
            date_range: pick("dateRange"),
            from_date: pick("fromDate"),
            to_date: pick("toDate"),
        }
    }

    fn pairs(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("branch_id", self.branch_id.as_deref()),
            ("dateRange", self.date_range.as_deref()),
            ("fromDate", self.from_date.as_deref()),
            ("toDate", self.to_date.as_deref()),
        ]
    }

    /// Percent-encoded `key=value` pairs joined by `&`, skipping absent or empty values
    pub fn to_query_string(&self) -> String {
        self.pairs()
            .into_iter()
            .filter_map(|(key, value)| match value {
                Some(v) if !v.is_empty() => Some(format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(v)
                )),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

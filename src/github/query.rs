// src/github/query.rs
//! Search qualifier strings per signal type.

use chrono::NaiveDate;

use crate::model::{Assistant, SignalType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEndpoint {
    Commits,
    Repositories,
}

impl SearchEndpoint {
    /// Path relative to the API root.
    pub fn path(&self) -> &'static str {
        match self {
            SearchEndpoint::Commits => "search/commits",
            SearchEndpoint::Repositories => "search/repositories",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub endpoint: SearchEndpoint,
    /// Value of the `q` parameter.
    pub q: String,
}

impl SearchQuery {
    /// Query counting `signal` events of `assistant` between `from` and `to` (both inclusive).
    pub fn for_signal(
        assistant: &Assistant,
        signal: SignalType,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Self {
        let login = assistant.login.trim();
        let email = assistant
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());
        let range = format!("{}..{}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"));

        match signal {
            SignalType::DirectCommit => {
                let mut terms = vec![format!("author:{login}")];
                terms.extend(email.map(|e| format!("author-email:{e}")));
                Self::commits(format!("{} committer-date:{range}", terms.join(" OR ")))
            }
            SignalType::CoAuthoredCommit => {
                let mut terms = vec![format!("co-authored-by:{login}")];
                terms.extend(email.map(|e| format!("co-authored-by:{e}")));
                Self::commits(format!("{} committer-date:{range}", terms.join(" OR ")))
            }
            SignalType::RepositoryMention => {
                let mut terms = vec![format!("{login} in:name,description,readme")];
                terms.extend(email.map(|e| format!("{e} in:name,description,readme")));
                Self {
                    endpoint: SearchEndpoint::Repositories,
                    q: format!("{} created:{range}", terms.join(" OR ")),
                }
            }
        }
    }

    fn commits(q: String) -> Self {
        Self {
            endpoint: SearchEndpoint::Commits,
            q,
        }
    }
}

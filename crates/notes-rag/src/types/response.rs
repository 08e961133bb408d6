//! Response types for the HTTP surface

use serde::{Deserialize, Serialize};

use crate::pipeline::QueryOutcome;

/// Response from `POST /documents`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Chunks embedded and upserted
    pub chunks_indexed: usize,
}

/// Response from `POST /query`
///
/// An empty retrieval is an informational result, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponse {
    /// Generated answer
    Answer { answer: String },
    /// Nothing relevant was retrieved
    NoContext { no_context: bool },
}

impl From<QueryOutcome> for QueryResponse {
    fn from(outcome: QueryOutcome) -> Self {
        match outcome {
            QueryOutcome::Answered(answer) => Self::Answer { answer },
            QueryOutcome::NoContext => Self::NoContext { no_context: true },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_response_shapes() {
        let answered = QueryResponse::from(QueryOutcome::Answered("See page 3.".to_string()));
        assert_eq!(
            serde_json::to_value(&answered).unwrap(),
            serde_json::json!({ "answer": "See page 3." })
        );

        let empty = QueryResponse::from(QueryOutcome::NoContext);
        assert_eq!(
            serde_json::to_value(&empty).unwrap(),
            serde_json::json!({ "no_context": true })
        );
    }
}

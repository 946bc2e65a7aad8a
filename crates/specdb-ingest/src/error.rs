use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed spec sheet for {context}: {source}")]
    MalformedSheet {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

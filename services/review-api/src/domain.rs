// Domain layer modules
pub mod corpus;
pub mod echo_response;

// Re-exports
pub use corpus::{Corpus, CorpusNameError};
pub use echo_response::{
    EchoBody, HandlerResponse, ResponseError, APPLICATION_JSON, CONTENT_TYPE_HEADER, STATUS_OK,
};

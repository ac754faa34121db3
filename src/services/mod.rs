pub mod clock;
pub mod git;
pub mod ingest;
pub mod materializer;
pub mod metadata;
pub mod publish;

// Domain-layer modules and shared errors/models
pub mod encoder {
    pub use crate::encoder::*;
}

pub mod classifier {
    pub use crate::classifier::*;
}

pub mod reranker {
    pub use crate::reranker::*;
}

pub mod pipeline {
    pub use crate::pipeline::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}

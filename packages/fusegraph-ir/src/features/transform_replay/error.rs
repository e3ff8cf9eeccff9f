//! Transform replay error types

use crate::shared::models::TensorViewId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    /// Producer logical rank differs from the consumer's mapped root rank
    #[error(
        "Root domain rank mismatch between producer {producer} ({producer_rank} dims) \
         and consumer {consumer} ({consumer_rank} dims)"
    )]
    RootRankMismatch {
        producer: TensorViewId,
        consumer: TensorViewId,
        producer_rank: usize,
        consumer_rank: usize,
    },
}

pub type ReplayResult<T> = Result<T, ReplayError>;

use thiserror::Error;

use crate::domain::campaign::{CampaignId, CampaignStatus};
use crate::domain::product::{ProductId, StoreId};
use crate::domain::user::UserId;

/// Coarse error classification for callers that only need to distinguish
/// bad input, a dangling reference, and an illegal lifecycle operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    State,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("product {0} has no pricing data")]
    NoPricingData(ProductId),
    #[error("product {product} is missing an affiliate link for store {store}")]
    MissingAffiliateLink { product: ProductId, store: StoreId },
    #[error("product {0} already exists in the catalog")]
    DuplicateProduct(ProductId),
    #[error("price history for product {0} must stay time-ordered")]
    PriceHistoryOutOfOrder(ProductId),
    #[error("campaign target audience must not be empty")]
    EmptyTargetAudience,
    #[error("campaign product list must not be empty")]
    EmptyProductList,
    #[error("invalid campaign transition from {from:?} to {to:?}")]
    InvalidCampaignTransition { from: CampaignStatus, to: CampaignStatus },
    #[error("campaign in status {status:?} cannot be optimized")]
    CampaignNotOptimizable { status: CampaignStatus },
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),
    #[error("campaign not found: {0}")]
    CampaignNotFound(CampaignId),
    #[error("user not found: {0}")]
    UserNotFound(UserId),
    #[error("unsupported schema version {found} (current is {current})")]
    UnsupportedSchemaVersion { found: u32, current: u32 },
    #[error("snapshot name mismatch: expected `{expected}`, found `{found}`")]
    SnapshotNameMismatch { expected: String, found: String },
    #[error("snapshot checksum mismatch")]
    SnapshotChecksumMismatch,
    #[error("snapshot payload is malformed: {0}")]
    MalformedSnapshot(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoPricingData(_)
            | Self::DuplicateProduct(_)
            | Self::PriceHistoryOutOfOrder(_)
            | Self::EmptyTargetAudience
            | Self::EmptyProductList
            | Self::UnsupportedSchemaVersion { .. }
            | Self::SnapshotNameMismatch { .. }
            | Self::SnapshotChecksumMismatch
            | Self::MalformedSnapshot(_) => ErrorKind::Validation,
            Self::MissingAffiliateLink { .. }
            | Self::ProductNotFound(_)
            | Self::CampaignNotFound(_)
            | Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::InvalidCampaignTransition { .. } | Self::CampaignNotOptimizable { .. } => {
                ErrorKind::State
            }
        }
    }
}

use thiserror::Error;

use crate::advert::AdvertId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Duplicate advert id in batch: {0}")]
    DuplicateId(AdvertId),

    #[error("Advert {0} has a non-finite price")]
    NonFinitePrice(AdvertId),

    #[error("Invalid batch: {0}")]
    InvalidBatch(String),
}

// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors surfaced by the storage backends and the query layer.
///
/// Reads never produce `NotFound`: a missing profile or post yields an empty
/// result. Only writes that reference a missing row fail with it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn profile_not_found(id: i32) -> Self {
        Error::NotFound {
            entity: "profile",
            id,
        }
    }

    pub fn post_not_found(id: i32) -> Self {
        Error::NotFound { entity: "post", id }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

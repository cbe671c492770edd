// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod handlers;
mod keys;
mod logging;
mod store;

pub use handlers::{HandlerConfig, ModifierConfig};
pub use keys::{KeysConfig, KeysConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use store::{StoreBackend, StoreConfig, StoreConfigLayer};

pub(crate) use handlers::validate_handlers;

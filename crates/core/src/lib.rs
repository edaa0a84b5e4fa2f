// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! xm-core: configuration, logging and formatting shared by every xm crate

pub mod env;
pub mod lenient;
pub mod logging;
pub mod time_fmt;

pub use env::{get_env_bool, get_env_str, parse_flag};
pub use logging::{init_logging, LogConfig, LoggingError};
pub use time_fmt::{
    ensure_naive_timestamp, ensure_timestamp, isoformat_timestamp, parse_timestamp,
    TIMESTAMP_FILENAME_FORMAT,
};

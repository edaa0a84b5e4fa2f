// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! File-backed state for x_make tools: boards, ledgers, progress and reports

pub mod atomic;
mod board;
mod ledger;
mod progress;
mod reports;
mod stage_progress;
mod status;

pub use atomic::{atomic_write, atomic_write_json, AtomicWriteError, AtomicWriter, FileReplacer};
pub use board::{
    board_from_records, dump_board, load_board, save_board, BoardError, BoardState, CardRecord,
    DEFAULT_CARD_STATUS,
};
pub use ledger::{
    append_event, read_ledger, verify_ledger, LedgerEntry, LedgerError, LedgerEvent, LedgerWriter,
};
pub use progress::{
    create_progress_snapshot, load_progress_snapshot, write_progress_snapshot, ProgressError,
    ProgressSnapshot, ProgressStage, PROGRESS_SCHEMA_VERSION,
};
pub use reports::{ensure_reports_dir, write_run_report, ReportError, ReportOptions, REPORTS_DIR_NAME};
pub use stage_progress::{
    safe_repo_filename, sanitize_messages, EntryUpdate, NoOpProgressReporter,
    RepoProgressReporter, StageProgressEntry, StageProgressError, StageProgressSummary,
    StageProgressWriter, DETAIL_SCHEMA_VERSION, INDEX_SCHEMA_VERSION, MESSAGE_LIMIT,
    MESSAGE_PREVIEW, UNKNOWN_REPO_ID,
};
pub use status::ProgressStatus;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rc-core: attendance reconciliation primitives
//!
//! This crate provides the event taxonomy, wire codec, reconnect policy and
//! the reconciliation store shared by the rollcall client and its tools.
//! Nothing here performs I/O.

pub mod clock;
pub mod codec;
pub mod error;
pub mod event;
pub mod feed;
pub mod optimistic;
pub mod reconnect;
pub mod record;
pub mod stats;
pub mod status;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{decode, decode_frame, encode, Envelope, RawMessage};
pub use error::{DecodeError, Result};
pub use event::{BulkUpdate, Event, EventKind, StatusChange, UnknownEvent};
pub use feed::{ErrorKind, FeedError, RecentUpdate, ERROR_FEED_CAPACITY, RECENT_UPDATE_CAPACITY};
pub use optimistic::{OptimisticId, PendingOptimisticUpdate};
pub use reconnect::{next_delay, ReconnectPolicy};
pub use record::{AttendanceRecord, AttendanceStatus, RecordKey, RecordPatch, ScheduleId, StudentId};
pub use stats::ScheduleStats;
pub use status::{ConnectionStatus, TransportKind};
pub use store::{ActiveSession, AttendanceStore, Reconciled};

// Worker constants (no magic values)
use crate::domain::TimeDelta;

/// How long a blocking `sync` waits before logging a probable deadlock
pub const DEADLOCK_WARN_AFTER: TimeDelta = TimeDelta::seconds(3);

/// Blocking `sync` calls never give up; a warning is all they emit
pub const SYNC_GIVE_UP_AFTER: TimeDelta = TimeDelta::PLUS_INFINITY;

/// How long queue construction waits for the worker's start handshake
pub const STARTUP_GIVE_UP_AFTER: TimeDelta = TimeDelta::PLUS_INFINITY;

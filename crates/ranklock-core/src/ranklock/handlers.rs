//! Domain handlers layered on the watchers.
//!
//! Watchers are pure edge detectors; everything that decides what counts as
//! progress or regression, and what to back up or restore, lives here.

use std::rc::Rc;

use tracing::{debug, error, info, warn};

use crate::config::PointLossWindow;
use crate::game::Player;
use crate::memory::{ChangeEvent, EventDisposition, ReadMemory, WriteMemory};
use crate::ranklock::SessionCheckpoint;
use crate::save::SaveBackup;

/// Handler for the available-rank watcher.
///
/// Rank up outside the abyss: back up the saves and advance the checkpoint
/// (the checkpoint advances even when the backup fails; the progress is
/// real either way). Rank down: write the checkpoint back into the target
/// and restore the configured slot. Backup and restore failures are
/// reported and never stop the session.
pub fn rank_handler<'a, R, S>(
    player: Player<'a, R>,
    save: &'a S,
    checkpoint: Rc<SessionCheckpoint>,
    guard_abyss: bool,
    restore_slot: u32,
) -> impl FnMut(&ChangeEvent<i32>) -> EventDisposition + 'a
where
    R: ReadMemory + WriteMemory + ?Sized,
    S: SaveBackup + ?Sized,
{
    move |e| {
        if e.new > e.old {
            if guard_abyss {
                match player.is_in_abyss() {
                    Ok(true) => {
                        debug!(
                            "Rank up {} -> {} inside the abyss, not checkpointing",
                            e.old, e.new
                        );
                        return EventDisposition::Accepted;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        warn!("Could not read abyss flag, skipping checkpoint: {err}");
                        return EventDisposition::Accepted;
                    }
                }
            }

            info!("Rank up {} -> {}: backing up save data", e.old, e.new);
            if let Err(err) = save.backup() {
                error!("Failed to back up save data: {err}");
            }
            checkpoint.set_rank(e.new);
        } else if e.new < e.old {
            warn!(
                "Rank lost {} -> {}: restoring checkpoint (rank {}, points {})",
                e.old,
                e.new,
                checkpoint.rank(),
                checkpoint.points()
            );

            if let Err(err) = player.set_rank(checkpoint.rank()) {
                warn!("Failed to write rank back: {err}");
            }
            if let Err(err) = player.set_points(checkpoint.points()) {
                warn!("Failed to write points back: {err}");
            }
            if let Err(err) = save.restore(restore_slot) {
                error!("Failed to load backup save: {err}");
            }
        }

        EventDisposition::Accepted
    }
}

/// Handler for the current-points watcher (gauntlet mode only).
///
/// Points up: back up and advance the checkpoint. A small loss inside the
/// configured window while the player is alive means the player gave up;
/// the old value is written back and the event is reported as suppressed so
/// downstream consumers ignore the externally corrected transition. Any
/// other loss is a legitimate one and passes through untouched.
pub fn points_handler<'a, R, S>(
    player: Player<'a, R>,
    save: &'a S,
    checkpoint: Rc<SessionCheckpoint>,
    window: PointLossWindow,
) -> impl FnMut(&ChangeEvent<i32>) -> EventDisposition + 'a
where
    R: ReadMemory + WriteMemory + ?Sized,
    S: SaveBackup + ?Sized,
{
    move |e| {
        let gauntlet = player.gauntlet_mode_enabled().unwrap_or(false);
        let in_abyss = player.is_in_abyss().unwrap_or(false);
        if !gauntlet || in_abyss {
            debug!("Gauntlet mode inactive, skipping points change {} -> {}", e.old, e.new);
            return EventDisposition::Accepted;
        }

        if e.new > e.old {
            info!("Points up {} -> {}: backing up save data", e.old, e.new);
            if let Err(err) = save.backup() {
                error!("Failed to back up save data: {err}");
            }
            checkpoint.set_points(e.new);
            return EventDisposition::Accepted;
        }

        let loss = e.old - e.new;
        // A dead player lost for real; only a live one can have given up.
        if window.contains(loss) && !player.is_dead().unwrap_or(true) {
            info!(
                "Points {} -> {} look like a give-up, writing {} back",
                e.old, e.new, e.old
            );
            if let Err(err) = player.set_points(e.old) {
                warn!("Failed to write points back: {err}");
                return EventDisposition::Accepted;
            }
            return EventDisposition::Suppressed;
        }

        EventDisposition::Accepted
    }
}

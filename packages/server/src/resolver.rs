use common::storage::{StorageError, UploadStore};
use sea_orm::{ConnectionTrait, DbErr};
use thiserror::Error;
use tracing::{instrument, warn};

use crate::analysis::{AnalysisError, AnalysisResult, Analyser};
use crate::config::ResolutionMode;
use crate::entity::file;
use crate::persistence;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Song {0} not found")]
    SongNotFound(i64),

    #[error("File {0} not found")]
    FileNotFound(i32),

    #[error(
        "Could not resolve file reference {file_ref}: position {index} is out of range for {len} files"
    )]
    IndexOutOfRange {
        file_ref: i32,
        index: i64,
        len: usize,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Legacy two-step positional lookup.
///
/// `file_ref - 1` indexes `ids` to pick a candidate id, and `candidate - 1`
/// indexes `ids` again to pick the final position. Ids and positions only agree
/// while the table is gap-free, which is why this mode is not the default.
pub fn positional_index(file_ref: i32, ids: &[i32]) -> Result<usize, ResolveError> {
    let candidate = ids[checked_position(file_ref, i64::from(file_ref) - 1, ids.len())?];
    checked_position(file_ref, i64::from(candidate) - 1, ids.len())
}

fn checked_position(file_ref: i32, index: i64, len: usize) -> Result<usize, ResolveError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(ResolveError::IndexOutOfRange {
            file_ref,
            index,
            len,
        })
}

/// Find the `file` row associated with a song.
#[instrument(skip(db))]
pub async fn resolve_file<C: ConnectionTrait>(
    db: &C,
    song_id: i32,
    mode: ResolutionMode,
) -> Result<file::Model, ResolveError> {
    let song = persistence::find_song(db, song_id)
        .await?
        .ok_or(ResolveError::SongNotFound(song_id.into()))?;

    let resolved = match mode {
        ResolutionMode::Direct => persistence::find_file(db, song.file_id)
            .await?
            .ok_or(ResolveError::FileNotFound(song.file_id)),
        ResolutionMode::Positional => {
            let mut files = persistence::list_files(db).await?;
            let ids: Vec<i32> = files.iter().map(|f| f.id).collect();
            positional_index(song.file_id, &ids).map(|pos| files.swap_remove(pos))
        }
    };

    if let Err(e) = &resolved {
        warn!(song_id, file_ref = song.file_id, error = %e, "Song file resolution failed");
    }
    resolved
}

/// Resolve a song's upload and run the analyser on its stored path.
#[instrument(skip(db, uploads, analyser))]
pub async fn analyse_song<C: ConnectionTrait>(
    db: &C,
    uploads: &dyn UploadStore,
    analyser: &dyn Analyser,
    song_id: i32,
    mode: ResolutionMode,
) -> Result<AnalysisResult, ResolveError> {
    let file = resolve_file(db, song_id, mode).await?;
    let path = uploads.path(&file.filename)?;
    Ok(analyser.analyse(&path).await?)
}

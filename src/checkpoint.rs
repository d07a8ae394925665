//! Checkpoint save/load for prediction-head weights.
//!
//! Uses burn's native record format (NamedMpk) at full precision, so a
//! round-trip reproduces forward outputs exactly. Paths are supplied by
//! the caller; burn appends the `.mpk` extension.

use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};

/// Save model weights to `path` (extension added automatically).
///
/// Returns the full path of the written file.
pub fn save_model<B: Backend, M: Module<B> + Clone>(
    model: &M,
    path: &Path,
) -> Result<PathBuf, String> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| format!("mkdir {}: {}", dir.display(), e))?;
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    model
        .clone()
        .save_file(path.to_path_buf(), &recorder)
        .map_err(|e| format!("save {}: {}", path.display(), e))?;

    Ok(path.with_extension("mpk"))
}

/// Load model weights from `path` into an initialized model.
///
/// Returns `Ok(None)` when no checkpoint exists at that path.
pub fn load_model<B: Backend, M: Module<B>>(
    model: M,
    path: &Path,
    device: &B::Device,
) -> Result<Option<M>, String> {
    let full_path = path.with_extension("mpk");
    if !full_path.exists() {
        return Ok(None);
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let loaded = model
        .load_file(path.to_path_buf(), &recorder, device)
        .map_err(|e| format!("load {}: {}", full_path.display(), e))?;

    Ok(Some(loaded))
}

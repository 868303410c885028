// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::{serialize, DisplayList, Result};

/// Name of the file written by [`DisplayListCapture::save_if_requested`].
pub const CAPTURE_FILE_NAME: &str = "display_list.dat";

/// A one-shot request to save the next display list to disk.
///
/// Any thread may [`request`](Self::request) a capture. The thread producing
/// frames calls [`save_if_requested`](Self::save_if_requested) with each
/// finished list, and the first call after a request writes it out.
#[derive(Debug, Default)]
pub struct DisplayListCapture {
    pending: Mutex<Option<PathBuf>>,
}

impl DisplayListCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the capture. A later request replaces an earlier one that
    /// hasn't been served yet.
    pub fn request(&self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        log::info!("Display list capture requested into {}", dir.display());
        *self.lock() = Some(dir);
    }

    pub fn is_requested(&self) -> bool {
        self.lock().is_some()
    }

    /// Writes `list` into the requested directory, which must exist.
    ///
    /// Returns the path of the written file, or `None` without a pending
    /// request. The request is consumed even if writing fails.
    pub fn save_if_requested(&self, list: &DisplayList) -> Result<Option<PathBuf>> {
        let Some(dir) = self.lock().take() else {
            return Ok(None);
        };
        let path = dir.join(CAPTURE_FILE_NAME);
        match write_file(&path, list) {
            Ok(()) => {
                log::info!("Saved display list to {}", path.display());
                Ok(Some(path))
            }
            Err(error) => {
                log::error!("Failed to save display list to {}: {error}", path.display());
                Err(error)
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PathBuf>> {
        // The slot holds no invariant a panic could break.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn write_file(path: &Path, list: &DisplayList) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serialize::write(list, &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use peniko::kurbo::Rect;

    use super::*;
    use crate::{DisplayListBuilder, Error};

    fn sample() -> std::sync::Arc<DisplayList> {
        let mut builder = DisplayListBuilder::new();
        builder.draw_oval(Rect::new(0.0, 0.0, 4.0, 2.0));
        builder.finish().unwrap()
    }

    #[test]
    fn saves_once_per_request() {
        let dir = tempfile::tempdir().unwrap();
        let capture = DisplayListCapture::new();
        let list = sample();
        assert_eq!(capture.save_if_requested(&list).unwrap(), None);

        capture.request(dir.path());
        assert!(capture.is_requested());
        let path = capture.save_if_requested(&list).unwrap().unwrap();
        assert_eq!(path, dir.path().join("display_list.dat"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(serialize::from_bytes(&bytes).unwrap(), *list);

        assert!(!capture.is_requested());
        assert_eq!(capture.save_if_requested(&list).unwrap(), None);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let capture = DisplayListCapture::new();
        capture.request(dir.path().join("missing"));
        let result = capture.save_if_requested(&sample());
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!capture.is_requested());
    }
}

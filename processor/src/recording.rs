use std::path::{Component, Path, PathBuf};

use chrono::NaiveDate;

/// Date folders are named by the media server as `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathError {
    #[error("{}: expected {{camera}}/{{date}}/{{file}}, found {depth} segment(s)", .path.display())]
    TooShallow { path: PathBuf, depth: usize },
    #[error("{}: segment is not valid UTF-8", .path.display())]
    NotUtf8 { path: PathBuf },
    #[error("{}: date folder {date:?} is not YYYY-MM-DD", .path.display())]
    InvalidDate { path: PathBuf, date: String },
}

/// A recording file and the identifiers encoded in its location.
///
/// Layout is `{root}/{..}/{camera_id}/{date}/{filename}`: only the last three
/// segments below the root carry meaning, whatever precedes them (the app
/// name, usually) is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingPath {
    pub path: PathBuf,
    pub camera_id: String,
    pub date: String,
    pub filename: String,
}

impl RecordingPath {
    pub fn parse(root: &Path, path: &Path) -> Result<Self, PathError> {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let segments: Vec<_> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s),
                _ => None,
            })
            .collect();

        if segments.len() < 3 {
            return Err(PathError::TooShallow {
                path: path.to_path_buf(),
                depth: segments.len(),
            });
        }

        let tail = &segments[segments.len() - 3..];
        let mut text = tail.iter().map(|s| s.to_str());
        let (Some(Some(camera_id)), Some(Some(date)), Some(Some(filename))) =
            (text.next(), text.next(), text.next())
        else {
            return Err(PathError::NotUtf8 {
                path: path.to_path_buf(),
            });
        };

        if NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
            return Err(PathError::InvalidDate {
                path: path.to_path_buf(),
                date: date.to_string(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            camera_id: camera_id.to_string(),
            date: date.to_string(),
            filename: filename.to_string(),
        })
    }

    /// `{camera_id}_{date}_{stem}.jpg`; segment names repeat across cameras.
    pub fn thumbnail_name(&self) -> String {
        let stem = Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename);
        format!("{}_{}_{stem}.jpg", self.camera_id, self.date)
    }

    /// Where the file lives once handled, keeping camera and date apart so
    /// equal filenames from different cameras never collide.
    pub fn processed_location(&self, processed_dir: &Path) -> PathBuf {
        processed_dir
            .join(&self.camera_id)
            .join(&self.date)
            .join(&self.filename)
    }

    pub fn storage_key(&self) -> String {
        storage::object_key(&self.camera_id, &self.date, &self.filename)
    }
}

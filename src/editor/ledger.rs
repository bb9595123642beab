use crate::models::PropertyImage;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// Tracks which staged-image previews are currently alive.
///
/// A preview stands in for an object URL that the UI renders as a
/// thumbnail. Every [`PreviewHandle`] removes itself from the registry when
/// dropped, so the live set is exactly the set of staged images.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn acquire(&self) -> PreviewHandle {
        let id = Uuid::new_v4();
        if let Ok(mut live) = self.live.lock() {
            live.insert(id);
        }
        PreviewHandle {
            id,
            live: Arc::clone(&self.live),
        }
    }

    /// Number of previews not yet released
    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    pub fn is_live(&self, id: Uuid) -> bool {
        self.live
            .lock()
            .map(|live| live.contains(&id))
            .unwrap_or(false)
    }
}

/// Preview resource bound to one staged image; released on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Local URL the UI can use to render the thumbnail
    pub fn url(&self) -> String {
        format!("preview://{}", self.id)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(&self.id);
        }
        debug!("Released preview {}", self.id);
    }
}

/// A file picked for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl NewImage {
    /// Build an upload, guessing the MIME type from the file name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

/// New image waiting to be uploaded, together with its live preview
#[derive(Debug)]
pub struct StagedImage {
    file: NewImage,
    preview: PreviewHandle,
}

impl StagedImage {
    pub fn file(&self) -> &NewImage {
        &self.file
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }
}

/// Result of a successful [`ImageLedger::mark_removed`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    AlreadyRemoved,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("image {0} does not belong to this listing")]
    UnknownImage(i64),

    #[error("no staged image at index {index} (staged: {len})")]
    StagedIndexOutOfRange { index: usize, len: usize },
}

/// What the submission has to do about images
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDiff {
    pub new_files: Vec<NewImage>,
    pub removed_ids: Vec<i64>,
}

impl ImageDiff {
    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty() && self.removed_ids.is_empty()
    }
}

/// Partition of a listing's images into kept, removed, and staged.
///
/// `kept` and `removed` always split the images the listing had when the
/// ledger was created; `staged` holds uploads that have no server id yet.
#[derive(Debug)]
pub struct ImageLedger {
    original: Vec<i64>,
    kept: Vec<PropertyImage>,
    removed: Vec<i64>,
    staged: Vec<StagedImage>,
    previews: PreviewRegistry,
}

impl ImageLedger {
    /// Ledger for a listing that has no persisted images yet
    pub fn new(previews: PreviewRegistry) -> Self {
        Self::from_existing(Vec::new(), previews)
    }

    pub fn from_existing(images: Vec<PropertyImage>, previews: PreviewRegistry) -> Self {
        let mut kept: Vec<PropertyImage> = Vec::with_capacity(images.len());
        for image in images {
            if !kept.iter().any(|k| k.id == image.id) {
                kept.push(image);
            }
        }
        kept.sort_by_key(|image| image.display_order);

        Self {
            original: kept.iter().map(|image| image.id).collect(),
            kept,
            removed: Vec::new(),
            staged: Vec::new(),
            previews,
        }
    }

    /// Queue files for upload; each gets a fresh preview.
    pub fn stage_new<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = NewImage>,
    {
        for file in files {
            let preview = self.previews.acquire();
            debug!("Staged {} as preview {}", file.file_name, preview.id());
            self.staged.push(StagedImage { file, preview });
        }
    }

    /// Drop a staged file by position, releasing its preview.
    pub fn unstage_new(&mut self, index: usize) -> Result<NewImage, LedgerError> {
        if index >= self.staged.len() {
            return Err(LedgerError::StagedIndexOutOfRange {
                index,
                len: self.staged.len(),
            });
        }
        let StagedImage { file, preview } = self.staged.remove(index);
        drop(preview);
        Ok(file)
    }

    /// Move a persisted image from `kept` to `removed`.
    pub fn mark_removed(&mut self, id: i64) -> Result<Removal, LedgerError> {
        if self.removed.contains(&id) {
            return Ok(Removal::AlreadyRemoved);
        }
        let position = self
            .kept
            .iter()
            .position(|image| image.id == id)
            .ok_or(LedgerError::UnknownImage(id))?;

        self.kept.remove(position);
        self.removed.push(id);
        debug_assert!(self.is_consistent());
        Ok(Removal::Removed)
    }

    /// New uploads and removals to send; kept images need no action.
    pub fn diff(&self) -> ImageDiff {
        ImageDiff {
            new_files: self.staged.iter().map(|s| s.file.clone()).collect(),
            removed_ids: self.removed.clone(),
        }
    }

    /// Release every staged entry after the server has accepted them.
    pub fn clear_staged(&mut self) {
        let released = self.staged.len();
        self.staged.clear();
        if released > 0 {
            debug!("Released {} staged previews", released);
        }
    }

    pub fn kept(&self) -> &[PropertyImage] {
        &self.kept
    }

    pub fn removed(&self) -> &[i64] {
        &self.removed
    }

    pub fn staged(&self) -> &[StagedImage] {
        &self.staged
    }

    /// Ids the listing had when the ledger was created
    pub fn original_ids(&self) -> &[i64] {
        &self.original
    }

    /// `kept` and `removed` are disjoint and together equal the original set.
    pub fn is_consistent(&self) -> bool {
        let kept: HashSet<i64> = self.kept.iter().map(|image| image.id).collect();
        let removed: HashSet<i64> = self.removed.iter().copied().collect();
        let original: HashSet<i64> = self.original.iter().copied().collect();

        kept.is_disjoint(&removed)
            && removed.len() == self.removed.len()
            && kept.union(&removed).copied().collect::<HashSet<_>>() == original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: i64, order: i32) -> PropertyImage {
        PropertyImage {
            id,
            image_url: format!("https://cdn.example.com/{id}.jpg"),
            alt_text: String::new(),
            display_order: order,
            is_primary: order == 0,
            created_at: None,
        }
    }

    fn three_images() -> Vec<PropertyImage> {
        vec![image(1, 0), image(2, 1), image(3, 2)]
    }

    #[test]
    fn starts_with_everything_kept() {
        let ledger = ImageLedger::from_existing(three_images(), PreviewRegistry::new());
        assert_eq!(ledger.kept().len(), 3);
        assert!(ledger.removed().is_empty());
        assert!(ledger.staged().is_empty());
        assert!(ledger.diff().is_empty());
        assert!(ledger.is_consistent());
    }

    #[test]
    fn kept_images_follow_display_order() {
        let ledger = ImageLedger::from_existing(
            vec![image(9, 2), image(4, 0), image(7, 1)],
            PreviewRegistry::new(),
        );
        let ids: Vec<i64> = ledger.kept().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![4, 7, 9]);
    }

    #[test]
    fn mark_removed_moves_id_and_is_idempotent() {
        let mut ledger = ImageLedger::from_existing(three_images(), PreviewRegistry::new());

        assert_eq!(ledger.mark_removed(2), Ok(Removal::Removed));
        assert_eq!(ledger.removed(), &[2]);
        assert!(!ledger.kept().iter().any(|i| i.id == 2));

        assert_eq!(ledger.mark_removed(2), Ok(Removal::AlreadyRemoved));
        assert_eq!(ledger.removed(), &[2]);
        assert_eq!(ledger.kept().len(), 2);
        assert!(ledger.is_consistent());
    }

    #[test]
    fn mark_removed_rejects_foreign_id() {
        let mut ledger = ImageLedger::from_existing(three_images(), PreviewRegistry::new());
        assert_eq!(ledger.mark_removed(99), Err(LedgerError::UnknownImage(99)));
        assert_eq!(ledger.kept().len(), 3);
        assert!(ledger.is_consistent());
    }

    #[test]
    fn union_of_kept_and_removed_is_invariant() {
        let mut ledger = ImageLedger::from_existing(three_images(), PreviewRegistry::new());

        ledger.stage_new([NewImage::new("a.jpg", vec![1])]);
        ledger.mark_removed(1).unwrap();
        ledger.stage_new([NewImage::new("b.png", vec![2]), NewImage::new("c.png", vec![3])]);
        ledger.unstage_new(0).unwrap();
        ledger.mark_removed(3).unwrap();
        ledger.mark_removed(3).unwrap();
        let _ = ledger.unstage_new(10);
        let _ = ledger.mark_removed(42);

        assert!(ledger.is_consistent());
        let mut all: Vec<i64> = ledger
            .kept()
            .iter()
            .map(|i| i.id)
            .chain(ledger.removed().iter().copied())
            .collect();
        all.sort();
        assert_eq!(all, vec![1, 2, 3]);
        assert_eq!(ledger.original_ids(), &[1, 2, 3]);
    }

    #[test]
    fn diff_lists_staged_files_and_removed_ids_only() {
        let mut ledger = ImageLedger::from_existing(three_images(), PreviewRegistry::new());
        ledger.mark_removed(2).unwrap();
        ledger.stage_new([NewImage::new("porch.jpg", vec![0xff, 0xd8])]);

        let diff = ledger.diff();
        assert_eq!(diff.removed_ids, vec![2]);
        assert_eq!(diff.new_files.len(), 1);
        assert_eq!(diff.new_files[0].file_name, "porch.jpg");
        assert_eq!(diff.new_files[0].content_type, "image/jpeg");

        let kept: Vec<i64> = ledger.kept().iter().map(|i| i.id).collect();
        assert_eq!(kept, vec![1, 3]);
    }

    #[test]
    fn unstage_releases_preview_immediately() {
        let previews = PreviewRegistry::new();
        let mut ledger = ImageLedger::new(previews.clone());
        ledger.stage_new([NewImage::new("a.jpg", vec![1]), NewImage::new("b.jpg", vec![2])]);
        assert_eq!(previews.live_count(), 2);

        let first = ledger.staged()[0].preview().id();
        let removed = ledger.unstage_new(0).unwrap();
        assert_eq!(removed.file_name, "a.jpg");
        assert!(!previews.is_live(first));
        assert_eq!(previews.live_count(), 1);
        assert_eq!(ledger.staged()[0].file().file_name, "b.jpg");
    }

    #[test]
    fn unstage_out_of_range_is_an_error() {
        let mut ledger = ImageLedger::new(PreviewRegistry::new());
        ledger.stage_new([NewImage::new("a.jpg", vec![1])]);
        assert_eq!(
            ledger.unstage_new(1).unwrap_err(),
            LedgerError::StagedIndexOutOfRange { index: 1, len: 1 }
        );
        assert_eq!(ledger.staged().len(), 1);
    }

    #[test]
    fn dropping_the_ledger_releases_all_previews() {
        let previews = PreviewRegistry::new();
        {
            let mut ledger = ImageLedger::new(previews.clone());
            ledger.stage_new([NewImage::new("a.jpg", vec![1]), NewImage::new("b.jpg", vec![2])]);
            assert_eq!(previews.live_count(), 2);
        }
        assert_eq!(previews.live_count(), 0);
    }

    #[test]
    fn clear_staged_releases_previews_but_keeps_removals() {
        let previews = PreviewRegistry::new();
        let mut ledger = ImageLedger::from_existing(three_images(), previews.clone());
        ledger.mark_removed(1).unwrap();
        ledger.stage_new([NewImage::new("a.jpg", vec![1])]);

        ledger.clear_staged();
        assert_eq!(previews.live_count(), 0);
        assert_eq!(ledger.removed(), &[1]);
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        let file = NewImage::new("scan.unknownext", vec![]);
        assert_eq!(file.content_type, "application/octet-stream");
    }

    #[test]
    fn preview_url_names_the_handle() {
        let mut ledger = ImageLedger::new(PreviewRegistry::new());
        ledger.stage_new([NewImage::new("a.jpg", vec![1])]);
        let preview = ledger.staged()[0].preview();
        assert_eq!(preview.url(), format!("preview://{}", preview.id()));
    }
}

use crate::media::StagedImage;

/// Pending user input: one text field plus at most one staged image.
#[derive(Debug, Default)]
pub struct Composer {
    pub text: String,
    /// Path typed into the attach field, not yet staged.
    pub image_path: String,
    image: Option<StagedImage>,
    notice: Option<String>,
    /// Bumped whenever the staged image changes hands; async loads carrying
    /// an older value are stale.
    generation: u64,
}

impl Composer {
    pub fn image(&self) -> Option<&StagedImage> {
        self.image.as_ref()
    }

    /// Last staging failure, shown under the input bar until the next attempt.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || self.image.is_some()
    }

    /// Stage `image`, discarding whatever was staged before and
    /// invalidating any load still in flight.
    pub fn stage_image(&mut self, image: StagedImage) {
        self.generation += 1;
        if let Some(previous) = self.image.replace(image) {
            log::debug!("Replaced staged image {}", previous.file_name);
        }
        self.image_path.clear();
        self.notice = None;
    }

    /// Start an async load; its result must come back with the returned token.
    pub fn begin_staging(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Apply the result of the load started with `generation`. Results of
    /// superseded loads are dropped; returns whether this one was applied.
    pub fn finish_staging(&mut self, generation: u64, result: Result<StagedImage, String>) -> bool {
        if generation != self.generation {
            log::debug!("Dropping stale image load #{generation} (current #{})", self.generation);
            return false;
        }
        match result {
            Ok(image) => self.stage_image(image),
            Err(reason) => self.reject_image(reason),
        }
        true
    }

    pub fn reject_image(&mut self, reason: String) {
        self.notice = Some(reason);
    }

    pub fn clear_image(&mut self) {
        self.generation += 1;
        self.image = None;
        self.image_path.clear();
        self.notice = None;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.clear_image();
    }

    /// Move the pending text and image out, leaving the composer empty.
    pub fn take(&mut self) -> (String, Option<StagedImage>) {
        let text = std::mem::take(&mut self.text);
        let image = self.image.take();
        self.clear();
        (text, image)
    }
}

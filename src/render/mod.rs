use uuid::Uuid;

use crate::core::{
    BridgeError,
    NoteDraft,
};

/// External markup renderer. One flat-text in, one flat-text out; any
/// structure the caller needs must survive the channel as literal tokens.
///
/// Implementations may copy media referenced by the source into the remote
/// store's media directory as a side effect; copied assets must get
/// collision-resistant generated names.
pub trait Renderer {
    fn render_batch(&self, source: &str) -> Result<String, BridgeError>;
}

/// Identity renderer for hosts whose field content is already final.
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn render_batch(&self, source: &str) -> Result<String, BridgeError> {
        Ok(source.to_string())
    }
}

/// Renders N drafts in one collaborator call instead of N.
///
/// The concatenated payload is split back with two delimiter tiers: drafts
/// are joined on a separator tagged with a process-unique batch token, and
/// fields within a draft on a separator tagged with that draft's own content
/// hash. The hash is already computed, and neither token plausibly occurs in
/// rendered text. Any count mismatch after splitting aborts the whole batch;
/// silently reassigning fields would corrupt unrelated notes.
pub struct BatchRenderer {
    batch_token: String,
}

impl BatchRenderer {
    pub fn new() -> Self {
        Self { batch_token: Uuid::new_v4().simple().to_string() }
    }

    fn draft_separator(&self) -> String {
        separator(&self.batch_token)
    }

    /// Rendered field values per draft, in input order. Field names are not
    /// sent through the renderer; callers zip the output back against each
    /// draft's schema.
    pub fn render(
        &self,
        renderer: &dyn Renderer,
        drafts: &[NoteDraft],
    ) -> Result<Vec<Vec<String>>, BridgeError> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = drafts
            .iter()
            .map(|draft| {
                let values: Vec<&str> =
                    draft.fields.iter().map(|(_, value)| value.as_str()).collect();
                values.join(&separator(&draft.content_hash))
            })
            .collect::<Vec<String>>()
            .join(&self.draft_separator());

        let rendered = renderer.render_batch(&payload)?;

        let chunks: Vec<&str> = rendered.split(&self.draft_separator()).collect();
        if chunks.len() != drafts.len() {
            return Err(BridgeError::RenderAlignment {
                expected: drafts.len(),
                got: chunks.len(),
                unit: "drafts",
            });
        }

        let mut out = Vec::with_capacity(drafts.len());
        for (draft, chunk) in drafts.iter().zip(chunks) {
            let values: Vec<String> =
                chunk.split(&separator(&draft.content_hash)).map(str::to_string).collect();
            if values.len() != draft.fields.len() {
                return Err(BridgeError::RenderAlignment {
                    expected: draft.fields.len(),
                    got: values.len(),
                    unit: "fields",
                });
            }
            out.push(values);
        }
        Ok(out)
    }
}

impl Default for BatchRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn separator(token: &str) -> String {
    format!("\n<!--{}-->\n", token)
}

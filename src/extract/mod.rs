pub mod duration;
pub mod images;
pub mod schema;
pub mod text;

use serde::Serialize;
use tracing::debug;

use crate::recipe::Recipe;

/// Ceiling on the text payload handed to the AI collaborator.
const MAX_TEXT_PAYLOAD: usize = 50_000;

/// What a page reduced to: a complete structured-data recipe (no AI call
/// needed downstream), or a text payload for AI extraction.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extraction {
    Schema { recipe: Recipe },
    Text { content: String },
}

/// Two-pass pipeline: structured data first, cleaned page text as the
/// fallback. A schema that decodes but misses ingredients or steps is
/// prefixed to the text so the downstream extractor still sees it.
pub fn process_for_extraction(html: &str) -> Extraction {
    if let Some(schema) = schema::extract_schema(html) {
        if let Some(recipe) = schema::schema_to_recipe(&schema) {
            if is_complete(&recipe) {
                debug!("Structured data is complete, skipping text fallback");
                return Extraction::Schema { recipe };
            }
        }
        debug!("Structured data incomplete, falling back to page text");
        let content = format!(
            "Structured data:\n{}\n\nPage text:\n{}",
            schema,
            text::clean_text(html)
        );
        return Extraction::Text {
            content: cap(content),
        };
    }

    Extraction::Text {
        content: cap(text::clean_text(html)),
    }
}

fn is_complete(recipe: &Recipe) -> bool {
    !recipe.title.trim().is_empty()
        && !recipe.ingredients.is_empty()
        && !recipe.instructions.is_empty()
}

fn cap(content: String) -> String {
    if content.chars().count() <= MAX_TEXT_PAYLOAD {
        return content;
    }
    content.chars().take(MAX_TEXT_PAYLOAD).collect()
}

// ── Tests ──

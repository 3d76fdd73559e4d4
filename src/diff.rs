use serde::Serialize;
use serde_json::Value;

use crate::recipe::Recipe;

// Scalar/array metadata compared field-by-field. Ingredients are handled
// apart; steps and tools never diff at field granularity.
const DIFF_FIELDS: &[&str] = &[
    "title",
    "description",
    "prep_time",
    "cook_time",
    "servings",
    "cuisine",
    "difficulty",
    "introduction",
    "subtitle",
    "ai_tags",
];

/// A field the candidate fills in where the original had nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddedField {
    pub field: String,
    pub value: Value,
}

/// A field both documents populate with different values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifiedField {
    pub field: String,
    pub old: Value,
    pub new: Value,
}

/// A reshaped collection, reported whole. The review screen renders
/// "N items (was M)" and lets the human compare the lists side by side;
/// no per-item diff is attempted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredChange {
    pub field: String,
    pub old: Value,
    pub new: Value,
    pub old_count: usize,
    pub new_count: usize,
}

/// Categorized change set between two canonical documents, consumed by the
/// review/accept screen. Advisory only; accepting is a separate merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecipeDiff {
    pub added: Vec<AddedField>,
    pub modified: Vec<ModifiedField>,
    pub structured: Vec<StructuredChange>,
}

impl RecipeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.structured.is_empty()
    }
}

/// Compare `original` against an AI-proposed `candidate`.
pub fn diff(original: &Recipe, candidate: &Recipe) -> RecipeDiff {
    // Compare serialized forms so equality is by value, not representation.
    let old_doc = serde_json::to_value(original).unwrap_or(Value::Null);
    let new_doc = serde_json::to_value(candidate).unwrap_or(Value::Null);

    let mut result = RecipeDiff::default();

    for field in DIFF_FIELDS {
        let old = old_doc.get(*field).cloned().unwrap_or(Value::Null);
        let new = new_doc.get(*field).cloned().unwrap_or(Value::Null);

        match (has_value(&old), has_value(&new)) {
            (false, true) => result.added.push(AddedField {
                field: field.to_string(),
                value: new,
            }),
            (true, true) if old != new => result.modified.push(ModifiedField {
                field: field.to_string(),
                old,
                new,
            }),
            _ => {}
        }
    }

    diff_ingredients(original, candidate, &mut result);
    result
}

fn diff_ingredients(original: &Recipe, candidate: &Recipe, result: &mut RecipeDiff) {
    let old_list = serde_json::to_value(&original.ingredients).unwrap_or(Value::Null);
    let new_list = serde_json::to_value(&candidate.ingredients).unwrap_or(Value::Null);

    if original.ingredients.is_empty() {
        if !candidate.ingredients.is_empty() {
            result.added.push(AddedField {
                field: "ingredients".to_string(),
                value: new_list,
            });
        }
        return;
    }

    // A populated original always lands here, equal or not: ingredient
    // lists are reviewed as a whole, never item by item.
    result.structured.push(StructuredChange {
        field: "ingredients".to_string(),
        old_count: original.ingredients.len(),
        new_count: candidate.ingredients.len(),
        old: old_list,
        new: new_list,
    });
}

/// Whether a serialized field carries information: non-null, non-empty
/// array, non-blank string.
fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Accept path: layer every key the candidate defines over the original,
/// keeping the original's identity. Operates on raw JSON so the
/// persistence collaborator receives exactly the accepted keys.
pub fn merge_for_update(original: &Value, candidate: &Value) -> Value {
    let (Some(old_obj), Some(new_obj)) = (original.as_object(), candidate.as_object()) else {
        return candidate.clone();
    };

    let mut merged = old_obj.clone();
    for (key, value) in new_obj {
        merged.insert(key.clone(), value.clone());
    }
    if let Some(id) = old_obj.get("id") {
        merged.insert("id".to_string(), id.clone());
    }
    Value::Object(merged)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    #[test]
    fn addition_reported() {
        let original = normalize(&json!({"title": "A"}));
        let candidate = normalize(&json!({"title": "A", "cuisine": "Italiaans"}));
        let d = diff(&original, &candidate);
        assert_eq!(d.added.len(), 1);
        assert_eq!(d.added[0].field, "cuisine");
        assert_eq!(d.added[0].value, "Italiaans");
        assert!(d.modified.is_empty());
        assert!(d.structured.is_empty());
    }

    #[test]
    fn modification_reported() {
        let original = normalize(&json!({"title": "A"}));
        let candidate = normalize(&json!({"title": "B"}));
        let d = diff(&original, &candidate);
        assert_eq!(d.modified.len(), 1);
        assert_eq!(d.modified[0].field, "title");
        assert_eq!(d.modified[0].old, "A");
        assert_eq!(d.modified[0].new, "B");
        assert!(d.added.is_empty());
    }

    #[test]
    fn identical_documents_produce_no_entries() {
        let x = normalize(&json!({
            "title": "Stamppot",
            "servings": 4,
            "ai_tags": ["winter"],
            "prep_time": "20 min"
        }));
        let d = diff(&x, &x.clone());
        assert!(d.is_empty());
    }

    #[test]
    fn blank_strings_count_as_absent() {
        let original = normalize(&json!({"title": "A", "description": "  "}));
        let candidate = normalize(&json!({"title": "A", "description": "Hartige taart"}));
        let d = diff(&original, &candidate);
        assert_eq!(d.added.len(), 1);
        assert_eq!(d.added[0].field, "description");
    }

    #[test]
    fn ingredients_added_when_original_empty() {
        let original = normalize(&json!({"title": "A"}));
        let candidate = normalize(&json!({"title": "A", "ingredients": ["1 ui"]}));
        let d = diff(&original, &candidate);
        assert_eq!(d.added.len(), 1);
        assert_eq!(d.added[0].field, "ingredients");
        assert!(d.structured.is_empty());
    }

    #[test]
    fn populated_ingredients_always_structured() {
        let x = normalize(&json!({"title": "A", "ingredients": ["1 ui", "2 wortels"]}));
        // Even the self-diff routes the pair to structured
        let d = diff(&x, &x.clone());
        assert_eq!(d.structured.len(), 1);
        let change = &d.structured[0];
        assert_eq!(change.field, "ingredients");
        assert_eq!(change.old_count, 2);
        assert_eq!(change.new_count, 2);

        let shrunk = normalize(&json!({"title": "A", "ingredients": ["1 ui"]}));
        let d = diff(&x, &shrunk);
        assert_eq!(d.structured[0].new_count, 1);
    }

    #[test]
    fn ai_tags_compare_by_value() {
        let original = normalize(&json!({"title": "A", "tags": ["soep"]}));
        let candidate = normalize(&json!({"title": "A", "tags": ["soep", "winter"]}));
        let d = diff(&original, &candidate);
        assert_eq!(d.modified.len(), 1);
        assert_eq!(d.modified[0].field, "ai_tags");
    }

    #[test]
    fn merge_candidate_wins_but_identity_stays() {
        let original = json!({"id": "rec_123", "title": "A", "cuisine": "Frans"});
        let candidate = json!({"id": "rec_999", "title": "B"});
        let merged = merge_for_update(&original, &candidate);
        assert_eq!(merged["id"], "rec_123");
        assert_eq!(merged["title"], "B");
        assert_eq!(merged["cuisine"], "Frans");
    }

    #[test]
    fn merge_with_non_object_falls_back_to_candidate() {
        let merged = merge_for_update(&json!(null), &json!({"title": "B"}));
        assert_eq!(merged["title"], "B");
    }
}

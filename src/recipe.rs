use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Title used when the source carries no usable name.
pub const UNTITLED: &str = "Untitled recipe";

/// Canonical recipe document. Every transform in this crate consumes and
/// produces this shape; absence is always `null` or an empty collection,
/// never a missing key, so serialized documents keep a stable key set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipe {
    pub title: String,
    pub subtitle: Option<String>,
    pub introduction: Option<String>,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<Step>,
    pub tools: Vec<Tool>,
    pub servings: Option<u32>,
    /// Free-text duration ("30 min", "1 uur 30 min"), not machine minutes.
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub difficulty: Option<String>,
    pub cuisine: Option<String>,
    pub author: Option<String>,
    pub cookbook_name: Option<String>,
    pub isbn: Option<String>,
    /// ISO 639-1 code of the source text.
    pub source_language: String,
    pub ai_tags: Vec<String>,
    /// Catch-all for fields with no column of their own (e.g. total_time).
    pub extra_data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingredient {
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub name: String,
    /// Subheading the ingredient renders under ("For the sauce"); `None`
    /// is the implicit default group.
    pub group_name: Option<String>,
    pub notes: Option<String>,
    /// Position within its group. Unique per (recipe, group_name).
    pub order_index: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Step {
    /// 1-based, assigned from array position when the source has none.
    pub step_number: u32,
    pub description: String,
    pub extra: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tool {
    pub name: String,
    pub notes: Option<String>,
}

impl Recipe {
    /// A document with every field at its defined default.
    pub fn empty() -> Self {
        Recipe {
            title: UNTITLED.to_string(),
            source_language: "en".to_string(),
            ..Default::default()
        }
    }
}

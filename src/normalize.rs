use serde_json::{Map, Value};

use crate::recipe::{Ingredient, Recipe, Step, Tool, UNTITLED};

// Ordered candidate keys per canonical field. Historical payloads (AI
// output, old form state, scraped schema) disagree on naming; the first
// present non-null key wins.
const TITLE_KEYS: &[&str] = &["title", "name"];
const SUBTITLE_KEYS: &[&str] = &["subtitle"];
const INTRODUCTION_KEYS: &[&str] = &["introduction", "intro"];
const DESCRIPTION_KEYS: &[&str] = &["description", "desc", "summary"];
const SERVINGS_KEYS: &[&str] = &["servings", "portions", "yield"];
const PREP_TIME_KEYS: &[&str] = &["prep_time", "prepTime", "preparation_time"];
const COOK_TIME_KEYS: &[&str] = &["cook_time", "cookTime", "cooking_time"];
const DIFFICULTY_KEYS: &[&str] = &["difficulty", "level", "skill_level"];
const CUISINE_KEYS: &[&str] = &["cuisine", "category", "type"];
const AUTHOR_KEYS: &[&str] = &["author", "chef", "creator", "by"];
const COOKBOOK_KEYS: &[&str] = &["cookbook_name", "cookbook", "book", "source_book"];
const ISBN_KEYS: &[&str] = &["isbn", "ISBN"];
const LANGUAGE_KEYS: &[&str] = &["source_language", "language", "lang"];
const TAGS_KEYS: &[&str] = &["ai_tags", "tags", "keywords"];
const INGREDIENTS_KEYS: &[&str] = &["ingredients"];
const INSTRUCTIONS_KEYS: &[&str] = &["instructions", "steps"];
const TOOLS_KEYS: &[&str] = &["tools", "equipment"];
const EXTRA_DATA_KEYS: &[&str] = &["extra_data", "extra"];

/// Canonicalize an arbitrary recipe-shaped value. Total: missing, extra,
/// or misnamed fields degrade to the documented defaults, never an error.
pub fn normalize(raw: &Value) -> Recipe {
    let obj = raw.as_object();

    let title = pick(obj, TITLE_KEYS)
        .and_then(as_text)
        .unwrap_or_else(|| UNTITLED.to_string());

    Recipe {
        title,
        subtitle: pick(obj, SUBTITLE_KEYS).and_then(as_text),
        introduction: pick(obj, INTRODUCTION_KEYS).and_then(as_text),
        description: pick(obj, DESCRIPTION_KEYS)
            .and_then(as_text)
            .unwrap_or_default(),
        ingredients: pick(obj, INGREDIENTS_KEYS)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| normalize_ingredient(item, i as u32))
                    .collect()
            })
            .unwrap_or_default(),
        instructions: pick(obj, INSTRUCTIONS_KEYS)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| normalize_step(item, i as u32))
                    .collect()
            })
            .unwrap_or_default(),
        tools: pick(obj, TOOLS_KEYS)
            .and_then(Value::as_array)
            .map(|items| items.iter().map(normalize_tool).collect())
            .unwrap_or_default(),
        servings: pick(obj, SERVINGS_KEYS).and_then(as_servings),
        prep_time: pick(obj, PREP_TIME_KEYS).and_then(as_text),
        cook_time: pick(obj, COOK_TIME_KEYS).and_then(as_text),
        difficulty: pick(obj, DIFFICULTY_KEYS).and_then(as_text),
        cuisine: pick(obj, CUISINE_KEYS).and_then(as_text),
        author: pick(obj, AUTHOR_KEYS).and_then(as_text),
        cookbook_name: pick(obj, COOKBOOK_KEYS).and_then(as_text),
        isbn: pick(obj, ISBN_KEYS).and_then(as_text),
        source_language: pick(obj, LANGUAGE_KEYS)
            .and_then(as_text)
            .unwrap_or_else(|| "en".to_string()),
        ai_tags: pick(obj, TAGS_KEYS).map(as_tags).unwrap_or_default(),
        extra_data: pick(obj, EXTRA_DATA_KEYS)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
    }
}

/// First present non-null value among `keys`.
fn pick<'a>(obj: Option<&'a Map<String, Value>>, keys: &[&str]) -> Option<&'a Value> {
    let obj = obj?;
    keys.iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
}

fn normalize_ingredient(item: &Value, position: u32) -> Ingredient {
    match item {
        Value::Object(obj) => Ingredient {
            amount: pick(Some(obj), &["amount", "quantity"]).and_then(as_amount),
            unit: pick(Some(obj), &["unit"]).and_then(as_text),
            // "item" is the legacy key from early AI prompts
            name: pick(Some(obj), &["name", "item"])
                .and_then(as_text)
                .unwrap_or_default(),
            group_name: pick(Some(obj), &["group_name", "group"]).and_then(as_text),
            notes: pick(Some(obj), &["notes", "note"]).and_then(as_text),
            order_index: pick(Some(obj), &["order_index"])
                .and_then(Value::as_u64)
                .map(|n| n as u32)
                .unwrap_or(position),
        },
        Value::String(text) => Ingredient {
            name: text.trim().to_string(),
            order_index: position,
            ..Default::default()
        },
        Value::Null => Ingredient {
            order_index: position,
            ..Default::default()
        },
        other => Ingredient {
            name: other.to_string(),
            order_index: position,
            ..Default::default()
        },
    }
}

fn normalize_step(item: &Value, position: u32) -> Step {
    match item {
        Value::Object(obj) => Step {
            step_number: pick(Some(obj), &["step_number"])
                .and_then(Value::as_u64)
                .map(|n| n as u32)
                .unwrap_or(position + 1),
            description: pick(Some(obj), &["description", "text"])
                .and_then(as_text)
                .unwrap_or_else(|| Value::Object(obj.clone()).to_string()),
            extra: pick(Some(obj), &["extra"])
                .and_then(Value::as_object)
                .cloned(),
        },
        Value::String(text) => Step {
            step_number: position + 1,
            description: text.trim().to_string(),
            extra: None,
        },
        other => Step {
            step_number: position + 1,
            description: as_text(other).unwrap_or_default(),
            extra: None,
        },
    }
}

fn normalize_tool(item: &Value) -> Tool {
    match item {
        Value::Object(obj) => Tool {
            name: pick(Some(obj), &["name"]).and_then(as_text).unwrap_or_default(),
            notes: pick(Some(obj), &["notes", "note"]).and_then(as_text),
        },
        Value::String(text) => Tool {
            name: text.trim().to_string(),
            notes: None,
        },
        other => Tool {
            name: as_text(other).unwrap_or_default(),
            notes: None,
        },
    }
}

/// Trimmed non-empty text; numbers render through Display so `prep_time: 30`
/// still lands as "30".
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_servings(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|f| *f >= 0.5)
            .map(|f| f.round() as u32),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

/// Numeric amount from a JSON number, a decimal string ("2.5", "2,5"),
/// or a fraction string ("1/2", "1 1/2").
pub(crate) fn as_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount_str(s),
        _ => None,
    }
}

pub(crate) fn parse_amount_str(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some((whole, frac)) = s.split_once(' ') {
        if let (Ok(w), Some(f)) = (whole.parse::<f64>(), parse_fraction(frac)) {
            return Some(w + f);
        }
    }
    if let Some(f) = parse_fraction(s) {
        return Some(f);
    }
    s.replace(',', ".").parse().ok()
}

fn parse_fraction(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    (den != 0.0).then_some(num / den)
}

fn as_tags(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_yields_defaults() {
        let recipe = normalize(&json!({}));
        assert_eq!(recipe.title, UNTITLED);
        assert_eq!(recipe.description, "");
        assert_eq!(recipe.source_language, "en");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.instructions.is_empty());
        assert!(recipe.extra_data.is_empty());
        assert_eq!(recipe.servings, None);
    }

    #[test]
    fn non_object_input_yields_defaults() {
        assert_eq!(normalize(&json!(null)), normalize(&json!({})));
        assert_eq!(normalize(&json!("just a string")), normalize(&json!({})));
        assert_eq!(normalize(&json!([1, 2, 3])), normalize(&json!({})));
    }

    #[test]
    fn candidate_key_precedence() {
        assert_eq!(normalize(&json!({"name": "A"})).title, "A");
        assert_eq!(normalize(&json!({"title": "B"})).title, "B");
        assert_eq!(normalize(&json!({})).title, UNTITLED);
        assert_eq!(
            normalize(&json!({"prepTime": "10 min"})).prep_time.as_deref(),
            Some("10 min")
        );
        assert_eq!(
            normalize(&json!({"portions": 4})).servings,
            Some(4)
        );
    }

    #[test]
    fn garbage_ingredients_degrade_to_empty() {
        let recipe = normalize(&json!({"ingredients": "not an array"}));
        assert!(recipe.ingredients.is_empty());
        let recipe = normalize(&json!({"ingredients": {"nested": true}}));
        assert!(recipe.ingredients.is_empty());
    }

    #[test]
    fn legacy_ingredient_mapping() {
        let recipe = normalize(&json!({"ingredients": [{"item": "ui", "amount": 1}]}));
        let ing = &recipe.ingredients[0];
        assert_eq!(ing.name, "ui");
        assert_eq!(ing.amount, Some(1.0));
        assert_eq!(ing.unit, None);
        assert_eq!(ing.group_name, None);
        assert_eq!(ing.notes, None);
        assert_eq!(ing.order_index, 0);
    }

    #[test]
    fn string_ingredient_becomes_name_only() {
        let recipe = normalize(&json!({"ingredients": ["250 g bloem", "zout"]}));
        assert_eq!(recipe.ingredients[0].name, "250 g bloem");
        assert_eq!(recipe.ingredients[0].amount, None);
        assert_eq!(recipe.ingredients[1].order_index, 1);
    }

    #[test]
    fn ingredient_unknown_keys_dropped() {
        let recipe = normalize(&json!({
            "ingredients": [{"name": "melk", "quantity": "0,5", "aisle": "dairy"}]
        }));
        let ing = &recipe.ingredients[0];
        assert_eq!(ing.amount, Some(0.5));
        let value = serde_json::to_value(ing).unwrap();
        assert!(value.get("aisle").is_none());
    }

    #[test]
    fn fraction_amounts_coerce() {
        assert_eq!(parse_amount_str("1/2"), Some(0.5));
        assert_eq!(parse_amount_str("1 1/2"), Some(1.5));
        assert_eq!(parse_amount_str("2.5"), Some(2.5));
        assert_eq!(parse_amount_str("een snuf"), None);
    }

    #[test]
    fn step_numbering_from_position() {
        let recipe = normalize(&json!({"instructions": ["Snijd de ui", "Fruit de ui"]}));
        assert_eq!(recipe.instructions[0].step_number, 1);
        assert_eq!(recipe.instructions[0].description, "Snijd de ui");
        assert_eq!(recipe.instructions[1].step_number, 2);
        assert_eq!(recipe.instructions[1].description, "Fruit de ui");
    }

    #[test]
    fn step_object_mapping() {
        let recipe = normalize(&json!({
            "steps": [
                {"text": "Kneed het deeg.", "extra": {"tip": "niet te lang"}},
                {"description": "Laat rusten.", "step_number": 7}
            ]
        }));
        assert_eq!(recipe.instructions[0].description, "Kneed het deeg.");
        assert_eq!(recipe.instructions[0].step_number, 1);
        assert_eq!(
            recipe.instructions[0].extra.as_ref().unwrap()["tip"],
            "niet te lang"
        );
        assert_eq!(recipe.instructions[1].step_number, 7);
    }

    #[test]
    fn step_object_without_text_stringifies() {
        let recipe = normalize(&json!({"instructions": [{"minutes": 5}]}));
        assert!(recipe.instructions[0].description.contains("minutes"));
    }

    #[test]
    fn tools_from_strings_and_objects() {
        let recipe = normalize(&json!({
            "tools": ["garde", {"name": "steelpan", "note": "met dikke bodem"}, {}]
        }));
        assert_eq!(recipe.tools[0].name, "garde");
        assert_eq!(recipe.tools[1].notes.as_deref(), Some("met dikke bodem"));
        assert_eq!(recipe.tools[2].name, "");
    }

    #[test]
    fn tags_from_array_or_comma_string() {
        let recipe = normalize(&json!({"keywords": "snel, vegetarisch , "}));
        assert_eq!(recipe.ai_tags, vec!["snel", "vegetarisch"]);
        let recipe = normalize(&json!({"tags": ["soep", ""]}));
        assert_eq!(recipe.ai_tags, vec!["soep"]);
    }

    #[test]
    fn extra_data_preserved() {
        let recipe = normalize(&json!({"extra_data": {"total_time": "45 min"}}));
        assert_eq!(recipe.extra_data["total_time"], "45 min");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            json!({}),
            json!({"name": "Pannenkoeken", "portions": "4 personen", "keywords": "zoet,ontbijt"}),
            json!({
                "title": "Soep",
                "ingredients": ["1 ui", {"item": "wortel", "quantity": "1/2", "group": "basis"}],
                "steps": ["Snijd alles.", {"text": "Kook 20 min.", "extra": {"tijd": "20 min"}}],
                "tools": ["soeppan"],
                "prepTime": "10 min",
                "level": "makkelijk",
                "extra": {"total_time": "30 min"}
            }),
        ];
        for input in inputs {
            let once = normalize(&input);
            let twice = normalize(&serde_json::to_value(&once).unwrap());
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn deeply_nested_junk_does_not_crash() {
        let recipe = normalize(&json!({
            "title": {"weird": {"nested": ["thing"]}},
            "ingredients": [[["nested"]], 42, null],
            "servings": {"count": 4}
        }));
        assert_eq!(recipe.title, UNTITLED);
        assert_eq!(recipe.ingredients.len(), 3);
        assert_eq!(recipe.servings, None);
    }
}

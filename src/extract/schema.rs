use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::extract::duration::format_duration;
use crate::normalize::parse_amount_str;
use crate::recipe::{Ingredient, Recipe, Step};

// Structured-data blocks are located by marker pattern, not by parsing the
// whole document; the scan only needs script bodies, not a rendered page.
static LD_JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .unwrap()
});

// Unit tokens recognized in an ingredient line, lowercase. Dutch and the
// English forms that show up in translated structured data.
const UNIT_TOKENS: &[&str] = &[
    "g", "gr", "gram", "grams", "kg", "kilo", "mg", "ml", "cl", "dl", "l", "liter", "el",
    "eetlepel", "eetlepels", "tl", "theelepel", "theelepels", "kop", "kopje", "kopjes", "snuf",
    "snufje", "teen", "teentje", "teentjes", "blik", "blikje", "zakje", "plak", "plakjes",
    "stuk", "stuks", "cup", "cups", "tbsp", "tablespoon", "tablespoons", "tsp", "teaspoon",
    "teaspoons", "oz", "ounce", "ounces", "lb", "lbs", "pound", "pounds", "pinch", "clove",
    "cloves", "slice", "slices", "piece", "pieces", "can", "package",
];

/// Scan `html` for embedded JSON-LD blocks and return the first
/// recipe-typed item. Malformed blocks are skipped; `None` means the page
/// carries no usable structured recipe data.
pub fn extract_schema(html: &str) -> Option<Value> {
    for caps in LD_JSON_RE.captures_iter(html) {
        let body = caps[1].trim();
        let decoded: Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(e) => {
                debug!("Skipping malformed structured-data block: {}", e);
                continue;
            }
        };
        if let Some(item) = find_recipe_item(&decoded) {
            return Some(item.clone());
        }
    }
    None
}

/// Search a decoded block for a `Recipe`-typed item: the value itself, an
/// element of a top-level array, or an entry of an `@graph` container.
fn find_recipe_item(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(obj) => {
            if is_recipe_type(obj.get("@type")) {
                return Some(value);
            }
            obj.get("@graph")
                .and_then(Value::as_array)
                .and_then(|items| items.iter().find_map(find_recipe_item))
        }
        Value::Array(items) => items.iter().find_map(find_recipe_item),
        _ => None,
    }
}

fn is_recipe_type(type_tag: Option<&Value>) -> bool {
    match type_tag {
        Some(Value::String(s)) => is_recipe_name(s),
        Some(Value::Array(items)) => items
            .iter()
            .any(|t| t.as_str().is_some_and(is_recipe_name)),
        _ => false,
    }
}

fn is_recipe_name(s: &str) -> bool {
    s == "Recipe" || s.ends_with("/Recipe") || s.ends_with(":Recipe")
}

/// Map a structured-data recipe item onto the canonical document. `None`
/// when the item has no name, which makes it useless downstream.
pub fn schema_to_recipe(schema: &Value) -> Option<Recipe> {
    let title = text_field(schema, &["name", "title"])?;

    let ingredients = schema
        .get("recipeIngredient")
        .or_else(|| schema.get("ingredients"))
        .and_then(Value::as_array)
        .map(|lines| {
            lines
                .iter()
                .filter_map(Value::as_str)
                .enumerate()
                .map(|(i, line)| parse_ingredient_line(line, i as u32))
                .collect()
        })
        .unwrap_or_default();

    let instructions = schema
        .get("recipeInstructions")
        .and_then(Value::as_array)
        .map(|steps| collect_steps(steps))
        .unwrap_or_default();

    let mut recipe = Recipe {
        title,
        description: text_field(schema, &["description"]).unwrap_or_default(),
        ingredients,
        instructions,
        servings: schema.get("recipeYield").and_then(parse_yield),
        prep_time: text_field(schema, &["prepTime"]).map(|d| format_duration(&d)),
        cook_time: text_field(schema, &["cookTime"]).map(|d| format_duration(&d)),
        cuisine: schema.get("recipeCuisine").and_then(first_text),
        author: schema.get("author").and_then(author_name),
        source_language: "en".to_string(),
        ai_tags: schema.get("keywords").map(keyword_list).unwrap_or_default(),
        ..Recipe::empty()
    };

    if let Some(total) = text_field(schema, &["totalTime"]) {
        recipe
            .extra_data
            .insert("total_time".to_string(), Value::String(format_duration(&total)));
    }

    Some(recipe)
}

/// "250 g bloem" → amount 250, unit "g", name "bloem". Lines that don't
/// lead with an amount fall back to the whole string as the name.
fn parse_ingredient_line(line: &str, position: u32) -> Ingredient {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();

    let fallback = |name: &str| Ingredient {
        name: name.to_string(),
        order_index: position,
        ..Default::default()
    };

    if tokens.len() < 2 {
        return fallback(trimmed);
    }

    // Amount: first token, or first two for a mixed fraction ("1 1/2 cup").
    let (amount, mut rest) = if tokens.len() >= 3 && tokens[1].contains('/') {
        match parse_amount_str(&format!("{} {}", tokens[0], tokens[1])) {
            Some(a) => (a, &tokens[2..]),
            None => match parse_amount_str(tokens[0]) {
                Some(a) => (a, &tokens[1..]),
                None => return fallback(trimmed),
            },
        }
    } else {
        match parse_amount_str(tokens[0]) {
            Some(a) => (a, &tokens[1..]),
            None => return fallback(trimmed),
        }
    };

    let unit = rest
        .first()
        .map(|t| t.trim_end_matches('.').to_lowercase())
        .filter(|t| UNIT_TOKENS.contains(&t.as_str()));
    if unit.is_some() {
        rest = &rest[1..];
    }

    if rest.is_empty() {
        // "2 el" style leftovers: an amount with nothing to name
        return fallback(trimmed);
    }

    Ingredient {
        amount: Some(amount),
        unit,
        name: rest.join(" "),
        group_name: None,
        notes: None,
        order_index: position,
    }
}

/// Steps arrive as plain strings or HowToStep objects carrying `text` or
/// `name`. Empty descriptions are dropped; numbering is dense 1..N.
fn collect_steps(steps: &[Value]) -> Vec<Step> {
    steps
        .iter()
        .filter_map(|step| match step {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(obj) => obj
                .get("text")
                .or_else(|| obj.get("name"))
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string()),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .enumerate()
        .map(|(i, description)| Step {
            step_number: i as u32 + 1,
            description,
            extra: None,
        })
        .collect()
}

fn parse_yield(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as u32),
        Value::String(s) => first_integer(s),
        Value::Array(items) => items.iter().find_map(parse_yield),
        _ => None,
    }
}

fn first_integer(s: &str) -> Option<u32> {
    let digits: String = s
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn text_field(schema: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        schema
            .get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// First string out of a string-or-array field like recipeCuisine.
fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}

/// Author as a plain string, a Person object, or an array of either.
fn author_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Object(obj) => obj.get("name").and_then(author_name),
        Value::Array(items) => items.iter().find_map(author_name),
        _ => None,
    }
}

fn keyword_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

// ── Tests ──

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// TheMealDB denormalizes ingredients into numbered fields `strIngredient1..=20`.
pub const INGREDIENT_SLOTS: usize = 20;

// --- Response envelope ---

/// Every endpoint answers `{"meals": [...]}`, with `null` (or occasionally a
/// bare string) when nothing matched.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub(crate) struct MealsEnvelope<T> {
    #[serde(default = "Vec::new", deserialize_with = "list_or_empty")]
    pub meals: Vec<T>,
}

fn list_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => {
            serde_json::from_value(serde_json::Value::Array(items)).map_err(serde::de::Error::custom)
        }
        _ => Ok(Vec::new()),
    }
}

// --- Meal record ---

/// A meal as returned by TheMealDB. Filter endpoints only populate id, name
/// and thumbnail; search and lookup populate everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meal {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal", default)]
    pub name: Option<String>,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strArea", default)]
    pub area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
    #[serde(rename = "strTags", default)]
    pub tags: Option<String>,
    #[serde(rename = "strYoutube", default)]
    pub youtube: Option<String>,
    #[serde(rename = "strSource", default)]
    pub source: Option<String>,
    /// Numbered ingredient/measure slots and any other fields.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Meal {
    fn slot(&self, prefix: &str, index: usize) -> Option<&str> {
        self.extra
            .get(&format!("{prefix}{index}"))
            .and_then(|v| v.as_str())
    }

    /// Trimmed `(ingredient, measure)` pairs in slot order. Slots whose
    /// ingredient is missing or blank are skipped; a missing measure is "".
    pub fn ingredient_pairs(&self) -> Vec<(String, String)> {
        (1..=INGREDIENT_SLOTS)
            .filter_map(|i| {
                let name = self.slot("strIngredient", i)?.trim();
                if name.is_empty() {
                    return None;
                }
                let measure = self.slot("strMeasure", i).map(str::trim).unwrap_or("");
                Some((name.to_string(), measure.to_string()))
            })
            .collect()
    }
}

// --- Category listing ---

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CategoryName {
    #[serde(rename = "strCategory")]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal_with_slots(blank: &[usize]) -> Meal {
        let mut json = serde_json::json!({
            "idMeal": "52772",
            "strMeal": "Teriyaki Chicken Casserole",
            "strCategory": "Chicken",
            "strArea": "Japanese",
        });
        let obj = json.as_object_mut().unwrap();
        for i in 1..=INGREDIENT_SLOTS {
            let (name, measure) = if blank.contains(&i) {
                (if i % 2 == 0 { "   " } else { "" }.to_string(), String::new())
            } else {
                (format!("  ingredient {i} "), format!(" {i} tbs "))
            };
            obj.insert(format!("strIngredient{i}"), name.into());
            obj.insert(format!("strMeasure{i}"), measure.into());
        }
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn blank_slots_are_skipped_in_order() {
        let meal = meal_with_slots(&[3, 7]);
        let pairs = meal.ingredient_pairs();

        assert_eq!(pairs.len(), 18);
        assert_eq!(pairs[0], ("ingredient 1".to_string(), "1 tbs".to_string()));
        assert_eq!(pairs[2].0, "ingredient 4");
        assert_eq!(pairs[5].0, "ingredient 8");
        assert_eq!(pairs[17].0, "ingredient 20");
    }

    #[test]
    fn null_slots_and_missing_measures() {
        let meal: Meal = serde_json::from_str(
            r#"{"idMeal":"1","strIngredient1":"Salt","strMeasure1":null,"strIngredient2":null}"#,
        )
        .unwrap();
        assert_eq!(meal.ingredient_pairs(), vec![("Salt".to_string(), String::new())]);
    }

    #[test]
    fn summary_record_parses() {
        let meal: Meal = serde_json::from_str(
            r#"{"strMeal":"Baked salmon","strMealThumb":"https://x/img.jpg","idMeal":"52959"}"#,
        )
        .unwrap();
        assert_eq!(meal.id, "52959");
        assert_eq!(meal.name.as_deref(), Some("Baked salmon"));
        assert!(meal.category.is_none());
        assert!(meal.ingredient_pairs().is_empty());
    }

    #[test]
    fn envelope_null_and_string_mean_empty() {
        let null: MealsEnvelope<Meal> = serde_json::from_str(r#"{"meals":null}"#).unwrap();
        assert!(null.meals.is_empty());

        let text: MealsEnvelope<Meal> = serde_json::from_str(r#"{"meals":"Invalid ID"}"#).unwrap();
        assert!(text.meals.is_empty());

        let missing: MealsEnvelope<Meal> = serde_json::from_str("{}").unwrap();
        assert!(missing.meals.is_empty());
    }

    #[test]
    fn category_listing_parses() {
        let cats: MealsEnvelope<CategoryName> =
            serde_json::from_str(r#"{"meals":[{"strCategory":"Beef"},{"strCategory":"Dessert"}]}"#)
                .unwrap();
        let names: Vec<_> = cats.meals.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Beef", "Dessert"]);
    }
}

//! Animal-product catalog and the substitution rule table.
//!
//! Ingredients are recognised by word-bounded keywords (English and the common
//! Russian forms used in older content). Anything the catalog does not
//! recognise is treated as plant-based and never substituted.

use std::ops::{Add, AddAssign, Sub};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::program::types::DietaryPreference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodGroup {
    Poultry,
    RedMeat,
    ProcessedMeat,
    Fish,
    Seafood,
    Egg,
    Dairy,
    Honey,
}

impl DietaryPreference {
    pub fn allows(self, group: FoodGroup) -> bool {
        use FoodGroup::*;
        match self {
            DietaryPreference::Omnivor => true,
            DietaryPreference::Pescatarian => !matches!(group, Poultry | RedMeat | ProcessedMeat),
            DietaryPreference::Vegetarian => {
                !matches!(group, Poultry | RedMeat | ProcessedMeat | Fish | Seafood)
            }
            DietaryPreference::Vegan => false,
        }
    }
}

/// Energy and macronutrients, per 100 g unless scaled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Macros {
    pub kcal: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Macros {
    pub const fn new(kcal: f64, protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            kcal,
            protein,
            carbs,
            fats,
        }
    }

    pub fn scaled(&self, grams: f64) -> Self {
        let k = grams / 100.0;
        Self::new(self.kcal * k, self.protein * k, self.carbs * k, self.fats * k)
    }
}

impl Add for Macros {
    type Output = Macros;
    fn add(self, rhs: Macros) -> Macros {
        Macros::new(
            self.kcal + rhs.kcal,
            self.protein + rhs.protein,
            self.carbs + rhs.carbs,
            self.fats + rhs.fats,
        )
    }
}

impl Sub for Macros {
    type Output = Macros;
    fn sub(self, rhs: Macros) -> Macros {
        Macros::new(
            self.kcal - rhs.kcal,
            self.protein - rhs.protein,
            self.carbs - rhs.carbs,
            self.fats - rhs.fats,
        )
    }
}

impl AddAssign for Macros {
    fn add_assign(&mut self, rhs: Macros) {
        *self = *self + rhs;
    }
}

#[derive(Debug)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub group: FoodGroup,
    pub keywords: &'static [&'static str],
    pub per_100g: Macros,
}

#[derive(Debug)]
pub struct Substitute {
    pub id: &'static str,
    /// Ingredient name written into the meal.
    pub name: &'static str,
    /// Word used when rewriting the meal's display name.
    pub label: &'static str,
    pub per_100g: Macros,
    pub liquid: bool,
}

// More specific entries first: "cottage cheese" must win over "cheese".
pub static CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "chicken",
        group: FoodGroup::Poultry,
        keywords: &[
            "chicken breast", "chicken fillet", "chicken thighs", "chicken thigh", "chicken",
            "куриное филе", "курица", "курицы", "куриная грудка", "куриная", "куриный",
        ],
        per_100g: Macros::new(165.0, 31.0, 0.0, 3.6),
    },
    CatalogEntry {
        id: "turkey",
        group: FoodGroup::Poultry,
        keywords: &["turkey fillet", "turkey breast", "turkey", "индейка", "индейки", "филе индейки"],
        per_100g: Macros::new(135.0, 29.0, 0.0, 1.6),
    },
    CatalogEntry {
        id: "bacon",
        group: FoodGroup::ProcessedMeat,
        keywords: &["bacon", "бекон"],
        per_100g: Macros::new(541.0, 37.0, 1.4, 42.0),
    },
    CatalogEntry {
        id: "ham",
        group: FoodGroup::ProcessedMeat,
        keywords: &["ham", "ветчина", "ветчины"],
        per_100g: Macros::new(145.0, 21.0, 1.5, 6.0),
    },
    CatalogEntry {
        id: "sausage",
        group: FoodGroup::ProcessedMeat,
        keywords: &["sausages", "sausage", "salami", "колбаса", "сосиски"],
        per_100g: Macros::new(301.0, 12.0, 2.0, 27.0),
    },
    CatalogEntry {
        id: "beef",
        group: FoodGroup::RedMeat,
        keywords: &[
            "lean ground beef", "ground beef", "beef steak", "beef", "steak", "veal",
            "говядина", "говядины", "телятина",
        ],
        per_100g: Macros::new(217.0, 26.0, 0.0, 12.0),
    },
    CatalogEntry {
        id: "pork",
        group: FoodGroup::RedMeat,
        keywords: &["pork tenderloin", "pork", "свинина", "свинины"],
        per_100g: Macros::new(143.0, 26.0, 0.0, 3.5),
    },
    CatalogEntry {
        id: "lamb",
        group: FoodGroup::RedMeat,
        keywords: &["lamb", "баранина"],
        per_100g: Macros::new(258.0, 25.0, 0.0, 17.0),
    },
    CatalogEntry {
        id: "salmon",
        group: FoodGroup::Fish,
        keywords: &["salmon fillet", "smoked salmon", "salmon", "лосось", "лосося", "сёмга", "семга"],
        per_100g: Macros::new(208.0, 20.0, 0.0, 13.0),
    },
    CatalogEntry {
        id: "tuna",
        group: FoodGroup::Fish,
        keywords: &["tuna", "тунец", "тунца"],
        per_100g: Macros::new(116.0, 26.0, 0.0, 1.0),
    },
    CatalogEntry {
        id: "white_fish",
        group: FoodGroup::Fish,
        keywords: &[
            "cod fillet", "cod", "hake", "pollock", "trout", "mackerel", "fish",
            "треска", "трески", "хек", "минтай", "форель", "скумбрия", "рыба",
        ],
        per_100g: Macros::new(82.0, 18.0, 0.0, 0.7),
    },
    CatalogEntry {
        id: "shrimp",
        group: FoodGroup::Seafood,
        keywords: &["shrimps", "shrimp", "prawns", "squid", "mussels", "креветки", "кальмар"],
        per_100g: Macros::new(99.0, 24.0, 0.2, 0.3),
    },
    CatalogEntry {
        id: "egg",
        group: FoodGroup::Egg,
        keywords: &["egg whites", "eggs", "egg", "omelette", "яйца", "яйцо", "яиц", "омлет"],
        per_100g: Macros::new(155.0, 13.0, 1.1, 11.0),
    },
    CatalogEntry {
        id: "whey",
        group: FoodGroup::Dairy,
        keywords: &["whey protein", "whey", "протеин сывороточный", "сывороточный протеин"],
        per_100g: Macros::new(400.0, 80.0, 8.0, 6.0),
    },
    CatalogEntry {
        id: "cottage_cheese",
        group: FoodGroup::Dairy,
        keywords: &["cottage cheese", "творог", "творога"],
        per_100g: Macros::new(98.0, 11.0, 3.4, 4.3),
    },
    CatalogEntry {
        id: "yogurt",
        group: FoodGroup::Dairy,
        keywords: &["greek yogurt", "yogurt", "yoghurt", "kefir", "йогурт", "кефир"],
        per_100g: Macros::new(97.0, 9.0, 3.9, 5.0),
    },
    CatalogEntry {
        id: "cheese",
        group: FoodGroup::Dairy,
        keywords: &["cheddar", "mozzarella", "parmesan", "feta", "cheese", "сыр", "сыра"],
        per_100g: Macros::new(403.0, 25.0, 1.3, 33.0),
    },
    CatalogEntry {
        id: "milk",
        group: FoodGroup::Dairy,
        keywords: &["milk", "молоко", "молока"],
        per_100g: Macros::new(60.0, 3.2, 4.7, 3.2),
    },
    CatalogEntry {
        id: "butter",
        group: FoodGroup::Dairy,
        keywords: &["butter", "сливочное масло"],
        per_100g: Macros::new(717.0, 0.9, 0.1, 81.0),
    },
    CatalogEntry {
        id: "honey",
        group: FoodGroup::Honey,
        keywords: &["honey", "мёд", "мед", "мёда"],
        per_100g: Macros::new(304.0, 0.3, 82.0, 0.0),
    },
];

/// Words marking a plant-based version of a catalog product ("soy milk", "peanut butter").
const PLANT_MARKERS: &[&str] = &[
    "soy", "soya", "almond", "oat", "coconut", "cashew", "peanut", "vegan", "plant", "tofu",
    "соевое", "соевый", "миндальное", "овсяное", "кокосовое", "арахисовая", "растительный",
];

pub static SUBSTITUTES: &[Substitute] = &[
    Substitute {
        id: "tofu",
        name: "Firm tofu",
        label: "tofu",
        per_100g: Macros::new(144.0, 17.3, 2.8, 8.7),
        liquid: false,
    },
    Substitute {
        id: "tempeh",
        name: "Tempeh",
        label: "tempeh",
        per_100g: Macros::new(192.0, 20.3, 7.6, 10.8),
        liquid: false,
    },
    Substitute {
        id: "smoked_tofu",
        name: "Smoked tofu",
        label: "smoked tofu",
        per_100g: Macros::new(160.0, 16.0, 2.0, 9.5),
        liquid: false,
    },
    Substitute {
        id: "edamame",
        name: "Edamame",
        label: "edamame",
        per_100g: Macros::new(121.0, 11.9, 8.9, 5.2),
        liquid: false,
    },
    Substitute {
        id: "cod",
        name: "Cod fillet",
        label: "cod",
        per_100g: Macros::new(82.0, 18.0, 0.0, 0.7),
        liquid: false,
    },
    Substitute {
        id: "salmon",
        name: "Salmon fillet",
        label: "salmon",
        per_100g: Macros::new(208.0, 20.0, 0.0, 13.0),
        liquid: false,
    },
    Substitute {
        id: "smoked_salmon",
        name: "Smoked salmon",
        label: "smoked salmon",
        per_100g: Macros::new(117.0, 18.0, 0.0, 4.3),
        liquid: false,
    },
    Substitute {
        id: "scrambled_tofu",
        name: "Tofu scramble",
        label: "tofu",
        per_100g: Macros::new(144.0, 17.3, 2.8, 8.7),
        liquid: false,
    },
    Substitute {
        id: "pea_protein",
        name: "Pea protein",
        label: "pea protein",
        per_100g: Macros::new(390.0, 80.0, 4.0, 7.0),
        liquid: false,
    },
    Substitute {
        id: "silken_tofu",
        name: "Silken tofu",
        label: "silken tofu",
        per_100g: Macros::new(62.0, 6.9, 1.9, 2.7),
        liquid: false,
    },
    Substitute {
        id: "soy_yogurt",
        name: "Soy yogurt",
        label: "soy yogurt",
        per_100g: Macros::new(66.0, 3.9, 5.1, 3.5),
        liquid: false,
    },
    Substitute {
        id: "vegan_cheese",
        name: "Vegan cheese",
        label: "vegan cheese",
        per_100g: Macros::new(280.0, 1.0, 20.0, 22.0),
        liquid: false,
    },
    Substitute {
        id: "soy_milk",
        name: "Soy milk",
        label: "soy milk",
        per_100g: Macros::new(54.0, 3.3, 6.0, 1.8),
        liquid: true,
    },
    Substitute {
        id: "coconut_oil",
        name: "Coconut oil",
        label: "coconut oil",
        per_100g: Macros::new(862.0, 0.0, 0.0, 100.0),
        liquid: false,
    },
    Substitute {
        id: "maple_syrup",
        name: "Maple syrup",
        label: "maple syrup",
        per_100g: Macros::new(260.0, 0.0, 67.0, 0.1),
        liquid: false,
    },
];

#[derive(Debug, Clone, Copy)]
enum RuleKey {
    Entry(&'static str),
    Group(FoodGroup),
}

struct Rule {
    key: RuleKey,
    preference: DietaryPreference,
    substitute: &'static str,
}

const fn entry(id: &'static str, preference: DietaryPreference, substitute: &'static str) -> Rule {
    Rule {
        key: RuleKey::Entry(id),
        preference,
        substitute,
    }
}

const fn group(group: FoodGroup, preference: DietaryPreference, substitute: &'static str) -> Rule {
    Rule {
        key: RuleKey::Group(group),
        preference,
        substitute,
    }
}

static RULES: &[Rule] = {
    use DietaryPreference::{Pescatarian, Vegan, Vegetarian};
    use FoodGroup::*;
    &[
        group(Poultry, Pescatarian, "cod"),
        group(RedMeat, Pescatarian, "salmon"),
        group(ProcessedMeat, Pescatarian, "smoked_salmon"),
        group(Poultry, Vegetarian, "tofu"),
        group(RedMeat, Vegetarian, "tempeh"),
        group(ProcessedMeat, Vegetarian, "smoked_tofu"),
        group(Fish, Vegetarian, "tofu"),
        group(Seafood, Vegetarian, "edamame"),
        group(Poultry, Vegan, "tofu"),
        group(RedMeat, Vegan, "tempeh"),
        group(ProcessedMeat, Vegan, "smoked_tofu"),
        group(Fish, Vegan, "tofu"),
        group(Seafood, Vegan, "edamame"),
        group(Egg, Vegan, "scrambled_tofu"),
        group(Dairy, Vegan, "soy_yogurt"),
        group(Honey, Vegan, "maple_syrup"),
        entry("whey", Vegan, "pea_protein"),
        entry("cottage_cheese", Vegan, "silken_tofu"),
        entry("cheese", Vegan, "vegan_cheese"),
        entry("milk", Vegan, "soy_milk"),
        entry("butter", Vegan, "coconut_oil"),
    ]
};

lazy_static! {
    static ref ENTRY_PATTERNS: Vec<Regex> = CATALOG
        .iter()
        .map(|entry| keyword_regex(entry.keywords))
        .collect();
    static ref PLANT_MARKER_RE: Regex = keyword_regex(PLANT_MARKERS);
}

/// Case-insensitive, word-bounded alternation, longest keyword first.
fn keyword_regex(keywords: &[&str]) -> Regex {
    let mut words: Vec<&str> = keywords.to_vec();
    words.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).unwrap()
}

/// Finds the catalog entry an ingredient name refers to.
pub fn classify(ingredient_name: &str) -> Option<&'static CatalogEntry> {
    if PLANT_MARKER_RE.is_match(ingredient_name) {
        return None;
    }
    CATALOG
        .iter()
        .zip(ENTRY_PATTERNS.iter())
        .find(|(_, re)| re.is_match(ingredient_name))
        .map(|(entry, _)| entry)
}

/// Word-bounded matcher for an entry's keywords, shared with meal renaming.
pub fn entry_pattern(entry: &CatalogEntry) -> Option<&'static Regex> {
    CATALOG
        .iter()
        .position(|e| e.id == entry.id)
        .map(|idx| &ENTRY_PATTERNS[idx])
}

/// Substitute for a catalog entry under a preference, `None` when the entry is
/// allowed or no rule covers it.
pub fn substitute_for(
    entry: &CatalogEntry,
    preference: DietaryPreference,
) -> Option<&'static Substitute> {
    if preference.allows(entry.group) {
        return None;
    }
    let by_entry = RULES.iter().find(|rule| {
        rule.preference == preference && matches!(rule.key, RuleKey::Entry(id) if id == entry.id)
    });
    let rule = by_entry.or_else(|| {
        RULES.iter().find(|rule| {
            rule.preference == preference
                && matches!(rule.key, RuleKey::Group(g) if g == entry.group)
        })
    })?;
    SUBSTITUTES.iter().find(|s| s.id == rule.substitute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_whole_words() {
        assert_eq!(classify("Chicken breast").unwrap().id, "chicken");
        assert_eq!(classify("Cottage cheese 5%").unwrap().id, "cottage_cheese");
        assert_eq!(classify("Cheddar").unwrap().id, "cheese");
        assert_eq!(classify("Куриное филе").unwrap().id, "chicken");
        assert!(classify("Eggplant").is_none());
        assert!(classify("Hamburger bun").is_none());
        assert!(classify("Rice").is_none());
    }

    #[test]
    fn plant_versions_are_not_animal_products() {
        assert!(classify("Peanut butter").is_none());
        assert!(classify("Soy milk").is_none());
        assert!(classify("Vegan cheese").is_none());
        assert!(classify("Almond milk").is_none());
    }

    #[test]
    fn allowed_groups_narrow_with_restrictiveness() {
        use FoodGroup::*;
        let all = [Poultry, RedMeat, ProcessedMeat, Fish, Seafood, Egg, Dairy, Honey];
        let allowed = |pref: DietaryPreference| all.iter().filter(|g| pref.allows(**g)).count();
        assert_eq!(allowed(DietaryPreference::Omnivor), 8);
        assert_eq!(allowed(DietaryPreference::Pescatarian), 5);
        assert_eq!(allowed(DietaryPreference::Vegetarian), 3);
        assert_eq!(allowed(DietaryPreference::Vegan), 0);
    }

    #[test]
    fn every_disallowed_group_has_a_rule() {
        use FoodGroup::*;
        let all = [Poultry, RedMeat, ProcessedMeat, Fish, Seafood, Egg, Dairy, Honey];
        for pref in DietaryPreference::ALL.iter().copied() {
            for entry in CATALOG {
                if !pref.allows(entry.group) {
                    assert!(
                        substitute_for(entry, pref).is_some(),
                        "no substitute for {} under {}",
                        entry.id,
                        pref
                    );
                }
            }
            for g in all {
                if pref.allows(g) {
                    assert!(CATALOG
                        .iter()
                        .filter(|e| e.group == g)
                        .all(|e| substitute_for(e, pref).is_none()));
                }
            }
        }
    }

    #[test]
    fn specific_rules_win_over_group_rules() {
        let milk = CATALOG.iter().find(|e| e.id == "milk").unwrap();
        assert_eq!(substitute_for(milk, DietaryPreference::Vegan).unwrap().id, "soy_milk");
        let yogurt = CATALOG.iter().find(|e| e.id == "yogurt").unwrap();
        assert_eq!(substitute_for(yogurt, DietaryPreference::Vegan).unwrap().id, "soy_yogurt");
        assert!(substitute_for(milk, DietaryPreference::Vegetarian).is_none());
    }

    #[test]
    fn substitutes_are_themselves_compliant() {
        let vegan_ids = ["tofu", "tempeh", "smoked_tofu", "edamame", "scrambled_tofu",
            "pea_protein", "silken_tofu", "soy_yogurt", "vegan_cheese", "soy_milk",
            "coconut_oil", "maple_syrup"];
        for sub in SUBSTITUTES.iter().filter(|s| vegan_ids.contains(&s.id)) {
            assert!(classify(sub.name).is_none(), "{} classified as animal", sub.name);
        }
    }
}

use tracing::info;

use super::client::{ChatClient, ChatMessage, ChatReply, ChatRole, CoachError};
use super::prompts::{meal_swap_prompt, parse_meal_reply, system_prompt};
use crate::content::Ingredient;
use crate::meals::services::prepare_override;
use crate::meals::substitution::{SubstitutedIngredient, SubstitutedMeal};
use crate::records::Profile;

/// Earlier turns sent back by the client; only the most recent are forwarded.
pub const MAX_HISTORY: usize = 20;

pub async fn coach_chat(
    chat: &dyn ChatClient,
    profile: Option<&Profile>,
    history: &[ChatMessage],
    message: &str,
) -> Result<ChatReply, CoachError> {
    let mut messages = Vec::with_capacity(history.len().min(MAX_HISTORY) + 2);
    messages.push(ChatMessage::system(system_prompt(profile)));
    let skip = history.len().saturating_sub(MAX_HISTORY);
    messages.extend(
        history
            .iter()
            .skip(skip)
            .filter(|m| m.role != ChatRole::System)
            .cloned(),
    );
    messages.push(ChatMessage::user(message));
    chat.complete(&messages).await
}

/// Asks the model for a replacement of `current` and returns it ready to store.
pub async fn generate_meal_swap(
    chat: &dyn ChatClient,
    profile: &Profile,
    current: &SubstitutedMeal,
    wish: Option<&str>,
) -> Result<SubstitutedMeal, CoachError> {
    let messages = [
        ChatMessage::system(system_prompt(Some(profile))),
        ChatMessage::user(meal_swap_prompt(current, profile.dietary_preference, wish)),
    ];
    let reply = chat.complete(&messages).await?;
    let parsed = parse_meal_reply(&reply.content)?;

    let grams = |value: Option<f64>, fallback: u32| {
        value
            .filter(|v| v.is_finite())
            .map(|v| v.max(0.0).round() as u32)
            .unwrap_or(fallback)
    };
    let meal = SubstitutedMeal {
        meal_number: current.meal_number,
        time: parsed
            .time
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| current.time.clone()),
        name: parsed.name.trim().to_string(),
        calories: 0,
        protein: grams(parsed.protein, current.protein),
        carbs: grams(parsed.carbs, current.carbs),
        fats: grams(parsed.fats, current.fats),
        ingredients: parsed
            .ingredients
            .into_iter()
            .map(|ingredient: Ingredient| SubstitutedIngredient {
                ingredient,
                substituted: false,
                original_name: None,
            })
            .collect(),
        substitution_count: 0,
        name_updated: false,
    };

    info!(
        email = %profile.email,
        meal_number = meal.meal_number,
        model = %reply.model,
        "meal swap generated"
    );
    Ok(prepare_override(meal, profile.dietary_preference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::client::ScriptedChat;
    use crate::content::Meal;
    use crate::program::types::{Category, DietaryPreference, Level, WorkoutLocation};
    use time::macros::date;

    fn profile(preference: DietaryPreference) -> Profile {
        Profile {
            email: "coach@test.io".into(),
            category: Category::Energy,
            level: Level::Normal,
            workout_location: WorkoutLocation::Home,
            dietary_preference: preference,
            program_start: date!(2024 - 01 - 01),
        }
    }

    fn current() -> SubstitutedMeal {
        SubstitutedMeal::from(Meal {
            meal_number: 2,
            time: "13:00".into(),
            name: "Chicken with rice".into(),
            calories: 495,
            protein: 50,
            carbs: 45,
            fats: 8,
            ingredients: vec![
                Ingredient {
                    name: "Chicken breast".into(),
                    quantity: "200g".into(),
                    calories: 330,
                },
                Ingredient {
                    name: "Rice".into(),
                    quantity: "50g".into(),
                    calories: 165,
                },
            ],
        })
    }

    #[tokio::test]
    async fn swap_keeps_slot_and_recomputes_calories() {
        let chat = ScriptedChat::new([Ok(r#"{"name": "Lentil curry", "protein": 28.4,
            "ingredients": [{"name": "Red lentils", "quantity": "120g", "calories": 410},
                            {"name": "Coconut milk", "quantity": "50ml", "calories": 95}]}"#
            .to_string())]);
        let meal = generate_meal_swap(&chat, &profile(DietaryPreference::Omnivor), &current(), None)
            .await
            .unwrap();
        assert_eq!(meal.meal_number, 2);
        assert_eq!(meal.time, "13:00");
        assert_eq!(meal.calories, 505);
        assert_eq!(meal.protein, 28);
        assert_eq!(meal.carbs, 45);
    }

    #[tokio::test]
    async fn swap_enforces_preference() {
        let chat = ScriptedChat::new([Ok(r#"{"name": "Salmon bowl",
            "ingredients": [{"name": "Salmon fillet", "quantity": "150g", "calories": 312}]}"#
            .to_string())]);
        let meal = generate_meal_swap(&chat, &profile(DietaryPreference::Vegan), &current(), Some("fish please"))
            .await
            .unwrap();
        assert!(meal.ingredients[0].substituted);
        assert_eq!(meal.substitution_count, 1);
        assert_eq!(meal.calories, meal.ingredient_calories());
        let prompt = chat.seen.lock().unwrap()[0][1].content.clone();
        assert!(prompt.contains("fish please"));
        assert!(prompt.contains("no animal products"));
    }

    #[tokio::test]
    async fn unusable_reply_is_an_error() {
        let chat = ScriptedChat::new([Ok("Sorry, I can't.".to_string())]);
        let err = generate_meal_swap(&chat, &profile(DietaryPreference::Omnivor), &current(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::InvalidReply(_)));
    }

    #[tokio::test]
    async fn chat_sends_system_prompt_and_trimmed_history() {
        let chat = ScriptedChat::new([Ok("Drink water.".to_string())]);
        let history: Vec<ChatMessage> = (0..30)
            .map(|i| ChatMessage::user(format!("turn {i}")))
            .collect();
        let reply = coach_chat(&chat, None, &history, "I'm tired").await.unwrap();
        assert_eq!(reply.content, "Drink water.");

        let seen = chat.seen.lock().unwrap();
        let sent = &seen[0];
        assert_eq!(sent.len(), MAX_HISTORY + 2);
        assert_eq!(sent[0].role, ChatRole::System);
        assert_eq!(sent[1].content, "turn 10");
        assert_eq!(sent.last().unwrap().content, "I'm tired");
    }
}

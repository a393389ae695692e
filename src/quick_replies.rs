//! Suggested answers for each survey step and the two reference panels.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    StorageTips,
    LeftoverTips,
}

/// A suggestion either sends its text as the next user turn or opens a panel locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickReply {
    Send(&'static str),
    Show(&'static str, Panel),
}

impl QuickReply {
    pub fn label(&self) -> &'static str {
        match self {
            QuickReply::Send(text) => *text,
            QuickReply::Show(text, _) => *text,
        }
    }
}

const DIET: &[&str] = &["Vegetarian", "Non-vegetarian"];
const BUDGET: &[&str] = &["Ultra-tight ($2/day)", "Budget ($3-5/day)", "Comfortable ($5+/day)"];
const EQUIPMENT: &[&str] = &["Microwave only", "Single burner", "Basic kitchen", "Full kitchen"];
const ALLERGIES: &[&str] = &["No allergies", "Gluten-free", "Nut allergy", "Dairy-free"];
const SKILL: &[&str] = &["Beginner", "Comfortable", "Advanced"];
const BATCH: &[&str] = &["Yes, batch cooking!", "No, fresh daily"];
const STORAGE: &[&str] = &["Tiny fridge", "Shared fridge", "Normal fridge"];

/// Suggestions given how many user turns happened and the text of the last message.
pub fn quick_replies(user_turns: usize, last_message: &str) -> Vec<QuickReply> {
    let step = match user_turns {
        0 => DIET,
        1 => BUDGET,
        2 => EQUIPMENT,
        3 => ALLERGIES,
        4 => SKILL,
        5 => BATCH,
        6 => STORAGE,
        _ => {
            let last = last_message.to_lowercase();
            if last.contains("meal plan") || last.contains("recipe") {
                return post_plan_menu();
            }
            return Vec::new();
        }
    };
    step.iter().map(|text| QuickReply::Send(*text)).collect()
}

fn post_plan_menu() -> Vec<QuickReply> {
    vec![
        QuickReply::Send("Love it!"),
        QuickReply::Show("Transform leftovers", Panel::LeftoverTips),
        QuickReply::Send("Shopping list"),
        QuickReply::Show("Storage tips", Panel::StorageTips),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    Caution,
    Unsafe,
}

#[derive(Debug, Clone, Copy)]
pub struct StorageTip {
    pub food: &'static str,
    pub container: &'static str,
    pub duration: &'static str,
    pub safety: Safety,
}

pub const STORAGE_TIPS: &[StorageTip] = &[
    StorageTip { food: "Cooked Rice", container: "Airtight container", duration: "3-4 days", safety: Safety::Safe },
    StorageTip { food: "Pasta", container: "Glass container", duration: "3-5 days", safety: Safety::Safe },
    StorageTip { food: "Curry/Stew", container: "Sealed container", duration: "3-4 days", safety: Safety::Safe },
    StorageTip { food: "Cooked Vegetables", container: "Breathable container", duration: "2-3 days", safety: Safety::Caution },
    StorageTip { food: "Meat dishes", container: "Airtight container", duration: "2-3 days", safety: Safety::Caution },
];

pub const FRIDGE_TETRIS_TIP: &str =
    "Store heavy items at bottom, use clear containers, and label everything with dates!";

#[derive(Debug, Clone, Copy)]
pub struct LeftoverIdea {
    pub base: &'static str,
    pub transforms: &'static [&'static str],
}

pub const LEFTOVER_TRANSFORMATIONS: &[LeftoverIdea] = &[
    LeftoverIdea { base: "Rice", transforms: &["Fried Rice", "Rice Pudding", "Stuffed Peppers"] },
    LeftoverIdea { base: "Pasta", transforms: &["Pasta Salad", "Baked Pasta", "Soup Base"] },
    LeftoverIdea { base: "Curry", transforms: &["Wraps", "Pizza Topping", "Sandwich Filling"] },
    LeftoverIdea { base: "Vegetables", transforms: &["Smoothie", "Omelet Filling", "Soup"] },
];

pub const RESCUE_RECIPE_TIP: &str =
    "Got ingredients about to expire? Mix them into a stir-fry, soup, or omelet!";

/// Plain-text rendering of a panel for the terminal.
pub fn render_panel(panel: Panel) -> String {
    let mut out = String::new();
    match panel {
        Panel::StorageTips => {
            out.push_str("Storage & Safety Guide\n");
            for tip in STORAGE_TIPS {
                let marker = match tip.safety {
                    Safety::Safe => "[ok]",
                    Safety::Caution => "[!!]",
                    Safety::Unsafe => "[xx]",
                };
                out.push_str(&format!(
                    "  {} {} - {} • {}\n",
                    marker, tip.food, tip.container, tip.duration
                ));
            }
            out.push_str(&format!("Pro Tip: Fridge Tetris! {}\n", FRIDGE_TETRIS_TIP));
        }
        Panel::LeftoverTips => {
            out.push_str("Leftover Magic\n");
            for idea in LEFTOVER_TRANSFORMATIONS {
                out.push_str(&format!(
                    "  {} → Transform into: {}\n",
                    idea.base,
                    idea.transforms.join(", ")
                ));
            }
            out.push_str(&format!("Rescue Recipe Alert! {}\n", RESCUE_RECIPE_TIP));
        }
    }
    out
}

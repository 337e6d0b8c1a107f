//! Ready-made task titles offered per category.

use crate::models::Category;

const WORK: &[&str] = &[
    "Plan daily work schedule",
    "Follow project deadlines",
    "Attend team meetings on time",
    "Review and commit code",
    "Keep workspace clean and organized",
    "Update project progress",
    "Balance work and personal life",
    "Reply to important emails",
    "Take short breaks during work",
    "Learn or improve a new skill",
    "Avoid multitasking & focus on one task at a time",
    "Set weekly goals and track progress",
];

const PERSONAL: &[&str] = &[
    "Drink enough water throughout the day",
    "Exercise or go for a walk",
    "Read a few pages of a book",
    "Meditate or practice mindfulness",
    "Spend time with family or friends",
    "Plan tomorrow's routine",
    "Clean and organize your room",
    "Limit screen time and social media",
    "Reflect on your day and journal",
    "Sleep on time and get enough rest",
    "Take care of mental health and relax",
    "Do something creative that makes you happy",
];

const WISHLIST: &[&str] = &[
    "Buy a new smartphone",
    "Get a smartwatch or fitness band",
    "Purchase a new laptop",
    "Buy noise-cancelling headphones",
    "Upgrade your workspace setup",
    "Plan and book a vacation trip",
    "Order new clothes or shoes",
    "Buy a camera or GoPro",
    "Explore a new hobby or activity",
    "Save up for a new bike or car",
    "Buy books or online courses you always wanted",
    "Build a dream PC setup someday",
];

const BIRTHDAYS: &[&str] = &[
    "Wish friends and family on their birthdays",
    "Buy a birthday gift",
    "Send birthday wishes on social media",
    "Call or video chat with the birthday person",
    "Plan a surprise for someone special",
    "Bake or order a birthday cake",
    "Write a personalized birthday message or card",
    "Update birthday reminders and calendar",
    "Capture birthday memories with photos",
    "Organize or attend a birthday celebration",
    "Plan a group contribution or surprise party",
    "Prepare a birthday slideshow or memory reel",
];

const SPECIAL: &[&str] = &[
    "Plan gifts for upcoming festivals or holidays",
    "Decorate home for special occasions",
    "Send greetings or wishes to loved ones",
    "Prepare festive meals or sweets",
    "Buy new clothes for the occasion",
    "Capture photos and memories",
    "Attend or host family gatherings",
    "Donate or help others during festivals",
    "Create a special playlist or vibe for the day",
    "Update calendar with upcoming events and holidays",
    "Plan a special self-care or celebration day",
    "Create DIY decorations or handmade gifts",
];

pub fn templates_for(category: Category) -> &'static [&'static str] {
    match category {
        Category::Work => WORK,
        Category::Personal => PERSONAL,
        Category::Wishlist => WISHLIST,
        Category::Birthdays => BIRTHDAYS,
        Category::Special => SPECIAL,
    }
}

/// Looks up a template by its 1-based position in the category's list.
pub fn template(category: Category, number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|index| templates_for(category).get(index))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_twelve_templates() {
        for category in Category::ALL {
            assert_eq!(templates_for(category).len(), 12, "{category}");
        }
    }

    #[test]
    fn test_template_lookup_is_one_based() {
        assert_eq!(template(Category::Work, 1), Some("Plan daily work schedule"));
        assert_eq!(
            template(Category::Special, 12),
            Some("Create DIY decorations or handmade gifts")
        );
        assert_eq!(template(Category::Work, 0), None);
        assert_eq!(template(Category::Work, 13), None);
    }
}

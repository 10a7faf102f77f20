//! The fixed topic cards offered as conversation starters.

use std::fmt;
use std::str::FromStr;

use legalaid_core::{Category, LegalAidError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Simple => write!(f, "simple"),
            Complexity::Medium => write!(f, "medium"),
            Complexity::Complex => write!(f, "complex"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicCard {
    pub title: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub complexity: Complexity,
}

const fn card(
    title: &'static str,
    description: &'static str,
    category: Category,
    complexity: Complexity,
) -> TopicCard {
    TopicCard {
        title,
        description,
        category,
        complexity,
    }
}

pub const TOPIC_CARDS: [TopicCard; 12] = [
    card(
        "Landlord Dispute",
        "Tenant rights and rental issues",
        Category::Housing,
        Complexity::Medium,
    ),
    card(
        "Security Deposit",
        "Deposit return and deductions",
        Category::Housing,
        Complexity::Simple,
    ),
    card(
        "Rent Increase",
        "Unfair rent hikes and rent control",
        Category::Housing,
        Complexity::Medium,
    ),
    card(
        "Maintenance Issues",
        "Repair requests and habitability",
        Category::Housing,
        Complexity::Complex,
    ),
    card(
        "Wrongful Termination",
        "Unfair dismissal and severance",
        Category::Employment,
        Complexity::Complex,
    ),
    card("Unpaid Wages", "Salary and overtime disputes", Category::Employment, Complexity::Medium),
    card(
        "Discrimination",
        "Workplace discrimination and harassment",
        Category::Employment,
        Complexity::Complex,
    ),
    card(
        "Overtime Pay",
        "Unpaid overtime and work hours",
        Category::Employment,
        Complexity::Medium,
    ),
    card(
        "Defective Product",
        "Product returns and warranties",
        Category::Consumer,
        Complexity::Simple,
    ),
    card("False Advertising", "Misleading product claims", Category::Consumer, Complexity::Medium),
    card("Service Dispute", "Poor service and refunds", Category::Consumer, Complexity::Medium),
    card(
        "Contract Cancellation",
        "Breaking service contracts",
        Category::Consumer,
        Complexity::Simple,
    ),
];

/// Which cards to show: everything, or one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn admits(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "All"),
            CategoryFilter::Only(c) => write!(f, "{c}"),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = LegalAidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

/// Cards admitted by `filter`, in display order.
pub fn topic_cards(filter: CategoryFilter) -> impl Iterator<Item = &'static TopicCard> {
    TOPIC_CARDS
        .iter()
        .filter(move |card| filter.admits(card.category))
}

/// Look up a card by exact title, ignoring ASCII case.
pub fn find_card(title: &str) -> Option<&'static TopicCard> {
    let title = title.trim();
    TOPIC_CARDS
        .iter()
        .find(|card| card.title.eq_ignore_ascii_case(title))
}

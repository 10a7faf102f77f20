//! Keyword routing of free text and topic-card titles to a [`Category`].
//!
//! Both classifiers evaluate an ordered list of `(Category, keywords)` rules:
//! the first rule with a matching keyword wins, and text matching no rule
//! falls back to the default category. Free text and card titles keep
//! separate tables, since titles are curated and free text is not.

use legalaid_core::Category;

/// One routing rule: any keyword hit routes to `category`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn matches(&self, haystack: &str) -> bool {
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }
}

/// Ordered rules plus the category used when none match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<KeywordRule>,
    default: Category,
}

impl RuleTable {
    pub fn new(rules: Vec<KeywordRule>, default: Category) -> Self {
        Self { rules, default }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn default_category(&self) -> Category {
        self.default
    }

    fn resolve(&self, haystack: &str) -> Category {
        self.rules
            .iter()
            .find(|rule| rule.matches(haystack))
            .map(|rule| rule.category)
            .unwrap_or(self.default)
    }
}

// =============================================================================
// Free-text classification
// =============================================================================

const HOUSING_TERMS: &[&str] = &[
    "landlord",
    "rent",
    "tenant",
    "deposit",
    "maintenance",
    "eviction",
];

const EMPLOYMENT_TERMS: &[&str] = &[
    "employer",
    "work",
    "job",
    "fired",
    "termination",
    "salary",
    "wages",
    "discrimination",
];

const CONSUMER_TERMS: &[&str] = &[
    "product",
    "purchase",
    "refund",
    "warranty",
    "advertising",
    "service",
];

/// Routes a user's free-text question to a category.
///
/// Matching is case-insensitive substring search, so "Rental" hits "rent".
/// Priority is Housing, then Employment, then Consumer; anything else
/// (family law, injury, ...) is sent as Consumer and left to the backend.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    table: RuleTable,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryClassifier {
    pub fn new() -> Self {
        Self::with_table(RuleTable::new(
            vec![
                KeywordRule::new(Category::Housing, HOUSING_TERMS),
                KeywordRule::new(Category::Employment, EMPLOYMENT_TERMS),
                KeywordRule::new(Category::Consumer, CONSUMER_TERMS),
            ],
            Category::Consumer,
        ))
    }

    /// Use a custom table. Keywords are lowercased so matching stays
    /// case-insensitive.
    pub fn with_table(table: RuleTable) -> Self {
        let rules = table
            .rules
            .into_iter()
            .map(|rule| KeywordRule {
                category: rule.category,
                keywords: rule.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self {
            table: RuleTable::new(rules, table.default),
        }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn classify(&self, text: &str) -> Category {
        let category = self.table.resolve(&text.to_lowercase());
        tracing::debug!(category = %category, "Classified query");
        category
    }
}

// =============================================================================
// Topic-card title mapping
// =============================================================================

const HOUSING_TITLES: &[&str] = &["Landlord", "Security", "Rent", "Maintenance"];
const EMPLOYMENT_TITLES: &[&str] = &["Wrongful", "Unpaid", "Discrimination", "Overtime"];
const CONSUMER_TITLES: &[&str] = &["Defective", "False", "Service", "Contract"];

/// Maps a topic-card title to the category its scenarios are fetched for.
///
/// Matching is case-sensitive against the curated title words.
#[derive(Debug, Clone)]
pub struct ScenarioCategoryMapper {
    table: RuleTable,
}

impl Default for ScenarioCategoryMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioCategoryMapper {
    pub fn new() -> Self {
        Self {
            table: RuleTable::new(
                vec![
                    KeywordRule::new(Category::Housing, HOUSING_TITLES),
                    KeywordRule::new(Category::Employment, EMPLOYMENT_TITLES),
                    KeywordRule::new(Category::Consumer, CONSUMER_TITLES),
                ],
                Category::Consumer,
            ),
        }
    }

    pub fn with_table(table: RuleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn map_title(&self, title: &str) -> Category {
        self.table.resolve(title)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TOPIC_CARDS;

    fn classify(text: &str) -> Category {
        CategoryClassifier::new().classify(text)
    }

    // ---- Single-category keywords ----

    #[test]
    fn test_housing_keywords() {
        for text in [
            "My landlord is ignoring me",
            "Can they raise the rent?",
            "tenant rights",
            "deposit deductions",
            "maintenance never happens",
            "I got an eviction notice",
        ] {
            assert_eq!(classify(text), Category::Housing, "{text}");
        }
    }

    #[test]
    fn test_employment_keywords() {
        for text in [
            "my employer cut my hours",
            "I can't find a job",
            "I was fired",
            "termination letter",
            "salary was late",
            "unpaid wages",
            "discrimination at the office",
        ] {
            assert_eq!(classify(text), Category::Employment, "{text}");
        }
    }

    #[test]
    fn test_consumer_keywords() {
        for text in [
            "the product broke",
            "a purchase I regret",
            "they refuse a refund",
            "warranty claim",
            "misleading advertising",
            "terrible service",
        ] {
            assert_eq!(classify(text), Category::Consumer, "{text}");
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("LANDLORD"), Category::Housing);
        assert_eq!(classify("Fired On Monday"), Category::Employment);
    }

    #[test]
    fn test_substring_matching() {
        // "Rental" contains "rent".
        assert_eq!(classify("Rental agreement question"), Category::Housing);
        // "homework" contains "work".
        assert_eq!(classify("homework help"), Category::Employment);
    }

    // ---- Priority and default ----

    #[test]
    fn test_housing_beats_employment() {
        assert_eq!(
            classify("My employer is also my landlord"),
            Category::Housing
        );
    }

    #[test]
    fn test_employment_beats_consumer() {
        assert_eq!(classify("I was fired over a refund"), Category::Employment);
    }

    #[test]
    fn test_unmatched_defaults_to_consumer() {
        assert_eq!(classify("I need help with a divorce"), Category::Consumer);
        assert_eq!(classify(""), Category::Consumer);
    }

    #[test]
    fn test_end_to_end_examples() {
        assert_eq!(
            classify("My landlord won't return my deposit"),
            Category::Housing
        );
        assert_eq!(classify("I was fired without notice"), Category::Employment);
        assert_eq!(
            classify("The product I bought is broken"),
            Category::Consumer
        );
    }

    #[test]
    fn test_custom_table_is_lowercased() {
        let classifier = CategoryClassifier::with_table(RuleTable::new(
            vec![KeywordRule::new(Category::Employment, &["Payslip"])],
            Category::Housing,
        ));
        assert_eq!(classifier.classify("my PAYSLIP is wrong"), Category::Employment);
        assert_eq!(classifier.classify("anything else"), Category::Housing);
        assert_eq!(classifier.table().rules()[0].keywords, vec!["payslip"]);
    }

    // ---- Title mapping ----

    #[test]
    fn test_map_title_known_cards() {
        let mapper = ScenarioCategoryMapper::new();
        assert_eq!(mapper.map_title("Landlord Dispute"), Category::Housing);
        assert_eq!(mapper.map_title("Security Deposit"), Category::Housing);
        assert_eq!(mapper.map_title("Overtime Pay"), Category::Employment);
        assert_eq!(mapper.map_title("Contract Cancellation"), Category::Consumer);
    }

    #[test]
    fn test_map_title_agrees_with_catalog() {
        let mapper = ScenarioCategoryMapper::new();
        for card in TOPIC_CARDS.iter() {
            assert_eq!(mapper.map_title(card.title), card.category, "{}", card.title);
        }
    }

    #[test]
    fn test_map_title_case_sensitive_and_default() {
        let mapper = ScenarioCategoryMapper::new();
        assert_eq!(mapper.map_title("landlord dispute"), Category::Consumer);
        assert_eq!(mapper.map_title("Something Else"), Category::Consumer);
        assert_eq!(mapper.table().default_category(), Category::Consumer);
    }

    #[test]
    fn test_tables_diverge() {
        // "Unpaid" is a title word but not a free-text keyword.
        assert_eq!(classify("Unpaid"), Category::Consumer);
        assert_eq!(
            ScenarioCategoryMapper::new().map_title("Unpaid"),
            Category::Employment
        );
    }
}

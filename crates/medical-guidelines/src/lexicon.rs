/// Static vocabulary of medical conditions used to interpret free-text queries.
///
/// Entries are probed phrase-first: a condition whose name has more words is
/// always tried before a shorter one, so "hip fracture" is never masked by a
/// generic single-word match. Within a tier the built-in order is kept.
use crate::model::CanonicalCondition;

/// Bare condition names tried when no lexicon entry matches.
const FALLBACK_KEYWORDS: &[&str] = &[
    "diabetes",
    "hypertension",
    "fracture",
    "pneumonia",
    "asthma",
    "copd",
    "stroke",
    "heart",
    "cancer",
    "depression",
    "anxiety",
    "obesity",
    "arthritis",
    "osteoporosis",
    "dementia",
    "epilepsy",
];

const CONDITIONS: &[(&str, &[&str])] = &[
    (
        "hip fracture",
        &["hip fracture", "fractured hip", "hip break", "fracture of hip"],
    ),
    (
        "femur fracture",
        &["femur fracture", "thigh fracture", "femoral fracture"],
    ),
    ("ankle fracture", &["ankle fracture", "broken ankle"]),
    ("wrist fracture", &["wrist fracture", "broken wrist"]),
    (
        "diabetes",
        &[
            "diabetes",
            "diabetic",
            "type 1 diabetes",
            "type 2 diabetes",
            "diabetes mellitus",
        ],
    ),
    (
        "hypertension",
        &[
            "hypertension",
            "high blood pressure",
            "htn",
            "hypertensive",
            "blood pressure management",
        ],
    ),
    ("pneumonia", &["pneumonia", "lung infection", "pneumonic"]),
    ("asthma", &["asthma", "asthmatic", "bronchial asthma"]),
    (
        "copd",
        &["copd", "chronic obstructive pulmonary disease", "emphysema"],
    ),
    (
        "stroke",
        &["stroke", "cerebrovascular accident", "cva", "brain attack"],
    ),
    (
        "heart failure",
        &[
            "heart failure",
            "cardiac failure",
            "chf",
            "congestive heart failure",
        ],
    ),
    (
        "depression",
        &[
            "depression",
            "major depressive disorder",
            "mdd",
            "clinical depression",
        ],
    ),
    (
        "anxiety",
        &[
            "anxiety",
            "anxiety disorder",
            "generalized anxiety",
            "panic disorder",
        ],
    ),
    (
        "obesity",
        &["obesity", "overweight", "bmi", "morbid obesity"],
    ),
    (
        "arthritis",
        &[
            "arthritis",
            "rheumatoid arthritis",
            "osteoarthritis",
            "joint inflammation",
        ],
    ),
    (
        "osteoporosis",
        &["osteoporosis", "bone loss", "fragile bones", "bone thinning"],
    ),
    ("dementia", &["dementia", "alzheimer", "cognitive decline"]),
    (
        "epilepsy",
        &["epilepsy", "seizure disorder", "epileptic"],
    ),
    ("cancer", &["cancer", "malignancy", "tumor", "neoplasm"]),
];

#[derive(Debug, Clone)]
pub struct Lexicon {
    conditions: Vec<CanonicalCondition>,
    keywords: Vec<String>,
}

impl Lexicon {
    /// Build a lexicon, ordering conditions so multi-word names are probed first.
    pub fn new(mut conditions: Vec<CanonicalCondition>, keywords: Vec<String>) -> Self {
        // Stable: keeps declaration order within each word-count tier.
        conditions.sort_by_key(|c| std::cmp::Reverse(c.word_count()));
        let keywords = keywords.into_iter().map(|k| k.to_lowercase()).collect();
        Self {
            conditions,
            keywords,
        }
    }

    /// The built-in clinical vocabulary.
    pub fn builtin() -> Self {
        let conditions = CONDITIONS
            .iter()
            .map(|(name, variants)| CanonicalCondition::new(name, variants))
            .collect();
        let keywords = FALLBACK_KEYWORDS.iter().map(|k| k.to_string()).collect();
        Self::new(conditions, keywords)
    }

    /// First canonical condition with a variant contained in `text`.
    ///
    /// `text` must already be lower-cased.
    pub fn find_condition(&self, text: &str) -> Option<&str> {
        self.conditions
            .iter()
            .find(|c| c.matches(text))
            .map(|c| c.name.as_str())
    }

    /// First fallback keyword contained in `text`.
    pub fn find_keyword(&self, text: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| text.contains(k.as_str()))
            .map(|k| k.as_str())
    }

    pub fn conditions(&self) -> &[CanonicalCondition] {
        &self.conditions
    }
}

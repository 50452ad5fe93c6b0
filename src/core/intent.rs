//! Deterministic intent extraction — free text to an `Intent` record.
//!
//! This path is infallible by construction: every lookup has a
//! default, nothing allocates unboundedly, and no input can make it
//! panic. The optional remote classifier (see `core::remote`) may
//! pre-empt it, but always falls back here.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::schema::capability::Category;
use crate::schema::intent::{Constraints, Difficulty, Intent, Pace};

/// Ordered keyword table: first match wins. Keywords are matched as
/// whole words against the tokenized prompt.
const CATEGORY_TABLE: &[(&[&str], Category, &str)] = &[
    (
        &["golf", "putt", "putting", "minigolf", "billiards", "pool"],
        Category::Golf,
        "mini_golf",
    ),
    (
        &["platformer", "platform"],
        Category::Platformer,
        "runner",
    ),
    (
        &["runner", "run", "running", "race", "parkour", "dash"],
        Category::Runner,
        "runner",
    ),
    (
        &["shooter", "shoot", "blast", "invaders", "asteroids", "cannon"],
        Category::Shooter,
        "shooter",
    ),
    (
        &["dodge", "dodging", "avoid", "survive", "survival", "arena"],
        Category::Dodge,
        "dodge_arena",
    ),
    (
        &["place", "placement", "build", "garden", "farm", "decorate"],
        Category::Placement,
        "placement",
    ),
];

/// Fixed theme vocabulary in stable output order. A prompt mentioning
/// any keyword of an entry gets that entry's tag, capped at five.
const THEME_TABLE: &[(&str, &[&str])] = &[
    ("space", &["space", "galaxy", "cosmic", "planet", "asteroid"]),
    ("neon", &["neon", "glow", "glowing", "synthwave", "cyber"]),
    ("forest", &["forest", "woods", "woodland", "jungle", "grove"]),
    ("spooky", &["spooky", "ghost", "haunted", "halloween", "creepy"]),
    ("ocean", &["ocean", "sea", "underwater", "reef", "wave"]),
    ("ice", &["ice", "icy", "snow", "frozen", "winter"]),
    ("lava", &["lava", "volcano", "magma", "molten"]),
    ("desert", &["desert", "sand", "dune", "cactus"]),
    ("candy", &["candy", "sweet", "sugar", "gumdrop"]),
    ("retro", &["retro", "pixel", "arcade", "vintage"]),
];

const SPELLED_NUMBERS: &[(&str, u32)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
];

/// Words that start an exclusion phrase.
const NEGATION_MARKERS: &[&str] = &["without", "no", "exclude", "excluding", "avoid"];

const ARTICLES: &[&str] = &["a", "an", "the", "any", "some"];

const MAX_THEME_TAGS: usize = 5;

/// Extract an `Intent` from free text. Never fails.
pub fn extract_intent(prompt: &str) -> Intent {
    let lower = prompt.to_lowercase();
    let words = tokenize(&lower);

    let (category, template_id) = match_category(&words);
    let theme_tags = match_themes(&words);
    let counts = extract_counts(&words);
    let constraints = extract_constraints(&words, &counts);
    let difficulty = match_difficulty(&words);
    let pace = match_pace(&words);

    log::debug!(
        "intent: template={} category={:?} themes={:?} excludes={:?}",
        template_id,
        category,
        theme_tags,
        constraints.exclude
    );

    Intent {
        template_id: template_id.to_string(),
        category,
        theme_tags,
        counts,
        difficulty,
        pace,
        constraints,
    }
}

/// Split into lower-case word tokens. A token keeps a trailing
/// sentence-ender marker by recording it separately.
#[derive(Debug, Clone, PartialEq)]
struct Token {
    word: String,
    ends_sentence: bool,
    /// Raw token ended with a comma (splits exclusion lists).
    ends_item: bool,
}

fn tokenize(lower: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for raw in lower.split_whitespace() {
        let ends_sentence = raw.ends_with(['.', '!', '?', ';']);
        let ends_item = raw.ends_with(',');
        let word: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '\'' || *c == '-')
            .collect();
        if !word.is_empty() {
            tokens.push(Token {
                word,
                ends_sentence,
                ends_item,
            });
        }
    }
    tokens
}

fn has_word(words: &[Token], needle: &str) -> bool {
    words.iter().any(|t| t.word == needle)
}

fn match_category(words: &[Token]) -> (Category, &'static str) {
    for (keywords, category, template_id) in CATEGORY_TABLE {
        if keywords.iter().any(|k| has_word(words, k)) {
            return (*category, template_id);
        }
    }
    (Category::Arcade, "arcade")
}

fn match_themes(words: &[Token]) -> Vec<String> {
    let mut tags = Vec::new();
    for (tag, keywords) in THEME_TABLE {
        if tags.len() >= MAX_THEME_TAGS {
            break;
        }
        if keywords.iter().any(|k| has_word(words, k)) {
            tags.push(tag.to_string());
        }
    }
    tags
}

fn parse_count(word: &str) -> Option<u32> {
    if let Ok(n) = word.parse::<u32>() {
        return Some(n);
    }
    SPELLED_NUMBERS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, n)| *n)
}

/// "<number-or-word> <noun>" pairs: "5 bumpers", "three ghosts".
fn extract_counts(words: &[Token]) -> FxHashMap<String, u32> {
    let mut counts = FxHashMap::default();
    for pair in words.windows(2) {
        let Some(n) = parse_count(&pair[0].word) else {
            continue;
        };
        if pair[0].ends_sentence {
            continue;
        }
        let noun = singularize(&pair[1].word);
        if noun.len() >= 3 && parse_count(&noun).is_none() {
            counts.insert(noun, n);
        }
    }
    counts
}

/// Strip a plural 's' (but not "ss") from a normalized noun.
pub(crate) fn singularize(word: &str) -> String {
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

pub(crate) fn pluralize(word: &str) -> String {
    if word.ends_with('s') {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// Negation phrases: "without X", "no X", "avoid X and Y", also the
/// two-word "don't add X" / "don't include X" forms. Each captured
/// phrase runs to the sentence end and is split on comma/"and"/"or";
/// every term is inserted in both singular and plural form.
fn extract_constraints(words: &[Token], counts: &FxHashMap<String, u32>) -> Constraints {
    let mut constraints = Constraints::default();

    let mut i = 0;
    while i < words.len() {
        let w = &words[i].word;
        let is_marker = NEGATION_MARKERS.contains(&w.as_str())
            || ((w == "don't" || w == "dont")
                && words
                    .get(i + 1)
                    .is_some_and(|t| t.word == "add" || t.word == "include" || t.word == "put"));
        if !is_marker {
            i += 1;
            continue;
        }
        // Skip the verb of the two-word form.
        if w == "don't" || w == "dont" {
            i += 1;
        }

        let mut j = i + 1;
        let mut current = Vec::new();
        let mut terms: Vec<String> = Vec::new();
        while j < words.len() {
            let t = &words[j];
            if NEGATION_MARKERS.contains(&t.word.as_str()) || t.word == "don't" || t.word == "dont"
            {
                break;
            }
            if t.word == "and" || t.word == "or" {
                flush_term(&mut current, &mut terms);
            } else if !ARTICLES.contains(&t.word.as_str()) {
                current.push(t.word.clone());
            }
            let stop = t.ends_sentence;
            if t.ends_item {
                flush_term(&mut current, &mut terms);
            }
            j += 1;
            if stop {
                break;
            }
        }
        flush_term(&mut current, &mut terms);

        for term in terms {
            constraints.exclude.insert(pluralize(&term));
            constraints.exclude.insert(singularize(&term));
            constraints.exclude.insert(term);
        }
        i = j;
    }

    // Counted nouns are affirmative requests.
    let exclude = constraints.exclude.clone();
    constraints.include = counts
        .keys()
        .filter(|k| !exclude.contains(*k))
        .cloned()
        .collect::<FxHashSet<_>>();

    constraints
}

fn flush_term(current: &mut Vec<String>, terms: &mut Vec<String>) {
    if !current.is_empty() {
        terms.push(current.join(" "));
        current.clear();
    }
}

fn match_difficulty(words: &[Token]) -> Difficulty {
    const HARD: &[&str] = &["hard", "difficult", "brutal", "challenging", "punishing"];
    const EASY: &[&str] = &["easy", "casual", "chill", "relaxing", "gentle"];
    if HARD.iter().any(|k| has_word(words, k)) {
        Difficulty::Hard
    } else if EASY.iter().any(|k| has_word(words, k)) {
        Difficulty::Easy
    } else {
        Difficulty::Medium
    }
}

fn match_pace(words: &[Token]) -> Pace {
    const FAST: &[&str] = &["fast", "frantic", "hectic", "speedy", "quick"];
    const SLOW: &[&str] = &["slow", "calm", "leisurely", "sluggish"];
    if FAST.iter().any(|k| has_word(words, k)) {
        Pace::Fast
    } else if SLOW.iter().any(|k| has_word(words, k)) {
        Pace::Slow
    } else {
        Pace::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_first_match_wins() {
        let intent = extract_intent("a golf game where you also shoot things");
        assert_eq!(intent.category, Category::Golf);
        assert_eq!(intent.template_id, "mini_golf");
    }

    #[test]
    fn category_defaults_to_arcade() {
        let intent = extract_intent("something fun with sparkles");
        assert_eq!(intent.category, Category::Arcade);
        assert_eq!(intent.template_id, "arcade");
    }

    #[test]
    fn keyword_needs_word_boundary() {
        // "neon" must not trip the "no" negation marker.
        let intent = extract_intent("Mini golf in space with neon vibes");
        assert!(intent.constraints.exclude.is_empty());
        assert_eq!(intent.theme_tags, vec!["space", "neon"]);
    }

    #[test]
    fn theme_tags_stable_order_and_capped() {
        let intent =
            extract_intent("spooky neon space forest ocean ice lava candy retro desert run");
        assert_eq!(intent.theme_tags.len(), 5);
        // Vocabulary order, not prompt order.
        assert_eq!(
            intent.theme_tags,
            vec!["space", "neon", "forest", "spooky", "ocean"]
        );
    }

    #[test]
    fn counts_digits_and_spelled() {
        let intent = extract_intent("an arena with 5 bumpers and three ghosts");
        assert_eq!(intent.counts.get("bumper"), Some(&5));
        assert_eq!(intent.counts.get("ghost"), Some(&3));
    }

    #[test]
    fn counts_skip_number_number_pairs() {
        let intent = extract_intent("counting 4 5");
        assert!(intent.counts.is_empty());
    }

    #[test]
    fn exclusion_without() {
        let intent = extract_intent("Forest runner without trees");
        assert!(intent.constraints.exclude.contains("tree"));
        assert!(intent.constraints.exclude.contains("trees"));
    }

    #[test]
    fn exclusion_list_split_on_and_or_comma() {
        let intent = extract_intent("dodge arena, no ghosts, lava or spikes");
        assert!(intent.constraints.exclude.contains("ghost"));
        assert!(intent.constraints.exclude.contains("lava"));
        assert!(intent.constraints.exclude.contains("spike"));
        assert!(intent.constraints.exclude.contains("spikes"));
    }

    #[test]
    fn exclusion_dont_add() {
        let intent = extract_intent("a garden game but don't add weeds");
        assert!(intent.constraints.exclude.contains("weed"));
    }

    #[test]
    fn exclusion_strips_articles() {
        let intent = extract_intent("runner without the trees");
        assert!(intent.constraints.exclude.contains("tree"));
        assert!(!intent.constraints.exclude.contains("the trees"));
    }

    #[test]
    fn difficulty_and_pace() {
        let intent = extract_intent("a brutal and frantic dodge arena");
        assert_eq!(intent.difficulty, Difficulty::Hard);
        assert_eq!(intent.pace, Pace::Fast);

        let intent = extract_intent("a chill slow garden");
        assert_eq!(intent.difficulty, Difficulty::Easy);
        assert_eq!(intent.pace, Pace::Slow);
    }

    #[test]
    fn extraction_is_deterministic() {
        let a = extract_intent("spooky dodge arena with 3 ghosts, no lava");
        let b = extract_intent("spooky dodge arena with 3 ghosts, no lava");
        assert_eq!(a.template_id, b.template_id);
        assert_eq!(a.theme_tags, b.theme_tags);
        assert_eq!(a.counts, b.counts);
        assert_eq!(a.constraints.exclude, b.constraints.exclude);
    }

    #[test]
    fn garbage_input_never_panics() {
        for prompt in ["", "   ", "!!!", "🦀🦀🦀", "no", "without", "3"] {
            let intent = extract_intent(prompt);
            assert!(!intent.template_id.is_empty());
        }
    }
}

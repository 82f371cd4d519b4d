//! Per-line classification for shop listings.
//!
//! A line is tested against an ordered list of predicates and the first match
//! decides its [`LineKind`]. The order is part of the contract:
//!
//! 1. blank
//! 2. skip pattern (page headers/footers)
//! 3. city/state/zip terminator
//! 4. email
//! 5. phone
//! 6. website
//! 7. city header
//! 8. anything else is text

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::error::{DirectoryError, Result};

static ANCHORED_PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}(?:\s*(?:x|ext\.?)\s*\d{1,6})?\b").unwrap()
});
static STRICT_EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Skipped,
    Terminator,
    Email,
    Phone,
    Website,
    CityHeader,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    pub kind: LineKind,
    pub text: String,
}

impl ClassifiedLine {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneStyle {
    /// Separators stripped, then 10 or 11 digits and nothing else.
    Loose,
    /// 3-3-4 grouping anchored at the start of the line, optional extension.
    Anchored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailStyle {
    /// Contains both `@` and `.`.
    Loose,
    /// `local@domain.tld` at the start of the line.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CityHeaderStrategy {
    /// Only entries of the known-city list are headers.
    KnownCities,
    /// Short title-case lines that are not on the non-city list.
    ShortTitleCase,
    /// Known cities first; unknown lines fall back to the title-case heuristic.
    KnownCitiesThenHeuristic,
}

pub fn is_loose_phone(line: &str) -> bool {
    let cleaned: String = line
        .chars()
        .filter(|c| !matches!(c, '-' | '(' | ')' | ' ' | '.' | '+'))
        .collect();

    (10..=11).contains(&cleaned.len()) && cleaned.chars().all(|c| c.is_ascii_digit())
}

pub fn is_anchored_phone(line: &str) -> bool {
    ANCHORED_PHONE_RE.is_match(line)
}

pub fn is_loose_email(line: &str) -> bool {
    line.contains('@') && line.contains('.')
}

pub fn is_strict_email(line: &str) -> bool {
    STRICT_EMAIL_RE.is_match(line)
}

pub fn is_website(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.starts_with("www.") || lower.starts_with("http://") || lower.starts_with("https://")
}

pub fn is_short_title_case(line: &str) -> bool {
    let word_count = line.split_whitespace().count();
    let lower = line.to_lowercase();

    (1..=3).contains(&word_count)
        && !line.contains(',')
        && !line.chars().any(|c| c.is_ascii_digit())
        && !lower.contains("suite")
        && !lower.contains("shopping")
        && line.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn normalize_city_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone)]
pub struct LineClassifier {
    phone_style: PhoneStyle,
    email_style: EmailStyle,
    detect_websites: bool,
    terminator: Option<Regex>,
    city_headers: Option<CityHeaderStrategy>,
    // lowercase key -> canonical spelling, in list order
    known_cities: Vec<(String, String)>,
    non_city_phrases: HashSet<String>,
    skip_lines: HashSet<String>,
}

impl LineClassifier {
    pub fn new(phone_style: PhoneStyle, email_style: EmailStyle) -> Self {
        Self {
            phone_style,
            email_style,
            detect_websites: false,
            terminator: None,
            city_headers: None,
            known_cities: Vec::new(),
            non_city_phrases: HashSet::new(),
            skip_lines: HashSet::new(),
        }
    }

    /// Classifier for free-form HTML blocks: loose phone and email checks only.
    pub fn html_block() -> Self {
        Self::new(PhoneStyle::Loose, EmailStyle::Loose)
    }

    pub fn with_websites(mut self) -> Self {
        self.detect_websites = true;
        self
    }

    /// Enables the `<text>, ST <zip>` terminator for the given state code.
    pub fn with_terminator_state(mut self, state: &str) -> Result<Self> {
        let pattern = format!(r"^(.+),\s*{}\s+\d{{5,6}}", regex::escape(state));
        let terminator =
            Regex::new(&pattern).map_err(|e| DirectoryError::InvalidConfigValueError {
                field: "state".to_string(),
                value: state.to_string(),
                reason: e.to_string(),
            })?;
        self.terminator = Some(terminator);
        Ok(self)
    }

    pub fn with_city_headers<I, S>(mut self, strategy: CityHeaderStrategy, known_cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.city_headers = Some(strategy);
        self.known_cities = known_cities
            .into_iter()
            .map(|city| {
                let city = city.as_ref().trim();
                (normalize_city_key(city), city.to_string())
            })
            .filter(|(key, _)| !key.is_empty())
            .collect();
        self
    }

    pub fn with_non_city_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_city_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_skip_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_lines = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_phone(&self, line: &str) -> bool {
        match self.phone_style {
            PhoneStyle::Loose => is_loose_phone(line),
            PhoneStyle::Anchored => is_anchored_phone(line),
        }
    }

    pub fn is_email(&self, line: &str) -> bool {
        match self.email_style {
            EmailStyle::Loose => is_loose_email(line),
            EmailStyle::Strict => is_strict_email(line),
        }
    }

    pub fn is_terminator(&self, line: &str) -> bool {
        self.terminator.as_ref().is_some_and(|re| re.is_match(line))
    }

    /// Canonical spelling of `text` if it is on the known-city list.
    pub fn lookup_known_city(&self, text: &str) -> Option<&str> {
        let key = normalize_city_key(text);
        self.known_cities
            .iter()
            .find(|(known, _)| *known == key)
            .map(|(_, canonical)| canonical.as_str())
    }

    fn uses_known_cities(&self) -> bool {
        matches!(
            self.city_headers,
            Some(CityHeaderStrategy::KnownCities | CityHeaderStrategy::KnownCitiesThenHeuristic)
        )
    }

    fn is_heuristic_city(&self, line: &str) -> bool {
        is_short_title_case(line) && !self.non_city_phrases.contains(line)
    }

    /// Returns the header text to record as the current city, if `line` is one.
    pub fn city_header(&self, line: &str) -> Option<String> {
        match self.city_headers? {
            CityHeaderStrategy::KnownCities => self.lookup_known_city(line).map(str::to_string),
            CityHeaderStrategy::ShortTitleCase => {
                self.is_heuristic_city(line).then(|| line.to_string())
            }
            CityHeaderStrategy::KnownCitiesThenHeuristic => self
                .lookup_known_city(line)
                .map(str::to_string)
                .or_else(|| self.is_heuristic_city(line).then(|| line.to_string())),
        }
    }

    pub fn classify(&self, raw: &str) -> ClassifiedLine {
        let line = raw.trim();

        if line.is_empty() {
            return ClassifiedLine::new(LineKind::Blank, "");
        }
        if self.skip_lines.contains(line) {
            return ClassifiedLine::new(LineKind::Skipped, line);
        }
        if self.is_terminator(line) {
            return ClassifiedLine::new(LineKind::Terminator, line);
        }
        if self.is_email(line) {
            return ClassifiedLine::new(LineKind::Email, line);
        }
        if self.is_phone(line) {
            return ClassifiedLine::new(LineKind::Phone, line);
        }
        if self.detect_websites && is_website(line) {
            return ClassifiedLine::new(LineKind::Website, line);
        }
        if let Some(city) = self.city_header(line) {
            return ClassifiedLine::new(LineKind::CityHeader, city);
        }
        ClassifiedLine::new(LineKind::Text, line)
    }

    /// Classifies every line of `text` in order.
    ///
    /// With a known-city list, two adjacent lines that together spell a known
    /// city ("Virginia" / "Beach") become one header; the two-line match is
    /// tried before the single line.
    pub fn classify_lines(&self, text: &str) -> Vec<ClassifiedLine> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let mut classified = Vec::with_capacity(lines.len());
        let mut i = 0;

        while i < lines.len() {
            if let Some(city) = self.known_city_pair(&lines, i) {
                classified.push(ClassifiedLine::new(LineKind::CityHeader, city));
                i += 2;
                continue;
            }
            classified.push(self.classify(lines[i]));
            i += 1;
        }

        classified
    }

    fn known_city_pair(&self, lines: &[&str], i: usize) -> Option<String> {
        if !self.uses_known_cities() {
            return None;
        }
        let first = lines.get(i).filter(|l| !l.is_empty())?;
        let second = lines.get(i + 1).filter(|l| !l.is_empty())?;
        self.lookup_known_city(&format!("{} {}", first, second))
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_classifier() -> LineClassifier {
        LineClassifier::new(PhoneStyle::Anchored, EmailStyle::Strict)
            .with_websites()
            .with_terminator_state("VA")
            .unwrap()
            .with_city_headers(CityHeaderStrategy::ShortTitleCase, Vec::<String>::new())
            .with_non_city_phrases(["Hours", "Events", "Owner"])
            .with_skip_lines(["Quilt Shops", "2025-V1.0"])
    }

    #[test]
    fn test_loose_phone() {
        let cases = [
            ("714-995-3178", true),
            ("(714) 995-3178", true),
            ("714.995.3178", true),
            ("7149953178", true),
            ("+1 714-995-3178", true),
            ("3430 W Ball Rd, Anaheim, CA 92804", false),
            ("1189 N Euclid St, Anaheim, CA 92801", false),
            ("123-4567", false),
            ("714-ABC-3178", false),
            ("Call 714-995-3178", false),
            ("", false),
            ("123", false),
        ];

        for (input, expected) in cases {
            assert_eq!(is_loose_phone(input), expected, "is_loose_phone({:?})", input);
        }
    }

    #[test]
    fn test_anchored_phone() {
        assert!(is_anchored_phone("540-555-0134"));
        assert!(is_anchored_phone("(540) 555-0134"));
        assert!(is_anchored_phone("540.555.0134 ext 12"));
        assert!(is_anchored_phone("5405550134"));
        assert!(!is_anchored_phone("Call 540-555-0134"));
        assert!(!is_anchored_phone("540-555-01345"));
        assert!(!is_anchored_phone("123 Main Street"));
    }

    #[test]
    fn test_email_styles() {
        assert!(is_loose_email("info@melssewing.com"));
        assert!(is_loose_email("not really @ an email."));
        assert!(!is_loose_email("no at sign.com"));

        assert!(is_strict_email("info@melssewing.com"));
        assert!(!is_strict_email("not really @ an email."));
        assert!(!is_strict_email("Email: info@melssewing.com"));
    }

    #[test]
    fn test_website() {
        assert!(is_website("www.quiltshop.com"));
        assert!(is_website("HTTPS://quiltshop.com"));
        assert!(is_website("http://quiltshop.com"));
        assert!(!is_website("quiltshop.com"));
    }

    #[test]
    fn test_short_title_case() {
        assert!(is_short_title_case("Roanoke"));
        assert!(is_short_title_case("Virginia Beach"));
        assert!(!is_short_title_case("roanoke"));
        assert!(!is_short_title_case("Suite 200"));
        assert!(!is_short_title_case("Valley View Shopping"));
        assert!(!is_short_title_case("Main St, Roanoke"));
        assert!(!is_short_title_case("Four Words In Here"));
        assert!(!is_short_title_case("Route 11"));
    }

    #[test]
    fn test_classification_order() {
        let classifier = pdf_classifier();

        assert_eq!(classifier.classify("   ").kind, LineKind::Blank);
        assert_eq!(classifier.classify("Quilt Shops").kind, LineKind::Skipped);
        assert_eq!(
            classifier.classify("Roanoke, VA 24011").kind,
            LineKind::Terminator
        );
        assert_eq!(
            classifier.classify("shop@fabrichut.com").kind,
            LineKind::Email
        );
        assert_eq!(classifier.classify("540-555-0134").kind, LineKind::Phone);
        assert_eq!(
            classifier.classify("www.fabrichut.com").kind,
            LineKind::Website
        );
        assert_eq!(classifier.classify("Roanoke").kind, LineKind::CityHeader);
        assert_eq!(classifier.classify("Hours").kind, LineKind::Text);
        assert_eq!(
            classifier.classify("123 Main Street").kind,
            LineKind::Text
        );
    }

    #[test]
    fn test_terminator_uses_configured_state() {
        let classifier = LineClassifier::html_block()
            .with_terminator_state("CA")
            .unwrap();
        assert!(classifier.is_terminator("Anaheim, CA 92801"));
        assert!(!classifier.is_terminator("Roanoke, VA 24011"));
    }

    #[test]
    fn test_terminator_state_is_matched_literally() {
        let classifier = LineClassifier::html_block()
            .with_terminator_state("V.")
            .unwrap();
        assert!(classifier.is_terminator("Roanoke, V. 24011"));
        assert!(!classifier.is_terminator("Roanoke, VA 24011"));
    }

    #[test]
    fn test_known_city_lookup() {
        let classifier = LineClassifier::new(PhoneStyle::Anchored, EmailStyle::Strict)
            .with_city_headers(CityHeaderStrategy::KnownCities, ["Roanoke", "Virginia Beach"]);

        assert_eq!(classifier.city_header("roanoke").as_deref(), Some("Roanoke"));
        assert_eq!(
            classifier.city_header("Virginia  Beach").as_deref(),
            Some("Virginia Beach")
        );
        assert_eq!(classifier.city_header("Fairfax"), None);
    }

    #[test]
    fn test_known_cities_then_heuristic_falls_back() {
        let classifier = LineClassifier::new(PhoneStyle::Anchored, EmailStyle::Strict)
            .with_city_headers(CityHeaderStrategy::KnownCitiesThenHeuristic, ["Roanoke"])
            .with_non_city_phrases(["Hours"]);

        assert_eq!(classifier.city_header("Roanoke").as_deref(), Some("Roanoke"));
        assert_eq!(classifier.city_header("Fairfax").as_deref(), Some("Fairfax"));
        assert_eq!(classifier.city_header("Hours"), None);
    }

    #[test]
    fn test_two_line_city_wins_over_single_line() {
        let classifier = LineClassifier::new(PhoneStyle::Anchored, EmailStyle::Strict)
            .with_city_headers(
                CityHeaderStrategy::KnownCities,
                ["Virginia", "Virginia Beach"],
            );

        let lines = classifier.classify_lines("Virginia\nBeach\nSeaside Stitches");

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            ClassifiedLine::new(LineKind::CityHeader, "Virginia Beach")
        );
        assert_eq!(lines[1].kind, LineKind::Text);
    }

    #[test]
    fn test_html_classifier_ignores_headers_and_websites() {
        let classifier = LineClassifier::html_block();
        assert_eq!(classifier.classify("Anaheim").kind, LineKind::Text);
        assert_eq!(classifier.classify("www.shop.com").kind, LineKind::Text);
        assert_eq!(classifier.classify("info@shop.com").kind, LineKind::Email);
    }
}

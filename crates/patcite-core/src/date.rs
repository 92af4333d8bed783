//! Free-text publication-date normalization.
//!
//! Citation date fields arrive as anything from `24 Okt. 2013` to
//! `25(12):2516-2521 (1997)`. The extractor runs an ordered cascade of
//! patterns and returns the best guess as an 8-digit `DDMMYYYY` string,
//! with `00` for an unknown day or month and `00000000` when no valid
//! year can be found.

use std::collections::HashMap;

use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;

/// Returned when no valid date can be extracted.
pub const DATE_SENTINEL: &str = "00000000";

/// Default lower bound for a plausible publication year.
pub const DEFAULT_MIN_YEAR: i32 = 1900;

/// Month names and abbreviations for English, French, and German.
pub const DEFAULT_MONTH_NAMES: &[(&str, u32)] = &[
    // English
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
    // French
    ("janvier", 1),
    ("février", 2),
    ("mars", 3),
    ("avril", 4),
    ("mai", 5),
    ("juin", 6),
    ("juillet", 7),
    ("août", 8),
    ("septembre", 9),
    ("octobre", 10),
    ("novembre", 11),
    ("décembre", 12),
    ("janv", 1),
    ("févr", 2),
    ("avr", 4),
    ("juil", 7),
    ("sept", 9),
    ("déc", 12),
    // German
    ("januar", 1),
    ("februar", 2),
    ("märz", 3),
    ("juni", 6),
    ("juli", 7),
    ("oktober", 10),
    ("dezember", 12),
    ("mär", 3),
    ("okt", 10),
    ("dez", 12),
];

// Year followed by a long application/publication-number suffix, e.g.
// `2010-0024077`. Misread as a date more often than not.
static REJECT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}[-–]\d{7,}").unwrap());

// `2011.01.086`: year, month, trailing issue number.
static YEAR_MONTH_ISSUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})[.\-](\d{1,2})[.\-]\d{3,}").unwrap());

// Fully numeric triples: `2022.11.08`, `30.01.2018`, `13-1-2025`.
static NUMERIC_TRIPLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,4})[.\-](\d{1,2})[.\-](\d{2,4})\b").unwrap());

// `2024-6`: year-month with a short suffix. Longer suffixes are filing
// numbers, not months, and must not match.
static YEAR_SHORT_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})[-–](\d{1,2})\b").unwrap());

// Fallback scan for any boundary-delimited 4-digit year.
static YEAR_SCAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());

/// A tier either produced date fields or rejected the whole input.
enum TierHit {
    Date {
        day: Option<u32>,
        month: Option<u32>,
        year: i32,
    },
    Reject,
}

/// Ordered-cascade date extractor. Construction compiles the month-name
/// patterns once; `extract` is then a pure function of its input.
#[derive(Debug, Clone)]
pub struct DateExtractor {
    min_year: i32,
    max_year: i32,
    months: HashMap<String, u32>,
    re_day_month_year: Regex,
    re_month_day_year: Regex,
    re_year_month_day_range: Regex,
    re_year_month_day: Regex,
    re_month_range_year: Regex,
    re_year_month_name: Regex,
    re_month_name_year: Regex,
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DateExtractor {
    /// Extractor with the default bounds: 1900 to the current calendar year.
    pub fn new() -> Self {
        Self::with_bounds(DEFAULT_MIN_YEAR, chrono::Utc::now().year())
    }

    /// Extractor accepting years in `min_year..=max_year`.
    pub fn with_bounds(min_year: i32, max_year: i32) -> Self {
        Self::with_month_table(DEFAULT_MONTH_NAMES, min_year, max_year)
    }

    /// Extractor with a custom month-name table, for callers that need to
    /// recognize additional languages or abbreviations.
    pub fn with_month_table(table: &[(&str, u32)], min_year: i32, max_year: i32) -> Self {
        let months: HashMap<String, u32> = table
            .iter()
            .map(|(name, num)| (name.to_string(), *num))
            .collect();

        // Longest names first so full names win over abbreviation prefixes.
        let mut names: Vec<&str> = table.iter().map(|(name, _)| *name).collect();
        names.sort_by_key(|n| std::cmp::Reverse(n.chars().count()));
        names.dedup();
        let m = names.join("|");

        let year = r"((?:19|20)\d{2})";
        let day = r"(\d{1,2})";
        let ordinal = r"(?:st|nd|rd|th)?";

        DateExtractor {
            min_year,
            max_year,
            months,
            // `24 Okt. 2013`, `20. Juni 2001`, `15th of March 2025`, `23-30 April 2014`
            re_day_month_year: Regex::new(&format!(
                r"(?i)\b{day}{ordinal}(?:\s*-\s*\d{{1,2}})?\.?\s*(?:of\s+)?\b({m})\.?,?\s+{year}"
            ))
            .unwrap(),
            // `November 10, 2022`, `January 1st., 2025`, `December 17 to 18, 2022`
            re_month_day_year: Regex::new(&format!(
                r"(?i)\b({m})\.?,?\s+{day}{ordinal}\.?(\s*(?:-|to)\s*\d{{1,2}})?,?\s+{year}"
            ))
            .unwrap(),
            // `2012 Mar 31-Apr 4` — first day of the range
            re_year_month_day_range: Regex::new(&format!(
                r"(?i){year}[\s,;.]*\b({m})\.?\s+{day}\s*[-–]\s*(?:\b(?:{m})\.?\s*)?\d{{1,2}}"
            ))
            .unwrap(),
            // `2012 Dec 21; 1(12)`
            re_year_month_day: Regex::new(&format!(
                r"(?i){year}[\s,;.]*\b({m})\.?\s+{day}\b"
            ))
            .unwrap(),
            // `Mar-Apr 2016` — a range cannot resolve to one month
            re_month_range_year: Regex::new(&format!(
                r"(?i)\b({m})\.?\s*[-–/]\s*\b(?:{m})\.?\s+{year}"
            ))
            .unwrap(),
            // `2015 Mar; 12(3)`, `(2011) Mar`
            re_year_month_name: Regex::new(&format!(r"(?i){year}\)?[\s,;.]+\b({m})\b")).unwrap(),
            // `Mai 2008`, `v.14 MARCH 1996`
            re_month_name_year: Regex::new(&format!(r"(?i)\b({m})\.?,?\s+{year}\b")).unwrap(),
        }
    }

    fn year_in_bounds(&self, year: i32) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }

    fn month_number(&self, name: &str) -> Option<u32> {
        self.months.get(&name.to_lowercase()).copied()
    }

    /// Extract the best-guess date from `text` as `DDMMYYYY`, with `00`
    /// placeholders and the `00000000` sentinel when nothing valid is found.
    pub fn extract(&self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("n/a") {
            return DATE_SENTINEL.to_string();
        }
        if REJECT_RE.is_match(text) {
            return DATE_SENTINEL.to_string();
        }

        let tiers: [fn(&Self, &str) -> Option<TierHit>; 11] = [
            Self::try_day_month_year,
            Self::try_month_day_year,
            Self::try_year_month_day_range,
            Self::try_year_month_day,
            Self::try_month_range_year,
            Self::try_year_month_issue,
            Self::try_year_month_name,
            Self::try_month_name_year,
            Self::try_numeric_triple,
            Self::try_year_short_month,
            Self::try_latest_year,
        ];

        for tier in tiers {
            match tier(self, text) {
                Some(TierHit::Date { day, month, year }) => {
                    return format!("{:02}{:02}{:04}", day.unwrap_or(0), month.unwrap_or(0), year);
                }
                Some(TierHit::Reject) => return DATE_SENTINEL.to_string(),
                None => {}
            }
        }
        DATE_SENTINEL.to_string()
    }

    fn try_day_month_year(&self, text: &str) -> Option<TierHit> {
        let caps = self.re_day_month_year.captures(text)?;
        let day: u32 = caps[1].parse().ok()?;
        let month = self.month_number(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        if !self.year_in_bounds(year) || !(1..=31).contains(&day) {
            return None;
        }
        Some(TierHit::Date { day: Some(day), month: Some(month), year })
    }

    fn try_month_day_year(&self, text: &str) -> Option<TierHit> {
        let caps = self.re_month_day_year.captures(text)?;
        let month = self.month_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[4].parse().ok()?;
        if !self.year_in_bounds(year) {
            return None;
        }
        // An explicit day range ("December 17 to 18, 2022") only pins the year.
        if caps.get(3).is_some() {
            return Some(TierHit::Date { day: None, month: None, year });
        }
        if !(1..=31).contains(&day) {
            return None;
        }
        Some(TierHit::Date { day: Some(day), month: Some(month), year })
    }

    fn try_year_month_day_range(&self, text: &str) -> Option<TierHit> {
        let caps = self.re_year_month_day_range.captures(text)?;
        let year: i32 = caps[1].parse().ok()?;
        let month = self.month_number(&caps[2])?;
        let day: u32 = caps[3].parse().ok()?;
        if !self.year_in_bounds(year) || !(1..=31).contains(&day) {
            return None;
        }
        Some(TierHit::Date { day: Some(day), month: Some(month), year })
    }

    fn try_year_month_day(&self, text: &str) -> Option<TierHit> {
        let caps = self.re_year_month_day.captures(text)?;
        let year: i32 = caps[1].parse().ok()?;
        let month = self.month_number(&caps[2])?;
        let day: u32 = caps[3].parse().ok()?;
        if !self.year_in_bounds(year) || !(1..=31).contains(&day) {
            return None;
        }
        Some(TierHit::Date { day: Some(day), month: Some(month), year })
    }

    fn try_month_range_year(&self, text: &str) -> Option<TierHit> {
        let caps = self.re_month_range_year.captures(text)?;
        self.month_number(&caps[1])?;
        let year: i32 = caps[2].parse().ok()?;
        if !self.year_in_bounds(year) {
            return None;
        }
        Some(TierHit::Date { day: None, month: None, year })
    }

    fn try_year_month_issue(&self, text: &str) -> Option<TierHit> {
        let caps = YEAR_MONTH_ISSUE_RE.captures(text)?;
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        if !self.year_in_bounds(year) || !(1..=12).contains(&month) {
            return None;
        }
        Some(TierHit::Date { day: None, month: Some(month), year })
    }

    fn try_year_month_name(&self, text: &str) -> Option<TierHit> {
        let caps = self.re_year_month_name.captures(text)?;
        let year: i32 = caps[1].parse().ok()?;
        let month = self.month_number(&caps[2])?;
        if !self.year_in_bounds(year) {
            return None;
        }
        Some(TierHit::Date { day: None, month: Some(month), year })
    }

    fn try_month_name_year(&self, text: &str) -> Option<TierHit> {
        let caps = self.re_month_name_year.captures(text)?;
        let month = self.month_number(&caps[1])?;
        let year: i32 = caps[2].parse().ok()?;
        if !self.year_in_bounds(year) {
            return None;
        }
        Some(TierHit::Date { day: None, month: Some(month), year })
    }

    /// Numeric triples. `YYYY.MM.DD` is tried first; otherwise `DD.MM.YYYY`,
    /// swapping day and month when only the swapped ordering is valid. A
    /// triple whose two candidate orderings are both out of range rejects
    /// the input outright.
    fn try_numeric_triple(&self, text: &str) -> Option<TierHit> {
        let caps = NUMERIC_TRIPLE_RE.captures(text)?;
        let first_raw = &caps[1];
        let second: u32 = caps[2].parse().ok()?;
        let third_raw = &caps[3];

        // Year-first: 2022.11.08
        if first_raw.len() == 4 {
            let year: i32 = first_raw.parse().ok()?;
            if self.year_in_bounds(year) && third_raw.len() <= 2 {
                let day: u32 = third_raw.parse().ok()?;
                if (1..=12).contains(&second) && (1..=31).contains(&day) {
                    return Some(TierHit::Date { day: Some(day), month: Some(second), year });
                }
                return Some(TierHit::Reject);
            }
            return None;
        }

        // Day-first: 30.01.2018
        if third_raw.len() == 4 && first_raw.len() <= 2 {
            let year: i32 = third_raw.parse().ok()?;
            if !self.year_in_bounds(year) {
                return None;
            }
            let first: u32 = first_raw.parse().ok()?;
            if (1..=31).contains(&first) && (1..=12).contains(&second) {
                return Some(TierHit::Date { day: Some(first), month: Some(second), year });
            }
            if (1..=31).contains(&second) && (1..=12).contains(&first) {
                return Some(TierHit::Date { day: Some(second), month: Some(first), year });
            }
            return Some(TierHit::Reject);
        }

        None
    }

    fn try_year_short_month(&self, text: &str) -> Option<TierHit> {
        let caps = YEAR_SHORT_MONTH_RE.captures(text)?;
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        if !self.year_in_bounds(year) || !(1..=12).contains(&month) {
            return None;
        }
        Some(TierHit::Date { day: None, month: Some(month), year })
    }

    /// Last resort: every boundary-delimited 4-digit year in bounds, keeping
    /// the latest one ("Edition 2007, Issue 2015" resolves to 2015).
    fn try_latest_year(&self, text: &str) -> Option<TierHit> {
        YEAR_SCAN_RE
            .captures_iter(text)
            .filter_map(|caps| caps[1].parse::<i32>().ok())
            .filter(|year| self.year_in_bounds(*year))
            .max()
            .map(|year| TierHit::Date { day: None, month: None, year })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> DateExtractor {
        DateExtractor::with_bounds(1900, 2026)
    }

    #[test]
    fn test_sentinel_for_empty_and_na() {
        let ex = extractor();
        assert_eq!(ex.extract(""), DATE_SENTINEL);
        assert_eq!(ex.extract("   "), DATE_SENTINEL);
        assert_eq!(ex.extract("N/A"), DATE_SENTINEL);
        assert_eq!(ex.extract("n/a"), DATE_SENTINEL);
    }

    #[test]
    fn test_rejects_application_number() {
        let ex = extractor();
        assert_eq!(ex.extract("2010-0024077"), DATE_SENTINEL);
        assert_eq!(ex.extract("US 2010-0024077"), DATE_SENTINEL);
    }

    #[test]
    fn test_day_month_year() {
        let ex = extractor();
        assert_eq!(ex.extract("15 January 2025"), "15012025");
        assert_eq!(ex.extract("24 Okt. 2013"), "24102013");
        assert_eq!(ex.extract("20. Juni 2001"), "20062001");
        assert_eq!(ex.extract("16 juin 2007"), "16062007");
        assert_eq!(ex.extract("15 JUN 2000"), "15062000");
    }

    #[test]
    fn test_ordinals_and_of() {
        let ex = extractor();
        assert_eq!(ex.extract("The meeting is scheduled for 15th of March 2025."), "15032025");
        assert_eq!(ex.extract("1st. February 2025"), "01022025");
    }

    #[test]
    fn test_day_range_takes_first_day() {
        let ex = extractor();
        assert_eq!(ex.extract("23-30 April 2014"), "23042014");
    }

    #[test]
    fn test_month_day_year() {
        let ex = extractor();
        assert_eq!(ex.extract("November 10, 2022"), "10112022");
        assert_eq!(ex.extract("September, 30, 2021"), "30092021");
        assert_eq!(ex.extract("January 1st., 2025"), "01012025");
        assert_eq!(ex.extract("Nov. 30th, 2022FJT"), "30112022");
    }

    #[test]
    fn test_month_day_range_pins_year_only() {
        let ex = extractor();
        assert_eq!(ex.extract("December 17 to 18, 2022"), "00002022");
        assert_eq!(ex.extract("September 21-22, 1999"), "00001999");
    }

    #[test]
    fn test_year_month_day_with_range() {
        let ex = extractor();
        assert_eq!(ex.extract("2012 Mar 31-Apr 4"), "31032012");
    }

    #[test]
    fn test_year_month_day() {
        let ex = extractor();
        assert_eq!(ex.extract("2012 Dec 21; 1(12)"), "21122012");
        assert_eq!(ex.extract("20 Dec 2019"), "20122019");
    }

    #[test]
    fn test_month_range_leaves_month_unset() {
        let ex = extractor();
        assert_eq!(ex.extract("Mar-Apr 2016"), "00002016");
        assert_eq!(ex.extract("May-June 2003"), "00002003");
    }

    #[test]
    fn test_year_month_issue_number() {
        let ex = extractor();
        assert_eq!(ex.extract("2011.01.086"), "00012011");
    }

    #[test]
    fn test_year_month_name() {
        let ex = extractor();
        assert_eq!(ex.extract("2015 Mar; 12(3)"), "00032015");
        assert_eq!(ex.extract("2001 Oct 134(4)"), "00102001");
    }

    #[test]
    fn test_month_name_year() {
        let ex = extractor();
        assert_eq!(ex.extract("Mai 2008"), "00052008");
        assert_eq!(ex.extract("Juin 2025"), "00062025");
        assert_eq!(ex.extract("März 2015"), "00032015");
        assert_eq!(ex.extract("v.14 MARCH 1996"), "00031996");
        assert_eq!(ex.extract("Founded in October 2023."), "00102023");
    }

    #[test]
    fn test_numeric_triples() {
        let ex = extractor();
        assert_eq!(ex.extract("2022.11.08"), "08112022");
        assert_eq!(ex.extract("2009.3.31"), "31032009");
        assert_eq!(ex.extract("Release date: 25.12.2024"), "25122024");
        assert_eq!(ex.extract("30.01.2018"), "30012018");
        assert_eq!(ex.extract("13-1-2025"), "13012025");
        assert_eq!(ex.extract("1-13-2025"), "13012025");
    }

    #[test]
    fn test_numeric_triple_invalid_rejects() {
        let ex = extractor();
        assert_eq!(ex.extract("Release date: 01.32.2024"), DATE_SENTINEL);
    }

    #[test]
    fn test_year_short_month() {
        let ex = extractor();
        assert_eq!(ex.extract("2024-6"), "00062024");
        assert_eq!(ex.extract("2018-6"), "00062018");
    }

    #[test]
    fn test_latest_year_fallback() {
        let ex = extractor();
        assert_eq!(ex.extract("Edition 2007, Issue 2015"), "00002015");
        assert_eq!(ex.extract("2017 and 2018"), "00002018");
        assert_eq!(ex.extract("(2009)"), "00002009");
        assert_eq!(ex.extract("[2008]"), "00002008");
        assert_eq!(ex.extract("25(12):2516-2521 (1997)"), "00001997");
        assert_eq!(ex.extract("(1984) 158:1018-1024"), "00001984");
        assert_eq!(ex.extract("2020 Edition"), "00002020");
        assert_eq!(ex.extract("EUROCRYPT 2001"), "00002001");
    }

    #[test]
    fn test_year_range_resolves_to_latest() {
        // Pinned policy: the fallback scan takes the maximum year, so
        // ranges resolve to their second endpoint.
        let ex = extractor();
        assert_eq!(ex.extract("2001-2007"), "00002007");
        assert_eq!(ex.extract("1988-1999"), "00001999");
    }

    #[test]
    fn test_year_with_medium_digit_run() {
        let ex = extractor();
        assert_eq!(ex.extract("2005-343699"), "00002005");
        assert_eq!(ex.extract("2008-151773"), "00002008");
    }

    #[test]
    fn test_no_year_at_all() {
        let ex = extractor();
        assert_eq!(ex.extract("126:4550-4556"), DATE_SENTINEL);
        assert_eq!(ex.extract("4th Edition"), DATE_SENTINEL);
        assert_eq!(ex.extract("20220"), DATE_SENTINEL);
        assert_eq!(ex.extract("V18.1.2 (no date specified)"), DATE_SENTINEL);
        assert_eq!(ex.extract("doi:10.1002/mds.26125"), DATE_SENTINEL);
    }

    #[test]
    fn test_year_out_of_bounds_ignored() {
        let ex = extractor();
        assert_eq!(ex.extract("(2030)"), DATE_SENTINEL);
        assert_eq!(ex.extract("(1899)"), DATE_SENTINEL);
    }

    #[test]
    fn test_format_invariant() {
        let ex = extractor();
        let samples = [
            "15 January 2025",
            "Juin 2025",
            "2010-0024077",
            "2012 Mar 31-Apr 4",
            "ISO 23539:2005 (CIE S 010:2004)",
            "Jul; 56(7):857-62 (1999)",
            "no date in here",
            "",
        ];
        for s in samples {
            let out = ex.extract(s);
            assert_eq!(out.len(), 8, "wrong length for {:?}", s);
            assert!(out.chars().all(|c| c.is_ascii_digit()), "non-digit for {:?}", s);
        }
    }

    #[test]
    fn test_custom_month_table() {
        let ex = DateExtractor::with_month_table(&[("gennaio", 1)], 1900, 2026);
        assert_eq!(ex.extract("12 gennaio 2021"), "12012021");
        // Default names are absent from the custom table.
        assert_eq!(ex.extract("12 January 2021"), "00002021");
    }

    #[test]
    fn test_deterministic() {
        let ex = extractor();
        for s in ["2013, May 10(5)", "Sep. 1994 to Oct. 2011", "2021;17(10)"] {
            assert_eq!(ex.extract(s), ex.extract(s));
        }
    }
}

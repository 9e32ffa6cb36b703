use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// An abbreviation and its spoken form.
struct Abbreviation {
    short: &'static str,
    long: &'static str,
    /// Titles always precede a name, so their period never ends a sentence.
    title: bool,
}

const fn abbr(short: &'static str, long: &'static str, title: bool) -> Abbreviation {
    Abbreviation { short, long, title }
}

static ABBREVIATIONS: &[Abbreviation] = &[
    abbr("Dr.", "Doctor", true),
    abbr("Mr.", "Mister", true),
    abbr("Mrs.", "Missus", true),
    abbr("Ms.", "Miz", true),
    abbr("Prof.", "Professor", true),
    abbr("Rev.", "Reverend", true),
    abbr("Gen.", "General", true),
    abbr("Capt.", "Captain", true),
    abbr("Sgt.", "Sergeant", true),
    abbr("Mt.", "Mount", true),
    abbr("St.", "Street", false),
    abbr("Ave.", "Avenue", false),
    abbr("Rd.", "Road", false),
    abbr("Blvd.", "Boulevard", false),
    abbr("Jr.", "Junior", false),
    abbr("Sr.", "Senior", false),
    abbr("etc.", "et cetera", false),
    abbr("e.g.", "for example", false),
    abbr("i.e.", "that is", false),
    abbr("vs.", "versus", false),
    abbr("approx.", "approximately", false),
    abbr("Dept.", "Department", false),
    abbr("Inc.", "Incorporated", false),
    abbr("Ltd.", "Limited", false),
    abbr("Corp.", "Corporation", false),
    abbr("Co.", "Company", false),
];

/// Acronyms that are spelled out letter by letter.
static ACRONYMS: &[&str] = &[
    "AI", "API", "ATM", "BBC", "CEO", "CFO", "CIA", "CNN", "CPU", "CSS", "CTO", "DIY", "DNA",
    "EU", "FAQ", "FBI", "GPS", "GPU", "HR", "HTML", "IBM", "NSA", "NYC", "PC", "PDF", "RNA",
    "SMS", "TV", "UI", "UK", "UN", "URL", "USA", "USB", "VIP",
];

static ORDINAL_WORDS: [&str; 31] = [
    "first",
    "second",
    "third",
    "fourth",
    "fifth",
    "sixth",
    "seventh",
    "eighth",
    "ninth",
    "tenth",
    "eleventh",
    "twelfth",
    "thirteenth",
    "fourteenth",
    "fifteenth",
    "sixteenth",
    "seventeenth",
    "eighteenth",
    "nineteenth",
    "twentieth",
    "twenty-first",
    "twenty-second",
    "twenty-third",
    "twenty-fourth",
    "twenty-fifth",
    "twenty-sixth",
    "twenty-seventh",
    "twenty-eighth",
    "twenty-ninth",
    "thirtieth",
    "thirty-first",
];

/// Sentence-initial phrases that read better followed by a short pause.
static TRANSITIONS: &[&str] = &[
    "On the other hand",
    "For example",
    "For instance",
    "In addition",
    "In conclusion",
    "In fact",
    "As a result",
    "However",
    "Therefore",
    "Furthermore",
    "Moreover",
    "Meanwhile",
    "Nevertheless",
    "Consequently",
    "Additionally",
    "Finally",
    "Otherwise",
    "Similarly",
    "Indeed",
];

static ABBREVIATION_RE: Lazy<Regex> = Lazy::new(|| {
    let keys: Vec<String> = ABBREVIATIONS
        .iter()
        .map(|a| regex::escape(a.short))
        .collect();
    Regex::new(&format!(r"\b(?:{})", keys.join("|"))).expect("Invalid abbreviation regex")
});

static ACRONYM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(?:{})\b", ACRONYMS.join("|"))).expect("Invalid acronym regex")
});

static TRANSITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:^|[.!?]\s+)(?:{})\b",
        TRANSITIONS.join("|")
    ))
    .expect("Invalid transition regex")
});

static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d+)(?i:st|nd|rd|th)\b").expect("Invalid ordinal regex"));
static NUMBERED_STREET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d+) (Street|Avenue|Road|Boulevard)\b").expect("Invalid street regex")
});
static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([$£€])(\d+(?:,\d{3})*(?:\.\d+)?)").expect("Invalid currency regex")
});
static NOISE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[~^]").expect("Invalid noise regex"));
static LONG_ELLIPSIS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{4,}").expect("Invalid ellipsis regex"));
static REPEATED_BANG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[!?]{2,}").expect("Invalid punctuation regex"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));
static SPACE_BEFORE_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([.!?,:;])").expect("Invalid punctuation regex"));
static MISSING_SPACE_AFTER_CLAUSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([,:;])([A-Za-z])").expect("Invalid punctuation regex"));
static MISSING_SPACE_AFTER_STOP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z][.!?])([A-Z])").expect("Invalid punctuation regex"));
static MULTI_SPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("Invalid whitespace regex"));

/// Rewrite raw text so the speech engine pronounces it correctly.
///
/// Rules run in a fixed order, each assuming the previous ones ran:
/// abbreviations, ordinals, currency, acronyms, noise characters, then
/// whitespace. Anything no rule recognizes passes through unchanged.
///
/// ```
/// use narrate_rs::text::normalize;
///
/// assert_eq!(
///     normalize("Dr. Smith lives at 1 St. and paid $5."),
///     "Doctor Smith lives at first Street and paid 5 dollars."
/// );
/// ```
pub fn normalize(text: &str) -> String {
    let text = expand_abbreviations(text);
    let text = expand_ordinals(&text);
    let text = expand_currency(&text);
    let text = expand_acronyms(&text);
    let text = strip_noise(&text);
    collapse_whitespace(&text)
}

/// Insert pause punctuation the engine would otherwise miss.
///
/// Adds a comma after sentence-initial transitions ("However", "For
/// example", ...) and tidies spacing around `. ! ? , : ;`.
pub fn add_natural_pauses(text: &str) -> String {
    let text = SPACE_BEFORE_PUNCT_RE.replace_all(text, "$1");
    let text = MISSING_SPACE_AFTER_CLAUSE_RE.replace_all(&text, "$1 $2");
    let text = MISSING_SPACE_AFTER_STOP_RE.replace_all(&text, "$1 $2");
    let text = MULTI_SPACE_RE.replace_all(&text, " ");

    replace_matches(&text, &TRANSITION_RE, |caps, rest| {
        let next = rest.trim_start_matches([' ', '\t']);
        if next.starts_with([',', ';', ':', '.', '!', '?']) {
            return None;
        }
        Some(format!("{},", &caps[0]))
    })
}

fn expand_abbreviations(text: &str) -> String {
    replace_matches(text, &ABBREVIATION_RE, |caps, rest| {
        if rest.starts_with(char::is_alphanumeric) {
            return None;
        }
        let found = ABBREVIATIONS.iter().find(|a| a.short == &caps[0])?;

        // The period doubled as a full stop: keep it.
        let after = rest.trim_start_matches(is_closing_mark);
        let line_rest = after.trim_start_matches([' ', '\t']);
        let at_line_end = line_rest.is_empty() || line_rest.starts_with(['\n', '\r']);
        let before_sentence = !found.title && starts_new_sentence(after);
        if at_line_end || before_sentence {
            Some(format!("{}.", found.long))
        } else {
            Some(found.long.to_string())
        }
    })
}

fn is_closing_mark(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}')
}

fn starts_new_sentence(rest: &str) -> bool {
    let trimmed = rest.trim_start();
    trimmed.len() < rest.len() && trimmed.starts_with(char::is_uppercase)
}

fn expand_ordinals(text: &str) -> String {
    let text = replace_matches(text, &ORDINAL_RE, |caps, _| {
        ordinal_word(&caps[1]).map(str::to_string)
    });
    replace_matches(&text, &NUMBERED_STREET_RE, |caps, _| {
        ordinal_word(&caps[1]).map(|word| format!("{word} {}", &caps[2]))
    })
}

fn ordinal_word(digits: &str) -> Option<&'static str> {
    let value: usize = digits.parse().ok()?;
    match value {
        1..=31 => Some(ORDINAL_WORDS[value - 1]),
        _ => None,
    }
}

fn expand_currency(text: &str) -> String {
    replace_matches(text, &CURRENCY_RE, |caps, _| {
        let amount = &caps[2];
        let singular = amount == "1";
        let name = match (&caps[1], singular) {
            ("$", true) => "dollar",
            ("$", false) => "dollars",
            ("£", true) => "pound",
            ("£", false) => "pounds",
            ("€", true) => "euro",
            ("€", false) => "euros",
            _ => return None,
        };
        Some(format!("{amount} {name}"))
    })
}

fn expand_acronyms(text: &str) -> String {
    ACRONYM_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let letters: Vec<String> = caps[0].chars().map(String::from).collect();
            letters.join(" ")
        })
        .into_owned()
}

fn strip_noise(text: &str) -> String {
    let text = NOISE_RE.replace_all(text, "");
    let text = LONG_ELLIPSIS_RE.replace_all(&text, "...");
    let text = REPEATED_BANG_RE.replace_all(&text, |caps: &Captures<'_>| {
        caps[0].chars().next().map(String::from).unwrap_or_default()
    });
    text.replace('_', " ")
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Like `Regex::replace_all`, but the closure also sees the text after the
/// match and may return `None` to keep the match as it was.
pub(crate) fn replace_matches<F>(text: &str, re: &Regex, mut replace: F) -> String
where
    F: FnMut(&Captures<'_>, &str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&text[last..whole.start()]);
        match replace(&caps, &text[whole.end()..]) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(whole.as_str()),
        }
        last = whole.end();
    }

    out.push_str(&text[last..]);
    out
}

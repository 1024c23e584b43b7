// Line classification for screenplay text.
// Ordered rule table, first match wins: heading, cue, parenthetical, dialogue, action.
// Hand-written scanning, no regex. Never fails: an unmatched line is simply dropped.

use crate::types::{ParserConfig, SceneHeading, SceneSetting};

/// What a single trimmed line of screenplay text is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    SceneHeading(SceneHeading),
    /// All-caps speaker name, optionally followed by an extension such as `(V.O.)`.
    ///
    /// `name` is the cue line minus its extension, so `JAMES (O.S.)` and `JAMES`
    /// yield the same speaker. The extension is not stored on the dialogue line.
    CharacterCue {
        name: String,
        extension: Option<String>,
    },
    /// Inner text of a `(...)` line.
    Parenthetical(String),
    Dialogue(String),
    Action(String),
}

/// Inputs a rule may consult besides the line itself.
struct RuleContext<'a> {
    active_character: Option<&'a str>,
    cue_max_len: usize,
    min_action_len: usize,
}

type Rule = fn(&str, &RuleContext<'_>) -> Option<LineKind>;

/// Precedence order. Earlier rules shadow later ones.
static RULES: [(&str, Rule); 5] = [
    ("scene_heading", scene_heading_rule),
    ("character_cue", character_cue_rule),
    ("parenthetical", parenthetical_rule),
    ("dialogue", dialogue_rule),
    ("action", action_rule),
];

/// Classifies trimmed lines against the ordered rule table.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    cue_max_len: usize,
    min_action_len: usize,
}

impl LineClassifier {
    pub fn new(config: &ParserConfig) -> Self {
        LineClassifier {
            cue_max_len: config.cue_max_len,
            min_action_len: config.min_action_len,
        }
    }

    /// Classify one trimmed line. `active_character` is the speaker whose
    /// dialogue run is open, if any. Blank or unmatched lines yield `None`.
    pub fn classify(&self, line: &str, active_character: Option<&str>) -> Option<LineKind> {
        if line.is_empty() {
            return None;
        }
        let ctx = RuleContext {
            active_character,
            cue_max_len: self.cue_max_len,
            min_action_len: self.min_action_len,
        };
        RULES.iter().find_map(|(_, rule)| rule(line, &ctx))
    }

    /// Rule names in precedence order.
    pub fn rule_names() -> impl Iterator<Item = &'static str> {
        RULES.iter().map(|(name, _)| *name)
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}

fn scene_heading_rule(line: &str, _ctx: &RuleContext<'_>) -> Option<LineKind> {
    parse_scene_heading(line).map(LineKind::SceneHeading)
}

fn character_cue_rule(line: &str, ctx: &RuleContext<'_>) -> Option<LineKind> {
    parse_character_cue(line, ctx.cue_max_len)
        .map(|(name, extension)| LineKind::CharacterCue { name, extension })
}

fn parenthetical_rule(line: &str, _ctx: &RuleContext<'_>) -> Option<LineKind> {
    parse_parenthetical(line).map(|inner| LineKind::Parenthetical(inner.to_string()))
}

fn dialogue_rule(line: &str, ctx: &RuleContext<'_>) -> Option<LineKind> {
    match ctx.active_character {
        Some(_) if !is_all_caps(line) => Some(LineKind::Dialogue(line.to_string())),
        _ => None,
    }
}

fn action_rule(line: &str, ctx: &RuleContext<'_>) -> Option<LineKind> {
    if line.chars().count() > ctx.min_action_len && !is_all_caps(line) {
        Some(LineKind::Action(line.to_string()))
    } else {
        None
    }
}

/// Parse `INT. LOCATION - TIME`. The prefix is case-insensitive and the
/// location/time split happens at the last ` - `, or at the last bare `-` when
/// no spaced separator exists. Both parts must be non-empty.
pub fn parse_scene_heading(line: &str) -> Option<SceneHeading> {
    let (setting, rest) = SceneSetting::PREFIXES
        .iter()
        .find(|(prefix, _)| starts_with_ignore_case(line, prefix))
        .map(|(prefix, setting)| (*setting, &line[prefix.len()..]))?;

    let (location, time_of_day) = rest
        .rsplit_once(" - ")
        .or_else(|| rest.rsplit_once('-'))?;
    let location = location.trim();
    let time_of_day = time_of_day.trim();
    if location.is_empty() || time_of_day.is_empty() {
        return None;
    }

    Some(SceneHeading {
        heading: line.to_string(),
        setting,
        location: location.to_string(),
        time_of_day: time_of_day.to_string(),
    })
}

/// Parse an all-caps speaker cue such as `SARAH` or `JAMES (O.S.)`.
/// Returns the name and the extension text, if any.
pub fn parse_character_cue(line: &str, max_len: usize) -> Option<(String, Option<String>)> {
    if line.chars().count() >= max_len {
        return None;
    }

    let (name_part, extension) = match line.find('(') {
        Some(open) => {
            let inner = parse_parenthetical(&line[open..])?;
            let extension = (!inner.is_empty()).then(|| inner.to_string());
            (&line[..open], extension)
        }
        None => (line, None),
    };

    let starts_upper = name_part.starts_with(|c: char| c.is_ascii_uppercase());
    if !starts_upper || !is_all_caps(name_part) {
        return None;
    }

    Some((name_part.trim().to_string(), extension))
}

/// Inner text of a line wrapped in parentheses, trimmed.
pub fn parse_parenthetical(line: &str) -> Option<&str> {
    line.strip_prefix('(')?.strip_suffix(')').map(str::trim)
}

/// Non-empty and made only of `A-Z` and whitespace.
pub fn is_all_caps(line: &str) -> bool {
    !line.is_empty()
        && line
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_whitespace())
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

// Strong typing over strings. Scene records, dialogue lines, and parser configuration.
// Data records use camelCase keys because the SPA consumes them directly.

use serde::{Deserialize, Serialize};

use crate::error::ScriptError;

/// 1-based position of a scene within one parsed script. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SceneNumber(u32);

impl SceneNumber {
    pub fn first() -> Self {
        SceneNumber(1)
    }

    pub fn new(number: u32) -> Self {
        SceneNumber(number)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn next(&self) -> Self {
        SceneNumber(self.0 + 1)
    }
}

/// Interior/exterior marker taken from the slugline prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneSetting {
    /// `INT.`
    Interior,
    /// `EXT.`
    Exterior,
    /// `INT/EXT.`
    InteriorExterior,
}

impl SceneSetting {
    /// Slugline prefixes. `INT/EXT.` is listed first so the longest prefix wins.
    pub const PREFIXES: [(&'static str, SceneSetting); 3] = [
        ("INT/EXT.", SceneSetting::InteriorExterior),
        ("INT.", SceneSetting::Interior),
        ("EXT.", SceneSetting::Exterior),
    ];
}

/// A parsed slugline, e.g. `INT. COFFEE SHOP - MORNING`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneHeading {
    /// The heading line exactly as encountered (trimmed).
    pub heading: String,
    pub setting: SceneSetting,
    pub location: String,
    pub time_of_day: String,
}

/// One spoken utterance by one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueLine {
    pub id: String,
    /// Speaker name as written on the cue line, without any `(V.O.)` style extension.
    pub character: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parenthetical: Option<String>,
}

/// One contiguous screenplay scene.
///
/// Fields are read-only once built: `characters` is always the de-duplicated,
/// first-occurrence-ordered list of `dialogue[*].character`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SceneRecord")]
pub struct Scene {
    id: String,
    project_id: String,
    scene_number: SceneNumber,
    heading: String,
    setting: SceneSetting,
    location: String,
    time_of_day: String,
    description: String,
    characters: Vec<String>,
    dialogue: Vec<DialogueLine>,
    line: usize,
}

impl Scene {
    /// Build a finished scene. `characters` is derived from `dialogue`.
    pub fn new(
        id: String,
        project_id: String,
        scene_number: SceneNumber,
        heading: SceneHeading,
        line: usize,
        description: String,
        dialogue: Vec<DialogueLine>,
    ) -> Self {
        Scene {
            id,
            project_id,
            scene_number,
            heading: heading.heading,
            setting: heading.setting,
            location: heading.location,
            time_of_day: heading.time_of_day,
            description,
            characters: speakers_of(&dialogue),
            dialogue,
            line,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn scene_number(&self) -> SceneNumber {
        self.scene_number
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    pub fn setting(&self) -> SceneSetting {
        self.setting
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn time_of_day(&self) -> &str {
        &self.time_of_day
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn characters(&self) -> &[String] {
        &self.characters
    }

    pub fn dialogue(&self) -> &[DialogueLine] {
        &self.dialogue
    }

    /// 1-based source line of the heading.
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Wire shape accepted when a scene comes back from JS. `characters` is ignored and recomputed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneRecord {
    id: String,
    project_id: String,
    scene_number: SceneNumber,
    heading: String,
    setting: SceneSetting,
    location: String,
    time_of_day: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    dialogue: Vec<DialogueLine>,
    #[serde(default)]
    line: usize,
}

impl From<SceneRecord> for Scene {
    fn from(record: SceneRecord) -> Self {
        Scene::new(
            record.id,
            record.project_id,
            record.scene_number,
            SceneHeading {
                heading: record.heading,
                setting: record.setting,
                location: record.location,
                time_of_day: record.time_of_day,
            },
            record.line,
            record.description,
            record.dialogue,
        )
    }
}

fn speakers_of(dialogue: &[DialogueLine]) -> Vec<String> {
    let mut characters: Vec<String> = Vec::new();
    for line in dialogue {
        if !characters.contains(&line.character) {
            characters.push(line.character.clone());
        }
    }
    characters
}

/// Parser configuration passed from JS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// A character cue must be strictly shorter than this (parenthetical included).
    #[serde(default = "default_cue_max_len")]
    pub cue_max_len: usize,
    /// An action line must be strictly longer than this.
    #[serde(default = "default_min_action_len")]
    pub min_action_len: usize,
    /// Keep `(hesitant)` style directions on the next dialogue line.
    #[serde(default = "default_true")]
    pub attach_parentheticals: bool,
    /// Treat a blank line as the end of the current speaker's run.
    #[serde(default)]
    pub blank_line_ends_dialogue: bool,
}

fn default_cue_max_len() -> usize {
    40
}

fn default_min_action_len() -> usize {
    5
}

fn default_true() -> bool {
    true
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            cue_max_len: default_cue_max_len(),
            min_action_len: default_min_action_len(),
            attach_parentheticals: true,
            blank_line_ends_dialogue: false,
        }
    }
}

impl ParserConfig {
    /// Parse and validate a JSON config. Missing keys take their defaults.
    pub fn from_json(config_json: &str) -> Result<Self, ScriptError> {
        let config: ParserConfig = serde_json::from_str(config_json)
            .map_err(|e| ScriptError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScriptError> {
        if self.cue_max_len == 0 {
            return Err(ScriptError::InvalidConfig(
                "cue_max_len must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

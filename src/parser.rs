// Script-to-scene orchestration.
// One linear pass: trim, classify, route to the scene builder or the dialogue accumulator.
// Best-effort by nature: malformed screenplay text degrades to fewer scenes, never to an error.

use tracing::{debug, trace};

use crate::classifier::{LineClassifier, LineKind};
use crate::dialogue::DialogueAccumulator;
use crate::error::ScriptError;
use crate::ids::{IdGenerator, RandomIds};
use crate::scene_builder::SceneBuilder;
use crate::types::{ParserConfig, Scene};

/// Screenplay parser. Holds configuration only; every call starts from fresh state.
#[derive(Debug, Clone)]
pub struct ScriptParser {
    config: ParserConfig,
    classifier: LineClassifier,
}

impl ScriptParser {
    pub fn new(config: ParserConfig) -> Self {
        ScriptParser {
            classifier: LineClassifier::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `script_text` into scenes owned by `project_id`, with random ids.
    pub fn parse(&self, script_text: &str, project_id: &str) -> Vec<Scene> {
        self.parse_with(script_text, project_id, &mut RandomIds)
    }

    /// Parse with caller-supplied identifiers.
    ///
    /// Scenes come back in heading order, numbered 1..=N. Text before the first
    /// heading and lines no rule claims are dropped.
    pub fn parse_with(
        &self,
        script_text: &str,
        project_id: &str,
        ids: &mut dyn IdGenerator,
    ) -> Vec<Scene> {
        let mut builder = SceneBuilder::new(project_id);
        let mut speakers = DialogueAccumulator::new();
        let mut dropped = 0usize;

        for (index, raw) in script_text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();

            if line.is_empty() {
                if self.config.blank_line_ends_dialogue {
                    speakers.clear_active_character();
                }
                continue;
            }

            let Some(kind) = self.classifier.classify(line, speakers.active_character()) else {
                trace!(line = line_number, "unclassified line dropped");
                dropped += 1;
                continue;
            };

            match kind {
                LineKind::SceneHeading(heading) => {
                    speakers.clear_active_character();
                    builder.open(heading, line_number, ids);
                }
                _ if !builder.is_open() => {
                    trace!(line = line_number, "line before first heading dropped");
                    dropped += 1;
                }
                LineKind::CharacterCue { name, .. } => speakers.set_active_character(name),
                LineKind::Parenthetical(text) => {
                    if self.config.attach_parentheticals {
                        speakers.note_parenthetical(text);
                    }
                }
                LineKind::Dialogue(text) => {
                    if let Some(dialogue) = builder.dialogue_mut() {
                        speakers.add_or_merge_line(dialogue, &text, ids);
                    }
                }
                LineKind::Action(text) => {
                    builder.append_description(&text);
                    speakers.clear_active_character();
                }
            }
        }

        let scenes = builder.finish();
        debug!(project_id, scenes = scenes.len(), dropped, "parsed script");
        scenes
    }

    /// Parse and encode the scenes as a JSON array.
    pub fn parse_to_json(
        &self,
        script_text: &str,
        project_id: &str,
    ) -> Result<String, ScriptError> {
        let scenes = self.parse(script_text, project_id);
        Ok(serde_json::to_string(&scenes)?)
    }
}

impl Default for ScriptParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

/// Parse with the default configuration and random ids.
pub fn parse_script(script_text: &str, project_id: &str) -> Vec<Scene> {
    ScriptParser::default().parse(script_text, project_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::parse_scene_heading;
    use crate::ids::SequentialIds;
    use crate::sample::SAMPLE_SCRIPT;
    use crate::types::{DialogueLine, SceneNumber, SceneSetting};
    use proptest::prelude::*;

    // =========================================================================
    // Property-Based Tests
    // =========================================================================

    mod property_tests {
        use super::*;

        fn heading_line() -> impl Strategy<Value = String> {
            (
                prop::sample::select(vec!["INT.", "EXT.", "INT/EXT.", "int.", "Ext."]),
                "[A-Z]{2,8}( [A-Z]{2,8})?",
                prop::sample::select(vec!["DAY", "NIGHT", "MORNING", "CONTINUOUS"]),
            )
                .prop_map(|(prefix, location, time)| format!("{prefix} {location} - {time}"))
        }

        fn cue_line() -> impl Strategy<Value = String> {
            prop::sample::select(vec!["JAMES", "SARAH", "MAYA (V.O.)", "OLD MAN"])
                .prop_map(String::from)
        }

        fn spoken_line() -> impl Strategy<Value = String> {
            "[a-z]{2,8}( [a-z]{2,8}){0,5}[.?!]"
        }

        fn action_line() -> impl Strategy<Value = String> {
            "[A-Z][a-z]{3,8}( [a-z]{2,8}){1,6}\\."
        }

        fn noise_line() -> impl Strategy<Value = String> {
            "\\PC{0,30}"
        }

        fn screenplay_line() -> impl Strategy<Value = String> {
            prop_oneof![
                heading_line(),
                cue_line(),
                spoken_line(),
                action_line(),
                noise_line(),
                Just(String::new()),
            ]
        }

        fn headingless_line() -> impl Strategy<Value = String> {
            prop_oneof![cue_line(), spoken_line(), action_line(), noise_line()]
        }

        fn script_text() -> impl Strategy<Value = String> {
            prop::collection::vec(screenplay_line(), 0..40).prop_map(|lines| lines.join("\n"))
        }

        fn heading_count(text: &str) -> usize {
            text.lines()
                .filter(|line| parse_scene_heading(line.trim()).is_some())
                .count()
        }

        proptest! {
            /// Property: parsing the same text twice yields the same structure;
            /// only identifiers may differ.
            #[test]
            fn structure_is_idempotent(text in script_text()) {
                let parser = ScriptParser::default();
                let first = parser.parse(&text, "project");
                let second = parser.parse(&text, "project");

                prop_assert_eq!(first.len(), second.len());
                for (a, b) in first.iter().zip(&second) {
                    prop_assert_eq!(a.heading(), b.heading());
                    prop_assert_eq!(a.location(), b.location());
                    prop_assert_eq!(a.time_of_day(), b.time_of_day());
                    prop_assert_eq!(a.description(), b.description());
                    prop_assert_eq!(a.dialogue().len(), b.dialogue().len());
                    for (da, db) in a.dialogue().iter().zip(b.dialogue()) {
                        prop_assert_eq!(&da.character, &db.character);
                        prop_assert_eq!(&da.text, &db.text);
                    }
                }
            }

            /// Property: with injected sequential ids the output is fully deterministic.
            #[test]
            fn injected_ids_make_output_identical(text in script_text()) {
                let parser = ScriptParser::default();
                let first = parser.parse_with(&text, "p", &mut SequentialIds::new("id"));
                let second = parser.parse_with(&text, "p", &mut SequentialIds::new("id"));
                prop_assert_eq!(first, second);
            }

            /// Property: one scene per heading line.
            #[test]
            fn scene_count_matches_heading_count(text in script_text()) {
                let scenes = parse_script(&text, "project");
                prop_assert_eq!(scenes.len(), heading_count(&text));
            }

            /// Property: scene numbers are 1..=N in emission order.
            #[test]
            fn scene_numbers_are_sequential(text in script_text()) {
                let scenes = parse_script(&text, "project");
                for (i, scene) in scenes.iter().enumerate() {
                    prop_assert_eq!(scene.scene_number().as_u32() as usize, i + 1);
                    prop_assert_eq!(scene.project_id(), "project");
                }
            }

            /// Property: characters are exactly the de-duplicated speakers, first occurrence first.
            #[test]
            fn characters_follow_dialogue(text in script_text()) {
                for scene in parse_script(&text, "project") {
                    let mut expected: Vec<&str> = Vec::new();
                    for line in scene.dialogue() {
                        if !expected.contains(&line.character.as_str()) {
                            expected.push(&line.character);
                        }
                    }
                    prop_assert_eq!(scene.characters(), expected.as_slice());
                }
            }

            /// Property: two lines under one cue merge into a single utterance.
            #[test]
            fn consecutive_lines_merge(
                heading in heading_line(),
                cue in cue_line(),
                first in spoken_line(),
                second in spoken_line(),
            ) {
                let text = format!("{heading}\n{cue}\n{first}\n{second}\n");
                let scenes = parse_script(&text, "project");

                prop_assert_eq!(scenes.len(), 1);
                prop_assert_eq!(scenes[0].dialogue().len(), 1);
                prop_assert_eq!(&scenes[0].dialogue()[0].text, &format!("{first} {second}"));
            }

            /// Property: text without headings produces nothing.
            #[test]
            fn no_headings_no_scenes(lines in prop::collection::vec(headingless_line(), 0..30)) {
                let text = lines.join("\n");
                prop_assume!(heading_count(&text) == 0);
                prop_assert!(parse_script(&text, "project").is_empty());
            }
        }
    }

    // =========================================================================
    // Unit Tests
    // =========================================================================

    fn parse_seq(parser: &ScriptParser, text: &str) -> Vec<Scene> {
        parser.parse_with(text, "proj-1", &mut SequentialIds::new("id"))
    }

    fn dialogue(
        id: &str,
        character: &str,
        text: &str,
        parenthetical: Option<&str>,
    ) -> DialogueLine {
        DialogueLine {
            id: id.to_string(),
            character: character.to_string(),
            text: text.to_string(),
            parenthetical: parenthetical.map(String::from),
        }
    }

    #[test]
    fn test_coffee_shop_example() {
        let text = "INT. COFFEE SHOP - MORNING\n\
                    A cozy neighborhood coffee shop. Morning light streams through large windows.\n\
                    JAMES\n\
                    Excuse me, is this seat taken?\n\
                    SARAH\n\
                    Oh, no. Go ahead.\n";

        let scenes = parse_seq(&ScriptParser::default(), text);

        let expected = Scene::new(
            "id-1".to_string(),
            "proj-1".to_string(),
            SceneNumber::first(),
            parse_scene_heading("INT. COFFEE SHOP - MORNING").unwrap(),
            1,
            "A cozy neighborhood coffee shop. Morning light streams through large windows."
                .to_string(),
            vec![
                dialogue("id-2", "JAMES", "Excuse me, is this seat taken?", None),
                dialogue("id-3", "SARAH", "Oh, no. Go ahead.", None),
            ],
        );
        assert_eq!(scenes, vec![expected]);
        assert_eq!(scenes[0].location(), "COFFEE SHOP");
        assert_eq!(scenes[0].time_of_day(), "MORNING");
        assert_eq!(scenes[0].characters(), ["JAMES", "SARAH"]);
    }

    #[test]
    fn test_sample_script() {
        let scenes = parse_seq(&ScriptParser::default(), SAMPLE_SCRIPT);
        assert_eq!(scenes.len(), 3);

        let numbers: Vec<u32> = scenes.iter().map(|s| s.scene_number().as_u32()).collect();
        assert_eq!(numbers, [1, 2, 3]);

        let first = &scenes[0];
        assert_eq!(first.heading(), "INT. COFFEE SHOP - MORNING");
        assert_eq!(
            first.description(),
            "A cozy neighborhood coffee shop. Morning light streams through large windows. \
             SARAH (30s), a freelance illustrator, sketches in a worn notebook."
        );
        assert_eq!(first.characters(), ["JAMES", "SARAH"]);
        assert_eq!(first.dialogue()[1].parenthetical.as_deref(), Some("looking up"));

        let second = &scenes[1];
        assert_eq!(second.heading(), "EXT. CITY STREET - CONTINUOUS");
        assert_eq!(second.setting(), SceneSetting::Exterior);
        assert_eq!(second.line(), 14);
        assert!(second.characters().is_empty());
        assert!(second.dialogue().is_empty());

        let third = &scenes[2];
        assert_eq!(third.location(), "JAMES'S APARTMENT");
        assert_eq!(third.time_of_day(), "NIGHT");
        assert_eq!(third.dialogue().len(), 1);
        assert_eq!(third.dialogue()[0].text, "Just call her. It's only a phone call.");
        assert_eq!(third.dialogue()[0].parenthetical.as_deref(), Some("to himself"));
    }

    #[test]
    fn test_hyphenated_time_of_day() {
        let scenes = parse_script("EXT. CITY STREET - PRE-DAWN\nFog rolls in slowly.\n", "p");
        assert_eq!(scenes[0].location(), "CITY STREET");
        assert_eq!(scenes[0].time_of_day(), "PRE-DAWN");
        assert_eq!(scenes[0].description(), "Fog rolls in slowly.");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_script("", "p").is_empty());
        assert!(parse_script("\n\n   \n", "p").is_empty());
    }

    #[test]
    fn test_text_before_first_heading_is_discarded() {
        let text = "FADE IN:\n\
                    Some notes about the draft that nobody should see.\n\
                    JAMES\n\
                    Hello there.\n\
                    INT. GARAGE - NIGHT\n\
                    A car idles in the dark.\n";
        let scenes = parse_seq(&ScriptParser::default(), text);

        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].description(), "A car idles in the dark.");
        assert!(scenes[0].dialogue().is_empty());
        assert_eq!(scenes[0].line(), 5);
    }

    #[test]
    fn test_prose_under_active_speaker_is_dialogue() {
        let text = "INT. GARAGE - NIGHT\n\
                    MAYA\n\
                    Hand me the wrench.\n\
                    Owen tosses it over.\n\
                    Thanks.\n";
        let scenes = parse_seq(&ScriptParser::default(), text);

        // Dialogue outranks action while a speaker is active.
        assert_eq!(scenes[0].dialogue().len(), 1);
        assert_eq!(
            scenes[0].dialogue()[0].text,
            "Hand me the wrench. Owen tosses it over. Thanks."
        );
        assert_eq!(scenes[0].description(), "");
    }

    #[test]
    fn test_heading_clears_speaker() {
        let text = "INT. GARAGE - NIGHT\n\
                    MAYA\n\
                    Hand me the wrench.\n\
                    EXT. DRIVEWAY - NIGHT\n\
                    Rain hammers the pavement.\n";
        let scenes = parse_seq(&ScriptParser::default(), text);

        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[1].description(), "Rain hammers the pavement.");
        assert!(scenes[1].dialogue().is_empty());
    }

    #[test]
    fn test_blank_line_keeps_speaker_by_default() {
        let text = "INT. GARAGE - NIGHT\nMAYA\nHand me the wrench.\n\nShe waits.\n";
        let scenes = parse_seq(&ScriptParser::default(), text);
        assert_eq!(scenes[0].dialogue()[0].text, "Hand me the wrench. She waits.");
    }

    #[test]
    fn test_blank_line_ends_dialogue_when_configured() {
        let parser = ScriptParser::new(ParserConfig {
            blank_line_ends_dialogue: true,
            ..ParserConfig::default()
        });
        let text = "INT. GARAGE - NIGHT\nMAYA\nHand me the wrench.\n\nShe waits.\n";
        let scenes = parse_seq(&parser, text);

        assert_eq!(scenes[0].dialogue()[0].text, "Hand me the wrench.");
        assert_eq!(scenes[0].description(), "She waits.");
    }

    #[test]
    fn test_parentheticals_can_be_dropped() {
        let parser = ScriptParser::new(ParserConfig {
            attach_parentheticals: false,
            ..ParserConfig::default()
        });
        let scenes = parse_seq(&parser, SAMPLE_SCRIPT);
        assert!(scenes
            .iter()
            .flat_map(|s| s.dialogue())
            .all(|d| d.parenthetical.is_none()));
    }

    #[test]
    fn test_cue_extension_not_in_character_name() {
        let text = "INT. RADIO BOOTH - NIGHT\nHOST (V.O.)\nYou're listening to late night radio.\n";
        let scenes = parse_seq(&ScriptParser::default(), text);
        assert_eq!(scenes[0].characters(), ["HOST"]);
    }

    #[test]
    fn test_repeated_cue_starts_new_dialogue_line() {
        let text = "INT. HALL - DAY\nJAMES\nHello?\nJAMES\nAnyone home?\n";
        let scenes = parse_seq(&ScriptParser::default(), text);
        assert_eq!(scenes[0].dialogue().len(), 2);
        assert_eq!(scenes[0].characters(), ["JAMES"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "INT. HALL - DAY\r\nJAMES\r\nHello?\r\n";
        let scenes = parse_seq(&ScriptParser::default(), text);
        assert_eq!(scenes[0].heading(), "INT. HALL - DAY");
        assert_eq!(scenes[0].dialogue()[0].text, "Hello?");
    }

    #[test]
    fn test_parse_to_json() {
        let json = ScriptParser::default()
            .parse_to_json("INT. HALL - DAY\nJAMES\nHello?\n", "p9")
            .expect("Should serialize scenes");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["projectId"], "p9");
        assert_eq!(value[0]["sceneNumber"], 1);
        assert_eq!(value[0]["characters"][0], "JAMES");
        assert_eq!(value[0]["dialogue"][0]["text"], "Hello?");
    }
}

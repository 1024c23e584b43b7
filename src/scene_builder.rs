// Scene lifecycle: open on a heading, accumulate, finalize on the next heading or end of input.

use tracing::trace;

use crate::ids::IdGenerator;
use crate::types::{DialogueLine, Scene, SceneHeading, SceneNumber};

/// Builder state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    NoActiveScene,
    SceneOpen,
}

/// The scene currently being assembled.
#[derive(Debug)]
struct OpenScene {
    id: String,
    number: SceneNumber,
    heading: SceneHeading,
    line: usize,
    description: String,
    dialogue: Vec<DialogueLine>,
}

/// Owns the open scene and the finished output for one parse.
#[derive(Debug)]
pub struct SceneBuilder {
    project_id: String,
    next_number: SceneNumber,
    current: Option<OpenScene>,
    scenes: Vec<Scene>,
}

impl SceneBuilder {
    pub fn new(project_id: &str) -> Self {
        SceneBuilder {
            project_id: project_id.to_string(),
            next_number: SceneNumber::first(),
            current: None,
            scenes: Vec::new(),
        }
    }

    pub fn state(&self) -> BuilderState {
        if self.current.is_some() {
            BuilderState::SceneOpen
        } else {
            BuilderState::NoActiveScene
        }
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Start a new scene. Any scene still open is finalized first.
    pub fn open(&mut self, heading: SceneHeading, line: usize, ids: &mut dyn IdGenerator) {
        self.finalize();

        let number = self.next_number;
        self.next_number = number.next();
        trace!(scene_number = number.as_u32(), line, heading = %heading.heading, "opened scene");

        self.current = Some(OpenScene {
            id: ids.next_id(),
            number,
            heading,
            line,
            description: String::new(),
            dialogue: Vec::new(),
        });
    }

    /// Space-join `text` onto the open scene's description. No-op when nothing is open.
    pub fn append_description(&mut self, text: &str) {
        if let Some(scene) = self.current.as_mut() {
            if !scene.description.is_empty() {
                scene.description.push(' ');
            }
            scene.description.push_str(text);
        }
    }

    /// Dialogue of the open scene, for the accumulator to append to.
    pub fn dialogue_mut(&mut self) -> Option<&mut Vec<DialogueLine>> {
        self.current.as_mut().map(|scene| &mut scene.dialogue)
    }

    /// Close the open scene and push it to the output. No-op when nothing is open.
    pub fn finalize(&mut self) {
        let Some(open) = self.current.take() else {
            return;
        };
        self.scenes.push(Scene::new(
            open.id,
            self.project_id.clone(),
            open.number,
            open.heading,
            open.line,
            open.description,
            open.dialogue,
        ));
    }

    /// Finalize anything still open and hand back the scenes in emission order.
    pub fn finish(mut self) -> Vec<Scene> {
        self.finalize();
        self.scenes
    }
}

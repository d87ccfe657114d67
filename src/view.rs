//! What each step shows, as data, plus the download/copy surface.
//!
//! `render` is a pure function of the workflow state; it never decides
//! which transitions are legal.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    error::{Result, StyleError},
    models::EncodedImage,
    workflow::{Step, WorkflowState},
};

pub const RESULT_FILENAME: &str = "restyled-photo.png";
pub const REFERENCE_FILENAME: &str = "reference-style.png";
pub const SOURCE_FILENAME: &str = "base-photo.png";
pub const PROMPT_FILENAME: &str = "style-prompt.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Reference,
    Source,
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// Stepper position, 1 to 4.
    pub progress: usize,
    pub error: Option<String>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Capture {
        slot: Slot,
        title: &'static str,
        subtitle: &'static str,
        camera: bool,
        can_go_back: bool,
    },
    Loading {
        message: &'static str,
    },
    PromptReady {
        components: Vec<(&'static str, String)>,
        prompt: String,
    },
    Result {
        image: EncodedImage,
        reference: Option<EncodedImage>,
        source: Option<EncodedImage>,
    },
}

pub fn render(state: &WorkflowState) -> View {
    let body = match state.step() {
        Step::UploadReference => Body::Capture {
            slot: Slot::Reference,
            title: "Reference Style Photo",
            subtitle: "Upload or take a photo of the style you want to replicate.",
            camera: state.is_capture_mode_active(),
            can_go_back: false,
        },
        Step::UploadSource => Body::Capture {
            slot: Slot::Source,
            title: "Your Photo",
            subtitle: "Now upload or take a photo of yourself to transform.",
            camera: state.is_capture_mode_active(),
            can_go_back: !state.is_capture_mode_active(),
        },
        Step::Analyzing | Step::Generating => Body::Loading {
            message: state.loading_message().unwrap_or_default(),
        },
        Step::PromptReady => match state.style_description() {
            Some(description) => Body::PromptReady {
                components: description.components(),
                prompt: description.cohesive_prompt.clone(),
            },
            None => Body::Loading { message: "" },
        },
        Step::Result => match state.generated_image() {
            Some(image) => Body::Result {
                image: image.clone(),
                reference: state.reference_image().cloned(),
                source: state.source_image().cloned(),
            },
            None => Body::Loading { message: "" },
        },
    };

    View {
        progress: state.progress(),
        error: state.error_message().map(str::to_string),
        body,
    }
}

/// Writes downloads under their fixed filenames into one directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_result(&self, state: &WorkflowState) -> Result<PathBuf> {
        let image = state
            .generated_image()
            .ok_or(StyleError::NothingToExport("restyled photo"))?;
        self.write_image(RESULT_FILENAME, image)
    }

    pub fn save_reference(&self, state: &WorkflowState) -> Result<PathBuf> {
        let image = state
            .reference_image()
            .ok_or(StyleError::NothingToExport("reference image"))?;
        self.write_image(REFERENCE_FILENAME, image)
    }

    pub fn save_source(&self, state: &WorkflowState) -> Result<PathBuf> {
        let image = state
            .source_image()
            .ok_or(StyleError::NothingToExport("base photo"))?;
        self.write_image(SOURCE_FILENAME, image)
    }

    /// Terminal stand-in for copying the prompt to the clipboard.
    pub fn save_prompt(&self, state: &WorkflowState) -> Result<PathBuf> {
        let description = state
            .style_description()
            .ok_or(StyleError::NothingToExport("style prompt"))?;
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(PROMPT_FILENAME);
        fs::write(&path, &description.cohesive_prompt)?;
        log::info!("Prompt written to {}", path.display());
        Ok(path)
    }

    fn write_image(&self, filename: &str, image: &EncodedImage) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, image.decode()?)?;
        log::info!("💾 Saved {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StyleDescription;
    use crate::workflow::{Command, Event};

    fn description() -> StyleDescription {
        StyleDescription {
            outfit: "linen suit".into(),
            accessories: "straw hat".into(),
            pose: "seated".into(),
            camera_angle: "eye-level".into(),
            lighting: "soft window light".into(),
            aesthetic: "riviera".into(),
            cohesive_prompt: "A person in a linen suit and straw hat, seated.".into(),
        }
    }

    fn finished_state() -> WorkflowState {
        let mut state = WorkflowState::new();
        let reference = EncodedImage::from_bytes(b"ref", "image/png");
        let ticket = match state.handle(Event::ReferenceCaptured(reference)).unwrap() {
            Command::Analyze { ticket, .. } => ticket,
            other => panic!("unexpected {:?}", other),
        };
        state
            .handle(Event::AnalysisFinished {
                ticket,
                outcome: Ok(description()),
            })
            .unwrap();
        state.handle(Event::Continue).unwrap();
        let source = EncodedImage::from_bytes(b"me", "image/jpeg");
        let ticket = match state.handle(Event::SourceCaptured(source)).unwrap() {
            Command::Generate { ticket, .. } => ticket,
            other => panic!("unexpected {:?}", other),
        };
        state
            .handle(Event::GenerationFinished {
                ticket,
                outcome: Ok(EncodedImage::from_bytes(b"out", "image/png")),
            })
            .unwrap();
        state
    }

    #[test]
    fn test_initial_view() {
        let view = render(&WorkflowState::new());
        assert_eq!(view.progress, 1);
        assert!(view.error.is_none());
        assert!(matches!(
            view.body,
            Body::Capture { slot: Slot::Reference, camera: false, can_go_back: false, .. }
        ));
    }

    #[test]
    fn test_loading_and_prompt_views() {
        let mut state = WorkflowState::new();
        state.handle(Event::EnterCaptureMode).unwrap();
        assert!(matches!(render(&state).body, Body::Capture { camera: true, .. }));

        let ticket = match state
            .handle(Event::ReferenceCaptured(EncodedImage::from_bytes(b"r", "image/png")))
            .unwrap()
        {
            Command::Analyze { ticket, .. } => ticket,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(
            render(&state).body,
            Body::Loading {
                message: "Analyzing style elements..."
            }
        );

        state
            .handle(Event::AnalysisFinished {
                ticket,
                outcome: Ok(description()),
            })
            .unwrap();
        let view = render(&state);
        assert_eq!(view.progress, 2);
        match view.body {
            Body::PromptReady { components, prompt } => {
                assert_eq!(prompt, "A person in a linen suit and straw hat, seated.");
                assert_eq!(components[0], ("Outfit", "linen suit".to_string()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_result_view_carries_all_images() {
        let view = render(&finished_state());
        assert_eq!(view.progress, 4);
        match view.body {
            Body::Result {
                image,
                reference,
                source,
            } => {
                assert_eq!(image.decode().unwrap(), b"out");
                assert_eq!(reference.unwrap().decode().unwrap(), b"ref");
                assert_eq!(source.unwrap().decode().unwrap(), b"me");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_exporter_writes_fixed_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("out"));
        let state = finished_state();

        let result = exporter.save_result(&state).unwrap();
        assert_eq!(result.file_name().unwrap(), RESULT_FILENAME);
        assert_eq!(fs::read(&result).unwrap(), b"out");

        let reference = exporter.save_reference(&state).unwrap();
        assert_eq!(fs::read(reference).unwrap(), b"ref");
        let source = exporter.save_source(&state).unwrap();
        assert_eq!(source.file_name().unwrap(), SOURCE_FILENAME);

        let prompt = exporter.save_prompt(&state).unwrap();
        assert_eq!(
            fs::read_to_string(prompt).unwrap(),
            "A person in a linen suit and straw hat, seated."
        );
    }

    #[test]
    fn test_exporter_refuses_missing_images() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let state = WorkflowState::new();
        assert!(matches!(
            exporter.save_result(&state),
            Err(StyleError::NothingToExport(_))
        ));
        assert!(exporter.save_prompt(&state).is_err());
    }
}

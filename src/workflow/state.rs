use std::fmt;

use crate::{
    error::WorkflowError,
    models::{EncodedImage, StyleDescription},
};

pub const ANALYZING_MESSAGE: &str = "Analyzing style elements...";
pub const GENERATING_MESSAGE: &str = "Applying style to your photo...";
const ANALYSIS_FALLBACK_ERROR: &str = "Analysis failed.";
const GENERATION_FALLBACK_ERROR: &str = "Generation failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    UploadReference,
    Analyzing,
    PromptReady,
    UploadSource,
    Generating,
    Result,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::UploadReference => "UPLOAD_REFERENCE",
            Step::Analyzing => "ANALYZING",
            Step::PromptReady => "PROMPT_READY",
            Step::UploadSource => "UPLOAD_SOURCE",
            Step::Generating => "GENERATING",
            Step::Result => "RESULT",
        }
    }

    /// Steps in which a style description must be present.
    pub fn has_description(&self) -> bool {
        matches!(
            self,
            Step::PromptReady | Step::UploadSource | Step::Generating | Step::Result
        )
    }

    /// Steps that offer a capture surface (file picker or camera).
    pub fn accepts_capture(&self) -> bool {
        matches!(self, Step::UploadReference | Step::UploadSource)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one backend attempt. Ids are never reused within a session,
/// so an outcome for an attempt that was reset away can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    EnterCaptureMode,
    CancelCaptureMode,
    ReferenceCaptured(EncodedImage),
    AnalysisFinished {
        ticket: Ticket,
        outcome: Result<StyleDescription, String>,
    },
    Continue,
    Back,
    SourceCaptured(EncodedImage),
    GenerationFinished {
        ticket: Ticket,
        outcome: Result<EncodedImage, String>,
    },
    Reset,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::EnterCaptureMode => "enter capture mode",
            Event::CancelCaptureMode => "cancel capture mode",
            Event::ReferenceCaptured(_) => "reference captured",
            Event::AnalysisFinished { .. } => "analysis finished",
            Event::Continue => "continue",
            Event::Back => "back",
            Event::SourceCaptured(_) => "source captured",
            Event::GenerationFinished { .. } => "generation finished",
            Event::Reset => "reset",
        }
    }
}

/// Work the caller must start (or stop) after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    None,
    Analyze {
        ticket: Ticket,
        image: EncodedImage,
    },
    Generate {
        ticket: Ticket,
        image: EncodedImage,
        style_prompt: String,
    },
    /// The pending attempt was abandoned and should be aborted.
    Cancel(Ticket),
}

#[derive(Debug, Clone)]
pub struct WorkflowState {
    step: Step,
    reference_image: Option<EncodedImage>,
    source_image: Option<EncodedImage>,
    style_description: Option<StyleDescription>,
    generated_image: Option<EncodedImage>,
    error_message: Option<String>,
    is_capture_mode_active: bool,
    pending: Option<Ticket>,
    next_ticket: u64,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            step: Step::UploadReference,
            reference_image: None,
            source_image: None,
            style_description: None,
            generated_image: None,
            error_message: None,
            is_capture_mode_active: false,
            pending: None,
            next_ticket: 1,
        }
    }
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn reference_image(&self) -> Option<&EncodedImage> {
        self.reference_image.as_ref()
    }

    pub fn source_image(&self) -> Option<&EncodedImage> {
        self.source_image.as_ref()
    }

    pub fn style_description(&self) -> Option<&StyleDescription> {
        self.style_description.as_ref()
    }

    pub fn generated_image(&self) -> Option<&EncodedImage> {
        self.generated_image.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_capture_mode_active(&self) -> bool {
        self.is_capture_mode_active
    }

    pub fn pending(&self) -> Option<Ticket> {
        self.pending
    }

    pub fn loading_message(&self) -> Option<&'static str> {
        match self.step {
            Step::Analyzing => Some(ANALYZING_MESSAGE),
            Step::Generating => Some(GENERATING_MESSAGE),
            _ => None,
        }
    }

    /// Position 1-4 on the four-stage stepper. The loading steps share a
    /// stage with the upload that started them.
    pub fn progress(&self) -> usize {
        match self.step {
            Step::UploadReference | Step::Analyzing => 1,
            Step::PromptReady => 2,
            Step::UploadSource | Step::Generating => 3,
            Step::Result => 4,
        }
    }

    /// True when the step-dependent fields agree with the current step.
    pub fn invariants_hold(&self) -> bool {
        let description_ok = self.style_description.is_some() == self.step.has_description();
        let generated_ok = self.generated_image.is_some() == (self.step == Step::Result);
        let pending_ok = self.pending.is_some()
            == matches!(self.step, Step::Analyzing | Step::Generating);
        description_ok && generated_ok && pending_ok
    }

    /// Applies one event. Rejected events leave the state untouched.
    pub fn handle(&mut self, event: Event) -> Result<Command, WorkflowError> {
        let command = match event {
            Event::EnterCaptureMode => {
                self.require(|step| step.accepts_capture(), "enter capture mode")?;
                self.is_capture_mode_active = true;
                Command::None
            }
            Event::CancelCaptureMode => {
                self.require(|step| step.accepts_capture(), "cancel capture mode")?;
                self.is_capture_mode_active = false;
                Command::None
            }
            Event::ReferenceCaptured(image) => {
                self.require(|step| step == Step::UploadReference, "reference captured")?;
                self.reference_image = Some(image.clone());
                self.is_capture_mode_active = false;
                self.error_message = None;
                self.step = Step::Analyzing;
                let ticket = self.issue_ticket();
                Command::Analyze { ticket, image }
            }
            Event::AnalysisFinished { ticket, outcome } => {
                if !self.is_current(ticket, Step::Analyzing) {
                    log::debug!("Discarding stale analysis outcome #{}", ticket.id());
                    return Ok(Command::None);
                }
                self.pending = None;
                match outcome {
                    Ok(description) => {
                        self.style_description = Some(description);
                        self.step = Step::PromptReady;
                    }
                    Err(message) => {
                        self.error_message = Some(non_empty(message, ANALYSIS_FALLBACK_ERROR));
                        self.step = Step::UploadReference;
                    }
                }
                Command::None
            }
            Event::Continue => {
                self.require(|step| step == Step::PromptReady, "continue")?;
                self.step = Step::UploadSource;
                Command::None
            }
            Event::Back => {
                self.require(|step| step == Step::UploadSource, "back")?;
                self.is_capture_mode_active = false;
                self.step = Step::PromptReady;
                Command::None
            }
            Event::SourceCaptured(image) => {
                let Some(description) = self.style_description.as_ref() else {
                    log::warn!("Source image captured before any analysis; no request made");
                    self.source_image = Some(image);
                    self.is_capture_mode_active = false;
                    return Ok(Command::None);
                };
                if self.step != Step::UploadSource {
                    return Err(self.reject("source captured"));
                }
                let style_prompt = description.cohesive_prompt.clone();
                self.source_image = Some(image.clone());
                self.is_capture_mode_active = false;
                self.error_message = None;
                self.step = Step::Generating;
                let ticket = self.issue_ticket();
                Command::Generate {
                    ticket,
                    image,
                    style_prompt,
                }
            }
            Event::GenerationFinished { ticket, outcome } => {
                if !self.is_current(ticket, Step::Generating) {
                    log::debug!("Discarding stale generation outcome #{}", ticket.id());
                    return Ok(Command::None);
                }
                self.pending = None;
                match outcome {
                    Ok(image) => {
                        self.generated_image = Some(image);
                        self.step = Step::Result;
                    }
                    Err(message) => {
                        self.error_message = Some(non_empty(message, GENERATION_FALLBACK_ERROR));
                        self.step = Step::UploadSource;
                    }
                }
                Command::None
            }
            Event::Reset => {
                let abandoned = self.pending.take();
                let next_ticket = self.next_ticket;
                *self = Self {
                    next_ticket,
                    ..Self::default()
                };
                match abandoned {
                    Some(ticket) => Command::Cancel(ticket),
                    None => Command::None,
                }
            }
        };

        debug_assert!(self.invariants_hold(), "workflow invariants broken: {:?}", self);
        Ok(command)
    }

    fn require(
        &self,
        allowed: impl Fn(Step) -> bool,
        event: &'static str,
    ) -> Result<(), WorkflowError> {
        if allowed(self.step) {
            Ok(())
        } else {
            Err(self.reject(event))
        }
    }

    fn reject(&self, event: &'static str) -> WorkflowError {
        log::warn!("Rejected '{}' in step {}", event, self.step);
        WorkflowError::InvalidTransition {
            step: self.step,
            event,
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some(ticket);
        ticket
    }

    fn is_current(&self, ticket: Ticket, step: Step) -> bool {
        self.step == step && self.pending == Some(ticket)
    }
}

fn non_empty(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    error::WorkflowError,
    models::EncodedImage,
    workflow::{
        service::StyleService,
        state::{Command, Event, Step, Ticket, WorkflowState},
    },
};

struct InFlight {
    ticket: Ticket,
    step: Step,
    handle: JoinHandle<Event>,
}

/// Drives one wizard session: applies events to the `WorkflowState` and runs
/// the backend call each transition asks for, at most one at a time.
///
/// Calls run as tokio tasks, so events that start one must be dispatched
/// from inside a runtime.
pub struct Session {
    state: WorkflowState,
    service: Arc<dyn StyleService>,
    in_flight: Option<InFlight>,
}

impl Session {
    pub fn new(service: Arc<dyn StyleService>) -> Self {
        Self {
            state: WorkflowState::new(),
            service,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn dispatch(&mut self, event: Event) -> Result<(), WorkflowError> {
        let starts_call = matches!(event, Event::ReferenceCaptured(_))
            || (matches!(event, Event::SourceCaptured(_))
                && self.state.style_description().is_some());
        if starts_call && self.in_flight.is_some() {
            return Err(WorkflowError::CallInFlight);
        }

        log::debug!("{} in step {}", event.name(), self.state.step());
        let command = self.state.handle(event)?;
        self.run(command);
        Ok(())
    }

    pub fn enter_capture_mode(&mut self) -> Result<(), WorkflowError> {
        self.dispatch(Event::EnterCaptureMode)
    }

    pub fn cancel_capture_mode(&mut self) -> Result<(), WorkflowError> {
        self.dispatch(Event::CancelCaptureMode)
    }

    pub fn capture_reference(&mut self, image: EncodedImage) -> Result<(), WorkflowError> {
        self.dispatch(Event::ReferenceCaptured(image))
    }

    pub fn continue_to_source(&mut self) -> Result<(), WorkflowError> {
        self.dispatch(Event::Continue)
    }

    pub fn back(&mut self) -> Result<(), WorkflowError> {
        self.dispatch(Event::Back)
    }

    pub fn capture_source(&mut self, image: EncodedImage) -> Result<(), WorkflowError> {
        self.dispatch(Event::SourceCaptured(image))
    }

    /// Clears the session and aborts any call still in flight.
    pub fn reset(&mut self) {
        if let Err(e) = self.dispatch(Event::Reset) {
            log::error!("Reset rejected: {}", e);
        }
    }

    /// Waits for the in-flight call, if any, and applies its outcome.
    /// Returns the step reached, or `None` when nothing was pending.
    ///
    /// Cancel safe: dropping the future before it completes leaves the call
    /// in flight, so it can be raced against user input and reset later.
    pub async fn settle(&mut self) -> Option<Step> {
        let joined = (&mut self.in_flight.as_mut()?.handle).await;
        let in_flight = self.in_flight.take()?;
        let event = match joined {
            Ok(event) => event,
            Err(e) => {
                log::error!("Backend task #{} ended abnormally: {}", in_flight.ticket.id(), e);
                failed_event(in_flight.ticket, in_flight.step, e.to_string())
            }
        };

        if let Err(e) = self.state.handle(event) {
            log::error!("Outcome could not be applied: {}", e);
        }
        if let Some(message) = self.state.error_message() {
            log::warn!("Step {} reports: {}", self.state.step(), message);
        }
        Some(self.state.step())
    }

    fn run(&mut self, command: Command) {
        match command {
            Command::None => {}
            Command::Analyze { ticket, image } => {
                let service = Arc::clone(&self.service);
                log::info!("Starting analysis #{}", ticket.id());
                let handle = tokio::spawn(async move {
                    let outcome = service.analyze(&image).await.map_err(|e| e.to_string());
                    Event::AnalysisFinished { ticket, outcome }
                });
                self.in_flight = Some(InFlight {
                    ticket,
                    step: Step::Analyzing,
                    handle,
                });
            }
            Command::Generate {
                ticket,
                image,
                style_prompt,
            } => {
                let service = Arc::clone(&self.service);
                log::info!("Starting generation #{}", ticket.id());
                let handle = tokio::spawn(async move {
                    let outcome = service
                        .apply(&image, &style_prompt)
                        .await
                        .map_err(|e| e.to_string());
                    Event::GenerationFinished { ticket, outcome }
                });
                self.in_flight = Some(InFlight {
                    ticket,
                    step: Step::Generating,
                    handle,
                });
            }
            Command::Cancel(ticket) => {
                if let Some(in_flight) = self.in_flight.take() {
                    log::info!("Aborting in-flight call #{}", ticket.id());
                    in_flight.handle.abort();
                }
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
        }
    }
}

fn failed_event(ticket: Ticket, step: Step, message: String) -> Event {
    if step == Step::Analyzing {
        Event::AnalysisFinished {
            ticket,
            outcome: Err(message),
        }
    } else {
        Event::GenerationFinished {
            ticket,
            outcome: Err(message),
        }
    }
}

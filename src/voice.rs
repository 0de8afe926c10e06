//! Voice conversation flow for the chat front end, as a plain state machine.
//!
//! Speech recognition, the chat request and speech synthesis are all driven
//! from outside by feeding [`VoiceEvent`]s; the machine only decides what
//! state comes next.

use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VoiceState {
    #[default]
    Idle,
    Listening { transcript: String },
    Processing { message: String },
    Speaking { utterance: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    StartListening,
    /// Interim or final recognition result; replaces the transcript so far.
    Transcript(String),
    StopListening,
    RecognitionFailed,
    /// A typed message sent without the microphone.
    Submit(String),
    Reply { text: String, auto_speak: bool },
    RequestFailed,
    SpeechEnded,
    Cancel,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("event {event:?} is not valid while {state}")]
pub struct InvalidTransition {
    pub state: &'static str,
    pub event: VoiceEvent,
}

impl VoiceState {
    pub fn name(&self) -> &'static str {
        match self {
            VoiceState::Idle => "idle",
            VoiceState::Listening { .. } => "listening",
            VoiceState::Processing { .. } => "processing",
            VoiceState::Speaking { .. } => "speaking",
        }
    }

    /// The message that should be sent to the chat endpoint, if this state
    /// is waiting on one.
    pub fn pending_message(&self) -> Option<&str> {
        match self {
            VoiceState::Processing { message } => Some(message),
            _ => None,
        }
    }

    pub fn on(&self, event: VoiceEvent) -> Result<VoiceState, InvalidTransition> {
        use VoiceEvent as E;
        use VoiceState as S;

        let next = match (self, &event) {
            // Starting the microphone interrupts any speech in progress.
            (S::Idle | S::Speaking { .. }, E::StartListening) => S::Listening {
                transcript: String::new(),
            },
            (S::Listening { .. }, E::Transcript(text)) => S::Listening {
                transcript: text.clone(),
            },
            (S::Listening { transcript }, E::StopListening) => {
                let message = transcript.trim();
                if message.is_empty() {
                    S::Idle
                } else {
                    S::Processing { message: message.to_string() }
                }
            }
            (S::Listening { .. }, E::RecognitionFailed) => S::Idle,
            (S::Idle, E::Submit(text)) if !text.trim().is_empty() => S::Processing {
                message: text.trim().to_string(),
            },
            (S::Processing { .. }, E::Reply { text, auto_speak }) => {
                if *auto_speak && !text.trim().is_empty() {
                    S::Speaking { utterance: text.clone() }
                } else {
                    S::Idle
                }
            }
            (S::Processing { .. }, E::RequestFailed) => S::Idle,
            (S::Speaking { .. }, E::SpeechEnded) => S::Idle,
            (S::Listening { .. } | S::Speaking { .. }, E::Cancel) => S::Idle,
            (S::Idle, E::Cancel) => S::Idle,
            _ => {
                return Err(InvalidTransition {
                    state: self.name(),
                    event: event.clone(),
                })
            }
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(events: Vec<VoiceEvent>) -> Result<VoiceState, InvalidTransition> {
        events
            .into_iter()
            .try_fold(VoiceState::Idle, |state, event| state.on(event))
    }

    #[test]
    fn test_spoken_conversation_flow() {
        let state = drive(vec![
            VoiceEvent::StartListening,
            VoiceEvent::Transcript("I feel".to_string()),
            VoiceEvent::Transcript("I feel anxious".to_string()),
            VoiceEvent::StopListening,
        ])
        .unwrap();
        assert_eq!(state.pending_message(), Some("I feel anxious"));

        let state = state
            .on(VoiceEvent::Reply { text: "Let's breathe together.".to_string(), auto_speak: true })
            .unwrap();
        assert_eq!(state, VoiceState::Speaking { utterance: "Let's breathe together.".to_string() });
        assert_eq!(state.on(VoiceEvent::SpeechEnded).unwrap(), VoiceState::Idle);
    }

    #[test]
    fn test_silence_returns_to_idle() {
        let state = drive(vec![VoiceEvent::StartListening, VoiceEvent::StopListening]).unwrap();
        assert_eq!(state, VoiceState::Idle);
    }

    #[test]
    fn test_reply_without_auto_speak() {
        let state = drive(vec![
            VoiceEvent::Submit("hello".to_string()),
            VoiceEvent::Reply { text: "hi".to_string(), auto_speak: false },
        ])
        .unwrap();
        assert_eq!(state, VoiceState::Idle);
    }

    #[test]
    fn test_listening_interrupts_speech() {
        let speaking = VoiceState::Speaking { utterance: "...".to_string() };
        let state = speaking.on(VoiceEvent::StartListening).unwrap();
        assert!(matches!(state, VoiceState::Listening { .. }));
    }

    #[test]
    fn test_invalid_transitions() {
        let speaking = VoiceState::Speaking { utterance: "...".to_string() };
        let err = speaking.on(VoiceEvent::Submit("hi".to_string())).unwrap_err();
        assert_eq!(err.state, "speaking");

        assert!(VoiceState::Idle.on(VoiceEvent::SpeechEnded).is_err());
        assert!(VoiceState::Idle.on(VoiceEvent::Submit("   ".to_string())).is_err());

        let processing = VoiceState::Processing { message: "hi".to_string() };
        assert!(processing.on(VoiceEvent::StartListening).is_err());
    }

    #[test]
    fn test_failures_reset_to_idle() {
        let state = drive(vec![VoiceEvent::StartListening, VoiceEvent::RecognitionFailed]).unwrap();
        assert_eq!(state, VoiceState::Idle);

        let state = drive(vec![VoiceEvent::Submit("hi".to_string()), VoiceEvent::RequestFailed]).unwrap();
        assert_eq!(state, VoiceState::Idle);
    }
}

//! Role-specific wording

use crate::suggestions::models::{Suggestion, SuggestionCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Manager,
    Facilitator,
    Participant,
}

impl Role {
    fn parse(role: &str) -> Option<Self> {
        match role.trim().to_lowercase().as_str() {
            "manager" | "lead" | "team lead" => Some(Role::Manager),
            "facilitator" | "organizer" | "organiser" | "host" | "chair" => Some(Role::Facilitator),
            "participant" | "attendee" | "member" => Some(Role::Participant),
            _ => None,
        }
    }
}

fn role_note(role: Role, category: SuggestionCategory) -> &'static str {
    use SuggestionCategory::*;

    match (role, category) {
        (Role::Manager, Participation) => {
            "As the manager, ask quieter team members for their view directly."
        }
        (Role::Manager, TimeManagement) => {
            "As the manager, hold owners to the dates agreed here in your next check-in."
        }
        (Role::Manager, Content) => {
            "As the manager, make sure every outcome has an accountable owner."
        }
        (Role::Manager, Structure) => {
            "As the manager, set this expectation for the meetings your team runs."
        }
        (Role::Facilitator, Participation) => {
            "As the facilitator, use round-robins or direct prompts to draw people in."
        }
        (Role::Facilitator, TimeManagement) => {
            "As the facilitator, timebox agenda items and keep a visible clock."
        }
        (Role::Facilitator, Content) => {
            "As the facilitator, pause to state decisions and owners out loud."
        }
        (Role::Facilitator, Structure) => {
            "As the facilitator, build this into the agenda you circulate beforehand."
        }
        (Role::Participant, Participation) => {
            "As a participant, share your perspective early and invite others to respond."
        }
        (Role::Participant, TimeManagement) => {
            "As a participant, confirm the dates that apply to you before the meeting ends."
        }
        (Role::Participant, Content) => {
            "As a participant, ask for the owner and due date of anything you are unsure about."
        }
        (Role::Participant, Structure) => {
            "As a participant, suggest this to the organizer for the next session."
        }
    }
}

/// Append role-specific wording to each suggestion's reasoning.
/// Unknown or missing roles leave suggestions untouched.
pub(crate) fn apply_role(suggestions: &mut [Suggestion], role: Option<&str>) {
    let Some(role) = role.and_then(Role::parse) else {
        return;
    };

    for suggestion in suggestions {
        let note = role_note(role, suggestion.category);
        if suggestion.reasoning.is_empty() {
            suggestion.reasoning = note.to_string();
        } else {
            suggestion.reasoning = format!("{} {}", suggestion.reasoning, note);
        }
    }
}

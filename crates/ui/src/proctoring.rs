//! Player-root guards: shortcut lock, context-menu suppression and the
//! penalty bridge from the proctoring collaborator.

use dioxus::document::eval;
use dioxus::prelude::{Key, Modifiers};
use lesson_core::model::PenaltyKind;
use services::LessonHandle;
use tracing::{debug, warn};

/// Letters blocked together with Ctrl/Cmd (copy, paste, save, print, view source).
const LOCKED_LETTERS: [&str; 7] = ["a", "c", "p", "s", "u", "v", "x"];

/// Letters blocked with Ctrl/Cmd+Shift (devtools).
const LOCKED_DEVTOOLS: [&str; 3] = ["c", "i", "j"];

/// Whether a key press is swallowed while a lesson is open.
#[must_use]
pub fn is_locked_shortcut(key: &Key, modifiers: Modifiers) -> bool {
    match key {
        Key::F12 | Key::PrintScreen | Key::ContextMenu => true,
        Key::Character(value) => {
            let command = modifiers.contains(Modifiers::CONTROL) || modifiers.contains(Modifiers::META);
            if !command {
                return false;
            }
            let letter = value.to_lowercase();
            if modifiers.contains(Modifiers::SHIFT) {
                LOCKED_DEVTOOLS.contains(&letter.as_str()) || LOCKED_LETTERS.contains(&letter.as_str())
            } else {
                LOCKED_LETTERS.contains(&letter.as_str())
            }
        }
        _ => false,
    }
}

/// Listens for `postMessage({ type: "penalty", label })` from the proctoring
/// frame and raises the matching penalty until the lesson stops.
pub async fn forward_penalties(lesson: LessonHandle) {
    let mut bridge = eval(PENALTY_BRIDGE_SCRIPT);
    loop {
        let label = match bridge.recv::<String>().await {
            Ok(label) => label,
            Err(err) => {
                warn!(error = ?err, "penalty bridge closed");
                return;
            }
        };
        let kind = PenaltyKind::from_label(&label);
        debug!(%label, ?kind, "penalty signal");
        if !lesson.penalty(kind) {
            return;
        }
    }
}

const PENALTY_BRIDGE_SCRIPT: &str = r#"
    window.addEventListener("message", (event) => {
        const data = event.data;
        if (data && data.type === "penalty" && typeof data.label === "string") {
            dioxus.send(data.label);
        }
    });
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_and_devtools_are_locked() {
        assert!(is_locked_shortcut(&Key::Character("c".into()), Modifiers::CONTROL));
        assert!(is_locked_shortcut(&Key::Character("V".into()), Modifiers::META));
        assert!(is_locked_shortcut(
            &Key::Character("I".into()),
            Modifiers::CONTROL | Modifiers::SHIFT
        ));
        assert!(is_locked_shortcut(&Key::F12, Modifiers::empty()));
    }

    #[test]
    fn plain_typing_passes() {
        assert!(!is_locked_shortcut(&Key::Character("c".into()), Modifiers::empty()));
        assert!(!is_locked_shortcut(&Key::Character("i".into()), Modifiers::CONTROL));
        assert!(!is_locked_shortcut(&Key::Enter, Modifiers::empty()));
    }
}

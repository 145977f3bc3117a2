use serde::{Deserialize, Serialize};

/// Proctoring event kinds that force a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PenaltyKind {
    Speaking,
    FacesCount,
    Blur,
    Focus,
    Other,
}

impl PenaltyKind {
    /// Parses the labels emitted by the proctoring collaborator.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Speaking" => Self::Speaking,
            "Faces Count" => Self::FacesCount,
            "Blur" => Self::Blur,
            "Focus" => Self::Focus,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Speaking => "Speaking detected! 1 penalty point added.",
            Self::FacesCount => "Multiple faces detected! 1 penalty point added.",
            Self::Blur => "Screen is blurred! 1 penalty point added.",
            Self::Focus => "Not focused! 1 penalty point added.",
            Self::Other => "Proctoring violation! 1 penalty point added.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_map_to_kinds() {
        assert_eq!(PenaltyKind::from_label("Faces Count"), PenaltyKind::FacesCount);
        assert_eq!(PenaltyKind::from_label("Speaking"), PenaltyKind::Speaking);
        assert_eq!(PenaltyKind::from_label("???"), PenaltyKind::Other);
    }
}

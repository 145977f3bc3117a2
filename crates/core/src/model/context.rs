use serde::{Deserialize, Serialize};

use crate::model::ids::{CourseId, CourseInstanceId, ModuleId, SectionId};

/// Identifiers that scope a lesson run and are forwarded to remote services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonContext {
    pub course_id: CourseId,
    pub course_instance_id: CourseInstanceId,
    pub section_id: SectionId,
    pub module_id: Option<ModuleId>,
    pub student_id: Option<String>,
}

impl LessonContext {
    /// Context for a course whose enrolment id equals the course id, as the
    /// section list hands it over.
    #[must_use]
    pub fn for_course(course_id: CourseId, section_id: SectionId) -> Self {
        Self {
            course_id,
            course_instance_id: CourseInstanceId::new(course_id.value()),
            section_id,
            module_id: None,
            student_id: None,
        }
    }

    #[must_use]
    pub fn with_module(mut self, module_id: ModuleId) -> Self {
        self.module_id = Some(module_id);
        self
    }

    /// Blank ids are ignored.
    #[must_use]
    pub fn with_student(mut self, student_id: impl Into<String>) -> Self {
        let id = student_id.into();
        self.student_id = (!id.trim().is_empty()).then(|| id.trim().to_owned());
        self
    }
}

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed leading columns present in every submissions table, before the
/// per-question columns.
pub const FIXED_HEADERS: [&str; 2] = ["Reference", "Submitted at"];

/// The set of questions a form asks, in presentation order. The order here
/// determines the table column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormDefinition {
    pub questions: Vec<String>,
}

impl FormDefinition {
    pub fn new(questions: Vec<String>) -> Self {
        Self { questions }
    }

    /// Header labels for the submissions table: the fixed columns followed by
    /// one label per question.
    pub fn header_labels(&self) -> Vec<String> {
        FIXED_HEADERS
            .iter()
            .map(|h| h.to_string())
            .chain(self.questions.iter().cloned())
            .collect()
    }

    pub fn column_count(&self) -> usize {
        FIXED_HEADERS.len() + self.questions.len()
    }
}

/// One filled-in form, destined for a row of the submissions table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub reference: String,
    pub submitted_at: DateTime<Utc>,
    /// One answer per form question, in form-definition order.
    pub answers: Vec<String>,
}

impl Submission {
    /// Row cells aligned with [`FormDefinition::header_labels`]. Rejects
    /// submissions whose answer count does not match the form.
    pub fn to_row(&self, form: &FormDefinition) -> Result<Vec<String>> {
        if self.answers.len() != form.questions.len() {
            return Err(AppError::Input(format!(
                "form has {} questions but submission has {} answers",
                form.questions.len(),
                self.answers.len()
            )));
        }

        let mut row = Vec::with_capacity(form.column_count());
        row.push(self.reference.clone());
        row.push(self.submitted_at.to_rfc3339());
        row.extend(self.answers.iter().cloned());
        Ok(row)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_labels_order() {
        let form = test_helpers::mock_form();
        assert_eq!(
            form.header_labels(),
            vec![
                "Reference",
                "Submitted at",
                "What’s your name?",
                "When’s your date of birth?",
                "What’s your address?",
            ]
        );
        assert_eq!(form.column_count(), 5);
    }

    #[test]
    fn test_header_labels_without_questions() {
        let form = FormDefinition::new(vec![]);
        assert_eq!(form.header_labels(), vec!["Reference", "Submitted at"]);
        assert_eq!(form.column_count(), 2);
    }

    #[test]
    fn test_submission_row_alignment() {
        let form = test_helpers::mock_form();
        let submission = test_helpers::mock_submission();

        let row = submission.to_row(&form).unwrap();
        assert_eq!(
            row,
            vec![
                "AAAAAA",
                "2026-01-26T10:48:00+00:00",
                "Form Filler",
                "1990-01-01",
                "1 Fake Street, Notatown, AA1 2AA",
            ]
        );
    }

    #[test]
    fn test_submission_answer_count_mismatch() {
        let form = test_helpers::mock_form();
        let mut submission = test_helpers::mock_submission();
        submission.answers.pop();

        let err = submission.to_row(&form).unwrap_err();
        assert!(matches!(err, AppError::Input(_)), "got {:?}", err);
    }
}

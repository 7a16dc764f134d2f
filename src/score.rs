use crate::quiz::{AnswerSheet, Question, QuizResult};

/// Which review entries to keep.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReviewMode {
    All,
    IncorrectOnly,
}

/// One row of the per-question breakdown shown on the results screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewItem {
    pub index: usize,
    pub question: Question,
    pub user_answer: Option<usize>,
    pub is_correct: bool,
}

/// Scores a finished answer sheet. A question is correct iff the sheet holds
/// the question's correct option index; a missing entry is always wrong.
/// Pure and deterministic so it can be exercised without a session.
pub fn compute_result(
    questions: &[Question],
    answers: &AnswerSheet,
    time_spent_seconds: u32,
) -> QuizResult {
    let score = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(i) == Some(&q.correct_index))
        .count();

    QuizResult {
        score,
        total: questions.len(),
        answers: answers.clone(),
        time_spent_seconds,
    }
}

/// Per-question breakdown in original question order. `IncorrectOnly` drops
/// the entries the user got right.
pub fn review(questions: &[Question], answers: &AnswerSheet, mode: ReviewMode) -> Vec<ReviewItem> {
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let user_answer = answers.get(&index).copied();
            ReviewItem {
                index,
                question: question.clone(),
                user_answer,
                is_correct: user_answer == Some(question.correct_index),
            }
        })
        .filter(|item| mode == ReviewMode::All || !item.is_correct)
        .collect()
}

/// Display percentage, rounded half-up. An empty question set cannot occur in
/// a real session but still reads as 0%.
pub fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((100.0 * score as f64) / total as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::AnswerSheet;

    fn questions(correct: &[usize]) -> Vec<Question> {
        correct
            .iter()
            .map(|&c| Question {
                text: format!("question with answer {}", c),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_index: c,
                explanation: "because".into(),
            })
            .collect()
    }

    fn sheet(entries: &[(usize, usize)]) -> AnswerSheet {
        entries.iter().copied().collect()
    }

    #[test]
    fn score_counts_matching_answers() {
        let qs = questions(&[0, 2, 3]);
        let answers = sheet(&[(0, 0), (1, 1), (2, 3)]);

        let result = compute_result(&qs, &answers, 42);

        assert_eq!(result.score, 2);
        assert_eq!(result.total, 3);
        assert_eq!(result.time_spent_seconds, 42);
    }

    #[test]
    fn missing_answers_count_wrong() {
        let qs = questions(&[1, 1, 1]);
        let result = compute_result(&qs, &AnswerSheet::new(), 0);

        assert_eq!(result.score, 0);
        assert_eq!(result.total, 3);
        assert!(result.answers.is_empty());
    }

    #[test]
    fn score_never_exceeds_total() {
        let qs = questions(&[0, 1]);
        // Stray keys outside the question range must not inflate the score.
        let answers = sheet(&[(0, 0), (1, 1), (7, 0)]);

        let result = compute_result(&qs, &answers, 10);
        assert!(result.score <= result.total);
        assert_eq!(result.score, 2);
    }

    #[test]
    fn compute_result_is_idempotent() {
        let qs = questions(&[3, 0, 2, 1]);
        let answers = sheet(&[(0, 3), (2, 0)]);

        let first = compute_result(&qs, &answers, 99);
        let second = compute_result(&qs, &answers, 99);
        assert_eq!(first, second);
    }

    #[test]
    fn review_all_preserves_question_order() {
        let qs = questions(&[0, 1, 2]);
        let answers = sheet(&[(1, 1)]);

        let items = review(&qs, &answers, ReviewMode::All);
        assert_eq!(items.len(), 3);
        assert_eq!(
            items.iter().map(|i| i.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(!items[0].is_correct);
        assert!(items[1].is_correct);
        assert_eq!(items[0].user_answer, None);
        assert_eq!(items[1].user_answer, Some(1));
    }

    #[test]
    fn incorrect_only_is_ordered_subset_of_all() {
        let qs = questions(&[0, 1, 2, 3]);
        let answers = sheet(&[(0, 0), (1, 0), (3, 3)]);

        let all = review(&qs, &answers, ReviewMode::All);
        let incorrect = review(&qs, &answers, ReviewMode::IncorrectOnly);

        assert_eq!(
            incorrect.iter().map(|i| i.index).collect::<Vec<_>>(),
            vec![1, 2]
        );
        let all_indices: Vec<usize> = all
            .iter()
            .filter(|i| !i.is_correct)
            .map(|i| i.index)
            .collect();
        assert_eq!(
            incorrect.iter().map(|i| i.index).collect::<Vec<_>>(),
            all_indices
        );
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13); // 12.5 rounds up
        assert_eq!(percentage(0, 5), 0);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn percentage_of_empty_set_is_zero() {
        assert_eq!(percentage(0, 0), 0);
    }
}

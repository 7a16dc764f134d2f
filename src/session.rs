use crate::quiz::{AnswerSheet, Question, QuizConfig, QuizMode, QuizResult};
use crate::score;

/// Where the session stands on the current question.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// No option chosen yet
    Answering,
    /// Option chosen in exam mode, may still be changed
    AnsweredUnlocked,
    /// Option chosen in guided mode, feedback not yet shown
    AnsweredPendingReveal,
    /// Guided mode feedback visible, input locked
    Revealed,
    /// Terminal
    Finished,
}

/// One attempt at a generated question set, from the first question through
/// scoring. Mutated only by user input and the one-second tick, both
/// serialized through the event loop.
#[derive(Debug, Clone)]
pub struct QuizSession {
    pub questions: Vec<Question>,
    pub mode: QuizMode,
    pub current_index: usize,
    /// Current-question selection. In guided mode this is a candidate that
    /// only commits to the sheet on the first advance.
    pub selection: Option<usize>,
    pub answers: AnswerSheet,
    pub seconds_remaining: u32,
    pub seconds_elapsed: u32,
    pub phase: Phase,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>, config: &QuizConfig) -> Self {
        Self {
            questions,
            mode: config.mode,
            current_index: 0,
            selection: None,
            answers: AnswerSheet::new(),
            seconds_remaining: config.duration_minutes * 60,
            seconds_elapsed: 0,
            phase: Phase::Answering,
        }
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn revealed(&self) -> bool {
        self.phase == Phase::Revealed
    }

    /// The primary action is only enabled once an option is selected or the
    /// current question has been revealed.
    pub fn can_advance(&self) -> bool {
        !self.is_finished() && (self.selection.is_some() || self.revealed())
    }

    /// Records a selection for the current question. In exam mode the answer
    /// sheet is updated immediately and re-selecting overwrites (last write
    /// wins). In guided mode the choice stays a candidate until the first
    /// advance. Locked once revealed or finished; out-of-range indices are
    /// ignored.
    pub fn select_option(&mut self, option_index: usize) {
        if matches!(self.phase, Phase::Revealed | Phase::Finished) {
            return;
        }
        if option_index >= self.current_question().options.len() {
            return;
        }

        self.selection = Some(option_index);
        match self.mode {
            QuizMode::Exam => {
                self.answers.insert(self.current_index, option_index);
                self.phase = Phase::AnsweredUnlocked;
            }
            QuizMode::Guided => {
                self.phase = Phase::AnsweredPendingReveal;
            }
        }
    }

    /// Drives the primary action. In exam mode this moves to the next
    /// question or finishes. In guided mode the first advance after a
    /// selection commits it and reveals feedback without changing the
    /// question; the next advance moves on. A no-op while nothing is
    /// selected and nothing is revealed.
    pub fn advance(&mut self) {
        if !self.can_advance() {
            return;
        }

        match self.phase {
            Phase::AnsweredPendingReveal => {
                if let Some(selected) = self.selection {
                    self.answers.insert(self.current_index, selected);
                }
                self.phase = Phase::Revealed;
            }
            Phase::Revealed | Phase::AnsweredUnlocked => {
                if self.is_last_question() {
                    self.finish();
                } else {
                    self.next_question();
                }
            }
            Phase::Answering | Phase::Finished => {}
        }
    }

    /// One-second timer tick. Stops mutating once the session is finished,
    /// so late ticks after the forced finish or the screen switch are
    /// harmless. Reaching zero force-finishes with whatever answers have
    /// been committed; an unrevealed guided-mode candidate is discarded.
    pub fn on_tick(&mut self) {
        if self.is_finished() {
            return;
        }

        self.seconds_elapsed += 1;
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);

        if self.seconds_remaining == 0 {
            self.finish();
        }
    }

    pub fn result(&self) -> QuizResult {
        score::compute_result(&self.questions, &self.answers, self.seconds_elapsed)
    }

    fn next_question(&mut self) {
        self.current_index += 1;
        self.selection = None;
        self.phase = Phase::Answering;
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{Difficulty, Question, QuizConfig, QuizMode, SourceFile};
    use assert_matches::assert_matches;

    fn question(correct: usize) -> Question {
        Question {
            text: "pick one".into(),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_index: correct,
            explanation: "reasons".into(),
        }
    }

    fn config(mode: QuizMode, duration_minutes: u32) -> QuizConfig {
        QuizConfig {
            topic: "testing".into(),
            sources: Vec::<SourceFile>::new(),
            duration_minutes,
            question_count: 3,
            mode,
            difficulty: Difficulty::Medium,
        }
    }

    fn session(mode: QuizMode, corrects: &[usize], duration_minutes: u32) -> QuizSession {
        QuizSession::new(
            corrects.iter().map(|&c| question(c)).collect(),
            &config(mode, duration_minutes),
        )
    }

    #[test]
    fn new_session_starts_answering() {
        let s = session(QuizMode::Exam, &[0, 1, 2], 1);
        assert_eq!(s.phase, Phase::Answering);
        assert_eq!(s.current_index, 0);
        assert_eq!(s.seconds_remaining, 60);
        assert_eq!(s.seconds_elapsed, 0);
        assert!(s.answers.is_empty());
    }

    #[test]
    fn advance_without_selection_is_a_no_op() {
        let mut s = session(QuizMode::Exam, &[0, 1], 1);
        assert!(!s.can_advance());

        s.advance();
        assert_eq!(s.phase, Phase::Answering);
        assert_eq!(s.current_index, 0);
    }

    #[test]
    fn exam_selection_commits_immediately_and_last_write_wins() {
        let mut s = session(QuizMode::Exam, &[3, 0], 1);

        s.select_option(1);
        assert_eq!(s.phase, Phase::AnsweredUnlocked);
        assert_eq!(s.answers.get(&0), Some(&1));

        s.select_option(3);
        assert_eq!(s.answers.get(&0), Some(&3));
        assert_eq!(s.phase, Phase::AnsweredUnlocked);
    }

    #[test]
    fn exam_advance_moves_on_and_clears_selection() {
        let mut s = session(QuizMode::Exam, &[0, 1, 2], 1);

        s.select_option(0);
        s.advance();

        assert_eq!(s.current_index, 1);
        assert_eq!(s.selection, None);
        assert_eq!(s.phase, Phase::Answering);
    }

    #[test]
    fn exam_finishes_after_last_question() {
        let mut s = session(QuizMode::Exam, &[0, 1], 1);

        s.select_option(0);
        s.advance();
        s.select_option(1);
        s.advance();

        assert!(s.is_finished());
        let result = s.result();
        assert_eq!(result.score, 2);
        assert_eq!(result.total, 2);
    }

    #[test]
    fn guided_commit_happens_on_first_advance() {
        let mut s = session(QuizMode::Guided, &[2, 0, 1], 1);

        s.select_option(2);
        assert_eq!(s.phase, Phase::AnsweredPendingReveal);
        // Candidate only; the sheet is still empty.
        assert!(s.answers.is_empty());

        s.advance();
        assert_eq!(s.phase, Phase::Revealed);
        assert_eq!(s.current_index, 0);
        assert_eq!(s.answers.get(&0), Some(&2));

        s.advance();
        assert_eq!(s.current_index, 1);
        assert_eq!(s.phase, Phase::Answering);
        assert_eq!(s.selection, None);
    }

    #[test]
    fn guided_selection_after_reveal_is_locked() {
        let mut s = session(QuizMode::Guided, &[1, 0], 1);

        s.select_option(1);
        s.advance();
        assert!(s.revealed());

        s.select_option(3);
        assert_eq!(s.answers.get(&0), Some(&1));
        assert_eq!(s.selection, Some(1));
    }

    #[test]
    fn guided_finishes_from_reveal_on_last_question() {
        let mut s = session(QuizMode::Guided, &[0], 1);
        assert!(s.is_last_question());

        s.select_option(0);
        s.advance();
        assert!(s.revealed());
        s.advance();

        assert!(s.is_finished());
        assert_eq!(s.result().score, 1);
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let mut s = session(QuizMode::Exam, &[0], 1);
        s.select_option(4);
        assert_eq!(s.selection, None);
        assert_matches!(s.phase, Phase::Answering);
    }

    #[test]
    fn tick_counts_time_both_ways() {
        let mut s = session(QuizMode::Exam, &[0], 2);
        s.on_tick();
        s.on_tick();
        assert_eq!(s.seconds_elapsed, 2);
        assert_eq!(s.seconds_remaining, 118);
    }

    #[test]
    fn exam_times_out_with_empty_sheet() {
        let mut s = session(QuizMode::Exam, &[0, 1, 2], 1);

        for _ in 0..60 {
            s.on_tick();
        }

        assert!(s.is_finished());
        let result = s.result();
        assert_eq!(result.total, 3);
        assert_eq!(result.score, 0);
        assert!(result.answers.is_empty());
        assert_eq!(result.time_spent_seconds, 60);
    }

    #[test]
    fn timeout_discards_unrevealed_guided_candidate() {
        let mut s = session(QuizMode::Guided, &[1, 0], 1);

        s.select_option(1);
        for _ in 0..60 {
            s.on_tick();
        }

        assert!(s.is_finished());
        // The in-progress selection was never committed.
        assert!(s.answers.is_empty());
        assert_eq!(s.result().score, 0);
    }

    #[test]
    fn timeout_mid_question_does_not_lose_committed_answers() {
        let mut s = session(QuizMode::Exam, &[0, 1, 2], 1);

        s.select_option(0);
        s.advance();
        // Question 1 is on screen with no answer recorded when time runs out.
        for _ in 0..60 {
            s.on_tick();
        }

        assert!(s.is_finished());
        let result = s.result();
        assert_eq!(result.score, 1);
        assert_eq!(result.answers.len(), 1);
    }

    #[test]
    fn ticks_after_finish_are_no_ops() {
        let mut s = session(QuizMode::Exam, &[0], 1);
        s.select_option(0);
        s.advance();
        assert!(s.is_finished());

        let elapsed = s.seconds_elapsed;
        s.on_tick();
        s.on_tick();
        assert_eq!(s.seconds_elapsed, elapsed);
    }

    #[test]
    fn input_after_finish_is_a_no_op() {
        let mut s = session(QuizMode::Exam, &[0, 1], 1);
        for _ in 0..60 {
            s.on_tick();
        }
        assert!(s.is_finished());

        s.select_option(0);
        s.advance();
        assert!(s.answers.is_empty());
        assert_eq!(s.current_index, 0);
    }

    #[test]
    fn single_question_session_has_no_advance_ambiguity() {
        let mut s = session(QuizMode::Exam, &[2], 1);
        assert!(s.is_last_question());

        s.select_option(2);
        s.advance();

        assert!(s.is_finished());
        let result = s.result();
        assert_eq!(result.total, 1);
        assert_eq!(result.score, 1);
    }
}

use crate::client::RequestError;
use crate::models::RecommendationRecord;

/// Ticks the detail panel takes to slide fully in or out.
pub const SLIDE_TICKS: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading { seq: u64 },
    Populated(Vec<RecommendationRecord>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Closed,
    Open {
        index: usize,
        record: RecommendationRecord,
        progress: u8,
    },
    /// The record is kept around until the exit slide finishes.
    Closing {
        index: usize,
        record: RecommendationRecord,
        progress: u8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

#[derive(Debug)]
pub struct ResultsView {
    phase: Phase,
    selection: Selection,
    last_seq: u64,
}

impl Default for ResultsView {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsView {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            selection: Selection::Closed,
            last_seq: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[cfg(test)]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    pub fn records(&self) -> &[RecommendationRecord] {
        match &self.phase {
            Phase::Populated(records) => records,
            _ => &[],
        }
    }

    /// Enters Loading and returns the sequence number the response must carry.
    /// Any previous list, error and selection are dropped immediately.
    pub fn begin(&mut self) -> u64 {
        self.last_seq += 1;
        self.phase = Phase::Loading { seq: self.last_seq };
        self.selection = Selection::Closed;
        self.last_seq
    }

    /// Applies a response if it belongs to the request currently in flight.
    pub fn resolve(
        &mut self,
        seq: u64,
        result: Result<Vec<RecommendationRecord>, RequestError>,
    ) -> Resolution {
        match self.phase {
            Phase::Loading { seq: current } if current == seq => {}
            _ => return Resolution::Stale,
        }
        self.phase = match result {
            Ok(records) => Phase::Populated(records),
            Err(e) => Phase::Failed(e.to_string()),
        };
        Resolution::Applied
    }

    /// Opens the detail panel on one record of the current list. Returns
    /// false when there is nothing at `index` to show.
    pub fn open(&mut self, index: usize) -> bool {
        let Some(record) = self.records().get(index).cloned() else {
            return false;
        };
        self.selection = Selection::Open {
            index,
            record,
            progress: 0,
        };
        true
    }

    pub fn close(&mut self) {
        if let Selection::Open {
            index,
            record,
            progress,
        } = std::mem::replace(&mut self.selection, Selection::Closed)
        {
            self.selection = Selection::Closing {
                index,
                record,
                progress,
            };
        }
    }

    /// Advances the slide animation by one step.
    pub fn tick(&mut self) {
        match &mut self.selection {
            Selection::Open { progress, .. } => {
                *progress = (*progress + 1).min(SLIDE_TICKS);
            }
            Selection::Closing { progress, .. } => {
                if *progress <= 1 {
                    self.selection = Selection::Closed;
                } else {
                    *progress -= 1;
                }
            }
            Selection::Closed => {}
        }
    }

    /// The record shown in the detail panel, whether opening or closing.
    pub fn detail(&self) -> Option<(&RecommendationRecord, u8)> {
        match &self.selection {
            Selection::Open {
                record, progress, ..
            }
            | Selection::Closing {
                record, progress, ..
            } => Some((record, *progress)),
            Selection::Closed => None,
        }
    }

    pub fn is_detail_open(&self) -> bool {
        matches!(self.selection, Selection::Open { .. })
    }

    pub fn open_index(&self) -> Option<usize> {
        match &self.selection {
            Selection::Open { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, company: &str) -> RecommendationRecord {
        RecommendationRecord {
            title: title.to_string(),
            company: company.to_string(),
            ..Default::default()
        }
    }

    fn populated(records: Vec<RecommendationRecord>) -> ResultsView {
        let mut view = ResultsView::new();
        let seq = view.begin();
        assert_eq!(view.resolve(seq, Ok(records)), Resolution::Applied);
        view
    }

    #[test]
    fn test_starts_idle() {
        let view = ResultsView::new();
        assert_eq!(view.phase(), &Phase::Idle);
        assert_eq!(view.selection(), &Selection::Closed);
        assert!(view.records().is_empty());
    }

    #[test]
    fn test_success_populates() {
        let view = populated(vec![record("A", "X")]);
        assert_eq!(view.records(), &[record("A", "X")]);
    }

    #[test]
    fn test_empty_success_is_not_idle() {
        let view = populated(Vec::new());
        assert_eq!(view.phase(), &Phase::Populated(Vec::new()));
        assert_ne!(view.phase(), &Phase::Idle);
    }

    #[test]
    fn test_failure_carries_message() {
        let mut view = ResultsView::new();
        let seq = view.begin();
        view.resolve(
            seq,
            Err(RequestError::Status {
                status: 500,
                message: "internal error".to_string(),
            }),
        );
        match view.phase() {
            Phase::Failed(message) => assert!(message.contains("internal error")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_begin_clears_previous_list_and_selection() {
        let mut view = populated(vec![record("A", "X"), record("B", "Y")]);
        assert!(view.open(1));

        view.begin();

        assert!(view.is_loading());
        assert!(view.records().is_empty());
        assert_eq!(view.selection(), &Selection::Closed);
    }

    #[test]
    fn test_begin_clears_previous_error() {
        let mut view = ResultsView::new();
        let seq = view.begin();
        view.resolve(seq, Err(RequestError::Transport("down".to_string())));

        view.begin();
        assert!(matches!(view.phase(), Phase::Loading { .. }));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut view = ResultsView::new();
        let first = view.begin();
        let second = view.begin();
        assert!(second > first);

        assert_eq!(view.resolve(second, Ok(vec![record("new", "N")])), Resolution::Applied);
        assert_eq!(view.resolve(first, Ok(vec![record("old", "O")])), Resolution::Stale);

        assert_eq!(view.records(), &[record("new", "N")]);
    }

    #[test]
    fn test_stale_failure_does_not_clobber_loading() {
        let mut view = ResultsView::new();
        let first = view.begin();
        let second = view.begin();

        view.resolve(first, Err(RequestError::Transport("late".to_string())));
        assert_eq!(view.phase(), &Phase::Loading { seq: second });
    }

    #[test]
    fn test_response_after_resolution_is_stale() {
        let mut view = ResultsView::new();
        let seq = view.begin();
        view.resolve(seq, Ok(vec![record("A", "X")]));
        assert_eq!(view.resolve(seq, Ok(Vec::new())), Resolution::Stale);
        assert_eq!(view.records().len(), 1);
    }

    #[test]
    fn test_open_requires_populated_record() {
        let mut view = ResultsView::new();
        assert!(!view.open(0));

        view.begin();
        assert!(!view.open(0));

        let mut view = populated(Vec::new());
        assert!(!view.open(0));

        let mut view = populated(vec![record("A", "X")]);
        assert!(!view.open(1));
        assert!(view.open(0));
    }

    #[test]
    fn test_select_close_reopen_replaces_record() {
        let mut view = populated(vec![record("A", "X"), record("B", "Y")]);

        view.open(0);
        assert_eq!(view.detail().map(|(r, _)| r), Some(&record("A", "X")));

        view.close();
        view.open(1);
        assert_eq!(view.detail().map(|(r, _)| r), Some(&record("B", "Y")));
        assert_eq!(view.open_index(), Some(1));
    }

    #[test]
    fn test_closing_retains_record_until_slide_finishes() {
        let mut view = populated(vec![record("A", "X")]);
        view.open(0);
        for _ in 0..SLIDE_TICKS {
            view.tick();
        }
        assert_eq!(view.detail().map(|(_, p)| p), Some(SLIDE_TICKS));

        view.close();
        assert!(!view.is_detail_open());
        assert_eq!(view.detail().map(|(r, _)| r), Some(&record("A", "X")));

        for _ in 0..SLIDE_TICKS {
            view.tick();
        }
        assert_eq!(view.selection(), &Selection::Closed);
        assert!(view.detail().is_none());
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let mut view = populated(vec![record("A", "X")]);
        view.close();
        assert_eq!(view.selection(), &Selection::Closed);
    }
}

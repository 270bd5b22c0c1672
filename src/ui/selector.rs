use std::rc::Rc;

use dioxus::prelude::*;

use crate::domain::entities::record::RecordId;
use crate::ui::keyboard::{KeyPress, KeyRegistry};
use crate::ui::style::{modal_overlay_style, modal_panel_style};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorCandidate {
    pub record_id: RecordId,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorAction {
    Moved(usize),
    Submitted(usize),
    NotHandled,
}

/// Typeahead picker state: one selection index over the candidate list,
/// clamped to its bounds. Replacing the candidates resets the index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectorState {
    candidates: Vec<SelectorCandidate>,
    selection_index: usize,
}

impl SelectorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidates(&self) -> &[SelectorCandidate] {
        &self.candidates
    }

    pub fn selection_index(&self) -> usize {
        self.selection_index
    }

    pub fn selected(&self) -> Option<&SelectorCandidate> {
        self.candidates.get(self.selection_index)
    }

    pub fn set_candidates(&mut self, candidates: Vec<SelectorCandidate>) {
        self.candidates = candidates;
        self.selection_index = 0;
    }

    pub fn handle_key(&mut self, key: KeyPress) -> SelectorAction {
        if self.candidates.is_empty() {
            return SelectorAction::NotHandled;
        }
        match key {
            KeyPress::ArrowDown => {
                self.selection_index = (self.selection_index + 1).min(self.candidates.len() - 1);
                SelectorAction::Moved(self.selection_index)
            }
            KeyPress::ArrowUp => {
                self.selection_index = self.selection_index.saturating_sub(1);
                SelectorAction::Moved(self.selection_index)
            }
            KeyPress::Enter => SelectorAction::Submitted(self.selection_index),
            _ => SelectorAction::NotHandled,
        }
    }
}

/// Modal record picker. Acquires the global keydown scope while mounted;
/// the scope guard is dropped with the component, so the listener never
/// outlives it.
#[component]
pub fn RecordSelector(
    registry: KeyRegistry,
    selector: Signal<SelectorState>,
    query: Signal<String>,
    on_query: EventHandler<String>,
    on_submit: EventHandler<usize>,
    on_close: EventHandler<()>,
) -> Element {
    let _scope = use_hook(|| {
        Rc::new(registry.acquire(move |key| {
            let mut selector = selector;
            let action = selector.write().handle_key(key);
            match action {
                SelectorAction::Moved(_) => true,
                SelectorAction::Submitted(index) => {
                    on_submit.call(index);
                    true
                }
                SelectorAction::NotHandled => {
                    if key == KeyPress::Escape {
                        on_close.call(());
                        true
                    } else {
                        false
                    }
                }
            }
        }))
    });

    let state = selector();

    rsx! {
        div {
            style: "{modal_overlay_style()}",
            onclick: move |_| on_close.call(()),
            div {
                style: "{modal_panel_style()}",
                onclick: move |event| event.stop_propagation(),
                div { style: "margin-bottom: 8px; font-weight: 600;", "Go to record" }
                input {
                    style: "width: 100%; box-sizing: border-box; padding: 6px; margin-bottom: 8px;",
                    placeholder: "Search records",
                    value: query(),
                    autofocus: true,
                    oninput: move |event| on_query.call(event.value()),
                }
                div {
                    style: "max-height: 280px; overflow-y: auto; border: 1px solid #ddd;",
                    if state.candidates().is_empty() {
                        div { style: "padding: 8px; color: #999;", "No matching records" }
                    }
                    {state.candidates().iter().enumerate().map(|(index, candidate)| {
                        let background = if index == state.selection_index() {
                            "var(--cell-bg-selected)"
                        } else {
                            "transparent"
                        };
                        let summary = candidate.summary.clone();
                        rsx!(
                            div {
                                style: "padding: 6px 8px; cursor: pointer; background: {background};",
                                onclick: move |_| on_submit.call(index),
                                "{summary}"
                            }
                        )
                    })}
                }
                div { style: "margin-top: 8px; color: #999; font-size: 12px;",
                    "Arrow keys to move, Enter to jump, Esc to close"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(count: usize) -> Vec<SelectorCandidate> {
        (0..count)
            .map(|index| SelectorCandidate {
                record_id: RecordId(index as i64),
                summary: format!("record {index}"),
            })
            .collect()
    }

    #[test]
    fn arrow_down_stabilizes_at_the_last_candidate() {
        let mut state = SelectorState::new();
        state.set_candidates(candidates(3));

        for _ in 0..10 {
            state.handle_key(KeyPress::ArrowDown);
        }

        assert_eq!(state.selection_index(), 2);
    }

    #[test]
    fn arrow_up_stays_at_zero() {
        let mut state = SelectorState::new();
        state.set_candidates(candidates(3));

        for _ in 0..5 {
            state.handle_key(KeyPress::ArrowUp);
        }

        assert_eq!(state.selection_index(), 0);
    }

    #[test]
    fn enter_submits_exactly_the_selected_row() {
        let mut state = SelectorState::new();
        state.set_candidates(candidates(4));
        state.handle_key(KeyPress::ArrowDown);
        state.handle_key(KeyPress::ArrowDown);

        let action = state.handle_key(KeyPress::Enter);

        assert_eq!(action, SelectorAction::Submitted(2));
        assert_eq!(
            state.selected().map(|candidate| candidate.record_id),
            Some(RecordId(2))
        );
    }

    #[test]
    fn empty_candidate_lists_handle_nothing() {
        let mut state = SelectorState::new();
        assert_eq!(state.handle_key(KeyPress::ArrowDown), SelectorAction::NotHandled);
        assert_eq!(state.handle_key(KeyPress::Enter), SelectorAction::NotHandled);
    }

    #[test]
    fn replacing_candidates_resets_the_selection() {
        let mut state = SelectorState::new();
        state.set_candidates(candidates(5));
        for _ in 0..4 {
            state.handle_key(KeyPress::ArrowDown);
        }
        assert_eq!(state.selection_index(), 4);

        state.set_candidates(candidates(2));
        assert_eq!(state.selection_index(), 0);
    }
}

//! Page-window paginator for the grid.
//!
//! The paginator does not fetch anything. It turns the collection's
//! [`PagingState`] into a list of page handles and reports which page the
//! user asked for; the host loads that page and hands the new state back.

use crate::key::{self, KeyMap as KeyMapTrait};
use crate::record::PagingState;
use bubbletea_rs::{KeyMsg, Msg};
use lipgloss_extras::prelude::*;

/// Key bindings for page navigation.
///
/// # Examples
///
/// ```rust
/// use bubbletea_datagrid::paginator::PaginatorKeyMap;
/// use bubbletea_datagrid::key;
///
/// let keymap = PaginatorKeyMap {
///     prev_page: key::new_binding(vec![
///         key::with_keys_str(&["["]),
///         key::with_help("[", "previous page"),
///     ]),
///     next_page: key::new_binding(vec![
///         key::with_keys_str(&["]"]),
///         key::with_help("]", "next page"),
///     ]),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct PaginatorKeyMap {
    /// Previous page. Default: PageUp.
    pub prev_page: key::Binding,
    /// Next page. Default: PageDown.
    pub next_page: key::Binding,
}

impl Default for PaginatorKeyMap {
    fn default() -> Self {
        Self {
            prev_page: key::new_binding(vec![
                key::with_keys_str(&["pgup"]),
                key::with_help("pgup", "prev page"),
            ]),
            next_page: key::new_binding(vec![
                key::with_keys_str(&["pgdown"]),
                key::with_help("pgdown", "next page"),
            ]),
        }
    }
}

impl KeyMapTrait for PaginatorKeyMap {
    fn short_help(&self) -> Vec<&key::Binding> {
        vec![&self.prev_page, &self.next_page]
    }

    fn full_help(&self) -> Vec<Vec<&key::Binding>> {
        vec![vec![&self.prev_page, &self.next_page]]
    }
}

/// A page the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// The first page.
    First,
    /// The page before the current one.
    Previous,
    /// The page after the current one.
    Next,
    /// The last page.
    Last,
    /// A page by index.
    Page(i64),
}

/// What activating a handle does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleTarget {
    /// Fast-forward to the first page.
    First,
    /// Fast-forward to the previous page.
    Previous,
    /// Fast-forward to the next page.
    Next,
    /// Fast-forward to the last page.
    Last,
    /// A numbered page.
    Page(i64),
    /// Ellipsis; inert.
    Gap,
}

/// One clickable paginator entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHandle {
    /// Text shown.
    pub label: String,
    /// Action on activation.
    pub target: HandleTarget,
    /// The current page.
    pub active: bool,
    /// Fast-forward handle with nowhere to go.
    pub disabled: bool,
}

impl PageHandle {
    fn page(index: i64, state: &PagingState) -> Self {
        Self {
            label: (index - state.first_page + 1).to_string(),
            target: HandleTarget::Page(index),
            active: index == state.current_page,
            disabled: false,
        }
    }

    fn gap() -> Self {
        Self {
            label: "…".to_string(),
            target: HandleTarget::Gap,
            active: false,
            disabled: false,
        }
    }

    fn fast_forward(label: &str, target: HandleTarget, enabled: bool) -> Self {
        Self {
            label: label.to_string(),
            target,
            active: false,
            disabled: !enabled,
        }
    }

    /// The request this handle makes, or `None` for inert handles.
    pub fn request(&self) -> Option<PageRequest> {
        if self.active || self.disabled {
            return None;
        }
        match self.target {
            HandleTarget::First => Some(PageRequest::First),
            HandleTarget::Previous => Some(PageRequest::Previous),
            HandleTarget::Next => Some(PageRequest::Next),
            HandleTarget::Last => Some(PageRequest::Last),
            HandleTarget::Page(index) => Some(PageRequest::Page(index)),
            HandleTarget::Gap => None,
        }
    }
}

/// Labels of the fast-forward handles; `None` leaves a handle out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastForward {
    /// Jump to the first page.
    pub first: Option<String>,
    /// Previous page.
    pub prev: Option<String>,
    /// Next page.
    pub next: Option<String>,
    /// Jump to the last page.
    pub last: Option<String>,
}

impl Default for FastForward {
    fn default() -> Self {
        Self {
            first: None,
            prev: Some("‹".to_string()),
            next: Some("›".to_string()),
            last: None,
        }
    }
}

impl FastForward {
    /// No fast-forward handles at all.
    pub fn none() -> Self {
        Self {
            first: None,
            prev: None,
            next: None,
            last: None,
        }
    }
}

/// Computes the page handles for `state`.
///
/// A `window_size` window is centred on the current page, shifted left when
/// it overruns the last page and then right when it underruns the first,
/// and finally clamped to the page range. A side of the window that does not
/// reach its boundary gets a jump handle to that boundary, with an ellipsis
/// between them when pages are skipped. Nothing is produced when there is
/// only one page.
pub fn make_handles(state: &PagingState, window_size: usize, fast_forward: &FastForward) -> Vec<PageHandle> {
    let first = state.first_page;
    let last = state.last_page;
    if last <= first {
        return Vec::new();
    }
    let current = state.current_page.clamp(first, last);
    let window = window_size.max(1) as i64;

    let mut start = current - window / 2;
    let mut end = start + window - 1;
    if end > last {
        start -= end - last;
        end = last;
    }
    if start < first {
        end += first - start;
        start = first;
    }
    let start = start.max(first);
    let end = end.min(last);

    let mut handles = Vec::new();
    if start > first {
        handles.push(PageHandle::page(first, state));
        if start > first + 1 {
            handles.push(PageHandle::gap());
        }
    }
    handles.extend((start..=end).map(|i| PageHandle::page(i, state)));
    if end < last {
        if end < last - 1 {
            handles.push(PageHandle::gap());
        }
        handles.push(PageHandle::page(last, state));
    }

    let has_previous = current > first;
    let has_next = current < last;
    if let Some(label) = &fast_forward.prev {
        handles.insert(0, PageHandle::fast_forward(label, HandleTarget::Previous, has_previous));
    }
    if let Some(label) = &fast_forward.first {
        handles.insert(0, PageHandle::fast_forward(label, HandleTarget::First, has_previous));
    }
    if let Some(label) = &fast_forward.next {
        handles.push(PageHandle::fast_forward(label, HandleTarget::Next, has_next));
    }
    if let Some(label) = &fast_forward.last {
        handles.push(PageHandle::fast_forward(label, HandleTarget::Last, has_next));
    }
    handles
}

/// Paginator state and rendering.
///
/// # Examples
///
/// ```rust
/// use bubbletea_datagrid::paginator::{FastForward, Model};
/// use bubbletea_datagrid::record::PagingState;
///
/// let paginator = Model::new()
///     .with_window_size(5)
///     .with_fast_forward(FastForward::none())
///     .with_state(PagingState::new(1, 7, 20, 10).unwrap());
/// let labels: Vec<_> = paginator.handles().into_iter().map(|h| h.label).collect();
/// assert_eq!(labels.join(" "), "1 … 5 6 7 8 9 … 20");
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    /// Number of numbered handles around the current page.
    pub window_size: usize,
    /// Fast-forward handle labels.
    pub fast_forward: FastForward,
    state: PagingState,
    /// Key bindings.
    pub keymap: PaginatorKeyMap,
    /// Style of the current page.
    pub active_style: Style,
    /// Style of disabled fast-forward handles.
    pub disabled_style: Style,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            window_size: 10,
            fast_forward: FastForward::default(),
            state: PagingState::default(),
            keymap: PaginatorKeyMap::default(),
            active_style: Style::new().bold(true).underline(true),
            disabled_style: Style::new().faint(true),
        }
    }
}

impl Model {
    /// Creates a paginator with a window of 10 and prev/next handles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the window size (builder pattern).
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Sets the fast-forward labels (builder pattern).
    pub fn with_fast_forward(mut self, fast_forward: FastForward) -> Self {
        self.fast_forward = fast_forward;
        self
    }

    /// Sets the paging state (builder pattern).
    pub fn with_state(mut self, state: PagingState) -> Self {
        self.state = state;
        self
    }

    /// Current paging state.
    pub fn state(&self) -> &PagingState {
        &self.state
    }

    /// Replaces the paging state.
    pub fn set_state(&mut self, state: PagingState) {
        self.state = state;
    }

    /// Handles derived from the current state.
    pub fn handles(&self) -> Vec<PageHandle> {
        make_handles(&self.state, self.window_size, &self.fast_forward)
    }

    /// Activates the handle at `index`. Ellipses, the active page and
    /// disabled handles do nothing.
    pub fn activate(&self, index: usize) -> Option<PageRequest> {
        self.handles().get(index).and_then(PageHandle::request)
    }

    /// Maps page keys to requests.
    pub fn update(&self, msg: &Msg) -> Option<PageRequest> {
        let key_msg = msg.downcast_ref::<KeyMsg>()?;
        self.handle_key(key_msg)
    }

    /// Maps a key to a request, honouring the page boundaries.
    pub fn handle_key(&self, key_msg: &KeyMsg) -> Option<PageRequest> {
        if self.keymap.next_page.matches(key_msg) && self.state.has_next() {
            Some(PageRequest::Next)
        } else if self.keymap.prev_page.matches(key_msg) && self.state.has_previous() {
            Some(PageRequest::Previous)
        } else {
            None
        }
    }

    /// Renders the handles on one line; empty when there is one page.
    pub fn view(&self) -> String {
        self.handles()
            .iter()
            .map(|h| {
                if h.active {
                    self.active_style.render(&h.label)
                } else if h.disabled {
                    self.disabled_style.render(&h.label)
                } else {
                    h.label.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use lipgloss_extras::lipgloss;

    fn state(first: i64, current: i64, last: i64) -> PagingState {
        PagingState::new(first, current, last, 10).unwrap()
    }

    fn labels(handles: &[PageHandle]) -> String {
        handles.iter().map(|h| h.label.as_str()).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_window_centred_with_jumps() {
        let handles = make_handles(&state(1, 7, 20), 5, &FastForward::none());
        assert_eq!(labels(&handles), "1 … 5 6 7 8 9 … 20");
        assert!(handles.iter().any(|h| h.active && h.label == "7"));
    }

    #[test]
    fn test_window_shifts_at_edges() {
        let none = FastForward::none();
        assert_eq!(labels(&make_handles(&state(1, 1, 20), 5, &none)), "1 2 3 4 5 … 20");
        assert_eq!(labels(&make_handles(&state(1, 20, 20), 5, &none)), "1 … 16 17 18 19 20");
        assert_eq!(labels(&make_handles(&state(1, 4, 20), 5, &none)), "1 2 3 4 5 6 … 20");
    }

    #[test]
    fn test_small_page_counts() {
        let none = FastForward::none();
        assert!(make_handles(&state(1, 1, 1), 5, &none).is_empty());
        assert_eq!(labels(&make_handles(&state(1, 1, 2), 5, &none)), "1 2");
        assert_eq!(labels(&make_handles(&state(1, 2, 3), 5, &none)), "1 2 3");
        assert_eq!(labels(&make_handles(&state(1, 3, 6), 5, &none)), "1 2 3 4 5 6");
        assert_eq!(labels(&make_handles(&state(1, 2, 3), 1, &none)), "1 2 3");
    }

    #[test]
    fn test_zero_based_paging_labels() {
        let handles = make_handles(&state(0, 0, 2), 5, &FastForward::none());
        assert_eq!(labels(&handles), "1 2 3");
        assert_eq!(handles[2].request(), Some(PageRequest::Page(2)));
    }

    #[test]
    fn test_fast_forward_disabled_at_boundaries() {
        let ff = FastForward {
            first: Some("«".into()),
            last: Some("»".into()),
            ..FastForward::default()
        };
        let handles = make_handles(&state(1, 1, 3), 5, &ff);
        assert_eq!(labels(&handles), "« ‹ 1 2 3 › »");
        assert!(handles[0].disabled && handles[1].disabled);
        assert!(!handles[5].disabled && !handles[6].disabled);
        assert_eq!(handles[0].request(), None);
        assert_eq!(handles[6].request(), Some(PageRequest::Last));
    }

    #[test]
    fn test_activate_ignores_inert_handles() {
        let paginator = Model::new()
            .with_window_size(5)
            .with_state(state(1, 7, 20));
        // ‹ 1 … 5 6 7 8 9 … 20 ›
        assert_eq!(paginator.activate(0), Some(PageRequest::Previous));
        assert_eq!(paginator.activate(1), Some(PageRequest::Page(1)));
        assert_eq!(paginator.activate(2), None);
        assert_eq!(paginator.activate(5), None);
        assert_eq!(paginator.activate(10), Some(PageRequest::Next));
        assert_eq!(paginator.activate(99), None);
    }

    #[test]
    fn test_keys_respect_boundaries() {
        let pgdown = KeyMsg {
            key: KeyCode::PageDown,
            modifiers: KeyModifiers::NONE,
        };
        let pgup = KeyMsg {
            key: KeyCode::PageUp,
            modifiers: KeyModifiers::NONE,
        };
        let paginator = Model::new().with_state(state(1, 1, 2));
        assert_eq!(paginator.handle_key(&pgdown), Some(PageRequest::Next));
        assert_eq!(paginator.handle_key(&pgup), None);

        let msg: Msg = Box::new(pgup);
        let paginator = paginator.with_state(state(1, 2, 2));
        assert_eq!(paginator.update(&msg), Some(PageRequest::Previous));
    }

    #[test]
    fn test_view_hidden_for_single_page() {
        assert_eq!(Model::new().view(), "");
        let view = Model::new().with_state(state(1, 1, 3)).view();
        assert_eq!(lipgloss::strip_ansi(&view), "‹ 1 2 3 ›");
    }
}

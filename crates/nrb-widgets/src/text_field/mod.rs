#![forbid(unsafe_code)]

//! Length-limited text field view.
//!
//! [`TextFieldView`] sits between the managed layer (props, callbacks,
//! methods as JSON) and a platform text-input node ([`TextInputHost`]). Its
//! main job is keeping the content within a configured length limit on every
//! mutation path:
//!
//! | Path                         | Enforcement                                   |
//! |------------------------------|-----------------------------------------------|
//! | keyboard / IME insert        | pre-commit filter + relaxed toolkit ceiling   |
//! | paste                        | clip, pre-commit filter + relaxed ceiling     |
//! | IME candidate switch         | will-change correction                        |
//! | drag-and-drop                | post-commit correction after the drop         |
//! | `setText` / `text` prop      | correction right after the write              |
//! | toolkits without will-change | post-commit correction on every change        |
//! | legacy mode                  | toolkit ceiling + code-point truncation       |
//!
//! # Key Invariants
//!
//! 1. **Unset limit is inert**: with no limit nothing is filtered, truncated
//!    or reported.
//! 2. **Single report**: a violating mutation fires `textLengthBeyondLimit`
//!    once.
//! 3. **Boundary safety**: content is never cut inside a code point.
//! 4. **Deferred work is generation-checked**: caret moves and ceiling
//!    restores posted before a reconfiguration or [`on_destroy`] are dropped.
//!
//! # Example
//! ```
//! use nrb_core::{InsertEvent, TextInputEvent};
//! use nrb_widgets::text_field::{EventResponse, MemoryHost, TextFieldView};
//! use serde_json::json;
//!
//! let mut view = TextFieldView::new(MemoryHost::new().with_text("abc"));
//! view.set_prop("lengthLimitType", &json!(1)).unwrap();
//! view.set_prop("maxTextLength", &json!(5)).unwrap();
//!
//! let response = view.handle_event(&TextInputEvent::WillInsert(InsertEvent::new("defg")));
//! assert_eq!(response, EventResponse::Replace("de".into()));
//! ```
//!
//! [`on_destroy`]: TextFieldView::on_destroy

pub mod config;
pub mod host;
pub mod length_limit;

use std::fmt;

use nrb_core::codec;
use nrb_core::{EventMask, InsertEvent, PasteEvent, ReturnKeyType, TextInputEvent};
use nrb_runtime::{Generation, MainThreadQueue, QueueStats, Tagged};
use nrb_text::measure::LengthUnit;
use serde_json::{Map, Value, json};
use web_time::Instant;

use crate::error::{PropError, Result};

pub use config::TextFieldConfig;
pub use host::{MemoryHost, TextInputHost};
pub use length_limit::{Ceiling, Correction, FilterOutcome, LengthLimitEngine};

/// Prop keys understood by [`TextFieldView::set_prop`].
pub mod prop {
    pub const TEXT: &str = "text";
    pub const MAX_TEXT_LENGTH: &str = "maxTextLength";
    pub const LENGTH_LIMIT_TYPE: &str = "lengthLimitType";
    pub const RETURN_KEY_TYPE: &str = "returnKeyType";
}

/// Event keys understood by [`TextFieldView::set_event_callback`].
///
/// [`TextFieldView::set_event_callback`]: super::TextFieldView::set_event_callback
pub mod event {
    pub const TEXT_DID_CHANGE: &str = "textDidChange";
    pub const INPUT_FOCUS: &str = "inputFocus";
    pub const INPUT_BLUR: &str = "inputBlur";
    pub const INPUT_RETURN: &str = "inputReturn";
    pub const TEXT_LENGTH_BEYOND_LIMIT: &str = "textLengthBeyondLimit";
}

/// Method names understood by [`TextFieldView::call_method`].
pub mod method {
    pub const FOCUS: &str = "focus";
    pub const BLUR: &str = "blur";
    pub const SET_TEXT: &str = "setText";
    pub const GET_CURSOR_INDEX: &str = "getCursorIndex";
    pub const SET_CURSOR_INDEX: &str = "setCursorIndex";
}

/// Callback receiving a JSON payload for the managed layer.
pub type EventCallback = Box<dyn FnMut(Value)>;

/// Answer to a toolkit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResponse {
    /// Let the pending edit through unchanged (or the event was not an edit).
    Proceed,
    /// Apply the pending edit with this candidate instead.
    Replace(String),
    /// Discard the pending edit.
    Block,
}

impl EventResponse {
    /// Whether the pending edit must be discarded.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Block)
    }

    /// The replacement candidate, if any.
    #[must_use]
    pub fn candidate(&self) -> Option<&str> {
        match self {
            Self::Replace(text) => Some(text),
            _ => None,
        }
    }
}

/// Work posted to the main-thread queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredEdit {
    /// Re-apply the policy ceiling after a relaxation.
    RestoreCeiling,
    /// Move the caret once the toolkit has settled the new content.
    MoveCaret(usize),
}

#[derive(Default)]
struct Callbacks {
    text_did_change: Option<EventCallback>,
    beyond_limit: Option<EventCallback>,
    focus: Option<EventCallback>,
    blur: Option<EventCallback>,
    submit: Option<EventCallback>,
}

impl Callbacks {
    fn slot(&mut self, key: &str) -> Option<&mut Option<EventCallback>> {
        match key {
            event::TEXT_DID_CHANGE => Some(&mut self.text_did_change),
            event::TEXT_LENGTH_BEYOND_LIMIT => Some(&mut self.beyond_limit),
            event::INPUT_FOCUS => Some(&mut self.focus),
            event::INPUT_BLUR => Some(&mut self.blur),
            event::INPUT_RETURN => Some(&mut self.submit),
            _ => None,
        }
    }

    fn fire(slot: &mut Option<EventCallback>, payload: Value) {
        if let Some(callback) = slot.as_mut() {
            callback(payload);
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("text_did_change", &self.text_did_change.is_some())
            .field("beyond_limit", &self.beyond_limit.is_some())
            .field("focus", &self.focus.is_some())
            .field("blur", &self.blur.is_some())
            .field("submit", &self.submit.is_some())
            .finish()
    }
}

/// Text field view enforcing a length limit over a [`TextInputHost`].
#[derive(Debug)]
pub struct TextFieldView<H: TextInputHost> {
    host: H,
    config: TextFieldConfig,
    engine: LengthLimitEngine,
    callbacks: Callbacks,
    tasks: MainThreadQueue<Tagged<DeferredEdit>>,
    generation: Generation,
}

impl<H: TextInputHost> TextFieldView<H> {
    /// Create a view with the default configuration.
    #[must_use]
    pub fn new(host: H) -> Self {
        Self::with_config(host, TextFieldConfig::default())
    }

    /// Create a view with `config`.
    #[must_use]
    pub fn with_config(mut host: H, config: TextFieldConfig) -> Self {
        host.register_events(EventMask::CHANGE);
        Self {
            host,
            engine: LengthLimitEngine::new(&config),
            config,
            callbacks: Callbacks::default(),
            tasks: MainThreadQueue::new(),
            generation: Generation::new(),
        }
    }

    // --- Accessors ---

    /// The underlying host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the underlying host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Current length-limit policy.
    #[must_use]
    pub fn engine(&self) -> &LengthLimitEngine {
        &self.engine
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &TextFieldConfig {
        &self.config
    }

    /// Current view generation.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Earliest pending deferred task, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.next_deadline()
    }

    /// Number of deferred tasks waiting to run.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Deferred task counters.
    #[must_use]
    pub fn queue_stats(&self) -> QueueStats {
        self.tasks.stats()
    }

    // --- Props, callbacks, methods ---

    /// Apply a prop from the managed layer.
    ///
    /// Returns `Ok(false)` for keys this view does not own, so a base view
    /// can handle them.
    pub fn set_prop(&mut self, key: &str, value: &Value) -> Result<bool> {
        let now = Instant::now();
        match key {
            prop::TEXT => {
                let text = value
                    .as_str()
                    .ok_or_else(|| PropError::invalid(prop::TEXT, "a string", value))?;
                self.set_text_at(text, now);
            }
            prop::MAX_TEXT_LENGTH => {
                let raw = int_arg(prop::MAX_TEXT_LENGTH, value)?;
                self.apply_max_length(usize::try_from(raw).ok(), now);
            }
            prop::LENGTH_LIMIT_TYPE => {
                let raw = int_arg(prop::LENGTH_LIMIT_TYPE, value)?;
                let unit = LengthUnit::from_wire(raw).ok_or(PropError::UnknownLimitType(raw))?;
                self.apply_unit(unit, now);
            }
            prop::RETURN_KEY_TYPE => {
                let name = value
                    .as_str()
                    .ok_or_else(|| PropError::invalid(prop::RETURN_KEY_TYPE, "a string", value))?;
                self.host.set_return_key_type(ReturnKeyType::from_prop(name));
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Register `callback` for the event `key`.
    ///
    /// Returns `false` for unknown keys.
    pub fn set_event_callback(&mut self, key: &str, callback: impl FnMut(Value) + 'static) -> bool {
        let Some(slot) = self.callbacks.slot(key) else {
            return false;
        };
        *slot = Some(Box::new(callback));
        match key {
            event::TEXT_LENGTH_BEYOND_LIMIT => self.apply_ceiling(),
            event::INPUT_FOCUS => self.host.register_events(EventMask::FOCUS),
            event::INPUT_BLUR => self.host.register_events(EventMask::BLUR),
            event::INPUT_RETURN => self.host.register_events(EventMask::SUBMIT),
            _ => {}
        }
        true
    }

    /// Drop the callback for `key`. Returns whether one was registered.
    pub fn remove_event_callback(&mut self, key: &str) -> bool {
        let removed = self
            .callbacks
            .slot(key)
            .and_then(Option::take)
            .is_some();
        if removed && key == event::TEXT_LENGTH_BEYOND_LIMIT {
            self.apply_ceiling();
        }
        removed
    }

    /// Invoke a method from the managed layer.
    pub fn call_method(&mut self, name: &str, params: &Value) -> Result<Option<Value>> {
        match name {
            method::FOCUS => self.host.set_focus_status(true),
            method::BLUR => self.host.set_focus_status(false),
            method::SET_TEXT => {
                let text = params
                    .as_str()
                    .ok_or_else(|| PropError::invalid(method::SET_TEXT, "a string", params))?;
                self.set_text_at(text, Instant::now());
            }
            method::GET_CURSOR_INDEX => {
                let index = self.host.selection_range().start;
                return Ok(Some(json!({ "cursorIndex": index })));
            }
            method::SET_CURSOR_INDEX => {
                let raw = int_arg(method::SET_CURSOR_INDEX, params)?;
                let index = usize::try_from(raw).map_err(|_| {
                    PropError::invalid(method::SET_CURSOR_INDEX, "a non-negative integer", params)
                })?;
                self.host.set_selection_start(index);
            }
            other => return Err(PropError::UnknownMethod(other.to_owned())),
        }
        Ok(None)
    }

    /// Replace the content and bring it back within the limit.
    pub fn set_text(&mut self, text: &str) {
        self.set_text_at(text, Instant::now());
    }

    fn set_text_at(&mut self, text: &str, now: Instant) {
        self.host.set_content_text(text);
        self.limit_in_max_length(now);
    }

    // --- Events ---

    /// Handle a toolkit event delivered now.
    pub fn handle_event(&mut self, event: &TextInputEvent) -> EventResponse {
        self.handle_event_at(event, Instant::now())
    }

    /// Handle an insert arriving through the raw transfer buffer.
    pub fn handle_insert_buffer(&mut self, buffer: &[u8]) -> EventResponse {
        let insert = InsertEvent::from_buffer(buffer, self.config.max_insert_bytes);
        self.handle_event(&TextInputEvent::WillInsert(insert))
    }

    /// Handle a toolkit event delivered at `now`.
    pub fn handle_event_at(&mut self, event: &TextInputEvent, now: Instant) -> EventResponse {
        let _span = tracing::debug_span!(
            "text_field.event",
            operation = event.name(),
            unit = ?self.engine.unit(),
            max_length = ?self.engine.max_length()
        )
        .entered();

        match event {
            TextInputEvent::WillInsert(insert) => return self.filter_insert(insert, now),
            TextInputEvent::Paste(paste) => return self.filter_paste(paste, now),
            TextInputEvent::WillChange => {
                if self.engine.pre_commit_active() {
                    self.limit_in_max_length(now);
                }
            }
            TextInputEvent::Changed => self.on_changed(now),
            TextInputEvent::DragEnter => self.engine.set_drag_in_progress(true),
            TextInputEvent::DragLeave => self.engine.set_drag_in_progress(false),
            TextInputEvent::Focus => {
                let payload = self.text_payload();
                Callbacks::fire(&mut self.callbacks.focus, payload);
            }
            TextInputEvent::Blur => {
                let payload = self.text_payload();
                Callbacks::fire(&mut self.callbacks.blur, payload);
            }
            TextInputEvent::Submit => {
                let payload = json!({
                    "text": self.host.content_text(),
                    "ime_action": self.host.return_key_type().as_str(),
                });
                Callbacks::fire(&mut self.callbacks.submit, payload);
            }
        }
        EventResponse::Proceed
    }

    /// Run deferred tasks due at `now`. Returns how many ran.
    pub fn pump(&mut self, now: Instant) -> usize {
        let tasks = self.tasks.drain_current(now, self.generation);
        let ran = tasks.len();
        for task in tasks {
            tracing::trace!(?task, "deferred edit");
            match task {
                DeferredEdit::RestoreCeiling => self.apply_ceiling(),
                DeferredEdit::MoveCaret(index) => self.host.set_selection_start(index),
            }
        }
        ran
    }

    /// Tear down: pending deferred tasks become no-ops.
    pub fn on_destroy(&mut self) {
        self.generation.bump();
        tracing::trace!(generation = self.generation.get(), "text field destroyed");
    }

    // --- Internals ---

    fn apply_max_length(&mut self, max_length: Option<usize>, now: Instant) {
        self.generation.bump();
        self.engine.set_max_length(max_length);
        self.apply_ceiling();
        self.limit_in_max_length(now);
        self.setup_length_filter();
    }

    fn apply_unit(&mut self, unit: LengthUnit, now: Instant) {
        self.generation.bump();
        self.engine.set_unit(unit);
        if self.engine.max_length().is_some() {
            self.apply_ceiling();
            if self.config.revalidate_on_unit_change {
                self.limit_in_max_length(now);
            }
        }
        self.setup_length_filter();
    }

    fn setup_length_filter(&mut self) {
        if self.engine.install_filter() {
            self.host.register_events(EventMask::LENGTH_FILTER);
            tracing::trace!("length filter installed");
        }
    }

    fn apply_ceiling(&mut self) {
        let ceiling = self.engine.ceiling(self.callbacks.beyond_limit.is_some());
        tracing::trace!(?ceiling, "toolkit ceiling");
        match ceiling {
            Ceiling::Unbounded => self.host.reset_max_length(),
            Ceiling::Units(units) => self.host.set_max_length(units),
        }
    }

    fn relax_ceiling(&mut self, units: usize, now: Instant) {
        tracing::trace!(units, "toolkit ceiling relaxed");
        self.host.set_max_length(units);
        self.tasks.post_delayed(
            now,
            self.config.relax_delay(),
            Tagged::new(self.generation, DeferredEdit::RestoreCeiling),
        );
    }

    fn notify_beyond_limit(&mut self) {
        Callbacks::fire(&mut self.callbacks.beyond_limit, json!({}));
    }

    /// Bring the host content back within the limit. Returns whether it had
    /// to change.
    fn limit_in_max_length(&mut self, now: Instant) -> bool {
        let text = self.host.content_text();
        let cursor = self.host.selection_range().start;
        let Some(correction) = self.engine.enforce(&text, cursor) else {
            return false;
        };
        tracing::debug!(
            measured = self.engine.measure(&text, 0..0),
            kept = correction.text.len(),
            "content exceeds length limit"
        );
        self.notify_beyond_limit();
        self.host.set_content_text(&correction.text);
        if let Some(caret) = correction.cursor {
            self.tasks
                .post(now, Tagged::new(self.generation, DeferredEdit::MoveCaret(caret)));
        }
        true
    }

    fn filter_insert(&mut self, insert: &InsertEvent, now: Instant) -> EventResponse {
        if !self.engine.pre_commit_active() {
            return EventResponse::Proceed;
        }
        let dest = self.host.content_text();
        let range = self.host.selection_range();
        let outcome = self.engine.filter(&insert.text, &dest, range.clone());
        let accepted = outcome.apply(&insert.text);

        if outcome.is_filtered() {
            tracing::debug!(
                candidate_bytes = insert.text.len(),
                accepted_bytes = accepted.len(),
                "insert exceeds length limit"
            );
            self.notify_beyond_limit();
        }
        if outcome == FilterOutcome::Blocked {
            return EventResponse::Block;
        }
        if outcome.is_filtered() || insert.clipped {
            let units = LengthLimitEngine::relaxed_ceiling(&dest, range, accepted);
            self.relax_ceiling(units, now);
        }
        respond(outcome, accepted)
    }

    fn filter_paste(&mut self, paste: &PasteEvent, now: Instant) -> EventResponse {
        let Some(max) = self
            .engine
            .max_length()
            .filter(|_| self.engine.pre_commit_active())
        else {
            return EventResponse::Proceed;
        };
        // Large pastes are clipped before measuring; four bytes always hold
        // at least one code point.
        let budget = max.saturating_mul(self.config.paste_bytes_per_unit).max(4);
        let candidate = &paste.text[..codec::floor_char_boundary(&paste.text, budget)];
        let clipped = candidate.len() < paste.text.len();

        let dest = self.host.content_text();
        let range = self.host.selection_range();
        let outcome = self.engine.filter(candidate, &dest, range.clone());
        let accepted = outcome.apply(candidate);
        let outcome = match outcome {
            FilterOutcome::Unchanged if clipped => FilterOutcome::Truncated {
                keep_bytes: accepted.len(),
            },
            other => other,
        };
        if !outcome.is_filtered() {
            return EventResponse::Proceed;
        }

        tracing::debug!(
            candidate_bytes = paste.text.len(),
            accepted_bytes = accepted.len(),
            "paste exceeds length limit"
        );
        self.notify_beyond_limit();
        let units = LengthLimitEngine::relaxed_ceiling(&dest, range, accepted);
        self.relax_ceiling(units, now);
        respond(outcome, accepted)
    }

    fn on_changed(&mut self, now: Instant) {
        if self.engine.unit().is_legacy() {
            self.limit_in_max_length(now);
        } else if self.engine.max_length().is_some() {
            let late_platform = !self
                .host
                .api_level()
                .at_least(self.config.will_change_api());
            if self.engine.drag_in_progress() || late_platform {
                self.limit_in_max_length(now);
                self.engine.set_drag_in_progress(false);
            }
        }

        let text = self.host.content_text();
        let mut payload = Map::new();
        if !self.engine.unit().is_legacy() {
            payload.insert("length".into(), json!(self.engine.measure(&text, 0..0)));
        }
        payload.insert("text".into(), Value::String(text));
        Callbacks::fire(&mut self.callbacks.text_did_change, Value::Object(payload));
    }

    fn text_payload(&self) -> Value {
        json!({ "text": self.host.content_text() })
    }
}

fn respond(outcome: FilterOutcome, accepted: &str) -> EventResponse {
    match outcome {
        FilterOutcome::Unchanged => EventResponse::Proceed,
        FilterOutcome::Truncated { .. } => EventResponse::Replace(accepted.to_owned()),
        FilterOutcome::Blocked => EventResponse::Block,
    }
}

/// Integer argument; floats are truncated toward zero.
fn int_arg(key: &'static str, value: &Value) -> Result<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
        .ok_or_else(|| PropError::invalid(key, "an integer", value))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use tracing_test::traced_test;
    use web_time::Duration;

    type Log = Rc<RefCell<Vec<Value>>>;

    fn view_with(text: &str, unit: i64, max: i64) -> TextFieldView<MemoryHost> {
        let mut view = TextFieldView::new(MemoryHost::new().with_text(text));
        view.set_prop(prop::LENGTH_LIMIT_TYPE, &json!(unit)).unwrap();
        view.set_prop(prop::MAX_TEXT_LENGTH, &json!(max)).unwrap();
        view
    }

    fn record(view: &mut TextFieldView<MemoryHost>, key: &str) -> Log {
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        assert!(view.set_event_callback(key, move |payload| sink.borrow_mut().push(payload)));
        log
    }

    #[test]
    fn new_view_registers_change_only() {
        let view = TextFieldView::new(MemoryHost::new());
        assert_eq!(view.host().registered(), EventMask::CHANGE);
        assert_eq!(view.engine().max_length(), None);
    }

    #[test]
    fn props_configure_policy() {
        let view = view_with("", 2, 8);
        assert_eq!(view.engine().unit(), LengthUnit::VisualWidth);
        assert_eq!(view.engine().max_length(), Some(8));
        assert!(view.engine().filter_installed());
        assert!(view.host().registered().contains(EventMask::LENGTH_FILTER));
        assert_eq!(view.host().max_length(), Some(8));
    }

    #[test]
    fn negative_max_length_resets_ceiling() {
        let mut view = view_with("", 0, 8);
        view.set_prop(prop::MAX_TEXT_LENGTH, &json!(-1)).unwrap();
        assert_eq!(view.engine().max_length(), None);
        assert_eq!(view.host().max_length(), None);
    }

    #[test]
    fn bad_prop_values_leave_state_alone() {
        let mut view = view_with("", 1, 4);
        let err = view
            .set_prop(prop::MAX_TEXT_LENGTH, &json!("four"))
            .unwrap_err();
        assert!(matches!(err, PropError::InvalidValue { .. }));
        assert_eq!(
            view.set_prop(prop::LENGTH_LIMIT_TYPE, &json!(7)),
            Err(PropError::UnknownLimitType(7))
        );
        assert_eq!(view.engine().max_length(), Some(4));
        assert_eq!(view.engine().unit(), LengthUnit::Character);
    }

    #[test]
    fn unknown_prop_is_not_handled() {
        let mut view = TextFieldView::new(MemoryHost::new());
        assert_eq!(view.set_prop("placeholder", &json!("hi")), Ok(false));
    }

    #[test]
    fn float_limits_are_accepted() {
        let mut view = view_with("", 1, 0);
        view.set_prop(prop::MAX_TEXT_LENGTH, &json!(6.0)).unwrap();
        assert_eq!(view.engine().max_length(), Some(6));
    }

    #[test]
    fn beyond_limit_registration_reapplies_ceiling() {
        let mut view = view_with("", 1, 5);
        assert_eq!(view.host().max_length(), Some(10));
        let _log = record(&mut view, event::TEXT_LENGTH_BEYOND_LIMIT);
        assert_eq!(view.host().max_length(), Some(12));
        assert!(view.remove_event_callback(event::TEXT_LENGTH_BEYOND_LIMIT));
        assert_eq!(view.host().max_length(), Some(10));
    }

    #[test]
    fn legacy_ceiling_opens_up_for_observers() {
        let mut view = view_with("", -1, 5);
        assert_eq!(view.host().max_length(), Some(5));
        let _log = record(&mut view, event::TEXT_LENGTH_BEYOND_LIMIT);
        assert_eq!(view.host().max_length(), Some(10_000_000));
    }

    #[test]
    fn insert_is_truncated_and_ceiling_relaxed() {
        let mut view = view_with("abc", 1, 5);
        let beyond = record(&mut view, event::TEXT_LENGTH_BEYOND_LIMIT);
        let t0 = Instant::now();
        let response =
            view.handle_event_at(&TextInputEvent::WillInsert(InsertEvent::new("d😀ef")), t0);
        assert_eq!(response, EventResponse::Replace("d😀".into()));
        assert_eq!(beyond.borrow().len(), 1);
        // "abc" + "d😀" is six UTF-16 units.
        assert_eq!(view.host().max_length(), Some(6));

        assert_eq!(view.pump(t0 + Duration::from_millis(99)), 0);
        assert_eq!(view.pump(t0 + Duration::from_millis(100)), 1);
        assert_eq!(view.host().max_length(), Some(12));
    }

    #[test]
    fn full_field_blocks_insert() {
        let mut view = view_with("abcde", 0, 5);
        let beyond = record(&mut view, event::TEXT_LENGTH_BEYOND_LIMIT);
        let response = view.handle_event(&TextInputEvent::WillInsert(InsertEvent::new("x")));
        assert!(response.is_blocked());
        assert_eq!(beyond.borrow().len(), 1);
    }

    #[test]
    fn blocked_insert_over_selection_keeps_ceiling() {
        let mut view = view_with("abcde", 0, 5);
        let beyond = record(&mut view, event::TEXT_LENGTH_BEYOND_LIMIT);
        view.host_mut().set_selection(0..2);
        let ceiling = view.host().max_length();
        let history = view.host().ceiling_history().len();

        // Three bytes never fit in the two selected ones.
        let response = view.handle_event(&TextInputEvent::WillInsert(InsertEvent::new("中")));
        assert!(response.is_blocked());
        assert_eq!(beyond.borrow().len(), 1);
        assert_eq!(view.host().max_length(), ceiling);
        assert_eq!(view.host().ceiling_history().len(), history);
        assert_eq!(view.pending_tasks(), 0);
    }

    #[test]
    fn fitting_insert_proceeds_silently() {
        let mut view = view_with("ab", 0, 5);
        let beyond = record(&mut view, event::TEXT_LENGTH_BEYOND_LIMIT);
        let before = view.host().ceiling_history().len();
        let response = view.handle_event(&TextInputEvent::WillInsert(InsertEvent::new("c")));
        assert_eq!(response, EventResponse::Proceed);
        assert!(beyond.borrow().is_empty());
        assert_eq!(view.host().ceiling_history().len(), before);
        assert_eq!(view.pending_tasks(), 0);
    }

    #[test]
    fn clipped_buffer_relaxes_ceiling_without_filtering() {
        let mut view = view_with("", 0, 1000);
        let beyond = record(&mut view, event::TEXT_LENGTH_BEYOND_LIMIT);
        let buffer = vec![b'a'; 300];
        let response = view.handle_insert_buffer(&buffer);
        assert_eq!(response, EventResponse::Proceed);
        assert!(beyond.borrow().is_empty());
        assert_eq!(view.host().max_length(), Some(255));
        assert_eq!(view.pending_tasks(), 1);
    }

    #[test]
    fn paste_is_clipped_and_truncated() {
        let mut view = view_with("", 0, 10);
        let beyond = record(&mut view, event::TEXT_LENGTH_BEYOND_LIMIT);
        let paste = "a".repeat(300);
        let response = view.handle_event(&TextInputEvent::Paste(PasteEvent::new(paste)));
        assert_eq!(response.candidate().map(str::len), Some(10));
        assert_eq!(beyond.borrow().len(), 1);
        assert_eq!(view.host().max_length(), Some(10));
    }

    #[test]
    fn paste_clipping_alone_counts_as_filtered() {
        // Ten astral characters fill the 40-byte clip exactly.
        let mut view = view_with("", 1, 10);
        let beyond = record(&mut view, event::TEXT_LENGTH_BEYOND_LIMIT);
        let paste = "😀".repeat(11);
        let response = view.handle_event(&TextInputEvent::Paste(PasteEvent::new(paste)));
        assert_eq!(response, EventResponse::Replace("😀".repeat(10)));
        assert_eq!(beyond.borrow().len(), 1);
    }

    #[test]
    fn will_change_truncates_before_caret() {
        let mut view = view_with("", 1, 5);
        let beyond = record(&mut view, event::TEXT_LENGTH_BEYOND_LIMIT);
        view.host_mut().set_content_text("hello world");
        view.handle_event(&TextInputEvent::WillChange);
        assert_eq!(view.host().text(), "hello");
        assert_eq!(beyond.borrow().len(), 1);
        view.pump(Instant::now());
        assert_eq!(view.host().selection_range(), 5..5);
    }

    #[test]
    fn drag_defers_enforcement_to_change_commit() {
        let mut view = view_with("", 0, 4);
        view.handle_event(&TextInputEvent::DragEnter);
        view.host_mut().set_content_text("dropped text");
        view.handle_event(&TextInputEvent::WillChange);
        assert_eq!(view.host().text(), "dropped text");

        view.handle_event(&TextInputEvent::Changed);
        assert_eq!(view.host().text(), "drop");
        assert!(!view.engine().drag_in_progress());
    }

    #[test]
    fn drag_bypasses_insert_and_paste_filters() {
        let mut view = view_with("abc", 0, 3);
        view.handle_event(&TextInputEvent::DragEnter);
        let insert = view.handle_event(&TextInputEvent::WillInsert(InsertEvent::new("d")));
        let paste = view.handle_event(&TextInputEvent::Paste(PasteEvent::new("e")));
        assert_eq!(insert, EventResponse::Proceed);
        assert_eq!(paste, EventResponse::Proceed);
        assert_eq!(view.pending_tasks(), 0);
    }

    #[test]
    fn old_platform_enforces_on_change_commit() {
        let mut view = TextFieldView::new(MemoryHost::new().with_api_level(18));
        view.set_prop(prop::LENGTH_LIMIT_TYPE, &json!(1)).unwrap();
        view.set_prop(prop::MAX_TEXT_LENGTH, &json!(3)).unwrap();
        view.host_mut().set_content_text("abcdef");
        view.handle_event(&TextInputEvent::Changed);
        assert_eq!(view.host().text(), "abc");
    }

    #[test]
    fn current_platform_trusts_will_change() {
        let mut view = view_with("", 1, 3);
        view.host_mut().set_content_text("abcdef");
        view.handle_event(&TextInputEvent::Changed);
        assert_eq!(view.host().text(), "abcdef");
    }

    #[test]
    fn change_reports_text_and_length() {
        let mut view = view_with("中a", 2, 10);
        let changes = record(&mut view, event::TEXT_DID_CHANGE);
        view.handle_event(&TextInputEvent::Changed);
        assert_eq!(changes.borrow()[0], json!({ "text": "中a", "length": 3 }));
    }

    #[test]
    fn legacy_change_truncates_code_points_without_length() {
        let mut view = view_with("", -1, 2);
        let changes = record(&mut view, event::TEXT_DID_CHANGE);
        let beyond = record(&mut view, event::TEXT_LENGTH_BEYOND_LIMIT);
        view.host_mut().set_content_text("😀😀😀");
        view.handle_event(&TextInputEvent::Changed);
        assert_eq!(view.host().text(), "😀😀");
        assert_eq!(beyond.borrow().len(), 1);
        assert_eq!(changes.borrow()[0], json!({ "text": "😀😀" }));
    }

    #[test]
    fn unit_change_revalidates_content() {
        let mut view = view_with("中文字", 1, 4);
        assert_eq!(view.host().text(), "中文字");
        view.set_prop(prop::LENGTH_LIMIT_TYPE, &json!(2)).unwrap();
        assert_eq!(view.host().text(), "中文");
    }

    #[test]
    fn unit_change_can_defer_revalidation() {
        let config = TextFieldConfig {
            revalidate_on_unit_change: false,
            ..TextFieldConfig::default()
        };
        let mut view = TextFieldView::with_config(MemoryHost::new().with_text("中文字"), config);
        view.set_prop(prop::LENGTH_LIMIT_TYPE, &json!(1)).unwrap();
        view.set_prop(prop::MAX_TEXT_LENGTH, &json!(4)).unwrap();
        view.set_prop(prop::LENGTH_LIMIT_TYPE, &json!(2)).unwrap();
        assert_eq!(view.host().text(), "中文字");
        assert_eq!(view.host().max_length(), Some(4));
    }

    #[test]
    fn set_text_is_limited() {
        let mut view = view_with("", 0, 3);
        view.call_method(method::SET_TEXT, &json!("abcdef")).unwrap();
        assert_eq!(view.host().text(), "abc");
        view.set_prop(prop::TEXT, &json!("xy")).unwrap();
        assert_eq!(view.host().text(), "xy");
    }

    #[test]
    fn cursor_methods() {
        let mut view = TextFieldView::new(MemoryHost::new().with_text("hello"));
        view.call_method(method::SET_CURSOR_INDEX, &json!(2)).unwrap();
        assert_eq!(
            view.call_method(method::GET_CURSOR_INDEX, &Value::Null).unwrap(),
            Some(json!({ "cursorIndex": 2 }))
        );
        assert!(view.call_method(method::SET_CURSOR_INDEX, &json!(-1)).is_err());
        assert_eq!(
            view.call_method("scrollTo", &Value::Null),
            Err(PropError::UnknownMethod("scrollTo".into()))
        );
    }

    #[test]
    fn focus_methods_and_events() {
        let mut view = TextFieldView::new(MemoryHost::new().with_text("hi"));
        let focus = record(&mut view, event::INPUT_FOCUS);
        let submit = record(&mut view, event::INPUT_RETURN);
        assert!(view.host().registered().contains(EventMask::FOCUS | EventMask::SUBMIT));

        view.call_method(method::FOCUS, &Value::Null).unwrap();
        assert!(view.host().focused());
        view.call_method(method::BLUR, &Value::Null).unwrap();
        assert!(!view.host().focused());

        view.handle_event(&TextInputEvent::Focus);
        view.handle_event(&TextInputEvent::Submit);
        assert_eq!(focus.borrow()[0], json!({ "text": "hi" }));
        assert_eq!(submit.borrow()[0], json!({ "text": "hi", "ime_action": "done" }));
        assert!(!view.set_event_callback("inputScroll", |_| {}));
    }

    #[test]
    fn submit_reports_return_key_type() {
        let mut view = TextFieldView::new(MemoryHost::new().with_text("query"));
        let submit = record(&mut view, event::INPUT_RETURN);
        assert_eq!(view.set_prop(prop::RETURN_KEY_TYPE, &json!("search")), Ok(true));
        assert_eq!(view.host().return_key_type(), ReturnKeyType::Search);

        view.handle_event(&TextInputEvent::Submit);
        assert_eq!(submit.borrow()[0], json!({ "text": "query", "ime_action": "search" }));

        assert!(view.set_prop(prop::RETURN_KEY_TYPE, &json!(3)).is_err());
        assert_eq!(view.host().return_key_type(), ReturnKeyType::Search);
    }

    #[test]
    fn destroy_drops_pending_tasks() {
        let mut view = view_with("abc", 1, 4);
        let t0 = Instant::now();
        view.handle_event_at(&TextInputEvent::WillInsert(InsertEvent::new("defg")), t0);
        assert_eq!(view.pending_tasks(), 1);
        let relaxed = view.host().max_length();

        view.on_destroy();
        assert_eq!(view.pump(t0 + Duration::from_secs(1)), 0);
        assert_eq!(view.host().max_length(), relaxed);
        assert_eq!(view.queue_stats().dropped_stale, 1);
    }

    #[test]
    fn reconfigure_supersedes_pending_restore() {
        let mut view = view_with("abc", 1, 4);
        let t0 = Instant::now();
        view.handle_event_at(&TextInputEvent::WillInsert(InsertEvent::new("defg")), t0);
        view.set_prop(prop::MAX_TEXT_LENGTH, &json!(6)).unwrap();
        assert_eq!(view.host().max_length(), Some(12));
        assert_eq!(view.pump(t0 + Duration::from_secs(1)), 0);
    }

    #[traced_test]
    #[test]
    fn violations_are_logged() {
        let mut view = view_with("", 1, 2);
        view.handle_event(&TextInputEvent::WillInsert(InsertEvent::new("abc")));
        assert!(logs_contain("insert exceeds length limit"));
        view.call_method(method::SET_TEXT, &json!("abcd")).unwrap();
        assert!(logs_contain("content exceeds length limit"));
    }
}

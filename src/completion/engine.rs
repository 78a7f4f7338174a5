//! Completion engine
//!
//! Coordinates one completion session at a time: opens a request against the
//! matching providers, collects their proposals into the [`ProposalModel`],
//! decides when the popup appears or disappears, and serves navigation,
//! provider cycling, activation and the info panel while it is visible.
//!
//! The engine is a single-owner value. Providers report through their
//! [`ProposalSink`], which queues batches on a channel; the host applies them
//! by pumping the engine with [`dispatch_pending`](CompletionEngine::dispatch_pending)
//! or [`process_next`](CompletionEngine::process_next).

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::context::{CompletionContext, Position};
use super::cycling::{self, CycleOutcome, Direction};
use super::model::{ProposalModel, RowKey};
use super::navigation::{self, Movement};
use super::provider::{CompletionProvider, InfoWidget, Proposal, ProviderId};
use super::registry::ProviderRegistry;
use super::signal::EngineSignals;
use super::sink::{EngineMessage, ProposalBatch, ProposalSink};
use super::surface::TextSurface;
use super::trigger::DebounceTimer;
use crate::config::CompletionConfig;
use crate::error::{RequestError, Result};

/// Text shown in the info panel when a proposal carries no information
pub const NO_INFO_TEXT: &str = "No extra information available";

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No request in flight
    #[default]
    Idle,
    /// Waiting for providers to finish
    Populating,
    /// All providers finished with something to show
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Populating => write!(f, "populating"),
            SessionState::Ready => write!(f, "ready"),
        }
    }
}

/// Result of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Popup hidden or nothing selectable
    NotHandled,
    /// Handled, but the selection did not move
    Unchanged,
    /// The selection is now on this row
    Moved(RowKey),
}

impl NavOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, NavOutcome::NotHandled)
    }
}

/// User actions the popup reacts to
///
/// Hosts map their key bindings to these. The usual bindings are Escape,
/// Down, Page Down, Up, Page Up, Home, End, Return or Tab, Ctrl+Right,
/// Ctrl+Left and Alt+I.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionAction {
    Hide,
    Next,
    PageDown,
    Previous,
    PageUp,
    First,
    Last,
    Activate,
    NextProvider,
    PreviousProvider,
    ToggleInfo,
}

/// What the info panel should display
pub enum InfoContent {
    /// Custom view built by the provider
    Widget(InfoWidget),
    /// Info text of the proposal
    Text(String),
    /// Nothing available, show [`NO_INFO_TEXT`]
    Placeholder,
}

impl InfoContent {
    /// Text to display, `None` for a custom widget
    pub fn text(&self) -> Option<&str> {
        match self {
            InfoContent::Widget(_) => None,
            InfoContent::Text(text) => Some(text),
            InfoContent::Placeholder => Some(NO_INFO_TEXT),
        }
    }
}

impl fmt::Debug for InfoContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoContent::Widget(_) => write!(f, "Widget(..)"),
            InfoContent::Text(text) => f.debug_tuple("Text").field(text).finish(),
            InfoContent::Placeholder => write!(f, "Placeholder"),
        }
    }
}

/// Label of the provider filter, "All" or the isolated provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSelection {
    /// Isolated provider, `None` for all
    pub provider: Option<ProviderId>,
    pub name: String,
    pub icon: Option<String>,
    /// 1-based slot of the current filter, the "all" slot coming first
    pub index: usize,
    /// Number of slots, `0` when there is nothing to cycle through
    pub count: usize,
}

impl fmt::Display for ProviderSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.count > 0 {
            write!(f, " ({}/{})", self.index, self.count)?;
        }
        Ok(())
    }
}

/// Completion session driver
pub struct CompletionEngine {
    config: CompletionConfig,
    surface: Arc<dyn TextSurface>,
    registry: ProviderRegistry,
    model: ProposalModel,
    signals: EngineSignals,

    state: SessionState,
    context: Option<CompletionContext>,
    active: Vec<ProviderId>,
    running: Vec<ProviderId>,
    round: u64,

    visible: bool,
    selected: Option<RowKey>,
    scroll_row: Option<RowKey>,
    auto_select: bool,
    info_visible: bool,

    typing_line: usize,
    trigger: DebounceTimer,
    tx: UnboundedSender<EngineMessage>,
    rx: UnboundedReceiver<EngineMessage>,
}

impl CompletionEngine {
    /// Create an engine completing into `surface`
    pub fn new(config: CompletionConfig, surface: Arc<dyn TextSurface>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            model: ProposalModel::new(config.show_headers),
            config,
            surface,
            registry: ProviderRegistry::new(),
            signals: EngineSignals::default(),
            state: SessionState::Idle,
            context: None,
            active: Vec::new(),
            running: Vec::new(),
            round: 0,
            visible: false,
            selected: None,
            scroll_row: None,
            auto_select: false,
            info_visible: false,
            typing_line: 0,
            trigger: DebounceTimer::default(),
            tx,
            rx,
        }
    }

    // ========================================================================
    // Providers
    // ========================================================================

    /// Register `provider`
    ///
    /// # Returns
    /// * `Result<ProviderId>` - Id of the provider, or `ProviderAlreadyRegistered`
    pub fn add_provider(&mut self, provider: Arc<dyn CompletionProvider>) -> Result<ProviderId> {
        let id = self.registry.add(provider)?;
        tracing::debug!("Registered {}", id);
        Ok(id)
    }

    /// Unregister the provider with `id`
    ///
    /// A session the provider takes part in is hidden first.
    pub fn remove_provider(&mut self, id: ProviderId) -> Result<Arc<dyn CompletionProvider>> {
        if self.active.contains(&id) {
            self.hide();
        }
        let provider = self.registry.remove(id)?;
        tracing::debug!("Unregistered {}", id);
        Ok(provider)
    }

    pub fn provider(&self, id: ProviderId) -> Option<&Arc<dyn CompletionProvider>> {
        self.registry.get(id)
    }

    /// All provider ids in registration order
    pub fn providers(&self) -> Vec<ProviderId> {
        self.registry.ids()
    }

    pub fn interactive_providers(&self) -> &[ProviderId] {
        self.registry.interactive_ids()
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Build a context at `position`, or at the cursor when `None`
    ///
    /// The word fragment before the cursor is recorded as the prefix when the
    /// context sits at the cursor.
    pub fn create_context(&self, position: Option<Position>) -> CompletionContext {
        let cursor = self.surface.cursor();
        let position = position.unwrap_or(cursor);

        let context = CompletionContext::new(position);
        if position == cursor {
            context.with_prefix(self.surface.word_at_cursor())
        } else {
            context
        }
    }

    /// Open a request for `providers` on `context`
    ///
    /// Any previous session is dropped first. Subscribers of
    /// `populate_context` see the context before providers are matched
    /// against it. Only registered providers accepting the context take
    /// part, in registration order.
    ///
    /// # Returns
    /// * `Ok(())` - Providers were asked to populate
    /// * `Err(NoProviders)` - `providers` is empty
    /// * `Err(NoMatchingProviders)` - No provider accepted the context
    pub fn request(&mut self, providers: &[ProviderId], context: CompletionContext) -> Result<()> {
        self.hide();

        if providers.is_empty() {
            return Err(RequestError::NoProviders.into());
        }

        self.signals.populate_context.emit(context.clone());

        let selected: Vec<ProviderId> = self
            .registry
            .in_registry_order(providers)
            .into_iter()
            .filter(|id| {
                self.registry
                    .get(*id)
                    .is_some_and(|provider| provider.matches(&context))
            })
            .collect();

        if selected.is_empty() {
            tracing::debug!("No provider matches {}", context.id());
            return Err(RequestError::NoMatchingProviders.into());
        }

        self.update_completion(selected, context);
        Ok(())
    }

    /// Open a request for every registered provider
    pub fn request_all(&mut self, context: CompletionContext) -> Result<()> {
        let providers = self.registry.ids();
        self.request(&providers, context)
    }

    /// Apply a batch reported through a [`ProposalSink`]
    ///
    /// # Returns
    /// * `Err(LateCallback)` - The batch belongs to a superseded context or
    ///   round, or its provider is not running; nothing was applied
    pub fn emit(&mut self, batch: ProposalBatch) -> Result<()> {
        let current = self
            .context
            .as_ref()
            .is_some_and(|context| context.id() == batch.context && !context.is_cancelled());

        if !current || batch.round != self.round || !self.running.contains(&batch.provider) {
            return Err(RequestError::LateCallback {
                context: batch.context,
                provider: batch.provider,
            }
            .into());
        }

        tracing::trace!(
            "{} added {} proposals (finished: {})",
            batch.provider,
            batch.proposals.len(),
            batch.finished
        );
        self.model.append(batch.provider, batch.proposals);

        if batch.finished {
            self.model.end(batch.provider);
            self.running.retain(|id| *id != batch.provider);

            if self.running.is_empty() {
                self.populating_done();
            }
        }

        Ok(())
    }

    /// Cancel the current request
    ///
    /// Without a current context, `context` is adopted as the current one.
    /// Otherwise the current context is cancelled, the population round is
    /// abandoned, and the context is kept only when `context` is the same one.
    pub fn cancel(&mut self, context: Option<CompletionContext>) {
        self.trigger.cancel();

        match self.context.take() {
            None => self.context = context,
            Some(current) => {
                tracing::debug!("Cancelling {}", current.id());
                current.cancel();
                self.model.cancel();
                self.running.clear();

                self.context = context.filter(|next| next.same_as(&current));
                if self.state == SessionState::Populating {
                    self.set_state(if self.visible {
                        SessionState::Ready
                    } else {
                        SessionState::Idle
                    });
                }
            }
        }
    }

    /// End the session
    ///
    /// No-op when nothing is shown or pending. `hide` is only emitted when the
    /// popup was visible.
    pub fn hide(&mut self) {
        let pending = self.context.is_some() || self.trigger.is_pending() || self.state != SessionState::Idle;
        if !self.visible && !pending {
            return;
        }

        self.cancel(None);
        self.model.clear();
        self.active.clear();
        self.selected = None;
        self.scroll_row = None;
        self.auto_select = false;
        self.set_state(SessionState::Idle);

        if self.visible {
            tracing::debug!("Hiding completion");
            self.visible = false;
            self.signals.hide.emit(());
        }
    }

    /// Report a text modification at `position`
    ///
    /// Without a session this arms the interactive trigger. An interactive
    /// session is hidden when the edit happened on another line; otherwise
    /// the session is re-targeted and re-populated with the same providers.
    pub fn text_changed(&mut self, position: Position) {
        match &self.context {
            None => self.schedule_interactive(),
            Some(context) if context.is_interactive() && position.line != self.typing_line => {
                tracing::debug!("Edit left line {}, hiding", self.typing_line + 1);
                self.hide();
            }
            Some(_) => self.refresh(position),
        }
    }

    /// Apply every queued provider batch and timer event
    ///
    /// Returns the number of messages handled.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    /// Wait for the next queued message and apply it
    ///
    /// Meant for hosts driving the engine from a `tokio::select!` loop.
    pub async fn process_next(&mut self) {
        if let Some(message) = self.rx.recv().await {
            self.handle_message(message);
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn select_first(&mut self) -> NavOutcome {
        self.navigate(|rows, _| navigation::first(rows))
    }

    pub fn select_last(&mut self) -> NavOutcome {
        self.navigate(|rows, _| navigation::last(rows))
    }

    /// Move the selection `n` proposals down
    pub fn select_next(&mut self, n: usize) -> NavOutcome {
        self.navigate(|rows, current| navigation::next(rows, current, n))
    }

    /// Move the selection `n` proposals up
    pub fn select_previous(&mut self, n: usize) -> NavOutcome {
        self.navigate(|rows, current| navigation::previous(rows, current, n))
    }

    /// Select `row` on behalf of the presentation
    ///
    /// Header rows and rows hidden by the provider filter are refused.
    pub fn select_row(&mut self, row: RowKey) -> bool {
        if !self.visible || row.is_header() || !self.model.visible_rows().contains(&row) {
            return false;
        }

        self.user_selected(Some(row));
        self.scroll_row = Some(row);
        true
    }

    pub fn selected(&self) -> Option<RowKey> {
        self.selected
    }

    pub fn selected_proposal(&self) -> Option<&Proposal> {
        self.selected.and_then(|row| self.model.proposal(&row))
    }

    /// Row the view should scroll to after the last navigation
    pub fn scroll_row(&self) -> Option<RowKey> {
        self.scroll_row
    }

    /// Apply the selected proposal and hide
    ///
    /// The owning provider gets the first chance to insert it; when it
    /// declines, the word under the cursor is replaced with the proposal text.
    /// Without a selection the popup is just hidden. Edits made here are the
    /// engine's own and must not be reported back through
    /// [`text_changed`](Self::text_changed).
    pub fn activate_selected(&mut self) -> bool {
        if !self.visible {
            return false;
        }

        let target = self.selected.and_then(|row| {
            let provider = self.registry.get(row.provider)?.clone();
            let proposal = self.model.proposal(&row)?.clone();
            Some((provider, proposal))
        });

        if let Some((provider, proposal)) = target {
            let cursor = self.surface.cursor();
            if !provider.activate(&proposal, cursor) {
                self.surface.replace_current_word(proposal.insert_text());
            }
            tracing::debug!("Activated '{}' from {}", proposal.label, provider.name());
        }

        self.hide();
        true
    }

    // ========================================================================
    // Provider filter
    // ========================================================================

    pub fn select_next_provider(&mut self) -> bool {
        self.cycle_providers(Direction::Forward)
    }

    pub fn select_previous_provider(&mut self) -> bool {
        self.cycle_providers(Direction::Backward)
    }

    /// Isolated provider, `None` when all providers are shown
    pub fn visible_provider(&self) -> Option<ProviderId> {
        cycling::isolated(&self.model)
    }

    /// Label describing the provider filter
    pub fn provider_selection(&self) -> ProviderSelection {
        let count = cycling::count_eligible(&self.model.providers(), &self.model);
        let visible = self.visible_provider();
        let (index, slots) = match (count.eligible > 1, visible) {
            (false, _) => (0, 0),
            (true, None) => (1, count.eligible + 1),
            (true, Some(_)) => (count.position + 2, count.eligible + 1),
        };

        let (name, icon) = match visible.and_then(|id| self.registry.get(id)) {
            Some(provider) => (provider.name().to_string(), provider.icon().map(str::to_string)),
            None => ("All".to_string(), None),
        };

        ProviderSelection {
            provider: visible,
            name,
            icon,
            index,
            count: slots,
        }
    }

    // ========================================================================
    // Info panel
    // ========================================================================

    pub fn is_info_visible(&self) -> bool {
        self.info_visible
    }

    pub fn set_info_visible(&mut self, visible: bool) {
        self.info_visible = visible;
    }

    /// Flip the info panel, returning the new state
    pub fn toggle_info(&mut self) -> bool {
        self.info_visible = !self.info_visible;
        self.info_visible
    }

    /// Content of the info panel for the selected proposal
    pub fn proposal_info(&self) -> InfoContent {
        let Some(row) = self.selected else {
            return InfoContent::Placeholder;
        };
        let (Some(provider), Some(proposal)) = (self.registry.get(row.provider), self.model.proposal(&row)) else {
            return InfoContent::Placeholder;
        };

        if let Some(widget) = provider.info_widget(proposal) {
            return InfoContent::Widget(widget);
        }

        match provider.info(proposal) {
            Some(text) => InfoContent::Text(text),
            None => InfoContent::Placeholder,
        }
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// React to a user action
    ///
    /// Returns `false` when the action was not consumed, which is always the
    /// case while the popup is hidden.
    pub fn handle_action(&mut self, action: CompletionAction) -> bool {
        if !self.visible {
            return false;
        }

        let page = self.config.page_size;
        match action {
            CompletionAction::Hide => {
                self.hide();
                true
            }
            CompletionAction::Next => self.select_next(1).is_handled(),
            CompletionAction::PageDown => self.select_next(page).is_handled(),
            CompletionAction::Previous => {
                self.select_previous(1).is_handled() || self.select_first().is_handled()
            }
            CompletionAction::PageUp => self.select_previous(page).is_handled(),
            CompletionAction::First => self.select_first().is_handled(),
            CompletionAction::Last => self.select_last().is_handled(),
            CompletionAction::Activate => self.activate_selected(),
            CompletionAction::NextProvider => self.select_next_provider(),
            CompletionAction::PreviousProvider => self.select_previous_provider(),
            CompletionAction::ToggleInfo => {
                self.toggle_info();
                true
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn context(&self) -> Option<&CompletionContext> {
        self.context.as_ref()
    }

    /// Providers of the current session
    pub fn active_providers(&self) -> &[ProviderId] {
        &self.active
    }

    /// Providers that have not finished the current round
    pub fn running_providers(&self) -> &[ProviderId] {
        &self.running
    }

    pub fn model(&self) -> &ProposalModel {
        &self.model
    }

    pub fn signals(&self) -> &EngineSignals {
        &self.signals
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Replace the configuration; header changes apply from the next round
    pub fn set_config(&mut self, config: CompletionConfig) {
        self.model.set_show_headers(config.show_headers);
        self.config = config;
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn update_completion(&mut self, providers: Vec<ProviderId>, context: CompletionContext) {
        self.typing_line = self.surface.line();

        self.cancel(Some(context.clone()));
        let context = match self.context.as_mut() {
            Some(current) => {
                current.renew();
                current.clone()
            }
            None => {
                self.context = Some(context.clone());
                context
            }
        };

        self.round += 1;
        self.running = providers.clone();
        self.active = providers;
        self.auto_select = self.config.select_on_show && (self.selected.is_none() || self.auto_select);
        self.set_selected(None);
        self.scroll_row = None;

        self.model.begin(&self.active);
        self.set_state(SessionState::Populating);
        tracing::debug!(
            "Populating {} at {} with {} providers (round {})",
            context.id(),
            context.position(),
            self.active.len(),
            self.round
        );

        for id in self.active.clone() {
            let Some(provider) = self.registry.get(id).cloned() else {
                continue;
            };
            let sink = ProposalSink::new(context.id(), self.round, id, context.cancellation_token(), self.tx.clone());
            provider.populate(&context, sink);
        }

        self.dispatch_pending();
    }

    fn populating_done(&mut self) {
        if self.model.is_empty(false) {
            tracing::debug!("Nothing to show");
            self.hide();
            return;
        }

        self.set_state(SessionState::Ready);

        if !self.visible {
            if !self.config.remember_info_visibility {
                self.info_visible = false;
            }
            self.visible = true;
            tracing::debug!("Showing completion");
            self.signals.show.emit(());
        }

        if self.auto_select && self.selected.is_none() {
            self.select_first();
            self.auto_select = true;
        }
    }

    fn refresh(&mut self, position: Position) {
        let Some(mut context) = self.context.clone() else {
            return;
        };
        if self.active.is_empty() {
            self.hide();
            return;
        }
        context.retarget(position, self.surface.word_at_cursor());
        let providers = self.active.clone();
        self.update_completion(providers, context);
    }

    fn schedule_interactive(&mut self) {
        if self.registry.interactive_ids().is_empty() {
            return;
        }
        self.typing_line = self.surface.line();
        self.trigger
            .schedule(self.config.auto_complete_delay(), self.typing_line, self.tx.clone());
    }

    fn on_trigger_elapsed(&mut self, generation: u64) {
        let Some(line) = self.trigger.fire(generation) else {
            return;
        };
        if self.visible {
            return;
        }
        if self.surface.line() != line {
            tracing::debug!("Cursor left line {}, dropping interactive completion", line + 1);
            return;
        }

        let context = self.create_context(None).with_interactive(true);
        let providers = self.registry.interactive_ids().to_vec();
        if let Err(err) = self.request(&providers, context) {
            tracing::debug!("Interactive completion: {}", err);
        }
    }

    fn handle_message(&mut self, message: EngineMessage) {
        match message {
            EngineMessage::Proposals(batch) => {
                if let Err(err) = self.emit(batch) {
                    tracing::debug!("{}", err);
                }
            }
            EngineMessage::TriggerElapsed { generation } => self.on_trigger_elapsed(generation),
        }
    }

    fn navigate(&mut self, step: impl FnOnce(&[RowKey], Option<usize>) -> Movement) -> NavOutcome {
        if !self.visible {
            return NavOutcome::NotHandled;
        }

        let rows = self.model.visible_rows();
        if rows.is_empty() {
            return NavOutcome::NotHandled;
        }

        let current = self.selected.and_then(|row| rows.iter().position(|other| *other == row));
        let movement = step(&rows, current);
        self.scroll_row = movement.scroll_to.map(|index| rows[index]);

        match movement.target {
            Some(index) => {
                let row = rows[index];
                self.user_selected(Some(row));
                NavOutcome::Moved(row)
            }
            None => NavOutcome::Unchanged,
        }
    }

    fn cycle_providers(&mut self, direction: Direction) -> bool {
        if !self.visible {
            return false;
        }

        let filter = match cycling::cycle(&self.model.providers(), &self.model, direction) {
            CycleOutcome::Unchanged => return false,
            CycleOutcome::Isolate(id) => vec![id],
            CycleOutcome::ShowAll => Vec::new(),
        };

        self.model.set_visible_providers(filter);
        let visible = self.visible_provider();
        tracing::debug!("Visible provider: {:?}", visible);

        if let Some(row) = self.selected
            && !self.model.is_provider_visible(row.provider)
        {
            self.user_selected(None);
            if self.config.select_on_show {
                self.select_first();
                self.auto_select = true;
            }
        }

        self.scroll_row = self.selected.or_else(|| self.model.visible_rows().first().copied());
        self.signals.visible_provider_changed.emit(visible);
        true
    }

    /// Selection change made by the user or on their behalf
    fn user_selected(&mut self, row: Option<RowKey>) {
        self.set_selected(row);
        if row.is_some() {
            self.auto_select = false;
        } else if self.config.select_on_show {
            self.auto_select = true;
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            tracing::debug!("Session {} -> {}", self.state, state);
            self.state = state;
        }
    }

    fn set_selected(&mut self, row: Option<RowKey>) {
        if self.selected != row {
            self.selected = row;
            self.signals.selection_changed.emit(row);
        }
    }
}

impl Drop for CompletionEngine {
    fn drop(&mut self) {
        if let Some(context) = self.context.take() {
            context.cancel();
        }
    }
}

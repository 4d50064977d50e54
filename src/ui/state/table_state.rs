use std::sync::Arc;

use crate::config::TableOptions;
use crate::domain::entities::actions::ActionKind;
use crate::domain::entities::criteria::{
    CriteriaKind, FilterCriterion, FilterOperator, SortCriterion, SortDirection,
};
use crate::domain::entities::pagination::{PageWindow, Pagination};
use crate::domain::entities::schema::Schema;
use crate::error::{Error, Result};
use crate::usecase::services::criteria_store::CriteriaStore;
use crate::usecase::services::orchestrator::{FetchOrchestrator, Outcome, Ticket, ViewState};
use crate::usecase::services::planner::{DataSource, QueryPlanner, ResolutionPlan};

/// One issued resolution. Its ticket is taken when the task is created, so
/// creating a newer task supersedes this one whether or not it has started.
#[derive(Debug)]
pub struct ResolveTask {
    orchestrator: Arc<FetchOrchestrator>,
    ticket: Ticket,
    plan: ResolutionPlan,
}

impl ResolveTask {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn plan(&self) -> &ResolutionPlan {
        &self.plan
    }

    pub async fn run(self) -> Outcome {
        self.orchestrator.run(self.ticket, self.plan).await
    }
}

/// Headless state of one table: criteria, page window and displayed rows.
///
/// This type decides *when* to resolve: every committed-state transition
/// returns a [`ResolveTask`]. *How* rows are produced lives in the planner,
/// local engine and orchestrator.
#[derive(Debug)]
pub struct TableState {
    schema: Arc<Schema>,
    options: TableOptions,
    criteria: CriteriaStore,
    window: PageWindow,
    planner: QueryPlanner,
    orchestrator: Arc<FetchOrchestrator>,
}

impl TableState {
    pub fn new(schema: Arc<Schema>, source: DataSource, options: TableOptions) -> Self {
        let options = options.normalized();
        let window = PageWindow::new(1, options.default_page_size());
        let orchestrator = Arc::new(FetchOrchestrator::new(options.request_timeout()));
        Self {
            planner: QueryPlanner::new(Arc::clone(&schema), source, options.show_pagination),
            criteria: CriteriaStore::new(Arc::clone(&schema)),
            schema,
            options,
            window,
            orchestrator,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn criteria(&self) -> &CriteriaStore {
        &self.criteria
    }

    pub fn orchestrator(&self) -> &Arc<FetchOrchestrator> {
        &self.orchestrator
    }

    pub fn view(&self) -> ViewState {
        self.orchestrator.snapshot()
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.window, self.orchestrator.total_count())
    }

    pub fn mount(&mut self) -> Result<ResolveTask> {
        self.resolve()
    }

    /// Re-runs the current resolution. No retry happens on its own.
    pub fn refresh(&mut self) -> Result<ResolveTask> {
        self.window = self.window.clamped(self.orchestrator.total_count());
        self.resolve()
    }

    /// Follows up an applied resolution whose total no longer reaches the
    /// current page: the window is clamped and the returned task fetches the
    /// page now shown. The page only moves down, so settling terminates.
    pub fn settle(&mut self, outcome: &Outcome) -> Result<Option<ResolveTask>> {
        let &Outcome::Applied { total_count } = outcome else {
            return Ok(None);
        };
        let clamped = self.window.clamped(total_count);
        if clamped == self.window {
            return Ok(None);
        }
        tracing::debug!(
            from = self.window.current_page,
            to = clamped.current_page,
            total_count,
            "total shrank below the current page"
        );
        self.window = clamped;
        self.resolve().map(Some)
    }

    /// Display text of the data cells on the current page, row by row.
    pub fn cells(&self) -> Vec<Vec<String>> {
        let columns: Vec<_> = self
            .schema
            .columns()
            .iter()
            .filter(|column| !column.is_action_column())
            .collect();
        self.orchestrator
            .snapshot()
            .rows
            .iter()
            .map(|row| columns.iter().map(|column| column.cell_text(row)).collect())
            .collect()
    }

    pub fn can_edit(&self, kind: CriteriaKind) -> bool {
        let shown = match kind {
            CriteriaKind::Sort => self.options.show_sort_popup,
            CriteriaKind::Filter => self.options.show_filter_popup,
        };
        shown && self.schema.eligible(kind).next().is_some()
    }

    /// Opens the editor with a fresh copy of the committed criteria.
    /// Returns `false` when the editor is not offered.
    pub fn open_editor(&mut self, kind: CriteriaKind) -> bool {
        if !self.can_edit(kind) {
            return false;
        }
        self.criteria.open_editor(kind);
        true
    }

    pub fn close_editor(&mut self, kind: CriteriaKind) {
        self.criteria.close_editor(kind);
    }

    /// Edits to the staged criteria. Nothing resolves until [`commit`](Self::commit).
    pub fn staging(&mut self) -> Staging<'_> {
        Staging(&mut self.criteria)
    }

    pub fn commit(&mut self, kind: CriteriaKind) -> Result<ResolveTask> {
        self.criteria.commit(kind)?;
        self.window.current_page = 1;
        self.resolve()
    }

    pub fn reset(&mut self, kind: CriteriaKind) -> Result<ResolveTask> {
        self.criteria.reset(kind);
        self.window.current_page = 1;
        self.resolve()
    }

    /// Moves to `page`, clamped to the pages of the last resolution.
    /// Returns `None` when the page does not change.
    pub fn go_to_page(&mut self, page: usize) -> Result<Option<ResolveTask>> {
        let target = PageWindow::new(page, self.window.items_per_page)
            .clamped(self.orchestrator.total_count());
        if target == self.window {
            return Ok(None);
        }
        self.window = target;
        self.resolve().map(Some)
    }

    pub fn first_page(&mut self) -> Result<Option<ResolveTask>> {
        self.go_to_page(1)
    }

    pub fn previous_page(&mut self) -> Result<Option<ResolveTask>> {
        self.go_to_page(self.window.current_page.saturating_sub(1))
    }

    pub fn next_page(&mut self) -> Result<Option<ResolveTask>> {
        self.go_to_page(self.window.current_page + 1)
    }

    pub fn last_page(&mut self) -> Result<Option<ResolveTask>> {
        self.go_to_page(self.pagination().total_pages())
    }

    pub fn set_items_per_page(&mut self, size: usize) -> Result<ResolveTask> {
        if !self.options.page_size_options.contains(&size) {
            return Err(Error::InvalidPageSize {
                size,
                allowed: self.options.page_size_options.clone(),
            });
        }
        self.window = PageWindow::new(1, size);
        self.resolve()
    }

    /// Runs a row action on the displayed row `row_index`.
    ///
    /// Handlers receive the absolute index across pages when pagination is
    /// shown, the on-page index otherwise.
    pub fn invoke_action(&self, column: &str, action: ActionKind, row_index: usize) -> Result<()> {
        let unavailable = || Error::ActionUnavailable {
            column: column.to_string(),
            action: action.to_string(),
        };
        let actions = self
            .schema
            .require(column)?
            .actions
            .as_ref()
            .ok_or_else(unavailable)?;

        let view = self.orchestrator.snapshot();
        let record = view.rows.get(row_index).ok_or(Error::RowOutOfRange {
            index: row_index,
            len: view.rows.len(),
        })?;
        let absolute_index = if self.options.show_pagination {
            self.pagination().absolute_index(row_index)
        } else {
            row_index
        };
        if actions.invoke(action, absolute_index, record) {
            Ok(())
        } else {
            Err(unavailable())
        }
    }

    fn resolve(&mut self) -> Result<ResolveTask> {
        let plan = self.planner.plan(
            self.criteria.committed_sorts(),
            self.criteria.committed_filters(),
            self.window,
        )?;
        Ok(ResolveTask {
            orchestrator: Arc::clone(&self.orchestrator),
            ticket: self.orchestrator.begin(),
            plan,
        })
    }
}

pub struct Staging<'a>(&'a mut CriteriaStore);

impl Staging<'_> {
    pub fn add(&mut self, kind: CriteriaKind) -> bool {
        self.0.stage_add(kind)
    }

    pub fn sort(&mut self, criterion: SortCriterion) -> Result<()> {
        self.0.stage_sort(criterion)
    }

    pub fn filter(&mut self, criterion: FilterCriterion) -> Result<()> {
        self.0.stage_filter(criterion)
    }

    pub fn update_field(&mut self, kind: CriteriaKind, index: usize, field: &str) -> Result<()> {
        self.0.stage_update_field(kind, index, field)
    }

    pub fn update_direction(&mut self, index: usize, direction: SortDirection) -> Result<()> {
        self.0.stage_update_direction(index, direction)
    }

    pub fn update_operator(&mut self, index: usize, operator: FilterOperator) -> Result<()> {
        self.0.stage_update_operator(index, operator)
    }

    pub fn update_value(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        self.0.stage_update_value(index, value)
    }

    pub fn remove(&mut self, kind: CriteriaKind, index: usize) -> Result<()> {
        self.0.stage_remove(kind, index)
    }
}

use std::sync::Arc;

use crate::domain::entities::criteria::{
    CriteriaKind, FilterCriterion, FilterOperator, SortCriterion, SortDirection,
};
use crate::domain::entities::schema::{Column, ColumnOption, Schema};
use crate::domain::predicate::{check_operator, eligible_column};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct Draft<T> {
    committed: Vec<T>,
    staged: Vec<T>,
    editor_open: bool,
}

impl<T> Default for Draft<T> {
    fn default() -> Self {
        Self {
            committed: Vec::new(),
            staged: Vec::new(),
            editor_open: false,
        }
    }
}

impl<T: Clone> Draft<T> {
    fn staged_mut(&mut self, kind: CriteriaKind, index: usize) -> Result<&mut T> {
        let len = self.staged.len();
        self.staged
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { kind, index, len })
    }

    fn remove(&mut self, kind: CriteriaKind, index: usize) -> Result<T> {
        if index >= self.staged.len() {
            return Err(Error::IndexOutOfRange {
                kind,
                index,
                len: self.staged.len(),
            });
        }
        Ok(self.staged.remove(index))
    }

    fn open(&mut self) {
        self.staged = self.committed.clone();
        self.editor_open = true;
    }

    fn close(&mut self) {
        self.staged = self.committed.clone();
        self.editor_open = false;
    }

    fn commit(&mut self) {
        self.committed = self.staged.clone();
        self.editor_open = false;
    }

    fn reset(&mut self) {
        self.committed.clear();
        self.staged.clear();
    }
}

/// Committed and staged sort/filter criteria.
///
/// Staged lists are what the editors mutate; resolution only ever reads the
/// committed lists. Every committed criterion references a column that is
/// eligible for its kind.
#[derive(Debug, Clone)]
pub struct CriteriaStore {
    schema: Arc<Schema>,
    sort: Draft<SortCriterion>,
    filter: Draft<FilterCriterion>,
}

impl CriteriaStore {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            sort: Draft::default(),
            filter: Draft::default(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn committed_sorts(&self) -> &[SortCriterion] {
        &self.sort.committed
    }

    pub fn committed_filters(&self) -> &[FilterCriterion] {
        &self.filter.committed
    }

    pub fn staged_sorts(&self) -> &[SortCriterion] {
        &self.sort.staged
    }

    pub fn staged_filters(&self) -> &[FilterCriterion] {
        &self.filter.staged
    }

    pub fn is_editor_open(&self, kind: CriteriaKind) -> bool {
        match kind {
            CriteriaKind::Sort => self.sort.editor_open,
            CriteriaKind::Filter => self.filter.editor_open,
        }
    }

    /// Number of committed criteria of `kind`, shown on the editor button.
    pub fn active_count(&self, kind: CriteriaKind) -> usize {
        match kind {
            CriteriaKind::Sort => self.sort.committed.len(),
            CriteriaKind::Filter => self.filter.committed.len(),
        }
    }

    pub fn eligible_columns(&self, kind: CriteriaKind) -> Vec<&Column> {
        self.schema.eligible(kind).collect()
    }

    pub fn operators_for(&self, field: &str) -> Result<&'static [FilterOperator]> {
        Ok(self.eligible(field, CriteriaKind::Filter)?.column_type.operators())
    }

    /// Enumerated values a filter on `field` can take, when the column declares them.
    pub fn value_choices(&self, field: &str) -> Result<Option<&[ColumnOption]>> {
        Ok(self.eligible(field, CriteriaKind::Filter)?.options.as_deref())
    }

    /// Appends a default criterion on the first eligible column.
    /// Returns `false` when no column is eligible.
    pub fn stage_add(&mut self, kind: CriteriaKind) -> bool {
        let Some(first) = self.schema.eligible(kind).next() else {
            return false;
        };
        let field = first.accessor.clone();
        match kind {
            CriteriaKind::Sort => self.sort.staged.push(SortCriterion::asc(field)),
            CriteriaKind::Filter => self.filter.staged.push(FilterCriterion::new(
                field,
                FilterOperator::Equals,
                String::new(),
            )),
        }
        true
    }

    pub fn stage_sort(&mut self, criterion: SortCriterion) -> Result<()> {
        self.eligible(&criterion.field, CriteriaKind::Sort)?;
        self.sort.staged.push(criterion);
        Ok(())
    }

    pub fn stage_filter(&mut self, criterion: FilterCriterion) -> Result<()> {
        let column = self.eligible(&criterion.field, CriteriaKind::Filter)?;
        check_operator(column, criterion.operator)?;
        self.filter.staged.push(criterion);
        Ok(())
    }

    /// Points a staged criterion at another column. A filter whose operator
    /// the new column type does not offer falls back to `equals`.
    pub fn stage_update_field(
        &mut self,
        kind: CriteriaKind,
        index: usize,
        field: &str,
    ) -> Result<()> {
        match kind {
            CriteriaKind::Sort => {
                let criterion = self.sort.staged_mut(kind, index)?;
                eligible_column(&self.schema, field, kind)?;
                criterion.field = field.to_string();
            }
            CriteriaKind::Filter => {
                let criterion = self.filter.staged_mut(kind, index)?;
                let column_type = eligible_column(&self.schema, field, kind)?.column_type;
                criterion.field = field.to_string();
                if !column_type.supports(criterion.operator) {
                    criterion.operator = FilterOperator::Equals;
                }
            }
        }
        Ok(())
    }

    pub fn stage_update_direction(&mut self, index: usize, direction: SortDirection) -> Result<()> {
        self.sort.staged_mut(CriteriaKind::Sort, index)?.direction = direction;
        Ok(())
    }

    pub fn stage_update_operator(&mut self, index: usize, operator: FilterOperator) -> Result<()> {
        let field = self
            .filter
            .staged_mut(CriteriaKind::Filter, index)?
            .field
            .clone();
        let column = self.eligible(&field, CriteriaKind::Filter)?;
        check_operator(column, operator)?;
        self.filter.staged_mut(CriteriaKind::Filter, index)?.operator = operator;
        Ok(())
    }

    pub fn stage_update_value(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        self.filter.staged_mut(CriteriaKind::Filter, index)?.value = value.into();
        Ok(())
    }

    pub fn stage_remove(&mut self, kind: CriteriaKind, index: usize) -> Result<()> {
        match kind {
            CriteriaKind::Sort => self.sort.remove(kind, index).map(drop),
            CriteriaKind::Filter => self.filter.remove(kind, index).map(drop),
        }
    }

    pub fn open_editor(&mut self, kind: CriteriaKind) {
        match kind {
            CriteriaKind::Sort => self.sort.open(),
            CriteriaKind::Filter => self.filter.open(),
        }
    }

    pub fn close_editor(&mut self, kind: CriteriaKind) {
        match kind {
            CriteriaKind::Sort => self.sort.close(),
            CriteriaKind::Filter => self.filter.close(),
        }
    }

    /// Promotes the staged list. Nothing changes if any staged entry
    /// violates the eligibility invariant.
    pub fn commit(&mut self, kind: CriteriaKind) -> Result<()> {
        match kind {
            CriteriaKind::Sort => {
                for criterion in &self.sort.staged {
                    self.eligible(&criterion.field, kind)?;
                }
                self.sort.commit();
            }
            CriteriaKind::Filter => {
                for criterion in &self.filter.staged {
                    let column = self.eligible(&criterion.field, kind)?;
                    check_operator(column, criterion.operator)?;
                }
                self.filter.commit();
            }
        }
        tracing::debug!(%kind, count = self.active_count(kind), "criteria committed");
        Ok(())
    }

    pub fn reset(&mut self, kind: CriteriaKind) {
        match kind {
            CriteriaKind::Sort => self.sort.reset(),
            CriteriaKind::Filter => self.filter.reset(),
        }
        tracing::debug!(%kind, "criteria reset");
    }

    fn eligible(&self, field: &str, kind: CriteriaKind) -> Result<&Column> {
        eligible_column(&self.schema, field, kind)
    }
}

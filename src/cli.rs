use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::{json, Value};

use crate::config::{default_config_path, load_config};
use crate::domain::entities::criteria::{
    CriteriaKind, FilterCriterion, FilterOperator, SortCriterion, SortDirection,
};
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::state::table_state::{ResolveTask, TableState};
use crate::usecase::services::orchestrator::Outcome;

/// dyntable - resolve one page of a configured table and print it as JSON
#[derive(Debug, Parser)]
#[command(name = "dyntable")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Table config file (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Page to show, clamped to the available pages
    #[arg(short, long, default_value = "1")]
    pub page: usize,
    /// Rows per page; must be one of the configured page sizes
    #[arg(long)]
    pub page_size: Option<usize>,
    /// Sort criterion `Field[:asc|desc]`, repeatable
    #[arg(long = "sort", value_parser = parse_sort_arg)]
    pub sorts: Vec<SortCriterion>,
    /// Filter criterion `Field:operator:value`, repeatable
    #[arg(long = "filter", value_parser = parse_filter_arg)]
    pub filters: Vec<FilterCriterion>,
    /// Print the remote request URL instead of fetching it
    #[arg(long)]
    pub print_query: bool,
}

pub fn parse_sort_arg(arg: &str) -> Result<SortCriterion, String> {
    let (field, direction) = match arg.split_once(':') {
        Some((field, direction)) => (field, direction.parse::<SortDirection>()?),
        None => (arg, SortDirection::Asc),
    };
    if field.is_empty() {
        return Err(format!("missing field in sort '{arg}'"));
    }
    Ok(SortCriterion::new(field, direction))
}

pub fn parse_filter_arg(arg: &str) -> Result<FilterCriterion, String> {
    let mut parts = arg.splitn(3, ':');
    let (Some(field), Some(operator), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected Field:operator:value, got '{arg}'"));
    };
    if field.is_empty() {
        return Err(format!("missing field in filter '{arg}'"));
    }
    let operator = operator
        .parse::<FilterOperator>()
        .map_err(|err| err.to_string())?;
    Ok(FilterCriterion::new(field, operator, value))
}

pub fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => default_config_path()?,
    };
    let base_dir = config_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    let mut state = load_config(&config_path)?.into_state(&base_dir)?;

    run_blocking(resolve_page(&mut state, &cli))??;
    Ok(())
}

async fn resolve_page(state: &mut TableState, cli: &Cli) -> Result<()> {
    if let Some(size) = cli.page_size {
        state.set_items_per_page(size)?;
    }
    for sort in &cli.sorts {
        state.staging().sort(sort.clone())?;
    }
    for filter in &cli.filters {
        state.staging().filter(filter.clone())?;
    }
    state.commit(CriteriaKind::Sort)?;
    let task = state.commit(CriteriaKind::Filter)?;

    if cli.print_query {
        let url = task
            .plan()
            .url()
            .context("--print-query needs a remote source")?;
        if cli.page > 1 {
            bail!("--print-query only covers the first page");
        }
        println!("{url}");
        return Ok(());
    }

    finish(state, task).await?;
    // Page clamping needs the row count of a first resolution.
    if cli.page > 1 {
        if let Some(task) = state.go_to_page(cli.page)? {
            finish(state, task).await?;
        }
    }

    println!("{}", serde_json::to_string_pretty(&page_json(state))?);
    Ok(())
}

async fn finish(state: &mut TableState, mut task: ResolveTask) -> Result<()> {
    loop {
        let outcome = match task.run().await {
            Outcome::Failed(err) => return Err(err).context("failed to resolve page"),
            outcome => outcome,
        };
        match state.settle(&outcome)? {
            Some(next) => task = next,
            None => return Ok(()),
        }
    }
}

fn page_json(state: &TableState) -> Value {
    let pagination = state.pagination();
    let view = state.view();
    json!({
        "page": pagination.current_page,
        "itemsPerPage": pagination.items_per_page,
        "totalPages": pagination.total_pages(),
        "totalCount": view.total_count,
        "rows": view.rows,
        "cells": state.cells(),
        "warnings": view.warnings,
    })
}
